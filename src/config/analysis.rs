use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Pose analysis configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Number of frames sampled from each video
    #[serde(default = "default_frame_count")]
    pub frame_count: usize,

    /// Width of extracted frame buffers in pixels
    #[serde(default = "default_frame_width")]
    pub frame_width: u32,

    /// Height of extracted frame buffers in pixels
    #[serde(default = "default_frame_height")]
    pub frame_height: u32,

    #[serde(default = "default_model_init_timeout")]
    pub model_init_timeout_seconds: u64,

    #[serde(default = "default_seek_timeout")]
    pub seek_timeout_ms: u64,

    /// Landmarks at or below this visibility are ignored
    #[serde(default = "default_min_visibility")]
    pub min_visibility: f32,

    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,

    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: String,

    #[serde(default = "default_ffprobe_path")]
    pub ffprobe_path: String,
}

// Default value functions
fn default_frame_count() -> usize {
    10
}

fn default_frame_width() -> u32 {
    640
}

fn default_frame_height() -> u32 {
    480
}

fn default_model_init_timeout() -> u64 {
    15
}

fn default_seek_timeout() -> u64 {
    5000
}

fn default_min_visibility() -> f32 {
    0.5
}

fn default_model_path() -> PathBuf {
    PathBuf::from("models/pose_landmark_full.onnx")
}

fn default_ffmpeg_path() -> String {
    "ffmpeg".to_string()
}

fn default_ffprobe_path() -> String {
    "ffprobe".to_string()
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            frame_count: default_frame_count(),
            frame_width: default_frame_width(),
            frame_height: default_frame_height(),
            model_init_timeout_seconds: default_model_init_timeout(),
            seek_timeout_ms: default_seek_timeout(),
            min_visibility: default_min_visibility(),
            model_path: default_model_path(),
            ffmpeg_path: default_ffmpeg_path(),
            ffprobe_path: default_ffprobe_path(),
        }
    }
}

impl AnalysisConfig {
    /// Create configuration from `POSE_COACH_*` environment variables,
    /// falling back to defaults for unset variables
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let config = Self {
            frame_count: parse_var("POSE_COACH_FRAME_COUNT")?.unwrap_or(defaults.frame_count),
            frame_width: parse_var("POSE_COACH_FRAME_WIDTH")?.unwrap_or(defaults.frame_width),
            frame_height: parse_var("POSE_COACH_FRAME_HEIGHT")?.unwrap_or(defaults.frame_height),
            model_init_timeout_seconds: parse_var("POSE_COACH_MODEL_INIT_TIMEOUT")?
                .unwrap_or(defaults.model_init_timeout_seconds),
            seek_timeout_ms: parse_var("POSE_COACH_SEEK_TIMEOUT_MS")?
                .unwrap_or(defaults.seek_timeout_ms),
            min_visibility: parse_var("POSE_COACH_MIN_VISIBILITY")?
                .unwrap_or(defaults.min_visibility),
            model_path: env::var("POSE_COACH_MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),
            ffmpeg_path: env::var("POSE_COACH_FFMPEG").unwrap_or(defaults.ffmpeg_path),
            ffprobe_path: env::var("POSE_COACH_FFPROBE").unwrap_or(defaults.ffprobe_path),
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject values the pipeline cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.frame_width == 0 || self.frame_height == 0 {
            anyhow::bail!(
                "Frame size must be non-zero (got {}x{})",
                self.frame_width,
                self.frame_height
            );
        }
        if !(0.0..=1.0).contains(&self.min_visibility) {
            anyhow::bail!("min_visibility must be within [0, 1] (got {})", self.min_visibility);
        }
        Ok(())
    }

    pub fn model_init_timeout(&self) -> Duration {
        Duration::from_secs(self.model_init_timeout_seconds)
    }

    pub fn seek_timeout(&self) -> Duration {
        Duration::from_millis(self.seek_timeout_ms)
    }
}

fn parse_var<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("Invalid value for {}: {:?}", name, raw)),
        Err(_) => Ok(None),
    }
}
