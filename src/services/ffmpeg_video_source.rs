use anyhow::{Context, Result};
use image::DynamicImage;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

use crate::services::frame_extractor::VideoSource;

/// Seekable video file decoded with FFmpeg subprocesses
///
/// Each seek decodes a single frame at the requested position, so a seek
/// settles once that frame is in memory.
pub struct FfmpegVideoSource {
    ffmpeg_path: String,
    video_path: PathBuf,
    info: VideoInfo,
    position: f64,
    paused: bool,
    current_frame: Option<DynamicImage>,
}

impl FfmpegVideoSource {
    /// Probe `video_path` with ffprobe and open it paused at 0s
    pub async fn open(video_path: &Path, ffmpeg_path: &str, ffprobe_path: &str) -> Result<Self> {
        let info = probe(ffprobe_path, video_path).await?;
        info!(
            "Opened {:?}: {} {} ({}) {:.2}s @ {:.2}fps",
            video_path,
            info.resolution_string(),
            info.video_codec,
            info.format_name,
            info.duration_seconds,
            info.fps
        );

        Ok(Self {
            ffmpeg_path: ffmpeg_path.to_string(),
            video_path: video_path.to_path_buf(),
            info,
            position: 0.0,
            paused: true,
            current_frame: None,
        })
    }

    async fn decode_frame_at(&self, timestamp: f64) -> Result<DynamicImage> {
        let output = Command::new(&self.ffmpeg_path)
            .args(["-v", "error", "-ss"])
            .arg(format!("{:.3}", timestamp))
            .arg("-i")
            .arg(&self.video_path)
            .args(["-frames:v", "1", "-f", "image2pipe", "-vcodec", "png", "-"])
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .context("Failed to execute ffmpeg")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow::anyhow!("FFmpeg frame decode failed: {}", stderr.trim()));
        }
        if output.stdout.is_empty() {
            anyhow::bail!("FFmpeg produced no frame at {:.3}s", timestamp);
        }

        image::load_from_memory(&output.stdout).context("Failed to decode frame image")
    }
}

impl VideoSource for FfmpegVideoSource {
    fn duration(&self) -> Option<f64> {
        (self.info.duration_seconds > 0.0).then_some(self.info.duration_seconds)
    }

    fn current_time(&self) -> f64 {
        self.position
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn play(&mut self) {
        self.paused = false;
    }

    fn pause(&mut self) {
        self.paused = true;
    }

    async fn seek(&mut self, timestamp: f64) -> Result<()> {
        debug!("Seeking {:?} to {:.3}s", self.video_path, timestamp);
        let frame = self.decode_frame_at(timestamp).await?;
        self.current_frame = Some(frame);
        self.position = timestamp;
        Ok(())
    }

    fn capture_frame(&mut self) -> Result<DynamicImage> {
        self.current_frame
            .clone()
            .context("No frame decoded at the current position")
    }
}

/// Extract video metadata (duration, resolution, format, codec)
pub async fn probe(ffprobe_path: &str, video_path: &Path) -> Result<VideoInfo> {
    let output = Command::new(ffprobe_path)
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=width,height,duration,codec_name,r_frame_rate",
            "-show_entries",
            "format=duration,format_name",
            "-of",
            "json",
        ])
        .arg(video_path)
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output()
        .await
        .context("Failed to execute ffprobe")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow::anyhow!("FFprobe failed: {}", stderr.trim()));
    }

    let metadata: FfprobeOutput =
        serde_json::from_slice(&output.stdout).context("Failed to parse ffprobe output")?;

    parse_video_info(metadata)
}

/// Video metadata information
#[derive(Debug, Clone)]
pub struct VideoInfo {
    pub width: i32,
    pub height: i32,
    /// 0 when neither the stream nor the container reports a duration
    pub duration_seconds: f64,
    pub video_codec: String,
    pub fps: f64,
    pub format_name: String,
}

impl VideoInfo {
    pub fn resolution_string(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }
}

/// Parse ffprobe output into VideoInfo
fn parse_video_info(metadata: FfprobeOutput) -> Result<VideoInfo> {
    let stream = metadata.streams.first().context("No video stream found")?;
    let format = metadata.format;

    Ok(VideoInfo {
        width: stream.width,
        height: stream.height,
        duration_seconds: stream
            .duration
            .clone()
            .or(format.duration.clone())
            .and_then(|d| d.parse::<f64>().ok())
            .unwrap_or(0.0),
        video_codec: stream.codec_name.clone(),
        fps: parse_frame_rate(&stream.r_frame_rate),
        format_name: format.format_name,
    })
}

/// Parse frame rate string (e.g., "30/1" -> 30.0)
fn parse_frame_rate(rate_str: &str) -> f64 {
    if let Some((num, den)) = rate_str.split_once('/') {
        if let (Ok(n), Ok(d)) = (num.parse::<f64>(), den.parse::<f64>()) {
            if d != 0.0 {
                return n / d;
            }
        }
    }
    0.0
}

// FFprobe JSON output structures
#[derive(Debug, serde::Deserialize)]
struct FfprobeOutput {
    streams: Vec<FfprobeStream>,
    format: FfprobeFormat,
}

#[derive(Debug, serde::Deserialize)]
struct FfprobeStream {
    width: i32,
    height: i32,
    duration: Option<String>,
    codec_name: String,
    r_frame_rate: String,
}

#[derive(Debug, serde::Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
    format_name: String,
}
