#![allow(dead_code)]

use anyhow::Result;
use image::{DynamicImage, Rgba, RgbaImage};
use pose_coach::models::{Landmark, Pose, PoseLandmark, POSE_LANDMARK_COUNT};
use pose_coach::services::{FrameExtractor, LandmarkModel, LandmarkModelLoader, VideoSource};
use std::collections::VecDeque;
use std::sync::Once;
use std::time::Duration;

static INIT: Once = Once::new();

/// Initialize test logging
pub fn init_test_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_test_writer()
            .try_init();
    });
}

/// In-memory video with a scriptable stall
#[derive(Debug, Clone)]
pub struct FakeVideo {
    pub duration: Option<f64>,
    pub position: f64,
    pub paused: bool,
    /// Every seek target, including the restoring one
    pub seeks: Vec<f64>,
    /// Index of a seek that never settles
    pub stall_on_seek: Option<usize>,
    pub frame_size: (u32, u32),
}

impl FakeVideo {
    pub fn new(duration: f64) -> Self {
        Self {
            duration: Some(duration),
            position: 0.0,
            paused: true,
            seeks: Vec::new(),
            stall_on_seek: None,
            frame_size: (64, 48),
        }
    }

    /// A user watching the clip at `position`
    pub fn playing_at(mut self, position: f64) -> Self {
        self.position = position;
        self.paused = false;
        self
    }

    pub fn stalling_on(mut self, seek_index: usize) -> Self {
        self.stall_on_seek = Some(seek_index);
        self
    }
}

impl VideoSource for FakeVideo {
    fn duration(&self) -> Option<f64> {
        self.duration
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
        let index = self.seeks.len();
        self.seeks.push(timestamp);
        if self.stall_on_seek == Some(index) {
            std::future::pending::<()>().await;
        }
        tokio::task::yield_now().await;
        self.position = timestamp;
        Ok(())
    }

    fn capture_frame(&mut self) -> Result<DynamicImage> {
        let shade = ((self.position * 10.0) as u32 % 256) as u8;
        let (w, h) = self.frame_size;
        Ok(DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            w,
            h,
            Rgba([shade, shade, shade, 255]),
        )))
    }
}

pub fn small_extractor() -> FrameExtractor {
    FrameExtractor::new(32, 24).with_seek_timeout(Duration::from_secs(5))
}

/// What the scripted model returns for one call
#[derive(Debug, Clone)]
pub enum Step {
    Body(Pose),
    Nothing,
    Fail,
}

/// Returns scripted results in call order, then `None`
#[derive(Debug, Clone)]
pub struct ScriptedModel {
    steps: VecDeque<Step>,
}

impl ScriptedModel {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: steps.into(),
        }
    }
}

impl LandmarkModel for ScriptedModel {
    async fn detect(&mut self, _image: &DynamicImage) -> Result<Option<Pose>> {
        tokio::task::yield_now().await;
        match self.steps.pop_front() {
            Some(Step::Body(pose)) => Ok(Some(pose)),
            Some(Step::Fail) => anyhow::bail!("inference failed"),
            Some(Step::Nothing) | None => Ok(None),
        }
    }
}

/// Loader behaviors used by pipeline tests
#[derive(Debug, Clone)]
pub enum ScriptedLoader {
    Ready(Vec<Step>),
    Broken,
    Slow(Duration),
}

impl LandmarkModelLoader for ScriptedLoader {
    type Model = ScriptedModel;

    async fn load(&self) -> Result<ScriptedModel> {
        match self {
            ScriptedLoader::Ready(steps) => Ok(ScriptedModel::new(steps.clone())),
            ScriptedLoader::Broken => anyhow::bail!("model file is corrupt"),
            ScriptedLoader::Slow(delay) => {
                tokio::time::sleep(*delay).await;
                Ok(ScriptedModel::new(Vec::new()))
            }
        }
    }
}

/// Fully visible pose spread over the frame, with both knees bent to
/// `knee_degrees`
pub fn pose_with_knee_angle(knee_degrees: f32) -> Pose {
    let mut landmarks: Vec<Landmark> = (0..POSE_LANDMARK_COUNT)
        .map(|i| Landmark::new(0.2 + i as f32 * 0.015, 0.1 + i as f32 * 0.02, 0.0, 0.9))
        .collect();

    let theta = knee_degrees.to_radians();
    for (hip, knee, ankle, x) in [
        (PoseLandmark::LeftHip, PoseLandmark::LeftKnee, PoseLandmark::LeftAnkle, 0.45),
        (PoseLandmark::RightHip, PoseLandmark::RightKnee, PoseLandmark::RightAnkle, 0.55),
    ] {
        landmarks[hip.index()] = Landmark::new(x, 0.5, 0.0, 0.9);
        landmarks[knee.index()] = Landmark::new(x, 0.7, 0.0, 0.9);
        landmarks[ankle.index()] = Landmark::new(
            x + 0.2 * theta.sin(),
            0.7 - 0.2 * theta.cos(),
            0.0,
            0.9,
        );
    }

    Pose::new(landmarks)
}

/// Pose where only `visible` landmarks clear the visibility threshold
pub fn pose_with_visible(visible: &[PoseLandmark]) -> Pose {
    let landmarks = PoseLandmark::ALL
        .iter()
        .map(|lm| {
            let i = lm.index() as f32;
            let visibility = if visible.contains(lm) { 0.95 } else { 0.2 };
            Landmark::new(0.1 + i * 0.025, 0.05 + i * 0.028, 0.0, visibility)
        })
        .collect();
    Pose::new(landmarks)
}
