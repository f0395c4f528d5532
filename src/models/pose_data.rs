/// Per-frame data flowing through the analysis pipeline

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::models::joint_angles::JointAngles;
use crate::models::landmark::{Landmark, Pose};

/// A frame rasterized from the video at a sampled instant
#[derive(Debug, Clone)]
pub struct ExtractedFrame {
    /// Decoded frame, already resized to the extraction size
    pub image: DynamicImage,
    /// Position in the video, in seconds
    pub timestamp: f64,
    /// 0-based ordinal within the extraction
    pub frame_number: u32,
}

impl ExtractedFrame {
    pub fn new(image: DynamicImage, timestamp: f64, frame_number: u32) -> Self {
        Self {
            image,
            timestamp,
            frame_number,
        }
    }
}

/// Pose, angles and detection quality for one frame with a detected body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoseDataPoint {
    /// Frame timestamp in seconds
    pub timestamp: f64,
    /// Frame number in sequence
    pub frame_number: u32,
    /// All 33 landmarks for this frame
    pub landmarks: Vec<Landmark>,
    pub angles: JointAngles,
    /// Mean landmark visibility
    pub confidence: f32,
}

impl PoseDataPoint {
    pub fn new(frame: &ExtractedFrame, pose: Pose, angles: JointAngles) -> Self {
        let confidence = pose.mean_visibility();
        Self {
            timestamp: frame.timestamp,
            frame_number: frame.frame_number,
            landmarks: pose.into_landmarks(),
            angles,
            confidence,
        }
    }

    /// Rebuild the pose for rendering
    pub fn pose(&self) -> Pose {
        Pose::new(self.landmarks.clone())
    }
}
