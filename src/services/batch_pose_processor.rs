/// Batch Pose Processor
///
/// Runs the landmark extractor over extracted frames one at a time and turns
/// each detection into a `PoseDataPoint`:
/// - frames without a detected body are dropped, not kept as empty records
/// - a detection error on one frame is logged and the frame is skipped
/// - progress is reported after every frame, whatever the outcome
///
/// Frames are processed strictly in input order because the extractor is not
/// reentrant, so the output is always ordered by frame number.
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::errors::AnalysisError;
use crate::models::pose_data::{ExtractedFrame, PoseDataPoint};
use crate::services::joint_angle_calculator::JointAngleCalculator;
use crate::services::landmark_extractor::{LandmarkExtractor, LandmarkModel};

/// Batch pose processor
#[derive(Debug, Clone, Default)]
pub struct BatchPoseProcessor {
    calculator: JointAngleCalculator,
}

impl BatchPoseProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom joint angle calculator
    pub fn with_calculator(calculator: JointAngleCalculator) -> Self {
        Self { calculator }
    }

    /// Process every frame. `on_progress(current, total)` is called once per
    /// frame with `current` counting from 1.
    pub async fn process<M, F>(
        &self,
        extractor: &mut LandmarkExtractor<M>,
        frames: &[ExtractedFrame],
        on_progress: F,
    ) -> Vec<PoseDataPoint>
    where
        M: LandmarkModel,
        F: FnMut(usize, usize),
    {
        // A fresh token is never cancelled, so this cannot fail
        self.process_cancellable(extractor, frames, &CancellationToken::new(), on_progress)
            .await
            .unwrap_or_default()
    }

    /// Like [`process`](Self::process), but stops between frames once
    /// `cancel` fires. The detection in flight is allowed to finish; its
    /// result and everything collected so far are discarded.
    pub async fn process_cancellable<M, F>(
        &self,
        extractor: &mut LandmarkExtractor<M>,
        frames: &[ExtractedFrame],
        cancel: &CancellationToken,
        mut on_progress: F,
    ) -> Result<Vec<PoseDataPoint>, AnalysisError>
    where
        M: LandmarkModel,
        F: FnMut(usize, usize),
    {
        let total = frames.len();
        let mut points = Vec::with_capacity(total);
        let mut failures = 0usize;

        for (i, frame) in frames.iter().enumerate() {
            if cancel.is_cancelled() {
                info!("Pose processing cancelled after {} of {} frames", i, total);
                return Err(AnalysisError::Cancelled);
            }

            match extractor.detect(&frame.image).await {
                Ok(Some(pose)) => match self.calculator.calculate(&pose) {
                    Some(angles) => points.push(PoseDataPoint::new(frame, pose, angles)),
                    None => debug!("Frame {}: pose incomplete, skipped", frame.frame_number),
                },
                Ok(None) => debug!("Frame {}: no body detected", frame.frame_number),
                Err(e) => {
                    failures += 1;
                    warn!("Frame {}: detection failed, skipping: {}", frame.frame_number, e);
                }
            }

            on_progress(i + 1, total);
        }

        if cancel.is_cancelled() {
            return Err(AnalysisError::Cancelled);
        }

        info!(
            "Processed {} frames: {} poses, {} failures",
            total,
            points.len(),
            failures
        );
        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::landmark::{Landmark, Pose, POSE_LANDMARK_COUNT};
    use image::{DynamicImage, Rgba, RgbaImage};

    /// Detects a body only in frames whose top-left pixel is white, and
    /// fails on red frames
    struct PixelModel;

    impl LandmarkModel for PixelModel {
        async fn detect(&mut self, image: &DynamicImage) -> anyhow::Result<Option<Pose>> {
            let pixel = image.to_rgba8().get_pixel(0, 0).0;
            match pixel {
                [255, 255, 255, _] => Ok(Some(Pose::new(vec![
                    Landmark::new(0.5, 0.5, 0.0, 0.8);
                    POSE_LANDMARK_COUNT
                ]))),
                [255, 0, 0, _] => anyhow::bail!("unreadable frame"),
                _ => Ok(None),
            }
        }
    }

    fn frame(n: u32, color: [u8; 4]) -> ExtractedFrame {
        let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(2, 2, Rgba(color)));
        ExtractedFrame::new(image, n as f64 * 0.5, n)
    }

    const BODY: [u8; 4] = [255, 255, 255, 255];
    const EMPTY: [u8; 4] = [0, 0, 0, 255];
    const BROKEN: [u8; 4] = [255, 0, 0, 255];

    #[tokio::test]
    async fn test_skips_empty_and_failed_frames() {
        let frames = vec![frame(0, BODY), frame(1, EMPTY), frame(2, BROKEN), frame(3, BODY)];
        let mut extractor = LandmarkExtractor::from_model(PixelModel);
        let mut progress = Vec::new();

        let points = BatchPoseProcessor::new()
            .process(&mut extractor, &frames, |current, total| {
                progress.push((current, total))
            })
            .await;

        let numbers: Vec<u32> = points.iter().map(|p| p.frame_number).collect();
        assert_eq!(numbers, vec![0, 3]);
        assert_eq!(progress, vec![(1, 4), (2, 4), (3, 4), (4, 4)]);
        assert!((points[0].confidence - 0.8).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let frames = vec![frame(0, BODY), frame(1, BODY)];
        let mut extractor = LandmarkExtractor::from_model(PixelModel);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let mut calls = 0;
        let result = BatchPoseProcessor::new()
            .process_cancellable(&mut extractor, &frames, &cancel, |_, _| calls += 1)
            .await;

        assert!(matches!(result, Err(AnalysisError::Cancelled)));
        assert_eq!(calls, 0);
        assert_eq!(extractor.detections(), 0);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let mut extractor = LandmarkExtractor::from_model(PixelModel);
        let points = BatchPoseProcessor::new()
            .process(&mut extractor, &[], |_, _| panic!("no progress expected"))
            .await;
        assert!(points.is_empty());
    }
}
