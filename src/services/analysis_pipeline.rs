/// Analysis Pipeline
///
/// Runs one form-analysis session end to end:
/// extract frames -> acquire landmark model -> detect poses -> bake skeleton
/// overlays -> summarize.
///
/// Failure policy:
/// - video errors abort the session (`AnalysisError::Extraction`)
/// - model initialization errors degrade it: the raw frames are still
///   returned for analysis without overlays, with a user-facing warning
/// - per-frame detection errors only drop that frame
///
/// The landmark extractor is created per session and dropped before `run`
/// returns on every path.
use chrono::{DateTime, Utc};
use image::{DynamicImage, ImageFormat};
use serde::Serialize;
use std::io::Cursor;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::config::AnalysisConfig;
use crate::errors::AnalysisError;
use crate::models::discipline::Discipline;
use crate::models::pose_data::{ExtractedFrame, PoseDataPoint};
use crate::services::batch_pose_processor::BatchPoseProcessor;
use crate::services::frame_extractor::{FrameExtractor, VideoSource};
use crate::services::joint_angle_calculator::JointAngleCalculator;
use crate::services::landmark_extractor::{LandmarkExtractor, LandmarkModelLoader};
use crate::services::skeleton_renderer::{draw_skeleton, RenderOptions};
use crate::services::technique_summarizer::summarize;

/// Progress events reported while a session runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum AnalysisProgress {
    ExtractingFrames { count: usize },
    LoadingModel,
    DetectingPoses { current: usize, total: usize },
    Annotating,
    Summarizing,
}

/// Everything a session produced
#[derive(Debug, Clone)]
pub struct FormAnalysis {
    pub session_id: Uuid,
    pub discipline: Discipline,
    pub analyzed_at: DateTime<Utc>,
    /// Frames as extracted, in timestamp order
    pub frames: Vec<ExtractedFrame>,
    /// Copies of `frames`; those with a detected pose carry the skeleton
    pub annotated_frames: Vec<ExtractedFrame>,
    pub pose_data: Vec<PoseDataPoint>,
    pub summary: String,
    pub pose_detection_available: bool,
    /// User-facing notes about degraded results
    pub warnings: Vec<String>,
}

impl FormAnalysis {
    /// Images and text block sent to the hosted coaching model
    pub fn upload_payload(&self) -> UploadPayload {
        UploadPayload {
            images: self
                .annotated_frames
                .iter()
                .map(|frame| frame.image.clone())
                .collect(),
            summary: self.summary.clone(),
        }
    }

    /// Serializable view of the session without image data
    pub fn report(&self) -> AnalysisReport<'_> {
        AnalysisReport {
            session_id: self.session_id,
            discipline: self.discipline,
            analyzed_at: self.analyzed_at,
            frame_count: self.frames.len(),
            pose_detection_available: self.pose_detection_available,
            warnings: &self.warnings,
            summary: &self.summary,
            pose_data: &self.pose_data,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport<'a> {
    pub session_id: Uuid,
    pub discipline: Discipline,
    pub analyzed_at: DateTime<Utc>,
    pub frame_count: usize,
    pub pose_detection_available: bool,
    pub warnings: &'a [String],
    pub summary: &'a str,
    pub pose_data: &'a [PoseDataPoint],
}

/// N images plus one text block
#[derive(Debug, Clone)]
pub struct UploadPayload {
    pub images: Vec<DynamicImage>,
    pub summary: String,
}

impl UploadPayload {
    /// Encode every image as PNG
    pub fn encode_png(&self) -> anyhow::Result<Vec<Vec<u8>>> {
        self.images
            .iter()
            .map(|image| {
                let mut bytes = Cursor::new(Vec::new());
                image.write_to(&mut bytes, ImageFormat::Png)?;
                Ok::<_, anyhow::Error>(bytes.into_inner())
            })
            .collect()
    }
}

/// Orchestrates one analysis session
#[derive(Debug, Clone)]
pub struct AnalysisPipeline {
    frame_extractor: FrameExtractor,
    processor: BatchPoseProcessor,
    frame_count: usize,
    model_init_timeout: Duration,
    min_visibility: f32,
}

impl AnalysisPipeline {
    pub fn new(config: &AnalysisConfig) -> Self {
        let frame_extractor = FrameExtractor::new(config.frame_width, config.frame_height)
            .with_seek_timeout(config.seek_timeout());
        let calculator = JointAngleCalculator::new().with_min_visibility(config.min_visibility);

        Self {
            frame_extractor,
            processor: BatchPoseProcessor::with_calculator(calculator),
            frame_count: config.frame_count,
            model_init_timeout: config.model_init_timeout(),
            min_visibility: config.min_visibility,
        }
    }

    /// Run a session against `source`, acquiring the model from `loader`
    pub async fn run<V, L, F>(
        &self,
        source: &mut V,
        loader: &L,
        discipline: Discipline,
        cancel: &CancellationToken,
        on_progress: F,
    ) -> Result<FormAnalysis, AnalysisError>
    where
        V: VideoSource,
        L: LandmarkModelLoader,
        F: FnMut(AnalysisProgress),
    {
        let session_id = Uuid::new_v4();
        let span = info_span!("analysis", %session_id, discipline = discipline.identifier());

        self.run_session(session_id, source, loader, discipline, cancel, on_progress)
            .instrument(span)
            .await
    }

    async fn run_session<V, L, F>(
        &self,
        session_id: Uuid,
        source: &mut V,
        loader: &L,
        discipline: Discipline,
        cancel: &CancellationToken,
        mut on_progress: F,
    ) -> Result<FormAnalysis, AnalysisError>
    where
        V: VideoSource,
        L: LandmarkModelLoader,
        F: FnMut(AnalysisProgress),
    {
        info!("Starting form analysis");

        on_progress(AnalysisProgress::ExtractingFrames {
            count: self.frame_count,
        });
        let frames = self.frame_extractor.extract(source, self.frame_count).await?;
        ensure_not_cancelled(cancel)?;

        on_progress(AnalysisProgress::LoadingModel);
        let mut warnings = Vec::new();
        let extractor = LandmarkExtractor::initialize(loader, self.model_init_timeout).await;
        ensure_not_cancelled(cancel)?;

        let (pose_data, pose_detection_available) = match extractor {
            Ok(mut extractor) => {
                let points = self
                    .processor
                    .process_cancellable(&mut extractor, &frames, cancel, |current, total| {
                        on_progress(AnalysisProgress::DetectingPoses { current, total })
                    })
                    .await?;
                (points, true)
            }
            Err(e) => {
                let message = AnalysisError::from(e).user_message();
                warn!("Continuing without pose detection: {}", message);
                warnings.push(message.to_string());
                (Vec::new(), false)
            }
        };

        if pose_detection_available && pose_data.is_empty() && !frames.is_empty() {
            warnings.push("No body was detected in any analyzed frame.".to_string());
        }

        on_progress(AnalysisProgress::Annotating);
        let annotated_frames = self.annotate(&frames, &pose_data, discipline);

        on_progress(AnalysisProgress::Summarizing);
        let summary = summarize(&pose_data, discipline);

        info!(
            "Form analysis complete: {} frames, {} poses",
            frames.len(),
            pose_data.len()
        );

        Ok(FormAnalysis {
            session_id,
            discipline,
            analyzed_at: Utc::now(),
            frames,
            annotated_frames,
            pose_data,
            summary,
            pose_detection_available,
            warnings,
        })
    }

    /// Copy every frame and bake the skeleton into those with a pose
    fn annotate(
        &self,
        frames: &[ExtractedFrame],
        pose_data: &[PoseDataPoint],
        discipline: Discipline,
    ) -> Vec<ExtractedFrame> {
        let options = RenderOptions {
            min_visibility: self.min_visibility,
            ..RenderOptions::baked(discipline)
        };

        frames
            .iter()
            .map(|frame| {
                let Some(point) = pose_data
                    .iter()
                    .find(|p| p.frame_number == frame.frame_number)
                else {
                    return frame.clone();
                };

                let mut canvas = frame.image.to_rgba8();
                draw_skeleton(&mut canvas, &point.pose(), &options);
                ExtractedFrame::new(
                    DynamicImage::ImageRgba8(canvas),
                    frame.timestamp,
                    frame.frame_number,
                )
            })
            .collect()
    }
}

fn ensure_not_cancelled(cancel: &CancellationToken) -> Result<(), AnalysisError> {
    if cancel.is_cancelled() {
        info!("Form analysis cancelled");
        return Err(AnalysisError::Cancelled);
    }
    Ok(())
}
