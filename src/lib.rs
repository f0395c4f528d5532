//! Pose analysis for short sports clips: frame extraction, landmark
//! detection, joint angles, skeleton overlays and technique summaries.

pub mod config;
pub mod errors;
pub mod models;
pub mod services;

pub use config::AnalysisConfig;
pub use errors::{AnalysisError, DetectionError, ExtractionError, InitializationError};
pub use models::{Discipline, ExtractedFrame, JointAngles, Landmark, Pose, PoseDataPoint};
pub use services::{AnalysisPipeline, AnalysisProgress, FormAnalysis, UploadPayload};
