// Pose analysis services

pub mod analysis_pipeline;
pub mod batch_pose_processor;
pub mod ffmpeg_video_source;
pub mod frame_extractor;
pub mod joint_angle_calculator;
pub mod landmark_extractor;
pub mod onnx_pose_model;
pub mod skeleton_renderer;
pub mod technique_summarizer;

pub use analysis_pipeline::{AnalysisPipeline, AnalysisProgress, FormAnalysis, UploadPayload};
pub use batch_pose_processor::BatchPoseProcessor;
pub use ffmpeg_video_source::FfmpegVideoSource;
pub use frame_extractor::{FrameExtractor, VideoSource};
pub use joint_angle_calculator::JointAngleCalculator;
pub use landmark_extractor::{LandmarkExtractor, LandmarkModel, LandmarkModelLoader};
pub use onnx_pose_model::{OnnxPoseModel, OnnxPoseModelLoader};
pub use skeleton_renderer::{draw_skeleton, DrawingSurface, RenderOptions};
pub use technique_summarizer::{summarize, NO_POSE_DATA_SUMMARY};
