use std::time::Duration;
use thiserror::Error;

/// Failure to acquire the landmark model
#[derive(Error, Debug)]
pub enum InitializationError {
    #[error("Landmark model did not initialize within {0:?}")]
    Timeout(Duration),
    #[error("Failed to load landmark model: {0:#}")]
    Load(#[source] anyhow::Error),
}

/// Failure to read frames from a video
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Video duration is unavailable")]
    DurationUnavailable,
    #[error("Seek to {timestamp:.3}s did not settle within {timeout:?}")]
    SeekTimeout { timestamp: f64, timeout: Duration },
    #[error("Seek to {timestamp:.3}s failed: {source:#}")]
    Seek {
        timestamp: f64,
        #[source]
        source: anyhow::Error,
    },
    #[error("Failed to capture frame at {timestamp:.3}s: {source:#}")]
    Capture {
        timestamp: f64,
        #[source]
        source: anyhow::Error,
    },
}

/// Failure of a single detection call. Never fatal to a batch.
#[derive(Error, Debug)]
pub enum DetectionError {
    #[error("Malformed pose: expected {expected} landmarks, got {actual}")]
    MalformedPose { expected: usize, actual: usize },
    #[error("Inference failed: {0:#}")]
    Inference(#[from] anyhow::Error),
}

/// Errors that abort an analysis attempt
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error(transparent)]
    Initialization(#[from] InitializationError),
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    #[error("Analysis cancelled")]
    Cancelled,
}

impl AnalysisError {
    /// Short message suitable for showing to the user, with a next step
    pub fn user_message(&self) -> &'static str {
        match self {
            AnalysisError::Initialization(_) => {
                "Pose detection unavailable. Video playback and frame analysis continue without the skeleton overlay."
            }
            AnalysisError::Extraction(ExtractionError::SeekTimeout { .. }) => {
                "Could not read video. Try again, or trim the clip to a shorter length."
            }
            AnalysisError::Extraction(_) => {
                "Could not read video. Try again with a different file."
            }
            AnalysisError::Cancelled => "Analysis cancelled.",
        }
    }

    /// Whether retrying the same request can succeed
    pub fn is_retryable(&self) -> bool {
        !matches!(self, AnalysisError::Cancelled)
    }
}
