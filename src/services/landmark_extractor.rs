/// Landmark Extractor
///
/// Wraps a body-landmark model behind a two-phase lifecycle:
/// 1. `LandmarkExtractor::initialize` acquires the model once. This may be
///    slow (download, graph optimization) and is bounded by a timeout.
/// 2. `LandmarkExtractor::detect` is then called repeatedly per frame.
///
/// The model keeps per-call state, so `detect` takes `&mut self` and calls on
/// one instance are serialized by construction. Dropping the extractor
/// releases the model.
use image::DynamicImage;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::errors::{DetectionError, InitializationError};
use crate::models::landmark::{Pose, POSE_LANDMARK_COUNT};

/// A loaded body-landmark model
#[allow(async_fn_in_trait)]
pub trait LandmarkModel {
    /// Detect a single body. `Ok(None)` when no body is found above the
    /// model's internal presence threshold.
    async fn detect(&mut self, image: &DynamicImage) -> anyhow::Result<Option<Pose>>;
}

/// Produces a [`LandmarkModel`], possibly slowly
#[allow(async_fn_in_trait)]
pub trait LandmarkModelLoader {
    type Model: LandmarkModel;

    async fn load(&self) -> anyhow::Result<Self::Model>;
}

/// Owned handle to an initialized landmark model
pub struct LandmarkExtractor<M> {
    model: M,
    detections: u64,
    init_time: Duration,
}

impl<M: LandmarkModel> LandmarkExtractor<M> {
    /// Acquire the model, failing with [`InitializationError`] on load
    /// failure or when loading takes longer than `timeout`
    pub async fn initialize<L>(loader: &L, timeout: Duration) -> Result<Self, InitializationError>
    where
        L: LandmarkModelLoader<Model = M>,
    {
        let start_time = Instant::now();
        info!("Initializing landmark model (timeout {:?})", timeout);

        let model = match tokio::time::timeout(timeout, loader.load()).await {
            Ok(Ok(model)) => model,
            Ok(Err(e)) => return Err(InitializationError::Load(e)),
            Err(_) => return Err(InitializationError::Timeout(timeout)),
        };

        let init_time = start_time.elapsed();
        info!("Landmark model ready in {} ms", init_time.as_millis());

        Ok(Self {
            model,
            detections: 0,
            init_time,
        })
    }

    /// Wrap an already loaded model
    pub fn from_model(model: M) -> Self {
        Self {
            model,
            detections: 0,
            init_time: Duration::ZERO,
        }
    }

    /// Run detection on one frame
    pub async fn detect(&mut self, image: &DynamicImage) -> Result<Option<Pose>, DetectionError> {
        let pose = self.model.detect(image).await?;
        self.detections += 1;

        match pose {
            Some(pose) if pose.len() != POSE_LANDMARK_COUNT => Err(DetectionError::MalformedPose {
                expected: POSE_LANDMARK_COUNT,
                actual: pose.len(),
            }),
            pose => {
                debug!("Detection #{}: body found = {}", self.detections, pose.is_some());
                Ok(pose)
            }
        }
    }

    /// Number of completed detection calls
    pub fn detections(&self) -> u64 {
        self.detections
    }

}

impl<M> fmt::Debug for LandmarkExtractor<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LandmarkExtractor")
            .field("detections", &self.detections)
            .field("init_time", &self.init_time)
            .finish_non_exhaustive()
    }
}

impl<M> Drop for LandmarkExtractor<M> {
    fn drop(&mut self) {
        info!("Released landmark model after {} detections", self.detections);
    }
}
