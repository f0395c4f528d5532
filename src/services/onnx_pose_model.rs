/// ONNX pose landmark model
///
/// Runs a BlazePose-style full-body landmark model with ONNX Runtime.
///
/// Model Details:
/// - Input: [1, 256, 256, 3] FP32 (NHWC, RGB, normalized [0,1])
/// - Output `Identity`: [1, 195] FP32 (33 landmarks x [x, y, z, visibility, presence])
///   with x/y/z in input pixels and visibility/presence as logits
/// - Output `Identity_1`: [1, 1] FP32 pose presence score
use anyhow::{Context, Result};
use image::{DynamicImage, GenericImageView, ImageBuffer, Rgb};
use ndarray::Array4;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Tensor;
use std::path::{Path, PathBuf};

use crate::models::landmark::{Landmark, Pose, POSE_LANDMARK_COUNT};
use crate::services::landmark_extractor::{LandmarkModel, LandmarkModelLoader};

const INPUT_NAME: &str = "input_1";
const LANDMARKS_OUTPUT: &str = "Identity";
const PRESENCE_OUTPUT: &str = "Identity_1";
const VALUES_PER_LANDMARK: usize = 5;

/// Pose landmark model backed by an ONNX Runtime session
pub struct OnnxPoseModel {
    session: Session,
    model_input_size: u32,
    presence_threshold: f32,
}

/// Letterbox transform applied before inference
#[derive(Debug, Clone, Copy)]
struct Letterbox {
    scale: f32,
    pad_x: f32,
    pad_y: f32,
    width: f32,
    height: f32,
}

impl Letterbox {
    /// Map a model-space pixel coordinate back to normalized image space
    fn to_normalized(&self, x: f32, y: f32) -> (f32, f32) {
        (
            (x - self.pad_x) / self.scale / self.width,
            (y - self.pad_y) / self.scale / self.height,
        )
    }
}

impl OnnxPoseModel {
    /// Load the ONNX model from disk
    pub fn load<P: AsRef<Path>>(model_path: P) -> Result<Self> {
        let model_bytes = std::fs::read(model_path.as_ref()).with_context(|| {
            format!("Failed to read ONNX model {}", model_path.as_ref().display())
        })?;

        let session = Session::builder()
            .map_err(|e| anyhow::anyhow!("Failed to create session builder: {e}"))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| anyhow::anyhow!("Failed to set optimization level: {e}"))?
            .with_intra_threads(4)
            .map_err(|e| anyhow::anyhow!("Failed to set thread count: {e}"))?
            .commit_from_memory(&model_bytes)
            .map_err(|e| anyhow::anyhow!("Failed to load ONNX model: {e}"))?;

        tracing::info!(
            "Loaded pose landmark model from {}",
            model_path.as_ref().display()
        );

        Ok(Self {
            session,
            model_input_size: 256,
            presence_threshold: 0.5,
        })
    }

    /// Set the pose presence threshold below which no body is reported
    ///
    /// Default: 0.5
    pub fn with_presence_threshold(mut self, threshold: f32) -> Self {
        self.presence_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    /// Letterbox the image to the model input size and build the NHWC tensor
    fn preprocess_image(image: &DynamicImage, target_size: u32) -> (Vec<f32>, Letterbox) {
        let (width, height) = image.dimensions();

        let scale = (target_size as f32 / width as f32).min(target_size as f32 / height as f32);
        let new_width = ((width as f32 * scale) as u32).clamp(1, target_size);
        let new_height = ((height as f32 * scale) as u32).clamp(1, target_size);
        let pad_x = (target_size - new_width) / 2;
        let pad_y = (target_size - new_height) / 2;

        let resized = image
            .resize_exact(new_width, new_height, image::imageops::FilterType::Triangle)
            .to_rgb8();

        let mut padded: ImageBuffer<Rgb<u8>, Vec<u8>> =
            ImageBuffer::from_pixel(target_size, target_size, Rgb([0, 0, 0]));
        image::imageops::overlay(&mut padded, &resized, pad_x as i64, pad_y as i64);

        let size = target_size as usize;
        let mut input_tensor = Array4::<f32>::zeros((1, size, size, 3));
        for (x, y, pixel) in padded.enumerate_pixels() {
            for channel in 0..3 {
                input_tensor[[0, y as usize, x as usize, channel]] = pixel[channel] as f32 / 255.0;
            }
        }

        let (data, _) = input_tensor.into_raw_vec_and_offset();
        let letterbox = Letterbox {
            scale,
            pad_x: pad_x as f32,
            pad_y: pad_y as f32,
            width: width as f32,
            height: height as f32,
        };
        (data, letterbox)
    }

    /// Convert raw model output to landmarks in normalized image space
    fn postprocess_output(raw: &[f32], letterbox: &Letterbox) -> Result<Vec<Landmark>> {
        let expected = POSE_LANDMARK_COUNT * VALUES_PER_LANDMARK;
        if raw.len() < expected {
            anyhow::bail!(
                "Landmark output too short: expected {} values, got {}",
                expected,
                raw.len()
            );
        }

        let landmarks = raw
            .chunks_exact(VALUES_PER_LANDMARK)
            .take(POSE_LANDMARK_COUNT)
            .map(|values| {
                let (x, y) = letterbox.to_normalized(values[0], values[1]);
                Landmark {
                    x,
                    y,
                    z: values[2] / letterbox.scale / letterbox.width,
                    visibility: sigmoid(values[3]),
                }
            })
            .collect();

        Ok(landmarks)
    }
}

impl LandmarkModel for OnnxPoseModel {
    async fn detect(&mut self, image: &DynamicImage) -> Result<Option<Pose>> {
        let (data, letterbox) = Self::preprocess_image(image, self.model_input_size);
        let size = self.model_input_size as usize;
        let presence_threshold = self.presence_threshold;

        let input = Tensor::from_array(([1usize, size, size, 3], data))
            .map_err(|e| anyhow::anyhow!("Failed to build input tensor: {e}"))?;

        let outputs = self
            .session
            .run(ort::inputs![INPUT_NAME => input])
            .map_err(|e| anyhow::anyhow!("Failed to run inference: {e}"))?;

        let (_, presence) = outputs
            .get(PRESENCE_OUTPUT)
            .with_context(|| format!("Model has no `{PRESENCE_OUTPUT}` output"))?
            .try_extract_tensor::<f32>()
            .map_err(|e| anyhow::anyhow!("Failed to extract presence tensor: {e}"))?;
        let presence = presence.first().copied().unwrap_or(0.0);
        if presence < presence_threshold {
            return Ok(None);
        }

        let (_, raw) = outputs
            .get(LANDMARKS_OUTPUT)
            .with_context(|| format!("Model has no `{LANDMARKS_OUTPUT}` output"))?
            .try_extract_tensor::<f32>()
            .map_err(|e| anyhow::anyhow!("Failed to extract landmark tensor: {e}"))?;

        let landmarks = Self::postprocess_output(raw, &letterbox)?;
        Ok(Some(Pose::new(landmarks)))
    }
}

/// Loads [`OnnxPoseModel`] from a file on a blocking thread
#[derive(Debug, Clone)]
pub struct OnnxPoseModelLoader {
    model_path: PathBuf,
}

impl OnnxPoseModelLoader {
    pub fn new<P: Into<PathBuf>>(model_path: P) -> Self {
        Self {
            model_path: model_path.into(),
        }
    }
}

impl LandmarkModelLoader for OnnxPoseModelLoader {
    type Model = OnnxPoseModel;

    async fn load(&self) -> Result<OnnxPoseModel> {
        let model_path = self.model_path.clone();
        tokio::task::spawn_blocking(move || OnnxPoseModel::load(model_path))
            .await
            .context("Model loading task failed")?
    }
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}
