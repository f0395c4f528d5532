/// Frame Extractor
///
/// Samples a seekable video at evenly spaced instants and rasterizes each
/// sampled frame into a fixed-size image buffer.
///
/// Sampling skips the first and last 5% of the video to avoid black or
/// transition frames. Seeks are strictly sequential because one media
/// source cannot honor concurrent seeks. The source is shared with the
/// user's player, so its position and play/pause state are restored once
/// extraction finishes, whether it succeeded or not.
use image::DynamicImage;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::errors::ExtractionError;
use crate::models::pose_data::ExtractedFrame;

/// Fraction of the duration skipped at each end
const EDGE_MARGIN: f64 = 0.05;

/// A seekable, decoded video
#[allow(async_fn_in_trait)]
pub trait VideoSource {
    /// Duration in seconds, `None` until metadata is available
    fn duration(&self) -> Option<f64>;
    /// Current playback position in seconds
    fn current_time(&self) -> f64;
    fn is_paused(&self) -> bool;
    fn play(&mut self);
    fn pause(&mut self);
    /// Seek and resolve once the decoded frame at `timestamp` is ready
    async fn seek(&mut self, timestamp: f64) -> anyhow::Result<()>;
    /// The frame decoded at the current position
    fn capture_frame(&mut self) -> anyhow::Result<DynamicImage>;
}

/// Frame extractor with a fixed output size and per-seek timeout
#[derive(Debug, Clone)]
pub struct FrameExtractor {
    frame_width: u32,
    frame_height: u32,
    seek_timeout: Duration,
}

impl FrameExtractor {
    pub fn new(frame_width: u32, frame_height: u32) -> Self {
        Self {
            frame_width,
            frame_height,
            seek_timeout: Duration::from_secs(5),
        }
    }

    /// Set how long a single seek may take before extraction fails
    ///
    /// Default: 5s
    pub fn with_seek_timeout(mut self, seek_timeout: Duration) -> Self {
        self.seek_timeout = seek_timeout;
        self
    }

    /// Extract `count` frames in timestamp order
    pub async fn extract<V: VideoSource>(
        &self,
        source: &mut V,
        count: usize,
    ) -> Result<Vec<ExtractedFrame>, ExtractionError> {
        let duration = source
            .duration()
            .filter(|d| d.is_finite() && *d > 0.0)
            .ok_or(ExtractionError::DurationUnavailable)?;

        let timestamps = sample_timestamps(duration, count);
        info!(
            "Extracting {} frames from {:.2}s video",
            timestamps.len(),
            duration
        );

        let original_time = source.current_time();
        let was_paused = source.is_paused();
        source.pause();

        let result = self.extract_at(source, &timestamps).await;

        match tokio::time::timeout(self.seek_timeout, source.seek(original_time)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("Failed to restore playback position {:.2}s: {:#}", original_time, e),
            Err(_) => warn!("Restoring playback position {:.2}s timed out", original_time),
        }
        if !was_paused {
            source.play();
        }

        result
    }

    async fn extract_at<V: VideoSource>(
        &self,
        source: &mut V,
        timestamps: &[f64],
    ) -> Result<Vec<ExtractedFrame>, ExtractionError> {
        let mut frames = Vec::with_capacity(timestamps.len());

        for (frame_number, &timestamp) in timestamps.iter().enumerate() {
            match tokio::time::timeout(self.seek_timeout, source.seek(timestamp)).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => return Err(ExtractionError::Seek { timestamp, source: e }),
                Err(_) => {
                    return Err(ExtractionError::SeekTimeout {
                        timestamp,
                        timeout: self.seek_timeout,
                    })
                }
            }

            let decoded = source
                .capture_frame()
                .map_err(|e| ExtractionError::Capture { timestamp, source: e })?;
            let image = self.rasterize(&decoded);

            debug!("Captured frame {} at {:.3}s", frame_number, timestamp);
            frames.push(ExtractedFrame::new(image, timestamp, frame_number as u32));
        }

        Ok(frames)
    }

    /// Draw the decoded frame into a buffer of the configured size
    fn rasterize(&self, decoded: &DynamicImage) -> DynamicImage {
        if decoded.width() == self.frame_width && decoded.height() == self.frame_height {
            return DynamicImage::ImageRgba8(decoded.to_rgba8());
        }
        let resized = decoded.resize_exact(
            self.frame_width,
            self.frame_height,
            image::imageops::FilterType::Triangle,
        );
        DynamicImage::ImageRgba8(resized.to_rgba8())
    }
}

impl Default for FrameExtractor {
    fn default() -> Self {
        Self::new(640, 480)
    }
}

/// `count` timestamps at the centers of equal slices of the inner 90% of
/// the duration
pub fn sample_timestamps(duration: f64, count: usize) -> Vec<f64> {
    if count == 0 {
        return Vec::new();
    }

    let start = duration * EDGE_MARGIN;
    let interval = duration * (1.0 - 2.0 * EDGE_MARGIN) / count as f64;

    (0..count)
        .map(|i| start + interval * (i as f64 + 0.5))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_timestamps_inside_margins() {
        let timestamps = sample_timestamps(10.0, 10);
        assert_eq!(timestamps.len(), 10);
        assert!(timestamps[0] > 0.5);
        assert!(timestamps[9] < 9.5);
        assert!((timestamps[0] - 0.95).abs() < 1e-9);
        assert!(timestamps.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_single_sample_is_midpoint() {
        let timestamps = sample_timestamps(8.0, 1);
        assert_eq!(timestamps.len(), 1);
        assert!((timestamps[0] - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_samples() {
        assert!(sample_timestamps(8.0, 0).is_empty());
    }
}
