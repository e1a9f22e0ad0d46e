//! Best-effort preview thumbnail generation.
//!
//! Thumbnails are produced on a bounded queue that is independent of the
//! conversion queue; generating a preview for a file never blocks or gates
//! converting it. Every failure is caught at the task boundary — a task
//! without a thumbnail remains fully convertible.

mod extract;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::converter::ConverterRegistry;
use crate::task::ConversionTask;

pub use extract::scale_to_thumbnail;

/// Errors raised while producing a thumbnail. Never escape the pipeline.
#[derive(Debug, Error)]
pub enum ThumbnailError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("ffmpeg extraction failed: {reason}")]
    Ffmpeg { reason: String },

    #[error("thumbnail task failed: {reason}")]
    Internal { reason: String },
}

/// A generated preview image (PNG bytes).
#[derive(Debug, Clone)]
pub struct Thumbnail {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Configuration for the thumbnail pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThumbnailConfig {
    /// Cap for the larger dimension of a preview, in pixels.
    #[serde(default = "default_max_dimension")]
    pub max_dimension: u32,

    /// Path to the ffmpeg binary used for frame and cover extraction.
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,

    /// Scratch directory for extracted frames.
    #[serde(default = "default_scratch_dir")]
    pub scratch_dir: PathBuf,

    /// Name of the audio-path converter; its native formats get cover-art
    /// extraction.
    #[serde(default = "default_audio_converter")]
    pub audio_converter: String,

    /// Name of the video-path converter; its native formats get
    /// single-frame extraction.
    #[serde(default = "default_video_converter")]
    pub video_converter: String,
}

fn default_max_dimension() -> u32 {
    180
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_scratch_dir() -> PathBuf {
    std::env::temp_dir().join("morphix-thumbs")
}

fn default_audio_converter() -> String {
    "ffmpeg".to_string()
}

fn default_video_converter() -> String {
    "morphd".to_string()
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            max_dimension: default_max_dimension(),
            ffmpeg_path: default_ffmpeg_path(),
            scratch_dir: default_scratch_dir(),
            audio_converter: default_audio_converter(),
            video_converter: default_video_converter(),
        }
    }
}

enum MediaKind {
    Audio,
    Video,
    Image,
}

/// Bounded fire-and-forget preview generator.
pub struct ThumbnailPipeline {
    config: ThumbnailConfig,
    semaphore: Arc<Semaphore>,
}

impl ThumbnailPipeline {
    /// Creates a pipeline with `concurrency` parallel generation slots.
    pub fn new(config: ThumbnailConfig, concurrency: usize) -> Self {
        Self {
            config,
            semaphore: Arc::new(Semaphore::new(concurrency.max(1))),
        }
    }

    /// Schedules thumbnail generation for a task.
    ///
    /// Detached: the returned handle does not need to be awaited, and the
    /// spawned task captures its own failures.
    pub fn schedule(
        &self,
        task: Arc<ConversionTask>,
        registry: Arc<ConverterRegistry>,
    ) -> JoinHandle<()> {
        let semaphore = Arc::clone(&self.semaphore);
        let config = self.config.clone();

        tokio::spawn(async move {
            let _permit = match semaphore.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => return,
            };

            match Self::generate(&config, &task, &registry).await {
                Ok(thumbnail) => task.set_thumbnail(thumbnail),
                Err(e) => {
                    debug!(
                        file = %task.source().file_name,
                        error = %e,
                        "thumbnail generation failed"
                    );
                }
            }
        })
    }

    /// Produces one preview: cover art for audio-native formats, a single
    /// frame for video-native formats, a direct decode otherwise.
    async fn generate(
        config: &ThumbnailConfig,
        task: &ConversionTask,
        registry: &ConverterRegistry,
    ) -> Result<Thumbnail, ThumbnailError> {
        let from = task.from();
        let kind = if registry
            .get(&config.audio_converter)
            .is_some_and(|c| c.is_native_for(from))
        {
            MediaKind::Audio
        } else if registry
            .get(&config.video_converter)
            .is_some_and(|c| c.is_native_for(from))
        {
            MediaKind::Video
        } else {
            MediaKind::Image
        };

        let input = task.source().path.clone();
        match kind {
            MediaKind::Audio => {
                let frame =
                    extract::cover_art(&config.ffmpeg_path, &input, &config.scratch_dir).await?;
                Self::scale_file(frame, config.max_dimension).await
            }
            MediaKind::Video => {
                let frame =
                    extract::first_frame(&config.ffmpeg_path, &input, &config.scratch_dir).await?;
                Self::scale_file(frame, config.max_dimension).await
            }
            MediaKind::Image => {
                let data = tokio::fs::read(&input).await?;
                let max_dimension = config.max_dimension;
                tokio::task::spawn_blocking(move || scale_to_thumbnail(&data, max_dimension))
                    .await
                    .map_err(|e| ThumbnailError::Internal {
                        reason: e.to_string(),
                    })?
            }
        }
    }

    /// Decodes an extracted frame file, scales it and removes the scratch
    /// file immediately after.
    async fn scale_file(path: PathBuf, max_dimension: u32) -> Result<Thumbnail, ThumbnailError> {
        let data = tokio::fs::read(&path).await;
        // Scratch frames are single-use; release them before decoding.
        let _ = tokio::fs::remove_file(&path).await;
        let data = data?;

        tokio::task::spawn_blocking(move || scale_to_thumbnail(&data, max_dimension))
            .await
            .map_err(|e| ThumbnailError::Internal {
                reason: e.to_string(),
            })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::{ConversionOptions, SourceFile};
    use crate::testing::MockConverter;
    use image::ImageFormat;
    use tempfile::TempDir;

    fn registry() -> Arc<ConverterRegistry> {
        Arc::new(ConverterRegistry::new(vec![Arc::new(
            MockConverter::new("mock").with_native_formats(&["png"]),
        )]))
    }

    fn pipeline(dir: &TempDir) -> ThumbnailPipeline {
        let config = ThumbnailConfig {
            scratch_dir: dir.path().join("scratch"),
            ..Default::default()
        };
        ThumbnailPipeline::new(config, 2)
    }

    fn png_task(dir: &TempDir, width: u32, height: u32) -> Arc<ConversionTask> {
        let path = dir.path().join("pic.png");
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([10, 200, 10, 255]));
        img.save_with_format(&path, ImageFormat::Png).unwrap();
        Arc::new(ConversionTask::new(
            SourceFile::from_path(path),
            ".png".to_string(),
            Some(".jpg".to_string()),
            vec![],
        ))
    }

    #[tokio::test]
    async fn test_image_thumbnail_caps_larger_dimension() {
        let dir = TempDir::new().unwrap();
        let task = png_task(&dir, 400, 200);

        pipeline(&dir).schedule(Arc::clone(&task), registry()).await.unwrap();

        let thumbnail = task.thumbnail().expect("thumbnail should be generated");
        assert_eq!(thumbnail.width, 180);
        assert_eq!(thumbnail.height, 90);
        assert!(!thumbnail.data.is_empty());
    }

    #[tokio::test]
    async fn test_failure_is_swallowed_and_task_still_converts() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.png");
        tokio::fs::write(&path, b"not an image").await.unwrap();

        let converter = Arc::new(MockConverter::new("mock").with_native_formats(&["png", "jpg"]));
        let task = Arc::new(ConversionTask::new(
            SourceFile::from_path(path),
            ".png".to_string(),
            Some(".jpg".to_string()),
            vec![converter],
        ));

        pipeline(&dir).schedule(Arc::clone(&task), registry()).await.unwrap();

        assert!(task.thumbnail().is_none());
        // The pipeline's outputs are strictly cosmetic.
        task.convert(&ConversionOptions::default(), None)
            .await
            .unwrap();
        assert!(task.result().is_some());
    }

    #[tokio::test]
    async fn test_missing_file_is_swallowed() {
        let dir = TempDir::new().unwrap();
        let task = Arc::new(ConversionTask::new(
            SourceFile::from_path(dir.path().join("gone.png")),
            ".png".to_string(),
            None,
            vec![],
        ));

        pipeline(&dir).schedule(Arc::clone(&task), registry()).await.unwrap();
        assert!(task.thumbnail().is_none());
    }
}
