//! In-process raster image converter backend.

use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use image::ImageFormat;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use uuid::Uuid;

use super::config::RasterConfig;
use super::error::ConverterError;
use super::format::FormatInfo;
use super::traits::Converter;
use super::types::{
    ConversionOptions, ConversionOutput, SourceFile, StatusCell, WorkerStatus,
};

/// Image-path converter backed by pure-Rust codecs.
///
/// Runs entirely in-process; decoding and encoding happen on the blocking
/// thread pool.
pub struct RasterConverter {
    config: RasterConfig,
    formats: Vec<FormatInfo>,
    status: StatusCell,
}

impl RasterConverter {
    /// Creates a new raster converter with the given configuration.
    pub fn new(config: RasterConfig) -> Self {
        let formats = vec![
            FormatInfo::native("png"),
            FormatInfo::native("jpg"),
            FormatInfo::native("jpeg"),
            FormatInfo::native("webp"),
            FormatInfo::native("gif"),
            FormatInfo::native("bmp"),
            FormatInfo::native("ico"),
            FormatInfo::native("tiff"),
            FormatInfo::native("tif"),
        ];
        Self {
            config,
            formats,
            status: StatusCell::new(),
        }
    }

    /// Creates a converter with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(RasterConfig::default())
    }

    /// Maps a target extension to its encoder format.
    fn image_format_for(to: &str) -> Option<ImageFormat> {
        match to {
            ".png" => Some(ImageFormat::Png),
            ".jpg" | ".jpeg" => Some(ImageFormat::Jpeg),
            ".webp" => Some(ImageFormat::WebP),
            ".gif" => Some(ImageFormat::Gif),
            ".bmp" => Some(ImageFormat::Bmp),
            ".ico" => Some(ImageFormat::Ico),
            ".tiff" | ".tif" => Some(ImageFormat::Tiff),
            _ => None,
        }
    }

    /// Decodes, re-encodes and writes the image. Runs on the blocking pool.
    fn transcode(
        input_path: PathBuf,
        output_path: PathBuf,
        format: ImageFormat,
        quality: Option<u8>,
    ) -> Result<(), ConverterError> {
        let img = image::open(&input_path)?;

        match format {
            ImageFormat::Jpeg => {
                // JPEG carries no alpha channel and honors the quality knob.
                let quality = quality.unwrap_or(90).clamp(1, 100);
                let file = File::create(&output_path)?;
                let encoder = JpegEncoder::new_with_quality(BufWriter::new(file), quality);
                img.to_rgb8().write_with_encoder(encoder)?;
            }
            _ => {
                img.save_with_format(&output_path, format)?;
            }
        }

        Ok(())
    }
}

#[async_trait]
impl Converter for RasterConverter {
    fn name(&self) -> &str {
        "raster"
    }

    fn supported_formats(&self) -> &[FormatInfo] {
        &self.formats
    }

    fn status(&self) -> WorkerStatus {
        self.status.get()
    }

    async fn init(&self) -> Result<(), ConverterError> {
        if let Err(e) = tokio::fs::create_dir_all(&self.config.work_dir).await {
            self.status.set(WorkerStatus::Error);
            return Err(ConverterError::Io(e));
        }
        self.status.set(WorkerStatus::Ready);
        Ok(())
    }

    async fn convert(
        &self,
        input: &SourceFile,
        to: &str,
        options: &ConversionOptions,
    ) -> Result<ConversionOutput, ConverterError> {
        if !self.status().is_ready() {
            return Err(ConverterError::NotReady {
                converter: self.name().to_string(),
            });
        }
        if !input.path.exists() {
            return Err(ConverterError::InputNotFound {
                path: input.path.clone(),
            });
        }
        let format = Self::image_format_for(to).ok_or_else(|| ConverterError::UnsupportedTarget {
            converter: self.name().to_string(),
            to: to.to_string(),
        })?;

        tokio::fs::create_dir_all(&self.config.work_dir).await?;
        let output_path = self
            .config
            .work_dir
            .join(format!("{}{}", Uuid::new_v4(), to));

        let input_path = input.path.clone();
        let target_path = output_path.clone();
        let quality = options.image_quality;
        tokio::task::spawn_blocking(move || {
            Self::transcode(input_path, target_path, format, quality)
        })
        .await
        .map_err(|e| ConverterError::conversion_failed(format!("encode task failed: {}", e), None))??;

        Ok(ConversionOutput::from_file(&output_path, to).await?)
    }
}
