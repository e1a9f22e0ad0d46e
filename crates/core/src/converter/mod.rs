//! Converter module: the polymorphic backend contract and its closed set
//! of implementations.
//!
//! Every backend — local or remote — is driven through the [`Converter`]
//! trait: declared format support, a readiness state machine, an async
//! capability probe and the `convert` operation itself. The
//! [`ConverterRegistry`] holds the fixed set of backends and provides the
//! native-format-first ordering used by automatic converter selection.
//!
//! # Example
//!
//! ```ignore
//! use morphix_core::converter::{ConverterRegistry, FfmpegConverter, RasterConverter};
//! use std::sync::Arc;
//!
//! let registry = ConverterRegistry::new(vec![
//!     Arc::new(RasterConverter::with_defaults()),
//!     Arc::new(FfmpegConverter::with_defaults()),
//! ]);
//! registry.init_all().await;
//!
//! let candidates = registry.candidates_for(".mp3");
//! assert_eq!(candidates[0].name(), "ffmpeg");
//! ```

mod config;
mod error;
mod ffmpeg;
mod format;
mod morphd;
mod raster;
mod registry;
mod traits;
mod types;

pub use config::{FfmpegConfig, MorphdConfig, RasterConfig};
pub use error::ConverterError;
pub use ffmpeg::FfmpegConverter;
pub use format::{FormatError, FormatInfo};
pub use morphd::MorphdConverter;
pub use raster::RasterConverter;
pub use registry::{by_native, ConverterRegistry};
pub use traits::Converter;
pub use types::{
    ConversionOptions, ConversionOutput, ConversionProgress, SourceFile, SpeedPreset, StatusCell,
    WorkerStatus,
};
