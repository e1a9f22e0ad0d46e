pub mod archive;
pub mod config;
pub mod context;
pub mod converter;
pub mod dialog;
pub mod orchestrator;
pub mod settings;
pub mod task;
pub mod testing;
pub mod thumbnail;

pub use archive::{write_zip, ArchiveEntry, ArchiveError};
pub use config::{validate_config, Config, ConfigError, ConvertersConfig, UserSettings};
pub use context::ConversionContext;
pub use converter::{
    by_native, ConversionOptions, ConversionOutput, ConversionProgress, Converter,
    ConverterError, ConverterRegistry, FfmpegConfig, FfmpegConverter, FormatError, FormatInfo,
    MorphdConfig, MorphdConverter, RasterConfig, RasterConverter, SourceFile, SpeedPreset,
    WorkerStatus,
};
pub use dialog::{AutoAccept, AutoDecline, ConsentPrompt};
pub use orchestrator::{
    AddInput, ConvertAllReport, Orchestrator, OrchestratorConfig, OrchestratorError,
};
pub use settings::{
    format_filename, format_filename_at, InMemorySettings, SettingsProvider, BATCH_NAME,
};
pub use task::{ConversionTask, TaskError};
pub use thumbnail::{Thumbnail, ThumbnailConfig, ThumbnailPipeline};
