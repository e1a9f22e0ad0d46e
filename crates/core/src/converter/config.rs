//! Configuration for the converter backends.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the FFmpeg-based audio converter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FfmpegConfig {
    /// Path to the ffmpeg binary.
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,

    /// Path to the ffprobe binary, used for duration probing.
    #[serde(default = "default_ffprobe_path")]
    pub ffprobe_path: PathBuf,

    /// Scratch directory for produced files.
    #[serde(default = "default_ffmpeg_work_dir")]
    pub work_dir: PathBuf,

    /// Timeout for a single conversion job in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// FFmpeg log level (quiet, error, warning, info, ...).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Additional global ffmpeg arguments.
    #[serde(default)]
    pub extra_args: Vec<String>,
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_ffprobe_path() -> PathBuf {
    PathBuf::from("ffprobe")
}

fn default_ffmpeg_work_dir() -> PathBuf {
    std::env::temp_dir().join("morphix-ffmpeg")
}

fn default_timeout() -> u64 {
    3600 // 1 hour
}

fn default_log_level() -> String {
    "warning".to_string()
}

impl Default for FfmpegConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            ffprobe_path: default_ffprobe_path(),
            work_dir: default_ffmpeg_work_dir(),
            timeout_secs: default_timeout(),
            log_level: default_log_level(),
            extra_args: Vec::new(),
        }
    }
}

impl FfmpegConfig {
    /// Creates a config with custom ffmpeg/ffprobe paths.
    pub fn with_paths(ffmpeg_path: PathBuf, ffprobe_path: PathBuf) -> Self {
        Self {
            ffmpeg_path,
            ffprobe_path,
            ..Default::default()
        }
    }

    /// Sets the scratch directory.
    pub fn with_work_dir(mut self, work_dir: PathBuf) -> Self {
        self.work_dir = work_dir;
        self
    }

    /// Sets the timeout in seconds.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// Configuration for the in-process raster image converter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RasterConfig {
    /// Scratch directory for produced files.
    #[serde(default = "default_raster_work_dir")]
    pub work_dir: PathBuf,
}

fn default_raster_work_dir() -> PathBuf {
    std::env::temp_dir().join("morphix-raster")
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            work_dir: default_raster_work_dir(),
        }
    }
}

impl RasterConfig {
    /// Sets the scratch directory.
    pub fn with_work_dir(mut self, work_dir: PathBuf) -> Self {
        self.work_dir = work_dir;
        self
    }
}

/// Configuration for the remote morphd video converter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MorphdConfig {
    /// Base URL of the morphd service.
    pub url: String,

    /// Scratch directory for downloaded files.
    #[serde(default = "default_morphd_work_dir")]
    pub work_dir: PathBuf,

    /// Timeout for a single remote conversion in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_morphd_work_dir() -> PathBuf {
    std::env::temp_dir().join("morphix-morphd")
}

impl MorphdConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            work_dir: default_morphd_work_dir(),
            timeout_secs: default_timeout(),
        }
    }

    /// Sets the scratch directory.
    pub fn with_work_dir(mut self, work_dir: PathBuf) -> Self {
        self.work_dir = work_dir;
        self
    }
}
