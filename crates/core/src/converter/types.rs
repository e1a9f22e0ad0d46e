//! Types shared across converter backends.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Lifecycle state of a converter's backing worker.
///
/// `NotReady` is the initial state before runtime acquisition begins.
/// `Downloading` covers fetching or initializing heavy runtime assets and
/// must stay externally observable so readiness can be gated on it.
/// `Error` is terminal for the converter instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkerStatus {
    NotReady,
    Downloading,
    Ready,
    Error,
}

impl WorkerStatus {
    /// Whether the worker can accept conversion jobs.
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

/// Interior-mutable status holder shared by converter implementations.
#[derive(Debug)]
pub struct StatusCell(RwLock<WorkerStatus>);

impl StatusCell {
    pub fn new() -> Self {
        Self(RwLock::new(WorkerStatus::NotReady))
    }

    pub fn get(&self) -> WorkerStatus {
        *self.0.read()
    }

    pub fn set(&self, status: WorkerStatus) {
        *self.0.write() = status;
    }
}

impl Default for StatusCell {
    fn default() -> Self {
        Self::new()
    }
}

/// A user-submitted file handed to the conversion engine.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Location of the raw file on disk.
    pub path: PathBuf,
    /// Original file name, used for naming outputs and archive entries.
    pub file_name: String,
    /// Size in bytes, when known.
    pub size_bytes: Option<u64>,
}

impl SourceFile {
    /// Builds a source file from a path, taking the file name from its
    /// final component.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let size_bytes = std::fs::metadata(&path).ok().map(|m| m.len());
        Self {
            path,
            file_name,
            size_bytes,
        }
    }

    /// The lower-cased extension including the leading dot, or `None`
    /// when the file name has no usable dot-segment.
    pub fn extension(&self) -> Option<String> {
        let idx = self.file_name.rfind('.')?;
        if idx == 0 || idx + 1 == self.file_name.len() {
            return None;
        }
        Some(format!(".{}", self.file_name[idx + 1..].to_lowercase()))
    }

    /// The file name without its final extension.
    pub fn stem(&self) -> &str {
        match self.file_name.rfind('.') {
            Some(idx) if idx > 0 => &self.file_name[..idx],
            _ => &self.file_name,
        }
    }
}

/// Result of a successful conversion.
#[derive(Debug, Clone)]
pub struct ConversionOutput {
    /// Where the produced file was written.
    pub path: PathBuf,
    /// Size of the produced file in bytes.
    pub size_bytes: u64,
    /// The extension the file was converted to, including the leading dot.
    pub format: String,
}

impl ConversionOutput {
    /// Builds an output descriptor from a file that already exists on disk.
    pub async fn from_file(path: &Path, format: &str) -> std::io::Result<Self> {
        let meta = tokio::fs::metadata(path).await?;
        Ok(Self {
            path: path.to_path_buf(),
            size_bytes: meta.len(),
            format: format.to_string(),
        })
    }
}

/// Progress update emitted by converters that report progress.
#[derive(Debug, Clone)]
pub struct ConversionProgress {
    /// Original name of the file being converted.
    pub file: String,
    /// Progress percentage (0.0 - 100.0).
    pub percent: f32,
    /// Current processing speed (e.g. "1.5x"), when the backend reports it.
    pub speed: Option<String>,
}

/// Speed preset passed through to remote video conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpeedPreset {
    #[default]
    Slow,
    Medium,
    Fast,
}

impl SpeedPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Slow => "slow",
            Self::Medium => "medium",
            Self::Fast => "fast",
        }
    }
}

/// Backend-specific knobs supplied by the settings collaborator.
///
/// The orchestration core passes these through opaquely; each backend
/// reads only the fields it understands.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversionOptions {
    /// Target audio bitrate in kbps (lossy audio formats).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_bitrate_kbps: Option<u32>,

    /// Target audio sample rate in Hz.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_sample_rate_hz: Option<u32>,

    /// Image encoding quality (1-100).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_quality: Option<u8>,

    /// Speed preset for remote video conversion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed_preset: Option<SpeedPreset>,

    /// Additional backend-specific arguments.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub extra: HashMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_is_lowercased_with_dot() {
        let source = SourceFile {
            path: PathBuf::from("/in/Song.MP3"),
            file_name: "Song.MP3".to_string(),
            size_bytes: None,
        };
        assert_eq!(source.extension(), Some(".mp3".to_string()));
        assert_eq!(source.stem(), "Song");
    }

    #[test]
    fn test_extension_missing() {
        let no_dot = SourceFile {
            path: PathBuf::from("/in/README"),
            file_name: "README".to_string(),
            size_bytes: None,
        };
        assert_eq!(no_dot.extension(), None);

        let trailing_dot = SourceFile {
            path: PathBuf::from("/in/file."),
            file_name: "file.".to_string(),
            size_bytes: None,
        };
        assert_eq!(trailing_dot.extension(), None);

        let hidden = SourceFile {
            path: PathBuf::from("/in/.bashrc"),
            file_name: ".bashrc".to_string(),
            size_bytes: None,
        };
        assert_eq!(hidden.extension(), None);
    }

    #[test]
    fn test_stem_keeps_inner_dots() {
        let source = SourceFile {
            path: PathBuf::from("/in/album.cover.v2.png"),
            file_name: "album.cover.v2.png".to_string(),
            size_bytes: None,
        };
        assert_eq!(source.stem(), "album.cover.v2");
        assert_eq!(source.extension(), Some(".png".to_string()));
    }

    #[test]
    fn test_status_cell_transitions() {
        let cell = StatusCell::new();
        assert_eq!(cell.get(), WorkerStatus::NotReady);
        cell.set(WorkerStatus::Downloading);
        assert_eq!(cell.get(), WorkerStatus::Downloading);
        cell.set(WorkerStatus::Ready);
        assert!(cell.get().is_ready());
    }
}
