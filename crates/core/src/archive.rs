//! Archive packaging for batch downloads.

use chrono::{DateTime, Datelike, Timelike, Utc};
use std::io::Write;
use std::path::Path;
use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Errors raised while packaging an archive.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// One file to be packaged into the archive.
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    /// Entry name inside the archive.
    pub name: String,
    /// Modification timestamp recorded on the entry.
    pub last_modified: DateTime<Utc>,
    /// File content.
    pub content: Vec<u8>,
}

/// Writes all entries into a single compressed zip at `path`.
///
/// Entry order is preserved.
pub fn write_zip(entries: &[ArchiveEntry], path: &Path) -> Result<(), ArchiveError> {
    let file = std::fs::File::create(path)?;
    let mut writer = ZipWriter::new(file);

    for entry in entries {
        let mut options = SimpleFileOptions::default();
        if let Ok(modified) = zip::DateTime::from_date_and_time(
            entry.last_modified.year() as u16,
            entry.last_modified.month() as u8,
            entry.last_modified.day() as u8,
            entry.last_modified.hour() as u8,
            entry.last_modified.minute() as u8,
            entry.last_modified.second() as u8,
        ) {
            options = options.last_modified_time(modified);
        }
        writer.start_file(entry.name.as_str(), options)?;
        writer.write_all(&entry.content)?;
    }

    writer.finish()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::TempDir;
    use zip::ZipArchive;

    fn entry(name: &str, content: &[u8]) -> ArchiveEntry {
        ArchiveEntry {
            name: name.to_string(),
            last_modified: Utc::now(),
            content: content.to_vec(),
        }
    }

    #[test]
    fn test_round_trip_preserves_names_and_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.zip");
        let entries = vec![
            entry("one.ogg", b"first"),
            entry("two.webp", b"second"),
            entry("three.mp4", b"third"),
        ];

        write_zip(&entries, &path).unwrap();

        let mut archive = ZipArchive::new(std::fs::File::open(&path).unwrap()).unwrap();
        assert_eq!(archive.len(), 3);
        for (idx, expected) in entries.iter().enumerate() {
            let mut file = archive.by_index(idx).unwrap();
            assert_eq!(file.name(), expected.name);
            let mut content = Vec::new();
            file.read_to_end(&mut content).unwrap();
            assert_eq!(content, expected.content);
        }
    }

    #[test]
    fn test_empty_archive_is_valid() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.zip");

        write_zip(&[], &path).unwrap();

        let archive = ZipArchive::new(std::fs::File::open(&path).unwrap()).unwrap();
        assert_eq!(archive.len(), 0);
    }
}
