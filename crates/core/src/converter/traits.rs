//! Trait definitions for the converter module.

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::error::ConverterError;
use super::format::FormatInfo;
use super::types::{
    ConversionOptions, ConversionOutput, ConversionProgress, SourceFile, WorkerStatus,
};

/// A backend capable of transforming a file from one format to another.
///
/// Every backend, local or remote, is driven uniformly through this
/// contract. The default `convert` fails deterministically so an
/// accidentally registered stub can never pass as a working backend.
#[async_trait]
pub trait Converter: Send + Sync {
    /// The public name of the converter.
    fn name(&self) -> &str;

    /// Ordered list of supported formats.
    fn supported_formats(&self) -> &[FormatInfo];

    /// Current worker lifecycle state.
    fn status(&self) -> WorkerStatus;

    /// Whether conversion progress is observable for this backend.
    fn reports_progress(&self) -> bool {
        false
    }

    /// Whether this backend uploads files to an external service.
    fn is_remote(&self) -> bool {
        false
    }

    /// Acquires the backend's runtime, driving `status` through the
    /// readiness state machine. Called once at context startup.
    async fn init(&self) -> Result<(), ConverterError> {
        Ok(())
    }

    /// Asynchronous capability probe. Defaults to usable; backends
    /// override it to fail on unsupported sub-cases.
    async fn valid(&self) -> Result<bool, ConverterError> {
        Ok(true)
    }

    /// Converts a file to a different format.
    ///
    /// `to` includes the leading dot. Returns a new output file handle or
    /// an explicit error, never a silent empty success.
    async fn convert(
        &self,
        input: &SourceFile,
        to: &str,
        options: &ConversionOptions,
    ) -> Result<ConversionOutput, ConverterError> {
        let _ = (input, to, options);
        Err(ConverterError::NotImplemented {
            converter: self.name().to_string(),
        })
    }

    /// Converts with progress reporting.
    ///
    /// If the receiver is dropped, conversion continues without progress.
    /// Backends that do not report progress fall back to `convert`.
    async fn convert_with_progress(
        &self,
        input: &SourceFile,
        to: &str,
        options: &ConversionOptions,
        progress_tx: mpsc::Sender<ConversionProgress>,
    ) -> Result<ConversionOutput, ConverterError> {
        let _ = progress_tx;
        self.convert(input, to, options).await
    }

    /// Extension strings of all supported formats, in declaration order.
    fn format_strings(&self) -> Vec<String> {
        self.supported_formats()
            .iter()
            .map(|f| f.name().to_string())
            .collect()
    }

    /// Extension strings of the formats matching `predicate`, in
    /// declaration order.
    fn format_strings_filtered(&self, predicate: &dyn Fn(&FormatInfo) -> bool) -> Vec<String> {
        self.supported_formats()
            .iter()
            .filter(|f| predicate(f))
            .map(|f| f.name().to_string())
            .collect()
    }

    /// Whether `ext` (leading dot included) is a declared format.
    fn supports(&self, ext: &str) -> bool {
        self.supported_formats().iter().any(|f| f.name() == ext)
    }

    /// Whether `ext` is handled natively by this converter.
    fn is_native_for(&self, ext: &str) -> bool {
        self.supported_formats()
            .iter()
            .any(|f| f.name() == ext && f.is_native())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    struct StubConverter {
        formats: Vec<FormatInfo>,
    }

    impl StubConverter {
        fn new() -> Self {
            Self {
                formats: vec![
                    FormatInfo::native("mp3"),
                    FormatInfo::native("wav"),
                    FormatInfo::non_native("mkv"),
                ],
            }
        }
    }

    #[async_trait]
    impl Converter for StubConverter {
        fn name(&self) -> &str {
            "stub"
        }

        fn supported_formats(&self) -> &[FormatInfo] {
            &self.formats
        }

        fn status(&self) -> WorkerStatus {
            WorkerStatus::Ready
        }
    }

    #[tokio::test]
    async fn test_default_convert_is_not_implemented() {
        let converter = StubConverter::new();
        let input = SourceFile {
            path: PathBuf::from("/in/a.mp3"),
            file_name: "a.mp3".to_string(),
            size_bytes: None,
        };
        let result = converter
            .convert(&input, ".wav", &ConversionOptions::default())
            .await;
        assert!(matches!(
            result,
            Err(ConverterError::NotImplemented { .. })
        ));
    }

    #[tokio::test]
    async fn test_default_valid_is_true() {
        let converter = StubConverter::new();
        assert!(converter.valid().await.unwrap());
    }

    #[test]
    fn test_format_strings_order_and_idempotence() {
        let converter = StubConverter::new();
        let first = converter.format_strings();
        let second = converter.format_strings();
        assert_eq!(first, vec![".mp3", ".wav", ".mkv"]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_format_strings_filtered_by_native() {
        let converter = StubConverter::new();
        let native = converter.format_strings_filtered(&|f| f.is_native());
        assert_eq!(native, vec![".mp3", ".wav"]);
    }

    #[test]
    fn test_native_lookup() {
        let converter = StubConverter::new();
        assert!(converter.is_native_for(".mp3"));
        assert!(!converter.is_native_for(".mkv"));
        assert!(converter.supports(".mkv"));
        assert!(!converter.supports(".flac"));
    }
}
