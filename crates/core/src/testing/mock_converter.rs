//! Mock converter for testing.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::converter::{
    ConversionOptions, ConversionOutput, ConversionProgress, Converter, ConverterError,
    FormatInfo, SourceFile, StatusCell, WorkerStatus,
};

/// A recorded conversion call for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedConversion {
    /// Original name of the submitted file.
    pub file_name: String,
    /// Requested target extension.
    pub to: String,
    /// Whether the conversion succeeded.
    pub success: bool,
}

/// Mock implementation of the [`Converter`] trait.
///
/// Provides controllable behavior for testing:
/// - declared formats and native flags
/// - worker status and remote marker
/// - failure injection and simulated latency
/// - recorded conversions for assertions
///
/// Starts `Ready` so tests do not need an init round; use
/// [`set_status`](Self::set_status) to exercise the readiness machine.
pub struct MockConverter {
    name: String,
    formats: Vec<FormatInfo>,
    status: StatusCell,
    remote: bool,
    reports_progress: bool,
    latency_ms: Mutex<u64>,
    next_error: Mutex<Option<ConverterError>>,
    always_fail: Mutex<Option<String>>,
    conversions: Mutex<Vec<RecordedConversion>>,
    work_dir: Option<PathBuf>,
}

impl MockConverter {
    /// Creates a mock with no formats declared.
    pub fn new(name: impl Into<String>) -> Self {
        let status = StatusCell::new();
        status.set(WorkerStatus::Ready);
        Self {
            name: name.into(),
            formats: Vec::new(),
            status,
            remote: false,
            reports_progress: false,
            latency_ms: Mutex::new(0),
            next_error: Mutex::new(None),
            always_fail: Mutex::new(None),
            conversions: Mutex::new(Vec::new()),
            work_dir: None,
        }
    }

    /// Declares the given extensions as native, both directions.
    pub fn with_native_formats(mut self, extensions: &[&str]) -> Self {
        self.formats = extensions.iter().map(|ext| FormatInfo::native(ext)).collect();
        self
    }

    /// Declares formats with explicit native flags.
    pub fn with_formats(mut self, formats: &[(&str, bool)]) -> Self {
        self.formats = formats
            .iter()
            .map(|(ext, native)| {
                if *native {
                    FormatInfo::native(ext)
                } else {
                    FormatInfo::non_native(ext)
                }
            })
            .collect();
        self
    }

    /// Sets the initial worker status.
    pub fn with_status(self, status: WorkerStatus) -> Self {
        self.status.set(status);
        self
    }

    /// Marks the mock as an externally-processing backend.
    pub fn remote(mut self) -> Self {
        self.remote = true;
        self
    }

    /// Enables progress reporting.
    pub fn with_progress_reporting(mut self) -> Self {
        self.reports_progress = true;
        self
    }

    /// Writes real output files into `dir` instead of fabricating paths.
    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = Some(dir.into());
        self
    }

    /// Changes the worker status at runtime.
    pub fn set_status(&self, status: WorkerStatus) {
        self.status.set(status);
    }

    /// Configures the next conversion to fail with the given error.
    pub fn fail_next(&self, error: ConverterError) {
        *self.next_error.lock() = Some(error);
    }

    /// Makes every conversion fail with `reason` until cleared with
    /// `None`.
    pub fn set_always_fail(&self, reason: Option<&str>) {
        *self.always_fail.lock() = reason.map(|r| r.to_string());
    }

    /// Sets the simulated conversion latency.
    pub fn set_latency_ms(&self, latency_ms: u64) {
        *self.latency_ms.lock() = latency_ms;
    }

    /// All recorded conversion calls.
    pub fn recorded_conversions(&self) -> Vec<RecordedConversion> {
        self.conversions.lock().clone()
    }

    /// Number of conversion calls performed.
    pub fn conversion_count(&self) -> usize {
        self.conversions.lock().len()
    }

    fn take_error(&self) -> Option<ConverterError> {
        self.next_error.lock().take()
    }

    fn record(&self, input: &SourceFile, to: &str, success: bool) {
        self.conversions.lock().push(RecordedConversion {
            file_name: input.file_name.clone(),
            to: to.to_string(),
            success,
        });
    }
}

#[async_trait]
impl Converter for MockConverter {
    fn name(&self) -> &str {
        &self.name
    }

    fn supported_formats(&self) -> &[FormatInfo] {
        &self.formats
    }

    fn status(&self) -> WorkerStatus {
        self.status.get()
    }

    fn reports_progress(&self) -> bool {
        self.reports_progress
    }

    fn is_remote(&self) -> bool {
        self.remote
    }

    async fn init(&self) -> Result<(), ConverterError> {
        self.status.set(WorkerStatus::Ready);
        Ok(())
    }

    async fn convert(
        &self,
        input: &SourceFile,
        to: &str,
        _options: &ConversionOptions,
    ) -> Result<ConversionOutput, ConverterError> {
        if let Some(error) = self.take_error() {
            self.record(input, to, false);
            return Err(error);
        }
        if let Some(reason) = self.always_fail.lock().clone() {
            self.record(input, to, false);
            return Err(ConverterError::conversion_failed(reason, None));
        }

        let latency_ms = *self.latency_ms.lock();
        if latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(latency_ms)).await;
        }

        self.record(input, to, true);

        match &self.work_dir {
            Some(dir) => {
                tokio::fs::create_dir_all(dir).await?;
                let path = dir.join(format!("{}{}", Uuid::new_v4(), to));
                let content = format!("{} as {}", input.file_name, to);
                tokio::fs::write(&path, content.as_bytes()).await?;
                Ok(ConversionOutput {
                    path,
                    size_bytes: content.len() as u64,
                    format: to.to_string(),
                })
            }
            None => Ok(ConversionOutput {
                path: input.path.with_extension(to.trim_start_matches('.')),
                size_bytes: input.size_bytes.unwrap_or(0),
                format: to.to_string(),
            }),
        }
    }

    async fn convert_with_progress(
        &self,
        input: &SourceFile,
        to: &str,
        options: &ConversionOptions,
        progress_tx: mpsc::Sender<ConversionProgress>,
    ) -> Result<ConversionOutput, ConverterError> {
        if self.reports_progress {
            for step in 1..=4u32 {
                let _ = progress_tx
                    .send(ConversionProgress {
                        file: input.file_name.clone(),
                        percent: step as f32 * 25.0,
                        speed: Some("10x".to_string()),
                    })
                    .await;
            }
        }
        self.convert(input, to, options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str) -> SourceFile {
        SourceFile {
            path: PathBuf::from(format!("/in/{}", name)),
            file_name: name.to_string(),
            size_bytes: Some(512),
        }
    }

    #[tokio::test]
    async fn test_basic_conversion_is_recorded() {
        let converter = MockConverter::new("mock").with_native_formats(&["mp3", "wav"]);

        let output = converter
            .convert(&input("a.mp3"), ".wav", &ConversionOptions::default())
            .await
            .unwrap();

        assert_eq!(output.format, ".wav");
        let recorded = converter.recorded_conversions();
        assert_eq!(recorded.len(), 1);
        assert!(recorded[0].success);
        assert_eq!(recorded[0].file_name, "a.mp3");
    }

    #[tokio::test]
    async fn test_error_injection_is_consumed() {
        let converter = MockConverter::new("mock").with_native_formats(&["mp3", "wav"]);
        converter.fail_next(ConverterError::conversion_failed("boom", None));

        let first = converter
            .convert(&input("a.mp3"), ".wav", &ConversionOptions::default())
            .await;
        assert!(first.is_err());

        let second = converter
            .convert(&input("a.mp3"), ".wav", &ConversionOptions::default())
            .await;
        assert!(second.is_ok());

        let recorded = converter.recorded_conversions();
        assert!(!recorded[0].success);
        assert!(recorded[1].success);
    }

    #[tokio::test]
    async fn test_work_dir_produces_real_files() {
        let dir = tempfile::TempDir::new().unwrap();
        let converter = MockConverter::new("mock")
            .with_native_formats(&["mp3", "wav"])
            .with_work_dir(dir.path());

        let output = converter
            .convert(&input("a.mp3"), ".wav", &ConversionOptions::default())
            .await
            .unwrap();

        let content = std::fs::read_to_string(&output.path).unwrap();
        assert_eq!(content, "a.mp3 as .wav");
        assert_eq!(output.size_bytes, content.len() as u64);
    }

    #[tokio::test]
    async fn test_progress_updates_are_sent() {
        let converter = MockConverter::new("mock")
            .with_native_formats(&["mp3", "wav"])
            .with_progress_reporting();

        let (tx, mut rx) = mpsc::channel(8);
        converter
            .convert_with_progress(&input("a.mp3"), ".wav", &ConversionOptions::default(), tx)
            .await
            .unwrap();

        let mut updates = 0;
        while let Ok(progress) = rx.try_recv() {
            assert_eq!(progress.file, "a.mp3");
            updates += 1;
        }
        assert_eq!(updates, 4);
    }
}
