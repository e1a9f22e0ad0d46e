//! Per-file conversion state machine.

use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::converter::{
    ConversionOptions, ConversionOutput, ConversionProgress, Converter, ConverterError, SourceFile,
};
use crate::thumbnail::Thumbnail;

/// Errors surfaced by a task's own lifecycle.
#[derive(Debug, Error)]
pub enum TaskError {
    /// `convert` was invoked while the task was already processing.
    #[error("task is already being processed")]
    InProgress,

    /// No converter can handle the task's source format.
    #[error("no converter available for '{from}'")]
    Unsupported { from: String },

    /// The task has no target format selected.
    #[error("no target format selected")]
    NoTarget,

    /// The backend conversion failed.
    #[error(transparent)]
    Conversion(#[from] ConverterError),
}

/// One user-submitted file in flight.
///
/// Holds the resolved source format, the selected converter and target,
/// and the conversion outcome. Mutated only by the orchestrator's
/// add/remove and by its own `convert` call; all fields a sibling task
/// could observe are behind short-lived locks.
pub struct ConversionTask {
    id: Uuid,
    source: SourceFile,
    from: String,
    to: RwLock<Option<String>>,
    converters: Vec<Arc<dyn Converter>>,
    processing: AtomicBool,
    result: RwLock<Option<ConversionOutput>>,
    error: RwLock<Option<String>>,
    thumbnail: RwLock<Option<Thumbnail>>,
}

impl ConversionTask {
    /// Creates a task with a selected target format and converter set.
    pub fn new(
        source: SourceFile,
        from: String,
        to: Option<String>,
        converters: Vec<Arc<dyn Converter>>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            source,
            from,
            to: RwLock::new(to),
            converters,
            processing: AtomicBool::new(false),
            result: RwLock::new(None),
            error: RwLock::new(None),
            thumbnail: RwLock::new(None),
        }
    }

    /// Creates a task for a file no converter can handle. It stays in the
    /// collection so the user sees it listed as unsupported.
    pub fn unsupported(source: SourceFile, from: String) -> Self {
        Self::new(source, from, None, Vec::new())
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn source(&self) -> &SourceFile {
        &self.source
    }

    /// The source extension, including the leading dot.
    pub fn from(&self) -> &str {
        &self.from
    }

    /// The selected target extension, if any.
    pub fn to(&self) -> Option<String> {
        self.to.read().clone()
    }

    /// Overrides the target format. Normalized to a leading dot.
    pub fn set_target(&self, to: &str) {
        let to = format!(".{}", to.trim_start_matches('.'));
        *self.to.write() = Some(to);
    }

    /// Converters capable of handling this task, best match first.
    pub fn converters(&self) -> &[Arc<dyn Converter>] {
        &self.converters
    }

    /// Whether at least one converter can handle this task.
    pub fn is_supported(&self) -> bool {
        !self.converters.is_empty()
    }

    /// Whether this task is routed to a remote (externally processing)
    /// converter.
    pub fn is_remote(&self) -> bool {
        self.converters.iter().any(|c| c.is_remote())
    }

    pub fn processing(&self) -> bool {
        self.processing.load(Ordering::SeqCst)
    }

    pub fn result(&self) -> Option<ConversionOutput> {
        self.result.read().clone()
    }

    /// The recorded failure, distinguishable from "not yet converted".
    pub fn error(&self) -> Option<String> {
        self.error.read().clone()
    }

    pub fn thumbnail(&self) -> Option<Thumbnail> {
        self.thumbnail.read().clone()
    }

    pub(crate) fn set_thumbnail(&self, thumbnail: Thumbnail) {
        *self.thumbnail.write() = Some(thumbnail);
    }

    /// The output file name: original stem plus the target extension.
    pub fn output_file_name(&self) -> Option<String> {
        let to = self.to()?;
        let to = if to.starts_with('.') {
            to
        } else {
            format!(".{}", to)
        };
        Some(format!("{}{}", self.source.stem(), to))
    }

    /// Runs the conversion through the selected converter.
    ///
    /// Precondition: the task is not already processing; re-invocation
    /// after completion is not guaranteed idempotent. On success the
    /// result is stored; on failure the error is stored and the result
    /// stays absent. The processing flag is cleared either way.
    pub async fn convert(
        &self,
        options: &ConversionOptions,
        progress_tx: Option<mpsc::Sender<ConversionProgress>>,
    ) -> Result<(), TaskError> {
        if self.processing.swap(true, Ordering::SeqCst) {
            return Err(TaskError::InProgress);
        }

        let outcome = self.run_conversion(options, progress_tx).await;
        self.processing.store(false, Ordering::SeqCst);

        if let Err(ref e) = outcome {
            *self.error.write() = Some(e.to_string());
        }
        outcome
    }

    async fn run_conversion(
        &self,
        options: &ConversionOptions,
        progress_tx: Option<mpsc::Sender<ConversionProgress>>,
    ) -> Result<(), TaskError> {
        let converter = self
            .converters
            .first()
            .ok_or_else(|| TaskError::Unsupported {
                from: self.from.clone(),
            })?;
        let to = self.to().ok_or(TaskError::NoTarget)?;

        let output = match progress_tx {
            Some(tx) if converter.reports_progress() => {
                converter
                    .convert_with_progress(&self.source, &to, options, tx)
                    .await?
            }
            _ => converter.convert(&self.source, &to, options).await?,
        };

        *self.result.write() = Some(output);
        Ok(())
    }
}

impl std::fmt::Debug for ConversionTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversionTask")
            .field("id", &self.id)
            .field("file", &self.source.file_name)
            .field("from", &self.from)
            .field("to", &self.to())
            .field("processing", &self.processing())
            .field("has_result", &self.result.read().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockConverter;
    use std::path::PathBuf;

    fn source(name: &str) -> SourceFile {
        SourceFile {
            path: PathBuf::from(format!("/in/{}", name)),
            file_name: name.to_string(),
            size_bytes: Some(1024),
        }
    }

    fn audio_mock() -> Arc<MockConverter> {
        Arc::new(MockConverter::new("mock-audio").with_native_formats(&["mp3", "wav", "ogg"]))
    }

    #[tokio::test]
    async fn test_convert_stores_result() {
        let converter = audio_mock();
        let task = ConversionTask::new(
            source("song.mp3"),
            ".mp3".to_string(),
            Some(".wav".to_string()),
            vec![converter.clone()],
        );

        task.convert(&ConversionOptions::default(), None)
            .await
            .unwrap();

        assert!(!task.processing());
        assert!(task.error().is_none());
        let result = task.result().unwrap();
        assert_eq!(result.format, ".wav");
        assert_eq!(converter.conversion_count(), 1);
    }

    #[tokio::test]
    async fn test_convert_failure_stores_error_not_result() {
        let converter = audio_mock();
        converter.fail_next(ConverterError::conversion_failed("boom", None));
        let task = ConversionTask::new(
            source("song.mp3"),
            ".mp3".to_string(),
            Some(".wav".to_string()),
            vec![converter],
        );

        let outcome = task.convert(&ConversionOptions::default(), None).await;

        assert!(outcome.is_err());
        assert!(task.result().is_none());
        assert!(task.error().is_some());
        assert!(!task.processing());
    }

    #[tokio::test]
    async fn test_unsupported_task_cannot_convert() {
        let task = ConversionTask::unsupported(source("file.xyz"), ".xyz".to_string());
        assert!(!task.is_supported());

        let outcome = task.convert(&ConversionOptions::default(), None).await;
        assert!(matches!(outcome, Err(TaskError::Unsupported { .. })));
        assert!(task.error().is_some());
    }

    #[tokio::test]
    async fn test_concurrent_convert_is_rejected() {
        let converter = audio_mock();
        converter.set_latency_ms(50);
        let task = Arc::new(ConversionTask::new(
            source("song.mp3"),
            ".mp3".to_string(),
            Some(".wav".to_string()),
            vec![converter],
        ));

        let first = {
            let task = Arc::clone(&task);
            tokio::spawn(async move { task.convert(&ConversionOptions::default(), None).await })
        };
        // Give the first call time to set the processing flag.
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        let second = task.convert(&ConversionOptions::default(), None).await;

        assert!(matches!(second, Err(TaskError::InProgress)));
        assert!(first.await.unwrap().is_ok());
    }

    #[test]
    fn test_output_file_name_uses_target_extension() {
        let task = ConversionTask::new(
            source("album.cover.png"),
            ".png".to_string(),
            Some(".webp".to_string()),
            vec![],
        );
        assert_eq!(task.output_file_name(), Some("album.cover.webp".to_string()));
    }

    #[test]
    fn test_set_target_normalizes_dot() {
        let task = ConversionTask::new(source("a.mp3"), ".mp3".to_string(), None, vec![]);
        task.set_target("ogg");
        assert_eq!(task.to(), Some(".ogg".to_string()));
    }
}
