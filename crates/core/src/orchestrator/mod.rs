//! The conversion orchestrator: the collection of in-flight tasks.
//!
//! Owns the ordered set of [`ConversionTask`]s, computes aggregate
//! readiness, runs batch conversion under a bounded queue and packages
//! results into a downloadable archive. Insertion order is preserved and
//! drives both display and archive iteration order.

mod config;
mod types;

pub use config::OrchestratorConfig;
pub use types::{AddInput, ConvertAllReport};

use chrono::Utc;
use futures::future::join_all;
use parking_lot::RwLock;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::archive::{self, ArchiveEntry, ArchiveError};
use crate::converter::{ConversionProgress, Converter, ConverterRegistry, SourceFile};
use crate::dialog::ConsentPrompt;
use crate::settings::{format_filename, SettingsProvider, BATCH_NAME};
use crate::task::ConversionTask;
use crate::thumbnail::ThumbnailPipeline;

const EXTERNAL_WARNING_TITLE: &str = "External server warning";
const EXTERNAL_WARNING_MESSAGE: &str = "If you choose to convert into a video format, some of \
     your files will be uploaded to an external server to be converted. Do you want to continue?";

/// Errors raised by orchestrator operations.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("archive task failed: {reason}")]
    Internal { reason: String },
}

/// The collection of in-flight conversion tasks.
pub struct Orchestrator {
    tasks: RwLock<Vec<Arc<ConversionTask>>>,
    registry: Arc<ConverterRegistry>,
    settings: Arc<dyn SettingsProvider>,
    prompt: Arc<dyn ConsentPrompt>,
    thumbnails: ThumbnailPipeline,
    config: OrchestratorConfig,
}

impl Orchestrator {
    pub fn new(
        registry: Arc<ConverterRegistry>,
        settings: Arc<dyn SettingsProvider>,
        prompt: Arc<dyn ConsentPrompt>,
        config: OrchestratorConfig,
    ) -> Self {
        let thumbnails =
            ThumbnailPipeline::new(config.thumbnail.clone(), config.thumbnail_concurrency);
        Self {
            tasks: RwLock::new(Vec::new()),
            registry,
            settings,
            prompt,
            thumbnails,
            config,
        }
    }

    /// Snapshot of the task collection, in insertion order.
    pub fn tasks(&self) -> Vec<Arc<ConversionTask>> {
        self.tasks.read().clone()
    }

    pub fn len(&self) -> usize {
        self.tasks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.read().is_empty()
    }

    /// Adds one or many raw files or pre-built tasks.
    ///
    /// Never fails the batch: unsupported or ambiguous inputs are logged
    /// and skipped. Returns the tasks that were added; note that a
    /// declined external-upload prompt may remove some of them again
    /// before this call returns.
    pub async fn add(&self, input: impl Into<AddInput>) -> Vec<Arc<ConversionTask>> {
        let mut added = Vec::new();
        match input.into() {
            AddInput::Path(path) => {
                if let Some(task) = self.add_path(path) {
                    added.push(task);
                }
            }
            AddInput::Paths(paths) => {
                for path in paths {
                    if let Some(task) = self.add_path(path) {
                        added.push(task);
                    }
                }
            }
            AddInput::Task(task) => {
                self.push_with_thumbnail(Arc::clone(&task));
                added.push(task);
            }
            AddInput::Tasks(tasks) => {
                for task in tasks {
                    self.push_with_thumbnail(Arc::clone(&task));
                    added.push(task);
                }
            }
        }

        self.confirm_external_uploads().await;
        added
    }

    /// Removes a task from the collection by id.
    pub fn remove(&self, id: Uuid) -> Option<Arc<ConversionTask>> {
        let mut tasks = self.tasks.write();
        let idx = tasks.iter().position(|t| t.id() == id)?;
        Some(tasks.remove(idx))
    }

    /// Runs format detection and converter/target auto-selection for one
    /// raw file, creating and scheduling its task.
    fn add_path(&self, path: PathBuf) -> Option<Arc<ConversionTask>> {
        let source = SourceFile::from_path(path);
        let Some(from) = source.extension() else {
            debug!(file = %source.file_name, "no extension found");
            return None;
        };

        let candidates = self.registry.candidates_for(&from);
        let Some(converter) = candidates.first() else {
            debug!(file = %source.file_name, "no converter found");
            // Keep the task listed as unsupported instead of vanishing.
            let task = Arc::new(ConversionTask::unsupported(source, from));
            self.tasks.write().push(Arc::clone(&task));
            return Some(task);
        };

        let to = converter
            .format_strings()
            .into_iter()
            .find(|f| *f != from);
        let Some(to) = to else {
            debug!(file = %source.file_name, "no output format found");
            return None;
        };

        let task = Arc::new(ConversionTask::new(
            source,
            from,
            Some(to),
            vec![Arc::clone(converter)],
        ));
        self.push_with_thumbnail(Arc::clone(&task));
        Some(task)
    }

    fn push_with_thumbnail(&self, task: Arc<ConversionTask>) {
        self.thumbnails
            .schedule(Arc::clone(&task), Arc::clone(&self.registry));
        self.tasks.write().push(task);
    }

    /// One-time consent gate for externally-processing converters.
    ///
    /// Fires at most once per add batch, before any upload can occur.
    /// Declining removes every task routed to a remote converter;
    /// accepting persists the acknowledgment through the settings
    /// collaborator.
    async fn confirm_external_uploads(&self) {
        if self.settings.external_upload_acknowledged() {
            return;
        }
        if !self.tasks.read().iter().any(|t| t.is_remote()) {
            return;
        }

        let accepted = self
            .prompt
            .confirm(
                EXTERNAL_WARNING_TITLE,
                EXTERNAL_WARNING_MESSAGE,
                "Yes",
                "No",
            )
            .await;

        if accepted {
            self.settings.set_external_upload_acknowledged(true);
        } else {
            let removed = {
                let mut tasks = self.tasks.write();
                let before = tasks.len();
                tasks.retain(|t| !t.is_remote());
                before - tasks.len()
            };
            info!(removed, "external upload declined; removed remote-routed tasks");
        }
    }

    /// Converts every task in the collection under one bounded queue.
    ///
    /// Resolves only once all submissions have settled; a single task's
    /// failure does not cancel or block the others.
    pub async fn convert_all(&self) -> ConvertAllReport {
        self.convert_all_with_progress(None).await
    }

    /// Like [`convert_all`](Self::convert_all), forwarding progress
    /// updates from backends that report them.
    pub async fn convert_all_with_progress(
        &self,
        progress_tx: Option<mpsc::Sender<ConversionProgress>>,
    ) -> ConvertAllReport {
        let tasks = self.tasks();
        // Settings are read at convert time, not cached earlier.
        let options = self.settings.conversion_options();
        let semaphore = Arc::new(Semaphore::new(self.config.max_parallel_conversions.max(1)));

        let conversions = tasks.iter().map(|task| {
            let task = Arc::clone(task);
            let semaphore = Arc::clone(&semaphore);
            let options = options.clone();
            let progress_tx = progress_tx.clone();
            async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return false,
                };
                match task.convert(&options, progress_tx).await {
                    Ok(()) => true,
                    Err(e) => {
                        warn!(file = %task.source().file_name, error = %e, "conversion failed");
                        false
                    }
                }
            }
        });

        let outcomes = join_all(conversions).await;
        let converted = outcomes.iter().filter(|ok| **ok).count();
        ConvertAllReport {
            total: outcomes.len(),
            converted,
            failed: outcomes.len() - converted,
        }
    }

    /// Packages every task result into a single zip archive.
    ///
    /// Tasks without a result are skipped with a logged error; a partial
    /// batch still produces a partial archive. Returns the archive path,
    /// or `None` when the collection is empty.
    pub async fn download_all(&self) -> Result<Option<PathBuf>, OrchestratorError> {
        let tasks = self.tasks();
        if tasks.is_empty() {
            return Ok(None);
        }

        let template = self.settings.filename_format();
        let mut entries = Vec::new();
        for task in &tasks {
            let Some(result) = task.result() else {
                error!(file = %task.source().file_name, "no result found");
                continue;
            };
            let Some(to) = task.to() else {
                error!(file = %task.source().file_name, "no target format for archive entry");
                continue;
            };
            let base = format_filename(&template, task.source().stem(), &to);
            // Templates without an extension placeholder still get one.
            let name = if base.ends_with(to.as_str()) {
                base
            } else {
                format!("{}{}", base, to)
            };
            match tokio::fs::read(&result.path).await {
                Ok(content) => entries.push(ArchiveEntry {
                    name,
                    last_modified: Utc::now(),
                    content,
                }),
                Err(e) => {
                    error!(file = %task.source().file_name, error = %e, "failed to read conversion output");
                }
            }
        }

        let archive_name = format!(
            "{}.zip",
            format_filename(&self.settings.filename_format(), BATCH_NAME, "")
        );
        tokio::fs::create_dir_all(&self.config.output_dir).await?;
        let path = self.config.output_dir.join(archive_name);

        let entry_count = entries.len();
        let write_path = path.clone();
        tokio::task::spawn_blocking(move || archive::write_zip(&entries, &write_path))
            .await
            .map_err(|e| OrchestratorError::Internal {
                reason: e.to_string(),
            })??;

        info!(archive = %path.display(), entries = entry_count, "wrote batch archive");
        Ok(Some(path))
    }

    /// Deduplicated union of all tasks' converters, in first-seen order.
    pub fn required_converters(&self) -> Vec<Arc<dyn Converter>> {
        Self::required_from(&self.tasks.read())
    }

    /// Whether every required converter is ready and nothing is
    /// processing. False for an empty collection.
    pub fn ready(&self) -> bool {
        let tasks = self.tasks.read();
        if tasks.is_empty() {
            return false;
        }
        Self::required_from(&tasks)
            .iter()
            .all(|c| c.status().is_ready())
            && tasks.iter().all(|t| !t.processing())
    }

    /// Whether every task has a result. False for an empty collection.
    pub fn results(&self) -> bool {
        let tasks = self.tasks.read();
        !tasks.is_empty() && tasks.iter().all(|t| t.result().is_some())
    }

    fn required_from(tasks: &[Arc<ConversionTask>]) -> Vec<Arc<dyn Converter>> {
        let mut required: Vec<Arc<dyn Converter>> = Vec::new();
        for task in tasks {
            for converter in task.converters() {
                if !required.iter().any(|seen| Arc::ptr_eq(seen, converter)) {
                    required.push(Arc::clone(converter));
                }
            }
        }
        required
    }
}
