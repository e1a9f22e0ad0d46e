//! Types for the orchestrator.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::task::ConversionTask;

/// Normalized input to [`Orchestrator::add`](super::Orchestrator::add).
///
/// Singular and batch submissions of raw paths or pre-built tasks all
/// funnel through the same add pipeline.
pub enum AddInput {
    Path(PathBuf),
    Paths(Vec<PathBuf>),
    Task(Arc<ConversionTask>),
    Tasks(Vec<Arc<ConversionTask>>),
}

impl From<PathBuf> for AddInput {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&Path> for AddInput {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

impl From<Vec<PathBuf>> for AddInput {
    fn from(paths: Vec<PathBuf>) -> Self {
        Self::Paths(paths)
    }
}

impl From<&[PathBuf]> for AddInput {
    fn from(paths: &[PathBuf]) -> Self {
        Self::Paths(paths.to_vec())
    }
}

impl From<Arc<ConversionTask>> for AddInput {
    fn from(task: Arc<ConversionTask>) -> Self {
        Self::Task(task)
    }
}

impl From<Vec<Arc<ConversionTask>>> for AddInput {
    fn from(tasks: Vec<Arc<ConversionTask>>) -> Self {
        Self::Tasks(tasks)
    }
}

/// Settlement report of a `convert_all` run.
///
/// The run resolves only once every submitted conversion has settled;
/// `converted + failed == total` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertAllReport {
    /// Number of tasks submitted.
    pub total: usize,
    /// Tasks that finished with a result.
    pub converted: usize,
    /// Tasks that settled with an error (including unsupported ones).
    pub failed: usize,
}
