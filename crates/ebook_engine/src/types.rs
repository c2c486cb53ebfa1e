use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::format::{find_format, ConvertibleFormat};

/// One input file slated for conversion.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobItem {
    path: PathBuf,
}

impl JobItem {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Lower-cased extension without the dot, if any.
    pub fn extension(&self) -> Option<String> {
        self.path
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error("unknown target format: {0}")]
    UnknownFormat(String),
}

/// Everything needed for one batch run. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRequest {
    pub items: Vec<JobItem>,
    pub output_dir: PathBuf,
    pub target_format: &'static ConvertibleFormat,
    pub converter: PathBuf,
}

impl JobRequest {
    pub fn new(
        items: Vec<JobItem>,
        output_dir: impl Into<PathBuf>,
        target_format: &str,
        converter: impl Into<PathBuf>,
    ) -> Result<Self, RequestError> {
        let target_format = find_format(target_format)
            .ok_or_else(|| RequestError::UnknownFormat(target_format.to_string()))?;
        Ok(Self {
            items,
            output_dir: output_dir.into(),
            target_format,
            converter: converter.into(),
        })
    }

    /// `output_dir / (stem + "." + target extension)`
    pub fn output_path_for(&self, item: &JobItem) -> PathBuf {
        self.output_dir.join(format!(
            "{}.{}",
            item.stem(),
            self.target_format.target_extension()
        ))
    }

    /// True when the item already carries the target format's extension.
    pub fn is_already_target(&self, item: &JobItem) -> bool {
        item.extension().as_deref() == Some(self.target_format.target_extension().as_str())
    }
}

/// Final tally of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub successful: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.successful + self.failed + self.skipped
    }
}

/// Progress, status and log information streamed from a run to its host.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum JobEvent {
    /// Percent complete, 0 to 100.
    Progress(f32),
    StatusText(String),
    LogLine(String),
    /// Always the last event of a run.
    Completed(RunSummary),
}

/// Why a single file failed to convert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// The converter ran and exited non-zero. `stderr` is already truncated.
    ExitStatus { code: Option<i32>, stderr: String },
    Timeout { limit: Duration },
    /// The converter could not be started or waited on.
    Invocation(String),
    /// The converter implementation panicked.
    Panicked(String),
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::ExitStatus { code, stderr } => match code {
                Some(code) => write!(f, "exit code {code}: {stderr}"),
                None => write!(f, "terminated by signal: {stderr}"),
            },
            FailureKind::Timeout { limit } => write!(f, "timed out after {}s", limit.as_secs()),
            FailureKind::Invocation(message) => write!(f, "{message}"),
            FailureKind::Panicked(message) => write!(f, "converter panicked: {message}"),
        }
    }
}
