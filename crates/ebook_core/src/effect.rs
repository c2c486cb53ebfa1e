use std::path::PathBuf;

use crate::SourceFilter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    ScanFolder {
        folder: PathBuf,
        filter: SourceFilter,
    },
    StartConversion {
        files: Vec<PathBuf>,
        output_folder: PathBuf,
        target_format: String,
        converter: PathBuf,
    },
    CancelConversion,
    /// Blocking message to the user.
    ShowNotice(Notice),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: Severity,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn new(severity: Severity, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            title: title.into(),
            message: message.into(),
        }
    }
}
