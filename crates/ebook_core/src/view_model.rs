use std::path::PathBuf;

use crate::{ConverterStatus, SessionState, SourceFilter, Tally};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub session: SessionState,
    pub source_folder: Option<PathBuf>,
    pub output_folder: Option<PathBuf>,
    pub source_filter: SourceFilter,
    pub target_format: String,
    pub files_found: usize,
    pub converter: ConverterStatus,
    /// Percent, 0 to 100.
    pub progress: f32,
    pub status: String,
    pub log: Vec<String>,
    pub last_tally: Option<Tally>,
    pub can_scan: bool,
    pub can_convert: bool,
    pub can_stop: bool,
    pub dirty: bool,
}
