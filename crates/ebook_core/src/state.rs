use std::path::{Path, PathBuf};

use crate::view_model::AppViewModel;

pub const DEFAULT_TARGET_FORMAT: &str = "MOBI";

/// Which files a scan selects.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SourceFilter {
    #[default]
    All,
    Only(String),
}

impl SourceFilter {
    pub fn label(&self) -> &str {
        match self {
            SourceFilter::All => "All Formats",
            SourceFilter::Only(name) => name,
        }
    }

    /// Format names this filter selects out of `known`, joined for display.
    /// Falls back to the label when no formats are known.
    pub fn describe(&self, known: &[String]) -> String {
        match self {
            SourceFilter::All if !known.is_empty() => known.join(", "),
            _ => self.label().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConverterStatus {
    /// Discovery has not reported yet.
    #[default]
    Unknown,
    Found(PathBuf),
    Missing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    /// A scan was requested and its result is pending.
    Scanning,
    Running,
    /// Stop was requested; the current file still finishes.
    Cancelling,
}

/// Counts reported when a run completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tally {
    pub successful: usize,
    pub failed: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    source_folder: Option<PathBuf>,
    output_folder: Option<PathBuf>,
    source_filter: SourceFilter,
    target_format: String,
    known_formats: Vec<String>,
    scanned_files: Vec<PathBuf>,
    converter: ConverterStatus,
    session: SessionState,
    convert_after_scan: bool,
    progress: f32,
    status: String,
    log: Vec<String>,
    last_tally: Option<Tally>,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            source_folder: None,
            output_folder: None,
            source_filter: SourceFilter::All,
            target_format: DEFAULT_TARGET_FORMAT.to_string(),
            known_formats: Vec::new(),
            scanned_files: Vec::new(),
            converter: ConverterStatus::Unknown,
            session: SessionState::Idle,
            convert_after_scan: false,
            progress: 0.0,
            status: "Ready - Select a folder and click 'Scan Folder'".to_string(),
            log: Vec::new(),
            last_tally: None,
            dirty: false,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// State that knows the full format table, so scans can name what they look for.
    pub fn with_formats(formats: Vec<String>) -> Self {
        Self {
            known_formats: formats,
            ..Self::default()
        }
    }

    pub fn view(&self) -> AppViewModel {
        let idle = self.session == SessionState::Idle;
        AppViewModel {
            session: self.session,
            source_folder: self.source_folder.clone(),
            output_folder: self.output_folder.clone(),
            source_filter: self.source_filter.clone(),
            target_format: self.target_format.clone(),
            files_found: self.scanned_files.len(),
            converter: self.converter.clone(),
            progress: self.progress,
            status: self.status.clone(),
            log: self.log.clone(),
            last_tally: self.last_tally,
            can_scan: idle,
            can_convert: idle && matches!(self.converter, ConverterStatus::Found(_)),
            can_stop: self.session == SessionState::Running,
            dirty: self.dirty,
        }
    }

    /// Returns whether the view changed since the last call, and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn session(&self) -> SessionState {
        self.session
    }

    pub fn source_folder(&self) -> Option<&Path> {
        self.source_folder.as_deref()
    }

    pub fn output_folder(&self) -> Option<&Path> {
        self.output_folder.as_deref()
    }

    pub fn source_filter(&self) -> &SourceFilter {
        &self.source_filter
    }

    pub fn target_format(&self) -> &str {
        &self.target_format
    }

    pub fn known_formats(&self) -> &[String] {
        &self.known_formats
    }

    pub fn scanned_files(&self) -> &[PathBuf] {
        &self.scanned_files
    }

    pub fn converter(&self) -> &ConverterStatus {
        &self.converter
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn push_log(&mut self, line: impl Into<String>) {
        self.log.push(line.into());
        self.mark_dirty();
    }

    pub(crate) fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
        self.mark_dirty();
    }

    pub(crate) fn set_progress(&mut self, percent: f32) {
        self.progress = percent.clamp(0.0, 100.0);
        self.mark_dirty();
    }

    pub(crate) fn set_session(&mut self, session: SessionState) {
        self.session = session;
        self.mark_dirty();
    }

    pub(crate) fn set_converter(&mut self, converter: ConverterStatus) {
        self.converter = converter;
        self.mark_dirty();
    }

    pub(crate) fn set_source_folder(&mut self, folder: PathBuf) {
        if self.output_folder.is_none() {
            self.output_folder = Some(folder.clone());
        }
        self.source_folder = Some(folder);
        self.scanned_files.clear();
        self.mark_dirty();
    }

    pub(crate) fn set_output_folder(&mut self, folder: PathBuf) {
        self.output_folder = Some(folder);
        self.mark_dirty();
    }

    pub(crate) fn set_source_filter(&mut self, filter: SourceFilter) {
        self.source_filter = filter;
        self.mark_dirty();
    }

    pub(crate) fn set_target_format(&mut self, format: String) {
        self.target_format = format;
        self.mark_dirty();
    }

    pub(crate) fn set_scanned_files(&mut self, files: Vec<PathBuf>) {
        self.scanned_files = files;
        self.mark_dirty();
    }

    pub(crate) fn set_convert_after_scan(&mut self, pending: bool) {
        self.convert_after_scan = pending;
    }

    pub(crate) fn take_convert_after_scan(&mut self) -> bool {
        std::mem::take(&mut self.convert_after_scan)
    }

    pub(crate) fn finish_run(&mut self, tally: Tally) {
        self.last_tally = Some(tally);
        self.session = SessionState::Idle;
        self.mark_dirty();
    }
}
