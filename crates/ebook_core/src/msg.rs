use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Result of the startup converter discovery.
    ConverterLocated(Option<PathBuf>),
    SourceFolderSelected(PathBuf),
    OutputFolderSelected(PathBuf),
    /// "Convert FROM" selection changed.
    SourceFilterChanged(crate::SourceFilter),
    /// "Convert TO" selection changed.
    TargetFormatChanged(String),
    ScanClicked,
    /// Scanner finished; `Err` carries a user-facing reason.
    ScanCompleted(Result<Vec<PathBuf>, String>),
    ConvertClicked,
    StopClicked,
    /// The runner could not be started at all.
    ConversionStartFailed(String),
    /// Runner progress, 0 to 100.
    Progress(f32),
    StatusText(String),
    LogLine(String),
    ConversionCompleted(crate::Tally),
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
