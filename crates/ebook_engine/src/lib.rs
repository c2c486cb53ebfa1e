//! Ebook engine: folder scanning, converter discovery and the batch job runner.
mod convert;
mod discover;
mod engine;
mod format;
mod icon;
mod runner;
mod scan;
mod types;

pub use convert::{stderr_excerpt, ConvertSettings, Converter, ProcessConverter};
pub use discover::{locate, locate_blocking, ConverterLocation, DiscoverySettings};
pub use engine::{BatchRunner, RunHandle, StartError};
pub use format::{find_format, format_names, formats_named, ConvertibleFormat, FORMATS};
pub use icon::{
    encode_png, lerp_color, render_icon, write_icon, IconError, Rgb, BACKGROUND_BOTTOM,
    BACKGROUND_TOP, LEFT_PAGE, RIGHT_PAGE,
};
pub use runner::{run_batch, ChannelEventSink, EventSink, RunState};
pub use scan::{scan_folder, ScanError};
pub use types::{FailureKind, JobEvent, JobItem, JobRequest, RequestError, RunSummary};
