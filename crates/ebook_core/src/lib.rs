//! Ebook converter core: pure state machine and view-model helpers.
mod effect;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::{Effect, Notice, Severity};
pub use msg::Msg;
pub use state::{
    AppState, ConverterStatus, SessionState, SourceFilter, Tally, DEFAULT_TARGET_FORMAT,
};
pub use update::{update, SCAN_PREVIEW_LIMIT};
pub use view_model::AppViewModel;
