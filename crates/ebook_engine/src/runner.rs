use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;

use engine_logging::{engine_info, engine_warn};
use futures_util::FutureExt;

use crate::convert::Converter;
use crate::{FailureKind, JobEvent, JobRequest, RunSummary};

const RULE_WIDTH: usize = 50;

/// Flags shared between a run and its host. The host only ever requests
/// cancellation; the run owns `running`.
#[derive(Debug, Default)]
pub struct RunState {
    running: AtomicBool,
    cancel_requested: AtomicBool,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn is_cancel_requested(&self) -> bool {
        self.cancel_requested.load(Ordering::Acquire)
    }

    /// Stop after the file currently being converted.
    pub fn request_cancel(&self) {
        self.cancel_requested.store(true, Ordering::Release);
    }

    fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::Release);
    }
}

pub trait EventSink: Send + Sync {
    fn emit(&self, event: JobEvent);
}

pub struct ChannelEventSink {
    tx: mpsc::Sender<JobEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::Sender<JobEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: JobEvent) {
        // A host that went away simply stops listening.
        let _ = self.tx.send(event);
    }
}

/// Converts every item of `request` in order, one converter call per file.
///
/// Per-file failures are logged and counted; they never end the batch.
/// Cancellation is honoured only between files, and a cancel already set on
/// `state` ends the batch before the first one. The last event emitted is
/// always [`JobEvent::Completed`].
pub async fn run_batch(
    request: &JobRequest,
    converter: &dyn Converter,
    state: &RunState,
    sink: &dyn EventSink,
) -> RunSummary {
    state.set_running(true);
    let mut summary = RunSummary::default();
    let total = request.items.len();
    let format_name = request.target_format.name;

    engine_info!(
        "Batch started: {} item(s) -> {} in {:?}",
        total,
        format_name,
        request.output_dir
    );

    for (index, item) in request.items.iter().enumerate() {
        let position = index + 1;
        let file_name = item.file_name();

        if state.is_cancel_requested() {
            engine_info!("Batch cancelled before item {}/{}", position, total);
            sink.emit(JobEvent::StatusText("Conversion cancelled".to_string()));
            break;
        }

        if request.is_already_target(item) {
            sink.emit(JobEvent::LogLine(format!(
                "Skipping (already {format_name}): {file_name}"
            )));
            summary.skipped += 1;
            continue;
        }

        let percent = position as f32 / total as f32 * 100.0;
        sink.emit(JobEvent::Progress(percent));
        sink.emit(JobEvent::StatusText(format!(
            "Converting {position}/{total}: {file_name}"
        )));
        sink.emit(JobEvent::LogLine(format!("Converting: {file_name}")));

        let output = request.output_path_for(item);
        let result = AssertUnwindSafe(converter.convert(item.path(), &output))
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| Err(FailureKind::Panicked(panic_message(payload))));

        match result {
            Ok(()) => {
                let output_name = output
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default();
                engine_info!("Converted {:?} -> {:?}", item.path(), output);
                sink.emit(JobEvent::LogLine(format!("  -> Success: {output_name}")));
                summary.successful += 1;
            }
            Err(failure) => {
                engine_warn!("Conversion of {:?} failed: {}", item.path(), failure);
                sink.emit(JobEvent::LogLine(failure_line(&failure)));
                summary.failed += 1;
            }
        }
    }

    sink.emit(JobEvent::Progress(100.0));
    sink.emit(JobEvent::StatusText("Conversion complete!".to_string()));
    for line in summary_block(&summary) {
        sink.emit(JobEvent::LogLine(line));
    }
    sink.emit(JobEvent::Completed(summary));

    engine_info!(
        "Batch finished: successful={} failed={} skipped={}",
        summary.successful,
        summary.failed,
        summary.skipped
    );
    state.set_running(false);
    summary
}

fn failure_line(failure: &FailureKind) -> String {
    match failure {
        FailureKind::ExitStatus { stderr, .. } => {
            let detail = if stderr.trim().is_empty() {
                "Unknown error"
            } else {
                stderr.as_str()
            };
            format!("  -> FAILED: {detail}")
        }
        FailureKind::Timeout { .. } => "  -> TIMEOUT: File took too long".to_string(),
        FailureKind::Invocation(_) | FailureKind::Panicked(_) => format!("  -> ERROR: {failure}"),
    }
}

fn summary_block(summary: &RunSummary) -> Vec<String> {
    let rule = "=".repeat(RULE_WIDTH);
    vec![
        String::new(),
        rule.clone(),
        "CONVERSION COMPLETE".to_string(),
        format!("  Successful: {}", summary.successful),
        format!("  Failed: {}", summary.failed),
        format!("  Skipped: {}", summary.skipped),
        rule,
    ]
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
