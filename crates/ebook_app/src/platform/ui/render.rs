use std::io::{self, Write};

use chrono::Local;
use ebook_core::{AppViewModel, Notice, SessionState, Severity};
use ebook_engine::JobEvent;

use super::OutputMode;

/// Draws view-model changes as terminal lines.
///
/// Only what changed since the previous call is written: new log lines,
/// and the status line when its text or progress moved.
pub struct TerminalRenderer<W: Write, E: Write> {
    out: W,
    err: E,
    mode: OutputMode,
    printed_log: usize,
    last_status: Option<(String, u32)>,
}

impl<W: Write, E: Write> TerminalRenderer<W, E> {
    pub fn new(out: W, err: E, mode: OutputMode) -> Self {
        Self {
            out,
            err,
            mode,
            printed_log: 0,
            last_status: None,
        }
    }

    pub fn render(&mut self, view: &AppViewModel) -> io::Result<()> {
        if self.mode == OutputMode::JsonEvents {
            // stdout carries the event stream only.
            self.printed_log = view.log.len();
            return Ok(());
        }

        let timestamp = Local::now().format("%H:%M:%S");
        for line in view.log.iter().skip(self.printed_log) {
            writeln!(self.out, "[{timestamp}] {line}")?;
        }
        self.printed_log = view.log.len();

        if matches!(view.session, SessionState::Running | SessionState::Cancelling) {
            let tenths = (view.progress * 10.0).round() as u32;
            let status = (view.status.clone(), tenths);
            if self.last_status.as_ref() != Some(&status) {
                writeln!(
                    self.out,
                    "{} {:>5.1}% {}",
                    progress_bar(view.progress),
                    view.progress,
                    view.status
                )?;
                self.last_status = Some(status);
            }
        }
        self.out.flush()
    }

    pub fn notice(&mut self, notice: &Notice) -> io::Result<()> {
        let label = match notice.severity {
            Severity::Info => "Info",
            Severity::Warning => "Warning",
            Severity::Error => "Error",
        };
        writeln!(self.err, "[{label}] {}", notice.title)?;
        for line in notice.message.lines() {
            writeln!(self.err, "    {line}")?;
        }
        self.err.flush()
    }

    pub fn json_event(&mut self, event: &JobEvent) -> io::Result<()> {
        if self.mode != OutputMode::JsonEvents {
            return Ok(());
        }
        let line = serde_json::to_string(event).map_err(io::Error::other)?;
        writeln!(self.out, "{line}")?;
        self.out.flush()
    }

    #[cfg(test)]
    pub(crate) fn into_parts(self) -> (W, E) {
        (self.out, self.err)
    }
}

const BAR_WIDTH: usize = 24;

fn progress_bar(percent: f32) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * BAR_WIDTH as f32).round() as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}
