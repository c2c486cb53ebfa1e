use std::io::Write;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use ebook_core::{update, AppState, Msg, Notice, SessionState, SourceFilter, Tally};
use ebook_engine::{format_names, ConvertSettings};
use engine_logging::{engine_debug, engine_info, engine_warn};

use super::effects::EffectRunner;
use super::ui::render::TerminalRenderer;
use super::ui::OutputMode;

/// Shell settings passed in by the caller; nothing here is global.
#[derive(Debug, Clone)]
pub struct ShellConfig {
    pub poll_interval: Duration,
    pub output: OutputMode,
    pub convert: ConvertSettings,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(100),
            output: OutputMode::Text,
            convert: ConvertSettings::default(),
        }
    }
}

/// What a single `convert` invocation asks for.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    pub source: PathBuf,
    pub output: Option<PathBuf>,
    pub from: SourceFilter,
    pub to: String,
    /// Discovery result; `None` means no converter is available.
    pub converter: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// `None` when no run took place.
    pub tally: Option<Tally>,
    pub notices: Vec<Notice>,
}

/// Drives the core state machine from the terminal.
///
/// Messages arrive on one channel: from the caller, from effect results
/// and from the Ctrl-C handler. Runner events are polled on a fixed
/// interval, the way a UI tick would.
pub struct Shell<W: Write, E: Write> {
    state: AppState,
    msg_rx: mpsc::Receiver<Msg>,
    effects: EffectRunner,
    renderer: TerminalRenderer<W, E>,
    poll_interval: Duration,
    notices: Vec<Notice>,
}

impl<W: Write, E: Write> Shell<W, E> {
    pub fn new(config: ShellConfig, out: W, err: E) -> (Self, mpsc::Sender<Msg>) {
        let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
        let shell = Self {
            state: AppState::with_formats(format_names().map(str::to_string).collect()),
            msg_rx,
            effects: EffectRunner::new(msg_tx.clone(), config.convert),
            renderer: TerminalRenderer::new(out, err, config.output),
            poll_interval: config.poll_interval,
            notices: Vec::new(),
        };
        (shell, msg_tx)
    }

    pub fn run(mut self, options: ConvertOptions) -> anyhow::Result<RunReport> {
        let output = options.output.unwrap_or_else(|| options.source.clone());
        // Filter goes first so it does not trigger a rescan of the source.
        for msg in [
            Msg::ConverterLocated(options.converter),
            Msg::SourceFilterChanged(options.from),
            Msg::TargetFormatChanged(options.to),
            Msg::SourceFolderSelected(options.source),
            Msg::OutputFolderSelected(output),
        ] {
            self.dispatch(msg);
        }

        if !self.state.view().can_convert {
            return Ok(self.finish());
        }
        self.dispatch(Msg::ConvertClicked);

        loop {
            let mut handled = 0;
            while let Ok(msg) = self.msg_rx.try_recv() {
                self.dispatch(msg);
                handled += 1;
            }

            let events = self.effects.poll();
            for event in &events {
                if let Err(err) = self.renderer.json_event(event) {
                    engine_warn!("Failed to write event: {}", err);
                }
            }

            let settled = self.state.session() == SessionState::Idle
                && !self.effects.has_active_run();
            if handled == 0 && events.is_empty() && settled {
                break;
            }
            if handled == 0 && events.is_empty() {
                thread::sleep(self.poll_interval);
            }
        }

        Ok(self.finish())
    }

    fn dispatch(&mut self, msg: Msg) {
        engine_debug!("dispatch {:?}", msg);
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let was_dirty = state.consume_dirty();
        self.state = state;

        if !effects.is_empty() {
            engine_info!("Executing {} effect(s)", effects.len());
        }
        for notice in self.effects.enqueue(effects) {
            if let Err(err) = self.renderer.notice(&notice) {
                engine_warn!("Failed to show notice: {}", err);
            }
            self.notices.push(notice);
        }

        if was_dirty {
            if let Err(err) = self.renderer.render(&self.state.view()) {
                engine_warn!("Failed to render: {}", err);
            }
        }
    }

    fn finish(self) -> RunReport {
        RunReport {
            tally: self.state.view().last_tally,
            notices: self.notices,
        }
    }
}
