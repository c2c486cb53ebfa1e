use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};

use engine_logging::{engine_error, engine_info};
use thiserror::Error;

use crate::convert::{ConvertSettings, Converter, ProcessConverter};
use crate::runner::{run_batch, ChannelEventSink, RunState};
use crate::{JobEvent, JobRequest, RunSummary};

#[derive(Debug, Error)]
pub enum StartError {
    #[error("cannot create output folder {path:?}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot start worker: {0}")]
    Worker(#[source] io::Error),
}

/// Starts batch runs, each on its own background thread.
pub struct BatchRunner;

impl BatchRunner {
    /// Runs `request` with the external converter named in the request.
    pub fn start(request: JobRequest, settings: ConvertSettings) -> Result<RunHandle, StartError> {
        let converter = ProcessConverter::new(request.converter.clone(), settings);
        Self::start_with(request, Arc::new(converter))
    }

    /// Runs `request` with any [`Converter`]; the output folder is created first.
    pub fn start_with(
        request: JobRequest,
        converter: Arc<dyn Converter>,
    ) -> Result<RunHandle, StartError> {
        create_output_folder(&request.output_dir)?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(StartError::Worker)?;

        let state = Arc::new(RunState::new());
        let (event_tx, event_rx) = mpsc::channel();
        let worker_state = state.clone();

        let thread = thread::Builder::new()
            .name("batch-runner".to_string())
            .spawn(move || {
                let sink = ChannelEventSink::new(event_tx);
                runtime.block_on(run_batch(
                    &request,
                    converter.as_ref(),
                    worker_state.as_ref(),
                    &sink,
                ))
            })
            .map_err(StartError::Worker)?;

        engine_info!("Batch runner thread started");
        Ok(RunHandle {
            state,
            event_rx,
            thread: Some(thread),
        })
    }
}

/// Creates `dir` and any missing parents. An existing non-directory fails.
fn create_output_folder(dir: &Path) -> Result<(), StartError> {
    fs::create_dir_all(dir).map_err(|source| StartError::OutputDir {
        path: dir.to_path_buf(),
        source,
    })
}

/// Host-side view of one run: the event stream plus the cancel flag.
pub struct RunHandle {
    state: Arc<RunState>,
    event_rx: mpsc::Receiver<JobEvent>,
    thread: Option<JoinHandle<RunSummary>>,
}

impl RunHandle {
    pub fn cancel(&self) {
        self.state.request_cancel();
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    pub fn try_recv(&self) -> Option<JobEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Every event currently queued, in arrival order.
    pub fn drain(&self) -> Vec<JobEvent> {
        self.event_rx.try_iter().collect()
    }

    /// Blocks until the run ends. `None` if the worker thread panicked.
    pub fn join(mut self) -> Option<RunSummary> {
        let thread = self.thread.take()?;
        match thread.join() {
            Ok(summary) => Some(summary),
            Err(_) => {
                engine_error!("Batch runner thread panicked");
                None
            }
        }
    }
}
