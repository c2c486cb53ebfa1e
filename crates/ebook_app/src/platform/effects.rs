use std::path::PathBuf;
use std::sync::mpsc;

use ebook_core::{Effect, Msg, Notice, SourceFilter, Tally};
use ebook_engine::{
    format_names, scan_folder, BatchRunner, ConvertSettings, JobEvent, JobItem, JobRequest,
    RunHandle, RunSummary, ScanError,
};
use engine_logging::{engine_info, engine_warn};

/// Executes core effects against the engine and feeds results back as messages.
pub struct EffectRunner {
    msg_tx: mpsc::Sender<Msg>,
    settings: ConvertSettings,
    run: Option<RunHandle>,
}

impl EffectRunner {
    pub fn new(msg_tx: mpsc::Sender<Msg>, settings: ConvertSettings) -> Self {
        Self {
            msg_tx,
            settings,
            run: None,
        }
    }

    /// Runs `effects` in order and hands back the notices the user must see.
    pub fn enqueue(&mut self, effects: Vec<Effect>) -> Vec<Notice> {
        let mut notices = Vec::new();
        for effect in effects {
            match effect {
                Effect::ScanFolder { folder, filter } => {
                    engine_info!("ScanFolder folder={:?} filter={}", folder, filter.label());
                    let result = scan(&folder, &filter);
                    let _ = self.msg_tx.send(Msg::ScanCompleted(result));
                }
                Effect::StartConversion {
                    files,
                    output_folder,
                    target_format,
                    converter,
                } => {
                    engine_info!(
                        "StartConversion files={} format={} output={:?}",
                        files.len(),
                        target_format,
                        output_folder
                    );
                    if let Err(reason) =
                        self.start(files, output_folder, &target_format, converter)
                    {
                        engine_warn!("Conversion did not start: {}", reason);
                        let _ = self.msg_tx.send(Msg::ConversionStartFailed(reason));
                    }
                }
                Effect::CancelConversion => {
                    if let Some(run) = &self.run {
                        engine_info!("CancelConversion");
                        run.cancel();
                    }
                }
                Effect::ShowNotice(notice) => notices.push(notice),
            }
        }
        notices
    }

    pub fn has_active_run(&self) -> bool {
        self.run.is_some()
    }

    /// Drains queued runner events, forwards them as messages and returns
    /// them untouched for echoing. The run is joined once it completes.
    pub fn poll(&mut self) -> Vec<JobEvent> {
        let Some(run) = &self.run else {
            return Vec::new();
        };
        let events = run.drain();

        let mut completed = false;
        for event in &events {
            completed |= matches!(event, JobEvent::Completed(_));
            let _ = self.msg_tx.send(map_event(event.clone()));
        }
        if completed {
            if let Some(run) = self.run.take() {
                let _ = run.join();
            }
        }
        events
    }

    fn start(
        &mut self,
        files: Vec<PathBuf>,
        output_folder: PathBuf,
        target_format: &str,
        converter: PathBuf,
    ) -> Result<(), String> {
        let items = files.into_iter().map(JobItem::new).collect();
        let request = JobRequest::new(items, output_folder, target_format, converter)
            .map_err(|err| err.to_string())?;
        let handle =
            BatchRunner::start(request, self.settings.clone()).map_err(|err| err.to_string())?;
        self.run = Some(handle);
        Ok(())
    }
}

fn scan(folder: &std::path::Path, filter: &SourceFilter) -> Result<Vec<PathBuf>, String> {
    let names = filter_format_names(filter);
    match scan_folder(folder, &names) {
        Ok(items) => Ok(items.into_iter().map(|item| item.path().to_path_buf()).collect()),
        Err(ScanError::NotADirectory(_)) => Err("Source folder does not exist!".to_string()),
        Err(err) => Err(err.to_string()),
    }
}

pub(crate) fn filter_format_names(filter: &SourceFilter) -> Vec<String> {
    match filter {
        SourceFilter::All => format_names().map(str::to_string).collect(),
        SourceFilter::Only(name) => vec![name.clone()],
    }
}

pub(crate) fn map_event(event: JobEvent) -> Msg {
    match event {
        JobEvent::Progress(percent) => Msg::Progress(percent),
        JobEvent::StatusText(text) => Msg::StatusText(text),
        JobEvent::LogLine(line) => Msg::LogLine(line),
        JobEvent::Completed(summary) => Msg::ConversionCompleted(map_summary(summary)),
    }
}

fn map_summary(summary: RunSummary) -> Tally {
    Tally {
        successful: summary.successful,
        failed: summary.failed,
        skipped: summary.skipped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_formats_filter_selects_whole_table() {
        let names = filter_format_names(&SourceFilter::All);
        assert_eq!(names.len(), 19);
        assert!(names.contains(&"EPUB".to_string()));
        assert_eq!(
            filter_format_names(&SourceFilter::Only("PDF".to_string())),
            vec!["PDF".to_string()]
        );
    }

    #[test]
    fn completed_event_maps_to_tally() {
        let msg = map_event(JobEvent::Completed(RunSummary {
            successful: 2,
            failed: 1,
            skipped: 3,
        }));
        assert_eq!(
            msg,
            Msg::ConversionCompleted(Tally {
                successful: 2,
                failed: 1,
                skipped: 3,
            })
        );
    }

    #[test]
    fn missing_source_folder_becomes_user_message() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = scan(&dir.path().join("nope"), &SourceFilter::All);
        assert_eq!(result, Err("Source folder does not exist!".to_string()));
    }
}
