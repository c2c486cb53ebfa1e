use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc, Mutex};
use std::time::{Duration, Instant};

use ebook_engine::{
    BatchRunner, Converter, FailureKind, JobEvent, JobItem, JobRequest, RunHandle, RunSummary,
    StartError,
};
use tempfile::TempDir;

/// Blocks inside the first conversion until the test releases it.
struct GatedConverter {
    started: Mutex<mpsc::Sender<()>>,
    release: Mutex<mpsc::Receiver<()>>,
}

#[async_trait::async_trait]
impl Converter for GatedConverter {
    async fn convert(&self, _input: &Path, _output: &Path) -> Result<(), FailureKind> {
        let _ = self.started.lock().unwrap().send(());
        let _ = self.release.lock().unwrap().recv_timeout(Duration::from_secs(10));
        Ok(())
    }
}

struct AlwaysOk;

#[async_trait::async_trait]
impl Converter for AlwaysOk {
    async fn convert(&self, _input: &Path, _output: &Path) -> Result<(), FailureKind> {
        Ok(())
    }
}

fn items(names: &[&str]) -> Vec<JobItem> {
    names
        .iter()
        .map(|name| JobItem::new(PathBuf::from("/books").join(name)))
        .collect()
}

fn collect_until_completed(handle: &RunHandle) -> Vec<JobEvent> {
    let mut events = Vec::new();
    let deadline = Instant::now() + Duration::from_secs(10);
    while !matches!(events.last(), Some(JobEvent::Completed(_))) {
        assert!(Instant::now() < deadline, "run did not complete");
        match handle.try_recv() {
            Some(event) => events.push(event),
            None => std::thread::sleep(Duration::from_millis(10)),
        }
    }
    events
}

#[test]
fn creates_missing_output_folder_before_running() {
    let temp = TempDir::new().unwrap();
    let output = temp.path().join("a").join("b");
    let request = JobRequest::new(items(&["x.mobi"]), &output, "EPUB", "unused").unwrap();

    let handle = BatchRunner::start_with(request, Arc::new(AlwaysOk)).unwrap();
    let events = collect_until_completed(&handle);

    assert!(output.is_dir());
    assert_eq!(
        events.last(),
        Some(&JobEvent::Completed(RunSummary {
            successful: 1,
            failed: 0,
            skipped: 0,
        }))
    );
    assert!(handle.join().is_some());
}

#[test]
fn output_path_that_is_a_file_refuses_to_start() {
    let temp = TempDir::new().unwrap();
    let not_a_dir = temp.path().join("file");
    fs::write(&not_a_dir, b"x").unwrap();
    let request = JobRequest::new(items(&["x.mobi"]), &not_a_dir, "EPUB", "unused").unwrap();

    let err = match BatchRunner::start_with(request, Arc::new(AlwaysOk)) {
        Err(err) => err,
        Ok(_) => panic!("run started with a file as output folder"),
    };
    let StartError::OutputDir { path, .. } = &err else {
        panic!("unexpected error: {err}");
    };
    assert_eq!(path, &not_a_dir);
    assert!(err.to_string().starts_with("cannot create output folder"));
}

#[test]
fn existing_output_folder_keeps_its_files() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("keep.txt"), b"keep").unwrap();
    let request = JobRequest::new(items(&["x.mobi"]), temp.path(), "EPUB", "unused").unwrap();

    let handle = BatchRunner::start_with(request, Arc::new(AlwaysOk)).unwrap();
    collect_until_completed(&handle);
    handle.join();

    assert_eq!(fs::read(temp.path().join("keep.txt")).unwrap(), b"keep");
}

#[test]
fn cancel_lets_current_file_finish_then_stops() {
    let temp = TempDir::new().unwrap();
    let (started_tx, started_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let converter = GatedConverter {
        started: Mutex::new(started_tx),
        release: Mutex::new(release_rx),
    };
    let request = JobRequest::new(
        items(&["1.mobi", "2.mobi", "3.mobi"]),
        temp.path(),
        "EPUB",
        "unused",
    )
    .unwrap();

    let handle = BatchRunner::start_with(request, Arc::new(converter)).unwrap();
    started_rx.recv_timeout(Duration::from_secs(10)).unwrap();
    assert!(handle.is_running());
    handle.cancel();
    assert!(handle.state().is_cancel_requested());
    release_tx.send(()).unwrap();

    let events = collect_until_completed(&handle);
    let summary = handle.join().unwrap();

    assert_eq!(
        summary,
        RunSummary {
            successful: 1,
            failed: 0,
            skipped: 0,
        }
    );
    assert!(events.contains(&JobEvent::StatusText("Conversion cancelled".to_string())));
    assert!(!events.contains(&JobEvent::StatusText("Converting 2/3: 2.mobi".to_string())));
}
