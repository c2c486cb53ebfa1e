use crate::{AppState, ConverterStatus, Effect, Msg, Notice, SessionState, Severity, Tally};

/// How many scanned file names are echoed to the log.
pub const SCAN_PREVIEW_LIMIT: usize = 20;

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let busy = state.session() != SessionState::Idle;
    let effects = match msg {
        Msg::ConverterLocated(Some(path)) => {
            state.push_log(format!("Calibre found: {}", path.display()));
            state.set_converter(ConverterStatus::Found(path));
            Vec::new()
        }
        Msg::ConverterLocated(None) => {
            state.push_log("WARNING: Calibre not found!");
            state.push_log("Please install Calibre from: https://calibre-ebook.com/download");
            state.push_log("  Windows: Download installer from website");
            state.push_log("  Linux: sudo apt install calibre");
            state.push_log("  macOS: brew install calibre");
            state.set_converter(ConverterStatus::Missing);
            vec![notice(
                Severity::Warning,
                "Calibre Not Found",
                "Calibre's ebook-convert tool is required.\n\n\
                 Install from: https://calibre-ebook.com/download\n\n\
                 After installing, restart this application.",
            )]
        }
        Msg::SourceFolderSelected(_)
        | Msg::OutputFolderSelected(_)
        | Msg::SourceFilterChanged(_)
        | Msg::TargetFormatChanged(_)
        | Msg::ScanClicked
        | Msg::ConvertClicked
            if busy =>
        {
            Vec::new()
        }
        Msg::SourceFolderSelected(folder) => {
            state.push_log(format!("Source folder: {}", folder.display()));
            state.set_source_folder(folder);
            Vec::new()
        }
        Msg::OutputFolderSelected(folder) => {
            state.push_log(format!("Output folder: {}", folder.display()));
            state.set_output_folder(folder);
            Vec::new()
        }
        Msg::SourceFilterChanged(filter) => {
            state.push_log(format!("Filter changed to: {}", filter.label()));
            state.set_source_filter(filter);
            if state.source_folder().is_some() {
                request_scan(&mut state)
            } else {
                Vec::new()
            }
        }
        Msg::TargetFormatChanged(format) => {
            state.push_log(format!("Target format: {format}"));
            state.set_target_format(format);
            Vec::new()
        }
        Msg::ScanClicked => request_scan(&mut state),
        Msg::ScanCompleted(result) => apply_scan(&mut state, result),
        Msg::ConvertClicked => request_conversion(&mut state, true),
        Msg::StopClicked => {
            if state.session() == SessionState::Running {
                state.set_session(SessionState::Cancelling);
                state.push_log("Stopping conversion...");
                vec![Effect::CancelConversion]
            } else {
                Vec::new()
            }
        }
        Msg::ConversionStartFailed(reason) => {
            state.set_session(SessionState::Idle);
            state.set_status("Conversion failed to start");
            state.push_log(format!("ERROR: {reason}"));
            vec![notice(Severity::Error, "Error", reason)]
        }
        Msg::Progress(percent) => {
            state.set_progress(percent);
            Vec::new()
        }
        Msg::StatusText(text) => {
            state.set_status(text);
            Vec::new()
        }
        Msg::LogLine(line) => {
            state.push_log(line);
            Vec::new()
        }
        Msg::ConversionCompleted(tally) => {
            state.finish_run(tally);
            vec![notice(Severity::Info, "Conversion Complete", tally_message(&tally))]
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn request_scan(state: &mut AppState) -> Vec<Effect> {
    let Some(folder) = state.source_folder().map(ToOwned::to_owned) else {
        state.set_convert_after_scan(false);
        return vec![notice(
            Severity::Warning,
            "Warning",
            "Please select a source folder first!",
        )];
    };
    let filter = state.source_filter().clone();

    state.push_log("");
    state.push_log(format!("Scanning folder: {}", folder.display()));
    let looking_for = filter.describe(state.known_formats());
    state.push_log(format!("Looking for: {looking_for}"));
    state.set_session(SessionState::Scanning);
    vec![Effect::ScanFolder { folder, filter }]
}

fn apply_scan(
    state: &mut AppState,
    result: Result<Vec<std::path::PathBuf>, String>,
) -> Vec<Effect> {
    if state.session() == SessionState::Scanning {
        state.set_session(SessionState::Idle);
    }
    let convert_next = state.take_convert_after_scan();

    let files = match result {
        Ok(files) => files,
        Err(reason) => {
            state.push_log(format!("Scan failed: {reason}"));
            return vec![notice(Severity::Error, "Error", reason)];
        }
    };

    let count = files.len();
    state.set_status(format!("Found {count} ebook file(s)"));
    state.push_log(format!("Found {count} file(s):"));
    for file in files.iter().take(SCAN_PREVIEW_LIMIT) {
        let name = file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        state.push_log(format!("  - {name}"));
    }
    if count > SCAN_PREVIEW_LIMIT {
        state.push_log(format!("  ... and {} more", count - SCAN_PREVIEW_LIMIT));
    }
    state.set_scanned_files(files);

    if convert_next {
        request_conversion(state, false)
    } else {
        Vec::new()
    }
}

/// Validates the inputs of a run in the order a user fixes them. With
/// `allow_scan`, an empty file list triggers a scan and the check resumes once
/// the scan result arrives.
fn request_conversion(state: &mut AppState, allow_scan: bool) -> Vec<Effect> {
    let converter = match state.converter() {
        ConverterStatus::Found(path) => path.clone(),
        ConverterStatus::Unknown | ConverterStatus::Missing => {
            return vec![notice(Severity::Error, "Error", "Calibre not installed!")];
        }
    };
    if state.source_folder().is_none() {
        return vec![notice(Severity::Warning, "Warning", "Select a source folder!")];
    }
    let Some(output_folder) = state.output_folder().map(ToOwned::to_owned) else {
        return vec![notice(Severity::Warning, "Warning", "Select an output folder!")];
    };
    if state.scanned_files().is_empty() {
        if allow_scan {
            state.set_convert_after_scan(true);
            return request_scan(state);
        }
        return vec![notice(Severity::Warning, "Warning", "No ebook files found!")];
    }

    let files = state.scanned_files().to_vec();
    let target_format = state.target_format().to_string();
    state.set_session(SessionState::Running);
    state.set_progress(0.0);
    state.set_status("Starting conversion...");
    state.push_log(format!(
        "Converting {} file(s) to {} in {}",
        files.len(),
        target_format,
        output_folder.display()
    ));
    vec![Effect::StartConversion {
        files,
        output_folder,
        target_format,
        converter,
    }]
}

fn tally_message(tally: &Tally) -> String {
    format!(
        "Successful: {}\nFailed: {}\nSkipped: {}",
        tally.successful, tally.failed, tally.skipped
    )
}

fn notice(severity: Severity, title: &str, message: impl Into<String>) -> Effect {
    Effect::ShowNotice(Notice::new(severity, title, message))
}
