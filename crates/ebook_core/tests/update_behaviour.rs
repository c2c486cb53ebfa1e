use std::path::PathBuf;
use std::sync::Once;

use ebook_core::{
    update, AppState, ConverterStatus, Effect, Msg, Notice, SessionState, Severity, SourceFilter,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

fn apply(state: AppState, msgs: Vec<Msg>) -> (AppState, Vec<Effect>) {
    msgs.into_iter().fold((state, Vec::new()), |(state, _), msg| update(state, msg))
}

fn notices(effects: &[Effect]) -> Vec<&Notice> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::ShowNotice(notice) => Some(notice),
            _ => None,
        })
        .collect()
}

#[test]
fn missing_converter_logs_hints_and_shows_one_warning() {
    init_logging();
    let (mut state, effects) = update(AppState::new(), Msg::ConverterLocated(None));

    let shown = notices(&effects);
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].severity, Severity::Warning);
    assert_eq!(shown[0].title, "Calibre Not Found");
    assert_eq!(effects.len(), 1);

    let view = state.view();
    assert_eq!(view.converter, ConverterStatus::Missing);
    assert!(!view.can_convert);
    assert!(view.can_scan);
    assert!(view.log.iter().any(|line| line.contains("calibre-ebook.com")));
    assert!(state.consume_dirty());
}

#[test]
fn convert_is_blocked_without_converter() {
    init_logging();
    let (state, _) = apply(
        AppState::new(),
        vec![
            Msg::ConverterLocated(None),
            Msg::SourceFolderSelected(PathBuf::from("/books")),
        ],
    );
    let (state, effects) = update(state, Msg::ConvertClicked);

    assert_eq!(
        effects,
        vec![Effect::ShowNotice(Notice::new(
            Severity::Error,
            "Error",
            "Calibre not installed!"
        ))]
    );
    assert_eq!(state.session(), SessionState::Idle);
}

#[test]
fn found_converter_is_logged() {
    init_logging();
    let (state, effects) = update(
        AppState::new(),
        Msg::ConverterLocated(Some(PathBuf::from("ebook-convert"))),
    );

    assert!(effects.is_empty());
    assert_eq!(
        state.view().converter,
        ConverterStatus::Found(PathBuf::from("ebook-convert"))
    );
    assert_eq!(state.view().log, vec!["Calibre found: ebook-convert".to_string()]);
}

#[test]
fn source_folder_defaults_output_folder() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::SourceFolderSelected(PathBuf::from("/books")));
    assert_eq!(state.view().output_folder, Some(PathBuf::from("/books")));

    let (state, _) = update(state, Msg::OutputFolderSelected(PathBuf::from("/out")));
    let (state, _) = update(state, Msg::SourceFolderSelected(PathBuf::from("/more")));
    assert_eq!(state.view().output_folder, Some(PathBuf::from("/out")));
    assert_eq!(state.view().source_folder, Some(PathBuf::from("/more")));
}

#[test]
fn scan_without_source_warns() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::ScanClicked);

    assert_eq!(
        effects,
        vec![Effect::ShowNotice(Notice::new(
            Severity::Warning,
            "Warning",
            "Please select a source folder first!"
        ))]
    );
    assert_eq!(state.session(), SessionState::Idle);
}

#[test]
fn filter_change_rescans_only_with_a_source() {
    init_logging();
    let only_epub = SourceFilter::Only("EPUB".to_string());

    let (state, effects) = update(AppState::new(), Msg::SourceFilterChanged(only_epub.clone()));
    assert!(effects.is_empty());
    assert_eq!(state.view().source_filter, only_epub);

    let (state, _) = update(state, Msg::SourceFolderSelected(PathBuf::from("/books")));
    let (state, effects) = update(state, Msg::SourceFilterChanged(SourceFilter::All));
    assert_eq!(
        effects,
        vec![Effect::ScanFolder {
            folder: PathBuf::from("/books"),
            filter: SourceFilter::All,
        }]
    );
    assert_eq!(state.session(), SessionState::Scanning);
}

#[test]
fn scan_result_is_summarised_in_log() {
    init_logging();
    let (state, _) = apply(
        AppState::new(),
        vec![
            Msg::SourceFolderSelected(PathBuf::from("/books")),
            Msg::ScanClicked,
        ],
    );
    let files: Vec<PathBuf> = (0..23)
        .map(|i| PathBuf::from(format!("/books/{i:02}.epub")))
        .collect();
    let (state, effects) = update(state, Msg::ScanCompleted(Ok(files)));

    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(view.session, SessionState::Idle);
    assert_eq!(view.files_found, 23);
    assert_eq!(view.status, "Found 23 ebook file(s)");
    assert!(view.log.contains(&"Found 23 file(s):".to_string()));
    assert!(view.log.contains(&"  - 19.epub".to_string()));
    assert!(!view.log.contains(&"  - 20.epub".to_string()));
    assert_eq!(view.log.last(), Some(&"  ... and 3 more".to_string()));
}

#[test]
fn scan_error_is_shown_to_user() {
    init_logging();
    let (state, _) = apply(
        AppState::new(),
        vec![
            Msg::SourceFolderSelected(PathBuf::from("/gone")),
            Msg::ScanClicked,
        ],
    );
    let (state, effects) = update(
        state,
        Msg::ScanCompleted(Err("Source folder does not exist!".to_string())),
    );

    assert_eq!(
        effects,
        vec![Effect::ShowNotice(Notice::new(
            Severity::Error,
            "Error",
            "Source folder does not exist!"
        ))]
    );
    assert_eq!(state.session(), SessionState::Idle);
}

#[test]
fn scan_log_names_every_format_it_looks_for() {
    init_logging();
    let formats = vec!["EPUB".to_string(), "MOBI".to_string(), "PDF".to_string()];
    let state = AppState::with_formats(formats);
    let (state, _) = apply(
        state,
        vec![
            Msg::SourceFolderSelected(PathBuf::from("/books")),
            Msg::ScanClicked,
        ],
    );
    assert!(state.view().log.contains(&"Looking for: EPUB, MOBI, PDF".to_string()));

    let (state, _) = apply(
        state,
        vec![
            Msg::ScanCompleted(Ok(Vec::new())),
            Msg::SourceFilterChanged(SourceFilter::Only("PDF".to_string())),
        ],
    );
    assert_eq!(state.view().log.last(), Some(&"Looking for: PDF".to_string()));
}
