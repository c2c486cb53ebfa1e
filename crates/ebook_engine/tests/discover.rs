use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use ebook_engine::{locate, locate_blocking, ConverterLocation, DiscoverySettings};
use tempfile::TempDir;

fn settings(command: &str, candidates: Vec<PathBuf>) -> DiscoverySettings {
    DiscoverySettings {
        command: command.to_string(),
        version_args: vec!["--version".to_string()],
        probe_timeout: Duration::from_secs(5),
        candidates,
    }
}

#[tokio::test]
async fn nothing_found_returns_none() {
    let dir = TempDir::new().unwrap();
    let settings = settings(
        "definitely-not-an-ebook-converter-3f9a",
        vec![dir.path().join("missing"), dir.path().join("also-missing")],
    );

    assert_eq!(locate(&settings).await, None);
}

#[tokio::test]
async fn first_existing_candidate_wins() {
    let dir = TempDir::new().unwrap();
    let second = dir.path().join("second");
    let third = dir.path().join("third");
    fs::write(&second, b"").unwrap();
    fs::write(&third, b"").unwrap();
    let settings = settings(
        "definitely-not-an-ebook-converter-3f9a",
        vec![dir.path().join("first"), second.clone(), third],
    );

    assert_eq!(
        locate(&settings).await,
        Some(ConverterLocation::Installed(second))
    );
}

#[tokio::test]
async fn directory_candidates_are_ignored() {
    let dir = TempDir::new().unwrap();
    let folder = dir.path().join("ebook-convert");
    fs::create_dir(&folder).unwrap();
    let settings = settings("definitely-not-an-ebook-converter-3f9a", vec![folder]);

    assert_eq!(locate(&settings).await, None);
}

#[cfg(unix)]
#[tokio::test]
async fn command_answering_probe_is_used_by_name() {
    let dir = TempDir::new().unwrap();
    let candidate = dir.path().join("candidate");
    fs::write(&candidate, b"").unwrap();
    let settings = DiscoverySettings {
        command: "sh".to_string(),
        version_args: vec!["-c".to_string(), "exit 0".to_string()],
        probe_timeout: Duration::from_secs(5),
        candidates: vec![candidate],
    };

    let found = locate(&settings).await;
    assert_eq!(found, Some(ConverterLocation::OnPath("sh".to_string())));
    assert_eq!(found.unwrap().program(), PathBuf::from("sh"));
}

#[cfg(unix)]
#[tokio::test]
async fn failing_or_slow_probe_falls_back_to_paths() {
    let dir = TempDir::new().unwrap();
    let candidate = dir.path().join("candidate");
    fs::write(&candidate, b"").unwrap();

    let failing = DiscoverySettings {
        command: "sh".to_string(),
        version_args: vec!["-c".to_string(), "exit 3".to_string()],
        probe_timeout: Duration::from_secs(5),
        candidates: vec![candidate.clone()],
    };
    assert_eq!(
        locate(&failing).await,
        Some(ConverterLocation::Installed(candidate.clone()))
    );

    let slow = DiscoverySettings {
        command: "sh".to_string(),
        version_args: vec!["-c".to_string(), "sleep 5".to_string()],
        probe_timeout: Duration::from_millis(100),
        candidates: vec![candidate.clone()],
    };
    assert_eq!(
        locate(&slow).await,
        Some(ConverterLocation::Installed(candidate))
    );
}

#[test]
fn blocking_locate_matches_async() {
    let dir = TempDir::new().unwrap();
    let candidate = dir.path().join("ebook-convert");
    fs::write(&candidate, b"").unwrap();
    let settings = settings("definitely-not-an-ebook-converter-3f9a", vec![candidate.clone()]);

    assert_eq!(
        locate_blocking(&settings),
        Some(ConverterLocation::Installed(candidate))
    );
}

#[test]
fn default_settings_probe_ebook_convert() {
    let settings = DiscoverySettings::default();
    assert_eq!(settings.command, "ebook-convert");
    assert_eq!(settings.version_args, vec!["--version".to_string()]);
    assert!(!settings.candidates.is_empty());
}
