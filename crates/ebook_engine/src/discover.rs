use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use engine_logging::{engine_debug, engine_info, engine_warn};
use tokio::process::Command;

const DEFAULT_COMMAND: &str = "ebook-convert";

#[derive(Debug, Clone)]
pub struct DiscoverySettings {
    /// Bare command name tried first, resolved through `PATH`.
    pub command: String,
    pub version_args: Vec<String>,
    pub probe_timeout: Duration,
    /// Well-known install locations, checked in order.
    pub candidates: Vec<PathBuf>,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            command: DEFAULT_COMMAND.to_string(),
            version_args: vec!["--version".to_string()],
            probe_timeout: Duration::from_secs(10),
            candidates: default_candidates(),
        }
    }
}

/// Where the external converter was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConverterLocation {
    /// The bare command answered its version probe.
    OnPath(String),
    Installed(PathBuf),
}

impl ConverterLocation {
    /// Program to hand to the process launcher.
    pub fn program(&self) -> PathBuf {
        match self {
            ConverterLocation::OnPath(command) => PathBuf::from(command),
            ConverterLocation::Installed(path) => path.clone(),
        }
    }
}

pub async fn locate(settings: &DiscoverySettings) -> Option<ConverterLocation> {
    if probe_command(settings).await {
        engine_info!("Converter found on PATH: {}", settings.command);
        return Some(ConverterLocation::OnPath(settings.command.clone()));
    }

    let found = settings
        .candidates
        .iter()
        .find(|candidate| is_regular_file(candidate))
        .cloned();
    match &found {
        Some(path) => engine_info!("Converter found at {:?}", path),
        None => engine_warn!(
            "Converter not found (command {:?}, {} candidate path(s))",
            settings.command,
            settings.candidates.len()
        ),
    }
    found.map(ConverterLocation::Installed)
}

/// Blocking variant of [`locate`] for callers without a runtime.
pub fn locate_blocking(settings: &DiscoverySettings) -> Option<ConverterLocation> {
    match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime.block_on(locate(settings)),
        Err(err) => {
            engine_warn!("No runtime for converter probe ({}); checking paths only", err);
            settings
                .candidates
                .iter()
                .find(|candidate| is_regular_file(candidate))
                .cloned()
                .map(ConverterLocation::Installed)
        }
    }
}

async fn probe_command(settings: &DiscoverySettings) -> bool {
    let mut command = Command::new(&settings.command);
    command
        .args(&settings.version_args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true);
    #[cfg(unix)]
    command.process_group(0);
    let child = command.spawn();
    let mut child = match child {
        Ok(child) => child,
        Err(err) => {
            engine_debug!("Probe of {:?} could not start: {}", settings.command, err);
            return false;
        }
    };

    match tokio::time::timeout(settings.probe_timeout, child.wait()).await {
        Ok(Ok(status)) => status.success(),
        Ok(Err(err)) => {
            engine_debug!("Probe of {:?} failed: {}", settings.command, err);
            false
        }
        Err(_) => {
            engine_debug!("Probe of {:?} timed out", settings.command);
            false
        }
    }
}

fn is_regular_file(path: &Path) -> bool {
    path.metadata().map(|meta| meta.is_file()).unwrap_or(false)
}

fn default_candidates() -> Vec<PathBuf> {
    let home = dirs::home_dir();
    let in_home = |relative: &str| home.as_ref().map(|home| home.join(relative));

    if cfg!(target_os = "windows") {
        [
            Some(PathBuf::from(r"C:\Program Files\Calibre2\ebook-convert.exe")),
            Some(PathBuf::from(r"C:\Program Files (x86)\Calibre2\ebook-convert.exe")),
            in_home(r"AppData\Local\Calibre2\ebook-convert.exe"),
        ]
        .into_iter()
        .flatten()
        .collect()
    } else if cfg!(target_os = "macos") {
        vec![
            PathBuf::from("/Applications/calibre.app/Contents/MacOS/ebook-convert"),
            PathBuf::from("/usr/local/bin/ebook-convert"),
        ]
    } else {
        [
            Some(PathBuf::from("/usr/bin/ebook-convert")),
            Some(PathBuf::from("/usr/local/bin/ebook-convert")),
            in_home(".local/bin/ebook-convert"),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}
