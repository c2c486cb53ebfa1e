use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use crate::FailureKind;

#[derive(Debug, Clone)]
pub struct ConvertSettings {
    /// Upper bound for one converter invocation. Large PDFs can take minutes.
    pub timeout: Duration,
    /// How many characters of stderr are kept for a failed conversion.
    pub stderr_limit: usize,
}

impl Default for ConvertSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(600),
            stderr_limit: 200,
        }
    }
}

/// Converts one file. Implementations report every problem as a
/// [`FailureKind`]; the batch loop never sees an error type.
#[async_trait::async_trait]
pub trait Converter: Send + Sync {
    async fn convert(&self, input: &Path, output: &Path) -> Result<(), FailureKind>;
}

/// Runs an external converter as `program <input> <output>`.
#[derive(Debug, Clone)]
pub struct ProcessConverter {
    program: PathBuf,
    settings: ConvertSettings,
}

impl ProcessConverter {
    pub fn new(program: impl Into<PathBuf>, settings: ConvertSettings) -> Self {
        Self {
            program: program.into(),
            settings,
        }
    }
}

#[async_trait::async_trait]
impl Converter for ProcessConverter {
    async fn convert(&self, input: &Path, output: &Path) -> Result<(), FailureKind> {
        let mut command = Command::new(&self.program);
        command
            .arg(input)
            .arg(output)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        // Own process group: a terminal Ctrl-C stops the batch, not the file in flight.
        #[cfg(unix)]
        command.process_group(0);
        let child = command
            .spawn()
            .map_err(|err| FailureKind::Invocation(err.to_string()))?;

        // Dropping the pending wait on timeout kills the child.
        let finished = tokio::time::timeout(self.settings.timeout, child.wait_with_output()).await;
        let output = match finished {
            Ok(Ok(output)) => output,
            Ok(Err(err)) => return Err(FailureKind::Invocation(err.to_string())),
            Err(_) => {
                return Err(FailureKind::Timeout {
                    limit: self.settings.timeout,
                })
            }
        };

        if output.status.success() {
            Ok(())
        } else {
            Err(FailureKind::ExitStatus {
                code: output.status.code(),
                stderr: stderr_excerpt(&output.stderr, self.settings.stderr_limit),
            })
        }
    }
}

/// First `limit` characters of the converter's stderr, decoded lossily.
pub fn stderr_excerpt(stderr: &[u8], limit: usize) -> String {
    String::from_utf8_lossy(stderr).chars().take(limit).collect()
}
