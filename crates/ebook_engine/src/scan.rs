use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use engine_logging::engine_debug;
use thiserror::Error;

use crate::format::formats_named;
use crate::JobItem;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("source folder does not exist or is not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Lists the files directly inside `dir` whose extension belongs to one of
/// `format_names`, sorted case-insensitively by file name.
///
/// Symlinks are followed, so a link to a regular file is included and a link
/// to a directory is not. Unknown format names select nothing.
pub fn scan_folder<S: AsRef<str>>(
    dir: &Path,
    format_names: &[S],
) -> Result<Vec<JobItem>, ScanError> {
    if !dir.is_dir() {
        return Err(ScanError::NotADirectory(dir.to_path_buf()));
    }

    let formats = formats_named(format_names);
    if formats.is_empty() {
        engine_debug!("scan of {:?} selects no extensions", dir);
        return Ok(Vec::new());
    }

    let mut items = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_file = fs::metadata(&path).map(|meta| meta.is_file()).unwrap_or(false);
        if !is_file {
            continue;
        }
        let Some(ext) = path.extension() else {
            continue;
        };
        let dotted = format!(".{}", ext.to_string_lossy());
        if formats.iter().any(|format| format.matches_extension(&dotted)) {
            items.push(JobItem::new(path));
        }
    }

    items.sort_by_cached_key(|item| item.file_name().to_lowercase());
    engine_debug!("scan of {:?} found {} file(s)", dir, items.len());
    Ok(items)
}
