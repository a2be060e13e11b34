//! Write-then-rename file persistence.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::ScraperError;

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Sibling temporary path, unique per process and call, so concurrent writers
/// targeting the same destination never share a temp file.
fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map_or_else(|| "download".into(), |n| n.to_string_lossy().into_owned());
    let n = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    path.with_file_name(format!(".{name}.{}.{n}.part", std::process::id()))
}

/// Writes `bytes` to `path` so that readers observe either no file or the
/// complete file. Parent directories are created as needed.
///
/// # Errors
///
/// Returns [`ScraperError::Io`] if a directory cannot be created or the
/// temporary file cannot be written or renamed.
pub async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), ScraperError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| ScraperError::io(parent, e))?;
    }

    let temp = temp_path_for(path);
    if let Err(e) = tokio::fs::write(&temp, bytes).await {
        let _ = tokio::fs::remove_file(&temp).await;
        return Err(ScraperError::io(&temp, e));
    }
    if let Err(e) = tokio::fs::rename(&temp, path).await {
        let _ = tokio::fs::remove_file(&temp).await;
        return Err(ScraperError::io(path, e));
    }
    Ok(())
}
