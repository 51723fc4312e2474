use std::path::{Path, PathBuf};

use crate::{StoreError, StoreResult};

/// Collection names and document ids become path segments, keep them to a
/// conservative charset.
pub(crate) fn check_path_segment(segment: &str) -> StoreResult<&str> {
    let valid = !segment.is_empty()
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if valid {
        Ok(segment)
    } else {
        Err(StoreError::InvalidPath(segment.to_owned()))
    }
}

pub(crate) fn document_file_name(id: &str, extension: &str) -> String {
    format!("{id}.{extension}")
}

/// Write `content` next to `path` then rename it over `path`.
pub(crate) async fn write_atomic(path: &Path, content: &str) -> StoreResult<()> {
    let tmp_path = temporary_path(path)?;
    tokio::fs::write(&tmp_path, content).await?;
    if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(e.into());
    }
    Ok(())
}

fn temporary_path(path: &Path) -> StoreResult<PathBuf> {
    let file_name = path
        .file_name()
        .and_then(|s| s.to_str())
        .ok_or_else(|| StoreError::InvalidPath(path.display().to_string()))?;
    Ok(path.with_file_name(format!(".{file_name}.tmp")))
}
