use std::path::{Path, PathBuf};

use crate::datasets::*;

pub fn path_str(path: &Path) -> String {
    path.display().to_string()
}

pub fn simplify_file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path_str(path))
}

/// Fails with a data-source error if `path` is not an existing file.
pub fn require_file(path: &Path) -> DatasetResult<()> {
    if !path.is_file() {
        warn!("require_file: missing {:?}", path_str(path));
        return MissingSourceSnafu {
            path: path_str(path),
        }
        .fail();
    }
    Ok(())
}

/// The hidden sibling of `path` in which a file is written before being moved
/// into place.
pub fn tmp_path(path: &Path) -> PathBuf {
    let name = format!(".{}.tmp", simplify_file_name(path));
    match path.parent() {
        Some(dir) => dir.join(name),
        None => PathBuf::from(name),
    }
}
