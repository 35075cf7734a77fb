// Derived files: created on the first miss, reused afterwards.

use std::path::Path;

use crate::datasets::io_common::path_str;
use crate::datasets::io_csv::write_table_csv;
use crate::datasets::*;

/// Decides whether a derived file can be used as it is.
pub trait ArtifactCache {
    fn exists(&self, artifact: &Path) -> bool;
}

/// A derived file is valid as soon as it exists. It is not compared with its source.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub struct FileCache;

impl ArtifactCache for FileCache {
    fn exists(&self, artifact: &Path) -> bool {
        artifact.is_file()
    }
}

/// Always reports a miss, so that every derived file is built again.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub struct RefreshCache;

impl ArtifactCache for RefreshCache {
    fn exists(&self, _artifact: &Path) -> bool {
        false
    }
}

/// Makes sure that the derived file at `path` exists, calling `produce` and
/// writing its table if the cache reports a miss.
///
/// Returns true if the file was (re)created.
pub fn ensure_artifact<F>(cache: &dyn ArtifactCache, path: &Path, produce: F) -> DatasetResult<bool>
where
    F: FnOnce() -> DatasetResult<Table>,
{
    if cache.exists(path) {
        debug!("ensure_artifact: reusing {:?}", path_str(path));
        return Ok(false);
    }
    info!("Derived file {:?} missing, building it", path_str(path));
    let table = produce()?;
    write_table_csv(path, &table)?;
    Ok(true)
}
