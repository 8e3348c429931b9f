//! Writing rendered objects to their object path

use serde::Serialize;
use std::fmt;
use std::io;
use std::path::Path;

use crate::store::FileStore;

/// What happened to an object file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveOutcome {
    /// No file existed; it was written
    Created,

    /// A file existed and was overwritten
    Replaced,

    /// A file existed and was left untouched
    Unchanged,
}

impl fmt::Display for SaveOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SaveOutcome::Created => "created",
            SaveOutcome::Replaced => "replaced",
            SaveOutcome::Unchanged => "unchanged",
        };
        f.write_str(label)
    }
}

/// Write `ddl` to `path` unless a file exists and `replace` is false
///
/// Missing parent directories are created.
pub fn save_object<S: FileStore>(store: &S, path: &Path, ddl: &str, replace: bool) -> io::Result<SaveOutcome> {
    let existed = store.exists(path);
    if existed && !replace {
        tracing::debug!(path = %path.display(), "object exists, keeping it");
        return Ok(SaveOutcome::Unchanged);
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !store.is_dir(parent) {
            store.create_dir_all(parent)?;
        }
    }
    store.write_text(path, ddl)?;

    let outcome = if existed { SaveOutcome::Replaced } else { SaveOutcome::Created };
    tracing::info!(path = %path.display(), %outcome, "object written");
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn create_then_keep() {
        let store = MemoryStore::new();
        let path = Path::new("/objs/databases/RAW/schemas/S/tables/t.sql");

        assert_eq!(save_object(&store, path, "v1", false).unwrap(), SaveOutcome::Created);
        assert_eq!(save_object(&store, path, "v2", false).unwrap(), SaveOutcome::Unchanged);
        assert_eq!(store.file(path).as_deref(), Some("v1"));
    }

    #[test]
    fn replace_overwrites() {
        let store = MemoryStore::new().with_file("/o/t.sql", "old");
        let path = Path::new("/o/t.sql");

        assert_eq!(save_object(&store, path, "new", true).unwrap(), SaveOutcome::Replaced);
        assert_eq!(store.file(path).as_deref(), Some("new"));
    }

    #[test]
    fn replace_on_missing_file_creates() {
        let store = MemoryStore::new();
        assert_eq!(save_object(&store, Path::new("/a/b.sql"), "x", true).unwrap(), SaveOutcome::Created);
    }
}
