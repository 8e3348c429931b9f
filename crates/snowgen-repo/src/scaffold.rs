//! Project scaffolding

use std::path::{Path, PathBuf};

use crate::layout::ProjectLayout;
use crate::persist::{save_object, SaveOutcome};
use crate::repository::RepositoryError;
use crate::store::FileStore;

/// Database holding the starter templates
pub const TEMPLATE_DATABASE: &str = "template_db";

/// Schema holding the starter templates
pub const TEMPLATE_SCHEMA: &str = "template_schema";

/// (category directory, file name, statement)
const STARTER_FILES: [(&str, &str, &str); 4] = [
    ("file_formats", "file_format.sql", "CREATE FILE FORMAT IF NOT EXISTS {name}"),
    ("internal_stages", "internal_stage.sql", "CREATE STAGE IF NOT EXISTS {name}"),
    ("tables", "table.sql", "CREATE TABLE IF NOT EXISTS {name}"),
    ("procedures", "procedure.sql", "CREATE PROCEDURE IF NOT EXISTS {name}"),
];

/// Create the starter object tree
///
/// Writes one starter statement per category under
/// `databases/template_db/schemas/template_schema`. Files that already
/// exist are kept.
pub fn init_project<S: FileStore>(
    store: &S,
    layout: &ProjectLayout,
) -> Result<Vec<(PathBuf, SaveOutcome)>, RepositoryError> {
    let schema_dir = layout.schema_dir(TEMPLATE_DATABASE, TEMPLATE_SCHEMA);

    STARTER_FILES
        .iter()
        .map(|(category, file_name, statement)| {
            let path = schema_dir.join(category).join(file_name);
            let outcome = save_object(store, &path, statement, false)
                .map_err(|source| RepositoryError::Write { path: path.clone(), source })?;
            Ok((path, outcome))
        })
        .collect()
}

/// Create `databases/<name>/schemas`, returning the schemas directory
pub fn create_database<S: FileStore>(
    store: &S,
    layout: &ProjectLayout,
    name: &str,
) -> Result<PathBuf, RepositoryError> {
    let path = layout.schemas_dir(name);
    create_dir(store, &path)?;
    tracing::info!(database = name, path = %path.display(), "database created");
    Ok(path)
}

fn create_dir<S: FileStore>(store: &S, path: &Path) -> Result<(), RepositoryError> {
    store
        .create_dir_all(path)
        .map_err(|source| RepositoryError::Write { path: path.to_path_buf(), source })
}
