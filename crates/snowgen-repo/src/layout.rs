//! Resolved storage locations of a project

use snowgen_core::{Config, DATA_TEMPLATES_FOLDER, SQL_TEMPLATES_FOLDER};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Where objects and templates live, resolved once per invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    /// Root of `databases/<db>/schemas/<schema>/...`
    pub objects_root: PathBuf,

    /// Schema templates YAML file
    pub schema_templates: PathBuf,

    /// SQL text templates folder, if one was found
    pub sql_templates: Option<PathBuf>,

    /// Per-schema data templates folder, if one was found
    pub data_templates: Option<PathBuf>,
}

impl ProjectLayout {
    pub fn new(objects_root: impl Into<PathBuf>, schema_templates: impl Into<PathBuf>) -> Self {
        Self {
            objects_root: objects_root.into(),
            schema_templates: schema_templates.into(),
            sql_templates: None,
            data_templates: None,
        }
    }

    /// Set the SQL templates folder
    pub fn with_sql_templates(mut self, path: impl Into<PathBuf>) -> Self {
        self.sql_templates = Some(path.into());
        self
    }

    /// Set the data templates folder
    pub fn with_data_templates(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_templates = Some(path.into());
        self
    }

    /// Resolve a layout from configuration
    ///
    /// Folders configured explicitly win; otherwise the project root is
    /// searched once for the well-known folder names.
    pub fn from_config(config: &Config) -> Self {
        let find = |configured: &Option<PathBuf>, name: &str| match configured {
            Some(path) => Some(config.resolve(path)),
            None => locate_folder(&config.project_root, name),
        };

        Self {
            objects_root: config.objects_root(),
            schema_templates: config.schema_templates_path(),
            sql_templates: find(&config.paths.sql_templates, SQL_TEMPLATES_FOLDER),
            data_templates: find(&config.paths.data_templates, DATA_TEMPLATES_FOLDER),
        }
    }

    /// `<objects_root>/databases`
    pub fn databases_dir(&self) -> PathBuf {
        self.objects_root.join("databases")
    }

    /// `<objects_root>/databases/<database>/schemas`
    pub fn schemas_dir(&self, database: &str) -> PathBuf {
        self.databases_dir().join(database).join("schemas")
    }

    /// `<objects_root>/databases/<database>/schemas/<schema>`
    pub fn schema_dir(&self, database: &str, schema: &str) -> PathBuf {
        self.schemas_dir(database).join(schema)
    }
}

fn is_skipped(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .map(|name| name.starts_with('.') || name == "target")
            .unwrap_or(false)
}

/// First directory named `name` under `base`, walking in name order
///
/// Hidden directories and `target` are not descended into.
pub fn locate_folder(base: &Path, name: &str) -> Option<PathBuf> {
    WalkDir::new(base)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_skipped(entry))
        .filter_map(|entry| entry.ok())
        .find(|entry| entry.depth() > 0 && entry.file_type().is_dir() && entry.file_name() == name)
        .map(|entry| entry.into_path())
}
