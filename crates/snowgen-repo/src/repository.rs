//! Named templates and discovered tables

use snowgen_core::{
    DiscoveredMetadata, ObjectDescriptor, SchemaTemplate, SchemaTemplates, DATA_TEMPLATES_FOLDER, SQL_TEMPLATES_FOLDER,
};
use snowgen_ddl::{discover_from_data_file, discover_from_table_ddl};
use std::path::{Path, PathBuf};

use crate::layout::ProjectLayout;
use crate::persist::{save_object, SaveOutcome};
use crate::store::FileStore;

/// Errors raised by the repository
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: std::io::Error },

    #[error("failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: std::io::Error },

    #[error("invalid schema templates file {}: {message}", path.display())]
    ParseTemplates { path: PathBuf, message: String },

    #[error("schema template '{0}' not found")]
    SchemaTemplateNotFound(String),

    #[error("SQL template '{name}' not found in {}", folder.display())]
    SqlTemplateNotFound { name: String, folder: PathBuf },

    #[error("no '{0}' folder found in the project")]
    TemplatesFolderMissing(&'static str),

    #[error("data template delimiter must not be empty")]
    EmptyDelimiter,
}

/// Access to templates and the object tree of one project
pub struct TemplateRepository<S: FileStore> {
    store: S,
    layout: ProjectLayout,
}

impl<S: FileStore> TemplateRepository<S> {
    pub fn new(store: S, layout: ProjectLayout) -> Self {
        Self { store, layout }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    fn read(&self, path: &Path) -> Result<String, RepositoryError> {
        self.store
            .read_text(path)
            .map_err(|source| RepositoryError::Read { path: path.to_path_buf(), source })
    }

    fn list(&self, path: &Path) -> Result<Vec<PathBuf>, RepositoryError> {
        self.store
            .list_dir(path)
            .map_err(|source| RepositoryError::Read { path: path.to_path_buf(), source })
    }

    /// Parse the schema templates file
    pub fn load_schema_templates(&self) -> Result<SchemaTemplates, RepositoryError> {
        let path = &self.layout.schema_templates;
        let contents = self.read(path)?;

        serde_yaml::from_str(&contents).map_err(|e| RepositoryError::ParseTemplates {
            path: path.clone(),
            message: e.to_string(),
        })
    }

    /// Names of all schema templates, in file order
    pub fn schema_template_names(&self) -> Result<Vec<String>, RepositoryError> {
        let templates = self.load_schema_templates()?;
        Ok(templates.names().into_iter().map(str::to_string).collect())
    }

    /// Resolve one schema template by name
    pub fn get_schema_template(&self, name: &str) -> Result<SchemaTemplate, RepositoryError> {
        self.load_schema_templates()?
            .schemas
            .into_iter()
            .find(|schema| schema.name == name)
            .ok_or_else(|| RepositoryError::SchemaTemplateNotFound(name.to_string()))
    }

    /// Text of a SQL template file
    pub fn get_sql_template(&self, name: &str) -> Result<String, RepositoryError> {
        let folder = self
            .layout
            .sql_templates
            .as_ref()
            .ok_or(RepositoryError::TemplatesFolderMissing(SQL_TEMPLATES_FOLDER))?;

        let path = folder.join(name);
        if !self.store.exists(&path) {
            return Err(RepositoryError::SqlTemplateNotFound {
                name: name.to_string(),
                folder: folder.clone(),
            });
        }
        self.read(&path)
    }

    /// Sorted names of the sub-directories of `path`; empty when `path` is missing
    fn child_dir_names(&self, path: &Path) -> Result<Vec<String>, RepositoryError> {
        if !self.store.is_dir(path) {
            return Ok(Vec::new());
        }

        let names = self
            .list(path)?
            .into_iter()
            .filter(|child| self.store.is_dir(child))
            .filter_map(|child| child.file_name().and_then(|n| n.to_str()).map(str::to_string))
            .collect();
        Ok(names)
    }

    /// Databases present in the object tree
    pub fn list_databases(&self) -> Result<Vec<String>, RepositoryError> {
        self.child_dir_names(&self.layout.databases_dir())
    }

    /// Schemas present under a database
    pub fn list_schemas(&self, database: &str) -> Result<Vec<String>, RepositoryError> {
        self.child_dir_names(&self.layout.schemas_dir(database))
    }

    /// One discovered table per data file under `<data_templates>/<schema>`
    pub fn tables_from_data_templates(
        &self,
        schema: &str,
        delimiter: &str,
    ) -> Result<Vec<DiscoveredMetadata>, RepositoryError> {
        if delimiter.is_empty() {
            return Err(RepositoryError::EmptyDelimiter);
        }

        let folder = self
            .layout
            .data_templates
            .as_ref()
            .ok_or(RepositoryError::TemplatesFolderMissing(DATA_TEMPLATES_FOLDER))?
            .join(schema);

        let mut tables = Vec::new();
        for path in self.list(&folder)? {
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if self.store.is_dir(&path) || !file_name.contains('.') {
                continue;
            }

            let contents = self.read(&path)?;
            let table = discover_from_data_file(file_name, &contents, delimiter);
            tracing::debug!(file = file_name, table = %table.name, columns = table.columns.len(), "discovered data template");
            tables.push(table);
        }
        Ok(tables)
    }

    /// One discovered table per `.sql` file under an existing schema's `tables`
    ///
    /// When the DDL does not name its database or schema (for instance
    /// `USE DATABASE {env}_RAW`), the scanned `database` and `schema` fill in.
    pub fn tables_from_existing_ddl(
        &self,
        database: &str,
        schema: &str,
    ) -> Result<Vec<DiscoveredMetadata>, RepositoryError> {
        let folder = self.layout.schema_dir(database, schema).join("tables");

        let mut tables = Vec::new();
        for path in self.list(&folder)? {
            let is_sql = path.extension().map(|ext| ext == "sql").unwrap_or(false);
            if !is_sql || self.store.is_dir(&path) {
                continue;
            }
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };

            let ddl = self.read(&path)?;
            let mut table = discover_from_table_ddl(file_name, &ddl);
            table.source_database.get_or_insert_with(|| database.to_string());
            table.source_schema.get_or_insert_with(|| schema.to_string());
            tracing::debug!(file = file_name, table = %table.name, columns = table.columns.len(), "discovered existing table");
            tables.push(table);
        }
        Ok(tables)
    }

    /// Where a descriptor's DDL lives
    pub fn object_path(&self, object: &ObjectDescriptor) -> PathBuf {
        object.generate_object_path(&self.layout.objects_root)
    }

    /// Persist rendered DDL for `object`
    pub fn save_object(
        &self,
        object: &ObjectDescriptor,
        ddl: &str,
        replace: bool,
    ) -> Result<SaveOutcome, RepositoryError> {
        let path = self.object_path(object);
        save_object(&self.store, &path, ddl, replace)
            .map_err(|source| RepositoryError::Write { path, source })
    }
}
