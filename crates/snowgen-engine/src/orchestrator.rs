//! Schema creation runs
//!
//! A run resolves one schema template and walks its categories in
//! [`ObjectCategory::RUN_ORDER`]. Failures are contained at the smallest
//! scope that makes sense:
//! - an object with a missing field or a bad column spec fails alone, as
//!   does an object whose file another object of the run already claimed
//! - a SQL template or discovery failure abandons the rest of its category
//! - a missing schema template or a failed write ends the run

use snowgen_core::{
    Config, DiscoveredMetadata, ObjectCategory, ObjectContext, ObjectDescriptor, ObjectError, ObjectSpec,
    SchemaTemplate,
};
use snowgen_repo::{FileStore, RepositoryError, TemplateRepository};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use crate::report::RunReport;

/// Caller choices for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Overwrite existing object files
    pub replace: bool,

    /// Database of existing tables feeding generated dynamic tables
    pub source_database: Option<String>,

    /// Schema of existing tables feeding generated dynamic tables
    pub source_schema: Option<String>,

    /// Header delimiter of data templates
    pub delimiter: String,

    /// Value of `{env}`
    pub env: String,

    /// Extra placeholder values; these win over object fields
    pub overrides: BTreeMap<String, String>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            replace: false,
            source_database: None,
            source_schema: None,
            delimiter: ",".to_string(),
            env: "{env}".to_string(),
            overrides: BTreeMap::new(),
        }
    }
}

impl RunOptions {
    /// Options seeded from configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            delimiter: config.data.delimiter.clone(),
            env: config.render.env.clone(),
            ..Self::default()
        }
    }
}

/// Errors raised during a run
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("{object}: generating dynamic tables from tables requires a source schema")]
    MissingSourceSchema { object: String },
}

impl EngineError {
    /// Whether the error ends the whole run rather than one category
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            EngineError::Repository(RepositoryError::Write { .. } | RepositoryError::SchemaTemplateNotFound(_))
        )
    }
}

/// Generate every object of `template_name` into `schema`
///
/// Returns the run report. Only an unknown schema template or a failed
/// write is returned as an error; everything else is recorded in the report.
pub fn create_new_schema<S: FileStore>(
    repo: &TemplateRepository<S>,
    schema: &str,
    template_name: &str,
    options: &RunOptions,
) -> Result<RunReport, EngineError> {
    let template = repo.get_schema_template(template_name)?;
    let context = ObjectContext::new(&template.role, &template.database, schema).with_env(&options.env);
    let mut report = RunReport::new(template_name, &template.database, schema);

    tracing::info!(template = template_name, database = %template.database, schema, "creating schema");

    let mut run = SchemaRun {
        repo,
        template: &template,
        context: &context,
        options,
        report: &mut report,
        written: BTreeSet::new(),
    };

    for (category, specs) in template.categories() {
        tracing::debug!(%category, specs = specs.len(), "processing category");

        if let Err(err) = run.category(category, specs) {
            if err.is_fatal() {
                return Err(err);
            }
            tracing::warn!(%category, error = %err, "category aborted");
            run.report.record_category_failure(category, err.to_string());
        }
    }

    tracing::info!(
        created = report.summary.created,
        replaced = report.summary.replaced,
        unchanged = report.summary.unchanged,
        failed = report.summary.failed,
        "schema run finished"
    );
    Ok(report)
}

struct SchemaRun<'a, S: FileStore> {
    repo: &'a TemplateRepository<S>,
    template: &'a SchemaTemplate,
    context: &'a ObjectContext,
    options: &'a RunOptions,
    report: &'a mut RunReport,

    /// Object files already claimed in this run
    written: BTreeSet<PathBuf>,
}

impl<S: FileStore> SchemaRun<'_, S> {
    fn category(&mut self, category: ObjectCategory, specs: &[ObjectSpec]) -> Result<(), EngineError> {
        for spec in specs {
            for resolved in self.expand(category, spec)? {
                self.object(category, &resolved)?;
            }
        }
        Ok(())
    }

    /// One spec per object to generate, after discovery
    fn expand(&self, category: ObjectCategory, spec: &ObjectSpec) -> Result<Vec<ObjectSpec>, EngineError> {
        let discovered = match category {
            ObjectCategory::Tables if spec.generate_columns_from_template => self
                .repo
                .tables_from_data_templates(&self.context.schema, &self.options.delimiter)?,
            ObjectCategory::DynamicTables if spec.generate_columns_from_table => self.existing_tables(spec)?,
            _ => return Ok(vec![spec.clone()]),
        };

        if discovered.is_empty() {
            tracing::warn!(%category, schema = %self.context.schema, "discovery found no tables");
        }
        Ok(discovered.iter().map(|row| spec.merge_discovered(row)).collect())
    }

    fn existing_tables(&self, spec: &ObjectSpec) -> Result<Vec<DiscoveredMetadata>, EngineError> {
        let source_schema = self
            .options
            .source_schema
            .as_ref()
            .or(spec.source_schema.as_ref())
            .ok_or_else(|| EngineError::MissingSourceSchema { object: self.identity(spec) })?;

        let source_database = self
            .options
            .source_database
            .as_ref()
            .or(spec.source_database.as_ref())
            .unwrap_or(&self.template.database);

        Ok(self.repo.tables_from_existing_ddl(source_database, source_schema)?)
    }

    /// Render and persist one object
    fn object(&mut self, category: ObjectCategory, spec: &ObjectSpec) -> Result<(), EngineError> {
        let (object, template_name) = match self.describe(category, spec) {
            Ok(described) => described,
            Err(err) => {
                let identity = self.identity(spec);
                tracing::debug!(%category, object = %identity, error = %err, "object skipped");
                self.report.record_failure(category, identity, err.to_string());
                return Ok(());
            }
        };

        let sql_template = self.repo.get_sql_template(template_name)?;
        let ddl = match object.get_ddl(&sql_template, &self.options.overrides) {
            Ok(ddl) => ddl,
            Err(err) => {
                tracing::debug!(%category, %object, error = %err, "render failed");
                self.report.record_failure(category, object.to_string(), err.to_string());
                return Ok(());
            }
        };

        let path = self.repo.object_path(&object);
        if !self.written.insert(path.clone()) {
            tracing::warn!(%category, %object, path = %path.display(), "object file already generated in this run");
            self.report.record_failure(
                category,
                object.to_string(),
                format!("{} was already generated by another object of this run", path.display()),
            );
            return Ok(());
        }

        let outcome = self.repo.save_object(&object, &ddl, self.options.replace)?;
        self.report
            .record_saved(category, object.to_string(), path.display().to_string(), outcome);
        Ok(())
    }

    fn describe<'s>(
        &self,
        category: ObjectCategory,
        spec: &'s ObjectSpec,
    ) -> Result<(ObjectDescriptor, &'s str), ObjectError> {
        let object = ObjectDescriptor::new(self.context, category, spec)?;
        let template_name = spec
            .template_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .ok_or(ObjectError::MissingField { category, field: "template_name" })?;
        Ok((object, template_name))
    }

    /// Best identity available for an object that may not resolve
    fn identity(&self, spec: &ObjectSpec) -> String {
        let name = spec.object_name.as_deref().unwrap_or("<unnamed>");
        format!("{}.{}.{}.{}", self.context.role, self.context.database, self.context.schema, name.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ObjectStatus;
    use pretty_assertions::assert_eq;
    use snowgen_repo::{MemoryStore, ProjectLayout};

    const SCHEMAS_YAML: &str = r#"
schemas:
  - name: basic
    database: RAW
    role: LOADER
    file_formats:
      - object_name: CSV_FORMAT
        template_name: file_format.sql
      - template_name: file_format.sql
    sequences:
      - object_name: order_seq
        template_name: sequence.sql
"#;

    fn repo() -> TemplateRepository<MemoryStore> {
        let store = MemoryStore::new()
            .with_file("/p/schemas.yaml", SCHEMAS_YAML)
            .with_file("/p/sql_templates/file_format.sql", "CREATE FILE FORMAT IF NOT EXISTS {name} TYPE = CSV;");
        let layout = ProjectLayout::new("/p/objects", "/p/schemas.yaml").with_sql_templates("/p/sql_templates");
        TemplateRepository::new(store, layout)
    }

    #[test]
    fn object_failures_do_not_stop_the_category() {
        let repo = repo();
        let report = create_new_schema(&repo, "SALES", "basic", &RunOptions::default()).unwrap();

        assert_eq!(report.summary.created, 1);
        assert_eq!(report.summary.failed, 1);
        let failed = report.with_status(ObjectStatus::Failed).next().unwrap();
        assert_eq!(failed.object, "LOADER.RAW.SALES.<unnamed>");
        assert!(failed.error.as_deref().unwrap().contains("object_name"));

        assert_eq!(
            repo.store().file("/p/objects/databases/RAW/schemas/SALES/file_formats/csv_format.sql").as_deref(),
            Some("CREATE FILE FORMAT IF NOT EXISTS csv_format TYPE = CSV;")
        );
    }

    #[test]
    fn missing_sql_template_aborts_only_its_category() {
        let report = create_new_schema(&repo(), "SALES", "basic", &RunOptions::default()).unwrap();

        assert_eq!(report.category_failures.len(), 1);
        assert_eq!(report.category_failures[0].category, ObjectCategory::Sequences);
        assert!(report.category_failures[0].message.contains("sequence.sql"));
        assert!(report.has_failures());
    }

    #[test]
    fn unknown_schema_template_ends_the_run() {
        let err = create_new_schema(&repo(), "SALES", "missing", &RunOptions::default()).unwrap_err();
        assert!(err.is_fatal());
        assert!(matches!(err, EngineError::Repository(RepositoryError::SchemaTemplateNotFound(_))));
    }

    #[test]
    fn bad_column_shape_fails_only_its_object() {
        let yaml = r#"
schemas:
  - name: broken
    database: RAW
    role: LOADER
    file_formats:
      - object_name: csv
        template_name: file_format.sql
    tables:
      - object_name: bad
        template_name: file_format.sql
        columns: just_a_string
      - object_name: good
        template_name: file_format.sql
"#;
        let store = MemoryStore::new()
            .with_file("/p/schemas.yaml", yaml)
            .with_file("/p/sql_templates/file_format.sql", "CREATE {name};");
        let layout = ProjectLayout::new("/p/objects", "/p/schemas.yaml").with_sql_templates("/p/sql_templates");
        let repo = TemplateRepository::new(store, layout);

        let report = create_new_schema(&repo, "SALES", "broken", &RunOptions::default()).unwrap();
        assert_eq!(report.summary.created, 2);
        assert_eq!(report.summary.failed, 1);
        assert!(report.category_failures.is_empty());

        let failed = report.with_status(ObjectStatus::Failed).next().unwrap();
        assert_eq!(failed.object, "LOADER.RAW.SALES.bad");
        assert!(failed.error.as_deref().unwrap().contains("invalid columns"));
        assert!(repo.store().file("/p/objects/databases/RAW/schemas/SALES/file_formats/csv.sql").is_some());
        assert!(repo.store().file("/p/objects/databases/RAW/schemas/SALES/tables/good.sql").is_some());
    }

    fn data_template_repo() -> TemplateRepository<MemoryStore> {
        let yaml = r#"
schemas:
  - name: landing
    database: RAW
    role: LOADER
    tables:
      - template_name: table.sql
        generate_columns_from_template: true
"#;
        let store = MemoryStore::new()
            .with_file("/p/schemas.yaml", yaml)
            .with_file("/p/sql_templates/table.sql", "CREATE TABLE {name} ({table_columns});")
            .with_file("/p/data/SALES/orders_2024-01-01.csv", "A\n")
            .with_file("/p/data/SALES/orders_2024-02-01.csv", "B\n");
        let layout = ProjectLayout::new("/p/objects", "/p/schemas.yaml")
            .with_sql_templates("/p/sql_templates")
            .with_data_templates("/p/data");
        TemplateRepository::new(store, layout)
    }

    #[test]
    fn objects_sharing_a_file_fail_after_the_first() {
        let repo = data_template_repo();
        let options = RunOptions { replace: true, ..RunOptions::default() };
        let report = create_new_schema(&repo, "SALES", "landing", &options).unwrap();

        assert_eq!(report.summary.created, 1);
        assert_eq!(report.summary.failed, 1);
        assert!(report.has_failures());
        let failed = report.with_status(ObjectStatus::Failed).next().unwrap();
        assert!(failed.error.as_deref().unwrap().contains("already generated"));

        assert_eq!(
            repo.store().file("/p/objects/databases/RAW/schemas/SALES/tables/orders.sql").as_deref(),
            Some("CREATE TABLE orders (\"A\" VARCHAR);")
        );
    }

    #[test]
    fn empty_delimiter_aborts_data_template_discovery() {
        let repo = data_template_repo();
        let options = RunOptions { delimiter: String::new(), ..RunOptions::default() };
        let report = create_new_schema(&repo, "SALES", "landing", &options).unwrap();

        assert!(report.objects.is_empty());
        assert_eq!(report.category_failures.len(), 1);
        assert!(report.category_failures[0].message.contains("delimiter"));
    }

    #[test]
    fn options_come_from_config() {
        let mut config = Config::default();
        config.render.env = "DEV".to_string();
        config.data.delimiter = "|".to_string();

        let options = RunOptions::from_config(&config);
        assert_eq!(options.env, "DEV");
        assert_eq!(options.delimiter, "|");
        assert!(!options.replace);
    }
}
