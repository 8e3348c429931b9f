//! Resolved database objects
//!
//! An [`ObjectDescriptor`] is built from an [`ObjectSpec`] plus the schema
//! context it belongs to. Everything derived from it (file name, path, DDL)
//! is a pure function of its fields.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::category::ObjectCategory;
use crate::columns::{format_table_columns, format_transformations, ColumnSpec};
use crate::render::{render_template, RenderError};
use crate::spec::ObjectSpec;

const COLUMN_NAME_PLACEHOLDER: &str = "{column_name}";

/// Schema-level context shared by every object of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectContext {
    pub role: String,
    pub database: String,
    pub schema: String,

    /// Value of the `{env}` placeholder
    pub env: String,
}

impl ObjectContext {
    pub fn new(role: impl Into<String>, database: impl Into<String>, schema: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            database: database.into(),
            schema: schema.into(),
            env: "{env}".to_string(),
        }
    }

    /// Set the `{env}` value
    pub fn with_env(mut self, env: impl Into<String>) -> Self {
        self.env = env.into();
        self
    }
}

/// Category-specific fields of a descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectKind {
    /// No derived fields
    Plain,

    Table {
        /// Rendered column clause, when columns were declared
        table_columns: Option<String>,
    },

    DynamicTable {
        pattern: String,
        formatted_transformations: String,
        source_database: Option<String>,
        source_schema: Option<String>,
        source_object: Option<String>,
    },
}

/// Errors raised while building a descriptor
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ObjectError {
    #[error("{category} object is missing required field `{field}`")]
    MissingField { category: ObjectCategory, field: &'static str },

    #[error("{object}: {message}")]
    InvalidColumns { object: String, message: String },

    #[error("{object}: dynamic tables require a non-empty `pattern` containing {{column_name}}")]
    MissingPattern { object: String },

    #[error("{object}: {source}")]
    Pattern { object: String, source: RenderError },
}

/// A fully resolved object, ready to render
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectDescriptor {
    pub role: String,
    pub database: String,
    pub schema: String,

    /// Lower-cased object name
    pub object_name: String,

    pub category: ObjectCategory,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    pub comment: Option<String>,
    pub env: String,
    pub kind: ObjectKind,

    /// Free-form fields from the spec
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl ObjectDescriptor {
    /// Build a descriptor for `spec` inside `context`
    pub fn new(context: &ObjectContext, category: ObjectCategory, spec: &ObjectSpec) -> Result<Self, ObjectError> {
        let object_name = spec
            .object_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .ok_or(ObjectError::MissingField { category, field: "object_name" })?
            .to_lowercase();

        let qualified = format!("{}.{}.{}", context.database, context.schema, object_name);

        let columns = spec
            .columns
            .as_ref()
            .map(|declared| declared.as_spec())
            .transpose()
            .map_err(|message| ObjectError::InvalidColumns {
                object: qualified.clone(),
                message: format!("invalid columns: {}", message),
            })?;

        let kind = match category {
            ObjectCategory::Tables => ObjectKind::Table {
                table_columns: columns.map(format_table_columns),
            },
            ObjectCategory::DynamicTables => dynamic_table_kind(&qualified, spec, columns)?,
            _ => ObjectKind::Plain,
        };

        Ok(Self {
            role: context.role.clone(),
            database: context.database.clone(),
            schema: context.schema.clone(),
            object_name,
            category,
            prefix: spec.prefix.clone(),
            suffix: spec.suffix.clone(),
            comment: spec.comment.clone(),
            env: context.env.clone(),
            kind,
            extra: spec.extra.clone(),
        })
    }

    /// Prefix, object name and suffix joined by `_`, lower-cased
    pub fn name_token(&self) -> String {
        [self.prefix.as_deref(), Some(self.object_name.as_str()), self.suffix.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("_")
            .to_lowercase()
    }

    /// `<name_token>.sql`
    pub fn file_name(&self) -> String {
        format!("{}.sql", self.name_token())
    }

    /// `<root>/databases/<db>/schemas/<schema>/<object_type>/<name_token>.sql`
    pub fn generate_object_path(&self, root: impl AsRef<Path>) -> PathBuf {
        root.as_ref()
            .join("databases")
            .join(&self.database)
            .join("schemas")
            .join(&self.schema)
            .join(self.category.as_str())
            .join(self.file_name())
    }

    /// Placeholder values exposed to SQL templates
    pub fn fields(&self) -> BTreeMap<String, String> {
        let mut fields = BTreeMap::new();

        for (key, value) in &self.extra {
            fields.insert(key.clone(), scalar_to_string(value));
        }

        fields.insert("role".to_string(), self.role.clone());
        fields.insert("database".to_string(), self.database.clone());
        fields.insert("schema".to_string(), self.schema.clone());
        fields.insert("object_name".to_string(), self.object_name.clone());
        fields.insert("object_type".to_string(), self.category.as_str().to_string());
        fields.insert("env".to_string(), self.env.clone());
        fields.insert("prefix".to_string(), self.prefix.clone().unwrap_or_default());
        fields.insert("suffix".to_string(), self.suffix.clone().unwrap_or_default());
        if let Some(comment) = &self.comment {
            fields.insert("comment".to_string(), comment.clone());
        }

        match &self.kind {
            ObjectKind::Plain => {}
            ObjectKind::Table { table_columns } => {
                if let Some(columns) = table_columns {
                    fields.insert("table_columns".to_string(), columns.clone());
                }
            }
            ObjectKind::DynamicTable {
                pattern,
                formatted_transformations,
                source_database,
                source_schema,
                source_object,
            } => {
                fields.insert("pattern".to_string(), pattern.clone());
                fields.insert("formatted_transformations".to_string(), formatted_transformations.clone());
                let sources = [
                    ("source_database", source_database),
                    ("source_schema", source_schema),
                    ("source_object", source_object),
                ];
                for (key, value) in sources {
                    if let Some(value) = value {
                        fields.insert(key.to_string(), value.clone());
                    }
                }
            }
        }

        fields.insert("name".to_string(), self.name_token());
        fields
    }

    /// Render `sql_template` with this object's fields
    ///
    /// `overrides` win over descriptor fields, except `name`, which is
    /// always the current name token.
    pub fn get_ddl(&self, sql_template: &str, overrides: &BTreeMap<String, String>) -> Result<String, RenderError> {
        let mut fields = self.fields();
        fields.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
        fields.insert("name".to_string(), self.name_token());

        render_template(sql_template, &fields)
    }
}

impl fmt::Display for ObjectDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}.{}", self.role, self.database, self.schema, self.object_name)
    }
}

fn dynamic_table_kind(
    object: &str,
    spec: &ObjectSpec,
    columns: Option<&ColumnSpec>,
) -> Result<ObjectKind, ObjectError> {
    let pattern = spec
        .pattern
        .as_deref()
        .filter(|pattern| pattern.contains(COLUMN_NAME_PLACEHOLDER))
        .ok_or_else(|| ObjectError::MissingPattern { object: object.to_string() })?;

    let columns = match columns {
        Some(ColumnSpec::Names(names)) => names,
        Some(ColumnSpec::Typed(_)) => {
            return Err(ObjectError::InvalidColumns {
                object: object.to_string(),
                message: "dynamic table columns must be a list of column names".to_string(),
            })
        }
        None => {
            return Err(ObjectError::InvalidColumns {
                object: object.to_string(),
                message: "dynamic tables require a list of columns".to_string(),
            })
        }
    };

    let formatted_transformations = format_transformations(pattern, columns).map_err(|source| {
        ObjectError::Pattern { object: object.to_string(), source }
    })?;

    Ok(ObjectKind::DynamicTable {
        pattern: pattern.to_string(),
        formatted_transformations,
        source_database: spec.source_database.clone(),
        source_schema: spec.source_schema.clone(),
        source_object: spec.source_object.clone(),
    })
}

fn scalar_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}
