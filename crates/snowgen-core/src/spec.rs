//! Declarative schema templates and the object specs inside them

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::category::ObjectCategory;
use crate::columns::{ColumnSpec, DeclaredColumns};

/// One object entry inside a schema template category
///
/// Fields may be incomplete; discovered metadata fills the gaps before
/// the object is rendered (see [`ObjectSpec::merge_discovered`]).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectSpec {
    /// Object name (required before rendering)
    #[serde(default)]
    pub object_name: Option<String>,

    /// SQL template file used to render the object (required)
    #[serde(default)]
    pub template_name: Option<String>,

    /// Column list (tables and dynamic tables); its shape is checked when
    /// the object is built
    #[serde(default)]
    pub columns: Option<DeclaredColumns>,

    /// Generate one table per file found in the schema's data template folder
    #[serde(default)]
    pub generate_columns_from_template: bool,

    /// Generate one dynamic table per existing table in a source schema
    #[serde(default)]
    pub generate_columns_from_table: bool,

    #[serde(default)]
    pub source_database: Option<String>,

    #[serde(default)]
    pub source_schema: Option<String>,

    #[serde(default)]
    pub source_object: Option<String>,

    /// Per-column transformation, referencing `{column_name}`
    #[serde(default)]
    pub pattern: Option<String>,

    #[serde(default)]
    pub prefix: Option<String>,

    #[serde(default)]
    pub suffix: Option<String>,

    #[serde(default)]
    pub comment: Option<String>,

    /// Any other field, exposed to templates as a placeholder
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl ObjectSpec {
    /// Create a spec with just a name and template
    pub fn new(object_name: impl Into<String>, template_name: impl Into<String>) -> Self {
        Self {
            object_name: Some(object_name.into()),
            template_name: Some(template_name.into()),
            ..Self::default()
        }
    }

    /// Set columns
    pub fn with_columns(mut self, columns: impl Into<ColumnSpec>) -> Self {
        self.columns = Some(DeclaredColumns::Valid(columns.into()));
        self
    }

    /// Set prefix and suffix
    pub fn with_affixes(mut self, prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self.suffix = Some(suffix.into());
        self
    }

    /// Set transformation pattern
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Merge discovered metadata into a copy of this spec
    ///
    /// Fields declared in the spec win; discovered values only fill gaps.
    /// The discovered name is the identity of the generated object, so it
    /// always becomes `object_name`.
    pub fn merge_discovered(&self, discovered: &DiscoveredMetadata) -> ObjectSpec {
        let mut merged = self.clone();

        merged.object_name = Some(discovered.name.clone());

        if merged.columns.is_none() && !discovered.columns.is_empty() {
            merged.columns = Some(ColumnSpec::Names(discovered.columns.clone()).into());
        }
        fill(&mut merged.comment, &discovered.comment);
        fill(&mut merged.source_database, &discovered.source_database);
        fill(&mut merged.source_schema, &discovered.source_schema);
        fill(&mut merged.source_object, &discovered.source_object);

        merged
    }
}

fn fill(field: &mut Option<String>, discovered: &Option<String>) {
    if field.is_none() {
        field.clone_from(discovered);
    }
}

/// Structural facts recovered from data files or existing DDL
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredMetadata {
    /// Name of the object to generate
    pub name: String,

    /// Column names in order of appearance
    pub columns: Vec<String>,

    #[serde(default)]
    pub comment: Option<String>,

    #[serde(default)]
    pub source_database: Option<String>,

    #[serde(default)]
    pub source_schema: Option<String>,

    #[serde(default)]
    pub source_object: Option<String>,
}

/// Declarative description of one schema's desired contents
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaTemplate {
    /// Template name
    pub name: String,

    /// Owning database
    pub database: String,

    /// Owning role
    pub role: String,

    #[serde(default)]
    pub schema_definition: Vec<ObjectSpec>,

    #[serde(default)]
    pub file_formats: Vec<ObjectSpec>,

    #[serde(default, alias = "stages")]
    pub internal_stages: Vec<ObjectSpec>,

    #[serde(default)]
    pub sequences: Vec<ObjectSpec>,

    #[serde(default)]
    pub tables: Vec<ObjectSpec>,

    #[serde(default)]
    pub dynamic_tables: Vec<ObjectSpec>,

    #[serde(default)]
    pub procedures: Vec<ObjectSpec>,
}

impl SchemaTemplate {
    /// Specs declared for a category
    pub fn specs(&self, category: ObjectCategory) -> &[ObjectSpec] {
        match category {
            ObjectCategory::SchemaDefinition => &self.schema_definition,
            ObjectCategory::FileFormats => &self.file_formats,
            ObjectCategory::InternalStages => &self.internal_stages,
            ObjectCategory::Sequences => &self.sequences,
            ObjectCategory::Tables => &self.tables,
            ObjectCategory::DynamicTables => &self.dynamic_tables,
            ObjectCategory::Procedures => &self.procedures,
        }
    }

    /// Non-empty categories in run order
    pub fn categories(&self) -> impl Iterator<Item = (ObjectCategory, &[ObjectSpec])> + '_ {
        ObjectCategory::RUN_ORDER
            .into_iter()
            .map(move |category| (category, self.specs(category)))
            .filter(|(_, specs)| !specs.is_empty())
    }
}

/// Top-level layout of the schema templates file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaTemplates {
    #[serde(default)]
    pub schemas: Vec<SchemaTemplate>,
}

impl SchemaTemplates {
    /// Find a template by name
    pub fn get(&self, name: &str) -> Option<&SchemaTemplate> {
        self.schemas.iter().find(|schema| schema.name == name)
    }

    /// Template names in file order
    pub fn names(&self) -> Vec<&str> {
        self.schemas.iter().map(|schema| schema.name.as_str()).collect()
    }
}
