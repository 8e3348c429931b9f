//! Regex-level recovery of structure from existing DDL text
//!
//! This is deliberately not a SQL parser. Every lookup is best effort and a
//! missing clause simply leaves the corresponding field empty.

use regex::Regex;
use snowgen_core::DiscoveredMetadata;
use std::path::Path;
use std::sync::LazyLock;

static QUOTED_IDENTIFIER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]*)""#).expect("valid regex"));

static USE_DATABASE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"USE\s+DATABASE\s+(\w+)").expect("valid regex"));

static USE_SCHEMA_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"USE\s+SCHEMA\s+(\w+)").expect("valid regex"));

/// Tried in order; the first one that matches names the source table
static TABLE_NAME_REGEXES: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        r"CREATE\s+OR\s+REPLACE\s+TABLE\s+(?:IF\s+NOT\s+EXISTS\s+)?((?:\w+\.){0,2}\w+)",
        r"CREATE\s+TABLE\s+(?:IF\s+NOT\s+EXISTS\s+)?((?:\w+\.){0,2}\w+)",
        r"CREATE\s+OR\s+ALTER\s+TABLE\s+((?:\w+\.){0,2}\w+)",
    ]
    .map(|pattern| Regex::new(pattern).expect("valid regex"))
});

/// Upstream coordinates of a table, as far as they could be recovered
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceRef {
    pub database: Option<String>,
    pub schema: Option<String>,
    pub object: Option<String>,
}

/// Everything recovered from one DDL text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DdlMetadata {
    /// Double-quoted identifiers in order of appearance
    pub columns: Vec<String>,
    pub source: SourceRef,
}

impl DdlMetadata {
    /// Extract columns and source from DDL text
    pub fn extract(ddl: &str) -> Self {
        Self {
            columns: extract_columns(ddl),
            source: extract_source(ddl),
        }
    }

    /// Attach a name, producing discovered metadata for a dynamic table
    pub fn into_discovered(self, name: impl Into<String>) -> DiscoveredMetadata {
        DiscoveredMetadata {
            name: name.into(),
            columns: self.columns,
            comment: None,
            source_database: self.source.database,
            source_schema: self.source.schema,
            source_object: self.source.object,
        }
    }
}

/// Every substring enclosed in double quotes, duplicates kept
pub fn extract_columns(ddl: &str) -> Vec<String> {
    QUOTED_IDENTIFIER_REGEX
        .captures_iter(ddl)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Recover `USE DATABASE`, `USE SCHEMA` and the created table name
pub fn extract_source(ddl: &str) -> SourceRef {
    let first_capture = |re: &Regex| re.captures(ddl).map(|caps| caps[1].to_string());

    let object = TABLE_NAME_REGEXES
        .iter()
        .find_map(|re| first_capture(re))
        .map(|qualified| unqualified(&qualified).to_string());

    SourceRef {
        database: first_capture(&*USE_DATABASE_REGEX),
        schema: first_capture(&*USE_SCHEMA_REGEX),
        object,
    }
}

/// Discovered metadata for an existing table file
///
/// The generated object takes the lower-cased file stem as its name.
pub fn discover_from_table_ddl(file_name: &str, ddl: &str) -> DiscoveredMetadata {
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name);
    let name = stem.split('.').next().unwrap_or(stem).to_lowercase();

    DdlMetadata::extract(ddl.trim()).into_discovered(name)
}

fn unqualified(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}
