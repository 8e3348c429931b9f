//! Column specifications and column clause formatting

use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::render::{render_template, RenderError};

/// Separator between entries of a rendered column clause
pub const COLUMN_SEPARATOR: &str = ",\n    ";

/// Longest column name the warehouse accepts
pub const MAX_COLUMN_NAME_LEN: usize = 128;

/// Words that cannot be used unquoted as identifiers
pub const RESERVED_KEYWORDS: &[&str] = &[
    "ACCOUNT", "ALL", "ALTER", "AND", "ANY", "AS", "BETWEEN", "BY", "CASE", "CAST",
    "CHECK", "COLUMN", "CONNECT", "CONNECTION", "CONSTRAINT", "CREATE", "CROSS",
    "CURRENT", "CURRENT_DATE", "CURRENT_TIME", "CURRENT_TIMESTAMP", "CURRENT_USER",
    "DATABASE", "DELETE", "DISTINCT", "DROP", "ELSE", "EXISTS", "FALSE", "FOLLOWING",
    "FOR", "FROM", "FULL", "GRANT", "GROUP", "GSCLUSTER", "HAVING", "ILIKE", "IN",
    "INCREMENT", "INNER", "INSERT", "INTERSECT", "INTO", "IS", "ISSUE", "JOIN",
    "LATERAL", "LEFT", "LIKE", "LOCALTIME", "LOCALTIMESTAMP", "MINUS", "NATURAL",
    "NOT", "NULL", "OF", "ON", "OR", "ORDER", "ORGANIZATION", "QUALIFY", "REGEXP",
    "REVOKE", "RIGHT", "RLIKE", "ROW", "ROWS", "SAMPLE", "SCHEMA", "SELECT", "SET",
    "SOME", "START", "TABLE", "TABLESAMPLE", "THEN", "TO", "TRIGGER", "TRUE",
    "TRY_CAST", "UNION", "UNIQUE", "UPDATE", "USING", "VALUES", "VIEW", "WHEN",
    "WHENEVER", "WHERE", "WITH",
];

/// Ordered column list of a table
///
/// Accepted either as a plain list of names (every column is `VARCHAR`)
/// or as a mapping of name to declared type. Mapping order is preserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnSpec {
    /// Bare column names
    Names(Vec<String>),

    /// Column name and declared type, in declaration order
    Typed(Vec<(String, String)>),
}

impl ColumnSpec {
    /// Column names in order
    pub fn names(&self) -> Vec<&str> {
        match self {
            Self::Names(names) => names.iter().map(String::as_str).collect(),
            Self::Typed(columns) => columns.iter().map(|(name, _)| name.as_str()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Names(names) => names.len(),
            Self::Typed(columns) => columns.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Vec<String>> for ColumnSpec {
    fn from(names: Vec<String>) -> Self {
        Self::Names(names)
    }
}

impl Serialize for ColumnSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Names(names) => names.serialize(serializer),
            Self::Typed(columns) => {
                let mut map = serializer.serialize_map(Some(columns.len()))?;
                for (name, data_type) in columns {
                    map.serialize_entry(name, data_type)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for ColumnSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ColumnSpecVisitor)
    }
}

struct ColumnSpecVisitor;

impl<'de> Visitor<'de> for ColumnSpecVisitor {
    type Value = ColumnSpec;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a list of column names or a mapping of column name to type")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut names = Vec::new();
        while let Some(name) = seq.next_element::<String>()? {
            names.push(name);
        }
        Ok(ColumnSpec::Names(names))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut columns: Vec<(String, String)> = Vec::new();
        while let Some((name, data_type)) = map.next_entry::<String, String>()? {
            if columns.iter().any(|(existing, _)| *existing == name) {
                return Err(de::Error::custom(format!("duplicate column `{}`", name)));
            }
            columns.push((name, data_type));
        }
        Ok(ColumnSpec::Typed(columns))
    }
}

/// `columns` entry as written in a schema template
///
/// A malformed shape is kept instead of failing the whole templates file;
/// it surfaces as an error when the declaring object is built.
#[derive(Debug, Clone, PartialEq)]
pub enum DeclaredColumns {
    Valid(ColumnSpec),
    Invalid { raw: serde_yaml::Value, message: String },
}

impl DeclaredColumns {
    /// The column list, or why it could not be read
    pub fn as_spec(&self) -> Result<&ColumnSpec, &str> {
        match self {
            Self::Valid(columns) => Ok(columns),
            Self::Invalid { message, .. } => Err(message),
        }
    }
}

impl From<ColumnSpec> for DeclaredColumns {
    fn from(columns: ColumnSpec) -> Self {
        Self::Valid(columns)
    }
}

impl Serialize for DeclaredColumns {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Valid(columns) => columns.serialize(serializer),
            Self::Invalid { raw, .. } => raw.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for DeclaredColumns {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_yaml::Value::deserialize(deserializer)?;
        Ok(match ColumnSpec::deserialize(raw.clone()) {
            Ok(columns) => Self::Valid(columns),
            Err(err) => Self::Invalid { raw, message: err.to_string() },
        })
    }
}

/// Inline SQL comment flagging problems with a column name
///
/// Empty when the name is fine. Several problems concatenate.
pub fn check_column_validity(column: &str) -> String {
    let mut comment = String::new();

    if RESERVED_KEYWORDS.contains(&column) {
        comment.push_str(" -- This column name is not allowed");
    }
    if column.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        comment.push_str(" -- Column name cannot start with a number");
    }
    if column.chars().count() > MAX_COLUMN_NAME_LEN {
        comment.push_str(" -- Column name should not exceed 128 characters");
    }

    comment
}

/// Render the column clause of a `CREATE TABLE` statement
pub fn format_table_columns(columns: &ColumnSpec) -> String {
    let entries: Vec<String> = match columns {
        ColumnSpec::Names(names) => names
            .iter()
            .map(|col| format!("\"{}\" VARCHAR{}", col, check_column_validity(col)))
            .collect(),
        ColumnSpec::Typed(columns) => columns
            .iter()
            .map(|(col, data_type)| format!("\"{}\" {}{}", col, data_type, check_column_validity(col)))
            .collect(),
    };

    entries.join(COLUMN_SEPARATOR)
}

/// Render each column through `pattern`, which references `{column_name}`
pub fn format_transformations(pattern: &str, columns: &[String]) -> Result<String, RenderError> {
    let mut fields = BTreeMap::new();
    let mut entries = Vec::with_capacity(columns.len());

    for column in columns {
        fields.insert("column_name".to_string(), column.clone());
        let rendered = render_template(pattern, &fields)?;
        entries.push(rendered + &check_column_validity(column));
    }

    Ok(entries.join(COLUMN_SEPARATOR))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn names(cols: &[&str]) -> ColumnSpec {
        ColumnSpec::Names(cols.iter().map(|c| c.to_string()).collect())
    }

    #[test]
    fn names_render_as_varchar_in_order() {
        let clause = format_table_columns(&names(&["id", "email", "created_at"]));
        assert_eq!(clause, "\"id\" VARCHAR,\n    \"email\" VARCHAR,\n    \"created_at\" VARCHAR");
    }

    #[test]
    fn typed_columns_keep_declared_type() {
        let spec = ColumnSpec::Typed(vec![
            ("id".to_string(), "NUMBER(38,0)".to_string()),
            ("name".to_string(), "TEXT".to_string()),
        ]);
        assert_eq!(format_table_columns(&spec), "\"id\" NUMBER(38,0),\n    \"name\" TEXT");
    }

    #[test]
    fn each_validity_condition_triggers_alone() {
        assert_eq!(check_column_validity("SELECT"), " -- This column name is not allowed");
        assert_eq!(check_column_validity("1st_value"), " -- Column name cannot start with a number");
        assert_eq!(
            check_column_validity(&"a".repeat(129)),
            " -- Column name should not exceed 128 characters"
        );
        assert_eq!(check_column_validity(&"a".repeat(128)), "");
        assert_eq!(check_column_validity("select"), "");
    }

    #[test]
    fn validity_comments_concatenate() {
        let long_numeric = format!("9{}", "x".repeat(200));
        assert_eq!(
            check_column_validity(&long_numeric),
            " -- Column name cannot start with a number -- Column name should not exceed 128 characters"
        );
    }

    #[test]
    fn reserved_column_is_annotated_in_clause() {
        let clause = format_table_columns(&names(&["TABLE", "ok"]));
        assert_eq!(clause, "\"TABLE\" VARCHAR -- This column name is not allowed,\n    \"ok\" VARCHAR");
    }

    #[test]
    fn transformations_use_pattern() {
        let cols = vec!["A".to_string(), "ORDER".to_string()];
        let out = format_transformations("TRIM(\"{column_name}\") AS \"{column_name}\"", &cols).unwrap();
        assert_eq!(
            out,
            "TRIM(\"A\") AS \"A\",\n    TRIM(\"ORDER\") AS \"ORDER\" -- This column name is not allowed"
        );
    }

    #[test]
    fn transformation_pattern_with_unknown_placeholder_fails() {
        let cols = vec!["A".to_string()];
        assert!(format_transformations("{col}", &cols).is_err());
    }

    #[test]
    fn deserializes_list_and_ordered_mapping() {
        let list: ColumnSpec = serde_yaml::from_str("[b, a]").unwrap();
        assert_eq!(list, names(&["b", "a"]));

        let map: ColumnSpec = serde_yaml::from_str("zeta: NUMBER\nalpha: DATE\n").unwrap();
        assert_eq!(
            map,
            ColumnSpec::Typed(vec![
                ("zeta".to_string(), "NUMBER".to_string()),
                ("alpha".to_string(), "DATE".to_string()),
            ])
        );
        assert_eq!(map.names(), vec!["zeta", "alpha"]);
    }

    #[test]
    fn rejects_other_shapes() {
        assert!(serde_yaml::from_str::<ColumnSpec>("just_a_string").is_err());
        assert!(serde_yaml::from_str::<ColumnSpec>("[[nested]]").is_err());
    }

    #[test]
    fn declared_columns_keep_bad_shapes() {
        let declared: DeclaredColumns = serde_yaml::from_str("just_a_string").unwrap();
        assert!(matches!(declared, DeclaredColumns::Invalid { .. }));
        assert!(declared.as_spec().unwrap_err().contains("list of column names"));

        let nested: DeclaredColumns = serde_yaml::from_str("[[nested]]").unwrap();
        assert!(nested.as_spec().is_err());

        let typed: DeclaredColumns = serde_yaml::from_str("zeta: NUMBER\nalpha: DATE\n").unwrap();
        assert_eq!(typed.as_spec().unwrap().names(), vec!["zeta", "alpha"]);
    }
}
