//! Object categories
//!
//! A category decides the directory an object lands in and which
//! category-specific fields its descriptor carries.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of database object managed in a schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectCategory {
    /// `CREATE SCHEMA` and related statements
    SchemaDefinition,

    /// File formats
    FileFormats,

    /// Internal stages
    InternalStages,

    /// Sequences
    Sequences,

    /// Tables (column clause rendered from the spec or a data template)
    Tables,

    /// Dynamic tables (columns and source recovered from an existing table)
    DynamicTables,

    /// Stored procedures
    Procedures,
}

impl ObjectCategory {
    /// All categories in the order a schema run processes them
    pub const RUN_ORDER: [ObjectCategory; 7] = [
        Self::SchemaDefinition,
        Self::FileFormats,
        Self::InternalStages,
        Self::Sequences,
        Self::Tables,
        Self::DynamicTables,
        Self::Procedures,
    ];

    /// Directory name used under `schemas/<schema>/`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SchemaDefinition => "schema_definition",
            Self::FileFormats => "file_formats",
            Self::InternalStages => "internal_stages",
            Self::Sequences => "sequences",
            Self::Tables => "tables",
            Self::DynamicTables => "dynamic_tables",
            Self::Procedures => "procedures",
        }
    }
}

impl fmt::Display for ObjectCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "schema_definition" => Ok(Self::SchemaDefinition),
            "file_formats" => Ok(Self::FileFormats),
            "internal_stages" | "stages" => Ok(Self::InternalStages),
            "sequences" => Ok(Self::Sequences),
            "tables" => Ok(Self::Tables),
            "dynamic_tables" => Ok(Self::DynamicTables),
            "procedures" => Ok(Self::Procedures),
            other => Err(UnknownCategory(other.to_string())),
        }
    }
}

/// Returned when a string does not name a category
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown object category: {0}")]
pub struct UnknownCategory(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_order_starts_with_schema_definition() {
        assert_eq!(ObjectCategory::RUN_ORDER[0], ObjectCategory::SchemaDefinition);
        assert_eq!(ObjectCategory::RUN_ORDER[6], ObjectCategory::Procedures);
    }

    #[test]
    fn stages_alias_parses() {
        assert_eq!("stages".parse::<ObjectCategory>(), Ok(ObjectCategory::InternalStages));
        assert!("views".parse::<ObjectCategory>().is_err());
    }

    #[test]
    fn directory_names_round_trip() {
        for category in ObjectCategory::RUN_ORDER {
            assert_eq!(category.as_str().parse::<ObjectCategory>(), Ok(category));
        }
    }
}
