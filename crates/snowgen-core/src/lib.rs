//! snowgen core
//!
//! Domain model for generating warehouse DDL from declarative templates:
//! object categories, schema templates, resolved object descriptors and
//! the placeholder renderer that turns them into SQL text.

pub mod category;
pub mod columns;
pub mod config;
pub mod object;
pub mod render;
pub mod spec;

pub use category::{ObjectCategory, UnknownCategory};
pub use columns::{
    check_column_validity, format_table_columns, format_transformations, ColumnSpec, DeclaredColumns,
    RESERVED_KEYWORDS,
};
pub use config::{Config, ConfigError, DataConfig, PathsConfig, RenderConfig, DATA_TEMPLATES_FOLDER, SQL_TEMPLATES_FOLDER};
pub use object::{ObjectContext, ObjectDescriptor, ObjectError, ObjectKind};
pub use render::{render_template, RenderError};
pub use spec::{DiscoveredMetadata, ObjectSpec, SchemaTemplate, SchemaTemplates};
