//! Metadata recovery for generated DDL and data templates
//!
//! This crate handles:
//! - Recovering column names from existing `CREATE TABLE` statements
//! - Recovering the upstream database, schema and table a DDL file targets
//! - Parsing `<stem>_<date>.<ext>` data file names
//! - Reading column names from data file header rows

pub mod extractor;
pub mod filename;
pub mod header;

pub use extractor::{discover_from_table_ddl, extract_columns, extract_source, DdlMetadata, SourceRef};
pub use filename::{parse_filename, FilenameParts};
pub use header::{discover_from_data_file, read_header_columns};
