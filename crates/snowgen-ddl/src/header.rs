//! Column discovery from data template header rows

use snowgen_core::DiscoveredMetadata;
use std::path::Path;

use crate::filename::parse_filename;

/// Column names from the first line of a delimited file
pub fn read_header_columns(contents: &str, delimiter: &str) -> Vec<String> {
    let header = contents.lines().next().unwrap_or_default();
    let header = header.trim_start_matches('\u{feff}').trim();

    if header.is_empty() {
        return Vec::new();
    }

    header
        .split(delimiter)
        .map(|column| column.trim().to_string())
        .collect()
}

/// Discovered metadata for one data template file
///
/// The table is named after the dated stem of the file name, or the plain
/// file stem when the name carries no date.
pub fn discover_from_data_file(file_name: &str, contents: &str, delimiter: &str) -> DiscoveredMetadata {
    let name = match parse_filename(file_name) {
        Some(parts) => parts.filename,
        None => Path::new(file_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(file_name)
            .to_string(),
    };

    DiscoveredMetadata {
        name,
        columns: read_header_columns(contents, delimiter),
        comment: Some(format!("SQL generated using file {}", file_name)),
        ..DiscoveredMetadata::default()
    }
}
