//! Data file name grammar: `<stem>_<date>.<ext>`

use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

static DATED_FILENAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<filename>.+)_(?P<date>\d{4}-\d{2}-\d{2}|\d{8})\.(?P<file_type>.+)$").expect("valid regex")
});

/// Parts of a dated data file name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilenameParts {
    /// Everything before the last `_<date>`
    pub filename: String,

    /// `YYYY-MM-DD` or `YYYYMMDD`, as written
    pub date: String,

    /// Extension after the date
    pub file_type: String,
}

impl FilenameParts {
    /// Calendar date, if the digits form a real date
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        let format = if self.date.contains('-') { "%Y-%m-%d" } else { "%Y%m%d" };
        NaiveDate::parse_from_str(&self.date, format).ok()
    }
}

/// Split a dated file name; `None` when the name does not follow the grammar
pub fn parse_filename(name: &str) -> Option<FilenameParts> {
    let caps = DATED_FILENAME_REGEX.captures(name)?;

    Some(FilenameParts {
        filename: caps["filename"].to_string(),
        date: caps["date"].to_string(),
        file_type: caps["file_type"].to_string(),
    })
}
