//! Run report schema (v1)
//!
//! One report per schema run. Every object the run touched appears once,
//! and every category that was aborted appears in `category_failures`.

use serde::{Deserialize, Serialize};
use snowgen_core::ObjectCategory;
use snowgen_repo::SaveOutcome;

/// Report schema version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportVersion {
    pub major: u32,
    pub minor: u32,
}

impl ReportVersion {
    /// Current report schema version
    pub const CURRENT: ReportVersion = ReportVersion { major: 1, minor: 0 };
}

impl std::fmt::Display for ReportVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Final state of one object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectStatus {
    Created,
    Replaced,
    Unchanged,
    Failed,
}

impl From<SaveOutcome> for ObjectStatus {
    fn from(outcome: SaveOutcome) -> Self {
        match outcome {
            SaveOutcome::Created => ObjectStatus::Created,
            SaveOutcome::Replaced => ObjectStatus::Replaced,
            SaveOutcome::Unchanged => ObjectStatus::Unchanged,
        }
    }
}

impl std::fmt::Display for ObjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ObjectStatus::Created => "created",
            ObjectStatus::Replaced => "replaced",
            ObjectStatus::Unchanged => "unchanged",
            ObjectStatus::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Outcome of one object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectOutcome {
    pub category: ObjectCategory,

    /// `role.database.schema.object_name`, or the best identity available
    pub object: String,

    /// Object file, when the object got far enough to have one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    pub status: ObjectStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A category whose remaining work was abandoned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryFailure {
    pub category: ObjectCategory,
    pub message: String,
}

/// Summary statistics for a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub created: usize,
    pub replaced: usize,
    pub unchanged: usize,
    pub failed: usize,
    pub failed_categories: usize,
}

/// Result of one schema run (report.json v1)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub version: ReportVersion,

    /// Timestamp (RFC 3339)
    pub timestamp: String,

    /// Schema template the run used
    pub template: String,

    pub database: String,
    pub schema: String,

    pub summary: RunSummary,
    pub objects: Vec<ObjectOutcome>,
    pub category_failures: Vec<CategoryFailure>,
}

impl RunReport {
    /// Create an empty report
    pub fn new(template: impl Into<String>, database: impl Into<String>, schema: impl Into<String>) -> Self {
        Self {
            version: ReportVersion::CURRENT,
            timestamp: chrono::Utc::now().to_rfc3339(),
            template: template.into(),
            database: database.into(),
            schema: schema.into(),
            summary: RunSummary::default(),
            objects: Vec::new(),
            category_failures: Vec::new(),
        }
    }

    /// Record an object that was persisted (or kept)
    pub fn record_saved(
        &mut self,
        category: ObjectCategory,
        object: impl Into<String>,
        path: impl Into<String>,
        outcome: SaveOutcome,
    ) {
        self.push(ObjectOutcome {
            category,
            object: object.into(),
            path: Some(path.into()),
            status: outcome.into(),
            error: None,
        });
    }

    /// Record an object that could not be generated
    pub fn record_failure(&mut self, category: ObjectCategory, object: impl Into<String>, error: impl Into<String>) {
        self.push(ObjectOutcome {
            category,
            object: object.into(),
            path: None,
            status: ObjectStatus::Failed,
            error: Some(error.into()),
        });
    }

    /// Record a category whose remaining objects were skipped
    pub fn record_category_failure(&mut self, category: ObjectCategory, message: impl Into<String>) {
        self.summary.failed_categories += 1;
        self.category_failures.push(CategoryFailure {
            category,
            message: message.into(),
        });
    }

    fn push(&mut self, outcome: ObjectOutcome) {
        match outcome.status {
            ObjectStatus::Created => self.summary.created += 1,
            ObjectStatus::Replaced => self.summary.replaced += 1,
            ObjectStatus::Unchanged => self.summary.unchanged += 1,
            ObjectStatus::Failed => self.summary.failed += 1,
        }
        self.objects.push(outcome);
    }

    /// Outcomes of one status
    pub fn with_status(&self, status: ObjectStatus) -> impl Iterator<Item = &ObjectOutcome> + '_ {
        self.objects.iter().filter(move |o| o.status == status)
    }

    /// Whether any object or category failed
    pub fn has_failures(&self) -> bool {
        self.summary.failed > 0 || self.summary.failed_categories > 0
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Save to file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let json = self.to_json()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        std::fs::write(path, json)
    }
}
