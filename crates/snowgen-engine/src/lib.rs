//! snowgen engine - schema generation runs
//!
//! This crate drives one schema-creation run:
//! - Resolving the schema template and its categories in run order
//! - Discovering tables from data templates and existing DDL
//! - Rendering and persisting every object
//! - Collecting outcomes into a run report

pub mod orchestrator;
pub mod report;

pub use orchestrator::{create_new_schema, EngineError, RunOptions};
pub use report::{CategoryFailure, ObjectOutcome, ObjectStatus, ReportVersion, RunReport, RunSummary};
