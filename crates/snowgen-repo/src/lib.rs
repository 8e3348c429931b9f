//! Template and object storage
//!
//! This crate handles:
//! - Resolving schema templates (YAML) and SQL text templates by name
//! - Enumerating databases and schemas already present in the object tree
//! - Discovering table metadata from data templates and existing DDL
//! - Writing rendered objects with create-unless-exists semantics
//! - Scaffolding a fresh project

pub mod layout;
pub mod persist;
pub mod repository;
pub mod scaffold;
pub mod store;

pub use layout::{locate_folder, ProjectLayout};
pub use persist::{save_object, SaveOutcome};
pub use repository::{RepositoryError, TemplateRepository};
pub use scaffold::{create_database, init_project, TEMPLATE_DATABASE, TEMPLATE_SCHEMA};
pub use store::{FileStore, LocalStore, MemoryStore};
