//! Database-level migrations (global, run once per database).
//!
//! MAGMA keeps all domain data in the Apache AGE graph, including concept
//! embeddings (stored as a node property, not a pgvector column), so there
//! is currently nothing to migrate at the plain-SQL level. The register
//! exists so a future cross-graph index or reporting table has somewhere
//! to go without reworking the runner.

use crate::migrations::traits::{DbMigration, Register};

/// Create the database migrations register.
pub fn create_register() -> Register<dyn DbMigration> {
    Register::<dyn DbMigration>::new()
}
