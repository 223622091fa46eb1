//! Graph-level migrations (per-graph, run once per graph).

mod m001_label_indexes;

pub use m001_label_indexes::M001LabelIndexes;

use crate::migrations::traits::{GraphMigration, Register};

/// Create the graph migrations register for a given graph.
pub fn create_register(graph_name: &str) -> Register<dyn GraphMigration> {
    Register::<dyn GraphMigration>::new().register(M001LabelIndexes::new(graph_name))
}
