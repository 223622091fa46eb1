//! Concept model: a node in the semantic (vector-similarity) graph.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A concept in the semantic graph.
///
/// Concepts carry an optional embedding vector, generated by an external
/// provider and stored as the vector-indexed field. Never mutated after
/// creation; destroyed only on a full graph clear.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Concept {
    pub uuid: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Embedding vector; not serialized in tool responses (too large, opaque).
    #[serde(skip_serializing)]
    pub embedding: Option<Vec<f32>>,
    pub created_at: DateTime<Utc>,
}

impl Concept {
    pub fn new(name: String, description: Option<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name,
            description,
            embedding: None,
            created_at: Utc::now(),
        }
    }
}

/// A semantic search hit: a concept plus its similarity score.
#[derive(Debug, Clone, Serialize)]
pub struct SemanticMatch {
    pub concept: Concept,
    pub score: f64,
}

/// A semantic search hit enriched with `X_REPRESENTS` cross-link targets,
/// computed in the same traversal as the vector search.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedSemanticMatch {
    pub concept: Concept,
    pub score: f64,
    pub linked_entity_ids: Vec<Uuid>,
    pub linked_entity_names: Vec<String>,
}
