//! Causal graph models: cause/effect nodes and the links between them.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A node in the causal graph: a cause, an effect, or a referenced event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CausalNode {
    pub uuid: Uuid,
    pub description: String,
    pub node_type: String,
}

impl CausalNode {
    pub fn new(description: String, node_type: String) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            description,
            node_type,
        }
    }
}

/// A directed `C_CAUSES` edge between two causal nodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CausalLink {
    pub cause_id: Uuid,
    pub effect_id: Uuid,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence: Option<String>,
}

impl CausalLink {
    /// Clamps confidence into `[0, 1]` per the data model's invariant.
    pub fn new(cause_id: Uuid, effect_id: Uuid, confidence: f64, evidence: Option<String>) -> Self {
        Self {
            cause_id,
            effect_id,
            confidence: confidence.clamp(0.0, 1.0),
            evidence,
        }
    }
}

/// Direction for causal traversal from a set of starting nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CausalDirection {
    Upstream,
    Downstream,
    Both,
}
