//! Entity model representing nodes in the entity graph.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use uuid::Uuid;

/// A persistent named thing in the entity graph.
///
/// `name` need not be unique; lookups prefer an exact match, then a
/// case-insensitive substring match. Deleting an entity detaches all of
/// its relations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub uuid: Uuid,
    pub name: String,
    pub entity_type: String,
    #[serde(default)]
    pub properties: HashMap<String, JsonValue>,
    pub created_at: DateTime<Utc>,
}

impl Entity {
    pub fn new(name: String, entity_type: String, properties: HashMap<String, JsonValue>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name,
            entity_type,
            properties,
            created_at: Utc::now(),
        }
    }
}

/// A directed relation between two entities (`E_RELATES`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityRelation {
    pub source_id: Uuid,
    pub target_id: Uuid,
    pub relationship_type: String,
}

/// A mention to resolve against the entity graph.
#[derive(Debug, Clone, Deserialize)]
pub struct Mention {
    pub mention: String,
    #[serde(default)]
    pub entity_type: Option<String>,
}
