//! Entity graph facade: `E_Entity` nodes and `E_RELATES` edges.

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use uuid::Uuid;

use super::validate_identifier;
use crate::context::AppGraph;
use crate::di::FromContext;
use crate::error::AppError;
use crate::graph::{Node, Row};
use crate::models::{Entity, EntityRelation, Mention};

/// Typed wrapper over the `E_Entity` label and `E_RELATES` edges.
#[derive(FromContext, Clone)]
pub struct EntityFacade {
    graph: AppGraph,
}

impl EntityFacade {
    pub async fn add_entity(
        &self,
        name: &str,
        entity_type: &str,
        properties: HashMap<String, JsonValue>,
    ) -> Result<Entity, AppError> {
        if name.trim().is_empty() {
            return Err(AppError::Validation("entity name must not be empty".into()));
        }
        if entity_type.trim().is_empty() {
            return Err(AppError::Validation("entity_type must not be empty".into()));
        }

        let entity = Entity::new(name.to_string(), entity_type.to_string(), properties);
        let properties_json = serde_json::to_value(&entity.properties).unwrap_or_default();

        self.graph
            .query(
                "CREATE (e:E_Entity {
                    uuid: $uuid,
                    name: $name,
                    entity_type: $entity_type,
                    properties: $properties,
                    created_at: $created_at
                })",
            )
            .param("uuid", entity.uuid.to_string())
            .param("name", &entity.name)
            .param("entity_type", &entity.entity_type)
            .param_raw("properties", properties_json)
            .param("created_at", entity.created_at.to_rfc3339())
            .run()
            .await?;

        Ok(entity)
    }

    /// Looks up an entity by its uuid, falling back to an exact name match.
    pub async fn get_entity(&self, name_or_uuid: &str) -> Result<Option<Entity>, AppError> {
        if let Ok(uuid) = Uuid::parse_str(name_or_uuid) {
            let row = self
                .graph
                .query("MATCH (e:E_Entity {uuid: $uuid}) RETURN e")
                .param("uuid", uuid.to_string())
                .fetch_one()
                .await?;
            if let Some(row) = row {
                return Ok(Some(Self::row_to_entity(&row)?));
            }
        }

        let row = self
            .graph
            .query("MATCH (e:E_Entity {name: $name}) RETURN e")
            .param("name", name_or_uuid)
            .fetch_one()
            .await?;

        row.map(|r| Self::row_to_entity(&r)).transpose()
    }

    /// Merges new properties into an existing entity's property map.
    pub async fn update_entity(
        &self,
        uuid: Uuid,
        name: Option<&str>,
        properties: Option<HashMap<String, JsonValue>>,
    ) -> Result<Entity, AppError> {
        let existing = self
            .get_entity(&uuid.to_string())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("entity {} not found", uuid)))?;

        let mut merged = existing.properties.clone();
        if let Some(props) = properties {
            merged.extend(props);
        }
        let new_name = name.unwrap_or(&existing.name).to_string();
        let properties_json = serde_json::to_value(&merged).unwrap_or_default();

        let row = self
            .graph
            .query(
                "MATCH (e:E_Entity {uuid: $uuid})
                 SET e.name = $name, e.properties = $properties
                 RETURN e",
            )
            .param("uuid", uuid.to_string())
            .param("name", &new_name)
            .param_raw("properties", properties_json)
            .fetch_one()
            .await?;

        match row {
            Some(row) => Self::row_to_entity(&row),
            None => Err(AppError::NotFound(format!("entity {} not found", uuid))),
        }
    }

    /// Deletes an entity, detaching all of its relations.
    pub async fn delete_entity(&self, uuid: Uuid) -> Result<(), AppError> {
        self.graph
            .query("MATCH (e:E_Entity {uuid: $uuid}) DETACH DELETE e")
            .param("uuid", uuid.to_string())
            .run()
            .await
    }

    /// Creates a directed `E_RELATES` edge between two entities.
    pub async fn link_entities(
        &self,
        source: Uuid,
        target: Uuid,
        relationship: &str,
    ) -> Result<EntityRelation, AppError> {
        validate_identifier("relationship type", relationship)?;

        self.graph
            .query(
                "MATCH (s:E_Entity {uuid: $source}), (t:E_Entity {uuid: $target})
                 CREATE (s)-[:E_RELATES {relationship_type: $rel}]->(t)",
            )
            .param("source", source.to_string())
            .param("target", target.to_string())
            .param("rel", relationship)
            .run()
            .await
            .map_err(|e| AppError::Relationship(format!("link_entities failed: {}", e)))?;

        Ok(EntityRelation {
            source_id: source,
            target_id: target,
            relationship_type: relationship.to_string(),
        })
    }

    /// Both outgoing and incoming `E_RELATES` edges for one entity.
    pub async fn get_relationships(&self, uuid: Uuid) -> Result<Vec<EntityRelation>, AppError> {
        let rows = self
            .graph
            .query(
                "MATCH (e:E_Entity {uuid: $uuid})-[r:E_RELATES]->(other:E_Entity)
                 RETURN e.uuid AS source, other.uuid AS target, r.relationship_type AS rel
                 UNION
                 MATCH (other:E_Entity)-[r:E_RELATES]->(e:E_Entity {uuid: $uuid})
                 RETURN other.uuid AS source, e.uuid AS target, r.relationship_type AS rel",
            )
            .param("uuid", uuid.to_string())
            .fetch_all()
            .await?;

        rows.iter().map(Self::row_to_relation).collect()
    }

    pub async fn get_relationships_batch(
        &self,
        uuids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<EntityRelation>>, AppError> {
        let mut out = HashMap::new();
        for uuid in uuids {
            out.insert(*uuid, self.get_relationships(*uuid).await?);
        }
        Ok(out)
    }

    /// Resolves mentions to entities: exact match first, then a
    /// case-insensitive substring match. Returns only matches.
    pub async fn resolve(&self, mentions: &[Mention]) -> Result<Vec<Entity>, AppError> {
        let mut resolved = Vec::new();
        for mention in mentions {
            if let Some(entity) = self.get_entity(&mention.mention).await? {
                if mention
                    .entity_type
                    .as_deref()
                    .map(|t| t == entity.entity_type)
                    .unwrap_or(true)
                {
                    resolved.push(entity);
                    continue;
                }
            }

            let rows = self
                .graph
                .query(
                    "MATCH (e:E_Entity)
                     WHERE toLower(e.name) CONTAINS toLower($mention)
                     RETURN e",
                )
                .param("mention", &mention.mention)
                .fetch_all()
                .await?;

            for row in &rows {
                let entity = Self::row_to_entity(row)?;
                if mention
                    .entity_type
                    .as_deref()
                    .map(|t| t == entity.entity_type)
                    .unwrap_or(true)
                {
                    resolved.push(entity);
                }
            }
        }
        Ok(resolved)
    }

    pub async fn search(
        &self,
        query: &str,
        entity_type: Option<&str>,
    ) -> Result<Vec<Entity>, AppError> {
        let cypher = if entity_type.is_some() {
            "MATCH (e:E_Entity)
             WHERE toLower(e.name) CONTAINS toLower($query) AND e.entity_type = $entity_type
             RETURN e"
        } else {
            "MATCH (e:E_Entity) WHERE toLower(e.name) CONTAINS toLower($query) RETURN e"
        };
        let mut q = self.graph.query(cypher).param("query", query);
        if let Some(t) = entity_type {
            q = q.param("entity_type", t);
        }
        let rows = q.fetch_all().await?;
        rows.iter().map(Self::row_to_entity).collect()
    }

    pub async fn get_by_type(&self, entity_type: &str, limit: usize) -> Result<Vec<Entity>, AppError> {
        let rows = self
            .graph
            .query("MATCH (e:E_Entity {entity_type: $entity_type}) RETURN e LIMIT $limit")
            .param("entity_type", entity_type)
            .param("limit", limit as i64)
            .fetch_all()
            .await?;
        rows.iter().map(Self::row_to_entity).collect()
    }

    fn row_to_entity(row: &Row) -> Result<Entity, AppError> {
        let node: Node = row.get("e")?;
        let uuid_str: String = node.get("uuid")?;
        let uuid = Uuid::parse_str(&uuid_str)
            .map_err(|e| AppError::Parse(format!("invalid entity uuid: {}", e)))?;
        let created_at: String = node.get("created_at")?;
        let created_at = DateTime::parse_from_rfc3339(&created_at)
            .map_err(|e| AppError::Parse(format!("invalid created_at: {}", e)))?
            .with_timezone(&Utc);
        let properties: HashMap<String, JsonValue> = node.get_opt("properties")?.unwrap_or_default();

        Ok(Entity {
            uuid,
            name: node.get("name")?,
            entity_type: node.get("entity_type")?,
            properties,
            created_at,
        })
    }

    fn row_to_relation(row: &Row) -> Result<EntityRelation, AppError> {
        let source: String = row.get("source")?;
        let target: String = row.get("target")?;
        let rel: String = row.get("rel")?;
        Ok(EntityRelation {
            source_id: Uuid::parse_str(&source)
                .map_err(|e| AppError::Parse(format!("invalid source uuid: {}", e)))?,
            target_id: Uuid::parse_str(&target)
                .map_err(|e| AppError::Parse(format!("invalid target uuid: {}", e)))?,
            relationship_type: rel,
        })
    }
}
