//! Cross-linker facade: typed edges bridging two of the four co-resident
//! graphs (`X_REPRESENTS`, `X_INVOLVES`, `X_REFERS_TO`, `X_AFFECTS`).

use std::collections::HashMap;
use uuid::Uuid;

use crate::context::AppGraph;
use crate::di::FromContext;
use crate::error::AppError;
use crate::graph::Row;
use crate::models::{CrossLink, CrossLinkStatistics, CrossLinkType};

#[derive(FromContext, Clone)]
pub struct CrossLinkerFacade {
    graph: AppGraph,
}

impl CrossLinkerFacade {
    pub async fn create_link(
        &self,
        source: Uuid,
        target: Uuid,
        link_type: CrossLinkType,
    ) -> Result<CrossLink, AppError> {
        if source == target {
            return Err(AppError::Validation("self-links are prohibited".into()));
        }

        let link = CrossLink::new(source, target, link_type);
        let cypher = format!(
            "MATCH (s {{uuid: $source}}), (t {{uuid: $target}})
             CREATE (s)-[:{} {{created_at: $created_at}}]->(t)",
            link_type.as_wire()
        );

        self.graph
            .query(&cypher)
            .param("source", source.to_string())
            .param("target", target.to_string())
            .param("created_at", link.created_at.to_rfc3339())
            .run()
            .await
            .map_err(|e| AppError::Relationship(format!("create_link failed: {}", e)))?;

        Ok(link)
    }

    pub async fn remove_link(&self, source: Uuid, target: Uuid, link_type: CrossLinkType) -> Result<(), AppError> {
        let cypher = format!(
            "MATCH (s {{uuid: $source}})-[r:{}]->(t {{uuid: $target}}) DELETE r",
            link_type.as_wire()
        );
        self.graph
            .query(&cypher)
            .param("source", source.to_string())
            .param("target", target.to_string())
            .run()
            .await
            .map_err(|e| AppError::Relationship(format!("remove_link failed: {}", e)))
    }

    pub async fn get_links_from(&self, source: Uuid) -> Result<Vec<CrossLink>, AppError> {
        let rows = self
            .graph
            .query(
                "MATCH (s {uuid: $source})-[r]->(t)
                 WHERE type(r) IN ['X_REPRESENTS', 'X_INVOLVES', 'X_REFERS_TO', 'X_AFFECTS']
                 RETURN t.uuid AS target, type(r) AS link_type, r.created_at AS created_at",
            )
            .param("source", source.to_string())
            .fetch_all()
            .await?;

        rows.iter().map(|r| Self::row_to_link(r, source, true)).collect()
    }

    pub async fn get_links_to(&self, target: Uuid) -> Result<Vec<CrossLink>, AppError> {
        let rows = self
            .graph
            .query(
                "MATCH (s)-[r]->(t {uuid: $target})
                 WHERE type(r) IN ['X_REPRESENTS', 'X_INVOLVES', 'X_REFERS_TO', 'X_AFFECTS']
                 RETURN s.uuid AS source, type(r) AS link_type, r.created_at AS created_at",
            )
            .param("target", target.to_string())
            .fetch_all()
            .await?;

        rows.iter().map(|r| Self::row_to_link(r, target, false)).collect()
    }

    pub async fn has_link(&self, source: Uuid, target: Uuid, link_type: CrossLinkType) -> Result<bool, AppError> {
        let cypher = format!(
            "MATCH (s {{uuid: $source}})-[r:{}]->(t {{uuid: $target}}) RETURN count(r) AS count",
            link_type.as_wire()
        );
        let row = self
            .graph
            .query(&cypher)
            .param("source", source.to_string())
            .param("target", target.to_string())
            .fetch_one()
            .await?;

        match row {
            Some(row) => {
                let count: i64 = row.get("count")?;
                Ok(count > 0)
            }
            None => Ok(false),
        }
    }

    pub async fn get_links_by_type(&self, link_type: CrossLinkType) -> Result<Vec<CrossLink>, AppError> {
        let cypher = format!(
            "MATCH (s)-[r:{}]->(t) RETURN s.uuid AS source, t.uuid AS target, r.created_at AS created_at",
            link_type.as_wire()
        );
        let rows = self.graph.query(&cypher).fetch_all().await?;

        rows.iter()
            .map(|row| {
                let source: String = row.get("source")?;
                let target: String = row.get("target")?;
                let created_at: String = row.get("created_at")?;
                Ok(CrossLink {
                    source_id: Uuid::parse_str(&source)
                        .map_err(|e| AppError::Parse(format!("invalid source uuid: {}", e)))?,
                    target_id: Uuid::parse_str(&target)
                        .map_err(|e| AppError::Parse(format!("invalid target uuid: {}", e)))?,
                    link_type,
                    created_at: chrono::DateTime::parse_from_rfc3339(&created_at)
                        .map_err(|e| AppError::Parse(format!("invalid created_at: {}", e)))?
                        .with_timezone(&chrono::Utc),
                })
            })
            .collect()
    }

    /// Nodes with no cross-link in any direction, scoped to each graph's
    /// own label to keep this facade from having to know every label.
    pub async fn find_orphans(&self, label: &str) -> Result<Vec<Uuid>, AppError> {
        super::validate_identifier("label", label)?;
        let cypher = format!(
            "MATCH (n:{})
             WHERE NOT (n)-[:X_REPRESENTS|X_INVOLVES|X_REFERS_TO|X_AFFECTS]-()
             RETURN n.uuid AS uuid",
            label
        );
        let rows = self.graph.query(&cypher).fetch_all().await?;
        rows.iter()
            .map(|row| {
                let uuid: String = row.get("uuid")?;
                Uuid::parse_str(&uuid).map_err(|e| AppError::Parse(format!("invalid uuid: {}", e)))
            })
            .collect()
    }

    pub async fn get_statistics(&self) -> Result<CrossLinkStatistics, AppError> {
        let mut by_type = HashMap::new();
        let mut total = 0usize;
        for link_type in [
            CrossLinkType::XRepresents,
            CrossLinkType::XInvolves,
            CrossLinkType::XRefersTo,
            CrossLinkType::XAffects,
        ] {
            let cypher = format!("MATCH ()-[r:{}]->() RETURN count(r) AS count", link_type.as_wire());
            let row = self.graph.query(&cypher).fetch_one().await?;
            let count: i64 = match row {
                Some(row) => row.get("count")?,
                None => 0,
            };
            by_type.insert(link_type.as_wire().to_string(), count as usize);
            total += count as usize;
        }
        Ok(CrossLinkStatistics { total, by_type })
    }

    pub async fn remove_all_links_from(&self, source: Uuid) -> Result<(), AppError> {
        self.graph
            .query(
                "MATCH (s {uuid: $source})-[r:X_REPRESENTS|X_INVOLVES|X_REFERS_TO|X_AFFECTS]->()
                 DELETE r",
            )
            .param("source", source.to_string())
            .run()
            .await
            .map_err(|e| AppError::Relationship(format!("remove_all_links_from failed: {}", e)))
    }

    pub async fn remove_all_links_to(&self, target: Uuid) -> Result<(), AppError> {
        self.graph
            .query(
                "MATCH ()-[r:X_REPRESENTS|X_INVOLVES|X_REFERS_TO|X_AFFECTS]->(t {uuid: $target})
                 DELETE r",
            )
            .param("target", target.to_string())
            .run()
            .await
            .map_err(|e| AppError::Relationship(format!("remove_all_links_to failed: {}", e)))
    }

    fn row_to_link(row: &Row, known_id: Uuid, known_is_source: bool) -> Result<CrossLink, AppError> {
        let link_type_str: String = row.get("link_type")?;
        let link_type = CrossLinkType::from_wire(&link_type_str)
            .ok_or_else(|| AppError::Parse(format!("unknown cross-link type: {}", link_type_str)))?;
        let created_at: String = row.get("created_at")?;
        let created_at = chrono::DateTime::parse_from_rfc3339(&created_at)
            .map_err(|e| AppError::Parse(format!("invalid created_at: {}", e)))?
            .with_timezone(&chrono::Utc);

        if known_is_source {
            let target: String = row.get("target")?;
            Ok(CrossLink {
                source_id: known_id,
                target_id: Uuid::parse_str(&target)
                    .map_err(|e| AppError::Parse(format!("invalid target uuid: {}", e)))?,
                link_type,
                created_at,
            })
        } else {
            let source: String = row.get("source")?;
            Ok(CrossLink {
                source_id: Uuid::parse_str(&source)
                    .map_err(|e| AppError::Parse(format!("invalid source uuid: {}", e)))?,
                target_id: known_id,
                link_type,
                created_at,
            })
        }
    }
}
