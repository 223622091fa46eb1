//! Causal graph facade: `C_Node` nodes and `C_CAUSES` edges.

use std::collections::HashSet;
use uuid::Uuid;

use crate::context::AppGraph;
use crate::di::FromContext;
use crate::error::AppError;
use crate::graph::{Node, Row};
use crate::models::{CausalDirection, CausalLink, CausalNode};

/// Typed wrapper over the `C_Node` label and `C_CAUSES` edges.
#[derive(FromContext, Clone)]
pub struct CausalFacade {
    graph: AppGraph,
}

impl CausalFacade {
    pub async fn add_node(&self, description: &str, node_type: &str) -> Result<CausalNode, AppError> {
        if description.trim().is_empty() {
            return Err(AppError::Validation("causal node description must not be empty".into()));
        }

        let node = CausalNode::new(description.to_string(), node_type.to_string());
        self.graph
            .query("CREATE (n:C_Node {uuid: $uuid, description: $description, node_type: $node_type})")
            .param("uuid", node.uuid.to_string())
            .param("description", &node.description)
            .param("node_type", &node.node_type)
            .run()
            .await?;
        Ok(node)
    }

    /// Creates the link, auto-creating either endpoint (by description) if
    /// it does not already exist.
    pub async fn add_link(
        &self,
        cause: &str,
        effect: &str,
        confidence: f64,
        evidence: Option<&str>,
    ) -> Result<CausalLink, AppError> {
        let cause_node = self.find_or_create(cause, "cause").await?;
        let effect_node = self.find_or_create(effect, "effect").await?;
        let link = CausalLink::new(cause_node.uuid, effect_node.uuid, confidence, evidence.map(str::to_string));

        self.graph
            .query(
                "MATCH (c:C_Node {uuid: $cause}), (e:C_Node {uuid: $effect})
                 CREATE (c)-[:C_CAUSES {confidence: $confidence, evidence: $evidence, created_at: $created_at}]->(e)",
            )
            .param("cause", link.cause_id.to_string())
            .param("effect", link.effect_id.to_string())
            .param("confidence", link.confidence)
            .param("evidence", &link.evidence)
            .param("created_at", chrono::Utc::now().to_rfc3339())
            .run()
            .await
            .map_err(|e| AppError::Relationship(format!("add_link failed: {}", e)))?;

        Ok(link)
    }

    pub async fn get_node(&self, uuid: Uuid) -> Result<Option<CausalNode>, AppError> {
        let row = self
            .graph
            .query("MATCH (n:C_Node {uuid: $uuid}) RETURN n")
            .param("uuid", uuid.to_string())
            .fetch_one()
            .await?;
        row.map(|r| Self::row_to_node(&r)).transpose()
    }

    /// Finds a node by exact description or creates one with `node_type`.
    pub async fn find_or_create(&self, description: &str, node_type: &str) -> Result<CausalNode, AppError> {
        let row = self
            .graph
            .query("MATCH (n:C_Node {description: $description}) RETURN n")
            .param("description", description)
            .fetch_one()
            .await?;

        if let Some(row) = row {
            return Self::row_to_node(&row);
        }

        self.add_node(description, node_type).await
    }

    /// Variable-length traversal over `C_CAUSES` edges from the nodes
    /// resolved from `mentions` (matched by description), `1..max_depth`
    /// hops in the given direction.
    pub async fn traverse(
        &self,
        mentions: &[String],
        direction: CausalDirection,
        max_depth: u8,
    ) -> Result<Vec<(CausalNode, CausalLink)>, AppError> {
        let mut start_ids = Vec::new();
        for mention in mentions {
            let row = self
                .graph
                .query("MATCH (n:C_Node {description: $description}) RETURN n.uuid AS uuid")
                .param("description", mention)
                .fetch_one()
                .await?;
            if let Some(row) = row {
                let uuid_str: String = row.get("uuid")?;
                if let Ok(uuid) = Uuid::parse_str(&uuid_str) {
                    start_ids.push(uuid);
                }
            }
        }

        self.traverse_from_node_ids(&start_ids, direction, max_depth).await
    }

    pub async fn get_upstream_causes(&self, id: Uuid, max_depth: u8) -> Result<Vec<(CausalNode, CausalLink)>, AppError> {
        self.traverse_from_node_ids(&[id], CausalDirection::Upstream, max_depth).await
    }

    pub async fn get_downstream_effects(&self, id: Uuid, max_depth: u8) -> Result<Vec<(CausalNode, CausalLink)>, AppError> {
        self.traverse_from_node_ids(&[id], CausalDirection::Downstream, max_depth).await
    }

    /// Upstream causes of the node matching `description`, sorted by
    /// confidence descending.
    pub async fn explain_why(&self, description: &str) -> Result<Vec<(CausalNode, CausalLink)>, AppError> {
        let row = self
            .graph
            .query("MATCH (n:C_Node {description: $description}) RETURN n.uuid AS uuid")
            .param("description", description)
            .fetch_one()
            .await?;

        let Some(row) = row else {
            return Ok(Vec::new());
        };
        let uuid_str: String = row.get("uuid")?;
        let uuid = Uuid::parse_str(&uuid_str)
            .map_err(|e| AppError::Parse(format!("invalid causal node uuid: {}", e)))?;

        let mut results = self.get_upstream_causes(uuid, 5).await?;
        results.sort_by(|a, b| {
            b.1.confidence
                .partial_cmp(&a.1.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(results)
    }

    /// Creates the `X_REFERS_TO` cross-link from a causal node to an event.
    pub async fn link_to_event(&self, node_id: Uuid, event_id: Uuid) -> Result<(), AppError> {
        self.graph
            .query(
                "MATCH (n:C_Node {uuid: $node_id}), (e:T_Event {uuid: $event_id})
                 MERGE (n)-[:X_REFERS_TO]->(e)",
            )
            .param("node_id", node_id.to_string())
            .param("event_id", event_id.to_string())
            .run()
            .await
            .map_err(|e| AppError::Relationship(format!("link_to_event failed: {}", e)))
    }

    /// Creates the `X_AFFECTS` cross-link from a causal node to an entity.
    pub async fn link_to_entity(&self, node_id: Uuid, entity_id: Uuid) -> Result<(), AppError> {
        self.graph
            .query(
                "MATCH (n:C_Node {uuid: $node_id}), (e:E_Entity {uuid: $entity_id})
                 MERGE (n)-[:X_AFFECTS]->(e)",
            )
            .param("node_id", node_id.to_string())
            .param("entity_id", entity_id.to_string())
            .run()
            .await
            .map_err(|e| AppError::Relationship(format!("link_to_entity failed: {}", e)))
    }

    /// Causal nodes reachable from any of `entity_ids` via `X_AFFECTS`.
    pub async fn get_nodes_for_entities(&self, entity_ids: &[Uuid]) -> Result<Vec<CausalNode>, AppError> {
        let mut seen = HashSet::new();
        let mut nodes = Vec::new();
        for id in entity_ids {
            let rows = self
                .graph
                .query(
                    "MATCH (n:C_Node)-[:X_AFFECTS]->(:E_Entity {uuid: $id}) RETURN n",
                )
                .param("id", id.to_string())
                .fetch_all()
                .await?;
            for row in &rows {
                let node = Self::row_to_node(row)?;
                if seen.insert(node.uuid) {
                    nodes.push(node);
                }
            }
        }
        Ok(nodes)
    }

    /// Traversal over `1..max_depth` `C_CAUSES` hops from explicit node ids,
    /// deduplicated by `(cause.description, effect.description)`.
    pub async fn traverse_from_node_ids(
        &self,
        node_ids: &[Uuid],
        direction: CausalDirection,
        max_depth: u8,
    ) -> Result<Vec<(CausalNode, CausalLink)>, AppError> {
        if node_ids.is_empty() {
            return Ok(Vec::new());
        }
        let max_depth = max_depth.max(1);
        let id_strings: Vec<String> = node_ids.iter().map(Uuid::to_string).collect();

        let upstream_cypher = format!(
            "MATCH (start:C_Node)<-[r:C_CAUSES*1..{}]-(cause:C_Node)
             WHERE start.uuid IN $ids
             UNWIND r AS rel
             RETURN cause, startNode(rel) AS cause_n, endNode(rel) AS effect_n, rel.confidence AS confidence, rel.evidence AS evidence",
            max_depth
        );
        let downstream_cypher = format!(
            "MATCH (start:C_Node)-[r:C_CAUSES*1..{}]->(effect:C_Node)
             WHERE start.uuid IN $ids
             UNWIND r AS rel
             RETURN effect, startNode(rel) AS cause_n, endNode(rel) AS effect_n, rel.confidence AS confidence, rel.evidence AS evidence",
            max_depth
        );

        let mut rows = Vec::new();
        if matches!(direction, CausalDirection::Upstream | CausalDirection::Both) {
            rows.extend(
                self.graph
                    .query(&upstream_cypher)
                    .param("ids", &id_strings)
                    .fetch_all()
                    .await
                    .map_err(|e| AppError::CausalTraversal(e.to_string()))?,
            );
        }
        if matches!(direction, CausalDirection::Downstream | CausalDirection::Both) {
            rows.extend(
                self.graph
                    .query(&downstream_cypher)
                    .param("ids", &id_strings)
                    .fetch_all()
                    .await
                    .map_err(|e| AppError::CausalTraversal(e.to_string()))?,
            );
        }

        let mut seen = HashSet::new();
        let mut results = Vec::new();
        for row in &rows {
            let cause_node: Node = row.get("cause_n")?;
            let effect_node: Node = row.get("effect_n")?;
            let cause_desc: String = cause_node.get("description")?;
            let effect_desc: String = effect_node.get("description")?;
            if !seen.insert((cause_desc, effect_desc)) {
                continue;
            }

            let confidence: f64 = row.get_opt("confidence")?.unwrap_or(1.0);
            let evidence: Option<String> = row.get_opt("evidence")?;
            let cause_uuid_str: String = cause_node.get("uuid")?;
            let effect_uuid_str: String = effect_node.get("uuid")?;
            let cause_uuid = Uuid::parse_str(&cause_uuid_str)
                .map_err(|e| AppError::Parse(format!("invalid cause uuid: {}", e)))?;
            let effect_uuid = Uuid::parse_str(&effect_uuid_str)
                .map_err(|e| AppError::Parse(format!("invalid effect uuid: {}", e)))?;

            let link = CausalLink::new(cause_uuid, effect_uuid, confidence, evidence);
            let node = Self::row_to_node_from(&cause_node)?;
            results.push((node, link));
        }

        Ok(results)
    }

    fn row_to_node(row: &Row) -> Result<CausalNode, AppError> {
        let node: Node = row.get("n")?;
        Self::row_to_node_from(&node)
    }

    fn row_to_node_from(node: &Node) -> Result<CausalNode, AppError> {
        let uuid_str: String = node.get("uuid")?;
        let uuid = Uuid::parse_str(&uuid_str)
            .map_err(|e| AppError::Parse(format!("invalid causal node uuid: {}", e)))?;
        Ok(CausalNode {
            uuid,
            description: node.get("description")?,
            node_type: node.get("node_type")?,
        })
    }
}
