//! Management queries over the backing graph: health, counts, and reset.
//!
//! Built on the same [`QueryExt`] idiom the facades use; no new executor
//! abstraction, just a handful of label-scoped Cypher statements.

use serde::Serialize;

use crate::error::AppError;
use crate::graph::backends::postgres::PostgresClient;
use crate::graph::QueryExt;

/// Node and relationship counts across all four graphs.
#[derive(Debug, Clone, Serialize)]
pub struct GraphStatistics {
    pub semantic_nodes: i64,
    pub entity_nodes: i64,
    pub temporal_nodes: i64,
    pub causal_nodes: i64,
    pub total_relationships: i64,
}

/// Which graph(s) [`clear_graph`] should wipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphScope {
    Semantic,
    Entity,
    Temporal,
    Causal,
    All,
}

impl GraphScope {
    /// Vertex labels this scope covers.
    fn vertex_labels(self) -> &'static [&'static str] {
        match self {
            GraphScope::Semantic => &["S_Concept"],
            GraphScope::Entity => &["E_Entity"],
            GraphScope::Temporal => &["T_Event", "T_Fact"],
            GraphScope::Causal => &["C_Node"],
            GraphScope::All => &["S_Concept", "E_Entity", "T_Event", "T_Fact", "C_Node"],
        }
    }
}

impl std::str::FromStr for GraphScope {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "semantic" => Ok(GraphScope::Semantic),
            "entity" => Ok(GraphScope::Entity),
            "temporal" => Ok(GraphScope::Temporal),
            "causal" => Ok(GraphScope::Causal),
            "all" => Ok(GraphScope::All),
            other => Err(AppError::Validation(format!(
                "unknown graph scope '{}', expected one of semantic, entity, temporal, causal, all",
                other
            ))),
        }
    }
}

/// Checks whether a Cypher round-trip against the graph succeeds.
pub async fn health_check(client: &PostgresClient) -> bool {
    client.query("RETURN 1 AS ok").fetch_all().await.is_ok()
}

/// Counts nodes per graph and relationships overall.
pub async fn get_statistics(client: &PostgresClient) -> Result<GraphStatistics, AppError> {
    async fn count(client: &PostgresClient, label: &str) -> Result<i64, AppError> {
        let rows = client
            .query(&format!("MATCH (n:{}) RETURN count(n) AS c", label))
            .fetch_all()
            .await?;
        Ok(rows
            .first()
            .and_then(|r| r.get::<i64>("c").ok())
            .unwrap_or(0))
    }

    let semantic_nodes = count(client, "S_Concept").await?;
    let entity_nodes = count(client, "E_Entity").await?;
    let temporal_nodes = count(client, "T_Event").await? + count(client, "T_Fact").await?;
    let causal_nodes = count(client, "C_Node").await?;

    let rows = client
        .query("MATCH ()-[r]->() RETURN count(r) AS c")
        .fetch_all()
        .await?;
    let total_relationships = rows
        .first()
        .and_then(|r| r.get::<i64>("c").ok())
        .unwrap_or(0);

    Ok(GraphStatistics {
        semantic_nodes,
        entity_nodes,
        temporal_nodes,
        causal_nodes,
        total_relationships,
    })
}

/// Detaches and deletes every node under `scope`'s labels.
pub async fn clear_graph(client: &PostgresClient, scope: GraphScope) -> Result<(), AppError> {
    for label in scope.vertex_labels() {
        client
            .query(&format!("MATCH (n:{}) DETACH DELETE n", label))
            .run()
            .await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_parses_known_values() {
        assert_eq!("semantic".parse::<GraphScope>().unwrap(), GraphScope::Semantic);
        assert_eq!("all".parse::<GraphScope>().unwrap(), GraphScope::All);
    }

    #[test]
    fn scope_rejects_unknown_value() {
        assert!("bogus".parse::<GraphScope>().is_err());
    }

    #[test]
    fn all_scope_covers_every_label() {
        assert_eq!(GraphScope::All.vertex_labels().len(), 5);
    }
}
