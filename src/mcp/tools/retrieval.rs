//! Retrieval-stage tools: the individually addressable steps of the MAGMA
//! pipeline (semantic search, per-graph expansion, merge, linearize),
//! exposed separately so a caller can run, inspect, and recombine them
//! without invoking the full executor.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rmcp::{
    handler::server::wrapper::Parameters,
    model::CallToolResult,
    schemars::{self, JsonSchema},
    tool, tool_router, ErrorData as McpError,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::facades::{CausalFacade, EntityFacade, SemanticFacade, TemporalFacade};
use crate::mcp::protocol::Response;
use crate::mcp::server::McpServer;
use crate::mcp::validation::{schema_error, FieldError};
use crate::merger::{self, MergeOptions};
use crate::linearizer::{self, LinearizerOptions};
use crate::models::{
    CausalDirection, GraphSource, GraphView, LinearizedContext, MAGMAIntentType, MergedSubgraph,
    ViewNode,
};

// ============================================================================
// Parameter types
// ============================================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SemanticSearchParams {
    pub query: String,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub min_score: Option<f64>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct EntityLookupParams {
    pub entity_ids: Vec<String>,
    #[serde(default)]
    pub depth: Option<u8>,
    #[serde(default)]
    pub include_properties: Option<bool>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct TemporalExpandParams {
    pub entity_ids: Vec<String>,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CausalExpandParams {
    pub entity_ids: Vec<String>,
    /// "upstream", "downstream", or "both" (default).
    #[serde(default)]
    pub direction: Option<String>,
    #[serde(default)]
    pub depth: Option<u8>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SubgraphMergeParams {
    pub views: Vec<GraphView>,
    #[serde(default)]
    pub multi_view_boost: Option<f64>,
    #[serde(default)]
    pub min_score: Option<f64>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct LinearizeContextParams {
    pub subgraph: MergedSubgraph,
    /// One of "why", "when", "who", "what", "explore".
    pub intent: String,
    #[serde(default)]
    pub max_tokens: Option<usize>,
}

// ============================================================================
// Tool router
// ============================================================================

#[tool_router(router = retrieval_tools, vis = "pub(crate)")]
impl McpServer {
    /// Vector-similarity search over the semantic graph, returned as a
    /// single-source graph view ready for `subgraph_merge`.
    #[tool(
        description = "Search the semantic graph by vector similarity. limit defaults to 10 (max 100), min_score defaults to 0."
    )]
    pub async fn semantic_search(
        &self,
        Parameters(params): Parameters<SemanticSearchParams>,
    ) -> Result<CallToolResult, McpError> {
        if params.query.trim().is_empty() {
            return Ok(schema_error(vec![FieldError::new("query", "must not be empty")]));
        }
        let limit = params.limit.unwrap_or(10);
        if !(1..=100).contains(&limit) {
            return Ok(schema_error(vec![FieldError::new("limit", "must be in [1, 100]")]));
        }
        let min_score = params.min_score.unwrap_or(0.0);
        if !(0.0..=1.0).contains(&min_score) {
            return Ok(schema_error(vec![FieldError::new(
                "min_score",
                "must be in [0, 1]",
            )]));
        }

        let matches = self
            .resolve::<SemanticFacade>()
            .search(&params.query, limit)
            .await
            .map_err(|e: AppError| McpError::from(e))?;

        let nodes = matches
            .into_iter()
            .filter(|m| m.score >= min_score)
            .map(|m| ViewNode {
                uuid: m.concept.uuid,
                data: serde_json::to_value(&m.concept).unwrap_or_default(),
                score: Some(m.score),
            })
            .collect();

        Response(
            GraphView {
                source: GraphSource::Semantic,
                nodes,
            },
            None,
        )
        .into()
    }

    /// Bounded breadth-first expansion from `entity_ids` over `E_RELATES`
    /// edges, scored by `1/(depth+1)`.
    #[tool(
        description = "Expand a set of entity ids over the entity graph. depth defaults to 2 (max 5)."
    )]
    pub async fn entity_lookup(
        &self,
        Parameters(params): Parameters<EntityLookupParams>,
    ) -> Result<CallToolResult, McpError> {
        let seeds = match parse_uuids(&params.entity_ids, "entity_ids") {
            Ok(ids) => ids,
            Err(result) => return Ok(result),
        };
        let depth = params.depth.unwrap_or(2);
        if !(1..=5).contains(&depth) {
            return Ok(schema_error(vec![FieldError::new("depth", "must be in [1, 5]")]));
        }
        let include_properties = params.include_properties.unwrap_or(true);

        let entity = self.resolve::<EntityFacade>();
        let mut visited: HashSet<Uuid> = seeds.iter().copied().collect();
        let mut nodes = Vec::new();
        let mut frontier = seeds;

        for d in 0..depth {
            let mut next_frontier = Vec::new();
            for id in &frontier {
                let relations = match entity.get_relationships(*id).await {
                    Ok(r) => r,
                    Err(_) => continue,
                };
                for rel in relations {
                    for candidate in [rel.source_id, rel.target_id] {
                        if visited.insert(candidate) {
                            let data = match entity.get_entity(&candidate.to_string()).await {
                                Ok(Some(e)) => {
                                    let mut value = serde_json::to_value(&e).unwrap_or_default();
                                    if !include_properties {
                                        if let Some(obj) = value.as_object_mut() {
                                            obj.remove("properties");
                                        }
                                    }
                                    value
                                }
                                _ => serde_json::Value::Null,
                            };
                            nodes.push(ViewNode {
                                uuid: candidate,
                                data,
                                score: Some(1.0 / (d as f64 + 1.0)),
                            });
                            next_frontier.push(candidate);
                        }
                    }
                }
            }
            if next_frontier.is_empty() {
                break;
            }
            frontier = next_frontier;
        }

        Response(
            GraphView {
                source: GraphSource::Entity,
                nodes,
            },
            None,
        )
        .into()
    }

    /// Events linked to any of `entity_ids` within `[from, to]` (defaults
    /// to `now ± 365d`).
    #[tool(
        description = "Expand a set of entity ids over the temporal graph within an optional time window."
    )]
    pub async fn temporal_expand(
        &self,
        Parameters(params): Parameters<TemporalExpandParams>,
    ) -> Result<CallToolResult, McpError> {
        let entity_ids = match parse_uuids(&params.entity_ids, "entity_ids") {
            Ok(ids) => ids,
            Err(result) => return Ok(result),
        };

        let now = Utc::now();
        let from = match &params.from {
            Some(raw) => match parse_instant(raw, "from") {
                Ok(dt) => dt,
                Err(result) => return Ok(result),
            },
            None => now - chrono::Duration::days(365),
        };
        let to = match &params.to {
            Some(raw) => match parse_instant(raw, "to") {
                Ok(dt) => dt,
                Err(result) => return Ok(result),
            },
            None => now + chrono::Duration::days(365),
        };
        if to < from {
            return Ok(schema_error(vec![FieldError::new("to", "must not be before from")]));
        }

        let events = self
            .resolve::<TemporalFacade>()
            .query_timeline_for_entities(&entity_ids, from, to)
            .await
            .map_err(|e: AppError| McpError::from(e))?;

        let nodes = events
            .into_iter()
            .map(|e| ViewNode {
                uuid: e.uuid,
                data: serde_json::to_value(&e).unwrap_or_default(),
                score: Some(1.0),
            })
            .collect();

        Response(
            GraphView {
                source: GraphSource::Temporal,
                nodes,
            },
            None,
        )
        .into()
    }

    /// Causal nodes reachable from `entity_ids` via `X_AFFECTS`, traversed
    /// `depth` `C_CAUSES` hops in the requested direction.
    #[tool(
        description = "Expand a set of entity ids over the causal graph. direction defaults to both, depth defaults to 2 (max 5)."
    )]
    pub async fn causal_expand(
        &self,
        Parameters(params): Parameters<CausalExpandParams>,
    ) -> Result<CallToolResult, McpError> {
        let entity_ids = match parse_uuids(&params.entity_ids, "entity_ids") {
            Ok(ids) => ids,
            Err(result) => return Ok(result),
        };
        let depth = params.depth.unwrap_or(2);
        if !(1..=5).contains(&depth) {
            return Ok(schema_error(vec![FieldError::new("depth", "must be in [1, 5]")]));
        }
        let direction = match params.direction.as_deref().unwrap_or("both") {
            "upstream" => CausalDirection::Upstream,
            "downstream" => CausalDirection::Downstream,
            "both" => CausalDirection::Both,
            _ => {
                return Ok(schema_error(vec![FieldError::new(
                    "direction",
                    "must be one of: upstream, downstream, both",
                )]))
            }
        };

        let causal = self.resolve::<CausalFacade>();
        let seed_nodes = causal
            .get_nodes_for_entities(&entity_ids)
            .await
            .map_err(|e: AppError| McpError::from(e))?;

        if seed_nodes.is_empty() {
            return Response(
                GraphView {
                    source: GraphSource::Causal,
                    nodes: Vec::new(),
                },
                None,
            )
            .into();
        }

        let node_ids: Vec<Uuid> = seed_nodes.iter().map(|n| n.uuid).collect();
        let pairs = causal
            .traverse_from_node_ids(&node_ids, direction, depth)
            .await
            .map_err(|e: AppError| McpError::from(e))?;

        let mut seen = HashSet::new();
        let mut nodes = Vec::new();
        for (node, link) in pairs {
            if seen.insert(node.uuid) {
                nodes.push(ViewNode {
                    uuid: node.uuid,
                    data: serde_json::to_value(&node).unwrap_or_default(),
                    score: Some(link.confidence),
                });
            }
            if seen.insert(link.effect_id) {
                if let Ok(Some(effect_node)) = causal.get_node(link.effect_id).await {
                    nodes.push(ViewNode {
                        uuid: effect_node.uuid,
                        data: serde_json::to_value(&effect_node).unwrap_or_default(),
                        score: Some(link.confidence),
                    });
                }
            }
        }

        Response(
            GraphView {
                source: GraphSource::Causal,
                nodes,
            },
            None,
        )
        .into()
    }

    /// Combines multiple graph views into one scored node set, boosting
    /// nodes that appear in more than one view.
    #[tool(
        description = "Merge graph views into one scored subgraph. multi_view_boost defaults to 1.5 and must be >= 1."
    )]
    pub async fn subgraph_merge(
        &self,
        Parameters(params): Parameters<SubgraphMergeParams>,
    ) -> Result<CallToolResult, McpError> {
        let multi_view_boost = params.multi_view_boost.unwrap_or(1.5);
        if multi_view_boost < 1.0 {
            return Ok(schema_error(vec![FieldError::new(
                "multi_view_boost",
                "must be >= 1",
            )]));
        }
        if let Some(min_score) = params.min_score {
            if !(0.0..=1.0).contains(&min_score) {
                return Ok(schema_error(vec![FieldError::new(
                    "min_score",
                    "must be in [0, 1]",
                )]));
            }
        }

        let options = MergeOptions {
            multi_view_boost,
            min_nodes_per_view: 0,
            max_nodes_per_view: 1000,
        };
        let merged = merger::merge(&params.views, &options).map_err(|e: AppError| McpError::from(e))?;
        let merged = match params.min_score {
            Some(min_score) => merger::filter_by_score(&merged, min_score),
            None => merged,
        };

        Response(merged, None).into()
    }

    /// Orders, formats, and token-budget-truncates a merged subgraph into
    /// text for one intent's linearization strategy.
    #[tool(
        description = "Linearize a merged subgraph into token-budgeted text for one of: why, when, who, what, explore. max_tokens defaults to 4000, range [100, 100000]."
    )]
    pub async fn linearize_context(
        &self,
        Parameters(params): Parameters<LinearizeContextParams>,
    ) -> Result<CallToolResult, McpError> {
        let intent = match params.intent.as_str() {
            "why" => MAGMAIntentType::Why,
            "when" => MAGMAIntentType::When,
            "who" => MAGMAIntentType::Who,
            "what" => MAGMAIntentType::What,
            "explore" => MAGMAIntentType::Explore,
            _ => {
                return Ok(schema_error(vec![FieldError::new(
                    "intent",
                    "must be one of: why, when, who, what, explore",
                )]))
            }
        };
        let max_tokens = params.max_tokens.unwrap_or(4000);
        if !(100..=100_000).contains(&max_tokens) {
            return Ok(schema_error(vec![FieldError::new(
                "max_tokens",
                "must be in [100, 100000]",
            )]));
        }

        let options = LinearizerOptions { max_tokens };
        let context: LinearizedContext = linearizer::linearize(&params.subgraph, intent, &options)
            .map_err(|e: AppError| McpError::from(e))?;

        Response(context, None).into()
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn parse_uuids(raw: &[String], field: &'static str) -> Result<Vec<Uuid>, CallToolResult> {
    if raw.is_empty() {
        return Err(schema_error(vec![FieldError::new(
            field,
            "must contain at least one id",
        )]));
    }
    raw.iter()
        .map(|s| Uuid::parse_str(s))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| schema_error(vec![FieldError::new(field, "must contain only valid uuids")]))
}

fn parse_instant(raw: &str, field: &'static str) -> Result<DateTime<Utc>, CallToolResult> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| schema_error(vec![FieldError::new(field, "must be an RFC 3339 timestamp")]))
}
