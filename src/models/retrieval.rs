//! Retrieval-time ephemeral types produced by the MAGMA pipeline.
//!
//! None of these are persisted; they are assembled fresh on every
//! `execute` call from facade reads.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// The source graph a view or a node's contribution came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphSource {
    Semantic,
    Entity,
    Temporal,
    Causal,
}

impl GraphSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            GraphSource::Semantic => "semantic",
            GraphSource::Entity => "entity",
            GraphSource::Temporal => "temporal",
            GraphSource::Causal => "causal",
        }
    }
}

/// A single node surfaced by one graph's expansion, carrying its raw,
/// schema-less payload and an optional score (defaults to 1.0 when absent).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewNode {
    pub uuid: Uuid,
    pub data: JsonValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// A partial result set produced by one graph's expansion, tagged with its
/// source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphView {
    pub source: GraphSource,
    pub nodes: Vec<ViewNode>,
}

/// A node surviving the merge, with its accumulated score and the set of
/// views that contributed to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredNode {
    pub uuid: Uuid,
    pub data: JsonValue,
    pub view_count: usize,
    pub views: HashSet<GraphSource>,
    pub final_score: f64,
}

/// The merger's output: nodes sorted by `final_score` descending, plus a
/// per-source count of how many nodes each view contributed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergedSubgraph {
    pub nodes: Vec<ScoredNode>,
    pub view_contributions: HashMap<GraphSource, usize>,
}

impl MergedSubgraph {
    pub fn empty() -> Self {
        let mut view_contributions = HashMap::new();
        for source in [
            GraphSource::Semantic,
            GraphSource::Entity,
            GraphSource::Temporal,
            GraphSource::Causal,
        ] {
            view_contributions.insert(source, 0);
        }
        Self {
            nodes: Vec::new(),
            view_contributions,
        }
    }
}

/// The intent types the classifier may emit. Advisory for execution depth
/// (which is driven by `depth_hints`), authoritative for linearizer
/// strategy selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MAGMAIntentType {
    Why,
    When,
    Who,
    What,
    Explore,
}

/// Per-graph traversal depth, each clamped to `[1, 5]`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DepthHints {
    pub entity: u8,
    pub temporal: u8,
    pub causal: u8,
}

impl Default for DepthHints {
    fn default() -> Self {
        Self {
            entity: 2,
            temporal: 1,
            causal: 2,
        }
    }
}

/// The classifier's verdict on a query: what kind of question it is, which
/// entities/time expressions it mentions, and how deep to traverse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MAGMAIntent {
    #[serde(rename = "type")]
    pub intent_type: MAGMAIntentType,
    #[serde(default)]
    pub entities: Vec<String>,
    #[serde(default)]
    pub temporal_hints: Vec<String>,
    #[serde(default)]
    pub depth_hints: DepthHints,
    pub confidence: f64,
}

/// One entity seed derived from a semantic match via an `X_REPRESENTS`
/// cross-link.
#[derive(Debug, Clone, Serialize)]
pub struct EntitySeed {
    pub entity_id: Uuid,
    pub source_concept_id: Uuid,
    pub semantic_score: f64,
}

/// Bookkeeping emitted alongside the seeds themselves.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SeedExtractionStats {
    pub concepts_searched: usize,
    pub entities_found: usize,
    pub concepts_without_links: usize,
}

/// The seed extractor's full output.
#[derive(Debug, Clone, Serialize)]
pub struct SeedExtractionResult {
    pub entity_seeds: Vec<EntitySeed>,
    pub concept_ids: Vec<Uuid>,
    pub stats: SeedExtractionStats,
}

/// Per-stage timing recorded by the executor, in milliseconds.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExecutionTiming {
    pub semantic_ms: u64,
    pub seed_extraction_ms: u64,
    pub expansion_ms: u64,
    pub merge_ms: u64,
    pub total_ms: u64,
}

/// The executor's full result for one `execute` call.
#[derive(Debug, Clone, Serialize)]
pub struct MAGMAExecutionResult {
    pub merged: MergedSubgraph,
    pub seeds: SeedExtractionResult,
    pub timing: ExecutionTiming,
}

/// A linearizer's output for one `linearize` call.
#[derive(Debug, Clone, Serialize)]
pub struct LinearizedContext {
    pub text: String,
    pub node_count: usize,
    pub strategy: &'static str,
    pub estimated_tokens: usize,
}
