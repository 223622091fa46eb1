//! The MAGMA executor: the pipeline's single point of parallelism and
//! timeout control.
//!
//! Orchestrates semantic search → seed extraction → parallel entity/
//! temporal/causal expansion → merge, as a thin orchestration layer that
//! owns timing and concurrent fan-out instead of making sequential
//! repository calls.

mod config;

pub use config::ExecutorOptions;

use std::collections::HashSet;
use std::time::Instant;

use chrono::Utc;
use uuid::Uuid;

use crate::context::Context;
use crate::di::FromRef;
use crate::error::AppError;
use crate::facades::{CausalFacade, EntityFacade, SemanticFacade, TemporalFacade};
use crate::merger::{self, MergeOptions};
use crate::models::{
    CausalDirection, ExecutionTiming, GraphSource, GraphView, MAGMAExecutionResult, MAGMAIntent,
    ViewNode,
};
use crate::seed;

/// Owns the facades and validated options needed to run one `execute` call.
/// Stateless beyond its configuration: safe to share across concurrent
/// request handlers.
#[derive(Clone)]
pub struct MagmaExecutor {
    semantic: SemanticFacade,
    entity: EntityFacade,
    temporal: TemporalFacade,
    causal: CausalFacade,
    options: ExecutorOptions,
    merge_options: MergeOptions,
}

impl MagmaExecutor {
    /// Builds an executor from the application context, validating the
    /// `magma` and `merge` config sections.
    pub fn new(ctx: &Context) -> Result<Self, AppError> {
        let options = ExecutorOptions::from_config(&ctx.config.magma)?;
        let merge_options = MergeOptions {
            multi_view_boost: ctx.config.merge.multi_view_boost,
            min_nodes_per_view: ctx.config.merge.min_nodes_per_view,
            max_nodes_per_view: ctx.config.merge.max_nodes_per_view,
        };
        merge_options.validate()?;

        Ok(Self {
            semantic: SemanticFacade::from_ref(ctx),
            entity: EntityFacade::from_ref(ctx),
            temporal: TemporalFacade::from_ref(ctx),
            causal: CausalFacade::from_ref(ctx),
            options,
            merge_options,
        })
    }

    /// Runs the full retrieval pipeline for one query/intent pair.
    pub async fn execute(
        &self,
        query: &str,
        intent: &MAGMAIntent,
    ) -> Result<MAGMAExecutionResult, AppError> {
        let total_start = Instant::now();
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::Validation("query must not be empty".into()));
        }
        validate_intent(intent)?;

        let semantic_start = Instant::now();
        let search = self
            .semantic
            .search_with_entities(query, self.options.semantic_top_k);
        let matches = match tokio::time::timeout(self.options.timeout, search).await {
            Ok(Ok(matches)) => matches,
            Ok(Err(e)) => return Err(AppError::Backend(format!("semantic search failed: {}", e))),
            Err(_) => return Err(AppError::Timeout("semantic search timed out".into())),
        };
        let semantic_ms = semantic_start.elapsed().as_millis() as u64;

        let semantic_view = GraphView {
            source: GraphSource::Semantic,
            nodes: matches
                .iter()
                .map(|m| ViewNode {
                    uuid: m.concept.uuid,
                    data: serde_json::to_value(&m.concept).unwrap_or_default(),
                    score: Some(m.score),
                })
                .collect(),
        };

        let seed_start = Instant::now();
        let seeds = seed::extract_seeds_from_enriched(&matches, self.options.min_semantic_score);
        let seed_extraction_ms = seed_start.elapsed().as_millis() as u64;

        let entity_ids = seed::get_entity_ids(&seeds.entity_seeds);

        let expansion_start = Instant::now();
        let mut views = vec![semantic_view];
        if !entity_ids.is_empty() {
            let (entity_view, temporal_view, causal_view) = tokio::join!(
                self.expand_entity(&entity_ids, intent.depth_hints.entity),
                self.expand_temporal(&entity_ids),
                self.expand_causal(&entity_ids, intent.depth_hints.causal),
            );
            for view in [entity_view, temporal_view, causal_view] {
                if !view.nodes.is_empty() {
                    views.push(view);
                }
            }
        }
        let expansion_ms = expansion_start.elapsed().as_millis() as u64;

        let merge_start = Instant::now();
        let merged = merger::merge(&views, &self.merge_options)?;
        let merge_ms = merge_start.elapsed().as_millis() as u64;

        let total_ms = total_start.elapsed().as_millis() as u64;

        Ok(MAGMAExecutionResult {
            merged,
            seeds,
            timing: ExecutionTiming {
                semantic_ms,
                seed_extraction_ms,
                expansion_ms,
                merge_ms,
                total_ms,
            },
        })
    }

    /// Bounded BFS from `seeds` over `E_RELATES` edges, `depth` hops deep.
    /// A failed per-id relation fetch is swallowed; BFS continues with
    /// whatever the remaining ids yield.
    async fn expand_entity(&self, seeds: &[Uuid], depth: u8) -> GraphView {
        let depth = depth.clamp(1, 5) as usize;
        let mut visited: HashSet<Uuid> = seeds.iter().copied().collect();
        let mut nodes = Vec::new();
        let mut frontier: Vec<Uuid> = seeds.to_vec();

        for d in 0..depth {
            let mut next_frontier = Vec::new();
            for id in &frontier {
                let relations = match self.entity.get_relationships(*id).await {
                    Ok(r) => r,
                    Err(_) => continue,
                };
                for rel in relations {
                    for candidate in [rel.source_id, rel.target_id] {
                        if visited.insert(candidate) {
                            let data = self
                                .entity
                                .get_entity(&candidate.to_string())
                                .await
                                .ok()
                                .flatten()
                                .and_then(|e| serde_json::to_value(&e).ok())
                                .unwrap_or(serde_json::Value::Null);
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

        GraphView {
            source: GraphSource::Entity,
            nodes,
        }
    }

    /// Events linked to any of `seeds` within a `±365d` window of now,
    /// deduplicated by event uuid, each scored `1.0`.
    async fn expand_temporal(&self, seeds: &[Uuid]) -> GraphView {
        let now = Utc::now();
        let from = now - chrono::Duration::days(365);
        let to = now + chrono::Duration::days(365);

        let events = match self
            .temporal
            .query_timeline_for_entities(seeds, from, to)
            .await
        {
            Ok(events) => events,
            Err(_) => Vec::new(),
        };

        GraphView {
            source: GraphSource::Temporal,
            nodes: events
                .into_iter()
                .map(|e| ViewNode {
                    uuid: e.uuid,
                    data: serde_json::to_value(&e).unwrap_or_default(),
                    score: Some(1.0),
                })
                .collect(),
        }
    }

    /// Causal nodes reachable from `seeds` via `X_AFFECTS`, then traversed
    /// `depth` hops in both directions. Cause and effect nodes are scored
    /// by the connecting link's confidence.
    async fn expand_causal(&self, seeds: &[Uuid], depth: u8) -> GraphView {
        let depth = depth.clamp(1, 5);

        let seed_nodes = match self.causal.get_nodes_for_entities(seeds).await {
            Ok(nodes) => nodes,
            Err(_) => Vec::new(),
        };
        if seed_nodes.is_empty() {
            return GraphView {
                source: GraphSource::Causal,
                nodes: Vec::new(),
            };
        }

        let node_ids: Vec<Uuid> = seed_nodes.iter().map(|n| n.uuid).collect();
        let pairs = match self
            .causal
            .traverse_from_node_ids(&node_ids, CausalDirection::Both, depth)
            .await
        {
            Ok(pairs) => pairs,
            Err(_) => Vec::new(),
        };

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
                if let Ok(Some(effect_node)) = self.causal.get_node(link.effect_id).await {
                    nodes.push(ViewNode {
                        uuid: effect_node.uuid,
                        data: serde_json::to_value(&effect_node).unwrap_or_default(),
                        score: Some(link.confidence),
                    });
                }
            }
        }

        GraphView {
            source: GraphSource::Causal,
            nodes,
        }
    }
}

fn validate_intent(intent: &MAGMAIntent) -> Result<(), AppError> {
    if !(0.0..=1.0).contains(&intent.confidence) {
        return Err(AppError::Validation(
            "intent confidence must be in [0, 1]".into(),
        ));
    }
    for (field, value) in [
        ("entity", intent.depth_hints.entity),
        ("temporal", intent.depth_hints.temporal),
        ("causal", intent.depth_hints.causal),
    ] {
        if !(1..=5).contains(&value) {
            return Err(AppError::Validation(format!(
                "depth_hints.{} must be in [1, 5]",
                field
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DepthHints, MAGMAIntentType};

    fn intent(confidence: f64, depth_hints: DepthHints) -> MAGMAIntent {
        MAGMAIntent {
            intent_type: MAGMAIntentType::Explore,
            entities: Vec::new(),
            temporal_hints: Vec::new(),
            depth_hints,
            confidence,
        }
    }

    #[test]
    fn validate_intent_accepts_defaults() {
        assert!(validate_intent(&intent(0.5, DepthHints::default())).is_ok());
    }

    #[test]
    fn validate_intent_rejects_out_of_range_confidence() {
        assert!(validate_intent(&intent(1.5, DepthHints::default())).is_err());
        assert!(validate_intent(&intent(-0.1, DepthHints::default())).is_err());
    }

    #[test]
    fn validate_intent_rejects_out_of_range_depth() {
        let hints = DepthHints {
            entity: 6,
            temporal: 1,
            causal: 2,
        };
        assert!(validate_intent(&intent(0.5, hints)).is_err());

        let hints = DepthHints {
            entity: 0,
            temporal: 1,
            causal: 2,
        };
        assert!(validate_intent(&intent(0.5, hints)).is_err());
    }
}
