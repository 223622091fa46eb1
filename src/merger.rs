//! Subgraph merger: combines multiple graph views into one scored node set.
//!
//! Pure and synchronous. No I/O, no async; just scoring and sorting nodes
//! with the usual `partial_cmp`/`unwrap_or(Ordering::Equal)` descending-score
//! idiom.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use crate::error::AppError;
use crate::models::{GraphSource, GraphView, MergedSubgraph, ScoredNode};

/// Bounds for [`merge`], validated on construction.
#[derive(Debug, Clone, Copy)]
pub struct MergeOptions {
    pub multi_view_boost: f64,
    pub min_nodes_per_view: usize,
    pub max_nodes_per_view: usize,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            multi_view_boost: 1.5,
            min_nodes_per_view: 3,
            max_nodes_per_view: 50,
        }
    }
}

impl MergeOptions {
    pub fn validate(&self) -> Result<(), AppError> {
        if !(1.0..=10.0).contains(&self.multi_view_boost) {
            return Err(AppError::Validation(
                "multi_view_boost must be in [1, 10]".into(),
            ));
        }
        if self.min_nodes_per_view > 100 {
            return Err(AppError::Validation(
                "min_nodes_per_view must be in [0, 100]".into(),
            ));
        }
        if !(1..=1000).contains(&self.max_nodes_per_view) {
            return Err(AppError::Validation(
                "max_nodes_per_view must be in [1, 1000]".into(),
            ));
        }
        Ok(())
    }
}

/// Merges a list of [`GraphView`]s into one [`MergedSubgraph`], scored per
/// the multi-view boost rule and sorted by `final_score` descending.
///
/// Per-view node order is preserved as the merge's tie-break: nodes are
/// accumulated in `views` input order, so equal-scoring nodes keep their
/// relative insertion order (a stable sort).
pub fn merge(views: &[GraphView], options: &MergeOptions) -> Result<MergedSubgraph, AppError> {
    options.validate()?;

    struct Accum {
        data: serde_json::Value,
        scores: Vec<f64>,
        views: HashSet<GraphSource>,
        order: usize,
    }

    let mut accum: HashMap<uuid::Uuid, Accum> = HashMap::new();
    let mut view_contributions = MergedSubgraph::empty().view_contributions;
    let mut order = 0usize;

    for view in views {
        let included = view.nodes.iter().take(options.max_nodes_per_view);
        let mut count = 0usize;
        for node in included {
            count += 1;
            let score = node.score.unwrap_or(1.0);
            let entry = accum.entry(node.uuid).or_insert_with(|| {
                let o = order;
                order += 1;
                Accum {
                    data: node.data.clone(),
                    scores: Vec::new(),
                    views: HashSet::new(),
                    order: o,
                }
            });
            entry.scores.push(score);
            entry.views.insert(view.source);
        }
        *view_contributions.entry(view.source).or_insert(0) += count;
    }

    let mut nodes: Vec<(usize, ScoredNode)> = accum
        .into_iter()
        .map(|(uuid, a)| {
            let avg_score = a.scores.iter().sum::<f64>() / a.scores.len() as f64;
            let view_count = a.views.len();
            let boost = if view_count > 1 {
                options.multi_view_boost.powi(view_count as i32 - 1)
            } else {
                1.0
            };
            (
                a.order,
                ScoredNode {
                    uuid,
                    data: a.data,
                    view_count,
                    views: a.views,
                    final_score: avg_score * boost,
                },
            )
        })
        .collect();

    nodes.sort_by(|(order_a, a), (order_b, b)| {
        b.final_score
            .partial_cmp(&a.final_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| order_a.cmp(order_b))
    });

    Ok(MergedSubgraph {
        nodes: nodes.into_iter().map(|(_, n)| n).collect(),
        view_contributions,
    })
}

/// Whether every view in `views` meets `min_nodes_per_view` after the
/// per-view cap is applied.
pub fn has_minimum_nodes(views: &[GraphView], options: &MergeOptions) -> bool {
    views
        .iter()
        .all(|v| v.nodes.len().min(options.max_nodes_per_view) >= options.min_nodes_per_view)
}

/// First `n` nodes of an already-merged subgraph.
pub fn top_n(subgraph: &MergedSubgraph, n: usize) -> MergedSubgraph {
    MergedSubgraph {
        nodes: subgraph.nodes.iter().take(n).cloned().collect(),
        view_contributions: subgraph.view_contributions.clone(),
    }
}

/// Nodes corroborated by at least `min_views` distinct views.
pub fn filter_by_view_count(subgraph: &MergedSubgraph, min_views: usize) -> MergedSubgraph {
    MergedSubgraph {
        nodes: subgraph
            .nodes
            .iter()
            .filter(|n| n.view_count >= min_views)
            .cloned()
            .collect(),
        view_contributions: subgraph.view_contributions.clone(),
    }
}

/// Nodes whose `final_score >= min_score`.
pub fn filter_by_score(subgraph: &MergedSubgraph, min_score: f64) -> MergedSubgraph {
    MergedSubgraph {
        nodes: subgraph
            .nodes
            .iter()
            .filter(|n| n.final_score >= min_score)
            .cloned()
            .collect(),
        view_contributions: subgraph.view_contributions.clone(),
    }
}

/// Nodes whose `views` set contains `source`.
pub fn get_nodes_from_view<'a>(
    subgraph: &'a MergedSubgraph,
    source: GraphSource,
) -> Vec<&'a ScoredNode> {
    subgraph
        .nodes
        .iter()
        .filter(|n| n.views.contains(&source))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ViewNode;
    use uuid::Uuid;

    fn view(source: GraphSource, nodes: Vec<(uuid::Uuid, f64)>) -> GraphView {
        GraphView {
            source,
            nodes: nodes
                .into_iter()
                .map(|(uuid, score)| ViewNode {
                    uuid,
                    data: serde_json::json!({}),
                    score: Some(score),
                })
                .collect(),
        }
    }

    #[test]
    fn empty_views_yield_empty_subgraph_with_zeroed_contributions() {
        let merged = merge(&[], &MergeOptions::default()).unwrap();
        assert!(merged.nodes.is_empty());
        assert_eq!(merged.view_contributions.len(), 4);
        assert!(merged.view_contributions.values().all(|&c| c == 0));
    }

    #[test]
    fn single_view_node_has_no_boost() {
        let u1 = Uuid::new_v4();
        let views = vec![view(GraphSource::Semantic, vec![(u1, 0.8)])];
        let merged = merge(&views, &MergeOptions::default()).unwrap();
        assert_eq!(merged.nodes.len(), 1);
        assert_eq!(merged.nodes[0].final_score, 0.8);
        assert_eq!(merged.nodes[0].view_count, 1);
    }

    #[test]
    fn multi_view_boost_matches_worked_example() {
        // semantic [{u1, 0.8}], entity [{u1, 0.6}, {u2, 0.5}], boost 1.5
        let u1 = Uuid::new_v4();
        let u2 = Uuid::new_v4();
        let views = vec![
            view(GraphSource::Semantic, vec![(u1, 0.8)]),
            view(GraphSource::Entity, vec![(u1, 0.6), (u2, 0.5)]),
        ];
        let options = MergeOptions {
            multi_view_boost: 1.5,
            ..Default::default()
        };
        let merged = merge(&views, &options).unwrap();

        assert_eq!(merged.nodes[0].uuid, u1);
        assert!((merged.nodes[0].final_score - 1.05).abs() < 1e-9);
        assert_eq!(merged.nodes[1].uuid, u2);
        assert!((merged.nodes[1].final_score - 0.5).abs() < 1e-9);
    }

    #[test]
    fn nodes_non_increasing_in_final_score() {
        let u1 = Uuid::new_v4();
        let u2 = Uuid::new_v4();
        let u3 = Uuid::new_v4();
        let views = vec![view(
            GraphSource::Semantic,
            vec![(u1, 0.2), (u2, 0.9), (u3, 0.5)],
        )];
        let merged = merge(&views, &MergeOptions::default()).unwrap();
        for pair in merged.nodes.windows(2) {
            assert!(pair[0].final_score >= pair[1].final_score);
        }
    }

    #[test]
    fn merge_is_order_insensitive_over_input_views() {
        let u1 = Uuid::new_v4();
        let u2 = Uuid::new_v4();
        let a = view(GraphSource::Semantic, vec![(u1, 0.8)]);
        let b = view(GraphSource::Entity, vec![(u1, 0.6), (u2, 0.5)]);

        let merged1 = merge(&[a.clone(), b.clone()], &MergeOptions::default()).unwrap();
        let merged2 = merge(&[b, a], &MergeOptions::default()).unwrap();

        let mut tuples1: Vec<_> = merged1
            .nodes
            .iter()
            .map(|n| (n.uuid, n.view_count, n.final_score))
            .collect();
        let mut tuples2: Vec<_> = merged2
            .nodes
            .iter()
            .map(|n| (n.uuid, n.view_count, n.final_score))
            .collect();
        tuples1.sort_by_key(|t| t.0);
        tuples2.sort_by_key(|t| t.0);
        assert_eq!(tuples1, tuples2);
    }

    #[test]
    fn max_nodes_per_view_caps_before_merge() {
        let nodes: Vec<_> = (0..10).map(|_| (Uuid::new_v4(), 1.0)).collect();
        let views = vec![view(GraphSource::Semantic, nodes)];
        let options = MergeOptions {
            max_nodes_per_view: 3,
            ..Default::default()
        };
        let merged = merge(&views, &options).unwrap();
        assert_eq!(merged.nodes.len(), 3);
        assert_eq!(merged.view_contributions[&GraphSource::Semantic], 3);
    }

    #[test]
    fn rejects_out_of_range_boost() {
        let options = MergeOptions {
            multi_view_boost: 0.5,
            ..Default::default()
        };
        assert!(merge(&[], &options).is_err());
    }

    #[test]
    fn top_n_slices_without_reordering() {
        let u1 = Uuid::new_v4();
        let u2 = Uuid::new_v4();
        let views = vec![view(GraphSource::Semantic, vec![(u1, 0.9), (u2, 0.1)])];
        let merged = merge(&views, &MergeOptions::default()).unwrap();
        let top = top_n(&merged, 1);
        assert_eq!(top.nodes.len(), 1);
        assert_eq!(top.nodes[0].uuid, u1);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        fn arb_view(sources: &'static [GraphSource], pool: &[Uuid]) -> impl Strategy<Value = GraphView> {
            let pool = pool.to_vec();
            (
                prop::sample::select(sources),
                prop::collection::vec(
                    (prop::sample::select(pool), 0.0f64..=1.0),
                    0..pool.len() + 1,
                ),
            )
                .prop_map(|(source, nodes)| GraphView {
                    source: *source,
                    nodes: nodes
                        .into_iter()
                        .map(|(uuid, score)| crate::models::ViewNode {
                            uuid,
                            data: serde_json::json!({}),
                            score: Some(score),
                        })
                        .collect(),
                })
        }

        fn arb_views() -> impl Strategy<Value = Vec<GraphView>> {
            let pool: Vec<Uuid> = (0..6).map(|_| Uuid::new_v4()).collect();
            const SOURCES: &[GraphSource] = &[
                GraphSource::Semantic,
                GraphSource::Entity,
                GraphSource::Temporal,
                GraphSource::Causal,
            ];
            prop::collection::vec(arb_view(SOURCES, &pool), 0..5)
        }

        proptest! {
            #[test]
            fn merged_uuids_are_distinct(views in arb_views()) {
                let merged = merge(&views, &MergeOptions::default()).unwrap();
                let mut seen = HashSet::new();
                for n in &merged.nodes {
                    prop_assert!(seen.insert(n.uuid));
                }
            }

            #[test]
            fn view_count_matches_views_len(views in arb_views()) {
                let merged = merge(&views, &MergeOptions::default()).unwrap();
                for n in &merged.nodes {
                    prop_assert_eq!(n.view_count, n.views.len());
                    prop_assert!(n.view_count >= 1);
                }
            }

            #[test]
            fn nodes_sorted_non_increasing(views in arb_views()) {
                let merged = merge(&views, &MergeOptions::default()).unwrap();
                for pair in merged.nodes.windows(2) {
                    prop_assert!(pair[0].final_score >= pair[1].final_score);
                }
            }

            #[test]
            fn merge_order_insensitive(views in arb_views()) {
                let mut shuffled = views.clone();
                shuffled.reverse();
                let a = merge(&views, &MergeOptions::default()).unwrap();
                let b = merge(&shuffled, &MergeOptions::default()).unwrap();

                let mut ta: Vec<_> = a
                    .nodes
                    .iter()
                    .map(|n| (n.uuid, n.view_count, n.final_score))
                    .collect();
                let mut tb: Vec<_> = b
                    .nodes
                    .iter()
                    .map(|n| (n.uuid, n.view_count, n.final_score))
                    .collect();
                ta.sort_by_key(|t| t.0);
                tb.sort_by_key(|t| t.0);
                prop_assert_eq!(ta, tb);
            }
        }
    }
}
