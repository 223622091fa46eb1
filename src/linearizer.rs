//! Context linearizer: turns a merged subgraph into token-budgeted text.
//!
//! Pure and synchronous, like [`crate::merger`]. Ordering and formatting
//! only, no I/O.

use std::cmp::Ordering;

use crate::error::AppError;
use crate::models::{GraphSource, MAGMAIntentType, MergedSubgraph, ScoredNode};

const TRUNCATION_MARKER: &str = "\n[... additional context truncated ...]";

fn header_for(intent: MAGMAIntentType) -> &'static str {
    match intent {
        MAGMAIntentType::Why => {
            "## Causal Analysis Context\nThe following shows cause-and-effect relationships:\n"
        }
        MAGMAIntentType::When => {
            "## Temporal Context\nThe following events are ordered chronologically:\n"
        }
        MAGMAIntentType::Who => {
            "## Entity Context\nThe following entities are relevant to your query:\n"
        }
        MAGMAIntentType::What => {
            "## Descriptive Context\nThe following information describes the subject:\n"
        }
        MAGMAIntentType::Explore => {
            "## Retrieved Context\nThe following information is relevant to your query:\n"
        }
    }
}

fn strategy_for(intent: MAGMAIntentType) -> &'static str {
    match intent {
        MAGMAIntentType::Why => "causal_chain",
        MAGMAIntentType::When => "temporal",
        MAGMAIntentType::Who | MAGMAIntentType::What => "entity_grouped",
        MAGMAIntentType::Explore => "score_ranked",
    }
}

/// Bounds for [`linearize`].
#[derive(Debug, Clone, Copy)]
pub struct LinearizerOptions {
    pub max_tokens: usize,
}

impl Default for LinearizerOptions {
    fn default() -> Self {
        Self { max_tokens: 4000 }
    }
}

impl LinearizerOptions {
    pub fn validate(&self) -> Result<(), AppError> {
        if !(100..=100_000).contains(&self.max_tokens) {
            return Err(AppError::Validation(
                "max_tokens must be in [100, 100000]".into(),
            ));
        }
        Ok(())
    }
}

fn str_field<'a>(node: &'a ScoredNode, field: &str) -> Option<&'a str> {
    node.data.get(field).and_then(|v| v.as_str())
}

fn display_value(node: &ScoredNode) -> String {
    str_field(node, "name")
        .or_else(|| str_field(node, "description"))
        .or_else(|| str_field(node, "content"))
        .map(str::to_string)
        .unwrap_or_else(|| node.uuid.to_string())
}

fn type_value(node: &ScoredNode) -> String {
    str_field(node, "entity_type")
        .or_else(|| str_field(node, "node_type"))
        .or_else(|| str_field(node, "type"))
        .unwrap_or("unknown")
        .to_string()
}

const DATE_FIELDS: [&str; 5] = [
    "occurred_at",
    "valid_from",
    "created_at",
    "date",
    "timestamp",
];

fn date_field(node: &ScoredNode) -> Option<(&'static str, String)> {
    for field in DATE_FIELDS {
        if let Some(v) = str_field(node, field) {
            return Some((field, v.to_string()));
        }
    }
    None
}

fn parseable_date(node: &ScoredNode) -> Option<chrono::DateTime<chrono::Utc>> {
    let (_, raw) = date_field(node)?;
    chrono::DateTime::parse_from_rfc3339(&raw)
        .map(|d| d.with_timezone(&chrono::Utc))
        .ok()
}

fn by_score_desc(a: &ScoredNode, b: &ScoredNode) -> Ordering {
    b.final_score
        .partial_cmp(&a.final_score)
        .unwrap_or(Ordering::Equal)
}

fn order_nodes(nodes: &[ScoredNode], intent: MAGMAIntentType) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..nodes.len()).collect();

    match intent {
        MAGMAIntentType::Explore => {
            indices.sort_by(|&a, &b| by_score_desc(&nodes[a], &nodes[b]));
        }
        MAGMAIntentType::Why => {
            indices.sort_by(|&a, &b| {
                let a_causal = nodes[a].views.contains(&GraphSource::Causal);
                let b_causal = nodes[b].views.contains(&GraphSource::Causal);
                b_causal
                    .cmp(&a_causal)
                    .then_with(|| by_score_desc(&nodes[a], &nodes[b]))
            });
        }
        MAGMAIntentType::When => {
            indices.sort_by(|&a, &b| {
                let a_temporal = nodes[a].views.contains(&GraphSource::Temporal);
                let b_temporal = nodes[b].views.contains(&GraphSource::Temporal);
                let bucket = b_temporal.cmp(&a_temporal);
                if bucket != Ordering::Equal {
                    return bucket;
                }
                match (parseable_date(&nodes[a]), parseable_date(&nodes[b])) {
                    (Some(da), Some(db)) => da.cmp(&db),
                    _ => by_score_desc(&nodes[a], &nodes[b]),
                }
            });
        }
        MAGMAIntentType::Who | MAGMAIntentType::What => {
            indices.sort_by(|&a, &b| {
                type_value(&nodes[a])
                    .cmp(&type_value(&nodes[b]))
                    .then_with(|| by_score_desc(&nodes[a], &nodes[b]))
            });
        }
    }

    indices
}

fn truncate_description(s: &str) -> String {
    if s.chars().count() <= 200 {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(200).collect();
        truncated
    }
}

fn format_node(node: &ScoredNode, intent: MAGMAIntentType) -> String {
    let display = display_value(node);
    let node_type = type_value(node);
    let mut out = format!("- **{}** ({})\n", display, node_type);

    if intent == MAGMAIntentType::Why {
        if let Some(confidence) = node.data.get("confidence") {
            out.push_str(&format!("  Confidence: {}\n", confidence));
        }
    }

    if intent == MAGMAIntentType::When {
        if let Some((_, raw)) = date_field(node) {
            out.push_str(&format!("  Date: {}\n", raw));
        }
    }

    if let Some(description) = str_field(node, "description") {
        if description != display {
            out.push_str(&format!("  {}\n", truncate_description(description)));
        }
    }

    let mut sources: Vec<&str> = node.views.iter().map(GraphSource::as_str).collect();
    sources.sort_unstable();
    out.push_str(&format!("  [Found in: {}]\n", sources.join(", ")));

    out
}

fn estimated_tokens(text: &str) -> usize {
    text.len().div_ceil(4)
}

/// Orders, formats, and budget-truncates a merged subgraph into text for
/// one intent's linearization strategy. Total and deterministic.
pub fn linearize(
    subgraph: &MergedSubgraph,
    intent: MAGMAIntentType,
    options: &LinearizerOptions,
) -> Result<crate::models::LinearizedContext, AppError> {
    options
        .validate()
        .map_err(|_| AppError::Linearization(format!("invalid options for intent {:?}", intent)))?;

    let strategy = strategy_for(intent);
    let header = header_for(intent);
    let order = order_nodes(&subgraph.nodes, intent);

    let mut text = header.to_string();
    let mut included = 0usize;
    let mut truncated = false;

    for idx in order {
        let node = &subgraph.nodes[idx];
        let bullet = format_node(node, intent);
        let candidate_len = text.len() + bullet.len();
        if estimated_tokens(&format!("{}{}", text, bullet)) > options.max_tokens
            && included > 0
        {
            text.push_str(TRUNCATION_MARKER);
            truncated = true;
            break;
        }
        let _ = candidate_len;
        text.push_str(&bullet);
        included += 1;
    }

    if included < subgraph.nodes.len() && !truncated {
        text.push_str(TRUNCATION_MARKER);
    }

    let footer = format_footer(subgraph, included);
    if estimated_tokens(&format!("{}{}", text, footer)) <= options.max_tokens {
        text.push_str(&footer);
    }

    Ok(crate::models::LinearizedContext {
        estimated_tokens: estimated_tokens(&text),
        node_count: included,
        strategy,
        text,
    })
}

fn format_footer(subgraph: &MergedSubgraph, included: usize) -> String {
    let mut sources: Vec<_> = subgraph.view_contributions.iter().collect();
    sources.sort_by_key(|(source, _)| source.as_str());
    let parts: Vec<String> = sources
        .iter()
        .map(|(source, count)| format!("{}: {}", source.as_str(), count))
        .collect();
    format!(
        "\n---\nSources: {} | Total nodes: {}",
        parts.join(", "),
        included
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ScoredNode;
    use std::collections::HashSet;
    use uuid::Uuid;

    fn node(
        uuid: Uuid,
        data: serde_json::Value,
        score: f64,
        views: &[GraphSource],
    ) -> ScoredNode {
        ScoredNode {
            uuid,
            data,
            view_count: views.len(),
            views: views.iter().copied().collect(),
            final_score: score,
        }
    }

    fn subgraph(nodes: Vec<ScoredNode>) -> MergedSubgraph {
        MergedSubgraph {
            nodes,
            view_contributions: MergedSubgraph::empty().view_contributions,
        }
    }

    #[test]
    fn header_is_bit_exact_per_intent() {
        assert_eq!(
            header_for(MAGMAIntentType::Why),
            "## Causal Analysis Context\nThe following shows cause-and-effect relationships:\n"
        );
        assert_eq!(
            header_for(MAGMAIntentType::When),
            "## Temporal Context\nThe following events are ordered chronologically:\n"
        );
        assert_eq!(
            header_for(MAGMAIntentType::Who),
            "## Entity Context\nThe following entities are relevant to your query:\n"
        );
        assert_eq!(
            header_for(MAGMAIntentType::What),
            "## Descriptive Context\nThe following information describes the subject:\n"
        );
        assert_eq!(
            header_for(MAGMAIntentType::Explore),
            "## Retrieved Context\nThe following information is relevant to your query:\n"
        );
    }

    #[test]
    fn temporal_ordering_places_earlier_date_first() {
        let a = node(
            Uuid::new_v4(),
            serde_json::json!({"name": "later", "occurred_at": "2024-06-15T00:00:00Z"}),
            0.9,
            &[GraphSource::Temporal],
        );
        let b = node(
            Uuid::new_v4(),
            serde_json::json!({"name": "earlier", "occurred_at": "2024-01-01T00:00:00Z"}),
            0.8,
            &[GraphSource::Temporal],
        );
        let sub = subgraph(vec![a, b]);
        let result = linearize(
            &sub,
            MAGMAIntentType::When,
            &LinearizerOptions::default(),
        )
        .unwrap();

        let earlier_pos = result.text.find("earlier").unwrap();
        let later_pos = result.text.find("later").unwrap();
        assert!(earlier_pos < later_pos);
    }

    #[test]
    fn node_count_reflects_included_not_input() {
        let nodes: Vec<_> = (0..20)
            .map(|i| {
                node(
                    Uuid::new_v4(),
                    serde_json::json!({
                        "name": format!("node-{i}"),
                        "description": "x".repeat(500),
                    }),
                    1.0 - (i as f64) * 0.01,
                    &[GraphSource::Semantic],
                )
            })
            .collect();
        let sub = subgraph(nodes);
        let options = LinearizerOptions { max_tokens: 150 };
        let result = linearize(&sub, MAGMAIntentType::Explore, &options).unwrap();

        assert!(result.node_count < 20);
        assert!(result.text.contains("[... additional context truncated ...]"));
    }

    #[test]
    fn estimated_tokens_matches_formula() {
        let sub = subgraph(vec![node(
            Uuid::new_v4(),
            serde_json::json!({"name": "only"}),
            0.5,
            &[GraphSource::Semantic],
        )]);
        let result = linearize(&sub, MAGMAIntentType::Explore, &LinearizerOptions::default())
            .unwrap();
        assert_eq!(result.estimated_tokens, result.text.len().div_ceil(4));
    }

    #[test]
    fn empty_subgraph_linearizes_to_header_only() {
        let sub = subgraph(vec![]);
        let result = linearize(&sub, MAGMAIntentType::Explore, &LinearizerOptions::default())
            .unwrap();
        assert_eq!(result.node_count, 0);
        assert!(!result.text.contains("truncated"));
    }

    #[test]
    fn entity_grouped_sorts_by_type_then_score() {
        let a = node(
            Uuid::new_v4(),
            serde_json::json!({"name": "a", "entity_type": "person"}),
            0.1,
            &[GraphSource::Entity],
        );
        let b = node(
            Uuid::new_v4(),
            serde_json::json!({"name": "b", "entity_type": "org"}),
            0.9,
            &[GraphSource::Entity],
        );
        let sub = subgraph(vec![a, b]);
        let result = linearize(&sub, MAGMAIntentType::Who, &LinearizerOptions::default())
            .unwrap();
        // "org" < "person" lexicographically
        let org_pos = result.text.find("**b**").unwrap();
        let person_pos = result.text.find("**a**").unwrap();
        assert!(org_pos < person_pos);
    }

    #[test]
    fn rejects_out_of_range_max_tokens() {
        let sub = subgraph(vec![]);
        let options = LinearizerOptions { max_tokens: 99 };
        assert!(linearize(&sub, MAGMAIntentType::Explore, &options).is_err());
    }
}
