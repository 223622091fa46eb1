//! Seed extraction: deriving entity seeds from semantic concept hits.
//!
//! Pure orchestration over the cross-linker facade; no query logic of its
//! own, just thin composition of facade calls.

use std::collections::HashSet;

use uuid::Uuid;

use crate::error::AppError;
use crate::facades::CrossLinkerFacade;
use crate::models::{
    CrossLinkType, EnrichedSemanticMatch, EntitySeed, SeedExtractionResult, SeedExtractionStats,
    SemanticMatch,
};

/// Concepts are processed in groups of this size when deriving seeds via
/// the batched cross-linker variant.
const DEFAULT_BATCH_SIZE: usize = 10;

/// Derives entity seeds from semantic matches by following each concept's
/// outgoing `X_REPRESENTS` cross-links.
///
/// Dedupes by `entity_id`: the first concept (in input order) to introduce
/// an entity wins the attribution for that seed.
pub async fn extract_seeds(
    matches: &[SemanticMatch],
    cross_linker: &CrossLinkerFacade,
) -> Result<SeedExtractionResult, AppError> {
    extract_seeds_batched(matches, cross_linker, DEFAULT_BATCH_SIZE).await
}

/// Same as [`extract_seeds`], but round-trips to the cross-linker in
/// parallel groups of `batch_size` to cut latency on wide concept sets.
/// Dedup is applied in the serial merge after each batch completes, so the
/// "first concept wins" invariant holds regardless of batch size.
pub async fn extract_seeds_batched(
    matches: &[SemanticMatch],
    cross_linker: &CrossLinkerFacade,
    batch_size: usize,
) -> Result<SeedExtractionResult, AppError> {
    let batch_size = batch_size.max(1);
    let mut seen_entities: HashSet<Uuid> = HashSet::new();
    let mut entity_seeds = Vec::new();
    let mut concept_ids = Vec::with_capacity(matches.len());
    let mut stats = SeedExtractionStats {
        concepts_searched: matches.len(),
        entities_found: 0,
        concepts_without_links: 0,
    };

    for batch in matches.chunks(batch_size) {
        let link_futures = batch
            .iter()
            .map(|m| cross_linker.get_links_from(m.concept.uuid));
        let batch_links = futures::future::try_join_all(link_futures).await?;

        for (m, links) in batch.iter().zip(batch_links) {
            concept_ids.push(m.concept.uuid);
            let represents: Vec<_> = links
                .into_iter()
                .filter(|l| l.link_type == CrossLinkType::XRepresents)
                .collect();

            if represents.is_empty() {
                stats.concepts_without_links += 1;
                continue;
            }

            for link in represents {
                if seen_entities.insert(link.target_id) {
                    entity_seeds.push(EntitySeed {
                        entity_id: link.target_id,
                        source_concept_id: m.concept.uuid,
                        semantic_score: m.score,
                    });
                }
            }
        }
    }

    stats.entities_found = entity_seeds.len();

    Ok(SeedExtractionResult {
        entity_seeds,
        concept_ids,
        stats,
    })
}

/// Derives seeds directly from cross-link-enriched semantic matches,
/// skipping the cross-linker round-trip entirely. Only matches whose
/// resolved score meets `min_score` contribute seeds.
pub fn extract_seeds_from_enriched(
    matches: &[EnrichedSemanticMatch],
    min_score: f64,
) -> SeedExtractionResult {
    let mut seen_entities: HashSet<Uuid> = HashSet::new();
    let mut entity_seeds = Vec::new();
    let mut concept_ids = Vec::with_capacity(matches.len());
    let mut stats = SeedExtractionStats {
        concepts_searched: matches.len(),
        entities_found: 0,
        concepts_without_links: 0,
    };

    for m in matches {
        concept_ids.push(m.concept.uuid);
        if m.score < min_score {
            continue;
        }
        if m.linked_entity_ids.is_empty() {
            stats.concepts_without_links += 1;
            continue;
        }
        for entity_id in &m.linked_entity_ids {
            if seen_entities.insert(*entity_id) {
                entity_seeds.push(EntitySeed {
                    entity_id: *entity_id,
                    source_concept_id: m.concept.uuid,
                    semantic_score: m.score,
                });
            }
        }
    }

    stats.entities_found = entity_seeds.len();

    SeedExtractionResult {
        entity_seeds,
        concept_ids,
        stats,
    }
}

/// Entity ids from a seed list, preserving order.
pub fn get_entity_ids(seeds: &[EntitySeed]) -> Vec<Uuid> {
    seeds.iter().map(|s| s.entity_id).collect()
}

/// Keeps only seeds whose `semantic_score >= min_score`, preserving order.
pub fn filter_seeds_by_score(seeds: &[EntitySeed], min_score: f64) -> Vec<EntitySeed> {
    seeds
        .iter()
        .filter(|s| s.semantic_score >= min_score)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed(entity: Uuid, concept: Uuid, score: f64) -> EntitySeed {
        EntitySeed {
            entity_id: entity,
            source_concept_id: concept,
            semantic_score: score,
        }
    }

    #[test]
    fn filter_seeds_by_score_preserves_order_and_threshold() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();
        let concept = Uuid::new_v4();
        let seeds = vec![seed(a, concept, 0.9), seed(b, concept, 0.3), seed(c, concept, 0.5)];

        let filtered = filter_seeds_by_score(&seeds, 0.5);
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0].entity_id, a);
        assert_eq!(filtered[1].entity_id, c);
    }

    #[test]
    fn get_entity_ids_preserves_order() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let concept = Uuid::new_v4();
        let seeds = vec![seed(a, concept, 0.9), seed(b, concept, 0.3)];
        assert_eq!(get_entity_ids(&seeds), vec![a, b]);
    }

    #[test]
    fn extract_seeds_from_enriched_dedupes_first_concept_wins() {
        let concept1 = Uuid::new_v4();
        let concept2 = Uuid::new_v4();
        let entity1 = Uuid::new_v4();

        let matches = vec![
            crate::models::EnrichedSemanticMatch {
                concept: crate::models::Concept::new("c1".into(), None),
                score: 0.9,
                linked_entity_ids: vec![entity1],
                linked_entity_names: vec!["e1".into()],
            },
            crate::models::EnrichedSemanticMatch {
                concept: crate::models::Concept::new("c2".into(), None),
                score: 0.8,
                linked_entity_ids: vec![entity1],
                linked_entity_names: vec!["e1".into()],
            },
        ];
        let _ = (concept1, concept2);

        let result = extract_seeds_from_enriched(&matches, 0.0);
        assert_eq!(result.entity_seeds.len(), 1);
        assert_eq!(result.entity_seeds[0].entity_id, entity1);
        assert_eq!(result.stats.concepts_without_links, 0);
    }

    #[test]
    fn extract_seeds_from_enriched_counts_concepts_without_links() {
        let matches = vec![crate::models::EnrichedSemanticMatch {
            concept: crate::models::Concept::new("c1".into(), None),
            score: 0.9,
            linked_entity_ids: vec![],
            linked_entity_names: vec![],
        }];

        let result = extract_seeds_from_enriched(&matches, 0.0);
        assert_eq!(result.entity_seeds.len(), 0);
        assert_eq!(result.stats.concepts_without_links, 1);
    }

    #[test]
    fn extract_seeds_from_enriched_filters_by_min_score() {
        let matches = vec![crate::models::EnrichedSemanticMatch {
            concept: crate::models::Concept::new("c1".into(), None),
            score: 0.3,
            linked_entity_ids: vec![Uuid::new_v4()],
            linked_entity_names: vec!["e1".into()],
        }];

        let result = extract_seeds_from_enriched(&matches, 0.5);
        assert_eq!(result.entity_seeds.len(), 0);
    }
}
