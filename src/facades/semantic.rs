//! Semantic graph facade: `S_Concept` nodes and vector-similarity search.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::context::{AppEmbedder, AppGraph};
use crate::di::FromContext;
use crate::embedding::embed_text;
use crate::error::AppError;
use crate::graph::{Node, Row};
use crate::models::{Concept, EnrichedSemanticMatch, SemanticMatch};

/// Typed wrapper over the `S_Concept` label. Never touches any other label.
#[derive(FromContext, Clone)]
pub struct SemanticFacade {
    graph: AppGraph,
    embedder: AppEmbedder,
}

impl SemanticFacade {
    /// Creates a concept, generating and storing its embedding.
    pub async fn add_concept(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<Concept, AppError> {
        if name.trim().is_empty() {
            return Err(AppError::Validation("concept name must not be empty".into()));
        }

        let embedding = embed_text(&self.embedder, name)?;
        let mut concept = Concept::new(name.to_string(), description.map(str::to_string));
        concept.embedding = Some(embedding.clone());

        self.graph
            .query(
                "CREATE (c:S_Concept {
                    uuid: $uuid,
                    name: $name,
                    description: $description,
                    embedding: $embedding,
                    created_at: $created_at
                })",
            )
            .param("uuid", concept.uuid.to_string())
            .param("name", &concept.name)
            .param("description", &concept.description)
            .param("embedding", &embedding)
            .param("created_at", concept.created_at.to_rfc3339())
            .run()
            .await?;

        Ok(concept)
    }

    /// Vector-similarity search over all concepts, sorted by score descending.
    pub async fn search(&self, query: &str, top_k: usize) -> Result<Vec<SemanticMatch>, AppError> {
        let query_embedding = embed_text(&self.embedder, query)?;

        let rows = self
            .graph
            .query("MATCH (c:S_Concept) WHERE c.embedding IS NOT NULL RETURN c")
            .fetch_all()
            .await?;

        let mut matches: Vec<SemanticMatch> = rows
            .iter()
            .filter_map(|row| {
                let concept = Self::row_to_concept(row).ok()?;
                let score = concept
                    .embedding
                    .as_ref()
                    .map(|e| cosine_similarity(&query_embedding, e))?;
                Some(SemanticMatch { concept, score })
            })
            .collect();

        matches.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        matches.truncate(top_k);
        Ok(matches)
    }

    /// Same as [`search`](Self::search), additionally resolving `X_REPRESENTS`
    /// cross-links for each hit in the same traversal.
    pub async fn search_with_entities(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<EnrichedSemanticMatch>, AppError> {
        let matches = self.search(query, top_k).await?;
        let mut enriched = Vec::with_capacity(matches.len());

        for m in matches {
            let rows = self
                .graph
                .query(
                    "MATCH (c:S_Concept {uuid: $uuid})-[:X_REPRESENTS]->(e:E_Entity)
                     RETURN e.uuid AS id, e.name AS name",
                )
                .param("uuid", m.concept.uuid.to_string())
                .fetch_all()
                .await?;

            let mut linked_entity_ids = Vec::new();
            let mut linked_entity_names = Vec::new();
            for row in &rows {
                let id: String = row.get("id")?;
                let name: String = row.get("name")?;
                if let Ok(uuid) = Uuid::parse_str(&id) {
                    linked_entity_ids.push(uuid);
                }
                linked_entity_names.push(name);
            }

            enriched.push(EnrichedSemanticMatch {
                concept: m.concept,
                score: m.score,
                linked_entity_ids,
                linked_entity_names,
            });
        }

        Ok(enriched)
    }

    fn row_to_concept(row: &Row) -> Result<Concept, AppError> {
        let node: Node = row.get("c")?;
        let uuid_str: String = node.get("uuid")?;
        let uuid = Uuid::parse_str(&uuid_str)
            .map_err(|e| AppError::Parse(format!("invalid concept uuid: {}", e)))?;
        let embedding: Option<Vec<f32>> = node.get_opt("embedding")?;
        let created_at: String = node.get("created_at")?;
        let created_at = DateTime::parse_from_rfc3339(&created_at)
            .map_err(|e| AppError::Parse(format!("invalid created_at: {}", e)))?
            .with_timezone(&Utc);

        Ok(Concept {
            uuid,
            name: node.get("name")?,
            description: node.get_opt("description")?,
            embedding,
            created_at,
        })
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| (*x as f64) * (*y as f64)).sum();
    let norm_a: f64 = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_vectors_score_one() {
        let v = vec![1.0, 2.0, 3.0];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn orthogonal_vectors_score_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
    }

    #[test]
    fn mismatched_lengths_score_zero() {
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[1.0]), 0.0);
    }

    #[test]
    fn zero_vector_scores_zero_instead_of_nan() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }
}
