//! The intent classifier: an external policy of signature
//! `(query, context?) -> MAGMAIntent`.
//!
//! The executor treats this as a pluggable dependency so it stays testable
//! with a stub, independent of whatever LLM prompt a real deployment wires
//! in behind the trait.

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::{DepthHints, MAGMAIntent, MAGMAIntentType};

#[async_trait]
pub trait MagmaClassifier: Send + Sync {
    async fn classify(
        &self,
        query: &str,
        context: Option<&str>,
    ) -> Result<MAGMAIntent, AppError>;
}

/// Keyword-based stub classifier.
///
/// Not an NLP model: it looks for a handful of question words to pick an
/// intent type and otherwise defaults to `EXPLORE` with default depth
/// hints. Useful for exercising the executor without a real classifier
/// behind it.
pub struct StubClassifier;

#[async_trait]
impl MagmaClassifier for StubClassifier {
    async fn classify(
        &self,
        query: &str,
        _context: Option<&str>,
    ) -> Result<MAGMAIntent, AppError> {
        let lower = query.to_lowercase();
        let intent_type = if lower.starts_with("why") {
            MAGMAIntentType::Why
        } else if lower.starts_with("when") {
            MAGMAIntentType::When
        } else if lower.starts_with("who") {
            MAGMAIntentType::Who
        } else if lower.starts_with("what") {
            MAGMAIntentType::What
        } else {
            MAGMAIntentType::Explore
        };

        Ok(MAGMAIntent {
            intent_type,
            entities: Vec::new(),
            temporal_hints: Vec::new(),
            depth_hints: DepthHints::default(),
            confidence: 0.5,
        })
    }
}
