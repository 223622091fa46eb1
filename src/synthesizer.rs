//! The answer synthesizer: an external policy of signature
//! `(linearizedContext, intent, query) -> Answer`.
//!
//! Pluggable for the same reason as the classifier (see [`crate::classifier`]):
//! the executor and linearizer must be testable without a real LLM behind
//! them.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::AppError;
use crate::models::{LinearizedContext, MAGMAIntentType};

/// The synthesizer's output for one query.
#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    pub text: String,
}

#[async_trait]
pub trait AnswerSynthesizer: Send + Sync {
    async fn synthesize(
        &self,
        context: &LinearizedContext,
        intent: MAGMAIntentType,
        query: &str,
    ) -> Result<Answer, AppError>;
}

/// Echoes the linearized context back as the answer body, prefixed with the
/// query. Stands in for a real LLM-backed synthesizer in tests.
pub struct StubSynthesizer;

#[async_trait]
impl AnswerSynthesizer for StubSynthesizer {
    async fn synthesize(
        &self,
        context: &LinearizedContext,
        _intent: MAGMAIntentType,
        query: &str,
    ) -> Result<Answer, AppError> {
        Ok(Answer {
            text: format!("Q: {}\n\n{}", query, context.text),
        })
    }
}
