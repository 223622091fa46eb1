//! Embedding generation, wrapping the configured provider and mapping its
//! failures onto the engine's embedding error sub-kinds.

use crate::context::AppEmbedder;
use crate::error::{AppError, EmbeddingError};

/// Generates an embedding vector for a single piece of text.
///
/// The provider is opaque (text-in/vector-out); its errors are not
/// distinguishable by sub-kind from the string it returns, so they are
/// surfaced as `EmbeddingError::Unknown` here. Callers that need finer
/// HTTP-status-like mapping (auth/rate-limit/model/input/server/permission/
/// config) should match on the provider's concrete error type before it
/// reaches this boundary, once one is wired in.
pub fn embed_text(embedder: &AppEmbedder, text: &str) -> Result<Vec<f32>, AppError> {
    embedder
        .embed(text)
        .map_err(|e| AppError::Embedding(EmbeddingError::Unknown(e.to_string())))
}
