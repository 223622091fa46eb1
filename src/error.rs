//! Application error types with MCP protocol conversion.

use rmcp::model::ErrorCode;
use thiserror::Error;

/// Sub-kinds for embedding provider failures.
#[derive(Error, Debug)]
pub enum EmbeddingError {
    #[error("embedding provider auth failed: {0}")]
    Auth(String),

    #[error("embedding provider rate limit: {0}")]
    RateLimit(String),

    #[error("embedding model error: {0}")]
    Model(String),

    #[error("embedding input invalid: {0}")]
    Input(String),

    #[error("embedding provider server error: {0}")]
    Server(String),

    #[error("embedding provider permission denied: {0}")]
    Permission(String),

    #[error("embedding provider misconfigured: {0}")]
    Config(String),

    #[error("embedding provider unknown error: {0}")]
    Unknown(String),
}

/// Application-level errors. Variants map to the engine's error kind
/// taxonomy: validation, parse, not-found, relationship, temporal,
/// causal-traversal, embedding-*, timeout, backend.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("relationship error: {0}")]
    Relationship(String),

    #[error("temporal error: {0}")]
    Temporal(String),

    #[error("causal traversal error: {0}")]
    CausalTraversal(String),

    #[error("embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("operation timed out: {0}")]
    Timeout(String),

    #[error("backend error: {0}")]
    Backend(String),

    #[error("merge error: {0}")]
    Merge(String),

    #[error("linearization error: {0}")]
    Linearization(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

impl From<tokio_postgres::Error> for AppError {
    fn from(err: tokio_postgres::Error) -> Self {
        AppError::Backend(err.to_string())
    }
}

impl From<deadpool_postgres::PoolError> for AppError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        AppError::Backend(err.to_string())
    }
}

impl From<AppError> for rmcp::model::ErrorData {
    fn from(err: AppError) -> Self {
        let (code, app_code) = match &err {
            AppError::Validation(_) => (ErrorCode::INVALID_PARAMS, "VALIDATION"),
            AppError::Parse(_) => (ErrorCode::INTERNAL_ERROR, "PARSE"),
            AppError::NotFound(_) => (ErrorCode::RESOURCE_NOT_FOUND, "NOT_FOUND"),
            AppError::Relationship(_) => (ErrorCode::INTERNAL_ERROR, "RELATIONSHIP"),
            AppError::Temporal(_) => (ErrorCode::INTERNAL_ERROR, "TEMPORAL"),
            AppError::CausalTraversal(_) => (ErrorCode::INTERNAL_ERROR, "CAUSAL_TRAVERSAL"),
            AppError::Embedding(_) => (ErrorCode::INTERNAL_ERROR, "EMBEDDING"),
            AppError::Timeout(_) => (ErrorCode::INTERNAL_ERROR, "TIMEOUT"),
            AppError::Backend(_) => (ErrorCode::INTERNAL_ERROR, "BACKEND"),
            AppError::Merge(_) => (ErrorCode::INTERNAL_ERROR, "MERGE"),
            AppError::Linearization(_) => (ErrorCode::INTERNAL_ERROR, "LINEARIZATION"),
            AppError::Internal(_) => (ErrorCode::INTERNAL_ERROR, "INTERNAL"),
            AppError::Config(_) => (ErrorCode::INTERNAL_ERROR, "CONFIG"),
        };

        rmcp::model::ErrorData::new(code, format!("[{}] {}", app_code, err), None)
    }
}
