//! Application context providing dependency injection root.

use color_eyre::Result;
use raggy::embeddings::{FastEmbedConfig, FastEmbedModel, ProviderConfig};
use raggy::{Embedder, EmbeddingProvider, FastEmbedProvider};
use std::sync::Arc;

use crate::config::Config;
use crate::di::Context as ContextDerive;
use crate::graph::backends::postgres::PostgresClient;

/// Type alias for the shared graph client used throughout the application.
pub type AppGraph = Arc<PostgresClient>;

/// Type alias for the embedder used throughout the application.
pub type AppEmbedder = Arc<Embedder<FastEmbedProvider>>;

/// Root application context for dependency injection.
///
/// The Context holds all shared dependencies and uses `#[derive(Context)]`
/// to generate `FromRef` implementations for each field, enabling
/// compile-time dependency resolution by the facades and tool router.
#[derive(ContextDerive, Clone)]
pub struct Context {
    /// PostgreSQL + Apache AGE connection pool.
    pub graph: AppGraph,
    /// Application configuration.
    pub config: Arc<Config>,
    /// Embedding provider for semantic search.
    pub embedder: AppEmbedder,
}

impl Context {
    /// Creates a context from configuration, connecting to the backing
    /// store and initializing embeddings.
    pub async fn from(config: Config) -> Result<Self> {
        let graph_name = config.project.graph_name();
        let client = PostgresClient::connect(&config.storage.uri, &graph_name)
            .await
            .map_err(|e| color_eyre::eyre::eyre!("Failed to connect: {}", e))?;

        let embedder = Self::create_embedder(&config, false)?;

        Ok(Self {
            graph: Arc::new(client),
            config: Arc::new(config),
            embedder: Arc::new(embedder),
        })
    }

    /// Create the embedding provider based on configuration.
    pub(crate) fn create_embedder(
        config: &Config,
        show_download_progress: bool,
    ) -> Result<Embedder<FastEmbedProvider>> {
        let model = match config.embedding.model.as_str() {
            "BAAI/bge-small-en-v1.5" | "bge-small-en-v1.5" => FastEmbedModel::BGESmallENV15,
            "BAAI/bge-base-en-v1.5" | "bge-base-en-v1.5" => FastEmbedModel::BGEBaseENV15,
            "BAAI/bge-large-en-v1.5" | "bge-large-en-v1.5" => FastEmbedModel::BGELargeENV15,
            "all-MiniLM-L6-v2" => FastEmbedModel::AllMiniLML6V2,
            "all-MiniLM-L12-v2" => FastEmbedModel::AllMiniLML12V2,
            "nomic-embed-text-v1" => FastEmbedModel::NomicEmbedTextV1,
            "nomic-embed-text-v1.5" => FastEmbedModel::NomicEmbedTextV15,
            _ => FastEmbedModel::BGESmallENV15,
        };

        let provider_config = ProviderConfig::FastEmbed(FastEmbedConfig {
            model,
            show_download_progress,
            cache_dir: None,
        });

        let provider = FastEmbedProvider::new(provider_config)?;
        Ok(Embedder::new(provider))
    }
}
