//! Configuration with layered resolution using figment.
//!
//! Resolution order (highest priority last):
//! 1. User config: `~/.config/magma/config.toml` (XDG) or platform config dir
//! 2. Project config: `.magma.toml`
//! 3. Environment variables: `MAGMA_*`

use std::ops::Deref;

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;

/// Boxed wrapper for figment::Error to reduce Result size on the stack.
#[derive(Debug)]
pub struct ConfigError(Box<figment::Error>);

impl Deref for ConfigError {
    type Target = figment::Error;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self(Box::new(err))
    }
}

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub storage: StorageConfig,
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default)]
    pub magma: MagmaConfig,
    #[serde(default)]
    pub merge: MergeConfig,
    #[serde(default)]
    pub linearizer: LinearizerConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// PostgreSQL + Apache AGE connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub uri: String,
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
}

fn default_database() -> String {
    "magma".to_string()
}

fn default_pool_size() -> usize {
    10
}

/// Embedding provider configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,
}

fn default_provider() -> String {
    "fastembed".to_string()
}

fn default_model() -> String {
    "BAAI/bge-small-en-v1.5".to_string()
}

fn default_dimensions() -> usize {
    384
}

/// Project-specific configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectConfig {
    #[serde(default = "default_graph_name")]
    pub name: String,
}

fn default_graph_name() -> String {
    "magma".to_string()
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: default_graph_name(),
        }
    }
}

impl ProjectConfig {
    /// The Apache AGE graph name backing this project.
    pub fn graph_name(&self) -> String {
        self.name.clone()
    }
}

/// MAGMA executor bounds (semantic_top_k, min_semantic_score, timeout).
#[derive(Debug, Clone, Deserialize)]
pub struct MagmaConfig {
    #[serde(default = "default_semantic_top_k")]
    pub semantic_top_k: usize,
    #[serde(default = "default_min_semantic_score")]
    pub min_semantic_score: f64,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_semantic_top_k() -> usize {
    10
}

fn default_min_semantic_score() -> f64 {
    0.5
}

fn default_timeout_ms() -> u64 {
    5_000
}

impl Default for MagmaConfig {
    fn default() -> Self {
        Self {
            semantic_top_k: default_semantic_top_k(),
            min_semantic_score: default_min_semantic_score(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

/// Subgraph merger bounds (multi_view_boost, min/max nodes per view).
#[derive(Debug, Clone, Deserialize)]
pub struct MergeConfig {
    #[serde(default = "default_multi_view_boost")]
    pub multi_view_boost: f64,
    #[serde(default = "default_min_nodes_per_view")]
    pub min_nodes_per_view: usize,
    #[serde(default = "default_max_nodes_per_view")]
    pub max_nodes_per_view: usize,
}

fn default_multi_view_boost() -> f64 {
    1.5
}

fn default_min_nodes_per_view() -> usize {
    3
}

fn default_max_nodes_per_view() -> usize {
    50
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            multi_view_boost: default_multi_view_boost(),
            min_nodes_per_view: default_min_nodes_per_view(),
            max_nodes_per_view: default_max_nodes_per_view(),
        }
    }
}

/// Context linearizer bounds (max_tokens).
#[derive(Debug, Clone, Deserialize)]
pub struct LinearizerConfig {
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
}

fn default_max_tokens() -> usize {
    4_000
}

impl Default for LinearizerConfig {
    fn default() -> Self {
        Self {
            max_tokens: default_max_tokens(),
        }
    }
}

/// HTTP server and session configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_session_timeout_secs")]
    pub session_timeout_secs: u64,
    #[serde(default = "default_session_cleanup_interval_secs")]
    pub session_cleanup_interval_secs: u64,
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_session_timeout_secs() -> u64 {
    1800
}

fn default_session_cleanup_interval_secs() -> u64 {
    300
}

fn default_max_body_bytes() -> usize {
    10 * 1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            session_timeout_secs: default_session_timeout_secs(),
            session_cleanup_interval_secs: default_session_cleanup_interval_secs(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl Config {
    /// Load config with layered resolution (user → project → env).
    pub fn load() -> Result<Self, ConfigError> {
        let user_config = Self::user_config_path();

        Figment::new()
            // Layer 1: User config (lowest priority)
            .merge(Toml::file(user_config))
            // Layer 2: Project config
            .merge(Toml::file(".magma.toml"))
            // Layer 3: Environment variables (highest priority)
            // Use double underscore for nesting (e.g., MAGMA_SERVER__MAX_BODY_BYTES -> server.max_body_bytes)
            .merge(Env::prefixed("MAGMA_").map(|key| key.as_str().replace("__", ".").into()))
            .extract()
            .map_err(ConfigError::from)
    }

    /// User config path: ~/.config/magma/config.toml (XDG) or platform config dir.
    fn user_config_path() -> std::path::PathBuf {
        if let Some(home) = dirs::home_dir() {
            let xdg_path = home.join(".config").join("magma").join("config.toml");
            if xdg_path.exists() {
                return xdg_path;
            }
        }
        dirs::config_dir()
            .map(|p| p.join("magma").join("config.toml"))
            .unwrap_or_default()
    }
}
