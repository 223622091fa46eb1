//! MAGMA - multi-graph memory retrieval engine
//!
//! Answers natural-language questions against a knowledge base organized as
//! four co-resident graphs (semantic, entity, temporal, causal) plus
//! cross-graph links, exposed as an MCP tool surface.

pub mod classifier;
pub mod cli;
pub mod config;
pub mod context;
pub mod di;
pub mod embedding;
pub mod error;
pub mod facades;
pub mod graph;
pub mod linearizer;
pub mod magma;
pub mod mcp;
pub mod merger;
pub mod migrations;
pub mod models;
pub mod seed;
pub mod synthesizer;

// Re-export FromRef at crate root for di-macros generated code
pub use di::FromRef;
