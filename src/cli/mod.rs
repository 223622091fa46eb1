//! CLI module for MAGMA.
//!
//! Subcommands:
//! - `init`: Initialize the database schema
//! - `mcp`: Run the MCP server (stdio transport)
//! - `serve`: Run the MCP server (HTTP transport)
//! - `embedding`: Embedding model management

mod embedding;
mod init;
mod mcp;
mod serve;

use clap::{Parser, Subcommand};

pub use embedding::EmbeddingCommand;

/// MAGMA - multi-graph memory retrieval engine
#[derive(Parser)]
#[command(name = "magma")]
#[command(about = "Multi-graph memory retrieval engine - MCP server over semantic/entity/temporal/causal graphs")]
#[command(version)]
pub struct App {
    /// Run in verbose mode
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Initialize the database schema and seed data
    Init,

    /// Run the MCP server (stdio transport for local use)
    Mcp,

    /// Run the MCP server (HTTP transport for remote access)
    Serve {
        /// Host address to bind to
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Port to listen on
        #[arg(long, default_value = "3000")]
        port: u16,
    },

    /// Embedding model management
    Embedding {
        #[command(subcommand)]
        command: EmbeddingCommand,
    },
}

impl App {
    /// Run the CLI application.
    pub async fn run(self) -> color_eyre::Result<()> {
        match self.command {
            Command::Init => self.run_init().await,
            Command::Mcp => self.run_mcp().await,
            Command::Serve { ref host, port } => self.run_serve(host, port).await,
            Command::Embedding { command } => command.run(),
        }
    }
}
