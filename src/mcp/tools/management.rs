//! Management tools: statistics and bulk reset.

use rmcp::{
    handler::server::wrapper::Parameters,
    model::CallToolResult,
    schemars::{self, JsonSchema},
    tool, tool_router, ErrorData as McpError,
};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::graph::storage::{self, GraphScope, GraphStatistics};
use crate::mcp::protocol::Response;
use crate::mcp::server::McpServer;
use crate::mcp::validation::{schema_error, FieldError};

/// Parameters for `clear_graph`.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ClearGraphParams {
    /// Which graph to clear: "semantic", "entity", "temporal", "causal", or "all".
    pub graph: String,
}

/// Result of `get_statistics`.
#[derive(Debug, Serialize)]
pub struct StatisticsResult {
    pub semantic_nodes: i64,
    pub entity_nodes: i64,
    pub temporal_nodes: i64,
    pub causal_nodes: i64,
    pub total_relationships: i64,
}

impl From<GraphStatistics> for StatisticsResult {
    fn from(s: GraphStatistics) -> Self {
        Self {
            semantic_nodes: s.semantic_nodes,
            entity_nodes: s.entity_nodes,
            temporal_nodes: s.temporal_nodes,
            causal_nodes: s.causal_nodes,
            total_relationships: s.total_relationships,
        }
    }
}

/// Result of `clear_graph`.
#[derive(Debug, Serialize)]
pub struct ClearGraphResult {
    pub cleared: String,
}

#[tool_router(router = management_tools, vis = "pub(crate)")]
impl McpServer {
    /// Counts nodes per graph and relationships overall.
    #[tool(description = "Get node counts for each of the four graphs and the total relationship count.")]
    pub async fn get_statistics(&self) -> Result<CallToolResult, McpError> {
        let stats = storage::get_statistics(self.ctx.graph.as_ref())
            .await
            .map_err(|e: AppError| McpError::from(e))?;

        Response(StatisticsResult::from(stats), None).into()
    }

    /// Detaches and deletes every node under the requested graph's labels.
    #[tool(
        description = "Clear all nodes (and their edges) from one graph or all graphs. graph must be one of: semantic, entity, temporal, causal, all."
    )]
    pub async fn clear_graph(
        &self,
        Parameters(params): Parameters<ClearGraphParams>,
    ) -> Result<CallToolResult, McpError> {
        let scope: GraphScope = match params.graph.parse() {
            Ok(scope) => scope,
            Err(_) => {
                return Ok(schema_error(vec![FieldError::new(
                    "graph",
                    "must be one of: semantic, entity, temporal, causal, all",
                )]))
            }
        };

        storage::clear_graph(self.ctx.graph.as_ref(), scope)
            .await
            .map_err(|e: AppError| McpError::from(e))?;

        Response(
            ClearGraphResult {
                cleared: params.graph,
            },
            None,
        )
        .into()
    }
}
