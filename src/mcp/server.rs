//! MCP server implementation.

use std::sync::Arc;

use rmcp::{
    handler::server::{router::tool::ToolRouter, ServerHandler},
    model::{Implementation, ProtocolVersion, ServerCapabilities, ServerInfo},
    tool_handler,
};

use crate::context::Context;
use crate::di::FromRef;

/// MAGMA MCP server: a multi-graph memory retrieval engine exposed as a
/// tool surface over semantic, entity, temporal, and causal graphs.
#[derive(Clone)]
pub struct McpServer {
    pub(crate) ctx: Arc<Context>,
    tool_router: ToolRouter<McpServer>,
}

impl McpServer {
    /// Create a new MAGMA MCP server with the given context.
    pub fn new(ctx: Context) -> Self {
        tracing::info!("Initializing MAGMA MCP server");

        Self {
            ctx: Arc::new(ctx),
            tool_router: Self::tool_router(),
        }
    }

    /// Build the combined tool router from all tool modules.
    fn tool_router() -> ToolRouter<Self> {
        Self::management_tools() + Self::write_tools() + Self::retrieval_tools()
    }

    /// Resolve a dependency from the context.
    ///
    /// This enables compile-time dependency injection for facades and
    /// other services that implement `FromRef<Context>`.
    pub fn resolve<T: FromRef<Context>>(&self) -> T {
        T::from_ref(&self.ctx)
    }

    /// Get direct access to the context.
    pub fn context(&self) -> &Context {
        &self.ctx
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                r#"MAGMA - Multi-graph memory retrieval engine

Four co-resident graphs back this server: Semantic (concepts, found by
vector similarity), Entity (named things and their relationships), Temporal
(events and time-bounded facts), and Causal (cause/effect chains). Typed
cross-links bridge them: a concept can represent an entity, an event can
involve an entity, a causal node can refer to an event or affect an entity.

## Writing

remember(content, context?) - store free-form content as a concept
add_concept(name, description?) - store a concept directly
add_entity(name, entity_type, properties?) - create an entity
link_entities(source, target, relationship) - relate two entities
add_event(description, occurred_at) - record a point-in-time event
add_fact(subject, predicate, object, valid_from, valid_to?, subject_entity?)
    - record a time-bounded fact, optionally linked to an entity
add_causal_link(cause, effect, confidence?, evidence?, entities?, events?)
    - record a cause/effect link, optionally cross-linked

## Retrieving

A typical query runs these stages in order, merging their results:

semantic_search(query, limit?, min_score?) - vector search over concepts
entity_lookup(entity_ids, depth?, include_properties?) - expand over E_RELATES
temporal_expand(entity_ids, from?, to?) - events linked to those entities
causal_expand(entity_ids, direction?, depth?) - cause/effect chains
subgraph_merge(views, multi_view_boost?, min_score?) - combine views, boosting
    nodes that multiple views agree on
linearize_context(subgraph, intent, max_tokens?) - turn a merged subgraph into
    token-budgeted text for one of: why, when, who, what, explore

## Managing

get_statistics() - node/relationship counts across all four graphs
clear_graph(graph) - wipe one graph (semantic, entity, temporal, causal) or all
"#
                .to_string(),
            ),
        }
    }
}
