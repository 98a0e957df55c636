//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use std::sync::Arc;

use crate::state::AppState;
use crate::tools::{
    CachePurgeParams, FavoriteAddParams, FavoriteListParams, FavoriteRemoveParams, FavoriteUpdateNotesParams,
    HighlightsSampleParams, HistorySampleParams, MovementSampleParams, add_impl, highlights_impl, history_impl,
    list_favorites_impl, list_impl, purge_impl, remove_impl, sample_impl, update_notes_impl,
};

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// The main MCP server handler for curio.
#[derive(Clone)]
pub struct CurioServer {
    state: Arc<AppState>,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl CurioServer {
    /// Create a new server handler.
    pub fn new(state: AppState) -> Self {
        Self { state: Arc::new(state), tool_router: Self::tool_router() }
    }

    #[tool(description = "List the art movements that can be sampled, with their departments and the default key.")]
    async fn movement_list(&self) -> Result<CallToolResult, McpError> {
        list_impl(&self.state.catalog)
    }

    /// Sample a movement.
    ///
    /// Serves from the cache when a live entry exists; otherwise walks the
    /// movement's departments, falls back to search, and caches the result.
    #[tool(
        description = "Get a curated sample of displayable artworks for an art movement. Unknown movements fall back to the default. Cached for an hour; set force_refresh to re-sample."
    )]
    async fn movement_sample(&self, params: Parameters<MovementSampleParams>) -> Result<CallToolResult, McpError> {
        sample_impl(&self.state, params.0).await
    }

    #[tool(description = "Get a small cached reel of highlight artworks from a single department.")]
    async fn highlights_sample(&self, params: Parameters<HighlightsSampleParams>) -> Result<CallToolResult, McpError> {
        highlights_impl(&self.state, params.0).await
    }

    #[tool(description = "Get a cached reel of ancient artworks drawn from a collection search.")]
    async fn history_sample(&self, params: Parameters<HistorySampleParams>) -> Result<CallToolResult, McpError> {
        history_impl(&self.state, params.0).await
    }

    #[tool(description = "Purge sample cache entries: all expired entries, and/or the entry for one movement.")]
    async fn cache_purge(&self, params: Parameters<CachePurgeParams>) -> Result<CallToolResult, McpError> {
        purge_impl(&self.state, params.0).await
    }

    #[tool(description = "Save an artwork to a user's favorites. Reports when it is already saved.")]
    async fn favorite_add(&self, params: Parameters<FavoriteAddParams>) -> Result<CallToolResult, McpError> {
        add_impl(&self.state, params.0).await
    }

    #[tool(description = "List a user's favorite artworks, oldest first.")]
    async fn favorite_list(&self, params: Parameters<FavoriteListParams>) -> Result<CallToolResult, McpError> {
        list_favorites_impl(&self.state, params.0).await
    }

    #[tool(description = "Replace the notes on one of the user's favorites (max 1000 characters).")]
    async fn favorite_update_notes(
        &self, params: Parameters<FavoriteUpdateNotesParams>,
    ) -> Result<CallToolResult, McpError> {
        update_notes_impl(&self.state, params.0).await
    }

    #[tool(description = "Remove one of the user's favorites.")]
    async fn favorite_remove(&self, params: Parameters<FavoriteRemoveParams>) -> Result<CallToolResult, McpError> {
        remove_impl(&self.state, params.0).await
    }
}

impl ServerHandler for CurioServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "curio".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(
                "Curated artwork samples from The Met Collection. Call movement_list first, then movement_sample."
                    .into(),
            ),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
