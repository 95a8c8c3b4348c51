use std::sync::Arc;

use axum::{
    routing::{any_service, get},
    Router,
};
use rmcp::handler::server::tool::ToolRouter;

use crate::infra::runtime::mcp_transport::{make_streamable_http_service, LocalSessionManager};
use crate::tools::GhostSvc;

/// `/healthz` plus the Streamable HTTP MCP endpoint at `/mcp`.
pub fn build_app(
    factory: impl Fn() -> (GhostSvc, ToolRouter<GhostSvc>) + Send + Sync + Clone + 'static,
) -> Router {
    let session_mgr = Arc::new(LocalSessionManager::default());
    let mcp_service = make_streamable_http_service(factory, session_mgr);

    Router::new()
        .route("/healthz", get(|| async { "ok" }))
        .route_service("/mcp", any_service(mcp_service))
}
