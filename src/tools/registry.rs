//! Binds capability groups to their tool routers.

use std::sync::Arc;

use rmcp::handler::server::tool::ToolRouter;

use super::GhostSvc;
use crate::clients::GhostClient;
use crate::domain::{CapabilityGroup, ToolSelection};

/// Inspection and mutating routers contributed by one group.
pub fn group_routers(group: CapabilityGroup) -> (ToolRouter<GhostSvc>, ToolRouter<GhostSvc>) {
    match group {
        CapabilityGroup::Posts => (GhostSvc::posts_read_tools(), GhostSvc::posts_write_tools()),
        CapabilityGroup::Pages => (GhostSvc::pages_read_tools(), GhostSvc::pages_write_tools()),
        CapabilityGroup::Tags => (GhostSvc::tags_read_tools(), GhostSvc::tags_write_tools()),
        CapabilityGroup::Images => (GhostSvc::images_read_tools(), GhostSvc::images_write_tools()),
    }
}

/// Merge the routers of every selected group. Mutating tools are left out
/// entirely in read-only mode, so clients never see them in `tools/list`.
pub fn build_tool_router(selection: &ToolSelection) -> ToolRouter<GhostSvc> {
    let mut router = ToolRouter::new();
    for &group in selection.groups() {
        let (read, write) = group_routers(group);
        router.merge(read);
        if !selection.read_only {
            router.merge(write);
        }
    }
    router
}

/// Names of the tools a selection exposes, in registration order.
pub fn tool_names(selection: &ToolSelection) -> Vec<String> {
    build_tool_router(selection)
        .into_iter()
        .map(|r| r.name().to_string())
        .collect()
}

/// Factory required by the rmcp stdio and Streamable HTTP transports: each
/// call yields a `(handler, ToolRouter<handler>)` pair over the one shared
/// client.
pub fn factory(
    client: Arc<GhostClient>,
    selection: ToolSelection,
) -> impl Fn() -> (GhostSvc, ToolRouter<GhostSvc>) + Clone + Send + Sync + 'static {
    move || {
        let handler = GhostSvc::new(client.clone());
        let tools = build_tool_router(&selection);
        (handler, tools)
    }
}
