//! MCP tool surface over the Ghost Admin API.
//!
//! Each capability group lives in its own module and contributes two tool
//! routers on [`GhostSvc`]: inspection tools and mutating tools. The
//! [`registry`] merges them according to the resolved selection.

pub mod images;
pub mod markdown;
pub mod pages;
pub mod posts;
pub mod registry;
pub mod tags;

use std::sync::Arc;

use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::ServerHandler;
use schemars::JsonSchema;
use serde::Deserialize;

use crate::clients::GhostClient;
use crate::core::GhostError;

pub const INSTRUCTIONS: &str = "MCP server for managing Ghost CMS content. \
Create, edit, delete posts and pages, manage tags, and upload images.";

/// Handler shared by every tool; holds the one Admin API client.
#[derive(Clone, Debug)]
pub struct GhostSvc {
    client: Arc<GhostClient>,
}

impl GhostSvc {
    pub fn new(client: Arc<GhostClient>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &GhostClient {
        &self.client
    }
}

impl ServerHandler for GhostSvc {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::default(),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(INSTRUCTIONS.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct IdArgs {
    /// Resource ID
    pub id: String,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct LookupArgs {
    /// Resource ID
    pub id: Option<String>,
    /// Resource slug
    pub slug: Option<String>,
}

pub(crate) const MISSING_LOOKUP: &str = "Error: provide either id or slug";
pub(crate) const INVALID_ID: &str = "Error: id and slug must not be empty, '.' or '..'";

impl LookupArgs {
    /// `<collection>/<id>/` or `<collection>/slug/<slug>/`; the id wins when
    /// both are given. The error is the text to hand back to the caller.
    pub(crate) fn path(&self, collection: &str) -> Result<String, &'static str> {
        match (non_empty(&self.id), non_empty(&self.slug)) {
            (Some(id), _) => resource_path(collection, id).ok_or(INVALID_ID),
            (None, Some(slug)) => {
                resource_path(&format!("{collection}/slug"), slug).ok_or(INVALID_ID)
            }
            (None, None) => Err(MISSING_LOOKUP),
        }
    }
}

/// `<collection>/<id>/`, or `None` when the id would not name a single
/// resource. URL normalization collapses `.` and `..` segments even when
/// percent-encoded, so those are refused rather than escaped.
pub(crate) fn resource_path(collection: &str, id: &str) -> Option<String> {
    if matches!(id, "" | "." | "..") {
        return None;
    }
    Some(format!("{collection}/{}/", segment(id)))
}

/// Percent-encode a caller-supplied path segment.
pub(crate) fn segment(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for b in raw.bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~') {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    out
}

/// Wrap a tool body's text summary as an MCP result. API failures become a
/// hard error for this call only.
pub(crate) fn text_result(out: Result<String, GhostError>) -> Result<CallToolResult, rmcp::ErrorData> {
    match out {
        Ok(text) => Ok(CallToolResult::success(vec![Content::text(text)])),
        Err(e) => {
            tracing::warn!(error = %e, "tool call failed");
            Err(e.into())
        }
    }
}

/// `"n/a"` for absent optional fields.
pub(crate) fn or_na(v: &Option<String>) -> &str {
    v.as_deref().unwrap_or("n/a")
}

pub(crate) fn or_empty(v: &Option<String>) -> &str {
    v.as_deref().unwrap_or("")
}

/// Treat `Some("")` like `None`, matching how agents often fill optional
/// string arguments.
pub(crate) fn non_empty(v: &Option<String>) -> Option<&str> {
    v.as_deref().filter(|s| !s.is_empty())
}

pub(crate) fn tag_refs(names: &[String]) -> serde_json::Value {
    serde_json::Value::Array(
        names
            .iter()
            .map(|n| serde_json::json!({ "name": n }))
            .collect(),
    )
}

/// Invalid status filter message, listing the valid values sorted.
pub(crate) fn invalid_status(status: &str, valid: &[&str]) -> String {
    let mut sorted = valid.to_vec();
    sorted.sort_unstable();
    format!(
        "Error: invalid status '{status}'. Must be one of: {}",
        sorted.join(", ")
    )
}
