use std::future::Future;

use rmcp::handler::server::tool::{Parameters, ToolRouter};
use rmcp::model::CallToolResult;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::{non_empty, or_empty, resource_path, text_result, GhostSvc, IdArgs, INVALID_ID};
use crate::core::GhostError;
use crate::domain::{first, items, Tag};

const MAX_LIMIT: u32 = 50;

fn default_limit() -> u32 {
    MAX_LIMIT
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ListTagsArgs {
    /// Maximum number of tags to return (max 50)
    #[serde(default = "default_limit")]
    pub limit: u32,
}

impl Default for ListTagsArgs {
    fn default() -> Self {
        Self {
            limit: default_limit(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct CreateTagArgs {
    /// Tag name
    pub name: String,
    /// Tag description
    pub description: Option<String>,
    /// URL slug
    pub slug: Option<String>,
}

#[rmcp::tool_router(router = tags_read_router)]
impl GhostSvc {
    #[rmcp::tool(description = "List tags with their post counts.")]
    async fn ghost_list_tags(
        &self,
        Parameters(args): Parameters<ListTagsArgs>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        text_result(self.list_tags(args).await)
    }
}

#[rmcp::tool_router(router = tags_write_router)]
impl GhostSvc {
    #[rmcp::tool(description = "Create a new tag.")]
    async fn ghost_create_tag(
        &self,
        Parameters(args): Parameters<CreateTagArgs>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        text_result(self.create_tag(args).await)
    }

    #[rmcp::tool(description = "Delete a tag by ID.")]
    async fn ghost_delete_tag(
        &self,
        Parameters(args): Parameters<IdArgs>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        text_result(self.delete_tag(args).await)
    }
}

impl GhostSvc {
    pub fn tags_read_tools() -> ToolRouter<GhostSvc> {
        Self::tags_read_router()
    }

    pub fn tags_write_tools() -> ToolRouter<GhostSvc> {
        Self::tags_write_router()
    }

    pub async fn list_tags(&self, args: ListTagsArgs) -> Result<String, GhostError> {
        let query = [
            ("limit", args.limit.min(MAX_LIMIT).to_string()),
            ("include", "count.posts".to_string()),
        ];
        let body = self.client().get("tags/", &query).await?;
        let tags: Vec<Tag> = items(&body, "tags")?;

        let mut lines = vec![format!("Found tags: {}", tags.len())];
        lines.extend(tags.iter().map(|t| {
            format!(
                "- {} (slug: {}, posts: {}, id: {})",
                or_empty(&t.name),
                or_empty(&t.slug),
                t.count.as_ref().and_then(|c| c.posts).unwrap_or(0),
                or_empty(&t.id)
            )
        }));
        Ok(lines.join("\n"))
    }

    pub async fn create_tag(&self, args: CreateTagArgs) -> Result<String, GhostError> {
        let mut data = Map::new();
        data.insert("name".into(), json!(args.name));
        if let Some(d) = non_empty(&args.description) {
            data.insert("description".into(), json!(d));
        }
        if let Some(s) = non_empty(&args.slug) {
            data.insert("slug".into(), json!(s));
        }

        let body = json!({ "tags": [Value::Object(data)] });
        let tag: Tag = first(&self.client().post("tags/", body).await?, "tags")?;
        Ok(format!(
            "Tag created!\nID: {}\nName: {}\nSlug: {}",
            or_empty(&tag.id),
            or_empty(&tag.name),
            or_empty(&tag.slug)
        ))
    }

    pub async fn delete_tag(&self, args: IdArgs) -> Result<String, GhostError> {
        let Some(path) = resource_path("tags", &args.id) else {
            return Ok(INVALID_ID.to_string());
        };
        self.client().delete(&path).await?;
        Ok(format!("Tag {} deleted.", args.id))
    }
}
