use std::future::Future;

use rmcp::handler::server::tool::{Parameters, ToolRouter};
use rmcp::model::CallToolResult;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::markdown::markdown_to_html;
use super::{
    invalid_status, non_empty, or_empty, or_na, resource_path, tag_refs, text_result, GhostSvc, IdArgs,
    LookupArgs, INVALID_ID,
};
use crate::clients::ApiRequest;
use crate::core::GhostError;
use crate::domain::{first, items, pagination, Page};

pub const PAGE_STATUSES: [&str; 3] = ["all", "published", "draft"];
const LIST_FIELDS: &str = "id,title,slug,status,published_at,updated_at";
const MAX_LIMIT: u32 = 15;

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ListPagesArgs {
    /// Filter by status (all, published, draft)
    #[serde(default = "default_status")]
    pub status: String,
    /// Pages per page (max 15)
    #[serde(default = "default_limit")]
    pub limit: u32,
    /// Page number
    #[serde(default = "default_page")]
    pub page: u32,
}

fn default_status() -> String {
    "all".to_string()
}
fn default_limit() -> u32 {
    MAX_LIMIT
}
fn default_page() -> u32 {
    1
}
fn default_draft() -> String {
    "draft".to_string()
}

impl Default for ListPagesArgs {
    fn default() -> Self {
        Self {
            status: default_status(),
            limit: default_limit(),
            page: default_page(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CreatePageArgs {
    /// Page title
    pub title: String,
    /// Content in Markdown format
    pub markdown_content: String,
    /// Status (draft, published)
    #[serde(default = "default_draft")]
    pub status: String,
    /// List of tag names
    pub tags: Option<Vec<String>>,
    /// URL slug
    pub slug: Option<String>,
    /// SEO title (recommended ~60 characters)
    pub meta_title: Option<String>,
    /// SEO description (recommended ~145 characters)
    pub meta_description: Option<String>,
}

impl Default for CreatePageArgs {
    fn default() -> Self {
        Self {
            title: String::new(),
            markdown_content: String::new(),
            status: default_draft(),
            tags: None,
            slug: None,
            meta_title: None,
            meta_description: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct UpdatePageArgs {
    /// Page ID (required)
    pub id: String,
    /// New title
    pub title: Option<String>,
    /// New content in Markdown
    pub markdown_content: Option<String>,
    /// New tags (an empty list clears them)
    pub tags: Option<Vec<String>>,
    /// New slug
    pub slug: Option<String>,
    /// New SEO title
    pub meta_title: Option<String>,
    /// New SEO description
    pub meta_description: Option<String>,
}

#[rmcp::tool_router(router = pages_read_router)]
impl GhostSvc {
    #[rmcp::tool(description = "List Ghost pages, optionally filtered by status.")]
    async fn ghost_list_pages(
        &self,
        Parameters(args): Parameters<ListPagesArgs>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        text_result(self.list_pages(args).await)
    }

    #[rmcp::tool(description = "Get a page by ID or slug, including its HTML content.")]
    async fn ghost_get_page(
        &self,
        Parameters(args): Parameters<LookupArgs>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        text_result(self.get_page(args).await)
    }
}

#[rmcp::tool_router(router = pages_write_router)]
impl GhostSvc {
    #[rmcp::tool(description = "Create a new Ghost page from Markdown.")]
    async fn ghost_create_page(
        &self,
        Parameters(args): Parameters<CreatePageArgs>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        text_result(self.create_page(args).await)
    }

    #[rmcp::tool(description = "Update a page. Only the given fields change.")]
    async fn ghost_update_page(
        &self,
        Parameters(args): Parameters<UpdatePageArgs>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        text_result(self.update_page(args).await)
    }

    #[rmcp::tool(description = "Delete a page by ID.")]
    async fn ghost_delete_page(
        &self,
        Parameters(args): Parameters<IdArgs>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        text_result(self.delete_page(args).await)
    }
}

impl GhostSvc {
    pub fn pages_read_tools() -> ToolRouter<GhostSvc> {
        Self::pages_read_router()
    }

    pub fn pages_write_tools() -> ToolRouter<GhostSvc> {
        Self::pages_write_router()
    }

    pub async fn list_pages(&self, args: ListPagesArgs) -> Result<String, GhostError> {
        if !PAGE_STATUSES.contains(&args.status.as_str()) {
            return Ok(invalid_status(&args.status, &PAGE_STATUSES));
        }
        let mut req = ApiRequest::get("pages/")
            .query("limit", args.limit.min(MAX_LIMIT))
            .query("page", args.page)
            .query("include", "tags")
            .query("fields", LIST_FIELDS);
        if args.status != "all" {
            req = req.query("filter", format!("status:{}", args.status));
        }
        let body = self.client().send(req).await?;
        let pages: Vec<Page> = items(&body, "pages")?;
        let total = pagination(&body).total.unwrap_or(pages.len() as u64);

        let mut lines = vec![format!("Found pages: {total}")];
        for p in &pages {
            lines.push(format!("\n- [{}] {}", or_empty(&p.status), or_empty(&p.title)));
            lines.push(format!("  ID: {} | Slug: {}", or_empty(&p.id), or_empty(&p.slug)));
        }
        Ok(lines.join("\n"))
    }

    pub async fn get_page(&self, args: LookupArgs) -> Result<String, GhostError> {
        let path = match args.path("pages") {
            Ok(path) => path,
            Err(msg) => return Ok(msg.to_string()),
        };
        let req = ApiRequest::get(path)
            .query("include", "tags")
            .query("formats", "html");
        let page: Page = first(&self.client().send(req).await?, "pages")?;

        let mut lines = vec![
            format!("Title: {}", or_empty(&page.title)),
            format!("ID: {}", or_empty(&page.id)),
            format!("Slug: {}", or_empty(&page.slug)),
            format!("Status: {}", or_empty(&page.status)),
            format!("URL: {}", or_na(&page.url)),
        ];
        if let Some(html) = non_empty(&page.html) {
            lines.push(format!("\nHTML content:\n{html}"));
        }
        Ok(lines.join("\n"))
    }

    pub async fn create_page(&self, args: CreatePageArgs) -> Result<String, GhostError> {
        let mut data = Map::new();
        data.insert("title".into(), json!(args.title));
        data.insert("html".into(), json!(markdown_to_html(&args.markdown_content)));
        data.insert("status".into(), json!(args.status));
        if let Some(tags) = args.tags.as_deref().filter(|t| !t.is_empty()) {
            data.insert("tags".into(), tag_refs(tags));
        }
        for (field, value) in [
            ("slug", &args.slug),
            ("meta_title", &args.meta_title),
            ("meta_description", &args.meta_description),
        ] {
            if let Some(v) = non_empty(value) {
                data.insert(field.into(), json!(v));
            }
        }

        let req = ApiRequest::post("pages/")
            .query("source", "html")
            .json(json!({ "pages": [Value::Object(data)] }));
        let page: Page = first(&self.client().send(req).await?, "pages")?;
        tracing::info!(id = or_empty(&page.id), "page created");
        Ok(format!(
            "Page created!\nID: {}\nSlug: {}\nStatus: {}",
            or_empty(&page.id),
            or_empty(&page.slug),
            or_empty(&page.status)
        ))
    }

    pub async fn update_page(&self, args: UpdatePageArgs) -> Result<String, GhostError> {
        let Some(path) = resource_path("pages", &args.id) else {
            return Ok(INVALID_ID.to_string());
        };
        let current: Page = first(&self.client().get(&path, &[]).await?, "pages")?;
        let updated_at = current
            .updated_at
            .ok_or_else(|| GhostError::Decode("current page has no updated_at".into()))?;

        let mut data = Map::new();
        data.insert("updated_at".into(), json!(updated_at));
        if let Some(title) = non_empty(&args.title) {
            data.insert("title".into(), json!(title));
        }
        let content = non_empty(&args.markdown_content);
        if let Some(md) = content {
            data.insert("html".into(), json!(markdown_to_html(md)));
        }
        if let Some(tags) = &args.tags {
            data.insert("tags".into(), tag_refs(tags));
        }
        if let Some(slug) = non_empty(&args.slug) {
            data.insert("slug".into(), json!(slug));
        }
        if let Some(v) = &args.meta_title {
            data.insert("meta_title".into(), json!(v));
        }
        if let Some(v) = &args.meta_description {
            data.insert("meta_description".into(), json!(v));
        }

        let mut req = ApiRequest::put(path).json(json!({ "pages": [Value::Object(data)] }));
        if content.is_some() {
            req = req.query("source", "html");
        }
        let page: Page = first(&self.client().send(req).await?, "pages")?;
        Ok(format!(
            "Page updated!\nID: {}\nTitle: {}",
            or_empty(&page.id),
            or_empty(&page.title)
        ))
    }

    pub async fn delete_page(&self, args: IdArgs) -> Result<String, GhostError> {
        let Some(path) = resource_path("pages", &args.id) else {
            return Ok(INVALID_ID.to_string());
        };
        self.client().delete(&path).await?;
        Ok(format!("Page {} deleted.", args.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::{path, svc};
    use httpmock::prelude::*;

    #[tokio::test]
    async fn list_pages_formats_summary() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(GET)
                .path(path("pages/"))
                .query_param("include", "tags")
                .query_param("fields", LIST_FIELDS);
            then.status(200).json_body(json!({
                "pages": [{"id": "pg1", "title": "About", "slug": "about", "status": "published"}],
                "meta": {"pagination": {"total": 1}}
            }));
        });

        let out = svc(&server.base_url())
            .list_pages(ListPagesArgs::default())
            .await
            .unwrap();
        m.assert();
        assert_eq!(
            out,
            "Found pages: 1\n\n- [published] About\n  ID: pg1 | Slug: about"
        );
    }

    #[tokio::test]
    async fn list_pages_filters_by_status() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(GET)
                .path(path("pages/"))
                .query_param("filter", "status:draft");
            then.status(200).json_body(json!({"pages": []}));
        });
        let out = svc(&server.base_url())
            .list_pages(ListPagesArgs {
                status: "draft".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        m.assert();
        assert_eq!(out, "Found pages: 0");
    }

    #[tokio::test]
    async fn list_pages_rejects_scheduled() {
        let out = svc("http://127.0.0.1:9")
            .list_pages(ListPagesArgs {
                status: "scheduled".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(
            out,
            "Error: invalid status 'scheduled'. Must be one of: all, draft, published"
        );
    }

    #[tokio::test]
    async fn get_page_by_slug() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET)
                .path(path("pages/slug/about/"))
                .query_param("formats", "html");
            then.status(200).json_body(json!({"pages": [{
                "id": "pg1", "title": "About", "slug": "about", "status": "published",
                "url": "http://test.ghost.io/about/", "html": "<p>About us</p>"
            }]}));
        });
        let out = svc(&server.base_url())
            .get_page(LookupArgs {
                id: None,
                slug: Some("about".into()),
            })
            .await
            .unwrap();
        assert_eq!(
            out,
            "Title: About\nID: pg1\nSlug: about\nStatus: published\nURL: http://test.ghost.io/about/\n\nHTML content:\n<p>About us</p>"
        );
    }

    #[tokio::test]
    async fn get_page_requires_id_or_slug() {
        let out = svc("http://127.0.0.1:9")
            .get_page(LookupArgs::default())
            .await
            .unwrap();
        assert_eq!(out, "Error: provide either id or slug");
    }

    #[tokio::test]
    async fn dot_ids_never_reach_the_api() {
        let server = MockServer::start();
        let any = server.mock(|when, then| {
            when.any_request();
            then.status(204);
        });
        let svc = svc(&server.base_url());
        let out = svc
            .get_page(LookupArgs {
                id: Some(".".into()),
                slug: None,
            })
            .await
            .unwrap();
        assert_eq!(out, INVALID_ID);
        let out = svc.delete_page(IdArgs { id: "..".into() }).await.unwrap();
        assert_eq!(out, INVALID_ID);
        let out = svc
            .update_page(UpdatePageArgs {
                id: String::new(),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(out, INVALID_ID);
        assert_eq!(any.hits(), 0);
    }

    #[tokio::test]
    async fn create_page_posts_html() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(POST)
                .path(path("pages/"))
                .query_param("source", "html")
                .json_body_partial(r#"{"pages":[{"title":"Contact","status":"draft","slug":"contact"}]}"#)
                .body_contains("<p>Write to us</p>");
            then.status(201).json_body(json!({"pages": [{
                "id": "pg2", "slug": "contact", "status": "draft"
            }]}));
        });
        let out = svc(&server.base_url())
            .create_page(CreatePageArgs {
                title: "Contact".into(),
                markdown_content: "Write to us".into(),
                slug: Some("contact".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        m.assert();
        assert_eq!(out, "Page created!\nID: pg2\nSlug: contact\nStatus: draft");
    }

    #[tokio::test]
    async fn update_page_sends_updated_at() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path(path("pages/pg1/"));
            then.status(200).json_body(json!({"pages": [{
                "id": "pg1", "updated_at": "2024-03-01T00:00:00.000Z"
            }]}));
        });
        let put = server.mock(|when, then| {
            when.method(PUT)
                .path(path("pages/pg1/"))
                .query_param("source", "html")
                .json_body_partial(r#"{"pages":[{"updated_at":"2024-03-01T00:00:00.000Z","tags":[]}]}"#);
            then.status(200).json_body(json!({"pages": [{"id": "pg1", "title": "About"}]}));
        });
        let out = svc(&server.base_url())
            .update_page(UpdatePageArgs {
                id: "pg1".into(),
                markdown_content: Some("New text".into()),
                tags: Some(vec![]),
                ..Default::default()
            })
            .await
            .unwrap();
        put.assert();
        assert_eq!(out, "Page updated!\nID: pg1\nTitle: About");
    }

    #[tokio::test]
    async fn delete_page_reports_id() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(DELETE).path(path("pages/pg1/"));
            then.status(204);
        });
        let out = svc(&server.base_url())
            .delete_page(IdArgs { id: "pg1".into() })
            .await
            .unwrap();
        m.assert();
        assert_eq!(out, "Page pg1 deleted.");
    }
}
