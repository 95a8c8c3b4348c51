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
use crate::domain::{first, items, pagination, Post};

pub const POST_STATUSES: [&str; 4] = ["all", "published", "draft", "scheduled"];
const LIST_FIELDS: &str = "id,title,slug,status,published_at,updated_at,excerpt";
const MAX_LIMIT: u32 = 15;
const INVALID_TAG: &str =
    "Error: invalid tag slug. Only alphanumeric, hyphens and underscores allowed.";

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

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ListPostsArgs {
    /// Filter by status (all, published, draft, scheduled)
    #[serde(default = "default_status")]
    pub status: String,
    /// Filter by tag slug
    pub tag: Option<String>,
    /// Posts per page (max 15)
    #[serde(default = "default_limit")]
    pub limit: u32,
    /// Page number
    #[serde(default = "default_page")]
    pub page: u32,
}

impl Default for ListPostsArgs {
    fn default() -> Self {
        Self {
            status: default_status(),
            tag: None,
            limit: default_limit(),
            page: default_page(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CreatePostArgs {
    /// Post title
    pub title: String,
    /// Content in Markdown format
    pub markdown_content: String,
    /// Status (draft, published)
    #[serde(default = "default_draft")]
    pub status: String,
    /// List of tag names
    pub tags: Option<Vec<String>>,
    /// Short description
    pub excerpt: Option<String>,
    /// URL slug
    pub slug: Option<String>,
    /// SEO title (recommended ~60 characters)
    pub meta_title: Option<String>,
    /// SEO description (recommended ~145 characters)
    pub meta_description: Option<String>,
    /// Cover image URL
    pub featured_image_url: Option<String>,
}

impl Default for CreatePostArgs {
    fn default() -> Self {
        Self {
            title: String::new(),
            markdown_content: String::new(),
            status: default_draft(),
            tags: None,
            excerpt: None,
            slug: None,
            meta_title: None,
            meta_description: None,
            featured_image_url: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct UpdatePostArgs {
    /// Post ID (required)
    pub id: String,
    /// New title
    pub title: Option<String>,
    /// New content in Markdown
    pub markdown_content: Option<String>,
    /// New tags (an empty list clears them)
    pub tags: Option<Vec<String>>,
    /// New excerpt
    pub excerpt: Option<String>,
    /// New slug
    pub slug: Option<String>,
    /// New SEO title (recommended ~60 characters)
    pub meta_title: Option<String>,
    /// New SEO description (recommended ~145 characters)
    pub meta_description: Option<String>,
    /// New cover image URL
    pub featured_image_url: Option<String>,
}

fn is_tag_slug(s: &str) -> bool {
    !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[rmcp::tool_router(router = posts_read_router)]
impl GhostSvc {
    #[rmcp::tool(description = "List Ghost posts, optionally filtered by status and tag slug.")]
    async fn ghost_list_posts(
        &self,
        Parameters(args): Parameters<ListPostsArgs>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        text_result(self.list_posts(args).await)
    }

    #[rmcp::tool(description = "Get a post by ID or slug, including its HTML content.")]
    async fn ghost_get_post(
        &self,
        Parameters(args): Parameters<LookupArgs>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        text_result(self.get_post(args).await)
    }
}

#[rmcp::tool_router(router = posts_write_router)]
impl GhostSvc {
    #[rmcp::tool(description = "Create a new Ghost post from Markdown.")]
    async fn ghost_create_post(
        &self,
        Parameters(args): Parameters<CreatePostArgs>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        text_result(self.create_post(args).await)
    }

    #[rmcp::tool(description = "Update an existing post. Only the given fields change.")]
    async fn ghost_update_post(
        &self,
        Parameters(args): Parameters<UpdatePostArgs>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        text_result(self.update_post(args).await)
    }

    #[rmcp::tool(description = "Delete a post by ID.")]
    async fn ghost_delete_post(
        &self,
        Parameters(args): Parameters<IdArgs>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        text_result(self.delete_post(args).await)
    }

    #[rmcp::tool(description = "Publish a draft post.")]
    async fn ghost_publish_post(
        &self,
        Parameters(args): Parameters<IdArgs>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        text_result(self.set_post_status(args, "published").await)
    }

    #[rmcp::tool(description = "Unpublish a post (revert to draft).")]
    async fn ghost_unpublish_post(
        &self,
        Parameters(args): Parameters<IdArgs>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        text_result(self.set_post_status(args, "draft").await)
    }
}

impl GhostSvc {
    pub fn posts_read_tools() -> ToolRouter<GhostSvc> {
        Self::posts_read_router()
    }

    pub fn posts_write_tools() -> ToolRouter<GhostSvc> {
        Self::posts_write_router()
    }

    pub async fn list_posts(&self, args: ListPostsArgs) -> Result<String, GhostError> {
        if !POST_STATUSES.contains(&args.status.as_str()) {
            return Ok(invalid_status(&args.status, &POST_STATUSES));
        }
        let mut filters = Vec::new();
        if args.status != "all" {
            filters.push(format!("status:{}", args.status));
        }
        if let Some(tag) = non_empty(&args.tag) {
            if !is_tag_slug(tag) {
                return Ok(INVALID_TAG.to_string());
            }
            filters.push(format!("tag:{tag}"));
        }

        let mut req = ApiRequest::get("posts/")
            .query("limit", args.limit.min(MAX_LIMIT))
            .query("page", args.page)
            .query("include", "tags,authors")
            .query("fields", LIST_FIELDS);
        if !filters.is_empty() {
            req = req.query("filter", filters.join("+"));
        }
        let body = self.client().send(req).await?;
        let posts: Vec<Post> = items(&body, "posts")?;
        let meta = pagination(&body);

        let mut lines = vec![format!(
            "Found posts: {} (page {}/{})",
            meta.total.unwrap_or(posts.len() as u64),
            meta.page.unwrap_or(1),
            meta.pages.unwrap_or(1)
        )];
        for p in &posts {
            lines.push(format!("\n- [{}] {}", or_empty(&p.status), or_empty(&p.title)));
            lines.push(format!("  ID: {} | Slug: {}", or_empty(&p.id), or_empty(&p.slug)));
            let tags = join_names(&p.tags);
            if !tags.is_empty() {
                lines.push(format!("  Tags: {tags}"));
            }
            if let Some(published) = non_empty(&p.published_at) {
                lines.push(format!("  Published: {published}"));
            }
        }
        Ok(lines.join("\n"))
    }

    pub async fn get_post(&self, args: LookupArgs) -> Result<String, GhostError> {
        let path = match args.path("posts") {
            Ok(path) => path,
            Err(msg) => return Ok(msg.to_string()),
        };
        let req = ApiRequest::get(path)
            .query("include", "tags,authors")
            .query("formats", "html,lexical");
        let post: Post = first(&self.client().send(req).await?, "posts")?;

        let tags = join_names(&post.tags);
        let authors = join_names(&post.authors);
        let excerpt = non_empty(&post.custom_excerpt)
            .or(post.excerpt.as_deref())
            .unwrap_or("n/a");
        let mut lines = vec![
            format!("Title: {}", or_empty(&post.title)),
            format!("ID: {}", or_empty(&post.id)),
            format!("Slug: {}", or_empty(&post.slug)),
            format!("Status: {}", or_empty(&post.status)),
            format!("Tags: {}", if tags.is_empty() { "n/a" } else { tags.as_str() }),
            format!("Authors: {}", if authors.is_empty() { "n/a" } else { authors.as_str() }),
            format!("Excerpt: {excerpt}"),
            format!("URL: {}", or_na(&post.url)),
            format!("Published: {}", or_na(&post.published_at)),
            format!("Updated: {}", or_na(&post.updated_at)),
        ];
        if let Some(html) = non_empty(&post.html) {
            lines.push(format!("\nHTML content:\n{html}"));
        }
        Ok(lines.join("\n"))
    }

    pub async fn create_post(&self, args: CreatePostArgs) -> Result<String, GhostError> {
        let mut data = Map::new();
        data.insert("title".into(), json!(args.title));
        data.insert("html".into(), json!(markdown_to_html(&args.markdown_content)));
        data.insert("status".into(), json!(args.status));
        if let Some(tags) = args.tags.as_deref().filter(|t| !t.is_empty()) {
            data.insert("tags".into(), tag_refs(tags));
        }
        let optional = [
            ("custom_excerpt", &args.excerpt),
            ("slug", &args.slug),
            ("meta_title", &args.meta_title),
            ("meta_description", &args.meta_description),
            ("feature_image", &args.featured_image_url),
        ];
        for (field, value) in optional {
            if let Some(v) = non_empty(value) {
                data.insert(field.into(), json!(v));
            }
        }

        let req = ApiRequest::post("posts/")
            .query("source", "html")
            .json(json!({ "posts": [Value::Object(data)] }));
        let post: Post = first(&self.client().send(req).await?, "posts")?;
        tracing::info!(id = or_empty(&post.id), "post created");
        Ok(format!(
            "Post created!\nID: {}\nSlug: {}\nStatus: {}\nURL: {}",
            or_empty(&post.id),
            or_empty(&post.slug),
            or_empty(&post.status),
            or_na(&post.url)
        ))
    }

    pub async fn update_post(&self, args: UpdatePostArgs) -> Result<String, GhostError> {
        let Some(path) = resource_path("posts", &args.id) else {
            return Ok(INVALID_ID.to_string());
        };
        let current = self.current_post(&path).await?;

        let mut data = Map::new();
        data.insert("updated_at".into(), json!(updated_at(&current)?));
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
        if let Some(excerpt) = &args.excerpt {
            data.insert("custom_excerpt".into(), json!(excerpt));
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
        if let Some(v) = &args.featured_image_url {
            data.insert("feature_image".into(), json!(v));
        }

        let mut req = ApiRequest::put(path).json(json!({ "posts": [Value::Object(data)] }));
        if content.is_some() {
            req = req.query("source", "html");
        }
        let post: Post = first(&self.client().send(req).await?, "posts")?;
        Ok(format!(
            "Post updated!\nID: {}\nTitle: {}\nStatus: {}",
            or_empty(&post.id),
            or_empty(&post.title),
            or_empty(&post.status)
        ))
    }

    pub async fn delete_post(&self, args: IdArgs) -> Result<String, GhostError> {
        let Some(path) = resource_path("posts", &args.id) else {
            return Ok(INVALID_ID.to_string());
        };
        self.client().delete(&path).await?;
        Ok(format!("Post {} deleted.", args.id))
    }

    /// Move a post to `published` or `draft`. A post already in the target
    /// status is left untouched.
    pub async fn set_post_status(&self, args: IdArgs, target: &str) -> Result<String, GhostError> {
        let Some(path) = resource_path("posts", &args.id) else {
            return Ok(INVALID_ID.to_string());
        };
        let current = self.current_post(&path).await?;
        if current.status.as_deref() == Some(target) {
            return Ok(if target == "published" {
                format!("Post {} is already published.", args.id)
            } else {
                format!("Post {} is already a draft.", args.id)
            });
        }

        let body = json!({ "posts": [{ "status": target, "updated_at": updated_at(&current)? }] });
        let post: Post = first(&self.client().put(&path, body).await?, "posts")?;
        tracing::info!(id = %args.id, status = target, "post status changed");
        Ok(if target == "published" {
            format!("Post published!\nID: {}\nURL: {}", or_empty(&post.id), or_na(&post.url))
        } else {
            format!("Post unpublished.\nID: {}\nStatus: draft", or_empty(&post.id))
        })
    }

    async fn current_post(&self, path: &str) -> Result<Post, GhostError> {
        first(&self.client().get(path, &[]).await?, "posts")
    }
}

fn join_names(refs: &[crate::domain::NamedRef]) -> String {
    refs.iter()
        .map(|r| r.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Ghost rejects writes without the current `updated_at` (optimistic lock).
fn updated_at(post: &Post) -> Result<&str, GhostError> {
    post.updated_at
        .as_deref()
        .ok_or_else(|| GhostError::Decode("current post has no updated_at".into()))
}
