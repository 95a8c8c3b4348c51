use std::future::Future;
use std::path::Path;

use rmcp::handler::server::tool::{Parameters, ToolRouter};
use rmcp::model::CallToolResult;
use schemars::JsonSchema;
use serde::Deserialize;

use super::{or_na, text_result, GhostSvc};
use crate::clients::FilePart;
use crate::core::GhostError;
use crate::domain::{first, Site, UploadedImage};

pub const ALLOWED_EXTENSIONS: [&str; 7] =
    [".gif", ".ico", ".jpeg", ".jpg", ".png", ".svg", ".webp"];
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;
const MIB: u64 = 1024 * 1024;

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct UploadImageArgs {
    /// Absolute path to the image file
    pub file_path: String,
}

fn mime_for(ext: &str) -> &'static str {
    match ext {
        ".gif" => "image/gif",
        ".ico" => "image/vnd.microsoft.icon",
        ".jpeg" | ".jpg" => "image/jpeg",
        ".png" => "image/png",
        ".svg" => "image/svg+xml",
        ".webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

/// File extension with its leading dot, as written in the path.
fn suffix(path: &Path) -> String {
    path.extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default()
}

#[rmcp::tool_router(router = images_read_router)]
impl GhostSvc {
    #[rmcp::tool(description = "Get Ghost site information (title, URL, version).")]
    async fn ghost_site_info(&self) -> Result<CallToolResult, rmcp::ErrorData> {
        text_result(self.site_info().await)
    }
}

#[rmcp::tool_router(router = images_write_router)]
impl GhostSvc {
    #[rmcp::tool(description = "Upload a local image to Ghost and get its URL.")]
    async fn ghost_upload_image(
        &self,
        Parameters(args): Parameters<UploadImageArgs>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        text_result(self.upload_image(args).await)
    }
}

impl GhostSvc {
    pub fn images_read_tools() -> ToolRouter<GhostSvc> {
        Self::images_read_router()
    }

    pub fn images_write_tools() -> ToolRouter<GhostSvc> {
        Self::images_write_router()
    }

    pub async fn upload_image(&self, args: UploadImageArgs) -> Result<String, GhostError> {
        let path = match tokio::fs::canonicalize(&args.file_path).await {
            Ok(p) => p,
            Err(_) => return Ok("Error: file not found".to_string()),
        };
        let meta = match tokio::fs::metadata(&path).await {
            Ok(m) if m.is_file() => m,
            _ => return Ok("Error: file not found".to_string()),
        };

        let ext = suffix(&path);
        let lower = ext.to_ascii_lowercase();
        if !ALLOWED_EXTENSIONS.contains(&lower.as_str()) {
            return Ok(format!(
                "Error: unsupported file type '{ext}'. Allowed: {}",
                ALLOWED_EXTENSIONS.join(", ")
            ));
        }
        if meta.len() > MAX_FILE_SIZE {
            return Ok(format!(
                "Error: file too large ({}MB). Maximum: {}MB",
                meta.len() / MIB,
                MAX_FILE_SIZE / MIB
            ));
        }

        let bytes = match tokio::fs::read(&path).await {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "image read failed");
                return Ok("Error: file not found".to_string());
            }
        };
        let part = FilePart {
            field: "file".to_string(),
            file_name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            mime: mime_for(&lower).to_string(),
            bytes,
        };
        let image: UploadedImage = first(&self.client().upload("images/upload/", part).await?, "images")?;
        tracing::info!(size = meta.len(), "image uploaded");
        Ok(format!("Image uploaded!\nURL: {}", or_na(&image.url)))
    }

    pub async fn site_info(&self) -> Result<String, GhostError> {
        let body = self.client().get("site/", &[]).await?;
        let site: Site = match body.get("site") {
            Some(v) => serde_json::from_value(v.clone())?,
            None => Site::default(),
        };
        Ok([
            format!("Title: {}", or_na(&site.title)),
            format!("Description: {}", or_na(&site.description)),
            format!("URL: {}", or_na(&site.url)),
            format!("Ghost version: {}", or_na(&site.version)),
            format!("Locale: {}", or_na(&site.locale)),
        ]
        .join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::{path, svc};
    use httpmock::prelude::*;
    use serde_json::json;
    use std::io::Write;

    fn fixture(ext: &str, len: usize) -> tempfile::NamedTempFile {
        let mut f = tempfile::Builder::new().suffix(ext).tempfile().unwrap();
        f.write_all(&vec![0u8; len]).unwrap();
        f
    }

    #[tokio::test]
    async fn upload_sends_multipart_file() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(POST)
                .path(path("images/upload/"))
                .body_contains("name=\"file\"")
                .body_contains("Content-Type: image/png");
            then.status(201).json_body(json!({"images": [
                {"url": "http://test.ghost.io/content/images/test.png"}
            ]}));
        });

        let f = fixture(".png", 128);
        let out = svc(&server.base_url())
            .upload_image(UploadImageArgs {
                file_path: f.path().to_string_lossy().into_owned(),
            })
            .await
            .unwrap();
        m.assert();
        assert_eq!(
            out,
            "Image uploaded!\nURL: http://test.ghost.io/content/images/test.png"
        );
    }

    #[tokio::test]
    async fn upload_accepts_uppercase_extension() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path(path("images/upload/"));
            then.status(201)
                .json_body(json!({"images": [{"url": "http://x/photo.JPG"}]}));
        });
        let f = fixture(".JPG", 16);
        let out = svc(&server.base_url())
            .upload_image(UploadImageArgs {
                file_path: f.path().to_string_lossy().into_owned(),
            })
            .await
            .unwrap();
        assert!(out.starts_with("Image uploaded!"));
    }

    #[tokio::test]
    async fn upload_missing_file() {
        let out = svc("http://127.0.0.1:9")
            .upload_image(UploadImageArgs {
                file_path: "/nonexistent/image.png".into(),
            })
            .await
            .unwrap();
        assert_eq!(out, "Error: file not found");
    }

    #[tokio::test]
    async fn upload_rejects_unsupported_type() {
        let f = fixture(".txt", 4);
        let out = svc("http://127.0.0.1:9")
            .upload_image(UploadImageArgs {
                file_path: f.path().to_string_lossy().into_owned(),
            })
            .await
            .unwrap();
        assert_eq!(
            out,
            "Error: unsupported file type '.txt'. Allowed: .gif, .ico, .jpeg, .jpg, .png, .svg, .webp"
        );
    }

    #[tokio::test]
    async fn upload_rejects_large_file() {
        let f = fixture(".png", (MAX_FILE_SIZE + MIB) as usize);
        let out = svc("http://127.0.0.1:9")
            .upload_image(UploadImageArgs {
                file_path: f.path().to_string_lossy().into_owned(),
            })
            .await
            .unwrap();
        assert_eq!(out, "Error: file too large (11MB). Maximum: 10MB");
    }

    #[tokio::test]
    async fn site_info_lists_fields() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path(path("site/"));
            then.status(200).json_body(json!({"site": {
                "title": "My Blog",
                "description": "A blog",
                "url": "http://test.ghost.io",
                "version": "5.80"
            }}));
        });
        let out = svc(&server.base_url()).site_info().await.unwrap();
        assert_eq!(
            out,
            "Title: My Blog\nDescription: A blog\nURL: http://test.ghost.io\nGhost version: 5.80\nLocale: n/a"
        );
    }

    #[test]
    fn allowed_extensions_are_sorted() {
        let mut sorted = ALLOWED_EXTENSIONS;
        sorted.sort_unstable();
        assert_eq!(sorted, ALLOWED_EXTENSIONS);
        assert_eq!(mime_for(".jpg"), "image/jpeg");
    }
}
