use std::sync::Arc;

use axum::Router;
use http_body_util::BodyExt; // for .collect
use hyper::{header, Request, StatusCode};
use serde_json::{json, Value};
use tokio::time::{timeout, Duration};
use tower::ServiceExt; // for .oneshot

use ghost_mcp::clients::{AdminKey, GhostClient};
use ghost_mcp::domain::capability::resolve;
use ghost_mcp::infra::http_app::build_app;
use ghost_mcp::tools::registry::factory;

const KEY: &str = "testid1234567890:aabbccddee112233445566778899aabb";

fn app(base_url: &str, tools: Option<&str>, preset: Option<&str>) -> Router {
    let client = GhostClient::new(base_url, AdminKey::parse(KEY).unwrap()).unwrap();
    let selection = resolve(tools, preset).unwrap();
    build_app(factory(Arc::new(client), selection))
}

fn rpc(body: &Value, session: Option<&str>) -> Request<axum::body::Body> {
    let mut req = Request::builder()
        .method("POST")
        .uri("/mcp")
        .header(header::ACCEPT, "application/json, text/event-stream")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(id) = session {
        req = req.header("MCP-Session-Id", id);
    }
    req.body(axum::body::Body::from(body.to_string())).unwrap()
}

/// First `data:` frame of an SSE response, parsed as JSON-RPC.
async fn sse_json(res: axum::response::Response) -> Value {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    let s = String::from_utf8_lossy(&bytes);
    s.lines()
        .find_map(|line| line.strip_prefix("data: ").map(|d| d.to_string()))
        .and_then(|d| serde_json::from_str::<Value>(&d).ok())
        .expect("no JSON-RPC frame in response")
}

async fn open_session(app: &Router) -> String {
    let init = json!({
        "jsonrpc":"2.0","id":1,"method":"initialize",
        "params":{ "protocolVersion":"2025-03-26","capabilities":{},"clientInfo":{"name":"test","version":"0.1"} }
    });
    let init_res = app.clone().oneshot(rpc(&init, None)).await.unwrap();
    assert!(init_res.status().is_success());
    let session_id = init_res
        .headers()
        .get("MCP-Session-Id")
        .unwrap()
        .to_str()
        .unwrap()
        .to_owned();

    let initialized = json!({"jsonrpc":"2.0","method":"notifications/initialized","params":{}});
    let res = app
        .clone()
        .oneshot(rpc(&initialized, Some(&session_id)))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::ACCEPTED);
    session_id
}

async fn list_tool_names(app: &Router, session: &str) -> Vec<String> {
    let list = json!({"jsonrpc":"2.0","id":2,"method":"tools/list","params":{}});
    let res = timeout(Duration::from_secs(20), app.clone().oneshot(rpc(&list, Some(session))))
        .await
        .unwrap()
        .unwrap();
    assert!(res.status().is_success());
    let v = sse_json(res).await;
    let mut names: Vec<String> = v["result"]["tools"]
        .as_array()
        .expect("tools array")
        .iter()
        .filter_map(|t| t["name"].as_str().map(str::to_owned))
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn initialize_list_and_call_site_info() {
    let server = httpmock::MockServer::start();
    let site = server.mock(|when, then| {
        when.method(httpmock::Method::GET)
            .path("/ghost/api/admin/site/")
            .header("accept-version", "v5.0");
        then.status(200).json_body(json!({"site": {
            "title": "Test Blog",
            "description": "Testing",
            "url": "http://test.ghost.io",
            "version": "5.80",
            "locale": "en"
        }}));
    });

    let app = app(&server.base_url(), Some("images"), None);
    let session = open_session(&app).await;

    let names = list_tool_names(&app, &session).await;
    assert_eq!(names, vec!["ghost_site_info", "ghost_upload_image"]);

    let call = json!({
        "jsonrpc":"2.0","id":3,"method":"tools/call",
        "params": {"name":"ghost_site_info","arguments":{}}
    });
    let res = app.clone().oneshot(rpc(&call, Some(&session))).await.unwrap();
    assert!(res.status().is_success());
    let v = sse_json(res).await;
    let text = v["result"]["content"][0]["text"].as_str().expect("text content");
    assert_eq!(
        text,
        "Title: Test Blog\nDescription: Testing\nURL: http://test.ghost.io\nGhost version: 5.80\nLocale: en"
    );
    site.assert();
}

#[tokio::test]
async fn readonly_preset_hides_mutating_tools() {
    let server = httpmock::MockServer::start();
    let app = app(&server.base_url(), None, Some("readonly"));
    let session = open_session(&app).await;

    let names = list_tool_names(&app, &session).await;
    assert_eq!(
        names,
        vec![
            "ghost_get_page",
            "ghost_get_post",
            "ghost_list_pages",
            "ghost_list_posts",
            "ghost_list_tags",
            "ghost_site_info",
        ]
    );
}

#[tokio::test]
async fn api_error_surfaces_as_call_error() {
    let server = httpmock::MockServer::start();
    server.mock(|when, then| {
        when.method(httpmock::Method::GET).path("/ghost/api/admin/posts/missing/");
        then.status(404)
            .json_body(json!({"errors": [{"message": "Post not found"}]}));
    });

    let app = app(&server.base_url(), Some("posts"), None);
    let session = open_session(&app).await;

    let call = json!({
        "jsonrpc":"2.0","id":4,"method":"tools/call",
        "params": {"name":"ghost_get_post","arguments":{"id":"missing"}}
    });
    let res = app.clone().oneshot(rpc(&call, Some(&session))).await.unwrap();
    assert!(res.status().is_success());
    let v = sse_json(res).await;
    assert_eq!(v["error"]["code"], -32603);
    assert!(v["error"]["message"]
        .as_str()
        .unwrap()
        .contains("Ghost API Error 404: Post not found"));
}

#[tokio::test]
async fn healthz_responds() {
    let app = app("http://127.0.0.1:9", None, None);
    let res = app
        .oneshot(
            Request::get("/healthz")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}
