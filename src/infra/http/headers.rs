use reqwest::RequestBuilder;

/// Admin API version pinned by this client.
pub const ACCEPT_VERSION: &str = "v5.0";
/// Scheme tag in front of the signed token.
pub const AUTH_SCHEME: &str = "Ghost";

/// Generate a simple request id suitable for logging/correlation.
pub fn generate_request_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("gm-{}-{}", now.as_secs(), now.subsec_nanos())
}

/// Attach the headers every Admin API call carries. `json` adds the JSON
/// content type; multipart uploads leave it to reqwest so the boundary
/// parameter is set. Returns the updated builder and the request id used.
pub fn add_standard_headers(
    builder: RequestBuilder,
    token: &str,
    json: bool,
    request_id: Option<String>,
) -> (RequestBuilder, String) {
    let rid = request_id.unwrap_or_else(generate_request_id);
    let mut b = builder
        .header(reqwest::header::AUTHORIZATION, format!("{AUTH_SCHEME} {token}"))
        .header("Accept-Version", ACCEPT_VERSION)
        .header("x-request-id", rid.as_str())
        .header(
            reqwest::header::USER_AGENT,
            format!("ghost-mcp/{}", env!("CARGO_PKG_VERSION")),
        );
    if json {
        b = b.header(reqwest::header::CONTENT_TYPE, "application/json");
    }
    (b, rid)
}
