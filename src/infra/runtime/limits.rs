use std::time::Duration;

/// Absolute per-request bound for Ghost Admin API calls.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the shared reqwest client: fixed request timeout, redirects never
/// followed so a token is not replayed against an unexpected host.
pub fn make_http_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .redirect(reqwest::redirect::Policy::none())
        .build()
}
