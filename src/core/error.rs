use thiserror::Error;

/// Errors raised while turning flags/env/file settings into a runnable config.
/// All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("provide URL via --url or GHOST_URL env variable")]
    MissingUrl,
    #[error("provide key via --key or GHOST_ADMIN_KEY env variable")]
    MissingKey,
    #[error("Invalid API key format. Expected: {{id}}:{{secret}}")]
    KeyFormat,
    #[error("Invalid API key secret: {0}")]
    KeySecret(String),
    #[error("Unknown capability group(s): {}. Valid groups: {}", .invalid.join(", "), .valid.join(", "))]
    UnknownGroups {
        invalid: Vec<String>,
        valid: Vec<&'static str>,
    },
    #[error("Unknown preset '{name}'. Available presets: {}", .available.join(", "))]
    UnknownPreset {
        name: String,
        available: Vec<&'static str>,
    },
    #[error("failed to read config file {path}: {reason}")]
    File { path: String, reason: String },
}

/// Errors from a single Ghost Admin API call.
#[derive(Debug, Error)]
pub enum GhostError {
    /// Non-success HTTP status; `message` is the first `errors[].message`
    /// from the body, or the raw body text.
    #[error("Ghost API Error {status}: {message}")]
    Api { status: u16, message: String },
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl GhostError {
    pub fn status(&self) -> Option<u16> {
        match self {
            GhostError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for GhostError {
    fn from(e: serde_json::Error) -> Self {
        GhostError::Decode(e.to_string())
    }
}

impl From<GhostError> for rmcp::ErrorData {
    fn from(e: GhostError) -> Self {
        rmcp::ErrorData::internal_error(e.to_string(), None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_displays_status_and_message() {
        let e = GhostError::Api {
            status: 404,
            message: "Post not found".into(),
        };
        assert_eq!(e.to_string(), "Ghost API Error 404: Post not found");
        assert_eq!(e.status(), Some(404));
    }

    #[test]
    fn unknown_groups_lists_every_invalid_name() {
        let e = ConfigError::UnknownGroups {
            invalid: vec!["foo".into(), "bar".into()],
            valid: vec!["posts", "pages"],
        };
        let msg = e.to_string();
        assert!(msg.contains("foo, bar"), "{msg}");
        assert!(msg.contains("Valid groups: posts, pages"), "{msg}");
    }

    #[test]
    fn key_format_message_is_literal() {
        assert_eq!(
            ConfigError::KeyFormat.to_string(),
            "Invalid API key format. Expected: {id}:{secret}"
        );
    }

    #[test]
    fn converts_into_internal_mcp_error() {
        let e: rmcp::ErrorData = GhostError::Decode("boom".into()).into();
        assert_eq!(e.code.0, -32603);
        assert!(e.message.contains("boom"));
    }
}
