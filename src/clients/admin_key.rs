//! Ghost Admin API key (`id:hexsecret`) and the short-lived HS256 tokens
//! signed with it.

use std::fmt;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::Sha256;

use crate::core::ConfigError;

type HmacSha256 = Hmac<Sha256>;

/// Lifetime of every token, in seconds.
pub const TOKEN_TTL_SECS: i64 = 300;
/// Audience claim expected by the Admin API.
pub const TOKEN_AUDIENCE: &str = "/admin/";

#[derive(Serialize)]
struct Header<'a> {
    alg: &'static str,
    kid: &'a str,
    typ: &'static str,
}

#[derive(Serialize)]
struct Claims {
    aud: &'static str,
    exp: i64,
    iat: i64,
}

/// Parsed admin key. The secret only lives inside the keyed MAC and is never
/// printed, including through `Debug`.
#[derive(Clone)]
pub struct AdminKey {
    id: String,
    mac: HmacSha256,
}

impl AdminKey {
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let parts: Vec<&str> = raw.trim().split(':').collect();
        let [id, secret] = parts.as_slice() else {
            return Err(ConfigError::KeyFormat);
        };
        if id.is_empty() || secret.is_empty() {
            return Err(ConfigError::KeyFormat);
        }
        let secret = hex::decode(secret).map_err(|e| ConfigError::KeySecret(e.to_string()))?;
        let mac = HmacSha256::new_from_slice(&secret)
            .map_err(|e| ConfigError::KeySecret(e.to_string()))?;
        Ok(Self {
            id: (*id).to_string(),
            mac,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// A fresh token issued now.
    pub fn token(&self) -> String {
        self.token_at(chrono::Utc::now().timestamp())
    }

    /// A token issued at `iat` (Unix seconds), expiring `TOKEN_TTL_SECS` later.
    pub fn token_at(&self, iat: i64) -> String {
        let header = Header {
            alg: "HS256",
            kid: &self.id,
            typ: "JWT",
        };
        let claims = Claims {
            aud: TOKEN_AUDIENCE,
            exp: iat + TOKEN_TTL_SECS,
            iat,
        };
        let signing_input = format!("{}.{}", encode_segment(&header), encode_segment(&claims));
        let signature = self
            .mac
            .clone()
            .chain_update(signing_input.as_bytes())
            .finalize()
            .into_bytes();
        format!("{signing_input}.{}", URL_SAFE_NO_PAD.encode(signature))
    }
}

impl fmt::Debug for AdminKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminKey")
            .field("id", &self.id)
            .field("secret", &"<redacted>")
            .finish()
    }
}

fn encode_segment<T: Serialize>(value: &T) -> String {
    // Serializing these fixed structs cannot fail.
    let json = serde_json::to_vec(value).unwrap_or_default();
    URL_SAFE_NO_PAD.encode(json)
}
