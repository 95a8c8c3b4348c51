//! Ghost content resources as they come back from the Admin API.
//!
//! Every field is optional: the Admin API trims responses to the requested
//! `fields`, and write endpoints echo back only part of the resource.

pub mod capability;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::core::GhostError;

pub use capability::{CapabilityGroup, Preset, ToolSelection, ALL_GROUPS, PRESETS};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NamedRef {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Post {
    pub id: Option<String>,
    pub title: Option<String>,
    pub slug: Option<String>,
    pub status: Option<String>,
    pub url: Option<String>,
    pub html: Option<String>,
    pub excerpt: Option<String>,
    pub custom_excerpt: Option<String>,
    pub published_at: Option<String>,
    pub updated_at: Option<String>,
    #[serde(default)]
    pub tags: Vec<NamedRef>,
    #[serde(default)]
    pub authors: Vec<NamedRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Page {
    pub id: Option<String>,
    pub title: Option<String>,
    pub slug: Option<String>,
    pub status: Option<String>,
    pub url: Option<String>,
    pub html: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagCount {
    pub posts: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Tag {
    pub id: Option<String>,
    pub name: Option<String>,
    pub slug: Option<String>,
    pub count: Option<TagCount>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Site {
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub version: Option<String>,
    pub locale: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UploadedImage {
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Pagination {
    pub page: Option<u64>,
    pub pages: Option<u64>,
    pub total: Option<u64>,
}

/// `body[key]` as a list of `T`; a missing key is an empty list.
pub fn items<T: DeserializeOwned>(body: &Value, key: &str) -> Result<Vec<T>, GhostError> {
    match body.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(v) => Ok(serde_json::from_value(v.clone())?),
    }
}

/// The first element of `body[key]`. Single-resource endpoints still wrap
/// the resource in a one-element array.
pub fn first<T: DeserializeOwned>(body: &Value, key: &str) -> Result<T, GhostError> {
    let v = body
        .get(key)
        .and_then(|v| v.as_array())
        .and_then(|a| a.first())
        .ok_or_else(|| GhostError::Decode(format!("response contained no {key}")))?;
    Ok(serde_json::from_value(v.clone())?)
}

/// `body.meta.pagination`, or all-`None` when absent.
pub fn pagination(body: &Value) -> Pagination {
    body.pointer("/meta/pagination")
        .and_then(|v| serde_json::from_value(v.clone()).ok())
        .unwrap_or_default()
}
