//! Startup configuration.
//!
//! Flags and environment variables are merged by clap before they get here;
//! the optional TOML file only fills in values neither of them supplied.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::clients::AdminKey;
use crate::core::ConfigError;
use crate::domain::capability::{resolve, ToolSelection};

/// How the MCP server talks to its client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Transport {
    #[default]
    Stdio,
    Http,
}

/// Keys accepted in the TOML config file.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub url: Option<String>,
    pub admin_key: Option<String>,
    pub tools: Option<String>,
    pub preset: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let file_err = |reason: String| ConfigError::File {
            path: path.display().to_string(),
            reason,
        };
        let raw = std::fs::read_to_string(path).map_err(|e| file_err(e.to_string()))?;
        toml::from_str(&raw).map_err(|e| file_err(e.to_string()))
    }
}

/// Unresolved settings as they arrive from flags/env.
#[derive(Debug, Default, Clone)]
pub struct ConfigInput {
    pub url: Option<String>,
    pub admin_key: Option<String>,
    pub tools: Option<String>,
    pub preset: Option<String>,
    pub config_path: Option<PathBuf>,
}

/// Fully validated, immutable runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub url: String,
    pub admin_key: AdminKey,
    pub selection: ToolSelection,
}

fn pick(primary: Option<String>, fallback: Option<String>) -> Option<String> {
    primary
        .filter(|s| !s.trim().is_empty())
        .or(fallback.filter(|s| !s.trim().is_empty()))
}

impl ConfigInput {
    fn file(&self) -> Result<FileConfig, ConfigError> {
        match &self.config_path {
            Some(p) => FileConfig::load(p),
            None => Ok(FileConfig::default()),
        }
    }

    /// Resolve only the tool selection; URL and key may be absent.
    pub fn selection(&self) -> Result<ToolSelection, ConfigError> {
        let file = self.file()?;
        select(self.tools.clone(), self.preset.clone(), file)
    }
}

fn select(
    tools: Option<String>,
    preset: Option<String>,
    file: FileConfig,
) -> Result<ToolSelection, ConfigError> {
    let tools = pick(tools, file.tools);
    let preset = pick(preset, file.preset);
    resolve(tools.as_deref(), preset.as_deref())
}

impl Config {
    pub fn resolve(input: ConfigInput) -> Result<Self, ConfigError> {
        let mut file = input.file()?;

        let url = pick(input.url, file.url.take()).ok_or(ConfigError::MissingUrl)?;
        let raw_key =
            pick(input.admin_key, file.admin_key.take()).ok_or(ConfigError::MissingKey)?;
        let admin_key = AdminKey::parse(raw_key.trim())?;
        let selection = select(input.tools, input.preset, file)?;

        Ok(Self {
            url: url.trim().trim_end_matches('/').to_string(),
            admin_key,
            selection,
        })
    }
}
