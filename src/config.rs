use std::env;
use std::path::Path;

use serde::Deserialize;

use crate::error::{CommitgenError, Result};

const DEFAULT_MODEL: &str = "gemini-2.5-flash-lite";
const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MAX_TOOL_CALLS: usize = 8;
const CONFIG_FILE: &str = "commitgen.toml";

/// Runtime configuration. The API key is the only required setting and must
/// come from the environment; everything else has defaults, optionally
/// overridden by a `commitgen.toml` in the working directory and then by
/// environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_key: String,
    pub model: String,
    pub endpoint: String,
    pub max_tool_calls: usize,
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    model: Option<String>,
    endpoint: Option<String>,
    max_tool_calls: Option<usize>,
}

impl Config {
    /// Environment-only configuration. Fails fast when `GEMINI_API_KEY` is
    /// unset so no model call is ever attempted without a credential.
    pub fn from_env() -> Result<Self> {
        Self::build(FileConfig::default(), |key| env::var(key).ok())
    }

    /// Like `from_env`, but reads `commitgen.toml` from `dir` first when it
    /// exists. Environment variables win over file values.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE);
        let file = if path.exists() {
            let raw = std::fs::read_to_string(&path).map_err(|err| {
                CommitgenError::Config(format!("cannot read {}: {err}", path.display()))
            })?;
            Self::parse_file(&raw)?
        } else {
            FileConfig::default()
        };
        Self::build(file, |key| env::var(key).ok())
    }

    fn parse_file(raw: &str) -> Result<FileConfig> {
        toml::from_str(raw)
            .map_err(|err| CommitgenError::Config(format!("invalid {CONFIG_FILE}: {err}")))
    }

    /// Resolution order per setting: environment, then config file, then the
    /// built-in default. Env lookups go through `env` so tests can resolve
    /// against a fixed table instead of the process environment.
    fn build(file: FileConfig, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = env("GEMINI_API_KEY").ok_or_else(|| {
            CommitgenError::Config("the GEMINI_API_KEY environment variable is not set".into())
        })?;

        let model = env("GEMINI_MODEL")
            .or(file.model)
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let endpoint = env("GEMINI_ENDPOINT")
            .or(file.endpoint)
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        let max_tool_calls = match env("COMMITGEN_MAX_TOOL_CALLS") {
            Some(raw) => raw.parse().map_err(|_| {
                CommitgenError::Config(format!(
                    "COMMITGEN_MAX_TOOL_CALLS must be a positive integer, got `{raw}`"
                ))
            })?,
            None => file.max_tool_calls.unwrap_or(DEFAULT_MAX_TOOL_CALLS),
        };

        Ok(Self {
            api_key,
            model,
            endpoint,
            max_tool_calls,
        })
    }
}
