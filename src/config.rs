//! Generator configuration for implementations under test.
//!
//! Each implementation supplies a `config.json` describing how to invoke its
//! document generator: a local executable, a REST endpoint, or a
//! token-emitting executable for the JWT tests. The configuration is loaded
//! once and treated as read-only for the life of the process.
//!
//! # Example
//!
//! ```json
//! {
//!   "generator": "node ./issue-credential.js",
//!   "presentationGenerator": "node ./issue-presentation.js",
//!   "generatorOptions": "--key key.jwk",
//!   "sectionsNotSupported": ["zkp"],
//!   "restapi": {
//!     "baseUrl": "https://issuer.example.com",
//!     "oauthToken": "s3cr3t",
//!     "oauthTokenType": "Bearer",
//!     "timeoutMs": 10000
//!   }
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("config validation: {0}")]
    Validation(String),
}

/// REST transport settings. Presence of this block switches the adapter to
/// HTTP mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestApiConfig {
    /// Base URL the generator path is appended to.
    pub base_url: String,
    /// Bearer token sent in the Authorization header.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oauth_token: Option<String>,
    /// Token scheme, defaults to `Bearer`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oauth_token_type: Option<String>,
    /// Per-request timeout in milliseconds.
    #[serde(default = "default_http_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_http_timeout_ms() -> u64 {
    10_000
}

/// Full generator configuration for one implementation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorConfig {
    /// Command line (or REST path) producing credentials.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generator: Option<String>,
    /// Command line (or REST path) producing presentations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presentation_generator: Option<String>,
    /// Extra CLI arguments appended to subprocess invocations, as one
    /// shell-style string. Older configs call this `args`.
    #[serde(default, alias = "args", skip_serializing_if = "Option::is_none")]
    pub generator_options: Option<String>,
    /// REST transport settings; presence selects HTTP mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restapi: Option<RestApiConfig>,
    /// Section ids this implementation declares out of scope. Drives
    /// test-skipping at execution time, upstream of aggregation.
    #[serde(default)]
    pub sections_not_supported: Vec<String>,
    /// Subprocess timeout in milliseconds. A stuck generator otherwise
    /// blocks the whole pipeline.
    #[serde(default = "default_subprocess_timeout_ms")]
    pub subprocess_timeout_ms: u64,
}

fn default_subprocess_timeout_ms() -> u64 {
    30_000
}

/// Which artifact the generator is asked to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifact {
    Credential,
    Presentation,
}

impl GeneratorConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.generator.is_none() && self.presentation_generator.is_none() {
            return Err(ConfigError::Validation(
                "config must set `generator` or `presentationGenerator`".into(),
            ));
        }
        if let Some(rest) = &self.restapi {
            if rest.base_url.is_empty() {
                return Err(ConfigError::Validation(
                    "restapi.baseUrl must not be empty".into(),
                ));
            }
        }
        Ok(())
    }

    /// The command or REST path for the requested artifact.
    pub fn generator_for(&self, artifact: Artifact) -> Result<&str, ConfigError> {
        let chosen = match artifact {
            Artifact::Credential => self.generator.as_deref(),
            Artifact::Presentation => self.presentation_generator.as_deref(),
        };
        chosen.ok_or_else(|| {
            ConfigError::Validation(format!(
                "config has no generator for {}",
                match artifact {
                    Artifact::Credential => "credentials",
                    Artifact::Presentation => "presentations",
                }
            ))
        })
    }

    pub fn supports_section(&self, section_id: &str) -> bool {
        !self.sections_not_supported.iter().any(|s| s == section_id)
    }
}
