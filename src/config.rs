//! Runtime configuration loaded from a TOML file.
//!
//! ```toml
//! [http]
//! timeout_secs = 30
//! max_retries = 10
//! retry_backoff_ms = 500
//!
//! [extract]
//! destination_prefix = "imported"
//! overwrite = "skip"          # skip | never | always
//!
//! [[content_kinds]]
//! extension = "d.ts"
//! kind = "application/typescript"
//! ```

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

use crate::projection::ContentKinds;
use crate::zip::OverwritePolicy;

/// Environment variable naming a config file when `--config` is absent.
pub const CONFIG_ENV: &str = "ZIPTREE_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub http: HttpConfig,
    pub extract: ExtractConfig,
    /// Extension rules consulted before the built-in table, first match wins.
    pub content_kinds: Vec<ContentKindRule>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_retries: 10,
            retry_backoff_ms: 500,
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Linear backoff before retry number `attempt` (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.retry_backoff_ms * attempt as u64)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtractConfig {
    pub destination_prefix: String,
    pub overwrite: OverwritePolicy,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContentKindRule {
    pub extension: String,
    pub kind: String,
}

impl Config {
    /// Load from `path`, else from `$ZIPTREE_CONFIG`, else defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => Some(path.to_path_buf()),
            None => env::var_os(CONFIG_ENV).map(PathBuf::from),
        };
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = Self::from_toml(&text)
            .with_context(|| format!("invalid config {}", path.display()))?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Built-in content kinds with the configured rules in front.
    pub fn content_kinds(&self) -> ContentKinds {
        self.content_kinds
            .iter()
            .rev()
            .fold(ContentKinds::default(), |kinds, rule| {
                kinds.with_override(&rule.extension, &rule.kind)
            })
    }
}
