//! Console configuration.
//!
//! Config file: ~/.config/mintctl/config.toml. Every field can be overridden
//! on the command line; a missing file just means defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default gateway endpoint (toncenter-style JSON-RPC).
pub const DEFAULT_ENDPOINT: &str = "https://toncenter.com/api/v2/jsonRPC";

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_max_attempts() -> u32 {
    10
}

fn default_interval_secs() -> u64 {
    3
}

/// Settlement poll settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollSettings {
    /// Position reads before giving up on confirmation.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Seconds between position reads.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            interval_secs: default_interval_secs(),
        }
    }
}

/// Operator console configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleConfig {
    /// Gateway JSON-RPC endpoint.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Gateway API key, if the endpoint requires one.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Operator wallet address (raw form). Absent means a local session with
    /// no caller identity.
    #[serde(default)]
    pub wallet: Option<String>,

    /// Hex sha2-256 of the minter code we expect on chain. Absent skips the
    /// code identity check.
    #[serde(default)]
    pub expected_code_hash: Option<String>,

    #[serde(default)]
    pub poll: PollSettings,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_key: None,
            wallet: None,
            expected_code_hash: None,
            poll: PollSettings::default(),
        }
    }
}

impl ConsoleConfig {
    /// Standard config file location, when a config dir exists.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("mintctl").join("config.toml"))
    }

    /// Loads a config file; a missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("parsing config file {}", path.display()))
    }

    /// Loads from the standard location, or defaults when there is none.
    pub fn load_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }
}
