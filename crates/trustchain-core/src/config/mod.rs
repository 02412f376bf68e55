//! Configuration types for trustchain.
//!
//! Configuration is loaded from a single YAML file (usually `trustchain.yaml`):
//!
//! ```yaml
//! issuer:
//!   org_issuer_keys:
//!     - 5f2b...c0
//!   org_issuer_keys_env: TRUSTCHAIN_ORG_ISSUERS
//!   require_issuer_expiry: false
//!   max_token_lifetime: 24h
//! ```

pub mod issuer;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub use issuer::IssuerConfig;

/// Complete trustchain configuration loaded from a file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrustChainConfig {
    /// Configuration version.
    #[serde(default)]
    pub version: Option<String>,

    /// Trust anchors and issuance policy.
    #[serde(default)]
    pub issuer: IssuerConfig,
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl TrustChainConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML content.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(ConfigError::from)
    }
}

/// Parse a duration string like "24h", "7d", "30m" or "45s" into a `chrono::Duration`.
///
/// A bare number is read as hours.
pub fn parse_duration(s: &str) -> Result<chrono::Duration, ConfigError> {
    let s = s.trim().to_lowercase();

    let (digits, unit) = match s.char_indices().last() {
        Some((idx, c)) if c.is_ascii_alphabetic() => (&s[..idx], c),
        _ => (s.as_str(), 'h'),
    };

    let value: i64 = digits
        .parse()
        .map_err(|_| ConfigError::Config(format!("invalid duration: {s:?}")))?;

    let duration = match unit {
        'd' => chrono::Duration::try_days(value),
        'h' => chrono::Duration::try_hours(value),
        'm' => chrono::Duration::try_minutes(value),
        's' => chrono::Duration::try_seconds(value),
        _ => return Err(ConfigError::Config(format!("invalid duration unit in {s:?}"))),
    };

    duration.ok_or_else(|| ConfigError::Config(format!("duration out of range: {s:?}")))
}
