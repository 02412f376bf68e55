//! Trust anchor and issuance policy configuration.

use super::{ConfigError, parse_duration};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the organization issuers a verifier trusts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IssuerConfig {
    /// Hex-encoded org issuer public keys, listed inline.
    #[serde(default)]
    pub org_issuer_keys: Vec<String>,

    /// Environment variable holding comma separated hex-encoded org issuer keys.
    #[serde(default)]
    pub org_issuer_keys_env: Option<String>,

    /// File with one hex-encoded org issuer key per line.
    #[serde(default)]
    pub org_issuer_keys_file: Option<PathBuf>,

    /// Treat a client token without a checkable issuer expiry as a failure.
    #[serde(default)]
    pub require_issuer_expiry: bool,

    /// Maximum lifetime for newly issued tokens (e.g., "30d", "24h").
    #[serde(default)]
    pub max_token_lifetime: Option<String>,
}

impl IssuerConfig {
    /// Collect org issuer keys from the inline list, the environment and the key file.
    ///
    /// Duplicates are removed, order of first appearance is kept.
    pub fn resolve_org_issuer_keys(&self) -> Result<Vec<String>, ConfigError> {
        let mut keys: Vec<String> = Vec::new();
        let mut push = |key: &str| {
            let key = key.trim();
            if !key.is_empty() && !keys.iter().any(|k| k == key) {
                keys.push(key.to_string());
            }
        };

        for key in &self.org_issuer_keys {
            push(key.as_str());
        }

        if let Some(env_var) = &self.org_issuer_keys_env {
            if let Ok(value) = std::env::var(env_var) {
                value.split(',').for_each(&mut push);
            }
        }

        if let Some(path) = &self.org_issuer_keys_file {
            let content = std::fs::read_to_string(path)?;
            content.lines().for_each(&mut push);
        }

        Ok(keys)
    }

    /// The parsed `max_token_lifetime`, if configured.
    pub fn max_token_lifetime(&self) -> Result<Option<chrono::Duration>, ConfigError> {
        self.max_token_lifetime
            .as_deref()
            .map(parse_duration)
            .transpose()
    }
}
