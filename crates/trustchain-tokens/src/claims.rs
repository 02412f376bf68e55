//! Token claims.
//!
//! [`StandardClaims`] carries everything the trust chain needs. Richer token
//! variants embed it as a flattened `standard` field and expose it through the
//! [`Claims`] trait, so any variant can act as the parent in a chain.

use crate::date::NumericDate;
use crate::error::Result;
use crate::identifier::new_token_id;
use crate::keys::{PublicKey, encode_public_key};
use chrono::Duration;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// What kind of token this is. Not interpreted by the trust chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Purpose {
    #[default]
    #[serde(rename = "")]
    Unknown,
    ClientId,
    Server,
    Provisioning,
}

/// Claims shared by every token that takes part in a trust chain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandardClaims {
    /// Token type discriminator.
    #[serde(default)]
    pub purpose: Purpose,

    /// Proof linking this token to its issuer. Its grammar depends on `issuer`.
    #[serde(rename = "tcs", default, skip_serializing_if = "String::is_empty")]
    pub trust_chain_signature: String,

    /// Hex-encoded Ed25519 public key of the token subject.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub public_key: String,

    /// Expiry of the chain issuer that created this token.
    #[serde(rename = "issexp", default, skip_serializing_if = "Option::is_none")]
    pub issuer_expires_at: Option<NumericDate>,

    /// `I-<org key>` or `C-<creator id>.<creator key>`.
    #[serde(rename = "iss", default, skip_serializing_if = "String::is_empty")]
    pub issuer: String,

    #[serde(rename = "sub", default, skip_serializing_if = "String::is_empty")]
    pub subject: String,

    #[serde(rename = "aud", default, skip_serializing_if = "Vec::is_empty")]
    pub audience: Vec<String>,

    #[serde(rename = "exp", default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<NumericDate>,

    #[serde(rename = "nbf", default, skip_serializing_if = "Option::is_none")]
    pub not_before: Option<NumericDate>,

    #[serde(rename = "iat", default, skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<NumericDate>,

    /// Time-ordered token id, bound to `issued_at`.
    #[serde(rename = "jti", default, skip_serializing_if = "String::is_empty")]
    pub id: String,
}

impl StandardClaims {
    /// Create claims for a new token valid from now for `validity`.
    ///
    /// The token id is generated from the issue time.
    pub fn new(
        subject: impl Into<String>,
        purpose: Purpose,
        validity: Duration,
        public_key: Option<&PublicKey>,
    ) -> Self {
        let now = NumericDate::now();

        Self {
            purpose,
            public_key: public_key.map(encode_public_key).unwrap_or_default(),
            subject: subject.into(),
            expires_at: Some(now + validity),
            not_before: Some(now),
            issued_at: Some(now),
            id: new_token_id(now),
            ..Default::default()
        }
    }
}

/// Access to the standard claims embedded in any token variant.
pub trait Claims: Serialize + DeserializeOwned {
    fn standard(&self) -> &StandardClaims;

    fn standard_mut(&mut self) -> &mut StandardClaims;

    /// Encode the claims as JSON.
    fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decode claims from JSON.
    fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Claims for StandardClaims {
    fn standard(&self) -> &StandardClaims {
        self
    }

    fn standard_mut(&mut self) -> &mut StandardClaims {
        self
    }
}

/// Claims for a client, including login handlers acting as chain issuers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientIdClaims {
    #[serde(flatten)]
    pub standard: StandardClaims,

    /// The caller identity, e.g. `user=alice`.
    #[serde(rename = "callerid")]
    pub caller_id: String,
}

impl ClientIdClaims {
    pub fn new(caller_id: impl Into<String>, validity: Duration, public_key: &PublicKey) -> Self {
        let caller_id = caller_id.into();

        Self {
            standard: StandardClaims::new(
                caller_id.clone(),
                Purpose::ClientId,
                validity,
                Some(public_key),
            ),
            caller_id,
        }
    }
}

impl Claims for ClientIdClaims {
    fn standard(&self) -> &StandardClaims {
        &self.standard
    }

    fn standard_mut(&mut self) -> &mut StandardClaims {
        &mut self.standard
    }
}

/// Claims for a server joining the network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerClaims {
    #[serde(flatten)]
    pub standard: StandardClaims,

    /// Collectives the server may join.
    #[serde(default)]
    pub collectives: Vec<String>,
}

impl ServerClaims {
    pub fn new(
        identity: impl Into<String>,
        collectives: Vec<String>,
        validity: Duration,
        public_key: &PublicKey,
    ) -> Self {
        Self {
            standard: StandardClaims::new(identity, Purpose::Server, validity, Some(public_key)),
            collectives,
        }
    }
}

impl Claims for ServerClaims {
    fn standard(&self) -> &StandardClaims {
        &self.standard
    }

    fn standard_mut(&mut self) -> &mut StandardClaims {
        &mut self.standard
    }
}
