//! Building the trust chain at issue time.
//!
//! An org issuer vouches for a chain issuer by signing
//! [`org_issuer_chain_data`](StandardClaims::org_issuer_chain_data), and a
//! chain issuer vouches for a client it creates by signing
//! [`chain_issuer_data`](StandardClaims::chain_issuer_data):
//!
//! | Token | `iss` | `tcs` |
//! |-------|-------|-------|
//! | Chain issuer | `I-<hex org key>` | `hex(sign_org(<id>.<public key>))` |
//! | Client | `C-<creator id>.<creator public key>` | `<creator tcs>.hex(sign_creator(<id>.<creator tcs>))` |

use crate::claims::{Claims, StandardClaims};
use crate::error::{Result, TokenError};
use crate::keys::{PublicKey, ed25519_verify, encode_public_key};
use tracing::debug;

/// Issuer prefix of tokens signed directly by the org issuer.
pub const ORG_ISSUER_PREFIX: &str = "I-";

/// Issuer prefix of tokens created by a chain issuer.
pub const CHAIN_ISSUER_PREFIX: &str = "C-";

/// Split `<left>.<right>`, requiring exactly two parts.
pub(crate) fn split_pair(value: &str) -> Option<(&str, &str)> {
    let (left, right) = value.split_once('.')?;
    if right.contains('.') {
        return None;
    }
    Some((left, right))
}

impl StandardClaims {
    /// The data an org issuer signs to vouch for this token's public key.
    pub fn org_issuer_chain_data(&self) -> Result<Vec<u8>> {
        if self.id.is_empty() {
            return Err(TokenError::MissingId);
        }
        if self.public_key.is_empty() {
            return Err(TokenError::MissingPublicKey);
        }

        Ok(format!("{}.{}", self.id, self.public_key).into_bytes())
    }

    /// Mark this token as issued by the org issuer holding `public_key`.
    pub fn set_org_issuer(&mut self, public_key: &PublicKey) {
        self.issuer = format!("{ORG_ISSUER_PREFIX}{}", encode_public_key(public_key));
    }

    /// Whether this token may issue others as part of a chain.
    ///
    /// Without `verify` this only checks the shape of `iss` and `tcs`, which is
    /// a strong hint but not proof. With `verify` the org issuer signature is
    /// checked against the key named in `iss`; any failure yields `false`.
    pub fn is_chained_issuer(&self, verify: bool) -> bool {
        if self.trust_chain_signature.is_empty() {
            return false;
        }

        let Some(org_key_hex) = self.issuer.strip_prefix(ORG_ISSUER_PREFIX) else {
            return false;
        };

        if !verify {
            return true;
        }

        let Ok(data) = self.org_issuer_chain_data() else {
            return false;
        };

        let org_key = match hex::decode(org_key_hex).map(|b| PublicKey::try_from(b.as_slice())) {
            Ok(Ok(key)) => key,
            _ => {
                debug!(id = %self.id, "chained issuer has an invalid org issuer key");
                return false;
            }
        };

        let Ok(sig) = hex::decode(&self.trust_chain_signature) else {
            debug!(id = %self.id, "chained issuer has an invalid trust chain signature");
            return false;
        };

        ed25519_verify(&org_key, &data, &sig)
    }

    /// Mark this token as created by the chain issuer `parent`.
    ///
    /// The parent's expiry is copied into `issexp` so the child can never
    /// outlive it.
    pub fn set_chain_issuer<C: Claims>(&mut self, parent: &C) -> Result<()> {
        let parent = parent.standard();
        if parent.id.is_empty() {
            return Err(TokenError::MissingId);
        }
        if parent.public_key.is_empty() {
            return Err(TokenError::MissingPublicKey);
        }

        self.issuer = format!("{CHAIN_ISSUER_PREFIX}{}.{}", parent.id, parent.public_key);
        self.issuer_expires_at = parent.expires_at;

        Ok(())
    }

    /// The data a chain issuer signs to vouch for this token.
    ///
    /// `parent_chain_signature` is the creator's own `tcs`. The issuer must
    /// already be set with [`set_chain_issuer`](Self::set_chain_issuer).
    pub fn chain_issuer_data(&self, parent_chain_signature: &str) -> Result<Vec<u8>> {
        if self.id.is_empty() {
            return Err(TokenError::MissingId);
        }
        if self.issuer.is_empty() {
            return Err(TokenError::MissingIssuer);
        }

        let Some(issuer_data) = self.issuer.strip_prefix(CHAIN_ISSUER_PREFIX) else {
            return Err(TokenError::InvalidIssuerPrefix);
        };

        match split_pair(issuer_data) {
            Some((id, key)) if !id.is_empty() && !key.is_empty() => {}
            _ => return Err(TokenError::InvalidIssuerData),
        }

        Ok(format!("{}.{}", self.id, parent_chain_signature).into_bytes())
    }

    /// Store the org issuer's signature on a token that may issue others.
    pub fn set_chain_issuer_trust_signature(&mut self, sig: &[u8]) {
        self.trust_chain_signature = hex::encode(sig);
    }

    /// Store the creator's signature on a token issued by a chain issuer.
    pub fn set_chain_user_trust_signature<C: Claims>(&mut self, parent: &C, sig: &[u8]) {
        self.trust_chain_signature = format!(
            "{}.{}",
            parent.standard().trust_chain_signature,
            hex::encode(sig)
        );
    }
}
