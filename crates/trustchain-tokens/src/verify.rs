//! Verifying a single link of the trust chain.

use crate::chain::{CHAIN_ISSUER_PREFIX, ORG_ISSUER_PREFIX, split_pair};
use crate::claims::StandardClaims;
use crate::date::is_unset;
use crate::error::{Result, TokenError};
use crate::identifier::verify_identifier_time;
use crate::keys::{PublicKey, ed25519_verify, encode_public_key};
use tracing::debug;

impl StandardClaims {
    /// Check that this token was signed by its issuer.
    ///
    /// Returns `Ok(Some(key))` with the key that signed the token, or
    /// `Ok(None)` when an org issuer token simply is not signed by `public_key`.
    ///
    /// For org issuer tokens `public_key` must be the key named in `iss`. For
    /// chain issuer tokens the signature is checked against the creator key
    /// named in `iss` and `public_key` is not consulted; a bad signature there
    /// is [`TokenError::InvalidChainSignature`]. That only proves the creator
    /// signed this token: callers still have to confirm the creator itself is
    /// a chained issuer of a trusted org issuer.
    pub fn is_signed_by_issuer(&self, public_key: &PublicKey) -> Result<Option<PublicKey>> {
        self.check_chain_preconditions()?;

        if self.issuer.starts_with(ORG_ISSUER_PREFIX) {
            self.verify_org_issuer_signature(public_key)
        } else if let Some(issuer_data) = self.issuer.strip_prefix(CHAIN_ISSUER_PREFIX) {
            self.verify_chain_issuer_signature(issuer_data).map(Some)
        } else {
            Err(TokenError::UnsupportedIssuerFormat)
        }
    }

    fn check_chain_preconditions(&self) -> Result<()> {
        if self.issuer.is_empty() {
            return Err(TokenError::MissingIssuer);
        }
        if self.public_key.is_empty() {
            return Err(TokenError::MissingPublicKey);
        }
        if self.trust_chain_signature.is_empty() {
            return Err(TokenError::MissingTrustChainSignature);
        }
        if is_unset(self.issued_at) {
            return Err(TokenError::MissingIssuedAt);
        }
        if is_unset(self.expires_at) {
            return Err(TokenError::MissingExpiresAt);
        }
        if self.id.is_empty() {
            return Err(TokenError::MissingId);
        }

        let issued_at = self.issued_at.ok_or(TokenError::MissingIssuedAt)?;
        verify_identifier_time(&self.id, issued_at)
    }

    // iss: I-<org key>, tcs: hex(sign_org(<id>.<public key>))
    fn verify_org_issuer_signature(&self, public_key: &PublicKey) -> Result<Option<PublicKey>> {
        if self.issuer != format!("{ORG_ISSUER_PREFIX}{}", encode_public_key(public_key)) {
            return Err(TokenError::AnchorKeyMismatch);
        }

        let sig = hex::decode(&self.trust_chain_signature)
            .map_err(TokenError::InvalidSignatureEncoding)?;
        let data = self.org_issuer_chain_data()?;

        if ed25519_verify(public_key, &data, &sig) {
            Ok(Some(*public_key))
        } else {
            debug!(id = %self.id, issuer = %self.issuer, "token is not signed by the org issuer");
            Ok(None)
        }
    }

    // iss: C-<creator id>.<creator key>, tcs: <creator tcs>.hex(sign_creator(<id>.<creator tcs>))
    fn verify_chain_issuer_signature(&self, issuer_data: &str) -> Result<PublicKey> {
        let (creator_id, creator_key_hex) =
            split_pair(issuer_data).ok_or(TokenError::InvalidIssuerContent)?;
        if creator_id.is_empty() {
            return Err(TokenError::InvalidIssuerId);
        }
        if creator_key_hex.is_empty() {
            return Err(TokenError::InvalidIssuerPublicKey);
        }

        let creator_key = hex::decode(creator_key_hex)
            .ok()
            .and_then(|bytes| PublicKey::try_from(bytes.as_slice()).ok())
            .ok_or(TokenError::InvalidIssuerKeyEncoding)?;

        let (parent_chain_signature, sig_hex) = split_pair(&self.trust_chain_signature)
            .filter(|(parent, sig)| !parent.is_empty() && !sig.is_empty())
            .ok_or(TokenError::InvalidTrustChainSignature)?;

        let sig = hex::decode(sig_hex).map_err(TokenError::InvalidSignatureEncoding)?;
        let data = format!("{}.{}", self.id, parent_chain_signature);

        if !ed25519_verify(&creator_key, data.as_bytes(), &sig) {
            debug!(id = %self.id, creator = creator_id, "chain signature does not verify");
            return Err(TokenError::InvalidChainSignature);
        }

        Ok(creator_key)
    }
}
