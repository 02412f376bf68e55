//! Two-hop trust chain verification against configured org issuers.
//!
//! [`StandardClaims::is_signed_by_issuer`] checks one link. A client created by
//! a chain issuer is only trusted once both links hold:
//!
//! 1. the creator named in the client's `iss` signed the client, and
//! 2. the creator itself was signed by a trusted org issuer.

use crate::chain::{CHAIN_ISSUER_PREFIX, ORG_ISSUER_PREFIX, split_pair};
use crate::claims::{Claims, StandardClaims};
use crate::error::{Result, TokenError};
use crate::keys::{PublicKey, load_public_key_hex};
use tracing::{debug, warn};
use trustchain_core::IssuerConfig;

/// Keys that signed a verified client token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifiedChain {
    /// The trusted org issuer that vouched for the chain issuer.
    pub org_issuer: PublicKey,
    /// The chain issuer that created the client.
    pub chain_issuer: PublicKey,
}

/// Verifies tokens against a set of trusted org issuer keys.
#[derive(Debug, Clone)]
pub struct ChainVerifier {
    anchors: Vec<PublicKey>,
    require_issuer_expiry: bool,
}

impl ChainVerifier {
    /// Create a verifier trusting `anchors`.
    pub fn new(anchors: Vec<PublicKey>) -> Self {
        Self {
            anchors,
            require_issuer_expiry: false,
        }
    }

    /// Reject client tokens whose issuer expiry cannot be checked.
    pub fn with_required_issuer_expiry(mut self, required: bool) -> Self {
        self.require_issuer_expiry = required;
        self
    }

    /// Create a verifier from the configured org issuer keys and policy.
    pub fn from_config(config: &IssuerConfig) -> Result<Self> {
        let anchors = config
            .resolve_org_issuer_keys()?
            .iter()
            .map(|key| load_public_key_hex(key))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::new(anchors).with_required_issuer_expiry(config.require_issuer_expiry))
    }

    pub fn anchors(&self) -> &[PublicKey] {
        &self.anchors
    }

    /// Verify a token issued directly by one of the trusted org issuers.
    ///
    /// Each anchor is tried in turn; anchors that are not named in the token
    /// or did not sign it are skipped. Returns the org issuer key.
    pub fn verify_issuer<C: Claims>(&self, token: &C) -> Result<PublicKey> {
        let token = token.standard();

        self.check_issuer(token).inspect_err(|err| {
            warn!(id = %token.id, issuer = %token.issuer, error = %err, "rejected org issued token");
        })
    }

    /// Verify a client token and the chain issuer token that created it.
    pub fn verify_client<C: Claims, P: Claims>(
        &self,
        client: &C,
        creator: &P,
    ) -> Result<VerifiedChain> {
        let client = client.standard();

        self.check_client(client, creator.standard())
            .inspect(|_| debug!(id = %client.id, issuer = %client.issuer, "verified client trust chain"))
            .inspect_err(|err| {
                warn!(id = %client.id, issuer = %client.issuer, error = %err, "rejected client token");
            })
    }

    fn check_issuer(&self, token: &StandardClaims) -> Result<PublicKey> {
        if token.is_expired() {
            return Err(TokenError::TokenExpired {
                expired_at: token.expire_time().to_string(),
            });
        }

        if !token.issuer.starts_with(ORG_ISSUER_PREFIX) {
            return Err(TokenError::UntrustedIssuer);
        }

        for anchor in &self.anchors {
            match token.is_signed_by_issuer(anchor) {
                Ok(Some(key)) => {
                    debug!(id = %token.id, "token signed by trusted org issuer");
                    return Ok(key);
                }
                Ok(None) | Err(TokenError::AnchorKeyMismatch) => continue,
                Err(err) => return Err(err),
            }
        }

        Err(TokenError::UntrustedIssuer)
    }

    fn check_client(
        &self,
        client: &StandardClaims,
        creator: &StandardClaims,
    ) -> Result<VerifiedChain> {
        if client.is_expired() {
            return Err(TokenError::TokenExpired {
                expired_at: client.expire_time().to_string(),
            });
        }

        if !client.verify_issuer_expiry(self.require_issuer_expiry) {
            return Err(TokenError::IssuerExpired);
        }

        if !client.issuer.starts_with(CHAIN_ISSUER_PREFIX) {
            return Err(TokenError::CreatorMismatch(
                "client was not issued by a chain issuer".into(),
            ));
        }

        let expected_issuer = format!("{CHAIN_ISSUER_PREFIX}{}.{}", creator.id, creator.public_key);
        if client.issuer != expected_issuer {
            return Err(TokenError::CreatorMismatch(format!(
                "client issuer {} does not name creator {}",
                client.issuer, creator.id
            )));
        }

        let creator_key = load_public_key_hex(&creator.public_key)
            .map_err(|err| TokenError::CreatorMismatch(err.to_string()))?;

        let chain_issuer = client
            .is_signed_by_issuer(&creator_key)?
            .ok_or(TokenError::InvalidChainSignature)?;

        let parent_chain_signature = split_pair(&client.trust_chain_signature)
            .map(|(parent, _)| parent)
            .ok_or(TokenError::InvalidTrustChainSignature)?;
        if parent_chain_signature != creator.trust_chain_signature {
            return Err(TokenError::CreatorMismatch(
                "client trust chain does not extend the creator's".into(),
            ));
        }

        if !creator.is_chained_issuer(true) {
            return Err(TokenError::NotChainedIssuer {
                id: creator.id.clone(),
            });
        }

        let org_issuer = self.check_issuer(creator)?;

        Ok(VerifiedChain {
            org_issuer,
            chain_issuer,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::ClientIdClaims;
    use crate::date::NumericDate;
    use crate::keys::KeyPair;
    use chrono::Duration;

    struct Chain {
        org: KeyPair,
        handler_key: KeyPair,
        handler: ClientIdClaims,
        client: ClientIdClaims,
    }

    fn chain() -> Chain {
        let org = KeyPair::generate();
        let handler_key = KeyPair::generate();
        let client_key = KeyPair::generate();

        let mut handler =
            ClientIdClaims::new("handler=login", Duration::hours(1), &handler_key.public_key());
        handler.standard.set_org_issuer(&org.public_key());
        let sig = org.sign(&handler.standard.org_issuer_chain_data().unwrap());
        handler
            .standard
            .set_chain_issuer_trust_signature(&sig.to_bytes());

        let mut client =
            ClientIdClaims::new("user=alice", Duration::minutes(30), &client_key.public_key());
        client.standard.set_chain_issuer(&handler).unwrap();
        let data = client
            .standard
            .chain_issuer_data(&handler.standard.trust_chain_signature)
            .unwrap();
        let sig = handler_key.sign(&data);
        client
            .standard
            .set_chain_user_trust_signature(&handler, &sig.to_bytes());

        Chain {
            org,
            handler_key,
            handler,
            client,
        }
    }

    #[test]
    fn test_verify_client() {
        let chain = chain();
        let verifier = ChainVerifier::new(vec![chain.org.public_key()]);

        let verified = verifier.verify_client(&chain.client, &chain.handler).unwrap();
        assert_eq!(verified.org_issuer, chain.org.public_key());
        assert_eq!(verified.chain_issuer, chain.handler_key.public_key());
    }

    #[test]
    fn test_verify_issuer_tries_every_anchor() {
        let chain = chain();
        let verifier = ChainVerifier::new(vec![
            KeyPair::generate().public_key(),
            chain.org.public_key(),
        ]);

        assert_eq!(
            verifier.verify_issuer(&chain.handler).unwrap(),
            chain.org.public_key()
        );
    }

    #[test]
    fn test_untrusted_org_issuer() {
        let chain = chain();
        let verifier = ChainVerifier::new(vec![KeyPair::generate().public_key()]);

        assert!(matches!(
            verifier.verify_issuer(&chain.handler),
            Err(TokenError::UntrustedIssuer)
        ));
        assert!(matches!(
            verifier.verify_client(&chain.client, &chain.handler),
            Err(TokenError::UntrustedIssuer)
        ));
        assert!(matches!(
            ChainVerifier::new(Vec::new()).verify_issuer(&chain.handler),
            Err(TokenError::UntrustedIssuer)
        ));
    }

    #[test]
    fn test_client_is_not_an_org_issued_token() {
        let chain = chain();
        let verifier = ChainVerifier::new(vec![chain.org.public_key()]);

        assert!(matches!(
            verifier.verify_issuer(&chain.client),
            Err(TokenError::UntrustedIssuer)
        ));
    }

    #[test]
    fn test_wrong_creator() {
        let chain = chain();
        let other = self::chain();
        let verifier = ChainVerifier::new(vec![chain.org.public_key()]);

        assert!(matches!(
            verifier.verify_client(&chain.client, &other.handler),
            Err(TokenError::CreatorMismatch(_))
        ));
    }

    #[test]
    fn test_creator_with_replaced_trust_chain_signature() {
        let chain = chain();
        let verifier = ChainVerifier::new(vec![chain.org.public_key()]);

        let mut handler = chain.handler.clone();
        handler.standard.trust_chain_signature = "00".repeat(64);

        assert!(matches!(
            verifier.verify_client(&chain.client, &handler),
            Err(TokenError::CreatorMismatch(_))
        ));
    }

    #[test]
    fn test_creator_must_be_chained_issuer() {
        let chain = chain();
        let verifier = ChainVerifier::new(vec![chain.org.public_key()]);

        // a handler whose org signature was never valid, with a client signed over it
        let mut handler = chain.handler.clone();
        handler
            .standard
            .set_chain_issuer_trust_signature(&chain.handler_key.sign(b"self signed").to_bytes());

        let mut client = chain.client.clone();
        let data = client
            .standard
            .chain_issuer_data(&handler.standard.trust_chain_signature)
            .unwrap();
        let sig = chain.handler_key.sign(&data);
        client
            .standard
            .set_chain_user_trust_signature(&handler, &sig.to_bytes());

        assert!(matches!(
            verifier.verify_client(&client, &handler),
            Err(TokenError::NotChainedIssuer { .. })
        ));
    }

    #[test]
    fn test_expired_tokens() {
        let chain = chain();
        let verifier = ChainVerifier::new(vec![chain.org.public_key()]);

        let mut client = chain.client.clone();
        client.standard.expires_at = Some(NumericDate::now() + Duration::minutes(-1));
        assert!(matches!(
            verifier.verify_client(&client, &chain.handler),
            Err(TokenError::TokenExpired { .. })
        ));

        let mut handler = chain.handler.clone();
        handler.standard.expires_at = Some(NumericDate::now() + Duration::minutes(-1));
        assert!(matches!(
            verifier.verify_issuer(&handler),
            Err(TokenError::TokenExpired { .. })
        ));
    }

    #[test]
    fn test_required_issuer_expiry() {
        let chain = chain();
        let verifier =
            ChainVerifier::new(vec![chain.org.public_key()]).with_required_issuer_expiry(true);

        assert!(verifier.verify_client(&chain.client, &chain.handler).is_ok());

        let mut client = chain.client.clone();
        client.standard.issuer_expires_at = None;
        assert!(matches!(
            verifier.verify_client(&client, &chain.handler),
            Err(TokenError::IssuerExpired)
        ));

        let permissive = ChainVerifier::new(vec![chain.org.public_key()]);
        assert!(permissive.verify_client(&client, &chain.handler).is_ok());
    }

    #[test]
    fn test_from_config() {
        let org = KeyPair::generate();
        let config = IssuerConfig {
            org_issuer_keys: vec![org.public_key_hex()],
            require_issuer_expiry: true,
            ..Default::default()
        };

        let verifier = ChainVerifier::from_config(&config).unwrap();
        assert_eq!(verifier.anchors(), &[org.public_key()]);
        assert!(verifier.require_issuer_expiry);

        let config = IssuerConfig {
            org_issuer_keys: vec!["not hex".into()],
            ..Default::default()
        };
        assert!(matches!(
            ChainVerifier::from_config(&config),
            Err(TokenError::InvalidPublicKey(_))
        ));
    }
}
