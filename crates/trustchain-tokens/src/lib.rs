//! # trustchain-tokens
//!
//! Delegated trust chains for Ed25519 signed identity tokens.
//!
//! An **org issuer** vouches for **chain issuers** (login handlers,
//! provisioners) which in turn vouch for the clients they create. A verifier
//! that trusts the org issuer key can check any client without contacting the
//! org issuer:
//!
//! | Token | Signed by | `iss` |
//! |-------|-----------|-------|
//! | Chain issuer | Org issuer | `I-<hex org key>` |
//! | Client | Chain issuer | `C-<creator id>.<hex creator key>` |
//!
//! This crate covers the claims, the chain data each party signs and the
//! verification of both links. Encoding and signing of the outer token
//! envelope is left to the caller.
//!
//! ```no_run
//! use chrono::Duration;
//! use trustchain_tokens::{ChainVerifier, ClientIdClaims, KeyPair};
//!
//! let org = KeyPair::generate();
//! let handler_key = KeyPair::generate();
//!
//! let mut handler = ClientIdClaims::new("handler", Duration::hours(1), &handler_key.public_key());
//! handler.standard.set_org_issuer(&org.public_key());
//! let sig = org.sign(&handler.standard.org_issuer_chain_data()?);
//! handler.standard.set_chain_issuer_trust_signature(&sig.to_bytes());
//!
//! let client_key = KeyPair::generate();
//! let mut client = ClientIdClaims::new("user=alice", Duration::minutes(10), &client_key.public_key());
//! client.standard.set_chain_issuer(&handler)?;
//! let data = client.standard.chain_issuer_data(&handler.standard.trust_chain_signature)?;
//! client.standard.set_chain_user_trust_signature(&handler, &handler_key.sign(&data).to_bytes());
//!
//! let verified = ChainVerifier::new(vec![org.public_key()]).verify_client(&client, &handler)?;
//! assert_eq!(verified.chain_issuer, handler_key.public_key());
//! # Ok::<(), trustchain_tokens::TokenError>(())
//! ```

pub mod chain;
pub mod claims;
pub mod date;
pub mod error;
mod expiry;
pub mod identifier;
pub mod keys;
pub mod verifier;
mod verify;

pub use chain::{CHAIN_ISSUER_PREFIX, ORG_ISSUER_PREFIX};
pub use claims::{Claims, ClientIdClaims, Purpose, ServerClaims, StandardClaims};
pub use date::NumericDate;
pub use error::TokenError;
pub use identifier::{identifier_time, new_token_id, verify_identifier_time};
pub use keys::{KeyPair, PublicKey, Signature};
pub use verifier::{ChainVerifier, VerifiedChain};
