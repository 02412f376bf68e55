//! Error types for the trustchain tokens crate.

use thiserror::Error;

/// Errors that can occur while building or verifying a trust chain.
#[derive(Debug, Error)]
pub enum TokenError {
    /// The token has no id.
    #[error("id not set")]
    MissingId,

    /// The token has no subject public key.
    #[error("no public key set")]
    MissingPublicKey,

    /// The token has no issuer.
    #[error("no issuer set")]
    MissingIssuer,

    /// The token has no trust chain signature.
    #[error("no trust chain signature set")]
    MissingTrustChainSignature,

    /// The issued at time is unset or zero.
    #[error("no issued time set")]
    MissingIssuedAt,

    /// The expiry time is unset or zero.
    #[error("no expires set")]
    MissingExpiresAt,

    /// The token id is not a time-ordered identifier.
    #[error("invalid token id format")]
    InvalidIdentifierFormat,

    /// The time embedded in the token id differs from the issued at time.
    #[error("id is not based on issued time")]
    IdentifierTimeMismatch,

    /// The issuer is not a chain issuer.
    #[error("invalid issuer prefix")]
    InvalidIssuerPrefix,

    /// The chain issuer is not `<id>.<public key>`.
    #[error("invalid issuer data")]
    InvalidIssuerData,

    /// The supplied anchor key is not the key named by an org issuer.
    #[error("public keys do not match")]
    AnchorKeyMismatch,

    /// A signature in the trust chain signature is not valid hex.
    #[error("invalid signature encoding in trust chain signature: {0}")]
    InvalidSignatureEncoding(#[source] hex::FromHexError),

    /// The chain issuer does not split into two parts.
    #[error("invalid issuer content")]
    InvalidIssuerContent,

    /// The chain issuer has an empty id.
    #[error("invalid id in issuer")]
    InvalidIssuerId,

    /// The chain issuer has an empty public key.
    #[error("invalid public key in issuer")]
    InvalidIssuerPublicKey,

    /// The chain issuer public key is not a hex-encoded Ed25519 key.
    #[error("invalid public key in issuer data")]
    InvalidIssuerKeyEncoding,

    /// The trust chain signature is not `<parent signature>.<signature>`.
    #[error("invalid trust chain signature")]
    InvalidTrustChainSignature,

    /// The creator named in the issuer did not sign this token.
    #[error("invalid chain signature")]
    InvalidChainSignature,

    /// The issuer is in neither the org issuer nor the chain issuer format.
    #[error("unsupported issuer format")]
    UnsupportedIssuerFormat,

    /// The token expired.
    #[error("token has expired at {expired_at}")]
    TokenExpired { expired_at: String },

    /// The issuer of a chained token expired.
    #[error("token issuer has expired")]
    IssuerExpired,

    /// No configured org issuer signed the token.
    #[error("token is not signed by a trusted org issuer")]
    UntrustedIssuer,

    /// The token is not allowed to issue other tokens.
    #[error("token {id} is not a chained issuer")]
    NotChainedIssuer { id: String },

    /// The supplied creator token is not the one that issued the client.
    #[error("creator token does not match issuer: {0}")]
    CreatorMismatch(String),

    /// Failed to parse private key.
    #[error("failed to parse private key: {0}")]
    InvalidPrivateKey(String),

    /// Failed to parse public key.
    #[error("failed to parse public key: {0}")]
    InvalidPublicKey(String),

    /// Failed to serialize/deserialize claims.
    #[error("claims serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// IO error (reading/writing keys).
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Configuration error.
    #[error(transparent)]
    Config(#[from] trustchain_core::ConfigError),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TokenError>;
