//! Keypair management for trust chain signatures.

use crate::error::{Result, TokenError};
use ed25519_dalek::{Signer, SigningKey, Verifier};
use rand::RngCore;
use std::path::Path;

pub use ed25519_dalek::{Signature, VerifyingKey as PublicKey};

/// An Ed25519 keypair used by org issuers and chain issuers to sign chain data.
#[derive(Clone)]
pub struct KeyPair {
    inner: SigningKey,
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key_hex())
            .finish_non_exhaustive()
    }
}

impl KeyPair {
    /// Generate a new random keypair.
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        let mut bytes = [0u8; 32];
        rng.fill_bytes(&mut bytes);

        Self {
            inner: SigningKey::from_bytes(&bytes),
        }
    }

    /// Load a keypair from private key bytes.
    pub fn from_private_key_bytes(bytes: &[u8]) -> Result<Self> {
        let bytes: [u8; 32] = bytes.try_into().map_err(|_| {
            TokenError::InvalidPrivateKey(format!("expected 32 bytes, got {}", bytes.len()))
        })?;

        Ok(Self {
            inner: SigningKey::from_bytes(&bytes),
        })
    }

    /// Load a keypair from a hex-encoded private key string.
    pub fn from_private_key_hex(hex: &str) -> Result<Self> {
        let bytes =
            hex::decode(hex.trim()).map_err(|e| TokenError::InvalidPrivateKey(e.to_string()))?;
        Self::from_private_key_bytes(&bytes)
    }

    /// Get the public key.
    pub fn public_key(&self) -> PublicKey {
        self.inner.verifying_key()
    }

    /// Get the private key as hex string.
    pub fn private_key_hex(&self) -> String {
        hex::encode(self.inner.to_bytes())
    }

    /// Get the public key as hex string.
    pub fn public_key_hex(&self) -> String {
        encode_public_key(&self.public_key())
    }

    /// Sign `data` with the private key.
    pub fn sign(&self, data: &[u8]) -> Signature {
        self.inner.sign(data)
    }

    /// Save the keypair to files.
    pub fn save_to_files(&self, private_key_path: &Path, public_key_path: &Path) -> Result<()> {
        std::fs::write(private_key_path, self.private_key_hex())?;
        std::fs::write(public_key_path, self.public_key_hex())?;
        Ok(())
    }

    /// Load a keypair from a private key file.
    pub fn load_from_file(private_key_path: &Path) -> Result<Self> {
        let hex = std::fs::read_to_string(private_key_path)?;
        Self::from_private_key_hex(hex.trim())
    }
}

/// Lowercase hex encoding of a public key, as used in `iss` and `public_key` claims.
pub fn encode_public_key(public_key: &PublicKey) -> String {
    hex::encode(public_key.as_bytes())
}

/// Load a public key from raw bytes.
pub fn load_public_key_bytes(bytes: &[u8]) -> Result<PublicKey> {
    PublicKey::try_from(bytes).map_err(|e| TokenError::InvalidPublicKey(e.to_string()))
}

/// Load a public key from hex string (for verification-only scenarios).
pub fn load_public_key_hex(hex: &str) -> Result<PublicKey> {
    let bytes = hex::decode(hex.trim()).map_err(|e| TokenError::InvalidPublicKey(e.to_string()))?;
    load_public_key_bytes(&bytes)
}

/// Load a public key from a file.
pub fn load_public_key_file(path: &Path) -> Result<PublicKey> {
    let hex = std::fs::read_to_string(path)?;
    load_public_key_hex(hex.trim())
}

/// Verify an Ed25519 signature given as raw bytes.
///
/// A signature of the wrong length fails verification.
pub fn ed25519_verify(public_key: &PublicKey, data: &[u8], signature: &[u8]) -> bool {
    match Signature::from_slice(signature) {
        Ok(sig) => public_key.verify(data, &sig).is_ok(),
        Err(_) => false,
    }
}
