//! Ed25519 key pairs and key fingerprints.
//!
//! A key's fingerprint is derived from its public half, so a record can
//! be checked against the name it is stored under without trusting it.

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use ed25519_dalek::{SigningKey, VerifyingKey};
use sha2::{Digest, Sha256};

use crate::error::{Result, WotError};
use crate::synopsis::{Fingerprint, KeyId};

/// Fingerprint length in bytes (160 bits, as for v4 OpenPGP keys).
const FINGERPRINT_LEN: usize = 20;

/// Secret and public halves of a certifying key.
pub struct Ed25519KeyPair {
    secret: SigningKey,
    public: VerifyingKey,
}

impl From<SigningKey> for Ed25519KeyPair {
    fn from(secret: SigningKey) -> Self {
        let public = secret.verifying_key();
        Self { secret, public }
    }
}

impl Ed25519KeyPair {
    /// Fresh key from the thread-local RNG.
    pub fn generate() -> Self {
        SigningKey::generate(&mut rand::thread_rng()).into()
    }

    /// Rebuild a key pair from its 32 secret bytes.
    pub fn from_signing_key_bytes(bytes: &[u8; 32]) -> Self {
        SigningKey::from_bytes(bytes).into()
    }

    pub fn signing_key(&self) -> &SigningKey {
        &self.secret
    }

    pub fn verifying_key(&self) -> &VerifyingKey {
        &self.public
    }

    pub fn fingerprint(&self) -> Fingerprint {
        fingerprint_of(&self.public)
    }

    pub fn key_id(&self) -> KeyId {
        self.fingerprint().key_id()
    }
}

impl std::fmt::Debug for Ed25519KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ed25519KeyPair")
            .field("fingerprint", &self.fingerprint())
            .finish_non_exhaustive()
    }
}

/// Fingerprint of a public key: the leading 160 bits of its SHA-256.
pub fn fingerprint_of(key: &VerifyingKey) -> Fingerprint {
    let digest = Sha256::digest(key.as_bytes());
    Fingerprint::from_bytes(&digest[..FINGERPRINT_LEN])
}

/// Public key as stored in a certificate record.
pub fn encode_public_key(key: &VerifyingKey) -> String {
    B64.encode(key.as_bytes())
}

/// Parses the `public_key` field of a certificate record.
pub fn decode_public_key(encoded: &str) -> Result<VerifyingKey> {
    let raw = B64
        .decode(encoded)
        .map_err(|e| WotError::InvalidKey(format!("public key is not base64: {e}")))?;
    let bytes: [u8; 32] = raw.as_slice().try_into().map_err(|_| {
        WotError::InvalidKey(format!("public key has {} bytes, expected 32", raw.len()))
    })?;
    VerifyingKey::from_bytes(&bytes)
        .map_err(|e| WotError::InvalidKey(format!("not an Ed25519 point: {e}")))
}
