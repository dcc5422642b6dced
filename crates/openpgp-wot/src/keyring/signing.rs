//! Ed25519 signing and verification of signature payloads.
//!
//! Signatures travel as standard base64 over the canonical payload bytes.

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};

use crate::error::{Result, WotError};

/// Signs `payload` and encodes the 64-byte signature.
pub fn sign_to_base64(signing_key: &SigningKey, payload: &[u8]) -> String {
    B64.encode(signing_key.sign(payload).to_bytes())
}

/// Checks an encoded signature over `payload`.
///
/// Malformed encodings are reported as `InvalidKey`; a well-formed
/// signature that does not verify is `SignatureInvalid`.
pub fn verify_from_base64(verifying_key: &VerifyingKey, payload: &[u8], encoded: &str) -> Result<()> {
    let signature = decode_signature(encoded)?;
    verifying_key
        .verify(payload, &signature)
        .map_err(|_| WotError::SignatureInvalid)
}

fn decode_signature(encoded: &str) -> Result<Signature> {
    let raw = B64
        .decode(encoded)
        .map_err(|e| WotError::InvalidKey(format!("signature is not base64: {e}")))?;
    let bytes: [u8; 64] = raw.as_slice().try_into().map_err(|_| {
        WotError::InvalidKey(format!("signature has {} bytes, expected 64", raw.len()))
    })?;
    Ok(Signature::from_bytes(&bytes))
}
