//! Certificate fingerprints and key IDs.

use serde::{Deserialize, Serialize};

use crate::error::{Result, WotError};

/// Fingerprint of a certificate's primary key: upper-case hex.
///
/// The primary key of the node set; globally unique within a network.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Parse a fingerprint from hex. Whitespace is ignored and case is
    /// normalized.
    pub fn new(hex: &str) -> Result<Self> {
        let normalized: String = hex
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| c.to_ascii_uppercase())
            .collect();

        if normalized.is_empty() || !normalized.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(WotError::InvalidFingerprint(hex.to_string()));
        }
        Ok(Self(normalized))
    }

    /// Derive a fingerprint from raw digest bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(hex::encode_upper(bytes))
    }

    /// The fingerprint as upper-case hex.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The key ID: the low 64 bits of the fingerprint.
    pub fn key_id(&self) -> KeyId {
        let start = self.0.len().saturating_sub(16);
        // Validated as hex on construction.
        KeyId(u64::from_str_radix(&self.0[start..], 16).unwrap_or_default())
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Fingerprint {
    type Err = WotError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for Fingerprint {
    type Error = WotError;

    fn try_from(s: String) -> Result<Self> {
        Self::new(&s)
    }
}

impl From<Fingerprint> for String {
    fn from(fpr: Fingerprint) -> Self {
        fpr.0
    }
}

/// A 64-bit key ID, as carried in a signature's issuer subpacket.
///
/// Key IDs may collide; lookups by key ID yield candidate sets.
/// Serialized as 16 hex digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct KeyId(pub u64);

impl std::fmt::Display for KeyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016X}", self.0)
    }
}

impl std::str::FromStr for KeyId {
    type Err = WotError;

    fn from_str(s: &str) -> Result<Self> {
        u64::from_str_radix(s, 16)
            .map(KeyId)
            .map_err(|_| WotError::InvalidFingerprint(format!("invalid key id: {s}")))
    }
}

impl TryFrom<String> for KeyId {
    type Error = WotError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<KeyId> for String {
    fn from(key_id: KeyId) -> Self {
        key_id.to_string()
    }
}
