//! Certificate records: the keyring's public data model.
//!
//! A record carries the certificate's keys, its self-asserted state
//! (user IDs, revocations, expiry) and the third-party signatures made on
//! it. Self-asserted state is taken as given; third-party signatures are
//! what the verifier checks.

use serde::{Deserialize, Serialize};

use crate::error::{Result, WotError};
use crate::network::{Certificate, Signature};
use crate::synopsis::{Fingerprint, KeyId, RevocationState, SignatureMetadata, TrustSignature};

use super::keys::{decode_public_key, fingerprint_of};

/// Capabilities of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KeyFlags {
    /// May certify other certificates.
    pub certify: bool,
    /// May sign data.
    pub sign: bool,
}

/// A public key of a certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyRecord {
    /// Base64-encoded Ed25519 public key.
    pub public_key: String,
    pub flags: KeyFlags,
    pub created: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<u64>,
}

impl KeyRecord {
    /// The key's fingerprint, or `None` if the public key is malformed.
    pub fn fingerprint(&self) -> Option<Fingerprint> {
        decode_public_key(&self.public_key)
            .ok()
            .map(|key| fingerprint_of(&key))
    }

    pub fn key_id(&self) -> Option<KeyId> {
        self.fingerprint().map(|fpr| fpr.key_id())
    }

    pub fn is_signing_capable(&self) -> bool {
        self.flags.certify || self.flags.sign
    }
}

/// A revocation of a certificate or user ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevocationRecord {
    /// Hard revocations (e.g. key compromise) apply regardless of time.
    pub hard: bool,
    pub created: u64,
}

impl RevocationRecord {
    pub fn state(&self) -> RevocationState {
        if self.hard {
            RevocationState::HardRevoked
        } else {
            RevocationState::SoftRevoked {
                since: self.created,
            }
        }
    }
}

/// Type of a third-party signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignatureKind {
    /// Over the target's primary key.
    Delegation,
    /// Over one of the target's user IDs.
    Certification,
    /// Withdraws an earlier delegation or certification.
    Revocation,
}

/// A third-party signature on a certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureRecord {
    pub kind: SignatureKind,
    /// Key ID of the issuing key.
    pub issuer: KeyId,
    pub created: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exportable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trust: Option<TrustSignature>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub regexes: Vec<String>,
    /// Base64-encoded Ed25519 signature over [`SignatureRecord::payload`].
    pub signature: String,
}

/// The signed content of a signature: its own fields plus what it binds.
#[derive(Serialize)]
struct SignedPayload<'a> {
    kind: SignatureKind,
    issuer: KeyId,
    target: &'a Fingerprint,
    user_id: Option<&'a str>,
    created: u64,
    expires: Option<u64>,
    exportable: Option<bool>,
    trust: Option<TrustSignature>,
    regexes: &'a [String],
}

impl SignatureRecord {
    /// The canonical bytes signed by this signature when made over
    /// `target` (and `user_id`, for certifications).
    pub fn payload(&self, target: &Fingerprint, user_id: Option<&str>) -> Result<Vec<u8>> {
        serde_json::to_vec(&SignedPayload {
            kind: self.kind,
            issuer: self.issuer,
            target,
            user_id,
            created: self.created,
            expires: self.expires,
            exportable: self.exportable,
            trust: self.trust,
            regexes: &self.regexes,
        })
        .map_err(|e| WotError::SerializationError(e.to_string()))
    }

    pub fn is_revocation(&self) -> bool {
        self.kind == SignatureKind::Revocation
    }
}

impl Signature for SignatureRecord {
    fn issuer_key_id(&self) -> Option<KeyId> {
        Some(self.issuer)
    }

    fn metadata(&self) -> SignatureMetadata {
        SignatureMetadata {
            creation_time: self.created,
            expiration_time: self.expires,
            exportable: self.exportable,
            trust: self.trust,
            regexes: self.regexes.clone(),
            revocation: self.is_revocation(),
        }
    }
}

/// A user ID with its revocation and the certifications made on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdRecord {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revocation: Option<RevocationRecord>,
    #[serde(default)]
    pub certifications: Vec<SignatureRecord>,
}

/// A public certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateRecord {
    pub fingerprint: Fingerprint,
    pub primary_key: KeyRecord,
    #[serde(default)]
    pub subkeys: Vec<KeyRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revocation: Option<RevocationRecord>,
    #[serde(default)]
    pub user_ids: Vec<UserIdRecord>,
    #[serde(default)]
    pub delegations: Vec<SignatureRecord>,
}

impl CertificateRecord {
    /// Check that the primary key decodes and matches the fingerprint.
    ///
    /// # Errors
    ///
    /// Returns `InvalidKey` for a malformed primary key and
    /// `InvalidFingerprint` when the fingerprint does not match it.
    pub fn validate(&self) -> Result<()> {
        let key = decode_public_key(&self.primary_key.public_key)?;
        let derived = fingerprint_of(&key);
        if derived != self.fingerprint {
            return Err(WotError::InvalidFingerprint(format!(
                "{} does not match primary key {}",
                self.fingerprint, derived
            )));
        }
        Ok(())
    }

    pub fn created(&self) -> u64 {
        self.primary_key.created
    }

    pub fn user_id(&self, value: &str) -> Option<&UserIdRecord> {
        self.user_ids.iter().find(|u| u.value == value)
    }

    pub fn user_id_mut(&mut self, value: &str) -> Option<&mut UserIdRecord> {
        self.user_ids.iter_mut().find(|u| u.value == value)
    }

    /// All keys, primary first.
    pub fn keys(&self) -> impl Iterator<Item = &KeyRecord> {
        std::iter::once(&self.primary_key).chain(self.subkeys.iter())
    }

    /// The key with `key_id`.
    pub fn key(&self, key_id: KeyId) -> Option<&KeyRecord> {
        self.keys().find(|k| k.key_id() == Some(key_id))
    }

    /// The first certification-capable key, primary first.
    fn certification_key(&self) -> Option<&KeyRecord> {
        self.keys().find(|k| k.flags.certify)
    }
}

impl Certificate for CertificateRecord {
    type Signature = SignatureRecord;

    fn fingerprint(&self) -> Fingerprint {
        self.fingerprint.clone()
    }

    fn signing_key_ids(&self) -> Vec<KeyId> {
        self.keys()
            .filter(|k| k.is_signing_capable())
            .filter_map(KeyRecord::key_id)
            .collect()
    }

    fn can_certify(&self) -> bool {
        self.certification_key().is_some()
    }

    fn certification_expiration(&self) -> Option<u64> {
        self.certification_key().and_then(|k| k.expires)
    }

    fn revocation_state(&self) -> RevocationState {
        self.revocation
            .map(|r| r.state())
            .unwrap_or(RevocationState::NotRevoked)
    }

    fn user_ids(&self) -> Vec<(String, RevocationState)> {
        self.user_ids
            .iter()
            .map(|u| {
                let state = u
                    .revocation
                    .map(|r| r.state())
                    .unwrap_or(RevocationState::NotRevoked);
                (u.value.clone(), state)
            })
            .collect()
    }

    fn delegations(&self) -> &[SignatureRecord] {
        &self.delegations
    }

    fn certifications(&self, user_id: &str) -> &[SignatureRecord] {
        self.user_id(user_id)
            .map(|u| u.certifications.as_slice())
            .unwrap_or(&[])
    }
}
