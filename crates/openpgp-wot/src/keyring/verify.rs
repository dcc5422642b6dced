//! Policy checks and Ed25519 verification of keyring signatures.

use crate::error::{Result, WotError};
use crate::network::{Certificate, SignatureVerifier};
use crate::synopsis::RevocationState;
use crate::time::ReferenceTime;

use super::keys::decode_public_key;
use super::record::{CertificateRecord, SignatureKind, SignatureRecord};
use super::signing::verify_from_base64;

/// Verifies keyring signatures for the network builder.
///
/// A signature is accepted when it has the right type, is in effect at the
/// reference time, was made while the issuer was able to certify, does not
/// predate its target, and carries a valid Ed25519 signature by a
/// certification-capable key of the issuer.
#[derive(Debug, Clone, Default)]
pub struct Ed25519Verifier {
    /// Accept signatures marked non-exportable.
    pub accept_local: bool,
}

impl Ed25519Verifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accept_local(mut self, accept: bool) -> Self {
        self.accept_local = accept;
        self
    }

    fn check(
        &self,
        issuer: &CertificateRecord,
        target: &CertificateRecord,
        user_id: Option<&str>,
        signature: &SignatureRecord,
        at: ReferenceTime,
    ) -> Result<()> {
        let expected = if user_id.is_some() {
            SignatureKind::Certification
        } else {
            SignatureKind::Delegation
        };
        if signature.kind != expected && signature.kind != SignatureKind::Revocation {
            return Err(WotError::SignatureRejected(format!(
                "unexpected signature type {:?}",
                signature.kind
            )));
        }

        if !self.accept_local && signature.exportable == Some(false) {
            return Err(WotError::SignatureRejected("not exportable".into()));
        }

        let created = signature.created;
        let now = at.timestamp();
        if created > now {
            return Err(WotError::SignatureRejected(format!(
                "created after the reference time {at}"
            )));
        }
        if signature.expires.is_some_and(|exp| exp <= now) {
            return Err(WotError::SignatureRejected("expired".into()));
        }

        let key = issuer.key(signature.issuer).ok_or_else(|| {
            WotError::SignatureRejected(format!("issuer has no key {}", signature.issuer))
        })?;
        if !key.flags.certify {
            return Err(WotError::SignatureRejected(format!(
                "key {} is not certification-capable",
                signature.issuer
            )));
        }
        if created < key.created {
            return Err(WotError::SignatureRejected("predates the signing key".into()));
        }
        if key.expires.is_some_and(|exp| created >= exp) {
            return Err(WotError::SignatureRejected(
                "made after the signing key expired".into(),
            ));
        }
        if issuer
            .primary_key
            .expires
            .is_some_and(|exp| created >= exp)
        {
            return Err(WotError::SignatureRejected(
                "made after the issuer expired".into(),
            ));
        }

        match issuer.revocation_state() {
            RevocationState::HardRevoked => {
                return Err(WotError::SignatureRejected("issuer is hard revoked".into()));
            }
            RevocationState::SoftRevoked { since } if created > since => {
                return Err(WotError::SignatureRejected(
                    "made after the issuer was revoked".into(),
                ));
            }
            _ => {}
        }

        if created < target.created() {
            return Err(WotError::SignatureRejected("predates the target key".into()));
        }

        let verifying_key = decode_public_key(&key.public_key)?;
        let payload = signature.payload(&target.fingerprint, user_id)?;
        verify_from_base64(&verifying_key, &payload, &signature.signature)
    }
}

impl SignatureVerifier<CertificateRecord> for Ed25519Verifier {
    fn verify_delegation(
        &self,
        issuer: &CertificateRecord,
        target: &CertificateRecord,
        signature: &SignatureRecord,
        at: ReferenceTime,
    ) -> Result<()> {
        self.check(issuer, target, None, signature, at)
    }

    fn verify_certification(
        &self,
        issuer: &CertificateRecord,
        target: &CertificateRecord,
        user_id: &str,
        signature: &SignatureRecord,
        at: ReferenceTime,
    ) -> Result<()> {
        self.check(issuer, target, Some(user_id), signature, at)
    }
}
