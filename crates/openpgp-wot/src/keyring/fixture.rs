//! Creating certificates and signing them.
//!
//! [`SecretCertificate`] holds a certificate's secret key next to its
//! public record, which is what the `wot` tooling and the test suites use
//! to build keyrings.

use crate::error::{Result, WotError};
use crate::synopsis::{Fingerprint, KeyId, TrustSignature};

use super::keys::{encode_public_key, Ed25519KeyPair};
use super::record::{
    CertificateRecord, KeyFlags, KeyRecord, RevocationRecord, SignatureKind, SignatureRecord,
    UserIdRecord,
};
use super::signing::sign_to_base64;

/// Parameters of a signature to be made.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrustParams {
    pub created: u64,
    pub expires: Option<u64>,
    pub exportable: Option<bool>,
    pub trust: Option<TrustSignature>,
    pub regexes: Vec<String>,
}

impl TrustParams {
    /// A plain signature created at `created`.
    pub fn at(created: u64) -> Self {
        Self {
            created,
            ..Self::default()
        }
    }

    pub fn expires(mut self, at: u64) -> Self {
        self.expires = Some(at);
        self
    }

    pub fn exportable(mut self, exportable: bool) -> Self {
        self.exportable = Some(exportable);
        self
    }

    /// Make this a trust signature with the given raw depth and amount.
    pub fn trust(mut self, depth: u8, amount: u8) -> Self {
        self.trust = Some(TrustSignature { depth, amount });
        self
    }

    pub fn regex(mut self, expression: impl Into<String>) -> Self {
        self.regexes.push(expression.into());
        self
    }
}

/// A certificate together with its secret key.
#[derive(Debug)]
pub struct SecretCertificate {
    key_pair: Ed25519KeyPair,
    record: CertificateRecord,
}

impl SecretCertificate {
    /// Generate a fresh certificate with the given user IDs.
    ///
    /// The primary key can certify and sign.
    pub fn generate<I, S>(user_ids: I, created: u64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::from_key_pair(Ed25519KeyPair::generate(), user_ids, created)
    }

    /// Like [`SecretCertificate::generate`] but with a known key pair.
    pub fn from_key_pair<I, S>(key_pair: Ed25519KeyPair, user_ids: I, created: u64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let record = CertificateRecord {
            fingerprint: key_pair.fingerprint(),
            primary_key: KeyRecord {
                public_key: encode_public_key(key_pair.verifying_key()),
                flags: KeyFlags {
                    certify: true,
                    sign: true,
                },
                created,
                expires: None,
            },
            subkeys: Vec::new(),
            revocation: None,
            user_ids: user_ids
                .into_iter()
                .map(|u| UserIdRecord {
                    value: u.as_ref().to_string(),
                    revocation: None,
                    certifications: Vec::new(),
                })
                .collect(),
            delegations: Vec::new(),
        };
        Self { key_pair, record }
    }

    /// Set when the certificate expires.
    pub fn with_expiration(mut self, at: u64) -> Self {
        self.record.primary_key.expires = Some(at);
        self
    }

    /// Replace the primary key's capabilities.
    pub fn with_flags(mut self, flags: KeyFlags) -> Self {
        self.record.primary_key.flags = flags;
        self
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        &self.record.fingerprint
    }

    pub fn key_id(&self) -> KeyId {
        self.key_pair.key_id()
    }

    pub fn record(&self) -> &CertificateRecord {
        &self.record
    }

    pub fn record_mut(&mut self) -> &mut CertificateRecord {
        &mut self.record
    }

    pub fn into_record(self) -> CertificateRecord {
        self.record
    }

    /// Add a user ID if not already present.
    pub fn add_user_id(&mut self, user_id: &str) {
        if self.record.user_id(user_id).is_none() {
            self.record.user_ids.push(UserIdRecord {
                value: user_id.to_string(),
                revocation: None,
                certifications: Vec::new(),
            });
        }
    }

    /// Revoke the certificate. A later call replaces the earlier revocation.
    pub fn revoke(&mut self, hard: bool, at: u64) {
        self.record.revocation = Some(RevocationRecord { hard, created: at });
    }

    /// Revoke one of the certificate's user IDs.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the certificate has no such user ID.
    pub fn revoke_user_id(&mut self, user_id: &str, hard: bool, at: u64) -> Result<()> {
        let uid = self
            .record
            .user_id_mut(user_id)
            .ok_or_else(|| WotError::NotFound(format!("user ID {user_id:?}")))?;
        uid.revocation = Some(RevocationRecord { hard, created: at });
        Ok(())
    }

    /// Certify `user_id` on `target`, attaching the signature to it.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the target has no such user ID.
    pub fn certify(
        &self,
        target: &mut CertificateRecord,
        user_id: &str,
        params: TrustParams,
    ) -> Result<()> {
        let signature = self.sign(
            SignatureKind::Certification,
            &target.fingerprint,
            Some(user_id),
            params,
        )?;
        let uid = target
            .user_id_mut(user_id)
            .ok_or_else(|| WotError::NotFound(format!("user ID {user_id:?}")))?;
        uid.certifications.push(signature);
        Ok(())
    }

    /// Sign `target`'s primary key, attaching the signature to it.
    pub fn delegate(
        &self,
        target: &mut CertificateRecord,
        params: TrustParams,
    ) -> Result<()> {
        let signature = self.sign(SignatureKind::Delegation, &target.fingerprint, None, params)?;
        target.delegations.push(signature);
        Ok(())
    }

    /// Withdraw an earlier delegation (`user_id` is `None`) or
    /// certification of `target`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the target has no such user ID.
    pub fn revoke_certification(
        &self,
        target: &mut CertificateRecord,
        user_id: Option<&str>,
        at: u64,
    ) -> Result<()> {
        let signature = self.sign(
            SignatureKind::Revocation,
            &target.fingerprint,
            user_id,
            TrustParams::at(at),
        )?;
        match user_id {
            None => target.delegations.push(signature),
            Some(user_id) => target
                .user_id_mut(user_id)
                .ok_or_else(|| WotError::NotFound(format!("user ID {user_id:?}")))?
                .certifications
                .push(signature),
        }
        Ok(())
    }

    fn sign(
        &self,
        kind: SignatureKind,
        target: &Fingerprint,
        user_id: Option<&str>,
        params: TrustParams,
    ) -> Result<SignatureRecord> {
        let mut record = SignatureRecord {
            kind,
            issuer: self.key_id(),
            created: params.created,
            expires: params.expires,
            exportable: params.exportable,
            trust: params.trust,
            regexes: params.regexes,
            signature: String::new(),
        };
        let payload = record.payload(target, user_id)?;
        record.signature = sign_to_base64(self.key_pair.signing_key(), &payload);
        Ok(record)
    }
}
