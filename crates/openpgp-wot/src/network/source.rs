//! Boundary traits for certificate sources and signature verification.
//!
//! The engine never parses key material or checks signatures itself. A
//! certificate store exposes its records through [`Certificate`] and
//! [`Signature`], and a [`SignatureVerifier`] renders the verdict.

use crate::error::Result;
use crate::synopsis::{Fingerprint, KeyId, RevocationState, SignatureMetadata};
use crate::time::ReferenceTime;

/// A third-party signature carried by a certificate.
pub trait Signature {
    /// Key ID of the issuing key, if the signature names one.
    fn issuer_key_id(&self) -> Option<KeyId>;

    /// Subpacket data relevant to trust computation.
    fn metadata(&self) -> SignatureMetadata;
}

/// A certificate as delivered by a certificate source, already evaluated
/// against the source's policy.
pub trait Certificate {
    type Signature: Signature;

    fn fingerprint(&self) -> Fingerprint;

    /// Key IDs of every signing-capable key, primary key first.
    fn signing_key_ids(&self) -> Vec<KeyId>;

    /// Return `true` if the certificate has a key allowed to certify
    /// other certificates.
    fn can_certify(&self) -> bool;

    /// Expiration of the certification capability, if any.
    fn certification_expiration(&self) -> Option<u64>;

    fn revocation_state(&self) -> RevocationState;

    /// Self-signed user IDs with their revocation states.
    fn user_ids(&self) -> Vec<(String, RevocationState)>;

    /// Third-party direct-key signatures over the primary key.
    fn delegations(&self) -> &[Self::Signature];

    /// Third-party signatures over `user_id`.
    fn certifications(&self, user_id: &str) -> &[Self::Signature];
}

/// Verification oracle.
///
/// An `Err` is a negative verdict: the builder logs it and moves on.
pub trait SignatureVerifier<C: Certificate> {
    /// Check a direct-key signature by `issuer` over `target`'s primary key.
    fn verify_delegation(
        &self,
        issuer: &C,
        target: &C,
        signature: &C::Signature,
        at: ReferenceTime,
    ) -> Result<()>;

    /// Check a signature by `issuer` over the binding of `user_id` to
    /// `target`.
    fn verify_certification(
        &self,
        issuer: &C,
        target: &C,
        user_id: &str,
        signature: &C::Signature,
        at: ReferenceTime,
    ) -> Result<()>;
}
