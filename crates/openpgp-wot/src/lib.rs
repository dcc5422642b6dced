//! OpenPGP Web of Trust: trust graph construction and path evaluation.
//!
//! Builds a directed graph of certificate synopses and certification sets
//! from a certificate snapshot, and authenticates bindings of user IDs to
//! certificates by searching bounded-depth, bounded-amount paths from
//! trust roots, following trust-signature semantics.
//!
//! The `keyring` module provides a self-contained certificate source with
//! Ed25519 signatures, a matching verifier, and a directory store.

pub mod authority;
pub mod error;
pub mod keyring;
pub mod network;
pub mod query;
pub mod synopsis;
pub mod time;
pub mod trust;

// Re-export primary types
pub use authority::{Authorization, Binding, CertificateAuthority, Denial, QueryConfig};
pub use error::{Result, WotError};
pub use network::{Certificate, Network, NetworkAssembler, NetworkBuilder, Signature, SignatureVerifier};
pub use query::{NetworkMode, Path, Paths, Query, Root, Roots};
pub use synopsis::{
    CertSynopsis, Certification, CertificationSet, Fingerprint, KeyId, RevocationState,
    SignatureMetadata, TrustSignature,
};
pub use time::ReferenceTime;
pub use trust::{AuthenticationLevel, Depth, RegexSet};

// Re-export keyring types
pub use keyring::{
    CertificateRecord, Ed25519Verifier, KeyringStore, SecretCertificate, SignatureRecord,
};
