//! A self-contained certificate source.
//!
//! Certificates are JSON records whose keys are Ed25519 keys; every
//! third-party signature is an Ed25519 signature over a canonical JSON
//! payload. [`Ed25519Verifier`] checks them for the network builder and
//! [`KeyringStore`] keeps records in a directory.

pub mod fixture;
pub mod keys;
pub mod record;
pub mod signing;
pub mod store;
pub mod verify;

pub use fixture::{SecretCertificate, TrustParams};
pub use keys::Ed25519KeyPair;
pub use record::{
    CertificateRecord, KeyFlags, KeyRecord, RevocationRecord, SignatureKind, SignatureRecord,
    UserIdRecord,
};
pub use store::KeyringStore;
pub use verify::Ed25519Verifier;
