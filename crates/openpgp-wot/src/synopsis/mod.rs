//! Certificate synopsis model: the node and edge data of the trust graph.
//!
//! - [`CertSynopsis`]: immutable summary of one certificate (a node).
//! - [`Certification`]: one verified delegation or certification.
//! - [`CertificationSet`]: all certifications one issuer made on one
//!   target, grouped by user ID (an edge).

pub mod cert_synopsis;
pub mod certification;
pub mod certification_set;
pub mod fingerprint;
pub mod revocation;

pub use cert_synopsis::CertSynopsis;
pub use certification::{Certification, SignatureMetadata, TrustSignature};
pub use certification_set::CertificationSet;
pub use fingerprint::{Fingerprint, KeyId};
pub use revocation::RevocationState;
