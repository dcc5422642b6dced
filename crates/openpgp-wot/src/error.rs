//! Error types for the Web of Trust engine.
//!
//! Contract violations (malformed depths, mismatched certification sets,
//! invalid path extensions) are returned to the caller. Failures that only
//! affect a single certificate or signature during network construction are
//! logged and absorbed by the builder instead.

use crate::synopsis::Fingerprint;

/// Error types covering all operations.
#[derive(Debug, thiserror::Error)]
pub enum WotError {
    #[error("Trust depth out of range: {0} (must be 0..=255)")]
    DepthOutOfRange(u32),

    #[error("Trust depth exhausted: cannot decrease {depth} by {by}")]
    DepthExhausted { depth: u8, by: u8 },

    #[error("Invalid regular expression: {0}")]
    InvalidRegex(String),

    #[error("Invalid fingerprint: {0}")]
    InvalidFingerprint(String),

    #[error("Issuer fingerprint mismatch: expected {expected}, got {actual}")]
    IssuerMismatch {
        expected: Fingerprint,
        actual: Fingerprint,
    },

    #[error("Target fingerprint mismatch: expected {expected}, got {actual}")]
    TargetMismatch {
        expected: Fingerprint,
        actual: Fingerprint,
    },

    #[error("Path tail {tail} is not the issuer {issuer} of the certification")]
    NotIssuer {
        tail: Fingerprint,
        issuer: Fingerprint,
    },

    #[error("Appending the certification would create a cycle at {0}")]
    Cycle(Fingerprint),

    #[error("No usable certification from {issuer} on {target}")]
    MissingCertification {
        issuer: Fingerprint,
        target: Fingerprint,
    },

    #[error("Trust amount {amount} exceeds the path's amount {path_amount}")]
    AmountExceedsPath { amount: u8, path_amount: u8 },

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Signature verification failed")]
    SignatureInvalid,

    #[error("Signature rejected by policy: {0}")]
    SignatureRejected(String),

    #[error("Certificate not found: {0}")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid file format: {0}")]
    InvalidFileFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, WotError>;
