//! Certifications: the atomic trust statements between certificates.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::trust::{Depth, RegexSet, DEFAULT_TRUST_AMOUNT};

use super::CertSynopsis;

/// Trust signature subpacket: depth and amount as carried on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustSignature {
    /// Raw depth; 255 means unconstrained.
    pub depth: u8,
    pub amount: u8,
}

/// The subpacket data of a verified signature that matters for trust.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SignatureMetadata {
    pub creation_time: u64,
    pub expiration_time: Option<u64>,
    /// `None` means the subpacket is absent (exportable).
    pub exportable: Option<bool>,
    pub trust: Option<TrustSignature>,
    pub regexes: Vec<String>,
    /// Certification revocation rather than certification.
    pub revocation: bool,
}

/// One certification by `issuer` over `target`.
///
/// Without a user ID this is a delegation: trust is placed in the key
/// itself rather than in one of its bindings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certification {
    issuer: Arc<CertSynopsis>,
    target: Arc<CertSynopsis>,
    user_id: Option<String>,
    creation_time: u64,
    expiration_time: Option<u64>,
    exportable: bool,
    trust_amount: u8,
    trust_depth: Depth,
    regexes: RegexSet,
}

impl Certification {
    /// A plain certification: amount 120, depth 0, wildcard scope.
    pub fn new(
        issuer: Arc<CertSynopsis>,
        target: Arc<CertSynopsis>,
        user_id: Option<String>,
        creation_time: u64,
    ) -> Self {
        Self {
            issuer,
            target,
            user_id,
            creation_time,
            expiration_time: None,
            exportable: true,
            trust_amount: DEFAULT_TRUST_AMOUNT,
            trust_depth: Depth::Limited(0),
            regexes: RegexSet::wildcard(),
        }
    }

    /// Materialize a verified signature.
    ///
    /// A certification revocation becomes a certification with amount 0
    /// and depth 0, which replaces the revoked certification by recency.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRegex` if a regular expression subpacket does not
    /// compile.
    pub fn from_signature(
        issuer: Arc<CertSynopsis>,
        target: Arc<CertSynopsis>,
        user_id: Option<String>,
        metadata: &SignatureMetadata,
    ) -> Result<Self> {
        let mut certification = Self::new(issuer, target, user_id, metadata.creation_time)
            .with_expiration_time(metadata.expiration_time)
            .with_exportable(metadata.exportable.unwrap_or(true));

        if metadata.revocation {
            return Ok(certification.with_trust(Depth::Limited(0), 0));
        }

        if let Some(trust) = metadata.trust {
            certification = certification.with_trust(Depth::auto(trust.depth), trust.amount);
        }
        if !metadata.regexes.is_empty() {
            certification =
                certification.with_regexes(RegexSet::from_expressions(&metadata.regexes)?);
        }
        Ok(certification)
    }

    pub fn with_expiration_time(mut self, expiration_time: Option<u64>) -> Self {
        self.expiration_time = expiration_time;
        self
    }

    pub fn with_exportable(mut self, exportable: bool) -> Self {
        self.exportable = exportable;
        self
    }

    pub fn with_trust(mut self, depth: Depth, amount: u8) -> Self {
        self.trust_depth = depth;
        self.trust_amount = amount;
        self
    }

    pub fn with_regexes(mut self, regexes: RegexSet) -> Self {
        self.regexes = regexes;
        self
    }

    pub fn issuer(&self) -> &Arc<CertSynopsis> {
        &self.issuer
    }

    pub fn target(&self) -> &Arc<CertSynopsis> {
        &self.target
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn creation_time(&self) -> u64 {
        self.creation_time
    }

    pub fn expiration_time(&self) -> Option<u64> {
        self.expiration_time
    }

    pub fn exportable(&self) -> bool {
        self.exportable
    }

    pub fn trust_amount(&self) -> u8 {
        self.trust_amount
    }

    pub fn trust_depth(&self) -> Depth {
        self.trust_depth
    }

    pub fn regexes(&self) -> &RegexSet {
        &self.regexes
    }

    pub fn is_delegation(&self) -> bool {
        self.user_id.is_none()
    }
}

impl std::fmt::Display for Certification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} -> {}",
            self.issuer.fingerprint(),
            self.target.fingerprint()
        )?;
        if let Some(user_id) = &self.user_id {
            write!(f, " ({user_id:?})")?;
        }
        write!(
            f,
            " [amount {}, depth {}",
            self.trust_amount, self.trust_depth
        )?;
        if !self.regexes.is_wildcard() {
            write!(f, ", scope {:?}", self.regexes)?;
        }
        f.write_str("]")
    }
}
