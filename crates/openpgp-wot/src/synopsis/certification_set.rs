//! Certification sets: the edges of the trust graph.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{Result, WotError};

use super::{CertSynopsis, Certification};

/// All certifications that one issuer made on one target, keyed by the
/// certified user ID (`None` for delegations).
///
/// Only the most recent certification per user ID is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificationSet {
    issuer: Arc<CertSynopsis>,
    target: Arc<CertSynopsis>,
    certifications: BTreeMap<Option<String>, Certification>,
}

impl CertificationSet {
    /// An empty set for the `issuer` → `target` pair.
    pub fn empty(issuer: Arc<CertSynopsis>, target: Arc<CertSynopsis>) -> Self {
        Self {
            issuer,
            target,
            certifications: BTreeMap::new(),
        }
    }

    /// A set holding exactly `certification`.
    pub fn from_certification(certification: Certification) -> Self {
        let mut set = Self::empty(
            Arc::clone(certification.issuer()),
            Arc::clone(certification.target()),
        );
        set.certifications
            .insert(certification.user_id().map(str::to_string), certification);
        set
    }

    pub fn issuer(&self) -> &Arc<CertSynopsis> {
        &self.issuer
    }

    pub fn target(&self) -> &Arc<CertSynopsis> {
        &self.target
    }

    /// Add a certification, replacing an older one on the same user ID.
    ///
    /// A certification that is not strictly newer than the stored one is
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns `IssuerMismatch` or `TargetMismatch` if the certification
    /// belongs to a different pair.
    pub fn add(&mut self, certification: Certification) -> Result<()> {
        self.check_pair(certification.issuer(), certification.target())?;

        let key = certification.user_id().map(str::to_string);
        match self.certifications.get(&key) {
            Some(existing) if existing.creation_time() >= certification.creation_time() => {}
            _ => {
                self.certifications.insert(key, certification);
            }
        }
        Ok(())
    }

    /// Fold all certifications of `other` into this set.
    ///
    /// # Errors
    ///
    /// Fails like [`CertificationSet::add`] if `other` covers a different
    /// pair; nothing is merged in that case.
    pub fn merge(&mut self, other: CertificationSet) -> Result<()> {
        self.check_pair(&other.issuer, &other.target)?;
        for certification in other.certifications.into_values() {
            self.add(certification)?;
        }
        Ok(())
    }

    /// Certifications ordered by user ID, the delegation (if any) first.
    pub fn certifications(&self) -> impl Iterator<Item = &Certification> {
        self.certifications.values()
    }

    /// The certification for `user_id`, or the delegation for `None`.
    pub fn get(&self, user_id: Option<&str>) -> Option<&Certification> {
        self.certifications.get(&user_id.map(str::to_string))
    }

    pub fn delegation(&self) -> Option<&Certification> {
        self.get(None)
    }

    pub fn len(&self) -> usize {
        self.certifications.len()
    }

    pub fn is_empty(&self) -> bool {
        self.certifications.is_empty()
    }

    fn check_pair(&self, issuer: &CertSynopsis, target: &CertSynopsis) -> Result<()> {
        if issuer.fingerprint() != self.issuer.fingerprint() {
            return Err(WotError::IssuerMismatch {
                expected: self.issuer.fingerprint().clone(),
                actual: issuer.fingerprint().clone(),
            });
        }
        if target.fingerprint() != self.target.fingerprint() {
            return Err(WotError::TargetMismatch {
                expected: self.target.fingerprint().clone(),
                actual: target.fingerprint().clone(),
            });
        }
        Ok(())
    }
}

impl std::fmt::Display for CertificationSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "{} -> {} ({} certifications)",
            self.issuer.fingerprint(),
            self.target.fingerprint(),
            self.certifications.len()
        )?;
        for certification in self.certifications.values() {
            writeln!(f, "  {certification}")?;
        }
        Ok(())
    }
}
