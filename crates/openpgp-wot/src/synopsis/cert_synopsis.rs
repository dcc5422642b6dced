//! Certificate synopses: the nodes of the trust graph.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, WotError};
use crate::time::{micros_to_rfc3339, ReferenceTime};

use super::{Fingerprint, RevocationState};

/// An immutable summary of a certificate: the data the trust computation
/// needs, and nothing else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertSynopsis {
    fingerprint: Fingerprint,
    expiration_time: Option<u64>,
    revocation_state: RevocationState,
    user_ids: BTreeMap<String, RevocationState>,
}

impl CertSynopsis {
    pub fn new<I, S>(
        fingerprint: Fingerprint,
        expiration_time: Option<u64>,
        revocation_state: RevocationState,
        user_ids: I,
    ) -> Self
    where
        I: IntoIterator<Item = (S, RevocationState)>,
        S: Into<String>,
    {
        Self {
            fingerprint,
            expiration_time,
            revocation_state,
            user_ids: user_ids.into_iter().map(|(u, r)| (u.into(), r)).collect(),
        }
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    pub fn expiration_time(&self) -> Option<u64> {
        self.expiration_time
    }

    pub fn revocation_state(&self) -> RevocationState {
        self.revocation_state
    }

    /// User IDs with their revocation states, sorted.
    pub fn user_ids(&self) -> impl Iterator<Item = (&str, RevocationState)> {
        self.user_ids.iter().map(|(u, r)| (u.as_str(), *r))
    }

    pub fn user_id_revocation(&self, user_id: &str) -> Option<RevocationState> {
        self.user_ids.get(user_id).copied()
    }

    pub fn has_user_id(&self, user_id: &str) -> bool {
        self.user_ids.contains_key(user_id)
    }

    /// Return `true` if the certificate has expired at `at`.
    pub fn is_expired(&self, at: ReferenceTime) -> bool {
        self.expiration_time
            .map(|exp| exp <= at.timestamp())
            .unwrap_or(false)
    }

    /// Return `true` if a revocation of the certificate is in effect at `at`.
    pub fn is_revoked(&self, at: ReferenceTime) -> bool {
        self.revocation_state.is_effective(at)
    }

    /// Return `true` if `user_id` belongs to the certificate and is not
    /// revoked at `at`.
    pub fn is_valid_user_id(&self, user_id: &str, at: ReferenceTime) -> bool {
        self.user_ids
            .get(user_id)
            .map(|r| !r.is_effective(at))
            .unwrap_or(false)
    }

    /// Return `true` if at least one user ID is not revoked at `at`.
    pub fn has_valid_user_id(&self, at: ReferenceTime) -> bool {
        self.user_ids.values().any(|r| !r.is_effective(at))
    }

    /// Combine two synopses of the same certificate.
    ///
    /// The expiration time of `other` wins, the stronger revocation state
    /// is kept, and user IDs are unioned with `other`'s states overriding.
    pub fn merge(&self, other: &CertSynopsis) -> Result<CertSynopsis> {
        if self.fingerprint != other.fingerprint {
            return Err(WotError::TargetMismatch {
                expected: self.fingerprint.clone(),
                actual: other.fingerprint.clone(),
            });
        }

        let mut user_ids = self.user_ids.clone();
        user_ids.extend(other.user_ids.iter().map(|(u, r)| (u.clone(), *r)));

        Ok(CertSynopsis {
            fingerprint: self.fingerprint.clone(),
            expiration_time: other.expiration_time,
            revocation_state: self.revocation_state.strongest(other.revocation_state),
            user_ids,
        })
    }
}

impl std::fmt::Display for CertSynopsis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.fingerprint)?;
        if let Some((user_id, _)) = self.user_ids.iter().next() {
            write!(f, " ({user_id})")?;
        }
        if let Some(exp) = self.expiration_time {
            write!(f, " expires {}", micros_to_rfc3339(exp))?;
        }
        Ok(())
    }
}
