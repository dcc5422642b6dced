//! Revocation states of certificates and user IDs.

use serde::{Deserialize, Serialize};

use crate::time::ReferenceTime;

/// Revocation state of a certificate or of one of its user IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum RevocationState {
    /// Not revoked.
    #[default]
    NotRevoked,
    /// Revoked (e.g. superseded or retired) as of `since`; trust placed
    /// before that instant is unaffected.
    SoftRevoked { since: u64 },
    /// Revoked permanently (e.g. key compromise), independent of time.
    HardRevoked,
}

impl RevocationState {
    /// Return `true` if the revocation is in effect at `at`.
    ///
    /// Hard revocations always are; soft revocations only strictly after
    /// their own timestamp.
    pub fn is_effective(&self, at: ReferenceTime) -> bool {
        match self {
            Self::NotRevoked => false,
            Self::SoftRevoked { since } => at.timestamp() > *since,
            Self::HardRevoked => true,
        }
    }

    pub fn is_hard(&self) -> bool {
        matches!(self, Self::HardRevoked)
    }

    pub fn is_soft(&self) -> bool {
        matches!(self, Self::SoftRevoked { .. })
    }

    pub fn is_revoked(&self) -> bool {
        !matches!(self, Self::NotRevoked)
    }

    /// The more severe of two states: hard over soft over none, and the
    /// earlier of two soft revocations.
    pub fn strongest(self, other: Self) -> Self {
        match (self, other) {
            (Self::HardRevoked, _) | (_, Self::HardRevoked) => Self::HardRevoked,
            (Self::SoftRevoked { since: a }, Self::SoftRevoked { since: b }) => {
                Self::SoftRevoked { since: a.min(b) }
            }
            (s @ Self::SoftRevoked { .. }, _) | (_, s @ Self::SoftRevoked { .. }) => s,
            _ => Self::NotRevoked,
        }
    }
}
