//! Trust amounts.
//!
//! Amounts use the 0–255 scale of trust signatures. 120 is full trust, so
//! that two independent partial introducers (e.g. 60 + 60) can jointly
//! reach it.

use serde::{Deserialize, Serialize};

/// The amount that fully authenticates a binding.
pub const FULLY_TRUSTED: u8 = 120;

/// Amount assumed for a certification that carries no trust signature.
pub const DEFAULT_TRUST_AMOUNT: u8 = 120;

/// Named thresholds for authentication queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AuthenticationLevel {
    /// 40: the binding is partially authenticated.
    Partially,
    /// 120: the binding is fully authenticated.
    #[default]
    Fully,
    /// 240: the binding is authenticated twice over.
    Doubly,
}

impl AuthenticationLevel {
    /// The accumulated amount required by this level.
    pub fn amount(&self) -> u32 {
        match self {
            Self::Partially => 40,
            Self::Fully => FULLY_TRUSTED as u32,
            Self::Doubly => 240,
        }
    }
}
