//! Trust depth: how many further delegation hops a certification permits.
//!
//! The trust-signature subpacket encodes "no limit" as 255, which
//! [`Depth::auto`] maps to [`Depth::Unconstrained`].

use serde::{Deserialize, Serialize};

use crate::error::{Result, WotError};

/// Depth of a trust signature.
///
/// Ordering: every `Limited` value is smaller than `Unconstrained`; limited
/// values compare as integers. A larger depth is a larger residual budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Depth {
    /// At most this many further hops.
    Limited(u8),
    /// Any number of further hops.
    Unconstrained,
}

impl Depth {
    /// The unconstrained depth.
    pub fn unconstrained() -> Self {
        Self::Unconstrained
    }

    /// A limited depth.
    ///
    /// Fails with [`WotError::DepthOutOfRange`] unless `limit` is in `0..=255`.
    pub fn limited(limit: u32) -> Result<Self> {
        u8::try_from(limit)
            .map(Self::Limited)
            .map_err(|_| WotError::DepthOutOfRange(limit))
    }

    /// Decode the depth field of a trust-signature subpacket.
    pub fn auto(raw: u8) -> Self {
        if raw == 255 {
            Self::Unconstrained
        } else {
            Self::Limited(raw)
        }
    }

    /// Return `true` for [`Depth::Unconstrained`].
    pub fn is_unconstrained(&self) -> bool {
        matches!(self, Self::Unconstrained)
    }

    /// The limit, or `None` if unconstrained.
    pub fn value(&self) -> Option<u8> {
        match self {
            Self::Limited(n) => Some(*n),
            Self::Unconstrained => None,
        }
    }

    /// Decrease the depth by `by` hops.
    ///
    /// Unconstrained stays unconstrained. A limited depth smaller than `by`
    /// is exhausted and fails; it is never clamped to zero.
    pub fn decrease(&self, by: u8) -> Result<Self> {
        match self {
            Self::Unconstrained => Ok(Self::Unconstrained),
            Self::Limited(n) if *n >= by => Ok(Self::Limited(n - by)),
            Self::Limited(n) => Err(WotError::DepthExhausted { depth: *n, by }),
        }
    }

    /// The more restrictive of the two depths.
    pub fn min(self, other: Self) -> Self {
        std::cmp::min(self, other)
    }

    /// Return `true` if the depth allows a chain of `hops` further hops.
    pub fn allows(&self, hops: usize) -> bool {
        match self {
            Self::Unconstrained => true,
            Self::Limited(n) => (*n as usize) >= hops,
        }
    }
}

impl std::fmt::Display for Depth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Limited(n) => write!(f, "{n}"),
            Self::Unconstrained => f.write_str("unconstrained"),
        }
    }
}
