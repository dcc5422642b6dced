//! Trust primitives: small immutable values used throughout the engine.
//!
//! The trust module provides:
//! - Trust depth with "unconstrained" as the maximum
//! - Regular-expression scoping of delegations
//! - Trust amount levels (partial, full, double)

pub mod amount;
pub mod depth;
pub mod regex_set;

pub use amount::{AuthenticationLevel, DEFAULT_TRUST_AMOUNT, FULLY_TRUSTED};
pub use depth::Depth;
pub use regex_set::RegexSet;
