//! Regular-expression scoping of delegations.
//!
//! A trust signature may carry regular-expression subpackets limiting the
//! user IDs the delegated introducer may certify. An empty set places no
//! limit. A non-empty set matches a user ID if any member matches the whole
//! string.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{Result, WotError};

/// A set of regular expressions scoping which user IDs a delegation covers.
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct RegexSet {
    expressions: BTreeSet<String>,
    /// Anchored compilation of `expressions`; `None` for the wildcard.
    compiled: Option<regex::RegexSet>,
}

impl RegexSet {
    /// The wildcard set, matching every string.
    pub fn wildcard() -> Self {
        Self {
            expressions: BTreeSet::new(),
            compiled: None,
        }
    }

    /// Compile a set from a list of expressions.
    ///
    /// An empty list yields the wildcard. Fails with
    /// [`WotError::InvalidRegex`] if any expression does not compile.
    pub fn from_expressions<I, S>(expressions: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let expressions: BTreeSet<String> = expressions.into_iter().map(Into::into).collect();
        if expressions.is_empty() {
            return Ok(Self::wildcard());
        }

        let anchored = expressions.iter().map(|e| format!("^(?:{e})$"));
        let compiled =
            regex::RegexSet::new(anchored).map_err(|e| WotError::InvalidRegex(e.to_string()))?;

        Ok(Self {
            expressions,
            compiled: Some(compiled),
        })
    }

    /// Compile a set holding a single expression.
    pub fn from_expression(expression: impl Into<String>) -> Result<Self> {
        Self::from_expressions([expression.into()])
    }

    /// Return `true` if this set places no restriction.
    pub fn is_wildcard(&self) -> bool {
        self.compiled.is_none()
    }

    /// Return `true` if `candidate` is covered by this set.
    pub fn matches(&self, candidate: &str) -> bool {
        match &self.compiled {
            None => true,
            Some(set) => set.is_match(candidate),
        }
    }

    /// The source expressions, sorted.
    pub fn expressions(&self) -> impl Iterator<Item = &str> {
        self.expressions.iter().map(String::as_str)
    }
}

impl Default for RegexSet {
    fn default() -> Self {
        Self::wildcard()
    }
}

impl PartialEq for RegexSet {
    fn eq(&self, other: &Self) -> bool {
        self.expressions == other.expressions
    }
}

impl Eq for RegexSet {}

impl std::fmt::Debug for RegexSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_wildcard() {
            f.write_str("RegexSet(*)")
        } else {
            f.debug_tuple("RegexSet").field(&self.expressions).finish()
        }
    }
}

impl TryFrom<Vec<String>> for RegexSet {
    type Error = WotError;

    fn try_from(expressions: Vec<String>) -> Result<Self> {
        Self::from_expressions(expressions)
    }
}

impl From<RegexSet> for Vec<String> {
    fn from(set: RegexSet) -> Self {
        set.expressions.into_iter().collect()
    }
}
