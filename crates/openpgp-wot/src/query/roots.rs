//! Trust roots: the certificates a search starts from.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::synopsis::Fingerprint;
use crate::trust::FULLY_TRUSTED;

/// A trust root and how much it is trusted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Root {
    fingerprint: Fingerprint,
    amount: u8,
}

impl Root {
    pub fn new(fingerprint: Fingerprint, amount: u8) -> Self {
        Self {
            fingerprint,
            amount,
        }
    }

    /// A fully trusted root.
    pub fn full(fingerprint: Fingerprint) -> Self {
        Self::new(fingerprint, FULLY_TRUSTED)
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    pub fn amount(&self) -> u8 {
        self.amount
    }

    pub fn is_fully_trusted(&self) -> bool {
        self.amount >= FULLY_TRUSTED
    }
}

impl std::fmt::Display for Root {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.fingerprint, self.amount)
    }
}

/// A set of trust roots, keyed by fingerprint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roots {
    roots: BTreeMap<Fingerprint, Root>,
}

impl Roots {
    pub fn new<I: IntoIterator<Item = Root>>(roots: I) -> Self {
        let mut set = Self::default();
        for root in roots {
            set.add(root);
        }
        set
    }

    /// Add a root. Adding a fingerprint twice keeps the larger amount.
    pub fn add(&mut self, root: Root) {
        self.roots
            .entry(root.fingerprint.clone())
            .and_modify(|existing| existing.amount = existing.amount.max(root.amount))
            .or_insert(root);
    }

    pub fn get(&self, fingerprint: &Fingerprint) -> Option<&Root> {
        self.roots.get(fingerprint)
    }

    pub fn is_root(&self, fingerprint: &Fingerprint) -> bool {
        self.roots.contains_key(fingerprint)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Root> {
        self.roots.values()
    }

    pub fn fingerprints(&self) -> impl Iterator<Item = &Fingerprint> {
        self.roots.keys()
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

impl FromIterator<Root> for Roots {
    fn from_iter<I: IntoIterator<Item = Root>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl std::fmt::Display for Roots {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let roots: Vec<String> = self.roots.values().map(Root::to_string).collect();
        write!(f, "[{}]", roots.join(", "))
    }
}
