//! Sets of trust paths that jointly authenticate a binding.

use crate::error::{Result, WotError};

use super::Path;

/// One path and the trust amount it contributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathItem {
    path: Path,
    amount: u8,
}

impl PathItem {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn amount(&self) -> u8 {
        self.amount
    }
}

/// Independent paths with their contributed amounts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Paths {
    items: Vec<PathItem>,
}

impl Paths {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a path contributing `amount`.
    ///
    /// # Errors
    ///
    /// Returns `AmountExceedsPath` if `amount` is larger than the path's
    /// own amount.
    pub fn add(&mut self, path: Path, amount: u8) -> Result<()> {
        let path_amount = path.amount();
        if amount > path_amount {
            return Err(WotError::AmountExceedsPath {
                amount,
                path_amount,
            });
        }
        self.items.push(PathItem { path, amount });
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &PathItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of the contributed amounts. Not capped.
    pub fn amount(&self) -> u32 {
        self.items.iter().map(|item| u32::from(item.amount)).sum()
    }
}

impl IntoIterator for Paths {
    type Item = PathItem;
    type IntoIter = std::vec::IntoIter<PathItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl std::fmt::Display for Paths {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for item in &self.items {
            writeln!(f, "[{}] {}", item.amount, item.path)?;
        }
        write!(f, "total: {}", self.amount())
    }
}
