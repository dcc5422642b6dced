//! Trust paths: a root followed by a chain of certifications.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Result, WotError};
use crate::synopsis::{CertSynopsis, Certification};
use crate::trust::{Depth, FULLY_TRUSTED};

/// How certifications are interpreted during a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkMode {
    /// Trust signatures are honored: depth limits and regex scopes apply.
    #[default]
    Authentication,
    /// Every certification is treated as an unconstrained, unscoped
    /// delegation.
    Certification,
}

impl NetworkMode {
    /// The certification as seen under this mode.
    pub fn effective(&self, certification: &Certification) -> Certification {
        match self {
            Self::Authentication => certification.clone(),
            Self::Certification => certification
                .clone()
                .with_trust(Depth::Unconstrained, certification.trust_amount())
                .with_regexes(Default::default()),
        }
    }
}

/// A chain of certifications starting at a root.
///
/// Each certification's issuer is the target of the previous one (the
/// root for the first). The residual depth is what remains for further
/// hops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    root: Arc<CertSynopsis>,
    edges: Vec<Certification>,
    residual_depth: Depth,
}

impl Path {
    /// A path consisting only of `root`.
    pub fn new(root: Arc<CertSynopsis>) -> Self {
        Self {
            root,
            edges: Vec::new(),
            residual_depth: Depth::Unconstrained,
        }
    }

    pub fn root(&self) -> &Arc<CertSynopsis> {
        &self.root
    }

    /// The current tail: the last certification's target, or the root.
    pub fn target(&self) -> &Arc<CertSynopsis> {
        self.edges
            .last()
            .map(Certification::target)
            .unwrap_or(&self.root)
    }

    pub fn certifications(&self) -> &[Certification] {
        &self.edges
    }

    /// The root followed by every certification's target.
    pub fn certificates(&self) -> impl Iterator<Item = &Arc<CertSynopsis>> {
        std::iter::once(&self.root).chain(self.edges.iter().map(Certification::target))
    }

    /// Number of certificates on the path, the root included.
    pub fn len(&self) -> usize {
        self.edges.len() + 1
    }

    /// Return `true` if the path holds no certification.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn residual_depth(&self) -> Depth {
        self.residual_depth
    }

    /// The weakest trust amount along the path; 120 for the bare root.
    pub fn amount(&self) -> u8 {
        self.edges
            .iter()
            .map(Certification::trust_amount)
            .min()
            .unwrap_or(FULLY_TRUSTED)
    }

    /// Extend the path by one certification.
    ///
    /// # Errors
    ///
    /// - `NotIssuer` if the certification was not issued by the tail.
    /// - `DepthExhausted` if the residual depth allows no further hop.
    /// - `Cycle` if the certification leads back to a certificate already
    ///   on the path.
    ///
    /// The path is unchanged on error.
    pub fn append(&mut self, certification: Certification) -> Result<()> {
        let tail = self.target().fingerprint();
        if certification.issuer().fingerprint() != tail {
            return Err(WotError::NotIssuer {
                tail: tail.clone(),
                issuer: certification.issuer().fingerprint().clone(),
            });
        }

        let decreased = self.residual_depth.decrease(1)?;
        self.check_cycle(&certification)?;

        self.residual_depth = certification.trust_depth().min(decreased);
        self.edges.push(certification);
        Ok(())
    }

    /// A certification may return to the tail only to bind a user ID other
    /// than the one bound by the last certification (a delegation binds no
    /// user ID). Any other repeated
    /// certificate is a cycle.
    fn check_cycle(&self, certification: &Certification) -> Result<()> {
        let target = certification.target().fingerprint();
        let cycle = || Err(WotError::Cycle(target.clone()));

        if target == self.root.fingerprint() {
            if !self.edges.is_empty() || certification.is_delegation() {
                return cycle();
            }
            return Ok(());
        }

        let last = self.edges.len().saturating_sub(1);
        for (i, edge) in self.edges.iter().enumerate() {
            if edge.target().fingerprint() != target {
                continue;
            }
            if i != last {
                return cycle();
            }
            if certification.user_id() == edge.user_id() {
                return cycle();
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for Path {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.root.fingerprint())?;
        for edge in &self.edges {
            write!(f, " -[{}, {}]-> {}", edge.trust_amount(), edge.trust_depth(), edge.target().fingerprint())?;
            if let Some(user_id) = edge.user_id() {
                write!(f, " ({user_id:?})")?;
            }
        }
        Ok(())
    }
}
