//! Authorization decisions over a built network.
//!
//! [`CertificateAuthority`] answers whether a certificate is trusted for a
//! user ID, and offers the binding-level operations built on the same
//! search: authenticate, identify, lookup, list, and explicit path checks.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Result, WotError};
use crate::network::Network;
use crate::query::{NetworkMode, Path, Paths, Query, Roots};
use crate::synopsis::{Certification, Fingerprint};
use crate::trust::{AuthenticationLevel, FULLY_TRUSTED};

// ── Configuration ────────────────────────────────────────────────────────────

/// Settings for authorization queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Amount at which a binding counts as authenticated.
    pub threshold: u32,
    pub mode: NetworkMode,
    /// Report amounts below the threshold as partial authorization rather
    /// than a denial.
    pub partial: bool,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            threshold: AuthenticationLevel::Fully.amount(),
            mode: NetworkMode::Authentication,
            partial: false,
        }
    }
}

impl QueryConfig {
    pub fn with_threshold(mut self, threshold: u32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_level(self, level: AuthenticationLevel) -> Self {
        self.with_threshold(level.amount())
    }

    pub fn with_mode(mut self, mode: NetworkMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_partial(mut self, partial: bool) -> Self {
        self.partial = partial;
        self
    }
}

// ── Results ──────────────────────────────────────────────────────────────────

/// Outcome of [`CertificateAuthority::is_authorized`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Authorization {
    Authorized { amount: u32 },
    PartiallyAuthorized { amount: u32 },
    NotAuthorized { reason: Denial },
}

/// Why a binding was not authorized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Denial {
    UnknownCertificate,
    NoPath,
    InsufficientTrust { amount: u32 },
}

impl Authorization {
    pub fn is_authorized(&self) -> bool {
        matches!(self, Self::Authorized { .. })
    }

    /// The accumulated amount behind the decision.
    pub fn amount(&self) -> u32 {
        match self {
            Self::Authorized { amount } | Self::PartiallyAuthorized { amount } => *amount,
            Self::NotAuthorized {
                reason: Denial::InsufficientTrust { amount },
            } => *amount,
            Self::NotAuthorized { .. } => 0,
        }
    }
}

impl std::fmt::Display for Authorization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Authorized { amount } => write!(f, "authorized (amount {amount})"),
            Self::PartiallyAuthorized { amount } => {
                write!(f, "partially authorized (amount {amount})")
            }
            Self::NotAuthorized { reason } => match reason {
                Denial::UnknownCertificate => f.write_str("not authorized: unknown certificate"),
                Denial::NoPath => f.write_str("not authorized: no path"),
                Denial::InsufficientTrust { amount } => {
                    write!(f, "not authorized: insufficient trust (amount {amount})")
                }
            },
        }
    }
}

/// A certificate, a user ID, and the paths authenticating the binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub fingerprint: Fingerprint,
    pub user_id: String,
    pub paths: Paths,
}

impl Binding {
    pub fn amount(&self) -> u32 {
        self.paths.amount()
    }

    /// Authentication relative to `target`; 100 means fully authenticated.
    pub fn percentage(&self, target: u32) -> u32 {
        if target == 0 {
            return 100;
        }
        self.amount() * 100 / target
    }

    /// Return `true` if the binding reaches full trust.
    pub fn is_fully_trusted(&self) -> bool {
        self.amount() >= u32::from(FULLY_TRUSTED)
    }
}

// ── Authority ────────────────────────────────────────────────────────────────

/// Trust decisions over one network from one set of roots.
#[derive(Debug, Clone)]
pub struct CertificateAuthority {
    network: Arc<Network>,
    roots: Roots,
    config: QueryConfig,
}

impl CertificateAuthority {
    pub fn new(network: impl Into<Arc<Network>>, roots: Roots) -> Self {
        Self {
            network: network.into(),
            roots,
            config: QueryConfig::default(),
        }
    }

    pub fn with_config(mut self, config: QueryConfig) -> Self {
        self.config = config;
        self
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn roots(&self) -> &Roots {
        &self.roots
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Decide whether `fingerprint` is trusted for `user_id`.
    pub fn is_authorized(&self, fingerprint: &Fingerprint, user_id: &str) -> Authorization {
        if !self.network.contains(fingerprint) {
            return Authorization::NotAuthorized {
                reason: Denial::UnknownCertificate,
            };
        }
        self.decide(&self.authenticate(fingerprint, user_id))
    }

    /// The decision for a binding already returned by [`Self::authenticate`].
    pub fn decide(&self, binding: &Binding) -> Authorization {
        if !self.network.contains(&binding.fingerprint) {
            return Authorization::NotAuthorized {
                reason: Denial::UnknownCertificate,
            };
        }

        let amount = binding.amount();
        let decision = if amount >= self.config.threshold {
            Authorization::Authorized { amount }
        } else if amount == 0 {
            Authorization::NotAuthorized {
                reason: Denial::NoPath,
            }
        } else if self.config.partial {
            Authorization::PartiallyAuthorized { amount }
        } else {
            Authorization::NotAuthorized {
                reason: Denial::InsufficientTrust { amount },
            }
        };

        log::debug!("<{}, {:?}>: {decision}", binding.fingerprint, binding.user_id);
        decision
    }

    /// Paths authenticating the binding, searched up to the threshold.
    ///
    /// Only paths whose last certification binds `user_id` within its
    /// scope are kept.
    pub fn authenticate(&self, fingerprint: &Fingerprint, user_id: &str) -> Binding {
        let found = self
            .query()
            .authenticate(fingerprint, user_id, self.config.threshold);

        let mut paths = Paths::new();
        for item in found {
            if !Self::ends_in_binding(item.path(), user_id) {
                log::warn!("Discarding path not ending in {user_id:?}: {}", item.path());
                continue;
            }
            let amount = item.amount();
            if let Err(e) = paths.add(item.path().clone(), amount) {
                log::warn!("Discarding path: {e}");
            }
        }

        Binding {
            fingerprint: fingerprint.clone(),
            user_id: user_id.to_string(),
            paths,
        }
    }

    /// All authenticated bindings of one certificate.
    pub fn identify(&self, fingerprint: &Fingerprint) -> Vec<Binding> {
        let Some(node) = self.network.node(fingerprint) else {
            return Vec::new();
        };
        node.user_ids()
            .map(|(user_id, _)| self.authenticate(fingerprint, user_id))
            .filter(|binding| binding.amount() > 0)
            .collect()
    }

    /// Authenticated bindings for a user ID across all certificates.
    ///
    /// With `email`, `user_id` is an address and matches every user ID
    /// containing `<address>`.
    pub fn lookup(&self, user_id: &str, email: bool) -> Vec<Binding> {
        let needle = format!("<{user_id}>");
        let mut bindings = Vec::new();

        for node in self.network.nodes() {
            for (candidate, _) in node.user_ids() {
                let matches = if email {
                    candidate.contains(&needle)
                } else {
                    candidate == user_id
                };
                if !matches {
                    continue;
                }
                let binding = self.authenticate(node.fingerprint(), candidate);
                if !binding.paths.is_empty() {
                    bindings.push(binding);
                }
            }
        }
        bindings
    }

    /// Every authenticated binding in the network, optionally restricted to
    /// user IDs containing `pattern` (case-insensitive).
    pub fn list(&self, pattern: Option<&str>) -> Vec<Binding> {
        let pattern = pattern.map(str::to_lowercase);
        self.network
            .nodes()
            .flat_map(|node| self.identify(node.fingerprint()))
            .filter(|binding| {
                pattern
                    .as_deref()
                    .map_or(true, |p| binding.user_id.to_lowercase().contains(p))
            })
            .collect()
    }

    /// Check an explicit chain of certificates, root first, ending at the
    /// certificate that should hold `user_id`.
    ///
    /// Each hop uses the strongest certification that fits; the last hop
    /// must bind `user_id`, either directly or by a delegation followed by
    /// the target's own binding. The returned binding's amount is zero
    /// unless the chain starts at a configured root.
    ///
    /// # Errors
    ///
    /// - `NotFound` for a fingerprint missing from the network.
    /// - `MissingCertification` when a hop has no usable certification.
    /// - Path errors (`DepthExhausted`, `Cycle`) when the chain violates
    ///   the trust rules.
    pub fn check_path(&self, chain: &[Fingerprint], user_id: &str) -> Result<Binding> {
        let (root, target) = match (chain.first(), chain.last()) {
            (Some(root), Some(target)) => (root, target),
            _ => return Err(WotError::NotFound("empty path".to_string())),
        };
        for fingerprint in chain {
            if !self.network.contains(fingerprint) {
                return Err(WotError::NotFound(fingerprint.to_string()));
            }
        }
        let root_node = self
            .network
            .node(root)
            .ok_or_else(|| WotError::NotFound(root.to_string()))?;
        let target_node = self
            .network
            .node(target)
            .ok_or_else(|| WotError::NotFound(target.to_string()))?;

        let mut path = Path::new(Arc::clone(root_node));
        let hops = chain.len() - 1;

        for (i, pair) in chain.windows(2).enumerate() {
            let (issuer, signee) = (&pair[0], &pair[1]);
            let remaining = hops - i - 1;
            let last = remaining == 0;

            let direct = if last {
                self.strongest(issuer, signee, user_id, |c| c.user_id() == Some(user_id))
            } else {
                None
            };

            match direct {
                Some(certification) => path.append(certification)?,
                None => {
                    // A delegation must leave room for the remaining hops,
                    // plus the target's own binding after the last one.
                    let needed = if last { 1 } else { remaining };
                    let certification = self
                        .strongest(issuer, signee, user_id, |c| c.trust_depth().allows(needed))
                        .ok_or_else(|| WotError::MissingCertification {
                            issuer: issuer.clone(),
                            target: signee.clone(),
                        })?;
                    path.append(certification)?;
                }
            }
        }

        let bound = path
            .certifications()
            .last()
            .is_some_and(|c| c.user_id() == Some(user_id));
        if !bound {
            if !target_node.is_valid_user_id(user_id, self.network.reference_time()) {
                return Err(WotError::MissingCertification {
                    issuer: target.clone(),
                    target: target.clone(),
                });
            }
            path.append(Certification::new(
                Arc::clone(target_node),
                Arc::clone(target_node),
                Some(user_id.to_string()),
                self.network.reference_time().timestamp(),
            ))?;
        }

        let amount = match self.roots.get(root) {
            Some(r) if self.config.mode == NetworkMode::Authentication => path.amount().min(r.amount()),
            Some(_) => path.amount(),
            None => 0,
        };
        let mut paths = Paths::new();
        paths.add(path, amount)?;

        Ok(Binding {
            fingerprint: target.clone(),
            user_id: user_id.to_string(),
            paths,
        })
    }

    fn query(&self) -> Query<'_> {
        Query::new(&self.network, self.roots.clone(), self.config.mode)
    }

    /// The highest-amount certification from `issuer` on `signee` that is
    /// in scope for `user_id` and satisfies `accept`.
    fn strongest<F>(
        &self,
        issuer: &Fingerprint,
        signee: &Fingerprint,
        user_id: &str,
        accept: F,
    ) -> Option<Certification>
    where
        F: Fn(&Certification) -> bool,
    {
        self.network
            .edge(issuer, signee)?
            .certifications()
            .map(|c| self.config.mode.effective(c))
            .filter(|c| c.regexes().matches(user_id) && accept(c))
            .max_by_key(Certification::trust_amount)
    }

    fn ends_in_binding(path: &Path, user_id: &str) -> bool {
        path.certifications().last().is_some_and(|last| {
            last.user_id().map_or(true, |bound| bound == user_id) && last.regexes().matches(user_id)
        })
    }
}
