//! Trust path search.
//!
//! The search runs Dijkstra backwards, from the target binding towards
//! the roots, ordered by [`TrustCost`]. Each run yields at most one path
//! per root. [`Query::authenticate`] repeats the run on a residual
//! network, subtracting every path it keeps, until the requested amount
//! is reached or no further path exists.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::network::Network;
use crate::synopsis::{Certification, Fingerprint};
use crate::trust::FULLY_TRUSTED;

use super::priority_queue::PairPriorityQueue;
use super::residual::ResidualNetwork;
use super::{NetworkMode, Path, Paths, Root, Roots};

/// Cost of reaching the target binding from a node.
///
/// Shorter is cheaper. At equal length, a larger trust amount is cheaper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrustCost {
    /// Hops to the target binding.
    pub length: usize,
    /// Weakest amount along those hops.
    pub amount: u8,
}

impl TrustCost {
    pub fn new(length: usize, amount: u8) -> Self {
        Self { length, amount }
    }

    /// The cost after prepending a hop of `amount`.
    pub fn extend_by(self, amount: u8) -> Self {
        Self::new(self.length + 1, self.amount.min(amount))
    }
}

impl Ord for TrustCost {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.length
            .cmp(&other.length)
            .then_with(|| other.amount.cmp(&self.amount))
    }
}

impl PartialOrd for TrustCost {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for TrustCost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "length {}, amount {}", self.length, self.amount)
    }
}

/// A trust query over one network from a set of roots.
#[derive(Debug, Clone)]
pub struct Query<'n> {
    network: &'n Network,
    roots: Roots,
    mode: NetworkMode,
}

impl<'n> Query<'n> {
    pub fn new(network: &'n Network, roots: Roots, mode: NetworkMode) -> Self {
        Self {
            network,
            roots,
            mode,
        }
    }

    pub fn network(&self) -> &'n Network {
        self.network
    }

    pub fn roots(&self) -> &Roots {
        &self.roots
    }

    pub fn mode(&self) -> NetworkMode {
        self.mode
    }

    /// Find independent paths from the roots to the binding of `user_id`
    /// to `target`, until together they carry `amount` or no further path
    /// exists.
    pub fn authenticate(&self, target: &Fingerprint, user_id: &str, amount: u32) -> Paths {
        log::debug!(
            "Authenticating <{target}, {user_id:?}> from roots {}",
            self.roots
        );

        let mut residual = ResidualNetwork::new(self.network, self.mode);
        if self.mode == NetworkMode::Authentication {
            for root in self.roots.iter().filter(|r| !r.is_fully_trusted()) {
                residual.cap(root.fingerprint().clone(), root.amount());
            }
        }

        let mut paths = Paths::new();
        while paths.amount() < amount {
            let candidates = self.propagate(&residual, target, user_id);

            let best = self
                .roots
                .fingerprints()
                .filter_map(|fpr| candidates.get(fpr))
                .max_by(|(a, a_amount), (b, b_amount)| {
                    a_amount
                        .cmp(b_amount)
                        .then_with(|| b.len().cmp(&a.len()))
                        .then_with(|| b.root().fingerprint().cmp(a.root().fingerprint()))
                });

            let Some((path, path_amount)) = best.cloned() else {
                break;
            };
            if path_amount == 0 {
                break;
            }

            log::debug!("Found path with amount {path_amount}: {path}");
            residual.suppress_path(&path, path_amount);
            if let Err(e) = paths.add(path, path_amount) {
                log::warn!("Discarding inconsistent path: {e}");
                break;
            }
        }

        paths
    }

    /// One backward propagation without caps or suppression: the best
    /// path from every node (every root, if roots are configured) to the
    /// binding, with the amount it carries.
    pub fn backward_propagate(
        &self,
        target: &Fingerprint,
        user_id: &str,
    ) -> BTreeMap<Fingerprint, (Path, u8)> {
        let residual = ResidualNetwork::new(self.network, self.mode);
        self.propagate(&residual, target, user_id)
    }

    fn propagate(
        &self,
        residual: &ResidualNetwork<'n>,
        target: &Fingerprint,
        user_id: &str,
    ) -> BTreeMap<Fingerprint, (Path, u8)> {
        if residual.valid_target(target, user_id).is_none() {
            log::debug!("<{target}, {user_id:?}> cannot be authenticated");
            return BTreeMap::new();
        }

        // Each node points at the certification that continues its best
        // path; `None` marks the target reached directly.
        let mut forward: HashMap<Fingerprint, Option<Certification>> = HashMap::new();
        let mut cost: HashMap<Fingerprint, TrustCost> = HashMap::new();
        let mut queue = PairPriorityQueue::new();
        let mut done: HashSet<Fingerprint> = HashSet::new();

        let self_signature = residual.self_signature(target, user_id);
        let self_amount = self_signature
            .as_ref()
            .map_or(0, |sig| residual.effective_amount(sig));
        let start = match self_signature {
            Some(sig) if self_amount > 0 => {
                forward.insert(target.clone(), Some(sig));
                TrustCost::new(1, self_amount)
            }
            _ => {
                forward.insert(target.clone(), None);
                TrustCost::new(0, FULLY_TRUSTED)
            }
        };
        cost.insert(target.clone(), start);
        queue.insert_or_update(target.clone(), start);

        while let Some((signee, signee_cost)) = queue.pop() {
            if !done.insert(signee.clone()) {
                continue;
            }

            if self.roots.get(&signee).is_some_and(Root::is_fully_trusted) {
                log::trace!("Not expanding fully trusted root {signee}");
                continue;
            }

            log::trace!("Processing {signee} ({signee_cost})");

            // One hop less than the current length, so that a third-party
            // certification of the binding can replace a self-signature.
            let min_depth = signee_cost.length.saturating_sub(1);

            for certification in residual.certifications_for_signee(&signee, user_id, min_depth) {
                let amount = residual.effective_amount(&certification);
                if amount == 0 {
                    continue;
                }

                let binds_target = &signee == target && certification.user_id() == Some(user_id);
                if &signee == target && signee_cost.length == 0 && !binds_target {
                    continue;
                }

                let candidate = if binds_target {
                    TrustCost::new(1, amount)
                } else if certification.trust_depth().allows(signee_cost.length) {
                    signee_cost.extend_by(amount)
                } else {
                    continue;
                };

                let issuer = certification.issuer().fingerprint().clone();
                if done.contains(&issuer) {
                    continue;
                }
                if cost.get(&issuer).is_some_and(|current| candidate >= *current) {
                    continue;
                }

                log::trace!("  {issuer} reaches the target via {signee} ({candidate})");
                cost.insert(issuer.clone(), candidate);
                forward.insert(issuer.clone(), Some(certification));
                queue.insert_or_update(issuer, candidate);
            }
        }

        let mut result = BTreeMap::new();
        for (issuer, pointer) in &forward {
            if pointer.is_none() || (!self.roots.is_empty() && !self.roots.is_root(issuer)) {
                continue;
            }
            let Some(path) = self.assemble_path(issuer, target, user_id, &forward) else {
                continue;
            };
            let amount = cost.get(issuer).map_or(0, |c| c.amount);
            result.insert(issuer.clone(), (path, amount));
        }
        result
    }

    /// Follow forward pointers from `issuer` until the certification
    /// binding the target user ID.
    fn assemble_path(
        &self,
        issuer: &Fingerprint,
        target: &Fingerprint,
        user_id: &str,
        forward: &HashMap<Fingerprint, Option<Certification>>,
    ) -> Option<Path> {
        let mut path = Path::new(self.network.node(issuer)?.clone());
        let mut current = issuer.clone();

        while let Some(Some(certification)) = forward.get(&current) {
            let next = certification.target().fingerprint().clone();
            let reached = &next == target && certification.user_id() == Some(user_id);

            if let Err(e) = path.append(certification.clone()) {
                log::warn!("Cannot assemble path from {issuer}: {e}");
                return None;
            }
            if reached || path.len() > self.network.number_of_nodes() + 1 {
                break;
            }
            current = next;
        }

        (!path.is_empty()).then_some(path)
    }
}
