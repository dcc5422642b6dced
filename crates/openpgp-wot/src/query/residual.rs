//! Residual view of a network for repeated path searches.
//!
//! Each path found by a search is subtracted from the residual network so
//! that the next search only sees the capacity that is left. Roots that
//! are trusted less than fully cap the amounts of their certifications.

use std::collections::HashMap;
use std::sync::Arc;

use crate::network::Network;
use crate::synopsis::{CertSynopsis, Certification, Fingerprint};

use super::{NetworkMode, Path};

pub(crate) struct ResidualNetwork<'n> {
    network: &'n Network,
    mode: NetworkMode,
    caps: HashMap<Fingerprint, u8>,
    suppressed: HashMap<(Fingerprint, Fingerprint), u8>,
}

impl<'n> ResidualNetwork<'n> {
    pub(crate) fn new(network: &'n Network, mode: NetworkMode) -> Self {
        Self {
            network,
            mode,
            caps: HashMap::new(),
            suppressed: HashMap::new(),
        }
    }

    pub(crate) fn node(&self, fingerprint: &Fingerprint) -> Option<&'n Arc<CertSynopsis>> {
        self.network.node(fingerprint)
    }

    /// The target node, if `user_id` on it can be authenticated at all at
    /// the network's reference time.
    ///
    /// The target need not have self-signed `user_id`, but must not have
    /// revoked it.
    pub(crate) fn valid_target(
        &self,
        fingerprint: &Fingerprint,
        user_id: &str,
    ) -> Option<&'n Arc<CertSynopsis>> {
        let at = self.network.reference_time();
        let target = self.node(fingerprint)?;

        if target.is_expired(at) {
            log::debug!("{fingerprint} is expired at {at}");
            return None;
        }
        if target.is_revoked(at) {
            log::debug!("{fingerprint} is revoked at {at}");
            return None;
        }
        if target
            .user_id_revocation(user_id)
            .is_some_and(|state| state.is_effective(at))
        {
            log::debug!("{user_id:?} on {fingerprint} is revoked at {at}");
            return None;
        }
        Some(target)
    }

    /// A synthesized self-signature binding `user_id`, if the target holds
    /// that user ID.
    pub(crate) fn self_signature(
        &self,
        fingerprint: &Fingerprint,
        user_id: &str,
    ) -> Option<Certification> {
        let target = self.node(fingerprint)?;
        if !target.has_user_id(user_id) {
            return None;
        }
        Some(Certification::new(
            Arc::clone(target),
            Arc::clone(target),
            Some(user_id.to_string()),
            self.network.reference_time().timestamp(),
        ))
    }

    /// Certifications of `signee` usable on a path that still needs
    /// `min_depth` hops after them.
    ///
    /// In authentication mode the depth must suffice and the regex scope
    /// must cover `user_id`.
    pub(crate) fn certifications_for_signee(
        &self,
        signee: &Fingerprint,
        user_id: &str,
        min_depth: usize,
    ) -> Vec<Certification> {
        let now = self.network.reference_time().timestamp();

        self.network
            .edges_to(signee)
            .flat_map(|set| set.certifications())
            .filter(|c| c.creation_time() <= now)
            .filter(|c| c.expiration_time().map_or(true, |exp| exp > now))
            .map(|c| self.mode.effective(c))
            .filter(|c| c.trust_depth().allows(min_depth) && c.regexes().matches(user_id))
            .collect()
    }

    /// The amount a certification can still contribute: capped by its
    /// issuer's root amount, minus what earlier paths already used.
    pub(crate) fn effective_amount(&self, certification: &Certification) -> u8 {
        let issuer = certification.issuer().fingerprint();
        let mut amount = certification.trust_amount();

        if let Some(&cap) = self.caps.get(issuer) {
            amount = amount.min(cap);
        }

        let pair = (issuer.clone(), certification.target().fingerprint().clone());
        if let Some(&used) = self.suppressed.get(&pair) {
            amount = amount.saturating_sub(used);
        }
        amount
    }

    /// Limit every certification issued by `fingerprint` to `amount`.
    pub(crate) fn cap(&mut self, fingerprint: Fingerprint, amount: u8) {
        self.caps.insert(fingerprint, amount);
    }

    /// Subtract `amount` from every (issuer, target) pair on `path`.
    pub(crate) fn suppress_path(&mut self, path: &Path, amount: u8) {
        if amount == 0 {
            return;
        }
        for certification in path.certifications() {
            let pair = (
                certification.issuer().fingerprint().clone(),
                certification.target().fingerprint().clone(),
            );
            let used = self.suppressed.entry(pair).or_insert(0);
            *used = used.saturating_add(amount);
        }
    }
}
