//! Network construction from a certificate snapshot.
//!
//! Three phases: index every certificate by fingerprint and key ID,
//! synopsize the usable ones into nodes, then discover edges by verifying
//! each third-party signature against its issuer candidates. A bad
//! certificate or signature is logged and excluded; building never fails
//! as a whole.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use crate::synopsis::{CertSynopsis, Certification, Fingerprint, KeyId};
use crate::time::ReferenceTime;

use super::graph::{Network, NetworkAssembler};
use super::source::{Certificate, Signature, SignatureVerifier};

/// Builds a [`Network`] from certificates and a verification oracle.
pub struct NetworkBuilder<V> {
    verifier: V,
    reference_time: ReferenceTime,
}

/// Certificates indexed for issuer lookup.
struct CertificateIndex<'c, C> {
    by_fingerprint: BTreeMap<Fingerprint, &'c C>,
    by_key_id: HashMap<KeyId, Vec<Fingerprint>>,
}

impl<V> NetworkBuilder<V> {
    pub fn new(verifier: V, reference_time: ReferenceTime) -> Self {
        Self {
            verifier,
            reference_time,
        }
    }

    pub fn reference_time(&self) -> ReferenceTime {
        self.reference_time
    }

    /// Build the network.
    pub fn build<'c, C, I>(&self, certificates: I) -> Network
    where
        C: Certificate + 'c,
        I: IntoIterator<Item = &'c C>,
        V: SignatureVerifier<C>,
    {
        let mut assembler = NetworkAssembler::new(self.reference_time);
        let index = self.synopsize(certificates, &mut assembler);
        self.find_edges(&index, &mut assembler);

        let network = assembler.build();
        log::debug!(
            "Built network at {}: {} nodes, {} edges, {} signatures",
            self.reference_time,
            network.number_of_nodes(),
            network.number_of_edges(),
            network.number_of_signatures()
        );
        network
    }

    // ── Phase 1: index and synopsize ─────────────────────────────────────────

    fn synopsize<'c, C, I>(
        &self,
        certificates: I,
        assembler: &mut NetworkAssembler,
    ) -> CertificateIndex<'c, C>
    where
        C: Certificate + 'c,
        I: IntoIterator<Item = &'c C>,
    {
        let mut index = CertificateIndex {
            by_fingerprint: BTreeMap::new(),
            by_key_id: HashMap::new(),
        };

        let mut seen = HashSet::new();
        for certificate in certificates {
            let fingerprint = certificate.fingerprint();
            if !seen.insert(fingerprint.clone()) {
                log::warn!("Ignoring duplicate certificate {fingerprint}");
                continue;
            }

            if !certificate.can_certify() {
                log::warn!("Skipping {fingerprint}: no certification-capable key");
                continue;
            }

            let synopsis = CertSynopsis::new(
                fingerprint.clone(),
                certificate.certification_expiration(),
                certificate.revocation_state(),
                certificate.user_ids(),
            );
            if !synopsis.has_valid_user_id(self.reference_time) {
                log::warn!(
                    "Skipping {fingerprint}: no valid user ID at {}",
                    self.reference_time
                );
                continue;
            }

            for key_id in certificate.signing_key_ids() {
                index
                    .by_key_id
                    .entry(key_id)
                    .or_default()
                    .push(fingerprint.clone());
            }
            index.by_fingerprint.insert(fingerprint, certificate);
            assembler.add_node(synopsis);
        }

        index
    }

    // ── Phase 2: verify and assemble edges ───────────────────────────────────

    fn find_edges<C>(&self, index: &CertificateIndex<'_, C>, assembler: &mut NetworkAssembler)
    where
        C: Certificate,
        V: SignatureVerifier<C>,
    {
        for (fingerprint, &target) in &index.by_fingerprint {
            let Some(target_synopsis) = assembler.node(fingerprint).cloned() else {
                continue;
            };

            for signature in target.delegations() {
                let verified = self.first_verifying_issuer(index, fingerprint, signature, |issuer| {
                    self.verifier
                        .verify_delegation(issuer, target, signature, self.reference_time)
                });
                if let Some(issuer) = verified {
                    self.add_edge(assembler, issuer, &target_synopsis, None, signature);
                }
            }

            let user_ids: Vec<String> = target_synopsis
                .user_ids()
                .map(|(user_id, _)| user_id.to_string())
                .collect();
            for user_id in user_ids {
                for signature in target.certifications(&user_id) {
                    let verified =
                        self.first_verifying_issuer(index, fingerprint, signature, |issuer| {
                            self.verifier.verify_certification(
                                issuer,
                                target,
                                &user_id,
                                signature,
                                self.reference_time,
                            )
                        });
                    if let Some(issuer) = verified {
                        self.add_edge(
                            assembler,
                            issuer,
                            &target_synopsis,
                            Some(user_id.clone()),
                            signature,
                        );
                    }
                }
            }
        }
    }

    /// Try every issuer candidate for the signature's key ID; the first one
    /// under which the signature verifies is the issuer.
    fn first_verifying_issuer<C, S, F>(
        &self,
        index: &CertificateIndex<'_, C>,
        target: &Fingerprint,
        signature: &S,
        verify: F,
    ) -> Option<Fingerprint>
    where
        C: Certificate,
        S: Signature,
        F: Fn(&C) -> crate::Result<()>,
    {
        let key_id = signature.issuer_key_id()?;
        let candidates = index.by_key_id.get(&key_id)?;

        for candidate in candidates {
            // Self-signatures are not edges.
            if candidate == target {
                continue;
            }
            let Some(&issuer) = index.by_fingerprint.get(candidate) else {
                continue;
            };
            match verify(issuer) {
                Ok(()) => return Some(candidate.clone()),
                Err(e) => log::warn!(
                    "Signature over {target} by {candidate} (key {key_id}) rejected: {e}"
                ),
            }
        }
        None
    }

    fn add_edge<S: Signature>(
        &self,
        assembler: &mut NetworkAssembler,
        issuer: Fingerprint,
        target: &Arc<CertSynopsis>,
        user_id: Option<String>,
        signature: &S,
    ) {
        let Some(issuer) = assembler.node(&issuer).cloned() else {
            return;
        };
        let certification = match Certification::from_signature(
            issuer,
            Arc::clone(target),
            user_id,
            &signature.metadata(),
        ) {
            Ok(certification) => certification,
            Err(e) => {
                log::warn!("Dropping certification of {}: {e}", target.fingerprint());
                return;
            }
        };

        log::debug!("Adding edge {certification}");
        if let Err(e) = assembler.add_certification(certification) {
            log::warn!("Dropping certification of {}: {e}", target.fingerprint());
        }
    }
}
