//! The assembled trust graph.
//!
//! Certification sets live in one arena. The forward and reverse
//! adjacency maps only hold arena indices, so both directions always see
//! the same edge.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::Result;
use crate::synopsis::{CertSynopsis, Certification, CertificationSet, Fingerprint};
use crate::time::ReferenceTime;

/// An immutable Web of Trust network, evaluated at one reference time.
#[derive(Debug, Clone)]
pub struct Network {
    nodes: BTreeMap<Fingerprint, Arc<CertSynopsis>>,
    edge_sets: Vec<CertificationSet>,
    edges: BTreeMap<Fingerprint, Vec<usize>>,
    reverse_edges: BTreeMap<Fingerprint, Vec<usize>>,
    reference_time: ReferenceTime,
}

impl Network {
    /// A network without nodes or edges.
    pub fn empty(reference_time: ReferenceTime) -> Self {
        NetworkAssembler::new(reference_time).build()
    }

    /// All nodes, ordered by fingerprint.
    pub fn nodes(&self) -> impl Iterator<Item = &Arc<CertSynopsis>> {
        self.nodes.values()
    }

    pub fn node(&self, fingerprint: &Fingerprint) -> Option<&Arc<CertSynopsis>> {
        self.nodes.get(fingerprint)
    }

    pub fn contains(&self, fingerprint: &Fingerprint) -> bool {
        self.nodes.contains_key(fingerprint)
    }

    /// Certification sets issued by `issuer`.
    pub fn edges_from(&self, issuer: &Fingerprint) -> impl Iterator<Item = &CertificationSet> {
        self.lookup(&self.edges, issuer)
    }

    /// Certification sets targeting `target`.
    pub fn edges_to(&self, target: &Fingerprint) -> impl Iterator<Item = &CertificationSet> {
        self.lookup(&self.reverse_edges, target)
    }

    /// The certification set for the `issuer` → `target` pair.
    pub fn edge(&self, issuer: &Fingerprint, target: &Fingerprint) -> Option<&CertificationSet> {
        self.edges_from(issuer)
            .find(|set| set.target().fingerprint() == target)
    }

    /// Return `true` if `issuer` has an entry in the forward index.
    pub fn has_outgoing(&self, issuer: &Fingerprint) -> bool {
        self.edges.contains_key(issuer)
    }

    /// Return `true` if `target` has an entry in the reverse index.
    pub fn has_incoming(&self, target: &Fingerprint) -> bool {
        self.reverse_edges.contains_key(target)
    }

    pub fn number_of_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of certification sets.
    pub fn number_of_edges(&self) -> usize {
        self.edge_sets.len()
    }

    /// Number of individual certifications across all sets.
    pub fn number_of_signatures(&self) -> usize {
        self.edge_sets.iter().map(CertificationSet::len).sum()
    }

    pub fn reference_time(&self) -> ReferenceTime {
        self.reference_time
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn lookup<'a>(
        &'a self,
        index: &'a BTreeMap<Fingerprint, Vec<usize>>,
        key: &Fingerprint,
    ) -> impl Iterator<Item = &'a CertificationSet> + 'a {
        index
            .get(key)
            .into_iter()
            .flatten()
            .filter_map(move |&i| self.edge_sets.get(i))
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Network with {} nodes, {} edges, {} signatures at {}",
            self.number_of_nodes(),
            self.number_of_edges(),
            self.number_of_signatures(),
            self.reference_time
        )?;
        for (fingerprint, node) in &self.nodes {
            writeln!(f, "{node}")?;
            for set in self.edges_from(fingerprint) {
                for certification in set.certifications() {
                    writeln!(f, "  {certification}")?;
                }
            }
        }
        Ok(())
    }
}

// ── Assembly ─────────────────────────────────────────────────────────────────

/// Incremental construction of a [`Network`].
///
/// Used by the builder, and directly by callers that already hold
/// synopses and certifications.
#[derive(Debug)]
pub struct NetworkAssembler {
    network: Network,
}

impl NetworkAssembler {
    pub fn new(reference_time: ReferenceTime) -> Self {
        Self {
            network: Network {
                nodes: BTreeMap::new(),
                edge_sets: Vec::new(),
                edges: BTreeMap::new(),
                reverse_edges: BTreeMap::new(),
                reference_time,
            },
        }
    }

    /// Add a node. The first synopsis for a fingerprint wins; the shared
    /// handle of the stored node is returned.
    pub fn add_node(&mut self, synopsis: CertSynopsis) -> Arc<CertSynopsis> {
        Arc::clone(
            self.network
                .nodes
                .entry(synopsis.fingerprint().clone())
                .or_insert_with(|| Arc::new(synopsis)),
        )
    }

    pub fn node(&self, fingerprint: &Fingerprint) -> Option<&Arc<CertSynopsis>> {
        self.network.nodes.get(fingerprint)
    }

    /// Fold a certification into the set for its (issuer, target) pair,
    /// creating the set in the arena and both indices when missing.
    ///
    /// Issuer and target are registered as nodes if they are not yet.
    ///
    /// # Errors
    ///
    /// Propagates set invariant violations; none occur when both
    /// synopses are the ones stored in this assembler.
    pub fn add_certification(&mut self, certification: Certification) -> Result<()> {
        let issuer = certification.issuer().fingerprint().clone();
        let target = certification.target().fingerprint().clone();

        for synopsis in [certification.issuer(), certification.target()] {
            self.network
                .nodes
                .entry(synopsis.fingerprint().clone())
                .or_insert_with(|| Arc::clone(synopsis));
        }

        let network = &mut self.network;
        let existing = network.edges.get(&issuer).and_then(|indices| {
            indices
                .iter()
                .copied()
                .find(|&i| network.edge_sets[i].target().fingerprint() == &target)
        });

        match existing {
            Some(index) => network.edge_sets[index].add(certification),
            None => {
                let index = network.edge_sets.len();
                network
                    .edge_sets
                    .push(CertificationSet::from_certification(certification));
                network.edges.entry(issuer).or_default().push(index);
                network.reverse_edges.entry(target).or_default().push(index);
                Ok(())
            }
        }
    }

    pub fn build(self) -> Network {
        self.network
    }
}
