//! Stress test: dense networks.
//!
//! Every node delegates to every other node; the search must terminate
//! quickly and never return a path with a repeated certificate.

use std::collections::HashSet;
use std::sync::Arc;

use openpgp_wot::{
    CertSynopsis, CertificateAuthority, Certification, Depth, Fingerprint, NetworkAssembler,
    ReferenceTime, RevocationState, Root, Roots,
};

const NOW: u64 = 1_000_000;

fn fingerprint(i: usize) -> Fingerprint {
    Fingerprint::new(&format!("{:040X}", i + 1)).unwrap()
}

fn user_id(i: usize) -> String {
    format!("<node{i}@example.org>")
}

fn complete_graph(n: usize, amount: u8) -> CertificateAuthority {
    let mut assembler = NetworkAssembler::new(ReferenceTime::at(NOW));
    let nodes: Vec<Arc<CertSynopsis>> = (0..n)
        .map(|i| {
            assembler.add_node(CertSynopsis::new(
                fingerprint(i),
                None,
                RevocationState::NotRevoked,
                [(user_id(i), RevocationState::NotRevoked)],
            ))
        })
        .collect();

    for from in &nodes {
        for to in &nodes {
            if Arc::ptr_eq(from, to) {
                continue;
            }
            assembler
                .add_certification(
                    Certification::new(from.clone(), to.clone(), None, 1)
                        .with_trust(Depth::unconstrained(), amount),
                )
                .unwrap();
        }
    }

    CertificateAuthority::new(assembler.build(), Roots::new([Root::full(fingerprint(0))]))
}

#[test]
fn stress_complete_graph_of_60() {
    let n = 60;
    let ca = complete_graph(n, 120);
    assert_eq!(ca.network().number_of_edges(), n * (n - 1));

    for i in [1, n / 2, n - 1] {
        let binding = ca.authenticate(&fingerprint(i), &user_id(i));
        assert_eq!(binding.amount(), 120);
        // Direct delegation, then the self-signature.
        assert_eq!(binding.paths.iter().next().unwrap().path().len(), 3);
    }
}

#[test]
fn stress_weak_edges_accumulate_without_repeats() {
    let n = 30;
    let ca = complete_graph(n, 10);

    let target = n - 1;
    let binding = ca.authenticate(&fingerprint(target), &user_id(target));
    assert!(binding.amount() >= 10);
    assert!(binding.amount() <= 120);

    for item in binding.paths.iter() {
        let path = item.path();
        assert!(item.amount() <= path.amount());

        // Only the final self-signature may repeat the target.
        let certificates: Vec<_> = path.certificates().map(|c| c.fingerprint().clone()).collect();
        let interior = &certificates[..certificates.len() - 1];
        let unique: HashSet<_> = interior.iter().collect();
        assert_eq!(unique.len(), interior.len());
    }
}
