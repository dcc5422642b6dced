//! Stress test: long delegation chains.
//!
//! Builds chains of several hundred introducers directly with
//! `NetworkAssembler` and checks depth enforcement along the whole chain.

use std::sync::Arc;

use openpgp_wot::{
    CertSynopsis, CertificateAuthority, Certification, Depth, Fingerprint, NetworkAssembler,
    ReferenceTime, RevocationState, Root, Roots,
};

const NOW: u64 = 1_000_000;

fn fingerprint(i: usize) -> Fingerprint {
    Fingerprint::new(&format!("{i:040X}")).unwrap()
}

fn user_id(i: usize) -> String {
    format!("<node{i}@example.org>")
}

fn node(assembler: &mut NetworkAssembler, i: usize) -> Arc<CertSynopsis> {
    assembler.add_node(CertSynopsis::new(
        fingerprint(i),
        None,
        RevocationState::NotRevoked,
        [(user_id(i), RevocationState::NotRevoked)],
    ))
}

/// Node 0 delegates to node 1, ..., node n-2 certifies node n-1.
/// `depth(i)` is the depth of the delegation issued by node `i`.
fn chain(n: usize, depth: impl Fn(usize) -> Depth) -> CertificateAuthority {
    let mut assembler = NetworkAssembler::new(ReferenceTime::at(NOW));
    let nodes: Vec<_> = (0..n).map(|i| node(&mut assembler, i)).collect();

    for i in 0..n - 2 {
        assembler
            .add_certification(
                Certification::new(nodes[i].clone(), nodes[i + 1].clone(), None, 1)
                    .with_trust(depth(i), 120),
            )
            .unwrap();
    }
    assembler
        .add_certification(Certification::new(
            nodes[n - 2].clone(),
            nodes[n - 1].clone(),
            Some(user_id(n - 1)),
            1,
        ))
        .unwrap();

    CertificateAuthority::new(assembler.build(), Roots::new([Root::full(fingerprint(0))]))
}

#[test]
fn stress_unconstrained_chain_of_300() {
    let n = 300;
    let ca = chain(n, |_| Depth::unconstrained());

    let binding = ca.authenticate(&fingerprint(n - 1), &user_id(n - 1));
    assert_eq!(binding.amount(), 120);
    assert_eq!(binding.paths.iter().next().unwrap().path().len(), n);
}

#[test]
fn stress_exact_depth_chain() {
    let n = 200;
    // Node i must still cover the n - 2 - i hops after its own.
    let ca = chain(n, |i| Depth::limited((n - 2 - i) as u32).unwrap());
    assert_eq!(ca.authenticate(&fingerprint(n - 1), &user_id(n - 1)).amount(), 120);

    // One hop short anywhere breaks it.
    let ca = chain(n, |i| {
        let needed = (n - 2 - i) as u32;
        Depth::limited(if i == n / 2 { needed - 1 } else { needed }).unwrap()
    });
    assert_eq!(ca.authenticate(&fingerprint(n - 1), &user_id(n - 1)).amount(), 0);
}

#[test]
fn stress_explicit_path_over_chain() {
    let n = 100;
    let ca = chain(n, |_| Depth::unconstrained());
    let fingerprints: Vec<_> = (0..n).map(fingerprint).collect();

    let binding = ca.check_path(&fingerprints, &user_id(n - 1)).unwrap();
    assert_eq!(binding.amount(), 120);

    // Skipping a node leaves a hop without a certification.
    let mut gapped = fingerprints.clone();
    gapped.remove(n / 2);
    assert!(ca.check_path(&gapped, &user_id(n - 1)).is_err());
}
