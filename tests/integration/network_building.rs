//! Integration tests for network construction from a keyring.
//!
//! Certificates are generated with `SecretCertificate`, signed with
//! Ed25519, and turned into a `Network` by `NetworkBuilder` with the
//! `Ed25519Verifier`.

use openpgp_wot::keyring::{CertificateRecord, SecretCertificate, TrustParams};
use openpgp_wot::{Depth, Ed25519Verifier, Fingerprint, Network, NetworkBuilder, ReferenceTime};

const T0: u64 = 1_600_000_000_000_000;
const NOW: u64 = T0 + 3_600_000_000;

fn build(certs: &[&SecretCertificate]) -> Network {
    let records: Vec<CertificateRecord> = certs.iter().map(|c| c.record().clone()).collect();
    NetworkBuilder::new(Ed25519Verifier::new(), ReferenceTime::at(NOW)).build(&records)
}

fn targets(network: &Network, issuer: &Fingerprint) -> Vec<Fingerprint> {
    let mut targets: Vec<_> = network
        .edges_from(issuer)
        .map(|set| set.target().fingerprint().clone())
        .collect();
    targets.sort();
    targets
}

#[test]
fn empty_keyring_builds_empty_network() {
    let records: Vec<CertificateRecord> = Vec::new();
    let network = NetworkBuilder::new(Ed25519Verifier::new(), ReferenceTime::at(NOW)).build(&records);

    assert!(network.is_empty());
    assert_eq!(network.number_of_nodes(), 0);
    assert_eq!(network.number_of_edges(), 0);
    assert_eq!(network.nodes().count(), 0);
}

#[test]
fn single_delegation_creates_one_edge() {
    let a = SecretCertificate::generate(["A <a@example.org>"], T0);
    let mut b = SecretCertificate::generate(["B <b@example.org>"], T0);
    a.delegate(b.record_mut(), TrustParams::at(T0 + 1).trust(1, 120))
        .expect("delegate");

    let network = build(&[&a, &b]);

    assert_eq!(network.number_of_nodes(), 2);
    let forward: Vec<_> = network.edges_from(a.fingerprint()).collect();
    assert_eq!(forward.len(), 1);
    assert_eq!(forward[0].target().fingerprint(), b.fingerprint());

    let reverse: Vec<_> = network.edges_to(b.fingerprint()).collect();
    assert_eq!(reverse.len(), 1);
    assert_eq!(reverse[0].issuer().fingerprint(), a.fingerprint());

    assert!(network.edge(b.fingerprint(), a.fingerprint()).is_none());
    assert!(!network.has_outgoing(b.fingerprint()));

    let delegation = forward[0].delegation().expect("delegation");
    assert_eq!(delegation.trust_depth(), Depth::auto(1));
    assert_eq!(delegation.trust_amount(), 120);
}

#[test]
fn two_disconnected_clusters() {
    let foo_ca = SecretCertificate::generate(["Foo CA <ca@foo.com>"], T0);
    let mut foo_employee = SecretCertificate::generate(["Foo Employee <employee@foo.com>"], T0);
    let mut foo_admin = SecretCertificate::generate(["Foo Admin <admin@foo.com>"], T0);
    let bar_ca = SecretCertificate::generate(["Bar CA <ca@bar.com>"], T0);
    let mut bar_employee = SecretCertificate::generate(["Bar Employee <employee@bar.com>"], T0);

    foo_ca
        .certify(
            foo_employee.record_mut(),
            "Foo Employee <employee@foo.com>",
            TrustParams::at(T0 + 1),
        )
        .unwrap();
    foo_ca
        .delegate(foo_admin.record_mut(), TrustParams::at(T0 + 1).trust(1, 120))
        .unwrap();
    bar_ca
        .certify(
            bar_employee.record_mut(),
            "Bar Employee <employee@bar.com>",
            TrustParams::at(T0 + 1),
        )
        .unwrap();

    let network = build(&[&foo_ca, &foo_employee, &foo_admin, &bar_ca, &bar_employee]);

    assert_eq!(network.number_of_nodes(), 5);

    let mut expected = vec![
        foo_employee.fingerprint().clone(),
        foo_admin.fingerprint().clone(),
    ];
    expected.sort();
    assert_eq!(targets(&network, foo_ca.fingerprint()), expected);
    assert_eq!(
        targets(&network, bar_ca.fingerprint()),
        vec![bar_employee.fingerprint().clone()]
    );

    let foo = [foo_ca.fingerprint(), foo_employee.fingerprint(), foo_admin.fingerprint()];
    let bar = [bar_ca.fingerprint(), bar_employee.fingerprint()];
    for f in foo {
        for b in bar {
            assert!(network.edge(f, b).is_none());
            assert!(network.edge(b, f).is_none());
        }
    }
}

#[test]
fn forward_and_reverse_views_agree() {
    let ca = SecretCertificate::generate(["CA"], T0);
    let mut alice = SecretCertificate::generate(["Alice", "Alice (work)"], T0);
    let mut bob = SecretCertificate::generate(["Bob"], T0);

    ca.certify(alice.record_mut(), "Alice", TrustParams::at(T0 + 1)).unwrap();
    ca.certify(alice.record_mut(), "Alice (work)", TrustParams::at(T0 + 2))
        .unwrap();
    ca.delegate(alice.record_mut(), TrustParams::at(T0 + 3).trust(1, 60))
        .unwrap();
    alice.certify(bob.record_mut(), "Bob", TrustParams::at(T0 + 4)).unwrap();

    let network = build(&[&ca, &alice, &bob]);

    assert_eq!(network.number_of_edges(), 2);
    assert_eq!(network.number_of_signatures(), 4);

    let forward = network
        .edge(ca.fingerprint(), alice.fingerprint())
        .expect("forward edge");
    let reverse = network
        .edges_to(alice.fingerprint())
        .next()
        .expect("reverse edge");
    assert_eq!(forward, reverse);
    assert_eq!(forward.len(), 3);
    assert!(forward.get(Some("Alice (work)")).is_some());
}

#[test]
fn newest_certification_wins() {
    let ca = SecretCertificate::generate(["CA"], T0);
    let mut alice = SecretCertificate::generate(["Alice"], T0);

    ca.certify(alice.record_mut(), "Alice", TrustParams::at(T0 + 10).trust(0, 60))
        .unwrap();
    ca.certify(alice.record_mut(), "Alice", TrustParams::at(T0 + 5).trust(0, 30))
        .unwrap();
    ca.certify(alice.record_mut(), "Alice", TrustParams::at(T0 + 20).trust(0, 90))
        .unwrap();

    let network = build(&[&ca, &alice]);
    let set = network
        .edge(ca.fingerprint(), alice.fingerprint())
        .expect("edge");
    assert_eq!(set.len(), 1);
    let certification = set.get(Some("Alice")).expect("certification");
    assert_eq!(certification.trust_amount(), 90);
    assert_eq!(certification.creation_time(), T0 + 20);
}

#[test]
fn revoked_certification_overrides_older() {
    let ca = SecretCertificate::generate(["CA"], T0);
    let mut alice = SecretCertificate::generate(["Alice"], T0);

    ca.delegate(alice.record_mut(), TrustParams::at(T0 + 1).trust(2, 120))
        .unwrap();
    ca.revoke_certification(alice.record_mut(), None, T0 + 2).unwrap();

    let network = build(&[&ca, &alice]);
    let delegation = network
        .edge(ca.fingerprint(), alice.fingerprint())
        .and_then(|set| set.delegation())
        .expect("delegation");
    assert_eq!(delegation.trust_amount(), 0);
    assert_eq!(delegation.trust_depth(), Depth::auto(0));
}

#[test]
fn invalid_signatures_do_not_create_edges() {
    let ca = SecretCertificate::generate(["CA"], T0);
    let mallory = SecretCertificate::generate(["Mallory"], T0);
    let mut alice = SecretCertificate::generate(["Alice"], T0);

    ca.certify(alice.record_mut(), "Alice", TrustParams::at(T0 + 1)).unwrap();
    // Issued by a key the network does not know.
    let outsider = SecretCertificate::generate(["Outsider"], T0);
    outsider
        .certify(alice.record_mut(), "Alice", TrustParams::at(T0 + 1))
        .unwrap();
    // Claims to be from Mallory but is signed by the CA's key.
    let mut forged = alice.record().user_ids[0].certifications[0].clone();
    forged.issuer = mallory.key_id();
    alice.record_mut().user_ids[0].certifications.push(forged);
    // Made in the future.
    mallory
        .certify(alice.record_mut(), "Alice", TrustParams::at(NOW + 1))
        .unwrap();

    let network = build(&[&ca, &mallory, &alice]);

    assert_eq!(network.number_of_nodes(), 3);
    assert_eq!(network.number_of_edges(), 1);
    assert!(network
        .edge(mallory.fingerprint(), alice.fingerprint())
        .is_none());
}

#[test]
fn unusable_certificates_are_left_out() {
    let ca = SecretCertificate::generate(["CA"], T0);
    let mut revoked_uid = SecretCertificate::generate(["Gone"], T0);
    revoked_uid.revoke_user_id("Gone", false, T0 + 1).unwrap();
    let mut fine = SecretCertificate::generate(["Fine"], T0);
    ca.certify(fine.record_mut(), "Fine", TrustParams::at(T0 + 1)).unwrap();

    let network = build(&[&ca, &revoked_uid, &fine]);

    assert_eq!(network.number_of_nodes(), 2);
    assert!(!network.contains(revoked_uid.fingerprint()));
    assert!(network.contains(fine.fingerprint()));
}

#[test]
fn expired_issuer_signatures_after_expiry_rejected() {
    let ca = SecretCertificate::generate(["CA"], T0).with_expiration(T0 + 100);
    let mut alice = SecretCertificate::generate(["Alice"], T0);
    let mut bob = SecretCertificate::generate(["Bob"], T0);

    ca.certify(alice.record_mut(), "Alice", TrustParams::at(T0 + 50)).unwrap();
    ca.certify(bob.record_mut(), "Bob", TrustParams::at(T0 + 150)).unwrap();

    let network = build(&[&ca, &alice, &bob]);
    assert!(network.edge(ca.fingerprint(), alice.fingerprint()).is_some());
    assert!(network.edge(ca.fingerprint(), bob.fingerprint()).is_none());
}
