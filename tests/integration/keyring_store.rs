//! Integration tests for the keyring directory store.
//!
//! Certificates go through the store on disk before the network is built,
//! so these tests cover the file format, the trust root, and import.

use openpgp_wot::keyring::{KeyringStore, SecretCertificate, TrustParams};
use openpgp_wot::{
    CertificateAuthority, Ed25519Verifier, NetworkBuilder, ReferenceTime, Root, Roots,
};

const T0: u64 = 1_600_000_000_000_000;
const NOW: u64 = T0 + 60_000_000;

#[test]
fn keyring_round_trip_authenticates() {
    let dir = tempfile::tempdir().unwrap();
    let store = KeyringStore::new(dir.path()).unwrap();

    let root = SecretCertificate::generate(["Root <root@example.org>"], T0);
    let mut alice = SecretCertificate::generate(["Alice <alice@example.org>"], T0);
    let mut bob = SecretCertificate::generate(["Bob <bob@example.org>"], T0);
    root.delegate(alice.record_mut(), TrustParams::at(T0 + 1).trust(1, 120))
        .unwrap();
    alice
        .certify(bob.record_mut(), "Bob <bob@example.org>", TrustParams::at(T0 + 2))
        .unwrap();

    store.set_trust_root(root.record()).unwrap();
    store.save(alice.record()).unwrap();
    store.save(bob.record()).unwrap();

    let trust_root = store.trust_root().unwrap().expect("trust root");
    let certificates = store.certificates().unwrap();
    assert_eq!(certificates.len(), 3);

    let network =
        NetworkBuilder::new(Ed25519Verifier::new(), ReferenceTime::at(NOW)).build(&certificates);
    assert_eq!(network.number_of_nodes(), 3);
    assert_eq!(network.number_of_edges(), 2);

    let ca = CertificateAuthority::new(network, Roots::new([Root::full(trust_root.fingerprint)]));
    assert!(ca
        .is_authorized(bob.fingerprint(), "Bob <bob@example.org>")
        .is_authorized());
}

#[test]
fn tampered_file_breaks_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let store = KeyringStore::new(dir.path()).unwrap();

    let root = SecretCertificate::generate(["Root"], T0);
    let mut bob = SecretCertificate::generate(["Bob"], T0);
    root.certify(bob.record_mut(), "Bob", TrustParams::at(T0 + 1).trust(0, 60))
        .unwrap();
    store.save(root.record()).unwrap();

    // Raise the trust amount without re-signing.
    let mut record = bob.record().clone();
    record.user_ids[0].certifications[0].trust =
        Some(openpgp_wot::TrustSignature { depth: 0, amount: 120 });
    store.save(&record).unwrap();

    let certificates = store.certificates().unwrap();
    let network =
        NetworkBuilder::new(Ed25519Verifier::new(), ReferenceTime::at(NOW)).build(&certificates);
    assert!(network.edge(root.fingerprint(), bob.fingerprint()).is_none());

    let ca = CertificateAuthority::new(network, Roots::new([Root::full(root.fingerprint().clone())]));
    assert_eq!(ca.authenticate(bob.fingerprint(), "Bob").amount(), 0);
}

#[test]
fn import_then_build() {
    let dir = tempfile::tempdir().unwrap();
    let store = KeyringStore::new(dir.path().join("keyring")).unwrap();

    let root = SecretCertificate::generate(["Root"], T0);
    let mut bob = SecretCertificate::generate(["Bob"], T0);
    root.certify(bob.record_mut(), "Bob", TrustParams::at(T0 + 1)).unwrap();

    for (name, cert) in [("root.json", &root), ("bob.json", &bob)] {
        let path = dir.path().join(name);
        std::fs::write(&path, serde_json::to_string_pretty(cert.record()).unwrap()).unwrap();
        assert_eq!(&store.import_file(&path).unwrap(), cert.fingerprint());
    }

    let mut listed = store.list_fingerprints().unwrap();
    listed.sort();
    let mut expected = vec![root.fingerprint().clone(), bob.fingerprint().clone()];
    expected.sort();
    assert_eq!(listed, expected);

    let network = NetworkBuilder::new(Ed25519Verifier::new(), ReferenceTime::at(NOW))
        .build(&store.certificates().unwrap());
    let ca = CertificateAuthority::new(network, Roots::new([Root::full(root.fingerprint().clone())]));
    assert_eq!(ca.authenticate(bob.fingerprint(), "Bob").amount(), 120);
}

#[test]
fn corrupt_files_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let store = KeyringStore::new(dir.path()).unwrap();

    let root = SecretCertificate::generate(["Root"], T0);
    store.save(root.record()).unwrap();
    let bob = SecretCertificate::generate(["Bob"], T0);
    std::fs::write(
        dir.path()
            .join("certs")
            .join(format!("{}.json", bob.fingerprint())),
        b"{ truncated",
    )
    .unwrap();

    let certificates = store.certificates().unwrap();
    assert_eq!(certificates.len(), 1);
    assert_eq!(&certificates[0].fingerprint, root.fingerprint());
}
