//! End-to-end authentication tests.
//!
//! Each test builds a small keyring with `SecretCertificate`, turns it into
//! a network, and asks a `CertificateAuthority` about one binding.

use openpgp_wot::keyring::{CertificateRecord, SecretCertificate, TrustParams};
use openpgp_wot::{
    AuthenticationLevel, Authorization, CertificateAuthority, Denial, Ed25519Verifier,
    Fingerprint, NetworkBuilder, NetworkMode, QueryConfig, ReferenceTime, Root, Roots,
};

const T0: u64 = 1_600_000_000_000_000;
const NOW: u64 = T0 + 86_400_000_000;

const EXAMPLE_ORG: &str = r".*<[^>]+[@.]example\.org>";

fn authority(certs: &[&SecretCertificate], roots: Vec<Root>) -> CertificateAuthority {
    let records: Vec<CertificateRecord> = certs.iter().map(|c| c.record().clone()).collect();
    let network =
        NetworkBuilder::new(Ed25519Verifier::new(), ReferenceTime::at(NOW)).build(&records);
    CertificateAuthority::new(network, Roots::new(roots))
}

fn full(cert: &SecretCertificate) -> Root {
    Root::full(cert.fingerprint().clone())
}

fn amount(authority: &CertificateAuthority, cert: &SecretCertificate, user_id: &str) -> u32 {
    authority.authenticate(cert.fingerprint(), user_id).amount()
}

#[test]
fn simple_chain() {
    let root = SecretCertificate::generate(["Root <root@example.org>"], T0);
    let mut alice = SecretCertificate::generate(["Alice <alice@example.org>"], T0);
    let mut bob = SecretCertificate::generate(["Bob <bob@example.org>"], T0);

    root.delegate(alice.record_mut(), TrustParams::at(T0 + 1).trust(1, 120))
        .unwrap();
    alice
        .certify(bob.record_mut(), "Bob <bob@example.org>", TrustParams::at(T0 + 2))
        .unwrap();

    let ca = authority(&[&root, &alice, &bob], vec![full(&root)]);

    let binding = ca.authenticate(bob.fingerprint(), "Bob <bob@example.org>");
    assert_eq!(binding.amount(), 120);
    assert!(binding.is_fully_trusted());
    assert_eq!(binding.paths.len(), 1);

    let path = binding.paths.iter().next().unwrap().path();
    let hops: Vec<&Fingerprint> = path.certificates().map(|c| c.fingerprint()).collect();
    assert_eq!(hops, vec![root.fingerprint(), alice.fingerprint(), bob.fingerprint()]);

    assert_eq!(
        ca.is_authorized(bob.fingerprint(), "Bob <bob@example.org>"),
        Authorization::Authorized { amount: 120 }
    );

    // Alice only holds a delegation, completed by her own binding.
    assert_eq!(amount(&ca, &alice, "Alice <alice@example.org>"), 120);
    // The root authenticates its own user ID.
    assert_eq!(amount(&ca, &root, "Root <root@example.org>"), 120);
    // Bob has no such user ID.
    assert_eq!(amount(&ca, &bob, "Robert <bob@example.org>"), 0);
}

#[test]
fn depth_limits_chain_length() {
    let root = SecretCertificate::generate(["Root"], T0);
    let mut alice = SecretCertificate::generate(["Alice"], T0);
    let mut carol = SecretCertificate::generate(["Carol"], T0);
    let mut dave = SecretCertificate::generate(["Dave"], T0);

    root.delegate(alice.record_mut(), TrustParams::at(T0 + 1).trust(1, 120))
        .unwrap();
    alice
        .delegate(carol.record_mut(), TrustParams::at(T0 + 1).trust(1, 120))
        .unwrap();
    carol
        .certify(dave.record_mut(), "Dave", TrustParams::at(T0 + 1))
        .unwrap();

    let ca = authority(&[&root, &alice, &carol, &dave], vec![full(&root)]);
    assert_eq!(amount(&ca, &dave, "Dave"), 0);
    assert_eq!(
        ca.is_authorized(dave.fingerprint(), "Dave"),
        Authorization::NotAuthorized {
            reason: Denial::NoPath
        }
    );

    // The self-signature is a hop too: Carol's own binding is out of reach.
    assert_eq!(amount(&ca, &carol, "Carol"), 0);
    assert_eq!(amount(&ca, &alice, "Alice"), 120);

    // In the certification network every edge is an unconstrained
    // introducer.
    let ca = ca.with_config(QueryConfig::default().with_mode(NetworkMode::Certification));
    assert_eq!(amount(&ca, &dave, "Dave"), 120);
}

#[test]
fn sufficient_depth_reaches_further() {
    let root = SecretCertificate::generate(["Root"], T0);
    let mut alice = SecretCertificate::generate(["Alice"], T0);
    let mut carol = SecretCertificate::generate(["Carol"], T0);
    let mut dave = SecretCertificate::generate(["Dave"], T0);

    root.delegate(alice.record_mut(), TrustParams::at(T0 + 1).trust(2, 120))
        .unwrap();
    alice
        .delegate(carol.record_mut(), TrustParams::at(T0 + 1).trust(1, 100))
        .unwrap();
    carol
        .certify(dave.record_mut(), "Dave", TrustParams::at(T0 + 1))
        .unwrap();

    let ca = authority(&[&root, &alice, &carol, &dave], vec![full(&root)]);
    let binding = ca.authenticate(dave.fingerprint(), "Dave");
    assert_eq!(binding.amount(), 100);
    assert_eq!(binding.paths.iter().next().unwrap().path().len(), 4);
}

#[test]
fn regex_scopes_delegation() {
    let root = SecretCertificate::generate(["Root <root@example.org>"], T0);
    let mut ca_cert = SecretCertificate::generate(["Example CA <ca@example.org>"], T0);
    let mut bob = SecretCertificate::generate(["Bob <bob@example.org>"], T0);
    let mut eve = SecretCertificate::generate(["Eve <eve@other.org>"], T0);

    root.delegate(
        ca_cert.record_mut(),
        TrustParams::at(T0 + 1).trust(1, 120).regex(EXAMPLE_ORG),
    )
    .unwrap();
    ca_cert
        .certify(bob.record_mut(), "Bob <bob@example.org>", TrustParams::at(T0 + 2))
        .unwrap();
    ca_cert
        .certify(eve.record_mut(), "Eve <eve@other.org>", TrustParams::at(T0 + 2))
        .unwrap();

    let ca = authority(&[&root, &ca_cert, &bob, &eve], vec![full(&root)]);
    assert_eq!(amount(&ca, &bob, "Bob <bob@example.org>"), 120);
    assert_eq!(amount(&ca, &eve, "Eve <eve@other.org>"), 0);
}

#[test]
fn partial_roots_add_up() {
    let root1 = SecretCertificate::generate(["Root 1"], T0);
    let root2 = SecretCertificate::generate(["Root 2"], T0);
    let mut bob = SecretCertificate::generate(["Bob"], T0);

    root1.certify(bob.record_mut(), "Bob", TrustParams::at(T0 + 1)).unwrap();
    root2.certify(bob.record_mut(), "Bob", TrustParams::at(T0 + 1)).unwrap();

    let both = authority(
        &[&root1, &root2, &bob],
        vec![
            Root::new(root1.fingerprint().clone(), 60),
            Root::new(root2.fingerprint().clone(), 60),
        ],
    );
    let binding = both.authenticate(bob.fingerprint(), "Bob");
    assert_eq!(binding.amount(), 120);
    assert_eq!(binding.paths.len(), 2);
    assert!(binding.paths.iter().all(|item| item.amount() == 60));

    let one = authority(
        &[&root1, &root2, &bob],
        vec![Root::new(root1.fingerprint().clone(), 60)],
    );
    assert_eq!(
        one.is_authorized(bob.fingerprint(), "Bob"),
        Authorization::NotAuthorized {
            reason: Denial::InsufficientTrust { amount: 60 }
        }
    );
    let one = one.with_config(QueryConfig::default().with_partial(true));
    assert_eq!(
        one.is_authorized(bob.fingerprint(), "Bob"),
        Authorization::PartiallyAuthorized { amount: 60 }
    );
    let one = one.with_config(QueryConfig::default().with_level(AuthenticationLevel::Partially));
    assert!(one.is_authorized(bob.fingerprint(), "Bob").is_authorized());
}

#[test]
fn independent_introducers_add_up() {
    let root = SecretCertificate::generate(["Root"], T0);
    let mut alice = SecretCertificate::generate(["Alice"], T0);
    let mut carol = SecretCertificate::generate(["Carol"], T0);
    let mut bob = SecretCertificate::generate(["Bob"], T0);

    root.delegate(alice.record_mut(), TrustParams::at(T0 + 1).trust(1, 60))
        .unwrap();
    root.delegate(carol.record_mut(), TrustParams::at(T0 + 1).trust(1, 60))
        .unwrap();
    alice.certify(bob.record_mut(), "Bob", TrustParams::at(T0 + 2)).unwrap();
    carol.certify(bob.record_mut(), "Bob", TrustParams::at(T0 + 2)).unwrap();

    let ca = authority(&[&root, &alice, &carol, &bob], vec![full(&root)]);
    let binding = ca.authenticate(bob.fingerprint(), "Bob");
    assert_eq!(binding.amount(), 120);
    assert_eq!(binding.paths.len(), 2);

    // Only as much as asked for.
    let ca = ca.with_config(QueryConfig::default().with_threshold(60));
    assert_eq!(ca.authenticate(bob.fingerprint(), "Bob").paths.len(), 1);
}

#[test]
fn cycles_are_not_followed() {
    let root = SecretCertificate::generate(["Root"], T0);
    let mut alice = SecretCertificate::generate(["Alice"], T0);
    let mut carol = SecretCertificate::generate(["Carol"], T0);
    let mut dave = SecretCertificate::generate(["Dave"], T0);

    root.delegate(alice.record_mut(), TrustParams::at(T0 + 1).trust(255, 120))
        .unwrap();
    alice
        .delegate(carol.record_mut(), TrustParams::at(T0 + 1).trust(255, 120))
        .unwrap();
    carol
        .delegate(alice.record_mut(), TrustParams::at(T0 + 1).trust(255, 120))
        .unwrap();
    carol
        .certify(dave.record_mut(), "Dave", TrustParams::at(T0 + 1))
        .unwrap();

    let ca = authority(&[&root, &alice, &carol, &dave], vec![full(&root)]);
    let binding = ca.authenticate(dave.fingerprint(), "Dave");
    assert_eq!(binding.amount(), 120);

    let path = binding.paths.iter().next().unwrap().path();
    let hops: Vec<&Fingerprint> = path.certificates().map(|c| c.fingerprint()).collect();
    assert_eq!(
        hops,
        vec![
            root.fingerprint(),
            alice.fingerprint(),
            carol.fingerprint(),
            dave.fingerprint()
        ]
    );
}

#[test]
fn invalid_targets() {
    let root = SecretCertificate::generate(["Root"], T0);
    let mut revoked = SecretCertificate::generate(["Revoked"], T0);
    let mut expired = SecretCertificate::generate(["Expired"], T0).with_expiration(T0 + 100);
    let mut two_ids = SecretCertificate::generate(["Old", "New"], T0);

    root.certify(revoked.record_mut(), "Revoked", TrustParams::at(T0 + 1))
        .unwrap();
    revoked.revoke(true, T0 + 2);
    root.certify(expired.record_mut(), "Expired", TrustParams::at(T0 + 1))
        .unwrap();
    root.certify(two_ids.record_mut(), "Old", TrustParams::at(T0 + 1)).unwrap();
    root.certify(two_ids.record_mut(), "New", TrustParams::at(T0 + 1)).unwrap();
    two_ids.revoke_user_id("Old", false, T0 + 2).unwrap();

    let ca = authority(&[&root, &revoked, &expired, &two_ids], vec![full(&root)]);
    assert_eq!(amount(&ca, &revoked, "Revoked"), 0);
    assert_eq!(amount(&ca, &expired, "Expired"), 0);
    assert_eq!(amount(&ca, &two_ids, "Old"), 0);
    assert_eq!(amount(&ca, &two_ids, "New"), 120);
}

#[test]
fn expired_certification_ignored() {
    let root = SecretCertificate::generate(["Root"], T0);
    let mut bob = SecretCertificate::generate(["Bob"], T0);
    root.certify(bob.record_mut(), "Bob", TrustParams::at(T0 + 1).expires(T0 + 10))
        .unwrap();

    let ca = authority(&[&root, &bob], vec![full(&root)]);
    assert_eq!(amount(&ca, &bob, "Bob"), 0);
}

#[test]
fn unknown_certificate() {
    let root = SecretCertificate::generate(["Root"], T0);
    let stranger = SecretCertificate::generate(["Stranger"], T0);

    let ca = authority(&[&root], vec![full(&root)]);
    assert_eq!(
        ca.is_authorized(stranger.fingerprint(), "Stranger"),
        Authorization::NotAuthorized {
            reason: Denial::UnknownCertificate
        }
    );
}

#[test]
fn identify_lookup_and_list() {
    let root = SecretCertificate::generate(["Root <root@example.org>"], T0);
    let mut bob = SecretCertificate::generate(
        ["Bob <bob@example.org>", "Bob (work) <bob@corp.example>"],
        T0,
    );
    let mut carol = SecretCertificate::generate(["Carol <carol@example.org>"], T0);

    root.certify(bob.record_mut(), "Bob <bob@example.org>", TrustParams::at(T0 + 1))
        .unwrap();
    root.certify(
        carol.record_mut(),
        "Carol <carol@example.org>",
        TrustParams::at(T0 + 1).trust(0, 60),
    )
    .unwrap();

    let ca = authority(&[&root, &bob, &carol], vec![full(&root)]);

    let identified = ca.identify(bob.fingerprint());
    assert_eq!(identified.len(), 1);
    assert_eq!(identified[0].user_id, "Bob <bob@example.org>");

    let found = ca.lookup("bob@example.org", true);
    assert_eq!(found.len(), 1);
    assert_eq!(&found[0].fingerprint, bob.fingerprint());
    assert!(ca.lookup("bob@example.org", false).is_empty());

    let carol_binding = ca.lookup("Carol <carol@example.org>", false);
    assert_eq!(carol_binding.len(), 1);
    assert_eq!(carol_binding[0].percentage(120), 50);

    let all = ca.list(None);
    assert_eq!(all.len(), 3);
    let filtered = ca.list(Some("CAROL"));
    assert_eq!(filtered.len(), 1);
}

#[test]
fn explicit_path_check() {
    let root = SecretCertificate::generate(["Root"], T0);
    let mut alice = SecretCertificate::generate(["Alice"], T0);
    let mut bob = SecretCertificate::generate(["Bob"], T0);

    root.delegate(alice.record_mut(), TrustParams::at(T0 + 1).trust(1, 90))
        .unwrap();
    alice.certify(bob.record_mut(), "Bob", TrustParams::at(T0 + 2)).unwrap();

    let ca = authority(&[&root, &alice, &bob], vec![full(&root)]);
    let chain = [
        root.fingerprint().clone(),
        alice.fingerprint().clone(),
        bob.fingerprint().clone(),
    ];
    let binding = ca.check_path(&chain, "Bob").unwrap();
    assert_eq!(binding.amount(), 90);

    // No certification from Bob on Alice.
    let reversed = [bob.fingerprint().clone(), alice.fingerprint().clone()];
    assert!(ca.check_path(&reversed, "Alice").is_err());
}
