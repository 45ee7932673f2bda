/*
 *  Copyright 2025-2026 Colliery Software
 *
 *  Licensed under the Apache License, Version 2.0 (the "License");
 *  you may not use this file except in compliance with the License.
 *  You may obtain a copy of the License at
 *
 *      http://www.apache.org/licenses/LICENSE-2.0
 *
 *  Unless required by applicable law or agreed to in writing, software
 *  distributed under the License is distributed on an "AS IS" BASIS,
 *  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 *  See the License for the specific language governing permissions and
 *  limitations under the License.
 */

//! Sign-then-verify round trips.

use chrono::Utc;
use revseal::crypto::{sha1_hex, sha256_hex};
use revseal::merkle::MerkleTreeBuilder;
use revseal::models::properties;
use revseal::store::RevisionStore;
use revseal_testing::fixture::{password_for, BRANCH};
use revseal_testing::SigningFixture;

/// The two-file scenario: root is SHA256(SHA256(sha1("x") + sha1("y"))).
#[tokio::test]
async fn test_sign_and_verify_two_file_package() {
    let fixture = SigningFixture::new(&[("a.txt", "x"), ("b.txt", "y")]);
    fixture.prompt.push(password_for("alice"));

    let signature = fixture.signer("alice").sign_package(None).await.unwrap();
    assert!(signature.is_some());

    let stored_root = fixture
        .revisions
        .get_property(BRANCH, properties::MERKLE_ROOT)
        .await
        .unwrap()
        .unwrap();
    let round = sha256_hex(format!("{}{}", sha1_hex(b"x"), sha1_hex(b"y")).as_bytes());
    assert_eq!(stored_root, sha256_hex(round.as_bytes()));

    fixture.record_change(BRANCH, "alice", Utc::now());
    let identity = fixture
        .verifier()
        .verify(BRANCH, fixture.source.path(), None)
        .await
        .unwrap();

    assert_eq!(identity, "alice@apex (Alice Ltd)");
}

/// Every property of a first revision is written, and no previous root.
#[tokio::test]
async fn test_first_revision_properties() {
    let fixture = SigningFixture::new(&[("index.js", "module.exports = 1;")]);
    fixture.prompt.push(password_for("alice"));

    let signature = fixture
        .signer("alice")
        .sign_package(Some("release"))
        .await
        .unwrap()
        .unwrap();

    let props = fixture.revisions.properties("release");
    assert_eq!(props.get(properties::SIGNATURE), Some(&signature));
    assert!(props.contains_key(properties::MERKLE_ROOT));
    assert!(props.contains_key(properties::INVENTORY));
    assert!(!props.contains_key(properties::PREV_MERKLE_ROOT));
    assert!(fixture.revisions.properties(BRANCH).is_empty());
}

/// A second signing chains to the first and reuses the session password.
#[tokio::test]
async fn test_resigning_chains_to_previous_root() {
    let fixture = SigningFixture::new(&[("a.txt", "x")]);
    fixture.prompt.push(password_for("alice"));
    let signer = fixture.signer("alice");

    signer.sign_package(None).await.unwrap().unwrap();
    let first_root = fixture.revisions.properties(BRANCH)[properties::MERKLE_ROOT].clone();

    fixture.source.write("a.txt", "x2");
    signer.sign_package(None).await.unwrap().unwrap();
    let props = fixture.revisions.properties(BRANCH);

    assert_eq!(props[properties::PREV_MERKLE_ROOT], first_root);
    assert_ne!(props[properties::MERKLE_ROOT], first_root);
    assert_eq!(fixture.prompt.times_asked(), 1);

    fixture.record_change(BRANCH, "alice", Utc::now());
    fixture
        .verifier()
        .verify(BRANCH, fixture.source.path(), None)
        .await
        .unwrap();
}

/// A collaborator signs with a certificate issued by the author.
#[tokio::test]
async fn test_collaborator_signature_verifies() {
    let fixture = SigningFixture::new(&[("lib.rs", "pub fn pad() {}")]);
    fixture.add_collaborator("bob", None);
    fixture.prompt.push(password_for("bob"));

    fixture.signer("bob").sign_package(None).await.unwrap().unwrap();

    fixture.record_change(BRANCH, "bob", Utc::now());
    let identity = fixture
        .verifier()
        .verify(BRANCH, fixture.source.path(), None)
        .await
        .unwrap();

    assert_eq!(identity, "bob@alice");
}

/// A tree built ahead of time is checked instead of rebuilding.
#[tokio::test]
async fn test_precomputed_tree_is_accepted() {
    let fixture = SigningFixture::new(&[("a.txt", "x"), ("b.txt", "y")]);
    fixture.prompt.push(password_for("alice"));
    fixture.signer("alice").sign_package(None).await.unwrap().unwrap();
    fixture.record_change(BRANCH, "alice", Utc::now());

    let tree = MerkleTreeBuilder::new()
        .build_from_directory(Some(&fixture.package), None, fixture.source.path())
        .unwrap();

    // The directory argument is not read when a tree is supplied.
    let identity = fixture
        .verifier()
        .verify(BRANCH, "/nonexistent", Some(&tree))
        .await
        .unwrap();
    assert_eq!(identity, "alice@apex (Alice Ltd)");
}

/// Extra exclusions on both sides keep build output out of the root.
#[tokio::test]
async fn test_custom_exclusions_on_both_sides() {
    let fixture = SigningFixture::new(&[("src/lib.rs", "code"), ("target/debug.bin", "1")]);
    fixture.prompt.push(password_for("alice"));
    let builder = MerkleTreeBuilder::new().with_excluded_names(["target"]);

    fixture
        .signer("alice")
        .with_builder(builder.clone())
        .sign_package(None)
        .await
        .unwrap()
        .unwrap();

    fixture.source.write("target/debug.bin", "2");
    fixture.record_change(BRANCH, "alice", Utc::now());
    fixture
        .verifier()
        .with_builder(builder)
        .verify(BRANCH, fixture.source.path(), None)
        .await
        .unwrap();
}
