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

use revseal::models::properties;
use revseal::security::VerificationError;
use revseal::store::RevisionStore;
use revseal_testing::fixture::{password_for, BRANCH};
use revseal_testing::SigningFixture;

const RELEASE_TAG: &str = "v1";

/// Sign `main`, tag it as `v1`, then change a file and sign `main` again.
async fn two_signed_revisions() -> SigningFixture {
    let fixture = SigningFixture::new(&[("lib.rs", "pub fn pad() {}")]);
    fixture.prompt.push(password_for("alice"));
    let signer = fixture.signer("alice");

    signer.sign_package(None).await.unwrap().unwrap();
    for (name, value) in fixture.revisions.properties(BRANCH) {
        fixture
            .revisions
            .set_property(RELEASE_TAG, &name, &value)
            .await
            .unwrap();
    }

    fixture.source.write("lib.rs", "pub fn pad(width: usize) {}");
    signer.sign_package(Some(BRANCH)).await.unwrap().unwrap();
    fixture
}

#[tokio::test]
async fn test_consecutive_revisions_chain() {
    let fixture = two_signed_revisions().await;

    fixture
        .verifier()
        .verify_chain_of_custody(RELEASE_TAG, BRANCH)
        .await
        .unwrap();

    // The session cached the password after the first unlock.
    assert_eq!(fixture.prompt.times_asked(), 1);
}

#[tokio::test]
async fn test_rewritten_previous_root_breaks_custody() {
    let fixture = two_signed_revisions().await;
    let forged = "f".repeat(64);
    fixture
        .revisions
        .set_property(BRANCH, properties::PREV_MERKLE_ROOT, &forged)
        .await
        .unwrap();

    let result = fixture
        .verifier()
        .verify_chain_of_custody(RELEASE_TAG, BRANCH)
        .await;

    match result {
        Err(VerificationError::ChainOfCustodyBroken { expected, actual }) => {
            let tagged = fixture.revisions.properties(RELEASE_TAG);
            assert_eq!(expected, tagged[properties::MERKLE_ROOT]);
            assert_eq!(actual, Some(forged));
        }
        other => panic!("expected broken custody, got {other:?}"),
    }
}

#[tokio::test]
async fn test_first_revision_has_no_predecessor() {
    let fixture = SigningFixture::new(&[("lib.rs", "pub fn pad() {}")]);
    fixture.prompt.push(password_for("alice"));
    fixture.signer("alice").sign_package(None).await.unwrap().unwrap();
    for (name, value) in fixture.revisions.properties(BRANCH) {
        fixture
            .revisions
            .set_property(RELEASE_TAG, &name, &value)
            .await
            .unwrap();
    }

    let result = fixture
        .verifier()
        .verify_chain_of_custody(RELEASE_TAG, BRANCH)
        .await;

    assert!(matches!(
        result,
        Err(VerificationError::ChainOfCustodyBroken { actual: None, .. })
    ));
}

#[tokio::test]
async fn test_unsigned_predecessor_is_missing_property() {
    let fixture = two_signed_revisions().await;

    let result = fixture
        .verifier()
        .verify_chain_of_custody("v0", BRANCH)
        .await;

    assert!(matches!(
        result,
        Err(VerificationError::MissingProperty(properties::MERKLE_ROOT))
    ));
}
