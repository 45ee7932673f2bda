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

use revseal::crypto::Certificate;
use revseal::security::{ChallengeSignError, ChallengeSigner, KeyError, PromptError};
use revseal_testing::fixture::{key_alias_for, password_for};
use revseal_testing::SigningFixture;

fn challenge_signer(fixture: &SigningFixture) -> ChallengeSigner {
    ChallengeSigner::new(fixture.keys.clone(), fixture.prompt.clone())
}

#[tokio::test]
async fn test_challenge_signature_verifies_against_certificate() {
    let fixture = SigningFixture::new(&[]);
    fixture.prompt.push(password_for("alice"));

    let signature = challenge_signer(&fixture)
        .sign(&fixture.account("alice"), b"login-nonce-7f3a")
        .await
        .unwrap();

    let certificate = Certificate::from_bytes(&fixture.author.pem()).unwrap();
    let raw = hex::decode(signature).unwrap();
    assert!(certificate
        .verify_signature(b"login-nonce-7f3a", &raw)
        .is_ok());
    assert!(certificate.verify_signature(b"other-nonce", &raw).is_err());
}

#[tokio::test]
async fn test_challenge_signing_leaves_session_empty() {
    let fixture = SigningFixture::new(&[("a.txt", "x")]);
    fixture.prompt.push(password_for("alice"));
    fixture.prompt.push(password_for("alice"));

    challenge_signer(&fixture)
        .sign(&fixture.account("alice"), b"nonce")
        .await
        .unwrap();
    assert!(fixture.session.cached_password().is_none());

    fixture.signer("alice").sign_package(None).await.unwrap().unwrap();
    assert_eq!(fixture.prompt.times_asked(), 2);
    assert_eq!(
        fixture.session.cached_password().as_deref(),
        Some(password_for("alice").as_str())
    );
}

#[tokio::test]
async fn test_wrong_password_prompts_again() {
    let fixture = SigningFixture::new(&[]);
    fixture.prompt.push("hunter2");
    fixture.prompt.push(password_for("alice"));

    challenge_signer(&fixture)
        .sign(&fixture.account("alice"), b"nonce")
        .await
        .unwrap();

    let labels = fixture.prompt.labels();
    assert_eq!(labels.len(), 2);
    assert!(labels[0].contains(&key_alias_for("alice")));
}

#[tokio::test]
async fn test_cancelled_prompt_fails_challenge() {
    let fixture = SigningFixture::new(&[]);

    let result = challenge_signer(&fixture)
        .sign(&fixture.account("alice"), b"nonce")
        .await;

    assert!(matches!(
        result,
        Err(ChallengeSignError::Key(KeyError::Prompt(PromptError::Cancelled)))
    ));
}

#[tokio::test]
async fn test_unknown_account_key() {
    let fixture = SigningFixture::new(&[]);

    let result = challenge_signer(&fixture)
        .sign(&fixture.account("mallory"), b"nonce")
        .await;

    assert!(matches!(
        result,
        Err(ChallengeSignError::KeyNotFound(alias)) if alias == "mallory-key"
    ));
    assert_eq!(fixture.prompt.times_asked(), 0);
}

#[tokio::test]
async fn test_shared_session_unlocks_collaborator_keys_independently() {
    let fixture = SigningFixture::new(&[("a.txt", "x")]);
    fixture.add_collaborator("bob", Some("Bob GmbH"));
    fixture.prompt.push(password_for("alice"));
    fixture.prompt.push(password_for("bob"));

    fixture.signer("alice").sign_package(None).await.unwrap().unwrap();
    // Alice's cached password is tried once for Bob's key, then Bob is asked.
    fixture.signer("bob").sign_package(None).await.unwrap().unwrap();

    assert_eq!(fixture.prompt.times_asked(), 2);
}
