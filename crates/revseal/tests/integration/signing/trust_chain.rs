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

use chrono::{TimeZone, Utc};
use httpmock::{Method::POST, MockServer};
use revseal::crypto::sha384_hex;
use revseal::security::{
    CertificateChainVerifier, ChainVerificationError, HttpRevocationLedger,
};
use revseal_testing::pki::{issue, self_signed};
use revseal_testing::SigningFixture;
use serde_json::json;
use std::sync::Arc;

#[tokio::test]
async fn test_author_chain_submits_fingerprints() {
    let fixture = SigningFixture::new(&[]);

    let trusted = fixture
        .chain_verifier()
        .verify(&fixture.author.pem(), "alice.apex", None)
        .await
        .unwrap();

    assert!(trusted);
    let requests = fixture.ledger.requests();
    assert_eq!(requests.len(), 1);
    let fingerprints = &requests[0].fingerprints;
    assert_eq!(fingerprints.len(), 2);
    assert_eq!(fingerprints["alice.apex"], sha384_hex(&fixture.author.der()));
    assert_eq!(fingerprints["ca.apex"], sha384_hex(&fixture.ca.der()));
    assert_eq!(requests[0].release_date, None);
}

#[tokio::test]
async fn test_collaborator_chain_walks_through_author() {
    let fixture = SigningFixture::new(&[]);
    let bob = fixture.add_collaborator("bob", None);

    // DER input is accepted as well as PEM.
    let trusted = fixture
        .chain_verifier()
        .verify(&bob.der(), "bob.alice.apex", None)
        .await
        .unwrap();

    assert!(trusted);
    let fingerprints = &fixture.ledger.requests()[0].fingerprints;
    let names: Vec<&str> = fingerprints.keys().map(String::as_str).collect();
    assert_eq!(names, ["alice.apex", "bob.alice.apex", "ca.apex"]);
}

#[tokio::test]
async fn test_repository_ca_verifies_directly_against_anchor() {
    let fixture = SigningFixture::new(&[]);

    let trusted = fixture
        .chain_verifier()
        .verify(&fixture.ca.pem(), "ca.apex", None)
        .await
        .unwrap();

    assert!(trusted);
    let fingerprints = &fixture.ledger.requests()[0].fingerprints;
    assert_eq!(fingerprints.len(), 1);
    assert!(fingerprints.contains_key("ca.apex"));
}

#[tokio::test]
async fn test_missing_issuer() {
    let fixture = SigningFixture::new(&[]);
    fixture.certificates.remove("ca.apex");

    let result = fixture
        .chain_verifier()
        .verify(&fixture.author.pem(), "alice.apex", None)
        .await;

    assert!(matches!(
        result,
        Err(ChainVerificationError::IssuerNotFound(cn)) if cn == "ca.apex"
    ));
    assert!(fixture.ledger.requests().is_empty());
}

#[tokio::test]
async fn test_substituted_issuer_breaks_link() {
    let fixture = SigningFixture::new(&[]);
    // Properly anchored, but not the CA that issued alice.apex.
    let other_ca = fixture.pki.repository_ca("apex");
    fixture.certificates.insert("ca.apex", other_ca.pem());

    let result = fixture
        .chain_verifier()
        .verify(&fixture.author.pem(), "alice.apex", None)
        .await;

    assert!(matches!(
        result,
        Err(ChainVerificationError::InvalidChainLink { subject, issuer })
            if subject == "alice.apex" && issuer == "ca.apex"
    ));
}

#[tokio::test]
async fn test_foreign_hierarchy_fails_root_of_trust() {
    let fixture = SigningFixture::new(&[]);
    let rogue_root = self_signed("root.apex", None);
    let rogue_ca = issue("ca.apex", None, &rogue_root);
    let rogue_alice = issue("alice.apex", Some("Alice Ltd"), &rogue_ca);
    fixture.certificates.insert("ca.apex", rogue_ca.pem());
    // A trust anchor stored alongside the rest must not be consulted.
    fixture.certificates.insert("root.apex", rogue_root.pem());

    let result = fixture
        .chain_verifier()
        .verify(&rogue_alice.pem(), "alice.apex", None)
        .await;

    assert!(matches!(
        result,
        Err(ChainVerificationError::RootOfTrustFailed(cn)) if cn == "ca.apex"
    ));
}

#[tokio::test]
async fn test_subject_must_match_common_name() {
    let fixture = SigningFixture::new(&[]);

    let result = fixture
        .chain_verifier()
        .verify(&fixture.author.pem(), "bob.alice.apex", None)
        .await;

    assert!(matches!(
        result,
        Err(ChainVerificationError::SubjectMismatch { expected, actual })
            if expected == "bob@alice" && actual == "alice@apex"
    ));
}

#[tokio::test]
async fn test_malformed_common_names() {
    let fixture = SigningFixture::new(&[]);
    let verifier = fixture.chain_verifier();

    for common_name in ["apex", "", "alice..apex", ".apex"] {
        let result = verifier.verify(&fixture.author.pem(), common_name, None).await;
        assert!(
            matches!(result, Err(ChainVerificationError::MalformedCommonName(_))),
            "{common_name:?} should be rejected"
        );
    }
}

#[tokio::test]
async fn test_garbage_certificate_is_rejected() {
    let fixture = SigningFixture::new(&[]);

    let result = fixture
        .chain_verifier()
        .verify(b"not a certificate", "alice.apex", None)
        .await;

    assert!(matches!(result, Err(ChainVerificationError::Certificate(_))));
}

#[tokio::test]
async fn test_release_date_is_forwarded_to_ledger() {
    let fixture = SigningFixture::new(&[]);
    let revoked_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    fixture.ledger.revoke("ca.apex", revoked_at);
    let verifier = fixture.chain_verifier();

    let before = Utc.with_ymd_and_hms(2023, 12, 31, 23, 59, 59).unwrap();
    assert!(verifier
        .verify(&fixture.author.pem(), "alice.apex", Some(before))
        .await
        .unwrap());
    assert!(!verifier
        .verify(&fixture.author.pem(), "alice.apex", Some(revoked_at))
        .await
        .unwrap());

    let dates: Vec<_> = fixture
        .ledger
        .requests()
        .into_iter()
        .map(|request| request.release_date)
        .collect();
    assert_eq!(dates, [Some(before), Some(revoked_at)]);
}

#[tokio::test]
async fn test_http_ledger_reporting_failures_means_untrusted() {
    let fixture = SigningFixture::new(&[]);
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path("/ledger/check").json_body(json!({
            "release_date": "2024-05-06 07:08:09",
            "fingerprints": {
                "alice.apex": sha384_hex(&fixture.author.der()),
                "ca.apex": sha384_hex(&fixture.ca.der()),
            }
        }));
        then.status(200)
            .json_body(json!({"status": "success", "data": {"fail": 1}}));
    });
    let ledger = HttpRevocationLedger::new(&server.url("/ledger/check"), None).unwrap();
    let verifier = CertificateChainVerifier::new(
        fixture.certificates.clone(),
        Arc::new(ledger),
        fixture.pki.trust_anchor(),
    );
    let release = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap();

    let trusted = verifier
        .verify(&fixture.author.pem(), "alice.apex", Some(release))
        .await
        .unwrap();

    mock.assert();
    assert!(!trusted);
}

#[tokio::test]
async fn test_http_ledger_error_status_is_fatal() {
    let fixture = SigningFixture::new(&[]);
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/ledger/check");
        then.status(200)
            .json_body(json!({"status": "error", "message": "maintenance"}));
    });
    let ledger = HttpRevocationLedger::new(&server.url("/ledger/check"), None).unwrap();
    let verifier = CertificateChainVerifier::new(
        fixture.certificates.clone(),
        Arc::new(ledger),
        fixture.pki.trust_anchor(),
    );

    let result = verifier
        .verify(&fixture.author.pem(), "alice.apex", None)
        .await;

    assert!(matches!(result, Err(ChainVerificationError::Ledger(_))));
}
