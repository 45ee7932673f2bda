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

//! Throwaway certificate hierarchy.

use openssl::asn1::Asn1Time;
use openssl::bn::BigNum;
use openssl::hash::MessageDigest;
use openssl::pkey::{PKey, Private};
use openssl::rsa::Rsa;
use openssl::x509::{X509Builder, X509NameBuilder, X509};
use revseal::crypto::{encrypt_private_key, Certificate, RsaKey};
use revseal::security::TRUST_ANCHOR;
use std::sync::atomic::{AtomicU32, Ordering};

const TEST_KEY_BITS: u32 = 2048;

static SERIAL: AtomicU32 = AtomicU32::new(1);

/// A certificate together with its private key.
#[derive(Clone)]
pub struct Issued {
    /// Dotted common name, e.g. `alice.apex`
    pub common_name: String,
    pub key: PKey<Private>,
    pub certificate: X509,
}

impl Issued {
    pub fn pem(&self) -> Vec<u8> {
        self.certificate.to_pem().expect("certificate to PEM")
    }

    pub fn der(&self) -> Vec<u8> {
        self.certificate.to_der().expect("certificate to DER")
    }

    pub fn as_certificate(&self) -> Certificate {
        Certificate::from_x509(self.certificate.clone()).expect("certificate wrapper")
    }

    /// Key material with an unencrypted private key.
    pub fn plain_key(&self, alias: &str) -> RsaKey {
        RsaKey::new(
            alias,
            self.key.private_key_to_pem_pkcs8().expect("private key PEM"),
            self.key.public_key_to_pem().expect("public key PEM"),
        )
    }

    /// Key material with a password-protected private key.
    pub fn encrypted_key(&self, alias: &str, password: &str) -> RsaKey {
        RsaKey::new(
            alias,
            encrypt_private_key(&self.key, password).expect("encrypt private key"),
            self.key.public_key_to_pem().expect("public key PEM"),
        )
    }
}

/// Subject CN for a dotted common name: `bob.alice.apex` -> `bob@alice`.
pub fn subject_for(common_name: &str) -> String {
    let mut segments = common_name.split('.');
    match (segments.next(), segments.next()) {
        (Some(user), Some(repo)) => format!("{user}@{repo}"),
        _ => common_name.to_string(),
    }
}

pub fn generate_key() -> PKey<Private> {
    PKey::from_rsa(Rsa::generate(TEST_KEY_BITS).expect("RSA key")).expect("PKey")
}

/// A trust anchor plus helpers to issue certificates under it.
pub struct TestPki {
    root: Issued,
}

impl Default for TestPki {
    fn default() -> Self {
        Self::new()
    }
}

impl TestPki {
    pub fn new() -> Self {
        Self {
            root: self_signed(TRUST_ANCHOR, None),
        }
    }

    pub fn root(&self) -> &Issued {
        &self.root
    }

    pub fn trust_anchor(&self) -> Certificate {
        self.root.as_certificate()
    }

    /// `ca.<repo>`, issued by the trust anchor.
    pub fn repository_ca(&self, repo: &str) -> Issued {
        issue(&format!("ca.{repo}"), None, &self.root)
    }

    pub fn issue(&self, common_name: &str, organization: Option<&str>, issuer: &Issued) -> Issued {
        issue(common_name, organization, issuer)
    }
}

/// A certificate signed by its own key, outside any hierarchy.
pub fn self_signed(common_name: &str, organization: Option<&str>) -> Issued {
    let key = generate_key();
    let certificate = build(common_name, organization, &key, None);
    Issued {
        common_name: common_name.to_string(),
        key,
        certificate,
    }
}

pub fn issue(common_name: &str, organization: Option<&str>, issuer: &Issued) -> Issued {
    let key = generate_key();
    let certificate = build(common_name, organization, &key, Some(issuer));
    Issued {
        common_name: common_name.to_string(),
        key,
        certificate,
    }
}

fn build(
    common_name: &str,
    organization: Option<&str>,
    key: &PKey<Private>,
    issuer: Option<&Issued>,
) -> X509 {
    let mut name = X509NameBuilder::new().expect("name builder");
    name.append_entry_by_text("CN", &subject_for(common_name))
        .expect("CN entry");
    if let Some(organization) = organization {
        name.append_entry_by_text("O", organization)
            .expect("O entry");
    }
    let name = name.build();

    let serial = BigNum::from_u32(SERIAL.fetch_add(1, Ordering::Relaxed))
        .and_then(|bn| bn.to_asn1_integer())
        .expect("serial number");

    let mut builder = X509Builder::new().expect("X509 builder");
    builder.set_version(2).expect("version");
    builder.set_serial_number(&serial).expect("serial");
    builder.set_subject_name(&name).expect("subject");
    match issuer {
        Some(issuer) => builder
            .set_issuer_name(issuer.certificate.subject_name())
            .expect("issuer"),
        None => builder.set_issuer_name(&name).expect("issuer"),
    }
    builder.set_pubkey(key).expect("public key");
    builder
        .set_not_before(&Asn1Time::days_from_now(0).expect("not before"))
        .expect("not before");
    builder
        .set_not_after(&Asn1Time::days_from_now(365).expect("not after"))
        .expect("not after");

    let signing_key = issuer.map(|issuer| &issuer.key).unwrap_or(key);
    builder
        .sign(signing_key, MessageDigest::sha256())
        .expect("sign certificate");
    builder.build()
}
