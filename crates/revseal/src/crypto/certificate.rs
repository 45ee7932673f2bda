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

//! X.509 certificates as used by the signing hierarchy.
//!
//! Certificates arrive either PEM or DER encoded. The subject common name
//! encodes the holder as `user@repo`; the fingerprint reported to the
//! revocation ledger is the SHA-384 of the DER encoding.

use super::digest::sha384_hex;
use super::signing::{verify_signature, SigningError};
use openssl::nid::Nid;
use openssl::pkey::{HasPublic, PKey, PKeyRef, Public};
use openssl::x509::{X509NameRef, X509};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CertificateError {
    #[error("Failed to parse certificate: {0}")]
    Parse(String),

    #[error("Certificate has no subject common name")]
    MissingCommonName,

    #[error("Certificate public key is unusable: {0}")]
    PublicKey(String),
}

/// A parsed X.509 certificate and its canonical DER bytes.
#[derive(Clone)]
pub struct Certificate {
    x509: X509,
    der: Vec<u8>,
}

impl Certificate {
    /// Parse a PEM or DER encoded certificate.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CertificateError> {
        let x509 = if looks_like_pem(bytes) {
            X509::from_pem(bytes)
        } else {
            X509::from_der(bytes)
        }
        .map_err(|e| CertificateError::Parse(e.to_string()))?;

        let der = x509
            .to_der()
            .map_err(|e| CertificateError::Parse(e.to_string()))?;
        Ok(Self { x509, der })
    }

    pub fn from_x509(x509: X509) -> Result<Self, CertificateError> {
        let der = x509
            .to_der()
            .map_err(|e| CertificateError::Parse(e.to_string()))?;
        Ok(Self { x509, der })
    }

    pub fn x509(&self) -> &X509 {
        &self.x509
    }

    pub fn der(&self) -> &[u8] {
        &self.der
    }

    /// Subject common name, e.g. `alice@apex`.
    pub fn common_name(&self) -> Result<String, CertificateError> {
        name_entry(self.x509.subject_name(), Nid::COMMONNAME)
            .ok_or(CertificateError::MissingCommonName)
    }

    /// Subject organization, if the certificate carries one.
    pub fn organization(&self) -> Option<String> {
        name_entry(self.x509.subject_name(), Nid::ORGANIZATIONNAME)
    }

    /// Issuer common name as written in the certificate.
    pub fn issuer_common_name(&self) -> Option<String> {
        name_entry(self.x509.issuer_name(), Nid::COMMONNAME)
    }

    /// SHA-384 hex of the DER encoding.
    pub fn fingerprint(&self) -> String {
        sha384_hex(&self.der)
    }

    pub fn public_key(&self) -> Result<PKey<Public>, CertificateError> {
        self.x509
            .public_key()
            .map_err(|e| CertificateError::PublicKey(e.to_string()))
    }

    /// Whether this certificate's signature was produced by `issuer`'s key.
    pub fn is_signed_by(&self, issuer: &Certificate) -> bool {
        match issuer.public_key() {
            Ok(key) => self.x509.verify(&key).unwrap_or(false),
            Err(_) => false,
        }
    }

    /// Whether the certificate's public key matches the given key.
    pub fn matches_key<T: HasPublic>(&self, key: &PKeyRef<T>) -> bool {
        self.public_key()
            .map(|public| public.public_eq(key))
            .unwrap_or(false)
    }

    /// Verify an RSA-SHA384 signature made by the certificate holder.
    pub fn verify_signature(&self, message: &[u8], signature: &[u8]) -> Result<(), SigningError> {
        let key = self
            .public_key()
            .map_err(|e| SigningError::KeyCreationFailed(e.to_string()))?;
        verify_signature(message, signature, &key)
    }

    pub fn to_pem(&self) -> Result<Vec<u8>, CertificateError> {
        self.x509
            .to_pem()
            .map_err(|e| CertificateError::Parse(e.to_string()))
    }
}

impl fmt::Debug for Certificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Certificate")
            .field("subject", &self.common_name().ok())
            .field("issuer", &self.issuer_common_name())
            .field("fingerprint", &self.fingerprint())
            .finish()
    }
}

impl PartialEq for Certificate {
    fn eq(&self, other: &Self) -> bool {
        self.der == other.der
    }
}

impl Eq for Certificate {}

fn looks_like_pem(bytes: &[u8]) -> bool {
    bytes
        .windows(b"-----BEGIN".len())
        .any(|window| window == b"-----BEGIN")
}

fn name_entry(name: &X509NameRef, nid: Nid) -> Option<String> {
    name.entries_by_nid(nid)
        .next()
        .and_then(|entry| entry.data().as_utf8().ok())
        .map(|value| value.to_string())
}
