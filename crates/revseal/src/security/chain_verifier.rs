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

//! Certificate chain walking.
//!
//! Common names encode the issuer chain: `bob.alice.apex` is issued by
//! `alice.apex`, which is issued by the repository CA `ca.apex`, which is
//! issued by the statically trusted anchor. Subjects carry the first two
//! segments as `bob@alice`.

use super::audit;
use super::revocation::{FingerprintSet, LedgerError, RevocationLedger};
use crate::crypto::{Certificate, CertificateError};
use crate::store::{CertificateStore, StoreError};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Common name of the trust anchor every repository CA is issued by.
pub const TRUST_ANCHOR: &str = "root.apex";

#[derive(Debug, Error)]
pub enum ChainVerificationError {
    #[error("Malformed certificate common name: {0:?}")]
    MalformedCommonName(String),

    #[error(transparent)]
    Certificate(#[from] CertificateError),

    #[error("Certificate subject is {actual:?}, expected {expected:?}")]
    SubjectMismatch { expected: String, actual: String },

    #[error("Issuer certificate not found: {0}")]
    IssuerNotFound(String),

    #[error("Certificate {subject} was not issued by {issuer}")]
    InvalidChainLink { subject: String, issuer: String },

    #[error("Certificate {0} does not chain to the trust anchor")]
    RootOfTrustFailed(String),

    #[error("Certificate store error: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl ChainVerificationError {
    /// Short machine-readable reason for audit records.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::MalformedCommonName(_) => "malformed_common_name",
            Self::Certificate(_) => "invalid_certificate",
            Self::SubjectMismatch { .. } => "subject_mismatch",
            Self::IssuerNotFound(_) => "issuer_not_found",
            Self::InvalidChainLink { .. } => "invalid_chain_link",
            Self::RootOfTrustFailed(_) => "root_of_trust_failed",
            Self::Store(_) => "certificate_store_error",
            Self::Ledger(_) => "ledger_error",
        }
    }
}

fn is_repository_ca(common_name: &str) -> bool {
    let mut segments = common_name.split('.');
    matches!(
        (segments.next(), segments.next(), segments.next()),
        (Some("ca"), Some(_), None)
    )
}

/// Issuer of the certificate whose remaining segments are `remaining`.
fn issuer_common_name(remaining: &[&str]) -> String {
    match remaining {
        [repo] => format!("ca.{repo}"),
        _ => remaining.join("."),
    }
}

pub struct CertificateChainVerifier {
    certificates: Arc<dyn CertificateStore>,
    ledger: Arc<dyn RevocationLedger>,
    trust_anchor: Certificate,
}

impl CertificateChainVerifier {
    /// `trust_anchor` is the statically trusted root; it is never looked up
    /// in the certificate store.
    pub fn new(
        certificates: Arc<dyn CertificateStore>,
        ledger: Arc<dyn RevocationLedger>,
        trust_anchor: Certificate,
    ) -> Self {
        Self {
            certificates,
            ledger,
            trust_anchor,
        }
    }

    pub fn trust_anchor(&self) -> &Certificate {
        &self.trust_anchor
    }

    /// The store issuer certificates are fetched from.
    pub fn certificates(&self) -> &Arc<dyn CertificateStore> {
        &self.certificates
    }

    /// Verify `certificate` (held by `common_name`) up to the trust anchor
    /// and check the chain against the revocation ledger.
    ///
    /// # Returns
    ///
    /// `Ok(true)` for a trusted, unrevoked chain, `Ok(false)` when the ledger
    /// reports revoked certificates as of `release_date`. Every structural or
    /// transport failure is an error.
    pub async fn verify(
        &self,
        certificate: &[u8],
        common_name: &str,
        release_date: Option<DateTime<Utc>>,
    ) -> Result<bool, ChainVerificationError> {
        let fingerprints = match self.walk(certificate, common_name).await {
            Ok(fingerprints) => fingerprints,
            Err(e) => {
                audit::log_chain_failure(common_name, e.reason());
                return Err(e);
            }
        };

        let report = match self.ledger.check(&fingerprints, release_date).await {
            Ok(report) => report,
            Err(e) => {
                audit::log_chain_failure(common_name, "ledger_error");
                return Err(e.into());
            }
        };

        if !report.is_clean() {
            let release_date = release_date.as_ref().map(super::revocation::format_release_date);
            audit::log_certificate_revoked(common_name, report.revoked, release_date.as_deref());
            return Ok(false);
        }

        audit::log_chain_verified(common_name, fingerprints.len());
        Ok(true)
    }

    /// Walk issuers up to the trust anchor, collecting fingerprints.
    async fn walk(
        &self,
        certificate: &[u8],
        common_name: &str,
    ) -> Result<FingerprintSet, ChainVerificationError> {
        let segments: Vec<&str> = common_name.split('.').collect();
        if segments.len() < 2 || segments.iter().any(|segment| segment.is_empty()) {
            return Err(ChainVerificationError::MalformedCommonName(
                common_name.to_string(),
            ));
        }

        let mut current = Certificate::from_bytes(certificate)?;
        let expected = format!("{}@{}", segments[0], segments[1]);
        let actual = current.common_name()?;
        if actual != expected {
            return Err(ChainVerificationError::SubjectMismatch { expected, actual });
        }

        let mut fingerprints = FingerprintSet::new();
        fingerprints.insert(common_name.to_string(), current.fingerprint());

        let mut current_name = common_name.to_string();
        let mut remaining = &segments[1..];
        while !remaining.is_empty() && !is_repository_ca(&current_name) {
            let issuer_name = issuer_common_name(remaining);
            let issuer_bytes = self
                .certificates
                .get(&issuer_name)
                .await?
                .ok_or_else(|| ChainVerificationError::IssuerNotFound(issuer_name.clone()))?;
            let issuer = Certificate::from_bytes(&issuer_bytes)?;
            fingerprints.insert(issuer_name.clone(), issuer.fingerprint());

            if !current.is_signed_by(&issuer) {
                return Err(ChainVerificationError::InvalidChainLink {
                    subject: current_name,
                    issuer: issuer_name,
                });
            }

            current = issuer;
            current_name = issuer_name;
            remaining = &remaining[1..];
        }

        if !current.is_signed_by(&self.trust_anchor) {
            return Err(ChainVerificationError::RootOfTrustFailed(current_name));
        }

        Ok(fingerprints)
    }
}
