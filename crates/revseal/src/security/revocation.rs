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

//! Remote revocation checks.
//!
//! One request carries every fingerprint collected on a chain walk:
//!
//! ```json
//! {"release_date": "2024-03-01 12:00:00", "fingerprints": {"alice.apex": "<sha384 hex>"}}
//! ```
//!
//! The ledger answers `{"status": "success", "data": {"fail": <n>}}`, where
//! `n` counts fingerprints revoked as of the release date. Anything else is
//! an error; there is no offline fallback.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Format used for `release_date` on the wire.
pub const RELEASE_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Revocation ledger unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Revocation ledger returned HTTP {0}")]
    Status(u16),

    #[error("Malformed revocation ledger response: {0}")]
    Malformed(String),

    #[error("Revocation ledger rejected the request with status {0:?}")]
    Rejected(String),

    #[error("Invalid revocation ledger URL: {0}")]
    InvalidUrl(String),
}

/// Result of one revocation check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerReport {
    /// Number of submitted fingerprints revoked as of the release date.
    pub revoked: u64,
}

impl LedgerReport {
    pub fn is_clean(&self) -> bool {
        self.revoked == 0
    }
}

/// Certificate fingerprints keyed by common name.
pub type FingerprintSet = BTreeMap<String, String>;

#[async_trait]
pub trait RevocationLedger: Send + Sync {
    async fn check(
        &self,
        fingerprints: &FingerprintSet,
        release_date: Option<DateTime<Utc>>,
    ) -> Result<LedgerReport, LedgerError>;
}

pub fn format_release_date(date: &DateTime<Utc>) -> String {
    date.format(RELEASE_DATE_FORMAT).to_string()
}

#[derive(Debug, Serialize)]
struct CheckRequest<'a> {
    release_date: Option<String>,
    fingerprints: &'a FingerprintSet,
}

/// Ledger client speaking JSON over HTTP POST.
#[derive(Debug, Clone)]
pub struct HttpRevocationLedger {
    client: Client,
    url: Url,
}

impl HttpRevocationLedger {
    /// `timeout` bounds each request; `None` leaves requests unbounded.
    pub fn new(url: &str, timeout: Option<Duration>) -> Result<Self, LedgerError> {
        let url = Url::parse(url).map_err(|e| LedgerError::InvalidUrl(format!("{url}: {e}")))?;

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            url,
        })
    }
}

#[async_trait]
impl RevocationLedger for HttpRevocationLedger {
    async fn check(
        &self,
        fingerprints: &FingerprintSet,
        release_date: Option<DateTime<Utc>>,
    ) -> Result<LedgerReport, LedgerError> {
        let request = CheckRequest {
            release_date: release_date.as_ref().map(format_release_date),
            fingerprints,
        };
        debug!(
            url = %self.url,
            certificates = fingerprints.len(),
            "Submitting revocation check"
        );

        let response = self
            .client
            .post(self.url.clone())
            .json(&request)
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(LedgerError::Status(response.status().as_u16()));
        }

        let body = response.text().await?;
        parse_report(&body)
    }
}

fn parse_report(body: &str) -> Result<LedgerReport, LedgerError> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| LedgerError::Malformed(e.to_string()))?;

    let status = value
        .get("status")
        .and_then(Value::as_str)
        .ok_or_else(|| LedgerError::Malformed("missing status".to_string()))?;
    if status != "success" {
        return Err(LedgerError::Rejected(status.to_string()));
    }

    let revoked = value
        .get("data")
        .and_then(|data| data.get("fail"))
        .and_then(Value::as_u64)
        .ok_or_else(|| LedgerError::Malformed("missing integer data.fail".to_string()))?;

    Ok(LedgerReport { revoked })
}
