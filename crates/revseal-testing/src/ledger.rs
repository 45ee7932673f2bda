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

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use revseal::security::{FingerprintSet, LedgerError, LedgerReport, RevocationLedger};
use std::collections::HashMap;

/// One request seen by a [`StaticLedger`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerRequest {
    pub fingerprints: FingerprintSet,
    pub release_date: Option<DateTime<Utc>>,
}

/// In-process revocation ledger.
///
/// A certificate revoked at `T` counts as revoked for any release dated at
/// or after `T`, and for requests without a release date.
#[derive(Debug, Default)]
pub struct StaticLedger {
    revoked: Mutex<HashMap<String, DateTime<Utc>>>,
    unavailable: Mutex<bool>,
    requests: Mutex<Vec<LedgerRequest>>,
}

impl StaticLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Revoke the certificate with `common_name` as of `at`.
    pub fn revoke(&self, common_name: impl Into<String>, at: DateTime<Utc>) {
        self.revoked.lock().insert(common_name.into(), at);
    }

    /// Make every check fail as if the ledger could not be reached.
    pub fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.lock() = unavailable;
    }

    pub fn requests(&self) -> Vec<LedgerRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl RevocationLedger for StaticLedger {
    async fn check(
        &self,
        fingerprints: &FingerprintSet,
        release_date: Option<DateTime<Utc>>,
    ) -> Result<LedgerReport, LedgerError> {
        self.requests.lock().push(LedgerRequest {
            fingerprints: fingerprints.clone(),
            release_date,
        });

        if *self.unavailable.lock() {
            return Err(LedgerError::Status(503));
        }

        let revoked = self.revoked.lock();
        let count = fingerprints
            .keys()
            .filter_map(|common_name| revoked.get(common_name))
            .filter(|revoked_at| match release_date {
                Some(date) => date >= **revoked_at,
                None => true,
            })
            .count();

        Ok(LedgerReport {
            revoked: count as u64,
        })
    }
}
