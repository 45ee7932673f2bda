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

//! Security audit logging for SIEM integration.
//!
//! Every security-relevant outcome of signing and verification is emitted
//! through one function here, with a dot-notation `event_type` field:
//! - Package and challenge signing (success/failure)
//! - Key unlocking and password retries
//! - Certificate chain walks and revocation results
//! - Download verification and chain-of-custody breaks
//!
//! Passwords, private keys and challenge plaintexts are never logged.

/// Event types.
pub mod events {
    /// Package signed event type.
    pub const PACKAGE_SIGNED: &str = "package.signed";
    /// Package sign failure event type.
    pub const PACKAGE_SIGN_FAILURE: &str = "package.sign.failure";
    /// Challenge signed event type.
    pub const CHALLENGE_SIGNED: &str = "challenge.signed";

    /// Key unlocked event type.
    pub const KEY_UNLOCKED: &str = "key.unlocked";
    /// Wrong password, prompting again.
    pub const KEY_UNLOCK_RETRY: &str = "key.unlock.retry";

    /// Certificate chain verified event type.
    pub const CERTIFICATE_CHAIN_VERIFIED: &str = "certificate.chain.verified";
    /// Certificate chain failure event type.
    pub const CERTIFICATE_CHAIN_FAILURE: &str = "certificate.chain.failure";
    /// Ledger reported revoked certificates on the chain.
    pub const CERTIFICATE_REVOKED: &str = "certificate.revoked";

    /// Verification success event type.
    pub const VERIFICATION_SUCCESS: &str = "verification.success";
    /// Verification failure event type.
    pub const VERIFICATION_FAILURE: &str = "verification.failure";
    /// Consecutive revisions do not chain.
    pub const CUSTODY_BROKEN: &str = "custody.broken";
}

/// Log a package signing event.
pub fn log_package_signed(package: &str, target: &str, merkle_root: &str, signer: &str) {
    tracing::info!(
        event_type = events::PACKAGE_SIGNED,
        package = %package,
        target = %target,
        merkle_root = %merkle_root,
        signer = %signer,
        "Package signed"
    );
}

/// Log a package signing failure.
pub fn log_package_sign_failed(package: &str, target: &str, failure_reason: &str) {
    tracing::error!(
        event_type = events::PACKAGE_SIGN_FAILURE,
        package = %package,
        target = %target,
        failure_reason = %failure_reason,
        "Package signing failed"
    );
}

pub fn log_challenge_signed(account: &str, key_alias: &str) {
    tracing::info!(
        event_type = events::CHALLENGE_SIGNED,
        account = %account,
        key_alias = %key_alias,
        "Challenge signed"
    );
}

/// Log a key unlock. `source` names where the working password came from.
pub fn log_key_unlocked(key_alias: &str, source: &str) {
    tracing::debug!(
        event_type = events::KEY_UNLOCKED,
        key_alias = %key_alias,
        source = %source,
        "Signing key unlocked"
    );
}

pub fn log_key_unlock_retry(key_alias: &str, attempt: u32) {
    tracing::warn!(
        event_type = events::KEY_UNLOCK_RETRY,
        key_alias = %key_alias,
        attempt = attempt,
        "Wrong password for signing key"
    );
}

/// Log a successful chain walk up to the trust anchor.
pub fn log_chain_verified(common_name: &str, chain_length: usize) {
    tracing::info!(
        event_type = events::CERTIFICATE_CHAIN_VERIFIED,
        common_name = %common_name,
        chain_length = chain_length,
        "Certificate chain verified"
    );
}

pub fn log_chain_failure(common_name: &str, failure_reason: &str) {
    tracing::warn!(
        event_type = events::CERTIFICATE_CHAIN_FAILURE,
        common_name = %common_name,
        failure_reason = %failure_reason,
        "Certificate chain verification failed"
    );
}

/// Log a ledger report with revoked fingerprints.
pub fn log_certificate_revoked(common_name: &str, revoked: u64, release_date: Option<&str>) {
    tracing::warn!(
        event_type = events::CERTIFICATE_REVOKED,
        common_name = %common_name,
        revoked = revoked,
        release_date = release_date.unwrap_or("<none>"),
        "Certificate chain contains revoked certificates"
    );
}

/// Log a verification success event.
pub fn log_verification_success(target: &str, merkle_root: &str, signer: &str) {
    tracing::info!(
        event_type = events::VERIFICATION_SUCCESS,
        target = %target,
        merkle_root = %merkle_root,
        signer = %signer,
        "Package revision verified successfully"
    );
}

/// Log a verification failure event.
pub fn log_verification_failure(target: &str, failure_reason: &str, signer: Option<&str>) {
    tracing::warn!(
        event_type = events::VERIFICATION_FAILURE,
        target = %target,
        failure_reason = %failure_reason,
        signer = signer.unwrap_or("<unknown>"),
        "Package revision verification failed"
    );
}

pub fn log_custody_broken(expected_prev: &str, actual_prev: Option<&str>) {
    tracing::error!(
        event_type = events::CUSTODY_BROKEN,
        expected_prev = %expected_prev,
        actual_prev = actual_prev.unwrap_or("<none>"),
        "Revision does not chain to its predecessor"
    );
}
