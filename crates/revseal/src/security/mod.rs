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

//! Security module for package signing and verification.
//!
//! This module provides:
//! - [`KeyUnlocker`] for turning stored key material into a usable key
//! - [`PackageSigner`] and [`ChallengeSigner`] for producing signatures
//! - [`CertificateChainVerifier`] for trust chains and revocation checks
//! - [`DownloadVerifier`] for checking local trees against signed revisions
//! - Security audit logging for SIEM integration

pub mod audit;
mod chain_verifier;
mod challenge_signer;
mod key_unlocker;
mod package_signer;
mod prompt;
mod revocation;
mod session;
mod verification;

pub use chain_verifier::{CertificateChainVerifier, ChainVerificationError, TRUST_ANCHOR};
pub use challenge_signer::{ChallengeSignError, ChallengeSigner};
pub use key_unlocker::{KeyError, KeyUnlocker};
pub use package_signer::{PackageSignError, PackageSigner};
pub use prompt::{LinePrompt, PromptError, SecretPrompt, TerminalPrompt};
pub use revocation::{
    format_release_date, FingerprintSet, HttpRevocationLedger, LedgerError, LedgerReport,
    RevocationLedger, RELEASE_DATE_FORMAT,
};
pub use session::SigningSession;
pub use verification::{DownloadVerifier, VerificationError};
