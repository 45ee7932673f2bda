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

//! Package revision signing.
//!
//! Signing a revision builds the Merkle tree of the package working files
//! chained to the target's current root, signs the new root with the
//! account's key and writes the revision metadata back to the target as one
//! batch. The account must hold a valid, unrevoked certificate for the
//! package.

use super::audit;
use super::chain_verifier::{CertificateChainVerifier, ChainVerificationError};
use super::key_unlocker::{KeyError, KeyUnlocker};
use crate::crypto::{sign_message, Certificate, CertificateError, SigningError};
use crate::merkle::{MerkleError, MerkleTree, MerkleTreeBuilder};
use crate::models::{properties, Account, Package, RevisionMetadata};
use crate::store::{KeyStore, RevisionStore, StoreError};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during package signing operations.
#[derive(Debug, Error)]
pub enum PackageSignError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Failed to build Merkle tree: {0}")]
    Merkle(#[from] MerkleError),

    #[error("Signing key not found: {0}")]
    KeyNotFound(String),

    #[error(transparent)]
    Key(#[from] KeyError),

    #[error("Signing key does not match the certificate for {0}")]
    KeyCertificateMismatch(String),

    #[error("Invalid signing certificate: {0}")]
    Certificate(#[from] CertificateError),

    #[error("Certificate chain check failed: {0}")]
    Chain(#[from] ChainVerificationError),

    #[error("Signing failed: {0}")]
    Signing(#[from] SigningError),

    #[error("Failed to serialize revision metadata: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Tree building task failed: {0}")]
    Task(String),
}

/// Why a signing attempt ended without a signature.
enum Refusal {
    CertificateNotFound,
    Revoked,
    BrokenChain(&'static str),
}

impl Refusal {
    fn reason(&self) -> &'static str {
        match self {
            Self::CertificateNotFound => "certificate_not_found",
            Self::Revoked => "certificate_revoked",
            Self::BrokenChain(reason) => reason,
        }
    }
}

/// Signs revisions of one package on behalf of one account.
pub struct PackageSigner {
    package: Package,
    account: Account,
    source_dir: PathBuf,
    revisions: Arc<dyn RevisionStore>,
    keys: Arc<dyn KeyStore>,
    chain: Arc<CertificateChainVerifier>,
    unlocker: KeyUnlocker,
    builder: MerkleTreeBuilder,
}

impl PackageSigner {
    pub fn new(
        package: Package,
        account: Account,
        source_dir: impl Into<PathBuf>,
        revisions: Arc<dyn RevisionStore>,
        keys: Arc<dyn KeyStore>,
        chain: Arc<CertificateChainVerifier>,
        unlocker: KeyUnlocker,
    ) -> Self {
        Self {
            package,
            account,
            source_dir: source_dir.into(),
            revisions,
            keys,
            chain,
            unlocker,
            builder: MerkleTreeBuilder::new(),
        }
    }

    /// Use a builder with custom exclusions.
    pub fn with_builder(mut self, builder: MerkleTreeBuilder) -> Self {
        self.builder = builder;
        self
    }

    /// Sign the revision at `target`, or at the current branch when `None`.
    ///
    /// # Returns
    ///
    /// The hex signature, or `None` when the account has no usable
    /// certificate (missing, broken chain or revoked). Nothing is written
    /// unless a signature is returned.
    pub async fn sign_package(
        &self,
        target: Option<&str>,
    ) -> Result<Option<String>, PackageSignError> {
        let target = match target {
            Some(target) => target.to_string(),
            None => self.revisions.current_branch().await?,
        };
        let package = self.package.to_string();

        match self.sign_target(&target).await {
            Ok(Ok(signature)) => Ok(Some(signature)),
            Ok(Err(refusal)) => {
                audit::log_package_sign_failed(&package, &target, refusal.reason());
                Ok(None)
            }
            Err(e) => {
                audit::log_package_sign_failed(&package, &target, &e.to_string());
                Err(e)
            }
        }
    }

    async fn sign_target(&self, target: &str) -> Result<Result<String, Refusal>, PackageSignError> {
        let prev_root = self
            .revisions
            .get_property(target, properties::MERKLE_ROOT)
            .await?;
        let tree = self.build_tree(prev_root).await?;

        let key = self
            .keys
            .get(&self.account.key_alias)
            .await?
            .ok_or_else(|| PackageSignError::KeyNotFound(self.account.key_alias.clone()))?;
        let (_, handle) = self.unlocker.unlock_blocking(key).await?;

        let common_name = self.package.signer_common_name(&self.account.name);
        let Some(certificate) = self.chain.certificates().get(&common_name).await? else {
            return Ok(Err(Refusal::CertificateNotFound));
        };

        match self.chain.verify(&certificate, &common_name, None).await {
            Ok(true) => {}
            Ok(false) => return Ok(Err(Refusal::Revoked)),
            Err(e @ ChainVerificationError::Store(_)) | Err(e @ ChainVerificationError::Ledger(_)) => {
                return Err(e.into())
            }
            Err(e) => return Ok(Err(Refusal::BrokenChain(e.reason()))),
        }

        if !Certificate::from_bytes(&certificate)?.matches_key(&handle) {
            return Err(PackageSignError::KeyCertificateMismatch(common_name));
        }

        let signature = hex::encode(sign_message(tree.merkle_root().as_bytes(), &handle)?);

        let metadata = RevisionMetadata::from_tree(&tree, signature.clone());
        self.revisions
            .set_properties(target, &metadata.to_properties()?)
            .await?;

        audit::log_package_signed(
            &self.package.to_string(),
            target,
            tree.merkle_root(),
            &common_name,
        );
        Ok(Ok(signature))
    }

    async fn build_tree(&self, prev_root: Option<String>) -> Result<MerkleTree, PackageSignError> {
        let builder = self.builder.clone();
        let package = self.package.clone();
        let source_dir = self.source_dir.clone();

        let tree = tokio::task::spawn_blocking(move || {
            builder.build_from_directory(Some(&package), prev_root.as_deref(), &source_dir)
        })
        .await
        .map_err(|e| PackageSignError::Task(e.to_string()))??;

        debug!(
            package = %self.package,
            merkle_root = %tree.merkle_root(),
            chained = tree.prev_merkle_root().is_some(),
            "Built package tree for signing"
        );
        Ok(tree)
    }
}
