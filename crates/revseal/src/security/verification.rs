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

//! Verification of downloaded or checked-out package revisions.
//!
//! This module provides:
//! - [`DownloadVerifier`] for checking a local tree against a signed revision
//! - [`VerificationError`] for specific failure types
//! - Chain-of-custody checks between consecutive signed revisions

use super::audit;
use super::chain_verifier::{CertificateChainVerifier, ChainVerificationError};
use crate::crypto::{Certificate, CertificateError};
use crate::merkle::{FileInventory, MerkleError, MerkleTree, MerkleTreeBuilder};
use crate::models::{properties, Package};
use crate::store::{RevisionStore, StoreError};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Errors that occur during revision verification.
///
/// These are hard failures - there are no "warnings" for security.
#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("Revision is missing the {0} property")]
    MissingProperty(&'static str),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Signer certificate not found: {0}")]
    CertificateNotFound(String),

    #[error("Invalid signer certificate: {0}")]
    Certificate(#[from] CertificateError),

    #[error("Invalid signature: cryptographic verification failed")]
    InvalidSignature,

    #[error("Package has been tampered with: Merkle root mismatch (expected {expected}, got {actual})")]
    MerkleRootMismatch {
        /// Root stored on the revision
        expected: String,
        /// Root computed from the local files
        actual: String,
    },

    #[error("Package has been tampered with: file set differs at {path}")]
    InventoryMismatch {
        /// First path present on one side only or with a different hash
        path: String,
    },

    #[error("Stored inventory is malformed: {0}")]
    MalformedInventory(String),

    #[error("Failed to build Merkle tree: {0}")]
    Merkle(#[from] MerkleError),

    #[error("Certificate chain check failed: {0}")]
    Chain(#[from] ChainVerificationError),

    #[error("Signer certificate chain for {0} contains revoked certificates")]
    Revoked(String),

    #[error("Chain of custody broken: expected previous root {expected}, found {actual:?}")]
    ChainOfCustodyBroken {
        expected: String,
        actual: Option<String>,
    },

    #[error("Tree building task failed: {0}")]
    Task(String),
}

impl VerificationError {
    /// Short machine-readable reason for audit records.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::MissingProperty(_) => "missing_property",
            Self::Store(_) => "store_error",
            Self::CertificateNotFound(_) => "certificate_not_found",
            Self::Certificate(_) => "invalid_certificate",
            Self::InvalidSignature => "invalid_signature",
            Self::MerkleRootMismatch { .. } => "merkle_root_mismatch",
            Self::InventoryMismatch { .. } => "inventory_mismatch",
            Self::MalformedInventory(_) => "malformed_inventory",
            Self::Merkle(_) => "merkle_error",
            Self::Chain(e) => e.reason(),
            Self::Revoked(_) => "certificate_revoked",
            Self::ChainOfCustodyBroken { .. } => "custody_broken",
            Self::Task(_) => "task_failed",
        }
    }
}

/// Verifies local package trees against signed revisions.
pub struct DownloadVerifier {
    package: Package,
    revisions: Arc<dyn RevisionStore>,
    chain: Arc<CertificateChainVerifier>,
    builder: MerkleTreeBuilder,
}

impl DownloadVerifier {
    pub fn new(
        package: Package,
        revisions: Arc<dyn RevisionStore>,
        chain: Arc<CertificateChainVerifier>,
    ) -> Self {
        Self {
            package,
            revisions,
            chain,
            builder: MerkleTreeBuilder::new(),
        }
    }

    /// Use a builder with custom exclusions. It must match the signer's.
    pub fn with_builder(mut self, builder: MerkleTreeBuilder) -> Self {
        self.builder = builder;
        self
    }

    /// Verify the files under `local_dir` against the signed revision at
    /// `target`.
    ///
    /// # Arguments
    ///
    /// * `target` - Revision target (branch or tag) holding the metadata
    /// * `local_dir` - Checkout to rebuild the tree from
    /// * `precomputed` - A tree already built from the checkout, used
    ///   instead of rebuilding
    ///
    /// # Returns
    ///
    /// The signer identity, `"<common name> (<organization>)"` or just the
    /// common name when the certificate has no organization.
    pub async fn verify(
        &self,
        target: &str,
        local_dir: impl AsRef<Path>,
        precomputed: Option<&MerkleTree>,
    ) -> Result<String, VerificationError> {
        let mut signer = None;
        let result = self
            .verify_inner(target, local_dir.as_ref(), precomputed, &mut signer)
            .await;

        match result {
            Ok((identity, merkle_root)) => {
                audit::log_verification_success(target, &merkle_root, &identity);
                Ok(identity)
            }
            Err(e) => {
                audit::log_verification_failure(target, e.reason(), signer.as_deref());
                Err(e)
            }
        }
    }

    async fn verify_inner(
        &self,
        target: &str,
        local_dir: &Path,
        precomputed: Option<&MerkleTree>,
        signer: &mut Option<String>,
    ) -> Result<(String, String), VerificationError> {
        // 1. Read the signed metadata
        let merkle_root = self
            .require_property(target, properties::MERKLE_ROOT)
            .await?;
        let signature = self.require_property(target, properties::SIGNATURE).await?;
        let prev_root = self
            .revisions
            .get_property(target, properties::PREV_MERKLE_ROOT)
            .await?;

        // 2. Derive the signer from the last change
        let info = self.revisions.info(target).await?;
        let common_name = self.package.signer_common_name(&info.last_changed_author);
        *signer = Some(common_name.clone());

        // 3. Fetch the signer certificate
        let certificate_bytes = self
            .chain
            .certificates()
            .get(&common_name)
            .await?
            .ok_or_else(|| VerificationError::CertificateNotFound(common_name.clone()))?;
        let certificate = Certificate::from_bytes(&certificate_bytes)?;

        // 4. Check the signature over the stored root
        let signature =
            hex::decode(signature.trim()).map_err(|_| VerificationError::InvalidSignature)?;
        certificate
            .verify_signature(merkle_root.as_bytes(), &signature)
            .map_err(|_| VerificationError::InvalidSignature)?;

        // 5. Recompute the root from the local files
        let rebuilt;
        let tree = match precomputed {
            Some(tree) => tree,
            None => {
                rebuilt = self.build_tree(local_dir, prev_root).await?;
                &rebuilt
            }
        };
        if tree.merkle_root() != merkle_root {
            return Err(VerificationError::MerkleRootMismatch {
                expected: merkle_root,
                actual: tree.merkle_root().to_string(),
            });
        }
        self.check_inventory(target, tree.files()).await?;

        // 6. Trust chain and revocation as of the release date
        if !self
            .chain
            .verify(&certificate_bytes, &common_name, Some(info.last_changed_date))
            .await?
        {
            return Err(VerificationError::Revoked(common_name));
        }

        // 7. Signer identity
        let subject = certificate.common_name()?;
        let identity = match certificate.organization() {
            Some(organization) => format!("{subject} ({organization})"),
            None => subject,
        };
        Ok((identity, merkle_root))
    }

    /// Check that `current_target` was signed as the successor of
    /// `previous_target`.
    pub async fn verify_chain_of_custody(
        &self,
        previous_target: &str,
        current_target: &str,
    ) -> Result<(), VerificationError> {
        let expected = self
            .require_property(previous_target, properties::MERKLE_ROOT)
            .await?;
        let actual = self
            .revisions
            .get_property(current_target, properties::PREV_MERKLE_ROOT)
            .await?;

        if actual.as_deref() != Some(expected.as_str()) {
            audit::log_custody_broken(&expected, actual.as_deref());
            return Err(VerificationError::ChainOfCustodyBroken { expected, actual });
        }
        Ok(())
    }

    async fn require_property(
        &self,
        target: &str,
        name: &'static str,
    ) -> Result<String, VerificationError> {
        self.revisions
            .get_property(target, name)
            .await?
            .ok_or(VerificationError::MissingProperty(name))
    }

    /// Compare the stored inventory, when present, with the local one. The
    /// root alone does not see renames that keep the path order.
    async fn check_inventory(
        &self,
        target: &str,
        local: &FileInventory,
    ) -> Result<(), VerificationError> {
        let Some(stored) = self
            .revisions
            .get_property(target, properties::INVENTORY)
            .await?
        else {
            return Ok(());
        };
        let stored = FileInventory::from_json(&stored)
            .map_err(|e| VerificationError::MalformedInventory(e.to_string()))?;

        if let Some(path) = first_difference(&stored, local) {
            return Err(VerificationError::InventoryMismatch { path });
        }
        Ok(())
    }

    async fn build_tree(
        &self,
        local_dir: &Path,
        prev_root: Option<String>,
    ) -> Result<MerkleTree, VerificationError> {
        let builder = self.builder.clone();
        let package = self.package.clone();
        let local_dir: PathBuf = local_dir.to_path_buf();

        tokio::task::spawn_blocking(move || {
            builder.build_from_directory(Some(&package), prev_root.as_deref(), &local_dir)
        })
        .await
        .map_err(|e| VerificationError::Task(e.to_string()))?
        .map_err(VerificationError::from)
    }
}

fn first_difference(stored: &FileInventory, local: &FileInventory) -> Option<String> {
    stored
        .iter()
        .find(|(path, hash)| local.get(path) != Some(hash.as_str()))
        .map(|(path, _)| path.clone())
        .or_else(|| {
            local
                .iter()
                .find(|(path, _)| stored.get(path).is_none())
                .map(|(path, _)| path.clone())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_difference() {
        let stored = FileInventory::from_iter([("a.txt", "1"), ("b.txt", "2")]);

        let same = stored.clone();
        assert_eq!(first_difference(&stored, &same), None);

        let renamed = FileInventory::from_iter([("a.txt", "1"), ("c.txt", "2")]);
        assert_eq!(first_difference(&stored, &renamed).as_deref(), Some("b.txt"));

        let added = FileInventory::from_iter([("a.txt", "1"), ("b.txt", "2"), ("z", "3")]);
        assert_eq!(first_difference(&stored, &added).as_deref(), Some("z"));

        let modified = FileInventory::from_iter([("a.txt", "9"), ("b.txt", "2")]);
        assert_eq!(first_difference(&stored, &modified).as_deref(), Some("a.txt"));
    }

    #[test]
    fn test_reasons() {
        assert_eq!(
            VerificationError::MerkleRootMismatch {
                expected: "a".into(),
                actual: "b".into()
            }
            .reason(),
            "merkle_root_mismatch"
        );
        assert_eq!(
            VerificationError::Chain(ChainVerificationError::IssuerNotFound("ca.apex".into()))
                .reason(),
            "issuer_not_found"
        );
    }
}
