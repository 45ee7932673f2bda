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

//! Storage seams used by the signing and verification paths.
//!
//! This module provides:
//! - [`RevisionStore`] for reading and writing revision properties
//! - [`KeyStore`] for resolving key material by alias
//! - [`CertificateStore`] for resolving certificates by common name
//! - In-memory, directory-backed and HTTP reference adapters

pub mod fs;
pub mod memory;
pub mod remote;

pub use fs::{DirectoryCertificateStore, DirectoryKeyStore, FileRevisionStore};
pub use memory::{InMemoryCertificateStore, InMemoryKeyStore, InMemoryRevisionStore};
pub use remote::RemoteCertificateStore;

use crate::crypto::RsaKey;
use crate::models::RevisionInfo;
use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

/// Errors raised by store adapters.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Revision target not found: {0}")]
    TargetNotFound(String),

    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Property storage on version-control revision targets (branches, tags).
#[async_trait]
pub trait RevisionStore: Send + Sync {
    /// Read a property, `None` if it was never set.
    async fn get_property(&self, target: &str, name: &str) -> Result<Option<String>, StoreError>;

    async fn set_property(&self, target: &str, name: &str, value: &str) -> Result<(), StoreError>;

    async fn remove_property(&self, target: &str, name: &str) -> Result<(), StoreError>;

    /// Write several properties as one unit: either all of them land or the
    /// target keeps its previous values.
    ///
    /// The default writes one property at a time and restores the previous
    /// values when a write fails. Backends that can commit a batch in one
    /// step should override it.
    async fn set_properties(
        &self,
        target: &str,
        properties: &[(&str, String)],
    ) -> Result<(), StoreError> {
        let mut previous = Vec::with_capacity(properties.len());
        for (name, _) in properties {
            previous.push((*name, self.get_property(target, name).await?));
        }

        for (written, (name, value)) in properties.iter().enumerate() {
            if let Err(e) = self.set_property(target, name, value).await {
                for (name, old) in previous.iter().take(written + 1) {
                    let restored = match old {
                        Some(old) => self.set_property(target, name, old).await,
                        None => self.remove_property(target, name).await,
                    };
                    if let Err(restore_error) = restored {
                        warn!(
                            target_name = %target,
                            property = %name,
                            error = %restore_error,
                            "Failed to restore revision property"
                        );
                    }
                }
                return Err(e);
            }
        }
        Ok(())
    }

    /// The target used when a signing call does not name one.
    async fn current_branch(&self) -> Result<String, StoreError>;

    /// Last-change author and date of a target.
    async fn info(&self, target: &str) -> Result<RevisionInfo, StoreError>;
}

/// Lookup of key material by alias. Keys come back locked.
#[async_trait]
pub trait KeyStore: Send + Sync {
    async fn get(&self, alias: &str) -> Result<Option<RsaKey>, StoreError>;
}

/// Lookup of certificate bytes (PEM or DER) by common name.
#[async_trait]
pub trait CertificateStore: Send + Sync {
    async fn get(&self, common_name: &str) -> Result<Option<Vec<u8>>, StoreError>;
}
