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

//! Filesystem-backed stores.
//!
//! - [`DirectoryKeyStore`]: `<alias>.key` (PEM, possibly encrypted) and
//!   `<alias>.pub` in one directory
//! - [`DirectoryCertificateStore`]: `<common name>.crt` in one directory
//! - [`FileRevisionStore`]: every target's properties and last-change info in
//!   a single JSON document

use super::{CertificateStore, KeyStore, RevisionStore, StoreError};
use crate::crypto::RsaKey;
use crate::models::RevisionInfo;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Reject names that would escape the store directory.
fn checked_file_name(name: &str, extension: &str) -> Result<String, StoreError> {
    if name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0')
    {
        return Err(StoreError::Backend(format!("invalid store key: {name:?}")));
    }
    Ok(format!("{name}.{extension}"))
}

async fn read_optional(path: &Path) -> Result<Option<Vec<u8>>, StoreError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(StoreError::Io(e)),
    }
}

#[derive(Debug, Clone)]
pub struct DirectoryKeyStore {
    dir: PathBuf,
}

impl DirectoryKeyStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Write a key pair. The private PEM is stored as given.
    pub async fn put(&self, key: &RsaKey) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let private_path = self.dir.join(checked_file_name(&key.alias, "key")?);
        let public_path = self.dir.join(checked_file_name(&key.alias, "pub")?);
        tokio::fs::write(private_path, &key.private_key_pem).await?;
        tokio::fs::write(public_path, &key.public_key_pem).await?;
        Ok(())
    }
}

#[async_trait]
impl KeyStore for DirectoryKeyStore {
    async fn get(&self, alias: &str) -> Result<Option<RsaKey>, StoreError> {
        let private_path = self.dir.join(checked_file_name(alias, "key")?);
        let Some(private_key_pem) = read_optional(&private_path).await? else {
            return Ok(None);
        };

        let public_path = self.dir.join(checked_file_name(alias, "pub")?);
        let public_key_pem = read_optional(&public_path).await?.unwrap_or_default();

        Ok(Some(RsaKey::new(alias, private_key_pem, public_key_pem)))
    }
}

#[derive(Debug, Clone)]
pub struct DirectoryCertificateStore {
    dir: PathBuf,
}

impl DirectoryCertificateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub async fn put(&self, common_name: &str, certificate: &[u8]) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(checked_file_name(common_name, "crt")?);
        tokio::fs::write(path, certificate).await?;
        Ok(())
    }
}

#[async_trait]
impl CertificateStore for DirectoryCertificateStore {
    async fn get(&self, common_name: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let path = self.dir.join(checked_file_name(common_name, "crt")?);
        read_optional(&path).await
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct RevisionDocument {
    current_branch: String,
    #[serde(default)]
    targets: BTreeMap<String, TargetRecord>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct TargetRecord {
    #[serde(default)]
    properties: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    info: Option<RevisionInfo>,
}

/// Revision properties kept in a JSON file.
///
/// Writes rewrite the whole document through a staging file and a rename.
/// A single writer is assumed.
#[derive(Debug, Clone)]
pub struct FileRevisionStore {
    path: PathBuf,
    default_branch: String,
}

impl FileRevisionStore {
    pub fn new(path: impl Into<PathBuf>, default_branch: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            default_branch: default_branch.into(),
        }
    }

    /// Record the last change of `target`.
    pub async fn set_info(&self, target: &str, info: RevisionInfo) -> Result<(), StoreError> {
        let mut document = self.load().await?;
        document.targets.entry(target.to_string()).or_default().info = Some(info);
        self.save(&document).await
    }

    async fn load(&self) -> Result<RevisionDocument, StoreError> {
        match read_optional(&self.path).await? {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => Ok(RevisionDocument {
                current_branch: self.default_branch.clone(),
                targets: BTreeMap::new(),
            }),
        }
    }

    async fn save(&self, document: &RevisionDocument) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let json = serde_json::to_vec_pretty(document)?;
        // Staged, then renamed over the document.
        let mut staging = self.path.clone().into_os_string();
        staging.push(".tmp");
        let staging = PathBuf::from(staging);
        tokio::fs::write(&staging, json).await?;
        tokio::fs::rename(&staging, &self.path).await?;
        debug!(path = %self.path.display(), "Saved revision properties");
        Ok(())
    }
}

#[async_trait]
impl RevisionStore for FileRevisionStore {
    async fn get_property(&self, target: &str, name: &str) -> Result<Option<String>, StoreError> {
        let document = self.load().await?;
        Ok(document
            .targets
            .get(target)
            .and_then(|record| record.properties.get(name))
            .cloned())
    }

    async fn set_property(&self, target: &str, name: &str, value: &str) -> Result<(), StoreError> {
        let mut document = self.load().await?;
        document
            .targets
            .entry(target.to_string())
            .or_default()
            .properties
            .insert(name.to_string(), value.to_string());
        self.save(&document).await
    }

    async fn remove_property(&self, target: &str, name: &str) -> Result<(), StoreError> {
        let mut document = self.load().await?;
        let removed = document
            .targets
            .get_mut(target)
            .and_then(|record| record.properties.remove(name));
        if removed.is_some() {
            self.save(&document).await?;
        }
        Ok(())
    }

    /// All properties go into one rewrite of the document.
    async fn set_properties(
        &self,
        target: &str,
        properties: &[(&str, String)],
    ) -> Result<(), StoreError> {
        let mut document = self.load().await?;
        let record = document.targets.entry(target.to_string()).or_default();
        for (name, value) in properties {
            record.properties.insert(name.to_string(), value.clone());
        }
        self.save(&document).await
    }

    async fn current_branch(&self) -> Result<String, StoreError> {
        Ok(self.load().await?.current_branch)
    }

    async fn info(&self, target: &str) -> Result<RevisionInfo, StoreError> {
        self.load()
            .await?
            .targets
            .remove(target)
            .and_then(|record| record.info)
            .ok_or_else(|| StoreError::TargetNotFound(target.to_string()))
    }
}
