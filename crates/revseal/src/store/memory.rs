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

//! In-memory stores, for tests and embedding.

use super::{CertificateStore, KeyStore, RevisionStore, StoreError};
use crate::crypto::RsaKey;
use crate::models::RevisionInfo;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Debug, Default)]
struct RevisionState {
    current_branch: String,
    properties: HashMap<String, HashMap<String, String>>,
    info: HashMap<String, RevisionInfo>,
}

/// Revision targets held in memory.
#[derive(Debug, Default)]
pub struct InMemoryRevisionStore {
    state: RwLock<RevisionState>,
}

impl InMemoryRevisionStore {
    pub fn new(current_branch: impl Into<String>) -> Self {
        Self {
            state: RwLock::new(RevisionState {
                current_branch: current_branch.into(),
                ..Default::default()
            }),
        }
    }

    /// Record the last change of `target`, creating the target if needed.
    pub fn set_info(&self, target: impl Into<String>, info: RevisionInfo) {
        self.state.write().info.insert(target.into(), info);
    }

    pub fn set_current_branch(&self, branch: impl Into<String>) {
        self.state.write().current_branch = branch.into();
    }

    /// Snapshot of every property on a target.
    pub fn properties(&self, target: &str) -> HashMap<String, String> {
        self.state
            .read()
            .properties
            .get(target)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl RevisionStore for InMemoryRevisionStore {
    async fn get_property(&self, target: &str, name: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .state
            .read()
            .properties
            .get(target)
            .and_then(|props| props.get(name))
            .cloned())
    }

    async fn set_property(&self, target: &str, name: &str, value: &str) -> Result<(), StoreError> {
        self.state
            .write()
            .properties
            .entry(target.to_string())
            .or_default()
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_property(&self, target: &str, name: &str) -> Result<(), StoreError> {
        if let Some(props) = self.state.write().properties.get_mut(target) {
            props.remove(name);
        }
        Ok(())
    }

    async fn set_properties(
        &self,
        target: &str,
        properties: &[(&str, String)],
    ) -> Result<(), StoreError> {
        let mut state = self.state.write();
        let props = state.properties.entry(target.to_string()).or_default();
        for (name, value) in properties {
            props.insert(name.to_string(), value.clone());
        }
        Ok(())
    }

    async fn current_branch(&self) -> Result<String, StoreError> {
        Ok(self.state.read().current_branch.clone())
    }

    async fn info(&self, target: &str) -> Result<RevisionInfo, StoreError> {
        self.state
            .read()
            .info
            .get(target)
            .cloned()
            .ok_or_else(|| StoreError::TargetNotFound(target.to_string()))
    }
}

/// Keys held in memory, handed out as fresh (locked) clones.
#[derive(Debug, Default)]
pub struct InMemoryKeyStore {
    keys: RwLock<HashMap<String, RsaKey>>,
}

impl InMemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, key: RsaKey) {
        self.keys.write().insert(key.alias.clone(), key);
    }
}

#[async_trait]
impl KeyStore for InMemoryKeyStore {
    async fn get(&self, alias: &str) -> Result<Option<RsaKey>, StoreError> {
        Ok(self.keys.read().get(alias).cloned())
    }
}

/// Certificates held in memory by common name.
#[derive(Debug, Default)]
pub struct InMemoryCertificateStore {
    certificates: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryCertificateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, common_name: impl Into<String>, certificate: Vec<u8>) {
        self.certificates.write().insert(common_name.into(), certificate);
    }

    pub fn remove(&self, common_name: &str) -> Option<Vec<u8>> {
        self.certificates.write().remove(common_name)
    }
}

#[async_trait]
impl CertificateStore for InMemoryCertificateStore {
    async fn get(&self, common_name: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.certificates.read().get(common_name).cloned())
    }
}
