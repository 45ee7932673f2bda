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

//! Wiring from configuration to library components.

use crate::config::RevsealConfig;
use anyhow::{Context as _, Result};
use revseal::crypto::Certificate;
use revseal::merkle::MerkleTreeBuilder;
use revseal::security::{CertificateChainVerifier, HttpRevocationLedger, RevocationLedger};
use revseal::store::{
    CertificateStore, DirectoryCertificateStore, DirectoryKeyStore, FileRevisionStore,
    RemoteCertificateStore,
};
use std::path::PathBuf;
use std::sync::Arc;

pub struct Context {
    config: RevsealConfig,
}

impl Context {
    pub fn new(config: RevsealConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RevsealConfig {
        &self.config
    }

    pub fn source_dir(&self) -> PathBuf {
        self.config.package.source_dir.clone()
    }

    pub fn builder(&self) -> MerkleTreeBuilder {
        MerkleTreeBuilder::new().with_excluded_names(self.config.package.exclude.iter().cloned())
    }

    pub fn revisions(&self) -> Arc<FileRevisionStore> {
        Arc::new(FileRevisionStore::new(
            &self.config.stores.revision_file,
            &self.config.stores.default_branch,
        ))
    }

    pub fn keys(&self) -> Arc<DirectoryKeyStore> {
        Arc::new(DirectoryKeyStore::new(&self.config.stores.key_dir))
    }

    pub fn certificates(&self) -> Result<Arc<dyn CertificateStore>> {
        let stores = &self.config.stores;
        let local = DirectoryCertificateStore::new(&stores.certificate_dir);

        match stores.remote_certificates {
            Some(ref url) => {
                let remote = RemoteCertificateStore::new(url, self.config.ledger.timeout())
                    .with_context(|| format!("Invalid certificate service URL {url}"))?;
                Ok(Arc::new(remote.with_cache(local)))
            }
            None => Ok(Arc::new(local)),
        }
    }

    pub fn ledger(&self) -> Result<Arc<dyn RevocationLedger>> {
        let ledger = HttpRevocationLedger::new(&self.config.ledger.url, self.config.ledger.timeout())
            .context("Failed to create revocation ledger client")?;
        Ok(Arc::new(ledger))
    }

    pub fn trust_anchor(&self) -> Result<Certificate> {
        let path = &self.config.trust.anchor;
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read trust anchor {}", path.display()))?;
        Certificate::from_bytes(&bytes)
            .with_context(|| format!("Invalid trust anchor {}", path.display()))
    }

    pub fn chain_verifier(&self) -> Result<Arc<CertificateChainVerifier>> {
        Ok(Arc::new(CertificateChainVerifier::new(
            self.certificates()?,
            self.ledger()?,
            self.trust_anchor()?,
        )))
    }
}
