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

use anyhow::{ensure, Result};
use revseal::models::{Account, Package};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RevsealConfig {
    pub trust: TrustConfig,
    pub ledger: LedgerConfig,
    pub stores: StoresConfig,
    pub package: PackageConfig,
    pub account: AccountConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrustConfig {
    /// Certificate of the trust anchor every repository CA is issued by
    pub anchor: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoresConfig {
    pub key_dir: PathBuf,
    pub certificate_dir: PathBuf,
    /// Remote certificate service; `certificate_dir` becomes its cache
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_certificates: Option<String>,
    pub revision_file: PathBuf,
    pub default_branch: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageConfig {
    pub name: String,
    pub author: String,
    pub repo: String,
    pub source_dir: PathBuf,
    /// Names excluded from the tree on top of the built-in list
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountConfig {
    pub name: String,
    pub key_alias: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl LedgerConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl PackageConfig {
    /// The configured package identity. Every field must be set.
    pub fn to_package(&self) -> Result<Package> {
        ensure!(
            !self.name.is_empty() && !self.author.is_empty() && !self.repo.is_empty(),
            "package.name, package.author and package.repo must be configured"
        );
        Ok(Package::new(&self.name, &self.author, &self.repo))
    }
}

impl AccountConfig {
    /// The signing account; the key alias defaults to the account name.
    pub fn to_account(&self) -> Result<Account> {
        ensure!(!self.name.is_empty(), "account.name must be configured");
        let alias = if self.key_alias.is_empty() {
            &self.name
        } else {
            &self.key_alias
        };
        Ok(Account::new(&self.name, alias))
    }
}
