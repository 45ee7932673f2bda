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

use crate::config::types::*;
use std::path::PathBuf;

/// Per-user state directory, `~/.revseal`.
fn state_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".revseal"))
        .unwrap_or_else(|| PathBuf::from(".revseal"))
}

impl Default for TrustConfig {
    fn default() -> Self {
        Self {
            anchor: PathBuf::from("/etc/revseal/root.apex.crt"),
        }
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8080/revocations/check".to_string(),
            timeout_secs: Some(30),
        }
    }
}

impl Default for StoresConfig {
    fn default() -> Self {
        let state = state_dir();
        Self {
            key_dir: state.join("keys"),
            certificate_dir: state.join("certificates"),
            remote_certificates: None,
            revision_file: PathBuf::from(".revseal/revisions.json"),
            default_branch: "main".to_string(),
        }
    }
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            author: String::new(),
            repo: String::new(),
            source_dir: PathBuf::from("."),
            exclude: Vec::new(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Generate a complete default configuration as TOML string
pub fn generate_default_config_toml() -> Result<String, toml::ser::Error> {
    let config = RevsealConfig::default();
    toml::to_string_pretty(&config)
}
