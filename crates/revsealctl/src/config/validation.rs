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

use crate::config::{types::*, ValidationError};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

impl Validate for RevsealConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = Vec::new();

        if let Err(e) = self.ledger.validate() {
            errors.push(e);
        }
        if let Err(e) = self.stores.validate() {
            errors.push(e);
        }
        if let Err(e) = self.package.validate() {
            errors.push(e);
        }
        if let Err(e) = self.account.validate() {
            errors.push(e);
        }
        if let Err(e) = self.logging.validate() {
            errors.push(e);
        }

        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(ValidationError::Multiple { errors }),
        }
    }
}

fn validate_http_url(field: &'static str, url: &str) -> Result<(), ValidationError> {
    match Url::parse(url) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(()),
        _ => Err(ValidationError::InvalidUrl {
            field,
            url: url.to_string(),
        }),
    }
}

/// Common names are built by joining identifiers with dots, so the
/// identifiers themselves may not contain one.
fn validate_identifier(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.contains('.') || value.contains('/') {
        return Err(ValidationError::InvalidName {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

impl Validate for LedgerConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_http_url("ledger.url", &self.url)?;
        if self.timeout_secs == Some(0) {
            return Err(ValidationError::InvalidTimeout {
                field: "ledger.timeout_secs",
            });
        }
        Ok(())
    }
}

impl Validate for StoresConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if let Some(ref url) = self.remote_certificates {
            validate_http_url("stores.remote_certificates", url)?;
        }
        if self.default_branch.is_empty() {
            return Err(ValidationError::Empty {
                field: "stores.default_branch",
            });
        }
        Ok(())
    }
}

impl Validate for PackageConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_identifier("package.author", &self.author)?;
        validate_identifier("package.repo", &self.repo)?;
        if self.exclude.iter().any(|name| name.is_empty()) {
            return Err(ValidationError::Empty {
                field: "package.exclude entry",
            });
        }
        Ok(())
    }
}

impl Validate for AccountConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_identifier("account.name", &self.name)
    }
}

impl Validate for LoggingConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        match self.level.to_lowercase().as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => Ok(()),
            _ => Err(ValidationError::InvalidLogLevel {
                level: self.level.clone(),
            }),
        }
    }
}
