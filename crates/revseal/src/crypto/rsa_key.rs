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

use super::key_encryption::{decrypt_private_key, is_encrypted_pem, KeyEncryptionError};
use openssl::pkey::{PKey, Private};
use std::fmt;

/// Key material handed out by a key store.
///
/// Holds the stored PEM blobs plus, once unlocked, the usable key handle and
/// the password that opened it. Neither is ever written back by this crate.
#[derive(Clone)]
pub struct RsaKey {
    pub alias: String,
    pub private_key_pem: Vec<u8>,
    pub public_key_pem: Vec<u8>,
    unlocked: Option<PKey<Private>>,
    password: Option<String>,
}

impl RsaKey {
    pub fn new(alias: impl Into<String>, private_key_pem: Vec<u8>, public_key_pem: Vec<u8>) -> Self {
        Self {
            alias: alias.into(),
            private_key_pem,
            public_key_pem,
            unlocked: None,
            password: None,
        }
    }

    /// Attach a password known ahead of time (e.g. cached by the key store).
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn is_encrypted(&self) -> bool {
        is_encrypted_pem(&self.private_key_pem)
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    pub fn unlocked(&self) -> Option<&PKey<Private>> {
        self.unlocked.as_ref()
    }

    /// Try to open the private key with `password`, falling back to the
    /// password already attached to this key when `password` is `None`.
    ///
    /// On success the handle and the password are kept on the key.
    pub fn try_unlock(&mut self, password: Option<&str>) -> Result<PKey<Private>, KeyEncryptionError> {
        if let Some(handle) = &self.unlocked {
            return Ok(handle.clone());
        }

        let candidate = password
            .map(str::to_string)
            .or_else(|| self.password.clone());
        let handle = decrypt_private_key(&self.private_key_pem, candidate.as_deref())?;

        if self.is_encrypted() {
            self.password = candidate;
        }
        self.unlocked = Some(handle.clone());
        Ok(handle)
    }

    /// Drop the unlocked handle and cached password.
    pub fn lock(&mut self) {
        self.unlocked = None;
        self.password = None;
    }
}

impl fmt::Debug for RsaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RsaKey")
            .field("alias", &self.alias)
            .field("encrypted", &self.is_encrypted())
            .field("unlocked", &self.unlocked.is_some())
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
