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

//! Turning stored key material into a usable private key.
//!
//! Password sources are tried in order: whatever the key already carries,
//! the session cache (once), then the prompt until the right password is
//! typed or the prompt is cancelled.

use super::audit;
use super::prompt::{PromptError, SecretPrompt};
use super::session::SigningSession;
use crate::crypto::{KeyEncryptionError, RsaKey};
use openssl::pkey::{PKey, Private};
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur while unlocking a signing key.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("Invalid key format: {0}")]
    InvalidFormat(String),

    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error("Unlock task failed: {0}")]
    Task(String),
}

enum Attempt {
    Unlocked(PKey<Private>),
    WrongPassword,
}

fn attempt(key: &mut RsaKey, password: Option<&str>) -> Result<Attempt, KeyError> {
    match key.try_unlock(password) {
        Ok(handle) => Ok(Attempt::Unlocked(handle)),
        Err(KeyEncryptionError::PasswordRequired) | Err(KeyEncryptionError::DecryptionFailed) => {
            Ok(Attempt::WrongPassword)
        }
        Err(e) => Err(KeyError::InvalidFormat(e.to_string())),
    }
}

#[derive(Clone)]
pub struct KeyUnlocker {
    prompt: Arc<dyn SecretPrompt>,
    session: SigningSession,
}

impl KeyUnlocker {
    pub fn new(prompt: Arc<dyn SecretPrompt>, session: SigningSession) -> Self {
        Self { prompt, session }
    }

    pub fn session(&self) -> &SigningSession {
        &self.session
    }

    /// Unlock `key`, prompting as often as needed.
    ///
    /// On success the working password is cached on the key and in the
    /// session. Only a cancelled prompt or a structurally invalid key ends
    /// the loop without a handle.
    pub fn unlock(&self, key: &mut RsaKey) -> Result<PKey<Private>, KeyError> {
        if let Attempt::Unlocked(handle) = attempt(key, None)? {
            return Ok(self.finish(key, handle, "key"));
        }

        if let Some(cached) = self.session.cached_password() {
            if let Attempt::Unlocked(handle) = attempt(key, Some(&cached))? {
                return Ok(self.finish(key, handle, "session"));
            }
        }

        let label = format!("Password for signing key '{}'", key.alias);
        let mut attempts: u32 = 0;
        loop {
            let password = self.prompt.prompt_secret(&label)?;
            attempts += 1;

            match attempt(key, Some(&password))? {
                Attempt::Unlocked(handle) => return Ok(self.finish(key, handle, "prompt")),
                Attempt::WrongPassword => audit::log_key_unlock_retry(&key.alias, attempts),
            }
        }
    }

    /// [`unlock`](Self::unlock) on the blocking pool. Returns the key with
    /// its cached password alongside the handle.
    pub async fn unlock_blocking(
        &self,
        mut key: RsaKey,
    ) -> Result<(RsaKey, PKey<Private>), KeyError> {
        let unlocker = self.clone();
        tokio::task::spawn_blocking(move || -> Result<(RsaKey, PKey<Private>), KeyError> {
            let handle = unlocker.unlock(&mut key)?;
            Ok((key, handle))
        })
        .await
        .map_err(|e| KeyError::Task(e.to_string()))?
    }

    fn finish(&self, key: &RsaKey, handle: PKey<Private>, source: &str) -> PKey<Private> {
        if let Some(password) = key.password() {
            self.session.cache_password(password);
        }
        audit::log_key_unlocked(&key.alias, source);
        handle
    }
}
