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

use super::audit;
use super::key_unlocker::{KeyError, KeyUnlocker};
use super::prompt::SecretPrompt;
use super::session::SigningSession;
use crate::crypto::{sign_message, SigningError};
use crate::models::Account;
use crate::store::{KeyStore, StoreError};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChallengeSignError {
    #[error("Signing key not found: {0}")]
    KeyNotFound(String),

    #[error(transparent)]
    Key(#[from] KeyError),

    #[error("Signing failed: {0}")]
    Signing(#[from] SigningError),

    #[error("Key store error: {0}")]
    Store(#[from] StoreError),
}

/// Signs authentication challenges with an account's key.
///
/// Each call unlocks through a fresh [`SigningSession`], so challenge
/// signing never sees or fills the package-signing password cache.
pub struct ChallengeSigner {
    keys: Arc<dyn KeyStore>,
    prompt: Arc<dyn SecretPrompt>,
}

impl ChallengeSigner {
    pub fn new(keys: Arc<dyn KeyStore>, prompt: Arc<dyn SecretPrompt>) -> Self {
        Self { keys, prompt }
    }

    /// Sign the raw challenge bytes, returning the hex RSA-SHA384 signature.
    pub async fn sign(
        &self,
        account: &Account,
        challenge: &[u8],
    ) -> Result<String, ChallengeSignError> {
        let key = self
            .keys
            .get(&account.key_alias)
            .await?
            .ok_or_else(|| ChallengeSignError::KeyNotFound(account.key_alias.clone()))?;

        let unlocker = KeyUnlocker::new(self.prompt.clone(), SigningSession::new());
        let (_, handle) = unlocker.unlock_blocking(key).await?;

        let signature = sign_message(challenge, &handle)?;
        audit::log_challenge_signed(&account.name, &account.key_alias);
        Ok(hex::encode(signature))
    }
}
