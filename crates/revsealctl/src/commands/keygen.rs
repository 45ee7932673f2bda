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

use super::context::Context;
use anyhow::{bail, Context as _, Result};
use revseal::crypto::{encrypt_private_key, generate_signing_keypair, RsaKey, DEFAULT_KEY_BITS};
use revseal::security::SecretPrompt;
use revseal::store::KeyStore;
use std::sync::Arc;
use tracing::info;

/// Generate a password-protected signing key under `alias` in the key
/// directory and return its public key fingerprint.
pub async fn run(
    ctx: &Context,
    alias: Option<String>,
    bits: Option<u32>,
    prompt: Arc<dyn SecretPrompt>,
) -> Result<String> {
    let alias = match alias {
        Some(alias) => alias,
        None => ctx.config().account.to_account()?.key_alias,
    };
    let keys = ctx.keys();
    if keys.get(&alias).await?.is_some() {
        bail!("A key named {alias} already exists");
    }

    let password = prompt.prompt_secret(&format!("New password for signing key '{alias}'"))?;
    let repeated = prompt.prompt_secret("Repeat password")?;
    if password.is_empty() {
        bail!("Signing keys must be password protected");
    }
    if password != repeated {
        bail!("Passwords do not match");
    }

    let bits = bits.unwrap_or(DEFAULT_KEY_BITS);
    let keypair = tokio::task::spawn_blocking(move || generate_signing_keypair(bits))
        .await?
        .context("Failed to generate signing key")?;
    let private_pem = encrypt_private_key(&keypair.private_key, &password)?;

    keys.put(&RsaKey::new(&alias, private_pem, keypair.public_key_pem))
        .await?;
    info!(alias = %alias, fingerprint = %keypair.fingerprint, "Generated signing key");

    Ok(keypair.fingerprint)
}
