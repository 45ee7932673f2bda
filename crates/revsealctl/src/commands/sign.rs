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
use anyhow::{bail, Result};
use chrono::Utc;
use revseal::models::RevisionInfo;
use revseal::security::{KeyUnlocker, PackageSigner, SecretPrompt, SigningSession};
use revseal::store::RevisionStore;
use std::sync::Arc;
use tracing::info;

/// Sign the configured package at `target` and record the signing account as
/// the revision's last change.
pub async fn run(
    ctx: &Context,
    target: Option<String>,
    prompt: Arc<dyn SecretPrompt>,
) -> Result<String> {
    let package = ctx.config().package.to_package()?;
    let account = ctx.config().account.to_account()?;
    let revisions = ctx.revisions();
    let target = match target {
        Some(target) => target,
        None => revisions.current_branch().await?,
    };

    let signer = PackageSigner::new(
        package.clone(),
        account.clone(),
        ctx.source_dir(),
        revisions.clone(),
        ctx.keys(),
        ctx.chain_verifier()?,
        KeyUnlocker::new(prompt, SigningSession::new()),
    )
    .with_builder(ctx.builder());

    let Some(signature) = signer.sign_package(Some(&target)).await? else {
        bail!(
            "{} holds no valid certificate for {}; nothing was signed",
            account.name,
            package
        );
    };

    revisions
        .set_info(
            &target,
            RevisionInfo {
                last_changed_author: account.name.clone(),
                last_changed_date: Utc::now(),
            },
        )
        .await?;
    info!(package = %package, target = %target, "Revision signed");

    Ok(signature)
}
