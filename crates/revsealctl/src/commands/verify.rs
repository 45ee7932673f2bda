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
use anyhow::{Context as _, Result};
use revseal::security::DownloadVerifier;
use revseal::store::RevisionStore;
use std::path::PathBuf;

/// Verify a checkout and, when `previous` is given, the chain of custody
/// from that target.
pub async fn run(
    ctx: &Context,
    target: Option<String>,
    dir: Option<PathBuf>,
    previous: Option<String>,
) -> Result<String> {
    let package = ctx.config().package.to_package()?;
    let revisions = ctx.revisions();
    let target = match target {
        Some(target) => target,
        None => revisions.current_branch().await?,
    };
    let dir = dir.unwrap_or_else(|| ctx.source_dir());

    let verifier = DownloadVerifier::new(package.clone(), revisions, ctx.chain_verifier()?)
        .with_builder(ctx.builder());

    let identity = verifier
        .verify(&target, &dir, None)
        .await
        .with_context(|| format!("Verification of {package} at {target} failed"))?;

    if let Some(previous) = previous {
        verifier
            .verify_chain_of_custody(&previous, &target)
            .await
            .with_context(|| format!("{target} does not follow {previous}"))?;
    }

    Ok(format!("{package} at {target}: signed by {identity}"))
}
