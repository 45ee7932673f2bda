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
use crate::cli::OutputFormat;
use anyhow::{Context as _, Result};
use revseal::merkle::MerkleTree;
use std::path::PathBuf;

/// Compute the sealed root of `dir` (or the configured source directory).
pub async fn run(
    ctx: &Context,
    dir: Option<PathBuf>,
    prev: Option<String>,
    format: OutputFormat,
) -> Result<String> {
    let dir = dir.unwrap_or_else(|| ctx.source_dir());
    // Tagging the tree with the package is optional here.
    let package = ctx.config().package.to_package().ok();
    let builder = ctx.builder();

    let tree = tokio::task::spawn_blocking(move || {
        builder
            .build_from_directory(package.as_ref(), prev.as_deref(), &dir)
            .with_context(|| format!("Failed to build Merkle tree for {}", dir.display()))
    })
    .await??;

    render(&tree, format)
}

fn render(tree: &MerkleTree, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Human => {
            let mut out = format!("{}\n", tree.merkle_root());
            out.push_str(&format!("files: {}", tree.files().len()));
            if let Some(prev) = tree.prev_merkle_root() {
                out.push_str(&format!("\nchained to: {prev}"));
            }
            Ok(out)
        }
        OutputFormat::Json => Ok(serde_json::to_string_pretty(tree)?),
    }
}
