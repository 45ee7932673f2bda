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

//! Content addressing of package file trees.
//!
//! A package revision is reduced to a [`FileInventory`] (path to SHA-1) and
//! then to a single hex root by folding the sorted leaf hashes pairwise with
//! SHA-256. The root is sealed with the previous revision's root so that
//! successive signed revisions form a hash chain.

mod builder;
mod inventory;
mod tree;

pub use builder::{MerkleTreeBuilder, DEFAULT_EXCLUDED_NAMES, SYMLINK_LEAF_PREFIX};
pub use inventory::FileInventory;
pub use tree::MerkleTree;

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building a Merkle tree.
#[derive(Debug, Error)]
pub enum MerkleError {
    #[error("Cannot build a Merkle tree from an empty file set")]
    EmptyInventory,

    #[error("Failed to hash {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to walk package directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Path is not valid UTF-8: {0}")]
    NonUtf8Path(PathBuf),

    #[error("Path {path} is outside the package root {root}")]
    OutsideRoot { path: PathBuf, root: PathBuf },
}
