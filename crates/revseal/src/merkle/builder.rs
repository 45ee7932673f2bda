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

use super::{FileInventory, MerkleError, MerkleTree};
use crate::crypto::{sha1_file, sha1_hex};
use crate::models::Package;
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

/// Directory and file names never included in a package inventory.
pub const DEFAULT_EXCLUDED_NAMES: &[&str] = &[
    ".git",
    ".svn",
    ".hg",
    ".bzr",
    "CVS",
    "node_modules",
    "vendor",
    "bower_components",
];

/// Prefix of a symbolic link's leaf, followed by the SHA-1 of its target path.
/// File leaves are bare hex, so the two kinds never collide.
pub const SYMLINK_LEAF_PREFIX: &str = "symlink:";

/// Builds sealed Merkle trees from inventories or package directories.
#[derive(Debug, Clone)]
pub struct MerkleTreeBuilder {
    excluded_names: BTreeSet<String>,
}

impl Default for MerkleTreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MerkleTreeBuilder {
    pub fn new() -> Self {
        Self {
            excluded_names: DEFAULT_EXCLUDED_NAMES
                .iter()
                .map(|name| name.to_string())
                .collect(),
        }
    }

    /// Exclude additional file or directory names from directory walks.
    pub fn with_excluded_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_names.extend(names.into_iter().map(Into::into));
        self
    }

    /// Build a tree from an existing inventory, chained to `prev_merkle_root`.
    pub fn build(
        &self,
        inventory: FileInventory,
        prev_merkle_root: Option<&str>,
    ) -> Result<MerkleTree, MerkleError> {
        MerkleTree::seal(inventory, prev_merkle_root, None)
    }

    /// Walk `root_dir`, hash every included file and build the tree.
    pub fn build_from_directory(
        &self,
        package: Option<&Package>,
        prev_merkle_root: Option<&str>,
        root_dir: impl AsRef<Path>,
    ) -> Result<MerkleTree, MerkleError> {
        let root_dir = root_dir.as_ref();
        let inventory = self.inventory_from_directory(root_dir)?;
        let tree = MerkleTree::seal(inventory, prev_merkle_root, package.cloned())?;

        debug!(
            root_dir = %root_dir.display(),
            files = tree.files().len(),
            merkle_root = %tree.merkle_root(),
            "Built Merkle tree from directory"
        );
        Ok(tree)
    }

    /// SHA-1 every included file under `root_dir`.
    ///
    /// Symlinks are not followed. Each one becomes a leaf over the path it
    /// points to, so retargeting a link changes the root. Any unreadable
    /// entry fails the whole walk.
    pub fn inventory_from_directory(
        &self,
        root_dir: impl AsRef<Path>,
    ) -> Result<FileInventory, MerkleError> {
        let root_dir = root_dir.as_ref();

        let mut files: Vec<(PathBuf, bool)> = Vec::new();
        for entry in WalkDir::new(root_dir)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !self.is_excluded(entry))
        {
            let entry = entry?;
            let file_type = entry.file_type();
            if file_type.is_file() || file_type.is_symlink() {
                files.push((entry.into_path(), file_type.is_symlink()));
            }
        }

        let hashed: Vec<(String, String)> = files
            .par_iter()
            .map(|(path, is_symlink)| {
                let relative = relative_path(root_dir, path)?;
                let leaf = if *is_symlink {
                    symlink_leaf(path)?
                } else {
                    sha1_file(path).map_err(|source| MerkleError::Io {
                        path: path.clone(),
                        source,
                    })?
                };
                Ok((relative, leaf))
            })
            .collect::<Result<_, MerkleError>>()?;

        Ok(hashed.into_iter().collect())
    }

    fn is_excluded(&self, entry: &DirEntry) -> bool {
        let Some(name) = entry.file_name().to_str() else {
            return false;
        };

        if self.excluded_names.contains(name) {
            return true;
        }

        !entry.file_type().is_dir()
            && (name == ".env" || name.starts_with(".env.") || name.ends_with(".pem"))
    }
}

fn symlink_leaf(path: &Path) -> Result<String, MerkleError> {
    let target = std::fs::read_link(path).map_err(|source| MerkleError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let target = target
        .to_str()
        .ok_or_else(|| MerkleError::NonUtf8Path(path.to_path_buf()))?
        .replace('\\', "/");
    Ok(format!("{SYMLINK_LEAF_PREFIX}{}", sha1_hex(target.as_bytes())))
}

fn relative_path(root_dir: &Path, path: &Path) -> Result<String, MerkleError> {
    let relative = path
        .strip_prefix(root_dir)
        .map_err(|_| MerkleError::OutsideRoot {
            path: path.to_path_buf(),
            root: root_dir.to_path_buf(),
        })?;

    let parts = relative
        .components()
        .map(|component| {
            component
                .as_os_str()
                .to_str()
                .ok_or_else(|| MerkleError::NonUtf8Path(path.to_path_buf()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(parts.join("/"))
}
