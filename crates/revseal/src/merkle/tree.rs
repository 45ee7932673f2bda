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

use super::{FileInventory, MerkleError};
use crate::crypto::sha256_hex;
use crate::models::Package;
use serde::Serialize;

/// A sealed Merkle tree over one package revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MerkleTree {
    merkle_root: String,
    prev_merkle_root: Option<String>,
    files: FileInventory,
    package: Option<Package>,
}

impl MerkleTree {
    pub(super) fn seal(
        files: FileInventory,
        prev_merkle_root: Option<&str>,
        package: Option<Package>,
    ) -> Result<Self, MerkleError> {
        let round_root = fold(files.hashes())?;
        let merkle_root = chain(prev_merkle_root, &round_root);

        Ok(Self {
            merkle_root,
            prev_merkle_root: prev_merkle_root.map(str::to_string),
            files,
            package,
        })
    }

    pub fn merkle_root(&self) -> &str {
        &self.merkle_root
    }

    pub fn prev_merkle_root(&self) -> Option<&str> {
        self.prev_merkle_root.as_deref()
    }

    pub fn files(&self) -> &FileInventory {
        &self.files
    }

    pub fn package(&self) -> Option<&Package> {
        self.package.as_ref()
    }
}

/// Pairwise SHA-256 fold over hex leaf hashes.
///
/// Each round concatenates neighbouring hex strings and hashes them; an odd
/// tail is paired with itself. At least one round runs.
pub(super) fn fold<'a>(leaves: impl Iterator<Item = &'a str>) -> Result<String, MerkleError> {
    let mut level: Vec<String> = leaves.map(str::to_string).collect();
    if level.is_empty() {
        return Err(MerkleError::EmptyInventory);
    }

    loop {
        if level.len() % 2 == 1 {
            if let Some(last) = level.last().cloned() {
                level.push(last);
            }
        }

        level = level
            .chunks(2)
            .map(|pair| {
                let mut joined = String::with_capacity(pair[0].len() + pair[1].len());
                joined.push_str(&pair[0]);
                joined.push_str(&pair[1]);
                sha256_hex(joined.as_bytes())
            })
            .collect();

        if level.len() == 1 {
            return Ok(level.swap_remove(0));
        }
    }
}

/// `SHA-256(prev || round_root)`, the empty string standing in for a missing
/// previous root.
pub(super) fn chain(prev_merkle_root: Option<&str>, round_root: &str) -> String {
    let prev = prev_merkle_root.unwrap_or_default();
    sha256_hex(format!("{prev}{round_root}").as_bytes())
}
