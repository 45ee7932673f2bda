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

use crate::merkle::{FileInventory, MerkleTree};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Names of the revision properties written by a signing operation.
pub mod properties {
    /// Hex Merkle root of the signed revision.
    pub const MERKLE_ROOT: &str = "merkle_root";
    /// Merkle root of the previous signed revision, absent on the first one.
    pub const PREV_MERKLE_ROOT: &str = "prev_merkle_root";
    /// Hex RSA-SHA384 signature over the Merkle root.
    pub const SIGNATURE: &str = "signature";
    /// JSON object mapping each file path to its SHA-1.
    pub const INVENTORY: &str = "inventory";
}

/// Last-change information the version-control backend reports for a target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionInfo {
    pub last_changed_author: String,
    pub last_changed_date: DateTime<Utc>,
}

/// The metadata attached to one signed revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionMetadata {
    pub merkle_root: String,
    pub prev_merkle_root: Option<String>,
    pub signature: String,
    pub inventory: FileInventory,
}

impl RevisionMetadata {
    pub fn from_tree(tree: &MerkleTree, signature: String) -> Self {
        Self {
            merkle_root: tree.merkle_root().to_string(),
            prev_merkle_root: tree.prev_merkle_root().map(str::to_string),
            signature,
            inventory: tree.files().clone(),
        }
    }

    /// Property name/value pairs in the order they are written.
    pub fn to_properties(&self) -> Result<Vec<(&'static str, String)>, serde_json::Error> {
        let mut props = vec![
            (properties::MERKLE_ROOT, self.merkle_root.clone()),
            (properties::SIGNATURE, self.signature.clone()),
            (properties::INVENTORY, self.inventory.to_json()?),
        ];
        if let Some(prev) = &self.prev_merkle_root {
            props.push((properties::PREV_MERKLE_ROOT, prev.clone()));
        }
        Ok(props)
    }
}
