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

use serde::{Deserialize, Serialize};
use std::collections::btree_map;
use std::collections::BTreeMap;

/// Relative file path to hex SHA-1, ordered by path. Symbolic links map to
/// a `symlink:`-prefixed digest of their target instead.
///
/// Paths are normalized on insert: `\` becomes `/` and leading `./` or `/`
/// is dropped, so the same tree yields the same inventory on every platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileInventory(BTreeMap<String, String>);

impl FileInventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a file hash, returning the previous hash for that path.
    pub fn insert(&mut self, path: impl Into<String>, sha1: impl Into<String>) -> Option<String> {
        self.0.insert(normalize_path(&path.into()), sha1.into())
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.0.get(&normalize_path(path)).map(String::as_str)
    }

    pub fn remove(&mut self, path: &str) -> Option<String> {
        self.0.remove(&normalize_path(path))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, String> {
        self.0.iter()
    }

    /// Leaf hashes in path order.
    pub fn hashes(&self) -> impl Iterator<Item = &str> {
        self.0.values().map(String::as_str)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let raw: BTreeMap<String, String> = serde_json::from_str(json)?;
        Ok(raw.into_iter().collect())
    }
}

impl<K, V> FromIterator<(K, V)> for FileInventory
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut inventory = Self::new();
        for (path, sha1) in iter {
            inventory.insert(path, sha1);
        }
        inventory
    }
}

impl<'a> IntoIterator for &'a FileInventory {
    type Item = (&'a String, &'a String);
    type IntoIter = btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

fn normalize_path(path: &str) -> String {
    let mut normalized = path.replace('\\', "/");
    loop {
        if let Some(rest) = normalized.strip_prefix("./") {
            normalized = rest.to_string();
        } else if let Some(rest) = normalized.strip_prefix('/') {
            normalized = rest.to_string();
        } else {
            return normalized;
        }
    }
}
