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

//! Hex digests: SHA-1 for file leaves, SHA-256 for tree nodes, SHA-384 for
//! certificate fingerprints.

use openssl::hash::{Hasher, MessageDigest};
use sha2::{Digest, Sha256, Sha384};
use std::fs::File;
use std::io;
use std::path::Path;

/// Streams a file through SHA-1 and returns the lowercase hex digest.
pub fn sha1_file(path: &Path) -> io::Result<String> {
    let mut hasher = Hasher::new(MessageDigest::sha1()).map_err(io::Error::other)?;
    let mut file = File::open(path)?;
    io::copy(&mut file, &mut hasher)?;
    let digest = hasher.finish().map_err(io::Error::other)?;
    Ok(hex::encode(digest))
}

pub fn sha1_hex(data: &[u8]) -> String {
    hex::encode(openssl::sha::sha1(data))
}

pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

pub fn sha384_hex(data: &[u8]) -> String {
    let mut hasher = Sha384::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
