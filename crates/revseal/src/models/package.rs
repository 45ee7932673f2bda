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
use std::fmt;

/// A package hosted in a repository, owned by a registered author.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Package {
    pub name: String,
    /// Account that registered the package
    pub author: String,
    /// Repository the package is published in
    pub repo: String,
}

impl Package {
    pub fn new(
        name: impl Into<String>,
        author: impl Into<String>,
        repo: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            author: author.into(),
            repo: repo.into(),
        }
    }

    /// Common name of the certificate a given signer uses for this package.
    ///
    /// The registered author signs with `author.repo`. Any other signer holds
    /// a certificate issued by the author, named `signer.author.repo`.
    pub fn signer_common_name(&self, signer: &str) -> String {
        if signer == self.author {
            format!("{}.{}", self.author, self.repo)
        } else {
            format!("{}.{}.{}", signer, self.author, self.repo)
        }
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.repo, self.author, self.name)
    }
}

/// A signing identity and the alias of its designated key in the key store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub name: String,
    pub key_alias: String,
}

impl Account {
    pub fn new(name: impl Into<String>, key_alias: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key_alias: key_alias.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_author_signs_with_two_segment_name() {
        let package = Package::new("left-pad", "alice", "apex");
        assert_eq!(package.signer_common_name("alice"), "alice.apex");
    }

    #[test]
    fn test_collaborator_name_is_prefixed() {
        let package = Package::new("left-pad", "alice", "apex");
        assert_eq!(package.signer_common_name("bob"), "bob.alice.apex");
    }

    #[test]
    fn test_display() {
        let package = Package::new("left-pad", "alice", "apex");
        assert_eq!(package.to_string(), "apex/alice/left-pad");
    }
}
