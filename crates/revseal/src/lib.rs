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

//! # revseal
//!
//! Package integrity and code signing for source-controlled package revisions.
//!
//! A signed revision carries four properties on its version-control target:
//! the Merkle root of the package file tree, the root of the previous signed
//! revision, an RSA-SHA384 signature over the root, and the file inventory the
//! root was computed from. Verification rebuilds the root from a checkout,
//! checks the signature against the signer's certificate, walks the
//! certificate's issuer chain to the trusted root and asks a remote ledger
//! whether any certificate on the chain was revoked.
//!
//! ## Modules
//!
//! - [`merkle`]: file inventories and chained Merkle roots
//! - [`crypto`]: RSA signing, X.509 certificates, encrypted private keys
//! - [`security`]: key unlocking, package/challenge signing, chain and
//!   download verification, audit logging
//! - [`store`]: the revision, key and certificate store seams plus reference
//!   adapters
//! - [`models`]: packages, accounts and revision metadata
//!
//! ## Example
//!
//! ```rust,ignore
//! use revseal::merkle::MerkleTreeBuilder;
//!
//! let tree = MerkleTreeBuilder::new().build_from_directory(None, None, "./my-package")?;
//! println!("{}", tree.merkle_root());
//! ```

pub mod crypto;
pub mod merkle;
pub mod models;
pub mod security;
pub mod store;

pub use merkle::{FileInventory, MerkleError, MerkleTree, MerkleTreeBuilder};
pub use models::{Account, Package, RevisionInfo, RevisionMetadata};
pub use security::{
    CertificateChainVerifier, ChallengeSigner, DownloadVerifier, KeyUnlocker, PackageSigner,
    SigningSession,
};
