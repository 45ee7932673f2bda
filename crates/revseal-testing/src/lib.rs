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

//! # revseal-testing
//!
//! Test utilities for revseal: a throwaway certificate hierarchy, scripted
//! password prompts, an in-process revocation ledger and temporary package
//! directories. Everything here panics on setup failure.
//!
//! ```rust,ignore
//! use revseal_testing::SigningFixture;
//!
//! let fixture = SigningFixture::new(&[("a.txt", "x"), ("b.txt", "y")]);
//! fixture.prompt.push("alice-pw");
//! let signature = fixture.signer("alice").sign_package(None).await?;
//! ```

pub mod fixture;
pub mod ledger;
pub mod package;
pub mod pki;
pub mod prompt;

pub use fixture::SigningFixture;
pub use ledger::{LedgerRequest, StaticLedger};
pub use package::PackageDir;
pub use pki::{Issued, TestPki};
pub use prompt::ScriptedPrompt;
