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

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "revsealctl",
    version,
    about = "Sign and verify package revisions",
    long_about = "Computes Merkle roots of package trees, signs them with an account key and \
                  verifies checkouts against signed revisions, certificate chains and the \
                  revocation ledger"
)]
pub struct Cli {
    /// Configuration file (defaults to REVSEAL_CONFIG, then the search path)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute the Merkle root of a package directory
    Root {
        /// Directory to hash (defaults to package.source_dir)
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Root of the previous revision to chain to
        #[arg(long)]
        prev: Option<String>,

        #[arg(long, value_enum, default_value = "human")]
        format: OutputFormat,
    },
    /// Sign the package revision at a target
    Sign {
        /// Revision target (defaults to the current branch)
        #[arg(long)]
        target: Option<String>,
    },
    /// Verify a checkout against the signed revision at a target
    Verify {
        /// Revision target (defaults to the current branch)
        #[arg(long)]
        target: Option<String>,

        /// Checkout to verify (defaults to package.source_dir)
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Also check that the target was signed as the successor of this one
        #[arg(long)]
        previous: Option<String>,
    },
    /// Generate a password-protected signing key in the key directory
    Keygen {
        /// Key alias (defaults to the account's key alias)
        #[arg(long)]
        alias: Option<String>,

        /// RSA modulus size in bits
        #[arg(long)]
        bits: Option<u32>,
    },
    /// Sign a login challenge with the account key
    SignChallenge {
        /// Challenge text as issued by the server
        challenge: String,
    },
    /// Configuration helpers
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,
    /// Print a default configuration file
    Default,
    /// Print the configuration search path
    Paths,
}
