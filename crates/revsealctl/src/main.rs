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

use anyhow::{Context as _, Result};
use clap::Parser;
use revseal::security::{SecretPrompt, TerminalPrompt};
use revsealctl::commands::{self, Context};
use revsealctl::config::ConfigLoader;
use revsealctl::*;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loader = ConfigLoader::new();
    let config = loader
        .load_or_default(cli.config.as_deref())
        .context("Failed to load configuration")?;

    init_logging(&cli, &config.logging)?;

    let prompt: Arc<dyn SecretPrompt> = Arc::new(TerminalPrompt::terminal());
    let ctx = Context::new(config);

    let output = match cli.command {
        Commands::Root {
            dir,
            prev,
            format,
        } => commands::root::run(&ctx, dir, prev, format).await?,
        Commands::Sign { target } => commands::sign::run(&ctx, target, prompt).await?,
        Commands::Verify {
            target,
            dir,
            previous,
        } => commands::verify::run(&ctx, target, dir, previous).await?,
        Commands::Keygen { alias, bits } => commands::keygen::run(&ctx, alias, bits, prompt).await?,
        Commands::SignChallenge { challenge } => {
            commands::challenge::run(&ctx, &challenge, prompt).await?
        }
        Commands::Config(ref action) => commands::config::run(action, ctx.config(), &loader)?,
    };

    if !output.is_empty() {
        println!("{output}");
    }

    Ok(())
}
