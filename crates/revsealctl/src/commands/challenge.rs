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

use super::context::Context;
use anyhow::Result;
use revseal::security::{ChallengeSigner, SecretPrompt};
use std::sync::Arc;

pub async fn run(ctx: &Context, challenge: &str, prompt: Arc<dyn SecretPrompt>) -> Result<String> {
    let account = ctx.config().account.to_account()?;
    let signer = ChallengeSigner::new(ctx.keys(), prompt);
    Ok(signer.sign(&account, challenge.as_bytes()).await?)
}
