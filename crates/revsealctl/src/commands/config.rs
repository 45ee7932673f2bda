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

use crate::cli::ConfigCommands;
use crate::config::{generate_default_config_toml, ConfigLoader, RevsealConfig};
use anyhow::Result;

pub fn run(action: &ConfigCommands, config: &RevsealConfig, loader: &ConfigLoader) -> Result<String> {
    match action {
        ConfigCommands::Show => Ok(toml::to_string_pretty(config)?),
        ConfigCommands::Default => Ok(generate_default_config_toml()?),
        ConfigCommands::Paths => Ok(loader
            .get_search_paths()
            .iter()
            .map(|path| path.display().to_string())
            .collect::<Vec<_>>()
            .join("\n")),
    }
}
