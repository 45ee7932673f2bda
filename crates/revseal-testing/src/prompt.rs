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

use parking_lot::Mutex;
use revseal::security::{PromptError, SecretPrompt};
use std::collections::VecDeque;

/// Prompt that answers from a script and cancels once the script runs out.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    answers: Mutex<VecDeque<String>>,
    labels: Mutex<Vec<String>>,
}

impl ScriptedPrompt {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: Mutex::new(answers.into_iter().map(Into::into).collect()),
            labels: Mutex::new(Vec::new()),
        }
    }

    /// Queue another answer.
    pub fn push(&self, answer: impl Into<String>) {
        self.answers.lock().push_back(answer.into());
    }

    /// Number of times the prompt was shown.
    pub fn times_asked(&self) -> usize {
        self.labels.lock().len()
    }

    pub fn labels(&self) -> Vec<String> {
        self.labels.lock().clone()
    }
}

impl SecretPrompt for ScriptedPrompt {
    fn prompt_secret(&self, label: &str) -> Result<String, PromptError> {
        self.labels.lock().push(label.to_string());
        self.answers.lock().pop_front().ok_or(PromptError::Cancelled)
    }
}
