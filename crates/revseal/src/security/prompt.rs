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
use std::io::{self, BufRead, IsTerminal, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("Password entry was cancelled")]
    Cancelled,

    #[error("Failed to read password: {0}")]
    Io(#[from] io::Error),
}

/// Source of secrets typed by a human (or scripted in tests).
pub trait SecretPrompt: Send + Sync {
    /// Ask for a secret. `label` describes what is being unlocked.
    fn prompt_secret(&self, label: &str) -> Result<String, PromptError>;
}

/// Line-oriented prompt: writes the label to `output`, reads one line from
/// `input`. End of input cancels.
pub struct LinePrompt<R, W> {
    io: Mutex<(R, W)>,
}

impl<R, W> LinePrompt<R, W>
where
    R: BufRead + Send,
    W: Write + Send,
{
    pub fn new(input: R, output: W) -> Self {
        Self {
            io: Mutex::new((input, output)),
        }
    }
}

impl<R, W> SecretPrompt for LinePrompt<R, W>
where
    R: BufRead + Send,
    W: Write + Send,
{
    fn prompt_secret(&self, label: &str) -> Result<String, PromptError> {
        let mut guard = self.io.lock();
        let (input, output) = &mut *guard;

        write!(output, "{label}: ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(PromptError::Cancelled);
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

type StdioPrompt = LinePrompt<io::BufReader<io::Stdin>, io::Stderr>;

/// Prompt on the controlling terminal with echo turned off.
///
/// When stdin is not a terminal (piped passwords in scripts), the answer is
/// read as one line from stdin and the label goes to stderr.
pub struct TerminalPrompt {
    piped: Option<StdioPrompt>,
}

impl TerminalPrompt {
    pub fn terminal() -> Self {
        let piped = (!io::stdin().is_terminal())
            .then(|| LinePrompt::new(io::BufReader::new(io::stdin()), io::stderr()));
        Self { piped }
    }
}

impl SecretPrompt for TerminalPrompt {
    fn prompt_secret(&self, label: &str) -> Result<String, PromptError> {
        match &self.piped {
            Some(piped) => piped.prompt_secret(label),
            None => rpassword::prompt_password(format!("{label}: ")).map_err(hidden_input_error),
        }
    }
}

fn hidden_input_error(error: io::Error) -> PromptError {
    match error.kind() {
        io::ErrorKind::UnexpectedEof | io::ErrorKind::Interrupted => PromptError::Cancelled,
        _ => PromptError::Io(error),
    }
}
