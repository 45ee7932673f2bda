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
use std::fmt;
use std::sync::Arc;

/// Password cache shared by every signing operation of one invocation.
///
/// Clones share the same cache. Nothing is persisted; the cache dies with
/// the last clone.
#[derive(Clone, Default)]
pub struct SigningSession {
    password: Arc<Mutex<Option<String>>>,
}

impl SigningSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cached_password(&self) -> Option<String> {
        self.password.lock().clone()
    }

    pub fn cache_password(&self, password: impl Into<String>) {
        *self.password.lock() = Some(password.into());
    }

    pub fn clear(&self) {
        *self.password.lock() = None;
    }
}

impl fmt::Debug for SigningSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cached = self.password.lock().is_some();
        f.debug_struct("SigningSession")
            .field("password", &if cached { "<redacted>" } else { "<none>" })
            .finish()
    }
}
