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

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A package working directory that is deleted on drop.
pub struct PackageDir {
    dir: TempDir,
}

impl PackageDir {
    pub fn new(files: &[(&str, &str)]) -> Self {
        let package = Self {
            dir: TempDir::new().expect("temp dir"),
        };
        for (path, contents) in files {
            package.write(path, contents);
        }
        package
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn join(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    pub fn write(&self, relative: &str, contents: &str) {
        let path = self.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dirs");
        }
        fs::write(path, contents).expect("write file");
    }

    pub fn remove(&self, relative: &str) {
        fs::remove_file(self.join(relative)).expect("remove file");
    }

    /// Point `link` at `target`, replacing any existing link.
    #[cfg(unix)]
    pub fn symlink(&self, link: &str, target: &str) {
        let path = self.join(link);
        if fs::symlink_metadata(&path).is_ok() {
            fs::remove_file(&path).expect("remove existing link");
        }
        std::os::unix::fs::symlink(target, path).expect("create symlink");
    }

    pub fn rename(&self, from: &str, to: &str) {
        let target = self.join(to);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).expect("create parent dirs");
        }
        fs::rename(self.join(from), target).expect("rename file");
    }
}
