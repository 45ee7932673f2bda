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

use crate::ledger::StaticLedger;
use crate::package::PackageDir;
use crate::pki::{Issued, TestPki};
use crate::prompt::ScriptedPrompt;
use chrono::{DateTime, Utc};
use revseal::models::{Account, Package, RevisionInfo};
use revseal::security::{
    CertificateChainVerifier, DownloadVerifier, KeyUnlocker, PackageSigner, SigningSession,
};
use revseal::store::{InMemoryCertificateStore, InMemoryKeyStore, InMemoryRevisionStore};
use std::sync::Arc;

pub const REPO: &str = "apex";
pub const AUTHOR: &str = "alice";
pub const PACKAGE: &str = "left-pad";
pub const BRANCH: &str = "main";

/// Password protecting the key of account `name`.
pub fn password_for(name: &str) -> String {
    format!("{name}-pw")
}

/// Key alias of account `name`.
pub fn key_alias_for(name: &str) -> String {
    format!("{name}-key")
}

/// A repository with one package, its author and the in-memory stores.
///
/// The author `alice` holds `alice.apex` (organization "Alice Ltd"),
/// issued by `ca.apex`, issued by the trust anchor. Keys are encrypted with
/// [`password_for`]; the prompt starts with an empty script.
pub struct SigningFixture {
    pub pki: TestPki,
    pub ca: Issued,
    pub author: Issued,
    pub package: Package,
    pub source: PackageDir,
    pub revisions: Arc<InMemoryRevisionStore>,
    pub keys: Arc<InMemoryKeyStore>,
    pub certificates: Arc<InMemoryCertificateStore>,
    pub ledger: Arc<StaticLedger>,
    pub prompt: Arc<ScriptedPrompt>,
    pub session: SigningSession,
}

impl SigningFixture {
    pub fn new(files: &[(&str, &str)]) -> Self {
        let pki = TestPki::new();
        let ca = pki.repository_ca(REPO);
        let author = pki.issue(&format!("{AUTHOR}.{REPO}"), Some("Alice Ltd"), &ca);

        let certificates = Arc::new(InMemoryCertificateStore::new());
        certificates.insert(ca.common_name.clone(), ca.pem());
        certificates.insert(author.common_name.clone(), author.pem());

        let keys = Arc::new(InMemoryKeyStore::new());
        keys.insert(author.encrypted_key(&key_alias_for(AUTHOR), &password_for(AUTHOR)));

        Self {
            pki,
            ca,
            author,
            package: Package::new(PACKAGE, AUTHOR, REPO),
            source: PackageDir::new(files),
            revisions: Arc::new(InMemoryRevisionStore::new(BRANCH)),
            keys,
            certificates,
            ledger: Arc::new(StaticLedger::new()),
            prompt: Arc::new(ScriptedPrompt::default()),
            session: SigningSession::new(),
        }
    }

    /// Issue `name.alice.apex` under the author and register its key.
    pub fn add_collaborator(&self, name: &str, organization: Option<&str>) -> Issued {
        let common_name = self.package.signer_common_name(name);
        let issued = self.pki.issue(&common_name, organization, &self.author);
        self.certificates.insert(common_name, issued.pem());
        self.keys
            .insert(issued.encrypted_key(&key_alias_for(name), &password_for(name)));
        issued
    }

    pub fn account(&self, name: &str) -> Account {
        Account::new(name, key_alias_for(name))
    }

    pub fn chain_verifier(&self) -> Arc<CertificateChainVerifier> {
        Arc::new(CertificateChainVerifier::new(
            self.certificates.clone(),
            self.ledger.clone(),
            self.pki.trust_anchor(),
        ))
    }

    pub fn unlocker(&self) -> KeyUnlocker {
        KeyUnlocker::new(self.prompt.clone(), self.session.clone())
    }

    /// Signer for account `name` over the fixture's source directory.
    pub fn signer(&self, name: &str) -> PackageSigner {
        PackageSigner::new(
            self.package.clone(),
            self.account(name),
            self.source.path(),
            self.revisions.clone(),
            self.keys.clone(),
            self.chain_verifier(),
            self.unlocker(),
        )
    }

    pub fn verifier(&self) -> DownloadVerifier {
        DownloadVerifier::new(
            self.package.clone(),
            self.revisions.clone(),
            self.chain_verifier(),
        )
    }

    /// Record `author` as the last to change `target` at `date`.
    pub fn record_change(&self, target: &str, author: &str, date: DateTime<Utc>) {
        self.revisions.set_info(
            target,
            RevisionInfo {
                last_changed_author: author.to_string(),
                last_changed_date: date,
            },
        );
    }
}
