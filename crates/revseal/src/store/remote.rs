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

use super::fs::DirectoryCertificateStore;
use super::{CertificateStore, StoreError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Certificates fetched over HTTP from `GET {base}/certificates/{cn}`.
///
/// A 404 means the certificate does not exist. When a cache directory is
/// configured, it is consulted first and every fetched certificate is
/// written through to it.
#[derive(Debug, Clone)]
pub struct RemoteCertificateStore {
    client: Client,
    base_url: Url,
    cache: Option<DirectoryCertificateStore>,
}

impl RemoteCertificateStore {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, StoreError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| StoreError::Backend(format!("invalid certificate URL {base_url}: {e}")))?;

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url,
            cache: None,
        })
    }

    pub fn with_cache(mut self, cache: DirectoryCertificateStore) -> Self {
        self.cache = Some(cache);
        self
    }

    fn certificate_url(&self, common_name: &str) -> Result<Url, StoreError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::Backend(format!("{} cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .push("certificates")
            .push(common_name);
        Ok(url)
    }
}

#[async_trait]
impl CertificateStore for RemoteCertificateStore {
    async fn get(&self, common_name: &str) -> Result<Option<Vec<u8>>, StoreError> {
        if let Some(cache) = &self.cache {
            if let Some(cached) = cache.get(common_name).await? {
                return Ok(Some(cached));
            }
        }

        let url = self.certificate_url(common_name)?;
        debug!(%url, "Fetching certificate");
        let response = self.client.get(url).send().await?;

        match response.status() {
            StatusCode::OK => {
                let bytes = response.bytes().await?.to_vec();
                if let Some(cache) = &self.cache {
                    if let Err(e) = cache.put(common_name, &bytes).await {
                        warn!(common_name, error = %e, "Failed to cache certificate");
                    }
                }
                Ok(Some(bytes))
            }
            StatusCode::NOT_FOUND => Ok(None),
            status => Err(StoreError::Backend(format!(
                "certificate service returned {status} for {common_name}"
            ))),
        }
    }
}
