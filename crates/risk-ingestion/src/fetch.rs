//! Fetch/caching mechanics for the tool-catalog crawl and the benchmark
//! asset (§5, §6). Deliberately isolated behind the `Fetcher` trait: the
//! crawl *logic* in `tool_sources.rs` (two-phase A-Z crawl, JSON
//! pagination, Markdown grammar) is in scope; the bytes-on-the-wire
//! mechanics below are the external-collaborator glue named in spec §1.

use crate::error::IngestError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

const MAX_CONCURRENT_FETCHES: usize = 20;
const MAX_ATTEMPTS: u32 = 3;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(45);

#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, IngestError>;
}

/// HTTP fetcher backed by a disk cache keyed by URL, bounded concurrency
/// via a semaphore, and per-request retries with linear backoff
/// (`sleep = base * attempt`, §5).
pub struct CachingHttpFetcher {
    client: reqwest::Client,
    cache: moka::future::Cache<String, Arc<Vec<u8>>>,
    cache_dir: PathBuf,
    semaphore: Arc<Semaphore>,
    force_refresh: bool,
    backoff_base: Duration,
}

impl CachingHttpFetcher {
    pub fn new(cache_dir: impl Into<PathBuf>, force_refresh: bool) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("reqwest client"),
            cache: moka::future::Cache::new(10_000),
            cache_dir: cache_dir.into(),
            semaphore: Arc::new(Semaphore::new(MAX_CONCURRENT_FETCHES)),
            force_refresh,
            backoff_base: Duration::from_millis(250),
        }
    }

    fn cache_path(&self, url: &str) -> PathBuf {
        let digest = url.bytes().fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
        self.cache_dir.join(format!("{digest:016x}.bin"))
    }

    async fn read_disk_cache(&self, path: &Path) -> Option<Vec<u8>> {
        tokio::fs::read(path).await.ok()
    }

    async fn write_disk_cache(&self, path: &Path, bytes: &[u8]) -> Result<(), IngestError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|source| IngestError::Cache {
                path: parent.display().to_string(),
                source,
            })?;
        }
        tokio::fs::write(path, bytes).await.map_err(|source| IngestError::Cache {
            path: path.display().to_string(),
            source,
        })
    }

    async fn fetch_with_retry(&self, url: &str) -> Result<Vec<u8>, IngestError> {
        let _permit = self.semaphore.acquire().await.expect("semaphore closed");
        let mut last_err = None;
        for attempt in 1..=MAX_ATTEMPTS {
            match self.client.get(url).send().await {
                Ok(resp) => match resp.error_for_status() {
                    Ok(resp) => match resp.bytes().await {
                        Ok(bytes) => return Ok(bytes.to_vec()),
                        Err(e) => last_err = Some(e),
                    },
                    Err(e) => last_err = Some(e),
                },
                Err(e) => last_err = Some(e),
            }
            if attempt < MAX_ATTEMPTS {
                tokio::time::sleep(self.backoff_base * attempt).await;
            }
        }
        Err(IngestError::Http { url: url.to_string(), source: last_err.unwrap() })
    }
}

#[async_trait::async_trait]
impl Fetcher for CachingHttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, IngestError> {
        if !self.force_refresh {
            if let Some(bytes) = self.cache.get(url).await {
                return Ok((*bytes).clone());
            }
            let path = self.cache_path(url);
            if let Some(bytes) = self.read_disk_cache(&path).await {
                self.cache.insert(url.to_string(), Arc::new(bytes.clone())).await;
                return Ok(bytes);
            }
        }

        tracing::info!(url, "fetching");
        let bytes = self.fetch_with_retry(url).await?;
        let path = self.cache_path(url);
        self.write_disk_cache(&path, &bytes).await?;
        self.cache.insert(url.to_string(), Arc::new(bytes.clone())).await;
        Ok(bytes)
    }
}

/// In-memory fetcher for tests: returns canned bytes per URL, never touches
/// the network or disk.
#[derive(Default)]
pub struct StaticFetcher {
    pub responses: HashMap<String, Vec<u8>>,
}

#[async_trait::async_trait]
impl Fetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, IngestError> {
        self.responses
            .get(url)
            .cloned()
            .ok_or_else(|| IngestError::Cache { path: url.to_string(), source: std::io::Error::new(std::io::ErrorKind::NotFound, "no canned response") })
    }
}
