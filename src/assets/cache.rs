//! Install / activate / respond lifecycle for the offline asset cache

use std::sync::Arc;

use futures::future::try_join_all;
use tracing::{debug, info, warn};

use crate::assets::error::AssetError;
use crate::assets::fetcher::AssetFetcher;
use crate::assets::storage::AssetStorage;
use crate::assets::types::{AssetManifest, AssetResponse, CacheState};

pub struct OfflineAssetCache<S: AssetStorage> {
    storage: Arc<S>,
    fetcher: Arc<dyn AssetFetcher>,
    manifest: AssetManifest,
    state: CacheState,
    live: Option<String>,
}

impl<S: AssetStorage> OfflineAssetCache<S> {
    /// Creates the cache, resuming whichever version was last activated.
    pub fn new(
        storage: Arc<S>,
        fetcher: Arc<dyn AssetFetcher>,
        manifest: AssetManifest,
    ) -> Result<Self, AssetError> {
        let live = match storage.live_version()? {
            Some(name) if storage.versions()?.contains(&name) => Some(name),
            Some(name) => {
                warn!("Live cache version {} is missing from storage", name);
                None
            }
            None => None,
        };

        let state = if live.is_some() {
            CacheState::Active
        } else {
            CacheState::Uninstalled
        };

        Ok(Self {
            storage,
            fetcher,
            manifest,
            state,
            live,
        })
    }

    pub fn state(&self) -> CacheState {
        self.state
    }

    /// Version currently serving requests, if any
    pub fn live_version(&self) -> Option<&str> {
        self.live.as_deref()
    }

    /// Version this build of the widget wants to install
    pub fn current_version(&self) -> &str {
        &self.manifest.version
    }

    /// Fetches every manifest entry and stores them as the current version.
    ///
    /// All-or-nothing: if any entry fails, nothing is stored and the state
    /// reverts, leaving the live version (if any) serving.
    pub async fn install(&mut self) -> Result<usize, AssetError> {
        let previous = self.state;
        self.state = if self.live.is_some() {
            CacheState::Updating
        } else {
            CacheState::Installing
        };

        info!("Installing cache version {}", self.manifest.version);

        match self.fetch_manifest().await {
            Ok(entries) => match self.storage.put_version(&self.manifest.version, &entries) {
                Ok(()) => {
                    info!(
                        "Installed {} assets into cache version {}",
                        entries.len(),
                        self.manifest.version
                    );
                    Ok(entries.len())
                }
                Err(e) => {
                    self.state = previous;
                    Err(e)
                }
            },
            Err(e) => {
                warn!(
                    "Install of cache version {} failed: {}",
                    self.manifest.version, e
                );
                self.state = previous;
                Err(e)
            }
        }
    }

    /// Makes the current version live and deletes every other version.
    ///
    /// Returns the names of the deleted versions.
    pub fn activate(&mut self) -> Result<Vec<String>, AssetError> {
        let current = self.manifest.version.clone();
        let versions = self.storage.versions()?;

        if !versions.contains(&current) {
            return Err(AssetError::NotInstalled(current));
        }

        let mut deleted = Vec::new();
        for name in versions.into_iter().filter(|name| *name != current) {
            self.storage.delete_version(&name)?;
            info!("Deleted stale cache version {}", name);
            deleted.push(name);
        }

        self.storage.set_live_version(&current)?;
        self.live = Some(current);
        self.state = CacheState::Active;

        Ok(deleted)
    }

    /// Serves `request` from the live version, falling back to the network.
    ///
    /// Network responses are not written back to the cache.
    pub async fn respond(&self, request: &str) -> Result<AssetResponse, AssetError> {
        let url = self.manifest.resolve(request)?;

        if let Some(live) = &self.live {
            if let Some(cached) = self.storage.lookup(live, &url)? {
                debug!("Serving {} from cache version {}", url, live);
                return Ok(cached);
            }
        }

        debug!("Cache miss for {}, fetching from network", url);
        self.fetcher.fetch(&url).await
    }

    async fn fetch_manifest(&self) -> Result<Vec<AssetResponse>, AssetError> {
        let urls = self.manifest.resolved_entries()?;
        try_join_all(urls.iter().map(|url| self.fetch_for_install(url))).await
    }

    async fn fetch_for_install(&self, url: &str) -> Result<AssetResponse, AssetError> {
        let wrap = |source: AssetError| AssetError::Fetch {
            url: url.to_string(),
            source: Box::new(source),
        };

        let response = self.fetcher.fetch(url).await.map_err(wrap)?;
        if !response.is_success() {
            return Err(wrap(AssetError::BadStatus {
                url: url.to_string(),
                status: response.status,
            }));
        }

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::fetcher::MockAssetFetcher;
    use crate::assets::storage::SqliteAssetStorage;
    use tempfile::TempDir;

    const BASE_URL: &str = "https://example.com/";

    fn manifest(version: &str) -> AssetManifest {
        AssetManifest::new(
            version,
            BASE_URL,
            vec!["./".to_string(), "./app.js".to_string()],
        )
        .unwrap()
    }

    fn ok_response(url: &str, body: &str) -> AssetResponse {
        AssetResponse {
            url: url.to_string(),
            status: 200,
            content_type: None,
            body: body.as_bytes().to_vec(),
        }
    }

    fn storage() -> (TempDir, Arc<SqliteAssetStorage>) {
        let temp_dir = TempDir::new().unwrap();
        let storage = SqliteAssetStorage::new(&temp_dir.path().join("assets.db")).unwrap();
        (temp_dir, Arc::new(storage))
    }

    /// Fetcher answering every URL with a body tagged by `tag`
    fn serving_fetcher(tag: &'static str) -> MockAssetFetcher {
        let mut fetcher = MockAssetFetcher::new();
        fetcher
            .expect_fetch()
            .returning(move |url| Ok(ok_response(url, tag)));
        fetcher
    }

    #[tokio::test]
    async fn new_cache_starts_uninstalled() {
        let (_temp_dir, storage) = storage();

        let cache =
            OfflineAssetCache::new(storage, Arc::new(MockAssetFetcher::new()), manifest("v1"))
                .unwrap();

        assert_eq!(cache.state(), CacheState::Uninstalled);
        assert_eq!(cache.live_version(), None);
    }

    #[tokio::test]
    async fn install_then_activate_serves_from_cache() {
        let (_temp_dir, storage) = storage();
        let mut cache = OfflineAssetCache::new(
            storage,
            Arc::new(serving_fetcher("v1")),
            manifest("v1"),
        )
        .unwrap();

        assert_eq!(cache.install().await.unwrap(), 2);
        assert_eq!(cache.state(), CacheState::Installing);

        cache.activate().unwrap();
        assert_eq!(cache.state(), CacheState::Active);
        assert_eq!(cache.live_version(), Some("v1"));

        let response = cache.respond("./app.js").await.unwrap();
        assert_eq!(response.body, b"v1".to_vec());
    }

    #[tokio::test]
    async fn install_failure_creates_no_version() {
        let (_temp_dir, storage) = storage();
        let mut fetcher = MockAssetFetcher::new();
        fetcher.expect_fetch().returning(|url| {
            if url.ends_with("app.js") {
                Ok(AssetResponse {
                    url: url.to_string(),
                    status: 404,
                    content_type: None,
                    body: vec![],
                })
            } else {
                Ok(ok_response(url, "index"))
            }
        });

        let mut cache =
            OfflineAssetCache::new(storage.clone(), Arc::new(fetcher), manifest("v1")).unwrap();
        let result = cache.install().await;

        match result {
            Err(AssetError::Fetch { url, .. }) => assert_eq!(url, "https://example.com/app.js"),
            other => panic!("expected fetch error, got {:?}", other),
        }
        assert_eq!(cache.state(), CacheState::Uninstalled);
        assert!(storage.versions().unwrap().is_empty());
        assert!(matches!(cache.activate(), Err(AssetError::NotInstalled(_))));
    }

    #[tokio::test]
    async fn failed_update_keeps_previous_version_serving() {
        let (_temp_dir, storage) = storage();
        let mut v1 = OfflineAssetCache::new(
            storage.clone(),
            Arc::new(serving_fetcher("v1")),
            manifest("v1"),
        )
        .unwrap();
        v1.install().await.unwrap();
        v1.activate().unwrap();

        let mut fetcher = MockAssetFetcher::new();
        fetcher.expect_fetch().returning(|url| {
            if url.ends_with("app.js") {
                Err(AssetError::BadStatus {
                    url: url.to_string(),
                    status: 502,
                })
            } else {
                Ok(ok_response(url, "v2"))
            }
        });
        let mut v2 =
            OfflineAssetCache::new(storage.clone(), Arc::new(fetcher), manifest("v2")).unwrap();
        assert_eq!(v2.state(), CacheState::Active);

        assert!(v2.install().await.is_err());

        assert_eq!(v2.state(), CacheState::Active);
        assert_eq!(storage.versions().unwrap(), vec!["v1".to_string()]);
        let response = v2.respond("./").await.unwrap();
        assert_eq!(response.body, b"v1".to_vec());
    }

    #[tokio::test]
    async fn activate_removes_every_other_version() {
        let (_temp_dir, storage) = storage();
        storage
            .put_version("v1", &[ok_response("https://example.com/", "v1")])
            .unwrap();
        storage.set_live_version("v1").unwrap();

        let mut cache = OfflineAssetCache::new(
            storage.clone(),
            Arc::new(serving_fetcher("v2")),
            manifest("v2"),
        )
        .unwrap();
        cache.install().await.unwrap();
        assert_eq!(cache.state(), CacheState::Updating);
        // The old version serves until activation
        assert_eq!(cache.respond("./").await.unwrap().body, b"v1".to_vec());

        let deleted = cache.activate().unwrap();

        assert_eq!(deleted, vec!["v1".to_string()]);
        assert_eq!(storage.versions().unwrap(), vec!["v2".to_string()]);
        assert_eq!(storage.live_version().unwrap(), Some("v2".to_string()));
        assert_eq!(cache.respond("./").await.unwrap().body, b"v2".to_vec());
    }

    #[tokio::test]
    async fn respond_falls_back_to_network_without_writing_back() {
        let (_temp_dir, storage) = storage();
        let mut cache = OfflineAssetCache::new(
            storage.clone(),
            Arc::new(serving_fetcher("net")),
            manifest("v1"),
        )
        .unwrap();
        cache.install().await.unwrap();
        cache.activate().unwrap();

        let response = cache.respond("./data.json").await.unwrap();

        assert_eq!(response.url, "https://example.com/data.json");
        assert_eq!(response.body, b"net".to_vec());
        assert_eq!(
            storage.lookup("v1", "https://example.com/data.json").unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn respond_propagates_network_error_on_miss() {
        let (_temp_dir, storage) = storage();
        let mut fetcher = MockAssetFetcher::new();
        fetcher.expect_fetch().times(1).returning(|url| {
            Err(AssetError::BadStatus {
                url: url.to_string(),
                status: 503,
            })
        });

        let cache = OfflineAssetCache::new(storage, Arc::new(fetcher), manifest("v1")).unwrap();
        let result = cache.respond("./index.html").await;

        assert!(matches!(result, Err(AssetError::BadStatus { status: 503, .. })));
    }

    #[tokio::test]
    async fn new_cache_resumes_live_version() {
        let (_temp_dir, storage) = storage();
        storage
            .put_version("v1", &[ok_response("https://example.com/", "v1")])
            .unwrap();
        storage.set_live_version("v1").unwrap();

        let mut fetcher = MockAssetFetcher::new();
        fetcher.expect_fetch().never();
        let cache = OfflineAssetCache::new(storage, Arc::new(fetcher), manifest("v1")).unwrap();

        assert_eq!(cache.state(), CacheState::Active);
        assert_eq!(cache.respond("./").await.unwrap().body, b"v1".to_vec());
    }
}
