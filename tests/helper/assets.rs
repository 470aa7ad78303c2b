//! Asset cache test utilities

use std::sync::Arc;

use mockito::{Mock, ServerGuard};
use tempfile::TempDir;

use unit_converter::assets::{
    AssetManifest, HttpAssetFetcher, OfflineAssetCache, SqliteAssetStorage,
};

pub const MANIFEST: &[&str] = &["./", "./index.html", "./style.css", "./app.js"];

pub fn create_test_storage() -> (TempDir, Arc<SqliteAssetStorage>) {
    let temp_dir = TempDir::new().unwrap();
    let storage = SqliteAssetStorage::new(&temp_dir.path().join("assets.db")).unwrap();
    (temp_dir, Arc::new(storage))
}

/// Create a cache for `version` whose manifest points at `server`
pub fn create_test_cache(
    server: &ServerGuard,
    storage: Arc<SqliteAssetStorage>,
    version: &str,
) -> OfflineAssetCache<SqliteAssetStorage> {
    let manifest = AssetManifest::new(
        version,
        &format!("{}/", server.url()),
        MANIFEST.iter().map(|u| u.to_string()).collect(),
    )
    .unwrap();
    OfflineAssetCache::new(storage, Arc::new(HttpAssetFetcher::new()), manifest).unwrap()
}

/// Serve every manifest asset with a body tagged by `tag`
pub async fn mock_manifest(server: &mut ServerGuard, tag: &str) -> Vec<Mock> {
    let mut mocks = Vec::new();
    for path in ["/", "/index.html", "/style.css", "/app.js"] {
        let mock = server
            .mock("GET", path)
            .with_status(200)
            .with_header("content-type", "text/plain")
            .with_body(format!("{} {}", tag, path))
            .create_async()
            .await;
        mocks.push(mock);
    }
    mocks
}
