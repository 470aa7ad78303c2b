//! Common types for the offline asset cache

use reqwest::Url;

use crate::assets::error::AssetError;

/// Lifecycle state of the offline cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// No version has ever been activated
    Uninstalled,
    /// First install in progress or awaiting activation
    Installing,
    /// A version is live and serving
    Active,
    /// A new install is pending while the previous version keeps serving
    Updating,
}

impl CacheState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheState::Uninstalled => "uninstalled",
            CacheState::Installing => "installing",
            CacheState::Active => "active",
            CacheState::Updating => "updating",
        }
    }
}

/// A response as stored in, or served from, the cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetResponse {
    pub url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl AssetResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The fixed list of assets making up one cache version
#[derive(Debug, Clone, PartialEq)]
pub struct AssetManifest {
    pub version: String,
    base_url: Url,
    entries: Vec<String>,
}

impl AssetManifest {
    pub fn new(version: &str, base_url: &str, entries: Vec<String>) -> Result<Self, AssetError> {
        let base_url = Url::parse(base_url).map_err(|e| AssetError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            version: version.to_string(),
            base_url,
            entries,
        })
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Resolves a relative or absolute request URL against the base URL
    pub fn resolve(&self, url: &str) -> Result<String, AssetError> {
        self.base_url
            .join(url)
            .map(String::from)
            .map_err(|e| AssetError::InvalidUrl {
                url: url.to_string(),
                reason: e.to_string(),
            })
    }

    /// Absolute URLs of every manifest entry, duplicates removed
    pub fn resolved_entries(&self) -> Result<Vec<String>, AssetError> {
        let mut urls: Vec<String> = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            let url = self.resolve(entry)?;
            if !urls.contains(&url) {
                urls.push(url);
            }
        }
        Ok(urls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest(entries: &[&str]) -> AssetManifest {
        AssetManifest::new(
            "converter-v2",
            "https://example.com/app/",
            entries.iter().map(|e| e.to_string()).collect(),
        )
        .unwrap()
    }

    #[test]
    fn resolve_joins_relative_entries_with_base_url() {
        let manifest = manifest(&[]);

        assert_eq!(
            manifest.resolve("./style.css").unwrap(),
            "https://example.com/app/style.css"
        );
        assert_eq!(manifest.resolve("./").unwrap(), "https://example.com/app/");
    }

    #[test]
    fn resolve_keeps_absolute_urls() {
        let manifest = manifest(&[]);

        assert_eq!(
            manifest.resolve("https://cdn.example.com/icon.png").unwrap(),
            "https://cdn.example.com/icon.png"
        );
    }

    #[test]
    fn resolved_entries_removes_duplicates() {
        let manifest = manifest(&["./", "./index.html", "./index.html"]);

        assert_eq!(
            manifest.resolved_entries().unwrap(),
            vec![
                "https://example.com/app/".to_string(),
                "https://example.com/app/index.html".to_string(),
            ]
        );
    }

    #[test]
    fn new_rejects_invalid_base_url() {
        let result = AssetManifest::new("v1", "not a url", vec![]);

        assert!(matches!(result, Err(AssetError::InvalidUrl { .. })));
    }

    #[test]
    fn is_success_only_for_2xx() {
        let response = |status| AssetResponse {
            url: "https://example.com/".to_string(),
            status,
            content_type: None,
            body: vec![],
        };

        assert!(response(200).is_success());
        assert!(!response(304).is_success());
        assert!(!response(404).is_success());
    }
}
