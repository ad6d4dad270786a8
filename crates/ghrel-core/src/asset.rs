//! Release assets as reported by the GitHub releases API.

use chrono::{DateTime, Utc};
use globset::{Glob, GlobMatcher};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path};

use crate::classify;
use crate::error::{GhrelError, Result};

/// A file attached to a release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    /// Released file name; also the local file name.
    pub name: String,
    #[serde(rename = "browser_download_url")]
    pub download_url: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub download_count: u64,
    pub updated_at: DateTime<Utc>,
    /// Set by `classify`; not part of the API payload.
    #[serde(skip)]
    pub is_manifest: bool,
}

impl Asset {
    /// Build an asset and classify it by name.
    pub fn new(name: impl Into<String>, download_url: impl Into<String>) -> Self {
        let mut asset = Asset {
            name: name.into(),
            download_url: download_url.into(),
            size: 0,
            download_count: 0,
            updated_at: DateTime::<Utc>::default(),
            is_manifest: false,
        };
        asset.classify();
        asset
    }

    /// Mark the asset as a manifest if its name says so.
    pub fn classify(&mut self) {
        self.is_manifest = classify::is_manifest(&self.name);
    }

    /// The asset name if it is safe to use as a file name in the download
    /// directory (no separators, not `.` or `..`).
    pub fn local_file_name(&self) -> Option<&str> {
        let mut components = Path::new(&self.name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(n)), None)
                if n == self.name.as_str() && !self.name.contains('\\') =>
            {
                Some(&self.name)
            }
            _ => None,
        }
    }
}

/// The subset of `GET /repos/{owner}/{repo}/releases/latest` we use.
#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    #[serde(default)]
    pub tag_name: Option<String>,
    pub assets: Vec<Asset>,
}

impl Release {
    /// Decode a release JSON body and classify its assets.
    pub fn from_json(body: &[u8]) -> Result<Self> {
        let mut release: Release = serde_json::from_slice(body)
            .map_err(|e| GhrelError::format("release metadata", e.to_string()))?;
        for a in &mut release.assets {
            a.classify();
        }
        Ok(release)
    }
}

/// Glob filter for payload asset names (`*linux_amd64*`). Manifests are
/// never filtered.
#[derive(Debug, Clone)]
pub struct AssetFilter {
    matcher: Option<GlobMatcher>,
}

impl AssetFilter {
    /// Filter that lets every asset through.
    pub fn all() -> Self {
        Self { matcher: None }
    }

    /// Filter from an optional shell pattern; empty means no filtering.
    pub fn new(pattern: Option<&str>) -> Result<Self> {
        let matcher = match pattern.filter(|p| !p.is_empty()) {
            Some(p) => Some(
                Glob::new(p)
                    .map_err(|e| GhrelError::Config(format!("invalid pattern {:?}: {}", p, e)))?
                    .compile_matcher(),
            ),
            None => None,
        };
        Ok(Self { matcher })
    }

    /// True if `asset` should be downloaded.
    pub fn wants(&self, asset: &Asset) -> bool {
        if asset.is_manifest {
            return true;
        }
        match &self.matcher {
            Some(m) => m.is_match(&asset.name),
            None => true,
        }
    }
}

/// Number of (payload, manifest) assets.
pub fn count(assets: &[Asset]) -> (usize, usize) {
    assets.iter().fold((0, 0), |(files, manifests), a| {
        if a.is_manifest {
            (files, manifests + 1)
        } else {
            (files + 1, manifests)
        }
    })
}
