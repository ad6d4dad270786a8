//! End-to-end run: metadata → fetch → parse manifests → verify.

use std::path::Path;
use std::sync::Arc;

use crate::asset::{Asset, AssetFilter};
use crate::config::GhrelConfig;
use crate::error::{GhrelError, Result};
use crate::fetch::{self, CurlTransport, FetchReport, Transport};
use crate::manifest::{self, ManifestEntry};
use crate::release;
use crate::verify::{self, VerificationResult, VerificationStatus};

/// A manifest that downloaded but contributed no entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestFailure {
    pub manifest: String,
    pub reason: String,
}

/// Counters and verdicts of one run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Payload assets requested (after the name filter).
    pub requested: usize,
    /// Payload assets downloaded.
    pub downloaded: usize,
    /// Manifest assets downloaded.
    pub manifests_downloaded: usize,
    /// Payload assets whose checksum matched.
    pub verified: usize,
    /// One verdict per requested payload asset.
    pub results: Vec<VerificationResult>,
    pub manifest_failures: Vec<ManifestFailure>,
}

impl RunSummary {
    /// True when every requested payload downloaded and verified.
    pub fn all_verified(&self) -> bool {
        self.results
            .iter()
            .all(|r| r.status == VerificationStatus::Verified)
    }

    /// `downloaded 5 (+ 1 manifest file)`
    pub fn downloaded_line(&self) -> String {
        let noun = if self.manifests_downloaded == 1 {
            "manifest file"
        } else {
            "manifest files"
        };
        format!(
            "downloaded {} (+ {} {})",
            self.downloaded, self.manifests_downloaded, noun
        )
    }

    /// `verified 4`
    pub fn verified_line(&self) -> String {
        format!("verified {}", self.verified)
    }

    /// One line per payload that did not verify: `<file>: <reason>`.
    pub fn diagnostics(&self) -> Vec<String> {
        self.results
            .iter()
            .filter(|r| r.status != VerificationStatus::Verified)
            .map(|r| match &r.detail {
                Some(d) => format!("{}: {} ({})", r.filename, r.status, d),
                None => format!("{}: {}", r.filename, r.status),
            })
            .collect()
    }
}

/// Parse every downloaded manifest in `report`, in order. A malformed
/// manifest is logged and skipped.
pub fn collect_manifest_entries(report: &FetchReport) -> (Vec<ManifestEntry>, Vec<ManifestFailure>) {
    let mut entries = Vec::new();
    let mut failures = Vec::new();
    for outcome in report.manifests().filter(|o| o.is_ok()) {
        match manifest::parse_manifest(&outcome.path) {
            Ok(mut parsed) => {
                tracing::debug!(manifest = %outcome.asset.name, entries = parsed.len(), "parsed manifest");
                entries.append(&mut parsed);
            }
            Err(e) => {
                tracing::warn!(manifest = %outcome.asset.name, "skipping manifest: {}", e);
                failures.push(ManifestFailure {
                    manifest: outcome.asset.name.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }
    (entries, failures)
}

/// Verify the files of a finished fetch. Runs sequentially over local files.
pub fn verify_downloads(report: &FetchReport) -> RunSummary {
    let (entries, manifest_failures) = collect_manifest_entries(report);
    let results = verify::verify(report, &entries);
    let verified = results
        .iter()
        .filter(|r| r.status == VerificationStatus::Verified)
        .count();
    RunSummary {
        requested: report.requested(),
        downloaded: report.downloaded(),
        manifests_downloaded: report.manifests_downloaded(),
        verified,
        results,
        manifest_failures,
    }
}

/// Download what `filter` wants from `assets` into `dir` and verify it.
pub async fn download_and_verify(
    assets: &[Asset],
    filter: &AssetFilter,
    dir: &Path,
    transport: Arc<dyn Transport>,
) -> RunSummary {
    let report = fetch::fetch_all(assets, filter, dir, transport).await;
    // Hashing is blocking I/O; keep it off the async workers.
    match tokio::task::spawn_blocking(move || verify_downloads(&report)).await {
        Ok(summary) => summary,
        Err(e) => {
            tracing::error!("verification task failed: {}", e);
            RunSummary::default()
        }
    }
}

/// Full run against the hosting API: only the metadata lookup is fatal.
pub async fn run(
    cfg: &GhrelConfig,
    repo: &str,
    pattern: Option<&str>,
    dir: &Path,
) -> Result<RunSummary> {
    let filter = AssetFilter::new(pattern)?;
    let assets = latest_assets(cfg, repo).await?;
    let transport: Arc<dyn Transport> = Arc::new(CurlTransport::from_config(cfg));
    Ok(download_and_verify(&assets, &filter, dir, transport).await)
}

/// Assets of the latest release, classified.
pub async fn latest_assets(cfg: &GhrelConfig, repo: &str) -> Result<Vec<Asset>> {
    let cfg = cfg.clone();
    let repo = repo.to_string();
    let release = tokio::task::spawn_blocking(move || release::fetch_latest_release(&cfg, &repo))
        .await
        .map_err(|e| GhrelError::Config(format!("metadata task failed: {}", e)))??;
    Ok(release.assets)
}
