//! Concurrent download of release assets.
//!
//! Every eligible asset gets its own blocking task, all launched at once;
//! `fetch_all` returns only after every task has finished. A failed asset is
//! recorded against that asset alone and never cancels its siblings.

mod transport;

pub use transport::{CurlTransport, Transport};

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::task::JoinSet;

use crate::asset::{Asset, AssetFilter};
use crate::error::{GhrelError, Result};
use crate::retry::TransferError;

/// Result of downloading one asset.
#[derive(Debug)]
pub struct FetchOutcome {
    pub asset: Asset,
    /// Local file the asset was (or would have been) written to.
    pub path: PathBuf,
    /// Bytes written, or why the download failed.
    pub result: Result<u64>,
}

impl FetchOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Outcomes of one `fetch_all`, in the order the assets were listed.
#[derive(Debug, Default)]
pub struct FetchReport {
    pub outcomes: Vec<FetchOutcome>,
}

impl FetchReport {
    /// Outcomes for payload (non-manifest) assets.
    pub fn payloads(&self) -> impl Iterator<Item = &FetchOutcome> {
        self.outcomes.iter().filter(|o| !o.asset.is_manifest)
    }

    /// Outcomes for manifest assets.
    pub fn manifests(&self) -> impl Iterator<Item = &FetchOutcome> {
        self.outcomes.iter().filter(|o| o.asset.is_manifest)
    }

    /// Payload assets that were requested.
    pub fn requested(&self) -> usize {
        self.payloads().count()
    }

    /// Payload assets that downloaded successfully.
    pub fn downloaded(&self) -> usize {
        self.payloads().filter(|o| o.is_ok()).count()
    }

    /// Manifest assets that downloaded successfully.
    pub fn manifests_downloaded(&self) -> usize {
        self.manifests().filter(|o| o.is_ok()).count()
    }

    /// Outcomes that failed, payload or manifest.
    pub fn failures(&self) -> impl Iterator<Item = &FetchOutcome> {
        self.outcomes.iter().filter(|o| !o.is_ok())
    }
}

/// Download every asset `filter` wants into `dir`, one task per asset.
///
/// Manifests are always downloaded; payloads only when they pass the filter.
pub async fn fetch_all(
    assets: &[Asset],
    filter: &AssetFilter,
    dir: &Path,
    transport: Arc<dyn Transport>,
) -> FetchReport {
    let wanted: Vec<Asset> = assets.iter().filter(|a| filter.wants(a)).cloned().collect();
    tracing::info!(
        total = assets.len(),
        wanted = wanted.len(),
        "downloading release assets into {}",
        dir.display()
    );

    let accumulator: Arc<Mutex<Vec<(usize, FetchOutcome)>>> =
        Arc::new(Mutex::new(Vec::with_capacity(wanted.len())));
    let mut join_set = JoinSet::new();

    for (index, asset) in wanted.iter().cloned().enumerate() {
        let accumulator = Arc::clone(&accumulator);
        let transport = Arc::clone(&transport);
        let dir = dir.to_path_buf();
        join_set.spawn_blocking(move || {
            let outcome = fetch_one(transport.as_ref(), asset, &dir);
            accumulator
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push((index, outcome));
        });
    }

    while let Some(joined) = join_set.join_next().await {
        if let Err(e) = joined {
            tracing::error!("download task did not finish: {}", e);
        }
    }

    let mut collected =
        std::mem::take(&mut *accumulator.lock().unwrap_or_else(PoisonError::into_inner));

    // A task that died before publishing still owes its asset an outcome.
    let mut seen = vec![false; wanted.len()];
    for (index, _) in &collected {
        seen[*index] = true;
    }
    for (index, asset) in wanted.into_iter().enumerate() {
        if !seen[index] {
            let path = dir.join(&asset.name);
            let result = Err(GhrelError::io(
                &path,
                io::Error::new(io::ErrorKind::Other, "download task aborted"),
            ));
            collected.push((index, FetchOutcome { asset, path, result }));
        }
    }

    collected.sort_by_key(|(index, _)| *index);
    FetchReport {
        outcomes: collected.into_iter().map(|(_, o)| o).collect(),
    }
}

/// Create/truncate the local file and stream the asset into it. A failed
/// download leaves no file behind.
fn fetch_one(transport: &dyn Transport, asset: Asset, dir: &Path) -> FetchOutcome {
    let path = dir.join(&asset.name);
    let result = download_to(transport, &asset, &path);
    match &result {
        Ok(bytes) => tracing::debug!(asset = %asset.name, bytes, "downloaded"),
        Err(e) => {
            tracing::warn!(asset = %asset.name, "download failed: {}", e);
            if path.is_file() && asset.local_file_name().is_some() {
                let _ = fs::remove_file(&path);
            }
        }
    }
    FetchOutcome {
        asset,
        path,
        result,
    }
}

fn download_to(transport: &dyn Transport, asset: &Asset, path: &Path) -> Result<u64> {
    if asset.local_file_name().is_none() {
        return Err(GhrelError::io(
            path,
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("asset name {:?} is not a plain file name", asset.name),
            ),
        ));
    }
    let mut file = File::create(path).map_err(|e| GhrelError::io(path, e))?;
    transport
        .fetch(&asset.download_url, &mut file)
        .map_err(|e| match e {
            TransferError::Storage(source) => GhrelError::io(path, source),
            source => GhrelError::Network {
                context: format!("GET {}", asset.download_url),
                source,
            },
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    /// Serves canned bodies by URL; unknown URLs fail with 404.
    struct MapTransport(HashMap<String, Vec<u8>>);

    impl Transport for MapTransport {
        fn fetch(&self, url: &str, sink: &mut File) -> std::result::Result<u64, TransferError> {
            let body = self.0.get(url).ok_or(TransferError::Http(404))?;
            sink.write_all(body).map_err(TransferError::Storage)?;
            Ok(body.len() as u64)
        }
    }

    struct PanickingTransport;

    impl Transport for PanickingTransport {
        fn fetch(&self, _url: &str, _sink: &mut File) -> std::result::Result<u64, TransferError> {
            panic!("transport blew up");
        }
    }

    fn url(name: &str) -> String {
        format!("https://example.com/download/{}", name)
    }

    fn release(names: &[&str]) -> (Vec<Asset>, MapTransport) {
        let assets = names.iter().map(|n| Asset::new(*n, url(n))).collect();
        let bodies = names
            .iter()
            .map(|n| (url(n), format!("body of {}", n).into_bytes()))
            .collect();
        (assets, MapTransport(bodies))
    }

    #[tokio::test]
    async fn downloads_everything_without_filter() {
        let dir = tempfile::tempdir().unwrap();
        let (assets, transport) = release(&["a.tar.gz", "b.zip", "checksums.txt"]);
        let report = fetch_all(&assets, &AssetFilter::all(), dir.path(), Arc::new(transport)).await;

        assert_eq!(report.outcomes.len(), 3);
        assert_eq!(report.requested(), 2);
        assert_eq!(report.downloaded(), 2);
        assert_eq!(report.manifests_downloaded(), 1);
        let names: Vec<_> = report.outcomes.iter().map(|o| o.asset.name.as_str()).collect();
        assert_eq!(names, ["a.tar.gz", "b.zip", "checksums.txt"]);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("b.zip")).unwrap(),
            "body of b.zip"
        );
    }

    #[tokio::test]
    async fn pattern_filters_payloads_but_not_manifests() {
        let dir = tempfile::tempdir().unwrap();
        let (assets, transport) = release(&[
            "tool_linux_amd64.tar.gz",
            "tool_darwin_arm64.tar.gz",
            "tool_checksums.txt",
        ]);
        let filter = AssetFilter::new(Some("*linux*")).unwrap();
        let report = fetch_all(&assets, &filter, dir.path(), Arc::new(transport)).await;

        assert_eq!(report.requested(), 1);
        assert_eq!(report.manifests_downloaded(), 1);
        assert!(dir.path().join("tool_linux_amd64.tar.gz").exists());
        assert!(!dir.path().join("tool_darwin_arm64.tar.gz").exists());
        assert!(dir.path().join("tool_checksums.txt").exists());
    }

    #[tokio::test]
    async fn one_failure_does_not_affect_siblings() {
        let dir = tempfile::tempdir().unwrap();
        let names: Vec<String> = (0..64).map(|i| format!("asset-{i:02}.bin")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let (assets, mut transport) = release(&refs);
        transport.0.remove(&url("asset-17.bin"));

        let report = fetch_all(&assets, &AssetFilter::all(), dir.path(), Arc::new(transport)).await;

        assert_eq!(report.outcomes.len(), 64);
        assert_eq!(report.downloaded(), 63);
        let failed: Vec<_> = report.failures().map(|o| o.asset.name.as_str()).collect();
        assert_eq!(failed, ["asset-17.bin"]);
        assert!(matches!(
            report.outcomes[17].result,
            Err(GhrelError::Network { .. })
        ));
        assert!(!dir.path().join("asset-17.bin").exists());
        let files = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(files, 63);
    }

    #[tokio::test]
    async fn unsafe_asset_name_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let (assets, transport) = release(&["../escape.bin", "ok.bin"]);
        let report = fetch_all(&assets, &AssetFilter::all(), dir.path(), Arc::new(transport)).await;

        assert!(matches!(report.outcomes[0].result, Err(GhrelError::Io { .. })));
        assert!(report.outcomes[1].is_ok());
        assert!(!dir.path().parent().unwrap().join("escape.bin").exists());
    }

    #[tokio::test]
    async fn panicking_task_still_gets_an_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let assets = vec![Asset::new("a.bin", url("a.bin")), Asset::new("b.bin", url("b.bin"))];
        let report =
            fetch_all(&assets, &AssetFilter::all(), dir.path(), Arc::new(PanickingTransport)).await;

        assert_eq!(report.outcomes.len(), 2);
        assert_eq!(report.downloaded(), 0);
        assert_eq!(report.outcomes[0].asset.name, "a.bin");
        assert_eq!(report.outcomes[1].asset.name, "b.bin");
    }

    #[tokio::test]
    async fn missing_download_dir_fails_every_asset() {
        let dir = tempfile::tempdir().unwrap();
        let gone = dir.path().join("does-not-exist");
        let (assets, transport) = release(&["a.bin", "checksums.txt"]);
        let report = fetch_all(&assets, &AssetFilter::all(), &gone, Arc::new(transport)).await;

        assert_eq!(report.failures().count(), 2);
        assert!(report
            .outcomes
            .iter()
            .all(|o| matches!(o.result, Err(GhrelError::Io { .. }))));
    }
}
