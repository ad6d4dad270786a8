//! Latest-release lookup against the GitHub REST API.

use url::Url;

use crate::asset::Release;
use crate::config::GhrelConfig;
use crate::error::{GhrelError, Result};
use crate::fetch::CurlTransport;

/// Validate `<owner>/<repo>` and return its two parts.
pub fn parse_repo(repo: &str) -> Result<(&str, &str)> {
    let invalid = || GhrelError::Config(format!("supply github <owner>/<repo>, got {:?}", repo));
    let (owner, name) = repo.split_once('/').ok_or_else(invalid)?;
    let ok = |s: &str| {
        !s.is_empty()
            && s != "."
            && s != ".."
            && s.chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    };
    if !ok(owner) || !ok(name) {
        return Err(invalid());
    }
    Ok((owner, name))
}

/// `<api_base_url>/repos/<owner>/<repo>/releases/latest`.
pub fn latest_release_url(api_base_url: &str, repo: &str) -> Result<Url> {
    let (owner, name) = parse_repo(repo)?;
    let mut url = Url::parse(api_base_url)
        .map_err(|e| GhrelError::Config(format!("invalid API URL {:?}: {}", api_base_url, e)))?;
    url.path_segments_mut()
        .map_err(|_| GhrelError::Config(format!("API URL {:?} cannot be a base", api_base_url)))?
        .pop_if_empty()
        .extend(["repos", owner, name, "releases", "latest"]);
    Ok(url)
}

/// Fetch the latest release of `repo` and classify its assets.
///
/// Blocking; call from `spawn_blocking` when on an async runtime. Any failure
/// here is fatal to the run.
pub fn fetch_latest_release(cfg: &GhrelConfig, repo: &str) -> Result<Release> {
    let url = latest_release_url(&cfg.api_base_url, repo)?;
    tracing::info!("fetching release metadata from {}", url);

    let body = CurlTransport::from_config(cfg)
        .get_bytes(
            url.as_str(),
            &[
                "Accept: application/vnd.github+json",
                "X-GitHub-Api-Version: 2022-11-28",
            ],
        )
        .map_err(|source| GhrelError::Network {
            context: format!("getting {}", url),
            source,
        })?;

    let release = Release::from_json(&body)?;
    tracing::debug!(
        tag = release.tag_name.as_deref().unwrap_or("-"),
        assets = release.assets.len(),
        "release metadata decoded"
    );
    Ok(release)
}
