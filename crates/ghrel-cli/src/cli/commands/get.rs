//! `ghrel get <owner>/<repo>` – download the latest release and verify it.

use anyhow::{Context, Result};
use ghrel_core::config::GhrelConfig;
use ghrel_core::pipeline;
use std::path::Path;

pub async fn run_get(
    cfg: &GhrelConfig,
    repo: &str,
    pattern: Option<&str>,
    dir: &Path,
) -> Result<()> {
    let summary = pipeline::run(cfg, repo, pattern, dir)
        .await
        .with_context(|| format!("latest release of {}", repo))?;

    for failure in &summary.manifest_failures {
        eprintln!("ghrel: {}", failure.reason);
    }
    println!("{}", summary.downloaded_line());
    println!("{}", summary.verified_line());
    for line in summary.diagnostics() {
        eprintln!("ghrel: {}", line);
    }

    tracing::info!(
        requested = summary.requested,
        downloaded = summary.downloaded,
        verified = summary.verified,
        all_verified = summary.all_verified(),
        "run finished"
    );
    Ok(())
}
