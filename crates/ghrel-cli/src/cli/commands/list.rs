//! `ghrel list <owner>/<repo>` – show the assets of the latest release.

use anyhow::{Context, Result};
use ghrel_core::asset::{self, Asset, AssetFilter};
use ghrel_core::config::GhrelConfig;
use ghrel_core::pipeline;

pub async fn run_list(cfg: &GhrelConfig, repo: &str, pattern: Option<&str>) -> Result<()> {
    let filter = AssetFilter::new(pattern)?;
    let assets: Vec<Asset> = pipeline::latest_assets(cfg, repo)
        .await
        .with_context(|| format!("latest release of {}", repo))?
        .into_iter()
        .filter(|a| filter.wants(a))
        .collect();

    if assets.is_empty() {
        println!("No assets in latest release.");
        return Ok(());
    }
    print!("{}", format_table(&assets));
    let (files, manifests) = asset::count(&assets);
    println!("{} file(s), {} checksums file(s)", files, manifests);
    Ok(())
}

/// Asset table: name, whether it is a checksums file, update date, size, downloads.
pub(crate) fn format_table(assets: &[Asset]) -> String {
    let name_width = assets
        .iter()
        .map(|a| a.name.len())
        .chain(std::iter::once("Asset".len()))
        .max()
        .unwrap_or(5);

    let mut out = String::new();
    let mut row = |cols: [&str; 5]| {
        out.push_str(&format!(
            "{:<nw$}  {:<14}  {:<10}  {:>10}  {:>14}\n",
            cols[0],
            cols[1],
            cols[2],
            cols[3],
            cols[4],
            nw = name_width
        ));
    };
    row(["Asset", "Checksums file", "Updated", "Size", "Download count"]);
    row(["-----", "--------------", "-------", "----", "--------------"]);
    for a in assets {
        row([
            &a.name,
            if a.is_manifest { "true" } else { "false" },
            &a.updated_at.format("%Y-%m-%d").to_string(),
            &a.size.to_string(),
            &a.download_count.to_string(),
        ]);
    }
    out
}
