//! CLI for ghrel.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use ghrel_core::config;
use std::path::{Path, PathBuf};

use commands::{run_checksum, run_get, run_list};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "ghrel", version)]
#[command(about = "Download the latest GitHub release assets and verify their checksums", long_about = None)]
pub struct Cli {
    /// GitHub API base URL (overrides `api_base_url` in config.toml).
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download the latest release of <owner>/<repo> and verify checksums.
    Get {
        /// GitHub repository as <owner>/<repo>.
        repo: String,
        /// Only download assets whose name matches this shell pattern.
        /// Checksum files are always downloaded.
        #[arg(short, long)]
        pattern: Option<String>,
        /// Directory to download into (default: current directory).
        #[arg(short = 'd', long)]
        download_dir: Option<PathBuf>,
    },

    /// List assets of the latest release without downloading them.
    List {
        /// GitHub repository as <owner>/<repo>.
        repo: String,
        /// Only list assets whose name matches this shell pattern.
        #[arg(short, long)]
        pattern: Option<String>,
    },

    /// Compute SHA-256 of a local file.
    Checksum {
        /// Path to the file.
        path: String,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let mut cfg = config::load_or_init()?;
        if let Some(url) = cli.api_url {
            cfg = cfg.with_api_base_url(url);
        }
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Get {
                repo,
                pattern,
                download_dir,
            } => {
                let dir = match download_dir {
                    Some(d) => d,
                    None => std::env::current_dir()?,
                };
                run_get(&cfg, &repo, pattern.as_deref(), &dir).await?;
            }
            CliCommand::List { repo, pattern } => {
                run_list(&cfg, &repo, pattern.as_deref()).await?;
            }
            CliCommand::Checksum { path } => run_checksum(Path::new(&path))?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
