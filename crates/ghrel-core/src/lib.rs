//! Fetch the latest GitHub release of a repository, download its assets
//! concurrently and verify them against the checksum files shipped with the
//! release.

pub mod config;
pub mod error;
pub mod logging;

pub mod asset;
pub mod classify;
pub mod digest;
pub mod fetch;
pub mod manifest;
pub mod pipeline;
pub mod release;
pub mod retry;
pub mod verify;

pub use asset::{Asset, AssetFilter, Release};
pub use error::GhrelError;
pub use pipeline::RunSummary;
pub use verify::{VerificationResult, VerificationStatus};
