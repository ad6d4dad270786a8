//! Matches downloaded payload files to their expected checksums.

use std::collections::HashMap;
use std::fmt;

use crate::digest;
use crate::fetch::{FetchOutcome, FetchReport};
use crate::manifest::ManifestEntry;

/// Verdict for one payload asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationStatus {
    Verified,
    Mismatched,
    NoChecksumFound,
    DownloadFailed,
    ComputeFailed,
}

impl VerificationStatus {
    /// Short reason printed next to unresolved files.
    pub fn reason(&self) -> &'static str {
        match self {
            VerificationStatus::Verified => "verified",
            VerificationStatus::Mismatched => "bad checksum",
            VerificationStatus::NoChecksumFound => "no checksum",
            VerificationStatus::DownloadFailed => "download failed",
            VerificationStatus::ComputeFailed => "not verified",
        }
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationResult {
    pub filename: String,
    pub status: VerificationStatus,
    /// Error text for DownloadFailed / ComputeFailed.
    pub detail: Option<String>,
}

/// Manifest entries keyed by filename. The first entry seen for a filename
/// wins.
#[derive(Debug, Default)]
pub struct ChecksumIndex<'a> {
    by_name: HashMap<&'a str, &'a ManifestEntry>,
}

impl<'a> ChecksumIndex<'a> {
    pub fn new(entries: &'a [ManifestEntry]) -> Self {
        let mut by_name = HashMap::with_capacity(entries.len());
        for e in entries {
            by_name.entry(e.filename.as_str()).or_insert(e);
        }
        Self { by_name }
    }

    pub fn get(&self, filename: &str) -> Option<&'a ManifestEntry> {
        self.by_name.get(filename).copied()
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// One verdict per payload asset in `report`, in report order. Manifest
/// assets get none; entries for files that were not requested are ignored.
pub fn verify(report: &FetchReport, entries: &[ManifestEntry]) -> Vec<VerificationResult> {
    let index = ChecksumIndex::new(entries);
    report.payloads().map(|o| verify_one(o, &index)).collect()
}

fn verify_one(outcome: &FetchOutcome, index: &ChecksumIndex<'_>) -> VerificationResult {
    let filename = outcome.asset.name.clone();
    if let Err(e) = &outcome.result {
        return VerificationResult {
            filename,
            status: VerificationStatus::DownloadFailed,
            detail: Some(e.to_string()),
        };
    }

    let actual = match digest::sha256_path_bytes(&outcome.path) {
        Ok(d) => d,
        Err(e) => {
            tracing::warn!(file = %filename, "cannot compute digest: {}", e);
            return VerificationResult {
                filename,
                status: VerificationStatus::ComputeFailed,
                detail: Some(e.to_string()),
            };
        }
    };

    let status = match index.get(&filename) {
        None => VerificationStatus::NoChecksumFound,
        Some(entry) if entry.checksum.as_slice() == actual.as_slice() => {
            VerificationStatus::Verified
        }
        Some(entry) => {
            tracing::warn!(
                file = %filename,
                expected = %entry.checksum_hex,
                actual = %hex::encode(actual),
                "checksum mismatch"
            );
            VerificationStatus::Mismatched
        }
    };
    tracing::debug!(file = %filename, %status, "verified");
    VerificationResult {
        filename,
        status,
        detail: None,
    }
}
