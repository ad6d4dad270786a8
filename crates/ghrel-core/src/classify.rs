//! Tells checksum manifests apart from payload assets by file name.
//!
//! Rules are tried in order:
//! - a `checksum` token with an optional separator anywhere in the name
//!   (`ghrel_0.3.1_checksums.txt`, `CHECK-SUM`): a manifest listing many files;
//! - a `.sha256` suffix (`brave-1.47.27-linux-amd64.zip.sha256`): a manifest
//!   for exactly one file, the name without the suffix.

use once_cell::sync::Lazy;
use regex::Regex;

/// Suffix of a manifest that covers a single file.
pub const SINGLE_FILE_SUFFIX: &str = ".sha256";

/// What a manifest file covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestKind {
    /// Lists `<checksum> <filename>` for any number of files.
    Multi,
    /// Holds the checksum of the file named like the manifest minus its suffix.
    SingleFile,
}

struct Rule {
    pattern: Regex,
    kind: ManifestKind,
}

static RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        Rule {
            pattern: Regex::new(r"(?i)check.?sum").unwrap(),
            kind: ManifestKind::Multi,
        },
        Rule {
            pattern: Regex::new(r"(?i)\.sha256$").unwrap(),
            kind: ManifestKind::SingleFile,
        },
    ]
});

/// Kind of manifest `filename` denotes, or `None` for a payload asset.
pub fn manifest_kind(filename: &str) -> Option<ManifestKind> {
    RULES
        .iter()
        .find(|r| r.pattern.is_match(filename))
        .map(|r| r.kind)
}

/// True if `filename` looks like a file containing checksums.
pub fn is_manifest(filename: &str) -> bool {
    manifest_kind(filename).is_some()
}

/// For a single-file manifest, the name of the file it covers
/// (`app-1.0.tar.gz.sha256` → `app-1.0.tar.gz`).
pub fn single_file_target(manifest_name: &str) -> Option<&str> {
    let cut = manifest_name.len().checked_sub(SINGLE_FILE_SUFFIX.len())?;
    if !manifest_name.is_char_boundary(cut) {
        return None;
    }
    let (stem, suffix) = manifest_name.split_at(cut);
    if stem.is_empty() || !suffix.eq_ignore_ascii_case(SINGLE_FILE_SUFFIX) {
        return None;
    }
    Some(stem)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_token_variants() {
        for name in [
            "ghrel_0.3.1_checksums.txt",
            "checksum.txt",
            "CHECKSUMS",
            "tool-check-sum.txt",
            "Check_Sum",
            "CheckSum.sha512",
        ] {
            assert_eq!(manifest_kind(name), Some(ManifestKind::Multi), "{name}");
        }
    }

    #[test]
    fn single_file_suffix() {
        assert_eq!(
            manifest_kind("brave-browser-nightly-1.47.27-linux-amd64.zip.sha256"),
            Some(ManifestKind::SingleFile)
        );
        assert!(is_manifest("app.tar.gz.SHA256"));
    }

    #[test]
    fn checksum_token_wins_over_suffix() {
        assert_eq!(
            manifest_kind("checksums.txt.sha256"),
            Some(ManifestKind::Multi)
        );
    }

    #[test]
    fn payload_names_are_not_manifests() {
        for name in [
            "tool_1.0_linux_amd64.tar.gz",
            "checkip_0.45.1_darwin_arm64.tar.gz",
            "pandoc-2.18-1-amd64.deb",
            "sha256sum-like.tar.gz",
            "app.sha256.tar.gz",
            "",
        ] {
            assert!(!is_manifest(name), "{name}");
        }
    }

    #[test]
    fn single_file_target_strips_suffix() {
        assert_eq!(
            single_file_target("app-1.0.tar.gz.sha256"),
            Some("app-1.0.tar.gz")
        );
        assert_eq!(single_file_target("APP.ZIP.SHA256"), Some("APP.ZIP"));
        assert_eq!(single_file_target(".sha256"), None);
        assert_eq!(single_file_target("checksums.txt"), None);
    }
}
