//! Checksum manifest parsing.
//!
//! A manifest line is either `<hex>  <filename>` (sha256sum output) or a lone
//! `<hex>` in a single-file manifest. Example:
//!
//! ```text
//! ba47c83b6038dda089dd1410b9e97d1de7e4adea7620c856f9b74a782048e272  checkip_0.45.1_linux_amd64.tar.gz
//! ```

use std::fs;
use std::path::Path;

use crate::classify::{self, ManifestKind};
use crate::error::{GhrelError, Result};

/// One parsed manifest line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// Expected checksum, lower-case hex.
    pub checksum_hex: String,
    /// Expected checksum, decoded.
    pub checksum: Vec<u8>,
    /// File the checksum belongs to.
    pub filename: String,
}

/// Parse the manifest file at `path`. Its file name decides how lines
/// without a filename field are treated.
pub fn parse_manifest(path: &Path) -> Result<Vec<ManifestEntry>> {
    let text = fs::read(path).map_err(|e| GhrelError::io(path, e))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    parse_manifest_str(&String::from_utf8_lossy(&text), &name)
}

/// Parse manifest text. `manifest_name` is the manifest's own file name.
///
/// Lines with a field count other than one or two are skipped; a one-field
/// line is only usable in a single-file manifest. An undecodable checksum
/// fails the whole manifest, as does a manifest without usable lines.
pub fn parse_manifest_str(text: &str, manifest_name: &str) -> Result<Vec<ManifestEntry>> {
    let single_target = match classify::manifest_kind(manifest_name) {
        Some(ManifestKind::SingleFile) => classify::single_file_target(manifest_name),
        _ => None,
    };

    let mut entries = Vec::new();
    for (idx, line) in text.split('\n').enumerate() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let (hex_field, filename) = match fields.as_slice() {
            [sum, file] => (*sum, strip_binary_marker(file)),
            [sum] => match single_target {
                Some(target) => (*sum, target),
                None => continue,
            },
            _ => continue,
        };

        let checksum = hex::decode(hex_field).map_err(|e| {
            GhrelError::format(
                manifest_name,
                format!("line {}: invalid checksum {:?}: {}", idx + 1, hex_field, e),
            )
        })?;
        entries.push(ManifestEntry {
            checksum_hex: hex::encode(&checksum),
            checksum,
            filename: filename.to_string(),
        });
    }

    if entries.is_empty() {
        return Err(GhrelError::format(manifest_name, "no checksum lines found"));
    }
    Ok(entries)
}

/// sha256sum writes `*name` for files hashed in binary mode.
fn strip_binary_marker(filename: &str) -> &str {
    match filename.strip_prefix('*') {
        Some(rest) if !rest.is_empty() => rest,
        _ => filename,
    }
}
