//! Content fingerprint arithmetic: pure digest combination and comparison.
//!
//! A fingerprint is the SHA-256 of `"path:digest\n"` records, one per
//! build-relevant file, sorted by path. Enumeration order never matters.

use sha2::{Digest, Sha256};

/// Digest of a single build-relevant file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDigest {
    /// Path relative to the source root, `/`-separated.
    pub path: String,
    /// Lowercase hex SHA-256 of the file contents.
    pub digest: String,
}

/// Relation between the freshly computed fingerprint and the stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Match,
    Differs,
    NoHistory,
}

/// Combine per-file digests into one fingerprint.
///
/// Returns `None` for an empty file set: an empty set never yields a valid
/// fingerprint.
#[must_use]
pub fn combine(files: &[FileDigest]) -> Option<String> {
    if files.is_empty() {
        return None;
    }
    let mut sorted: Vec<&FileDigest> = files.iter().collect();
    sorted.sort_by(|a, b| a.path.cmp(&b.path));

    let mut hasher = Sha256::new();
    for f in sorted {
        hasher.update(f.path.as_bytes());
        hasher.update(b":");
        hasher.update(f.digest.as_bytes());
        hasher.update(b"\n");
    }
    Some(hex_encode(&hasher.finalize()))
}

/// Compare a computed fingerprint with the stored record, byte for byte.
///
/// Surrounding whitespace in the stored record (a trailing newline written
/// by an editor, for instance) is ignored.
#[must_use]
pub fn compare(current: &str, stored: Option<&str>) -> Comparison {
    match stored.map(str::trim) {
        None | Some("") => Comparison::NoHistory,
        Some(s) if s.as_bytes() == current.as_bytes() => Comparison::Match,
        Some(_) => Comparison::Differs,
    }
}

/// Whether a file under the source directory belongs in the fingerprint.
///
/// Interpreter caches and OS metadata files change without the sources
/// changing, so they are left out.
#[must_use]
pub fn is_build_relevant(path: &str) -> bool {
    let mut segments = path.split('/');
    let file_name = path.rsplit('/').next().unwrap_or(path);
    !segments.any(|s| s == "__pycache__" || s == ".pytest_cache")
        && !file_name.ends_with(".pyc")
        && file_name != ".DS_Store"
}

/// SHA-256 of `bytes` as lowercase hex.
#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex_encode(&Sha256::digest(bytes))
}

/// Encode bytes as a lowercase hex string.
#[must_use]
pub fn hex_encode(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for &b in bytes {
        out.push(char::from(HEX[(b >> 4) as usize]));
        out.push(char::from(HEX[(b & 0xf) as usize]));
    }
    out
}
