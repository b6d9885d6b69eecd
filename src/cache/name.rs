//! Template naming scheme
//!
//! Cache templates are named `{prefix}-{YYYYmmddHHMM}-{fingerprint}`. The
//! timestamp is UTC at minute precision and records when the fingerprint was
//! last used for that prefix, so lexicographic order within a prefix is
//! most-recently-used order. Names are capped at 63 characters (the server's
//! identifier limit); only the fingerprint portion is ever truncated.

use crate::error::{DbseedError, DbseedResult};
use chrono::{DateTime, NaiveDateTime, Utc};

/// Maximum length of a database name on the server
pub const MAX_NAME_LEN: usize = 63;

/// Width of the encoded timestamp (`%Y%m%d%H%M`)
pub const TIMESTAMP_LEN: usize = 12;

/// Hex length of a full SHA-256 fingerprint
pub const FINGERPRINT_LEN: usize = 64;

/// Fingerprint sentinel that sorts after every real hex digest.
///
/// Used as the fingerprint part of the age-trim cutoff name so the
/// comparison depends on the timestamp alone.
pub const MAX_FINGERPRINT: &str =
    "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff";

const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M";

/// Validate a cache prefix: 1-8 characters, letter first, then
/// alphanumerics or '-'.
pub fn check_prefix(prefix: &str) -> DbseedResult<()> {
    let mut chars = prefix.chars();
    let valid = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            prefix.len() <= 8 && chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(DbseedError::InvalidCachePrefix(prefix.to_string()))
    }
}

/// Validate a database name: letter first, then alphanumerics or '-'.
pub fn check_database_name(name: &str) -> DbseedResult<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(DbseedError::InvalidDatabaseName(name.to_string()))
    }
}

/// Build a template name or SQL-LIKE search pattern.
///
/// Omitted segments are rendered as `_` wildcard runs of the segment's fixed
/// width, which match exactly one character each under LIKE. The result is
/// truncated to [`MAX_NAME_LEN`]; since `prefix + '-' + timestamp + '-'` is at
/// most 22 characters, truncation only ever shortens the fingerprint part.
pub fn pattern(
    prefix: &str,
    timestamp: Option<DateTime<Utc>>,
    fingerprint: Option<&str>,
) -> String {
    let ts_part = match timestamp {
        Some(ts) => ts.format(TIMESTAMP_FORMAT).to_string(),
        None => "_".repeat(TIMESTAMP_LEN),
    };
    let fp_part = match fingerprint {
        Some(fp) => fp.to_string(),
        None => "_".repeat(FINGERPRINT_LEN),
    };
    let mut name = format!("{prefix}-{ts_part}-{fp_part}");
    name.truncate(MAX_NAME_LEN);
    name
}

/// Build the name for a template touched right now.
pub fn template_name(prefix: &str, now: DateTime<Utc>, fingerprint: &str) -> String {
    pattern(prefix, Some(now), Some(fingerprint))
}

/// A template name split back into its parts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedName {
    /// Cache prefix
    pub prefix: String,
    /// Last-touched timestamp (UTC, minute precision)
    pub timestamp: DateTime<Utc>,
    /// Fingerprint hex, possibly truncated by the name budget
    pub fingerprint: String,
}

/// Decode a template name back into prefix, timestamp, and fingerprint.
///
/// The prefix may itself contain '-', so the split point is found by scanning
/// for the fixed-width all-digit timestamp segment; the prefix cap of 8
/// characters keeps this unambiguous.
pub fn decode(name: &str) -> Option<DecodedName> {
    let bytes = name.as_bytes();
    for split in 1..=8.min(bytes.len().saturating_sub(TIMESTAMP_LEN + 2)) {
        if bytes[split] != b'-' || bytes[split + TIMESTAMP_LEN + 1] != b'-' {
            continue;
        }
        let ts_str = &name[split + 1..split + 1 + TIMESTAMP_LEN];
        if !ts_str.bytes().all(|b| b.is_ascii_digit()) {
            continue;
        }
        let naive = NaiveDateTime::parse_from_str(ts_str, TIMESTAMP_FORMAT).ok()?;
        return Some(DecodedName {
            prefix: name[..split].to_string(),
            timestamp: naive.and_utc(),
            fingerprint: name[split + TIMESTAMP_LEN + 2..].to_string(),
        });
    }
    None
}
