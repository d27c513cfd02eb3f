//! Filename generation and collision handling.
//!
//! Generated names are sanitized to path-safe components and length-capped;
//! when a generated name is unusable the caller falls back to a cleaned-up
//! original stem (with trailing date-like suffixes stripped) or a themed
//! default. Sibling collisions resolve with `_1`, `_2`, … before the
//! extension.

use loreweave_core::category::sanitize_component;
use loreweave_core::store::DocumentStore;

/// Names shorter than this (after sanitization) are considered failed
/// generations and trigger the caller's fallback.
pub(crate) const MIN_NAME_CHARS: usize = 2;

/// Sanitize an oracle-proposed name and cap its character length.
pub(crate) fn sanitize_filename(raw: &str, max_chars: usize) -> String {
    let cleaned = sanitize_component(raw);
    match cleaned.char_indices().nth(max_chars) {
        Some((idx, _)) => cleaned[..idx].trim_matches('_').to_string(),
        None => cleaned,
    }
}

/// Whether a sanitized name is long enough to use.
pub(crate) fn usable(name: &str) -> bool {
    name.chars().count() >= MIN_NAME_CHARS
}

/// Strip a trailing date-like suffix (`_YYYYMMDD` or `_YYYYMMDD_N`) from a
/// file stem, as left behind by timestamped ingestion names.
pub(crate) fn strip_date_suffix(stem: &str) -> &str {
    let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());

    // ..._YYYYMMDD_N
    if let Some((rest, last)) = stem.rsplit_once('_') {
        if digits(last) {
            if let Some((head, date)) = rest.rsplit_once('_') {
                if date.len() == 8 && digits(date) && !head.is_empty() {
                    return head;
                }
            }
            // ..._YYYYMMDD
            if last.len() == 8 && !rest.is_empty() {
                return rest;
            }
        }
    }
    stem
}

/// Find a sibling-unique relative path for `base.ext` in `dir`, appending
/// an incrementing numeric suffix before the extension on collision.
pub(crate) async fn unique_path(
    store: &dyn DocumentStore,
    dir: &str,
    base: &str,
    ext: &str,
) -> String {
    let join = |name: &str| {
        if dir.is_empty() {
            name.to_string()
        } else {
            format!("{dir}/{name}")
        }
    };

    let candidate = join(&format!("{base}.{ext}"));
    if !store.exists(&candidate).await {
        return candidate;
    }
    let mut counter = 1;
    loop {
        let candidate = join(&format!("{base}_{counter}.{ext}"));
        if !store.exists(&candidate).await {
            return candidate;
        }
        counter += 1;
    }
}
