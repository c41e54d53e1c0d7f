//! Removal of duplicate records across jobs.

use std::collections::HashSet;

use crate::types::NormalizedRecord;

/// Identity of a record for deduplication.
///
/// Records with a url are identified by it (case-insensitive, trimmed);
/// others by their name and address.
#[must_use]
pub fn dedupe_key(record: &NormalizedRecord) -> String {
    let url = folded(record.url.as_deref());
    if !url.is_empty() {
        return format!("url:{url}");
    }
    let name = folded(record.name.as_deref());
    let address = folded(record.address.as_deref());
    format!("nameaddr:{name}|{address}")
}

fn folded(value: Option<&str>) -> String {
    value.unwrap_or_default().trim().to_lowercase()
}

/// Keeps the first record for each [`dedupe_key`], preserving input order.
#[must_use]
pub fn dedupe(records: Vec<NormalizedRecord>) -> Vec<NormalizedRecord> {
    let mut seen = HashSet::with_capacity(records.len());
    records
        .into_iter()
        .filter(|record| seen.insert(dedupe_key(record)))
        .collect()
}
