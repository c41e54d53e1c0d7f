//! Normalization from [`RawRecord`] to the fixed [`NormalizedRecord`] schema.

use mapy_core::SOURCE_SITE;
use serde_json::Value;

use crate::types::{Coordinates, NormalizedRecord, RawRecord};

/// Normalizes a raw record.
///
/// Every string field is trimmed and empty strings become `None`.
/// Coordinates survive only when both axes are finite. `source` falls back
/// to [`SOURCE_SITE`]. Normalizing an already normalized record (via
/// `RawRecord::from`) returns it unchanged.
#[must_use]
pub fn normalize(raw: RawRecord) -> NormalizedRecord {
    NormalizedRecord {
        name: trimmed(raw.name),
        address: trimmed(raw.address),
        phone: trimmed(raw.phone),
        email: trimmed(raw.email),
        website: trimmed(raw.website),
        opening_hours: trimmed(raw.opening_hours),
        coordinates: raw
            .coordinates
            .and_then(|c| Coordinates::new(c.lat, c.lng)),
        category: trimmed(raw.category),
        url: trimmed(raw.url),
        source: trimmed(raw.source).unwrap_or_else(|| SOURCE_SITE.to_string()),
        raw_job: raw.raw_job,
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    let value = value?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else if trimmed.len() == value.len() {
        Some(value)
    } else {
        Some(trimmed.to_string())
    }
}

/// Interprets a JSON value as a coordinate pair.
///
/// Accepts `{"lat": .., "lng": ..}` objects and two-element `[lat, lng]`
/// arrays whose components are numbers or numeric strings. Returns `None`
/// for anything else, including non-finite values.
#[must_use]
pub fn accept_coordinates(value: &Value) -> Option<Coordinates> {
    let (lat, lng) = match value {
        Value::Object(map) => (map.get("lat")?, map.get("lng")?),
        Value::Array(items) => match items.as_slice() {
            [lat, lng] => (lat, lng),
            _ => return None,
        },
        _ => return None,
    };
    Coordinates::new(as_degree(lat)?, as_degree(lng)?)
}

fn as_degree(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
