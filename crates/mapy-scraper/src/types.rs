//! Record types flowing through the extraction pipeline.
//!
//! [`RawRecord`] is what the page parser produces from one card or detail
//! page; fields may hold untrimmed or empty strings. [`NormalizedRecord`] is
//! the fixed output schema: strings are trimmed and non-empty or `None`, and
//! `source` is always set.

use mapy_core::Job;
use serde::{Deserialize, Deserializer, Serialize};

use crate::normalize::accept_coordinates;

/// A latitude/longitude pair in decimal degrees.
///
/// Both axes are always present together; a record never carries one axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    /// Builds a pair only when both axes are finite numbers.
    #[must_use]
    pub fn new(lat: f64, lng: f64) -> Option<Self> {
        (lat.is_finite() && lng.is_finite()).then_some(Self { lat, lng })
    }
}

/// Output of parsing a single listing card or detail page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawRecord {
    pub name: Option<String>,
    pub address: Option<String>,
    pub category: Option<String>,
    pub url: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub opening_hours: Option<String>,
    #[serde(deserialize_with = "lenient_coordinates")]
    pub coordinates: Option<Coordinates>,
    pub source: Option<String>,
    #[serde(deserialize_with = "lenient_job")]
    pub raw_job: Option<Job>,
}

impl RawRecord {
    /// Overlay `detail` on top of `self`: detail fields win where present,
    /// card fields fill the gaps.
    #[must_use]
    pub fn merged_with(self, detail: RawRecord) -> RawRecord {
        RawRecord {
            name: detail.name.or(self.name),
            address: detail.address.or(self.address),
            category: detail.category.or(self.category),
            url: detail.url.or(self.url),
            email: detail.email.or(self.email),
            phone: detail.phone.or(self.phone),
            website: detail.website.or(self.website),
            opening_hours: detail.opening_hours.or(self.opening_hours),
            coordinates: detail.coordinates.or(self.coordinates),
            source: detail.source.or(self.source),
            raw_job: detail.raw_job.or(self.raw_job),
        }
    }
}

/// Fixed-schema output record handed to exporters.
///
/// Serializes every field, writing `null` for absent values, so every JSON
/// object in a dataset has the same keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedRecord {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub opening_hours: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub category: Option<String>,
    pub url: Option<String>,
    pub source: String,
    pub raw_job: Option<Job>,
}

impl From<NormalizedRecord> for RawRecord {
    fn from(record: NormalizedRecord) -> Self {
        RawRecord {
            name: record.name,
            address: record.address,
            category: record.category,
            url: record.url,
            email: record.email,
            phone: record.phone,
            website: record.website,
            opening_hours: record.opening_hours,
            coordinates: record.coordinates,
            source: Some(record.source),
            raw_job: record.raw_job,
        }
    }
}

/// Coordinates in externally produced datasets come as `{lat, lng}` maps or
/// `[lat, lng]` pairs, sometimes with string components. Anything that does
/// not yield two finite numbers becomes `None` instead of a parse error.
fn lenient_coordinates<'de, D>(deserializer: D) -> Result<Option<Coordinates>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(accept_coordinates(&value))
}

fn lenient_job<'de, D>(deserializer: D) -> Result<Option<Job>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    Ok(serde_json::from_value(value).ok())
}
