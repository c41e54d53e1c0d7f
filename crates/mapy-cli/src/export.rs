//! Dataset writers: pretty JSON arrays and flat CSV tables.

use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::Context;
use clap::ValueEnum;
use mapy_scraper::NormalizedRecord;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Json,
    Csv,
}

impl OutputFormat {
    /// `Csv` for a `.csv` extension (any case), `Json` otherwise.
    pub(crate) fn for_path(path: &Path) -> Self {
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if is_csv {
            Self::Csv
        } else {
            Self::Json
        }
    }
}

/// Writes `records` to `path`, creating parent directories as needed.
///
/// Returns the format actually used.
pub(crate) fn write_dataset(
    records: &[NormalizedRecord],
    path: &Path,
    format: Option<OutputFormat>,
) -> anyhow::Result<OutputFormat> {
    let format = format.unwrap_or_else(|| OutputFormat::for_path(path));

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }

    let written = match format {
        OutputFormat::Json => export_json(records, path),
        OutputFormat::Csv => export_csv(records, path),
    };
    written.with_context(|| format!("failed to write dataset to {}", path.display()))?;

    Ok(format)
}

/// Pretty-printed JSON array; non-ASCII text is written as-is.
pub(crate) fn export_json(records: &[NormalizedRecord], path: &Path) -> anyhow::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, records)?;
    writer.flush()?;
    Ok(())
}

/// CSV with the sorted union of field names as header.
///
/// Absent values are empty cells; nested values are compact JSON. An empty
/// dataset produces an empty file.
pub(crate) fn export_csv(records: &[NormalizedRecord], path: &Path) -> anyhow::Result<()> {
    let rows = records
        .iter()
        .map(to_row)
        .collect::<anyhow::Result<Vec<_>>>()?;

    let mut writer = csv::Writer::from_path(path)?;
    if rows.is_empty() {
        writer.flush()?;
        return Ok(());
    }

    let header: BTreeSet<&str> = rows
        .iter()
        .flat_map(|row| row.keys().map(String::as_str))
        .collect();
    writer.write_record(&header)?;

    for row in &rows {
        writer.write_record(header.iter().map(|key| cell(row.get(*key))))?;
    }
    writer.flush()?;
    Ok(())
}

fn to_row(record: &NormalizedRecord) -> anyhow::Result<Map<String, Value>> {
    match serde_json::to_value(record)? {
        Value::Object(map) => Ok(map),
        other => anyhow::bail!("record serialized to non-object JSON: {other}"),
    }
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use mapy_core::Job;
    use mapy_scraper::Coordinates;

    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("mapy-cli-export-{}", std::process::id()))
            .join(name)
    }

    fn sample() -> NormalizedRecord {
        NormalizedRecord {
            name: Some("Café Sunrise".to_owned()),
            address: Some("Main St. 12, Prague".to_owned()),
            phone: Some("+420602123456".to_owned()),
            email: None,
            website: None,
            opening_hours: None,
            coordinates: Some(Coordinates {
                lat: 50.5,
                lng: 14.25,
            }),
            category: Some("Cafe".to_owned()),
            url: Some("https://mapy.com/place/1".to_owned()),
            source: "mapy.com".to_owned(),
            raw_job: Some(Job {
                query: Some("cafe".to_owned()),
                city: Some("Prague".to_owned()),
                ..Job::default()
            }),
        }
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(OutputFormat::for_path(Path::new("out.csv")), OutputFormat::Csv);
        assert_eq!(OutputFormat::for_path(Path::new("out.CSV")), OutputFormat::Csv);
        assert_eq!(OutputFormat::for_path(Path::new("out.json")), OutputFormat::Json);
        assert_eq!(OutputFormat::for_path(Path::new("out")), OutputFormat::Json);
    }

    #[test]
    fn json_is_pretty_and_keeps_unicode() {
        let path = temp_path("pretty.json");
        let used = write_dataset(&[sample()], &path, None).unwrap();
        assert_eq!(used, OutputFormat::Json);

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("Café Sunrise"));
        assert!(text.contains("\n  {"));
        assert!(text.contains("\"email\": null"));

        let parsed: Vec<NormalizedRecord> = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, vec![sample()]);
    }

    #[test]
    fn empty_json_dataset_is_empty_array() {
        let path = temp_path("empty.json");
        write_dataset(&[], &path, None).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
    }

    #[test]
    fn csv_has_sorted_header_and_flat_cells() {
        let path = temp_path("nested/dir/places.csv");
        let used = write_dataset(&[sample()], &path, None).unwrap();
        assert_eq!(used, OutputFormat::Csv);

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let header: Vec<String> = reader
            .headers()
            .unwrap()
            .iter()
            .map(str::to_owned)
            .collect();
        assert_eq!(
            header,
            vec![
                "address",
                "category",
                "coordinates",
                "email",
                "name",
                "openingHours",
                "phone",
                "rawJob",
                "source",
                "url",
                "website",
            ]
        );

        let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(&row[0], "Main St. 12, Prague");
        assert_eq!(&row[2], r#"{"lat":50.5,"lng":14.25}"#);
        assert_eq!(&row[3], "");
        assert_eq!(&row[4], "Café Sunrise");

        let job: Job = serde_json::from_str(&row[7]).unwrap();
        assert_eq!(job.query.as_deref(), Some("cafe"));
    }

    #[test]
    fn empty_csv_dataset_is_empty_file() {
        let path = temp_path("empty.csv");
        write_dataset(&[], &path, Some(OutputFormat::Csv)).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn explicit_format_overrides_extension() {
        let path = temp_path("forced.json");
        let used = write_dataset(&[sample()], &path, Some(OutputFormat::Csv)).unwrap();
        assert_eq!(used, OutputFormat::Csv);
        assert!(fs::read_to_string(&path).unwrap().starts_with("address,"));
    }
}
