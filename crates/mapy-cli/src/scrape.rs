//! `scrape` and `normalize` command handlers.
//!
//! Jobs run one after another. A failing job is logged and skipped rather
//! than propagated so one bad job does not abort the whole run.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use mapy_core::Job;
use mapy_scraper::{dedupe, normalize, MapyScraper, NormalizedRecord, RawRecord};

use crate::export::{write_dataset, OutputFormat};

/// Loads settings and jobs, runs every job, then normalizes, deduplicates
/// and exports the combined records.
///
/// # Errors
///
/// Returns an error if the jobs file cannot be loaded, the scraper cannot be
/// built, or the dataset cannot be written. Per-job failures are logged and
/// skipped, not propagated.
pub(crate) async fn run_scrape(
    settings_path: &Path,
    input: &Path,
    output: &Path,
    format: Option<OutputFormat>,
) -> anyhow::Result<()> {
    tracing::info!(path = %settings_path.display(), "loading settings");
    let settings = mapy_core::load_settings_with_env(settings_path);

    tracing::info!(path = %input.display(), "loading jobs");
    let jobs = mapy_core::load_jobs(input)
        .with_context(|| format!("failed to load jobs from {}", input.display()))?;

    let scraper = MapyScraper::new(&settings).context("failed to build scraper")?;
    let summary = run_jobs(Arc::new(scraper), jobs).await;

    let records = normalize_and_dedupe(summary.records);
    let used = write_dataset(&records, output, format)?;

    println!(
        "scraped {} jobs ({} failed): {} records written to {} ({})",
        summary.jobs,
        summary.failed_jobs,
        records.len(),
        output.display(),
        format_name(used),
    );
    Ok(())
}

/// Re-normalizes and deduplicates an existing JSON dataset.
///
/// # Errors
///
/// Returns an error if the input cannot be read or is not a JSON array of
/// record objects, or if the dataset cannot be written.
pub(crate) fn run_normalize(
    input: &Path,
    output: &Path,
    format: Option<OutputFormat>,
) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(input)
        .with_context(|| format!("failed to read dataset {}", input.display()))?;
    let raw: Vec<RawRecord> = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse dataset {}", input.display()))?;

    let input_count = raw.len();
    let records = normalize_and_dedupe(raw);
    let used = write_dataset(&records, output, format)?;

    println!(
        "normalized {input_count} records: {} written to {} ({})",
        records.len(),
        output.display(),
        format_name(used),
    );
    Ok(())
}

/// Records gathered from a run plus job counters for the summary line.
pub(crate) struct RunSummary {
    pub records: Vec<RawRecord>,
    pub jobs: usize,
    pub failed_jobs: usize,
}

/// Runs `jobs` in order. Each job runs in its own task so a panic is caught
/// at the job boundary and counted as a failed job with zero records.
pub(crate) async fn run_jobs(scraper: Arc<MapyScraper>, jobs: Vec<Job>) -> RunSummary {
    let total = jobs.len();
    let mut records = Vec::new();
    let mut failed_jobs = 0usize;

    for (idx, job) in jobs.into_iter().enumerate() {
        let job_number = idx + 1;
        tracing::info!(
            job = job_number,
            total,
            query = ?job.query,
            city = ?job.city,
            urls = job.urls.len(),
            fast_mode = job.fast_mode,
            exact_match = job.exact_match,
            max_results = job.max_results,
            "running job"
        );

        let scraper = Arc::clone(&scraper);
        let handle = tokio::spawn(async move { scraper.run_job(&job).await });

        match handle.await {
            Ok(job_records) => {
                tracing::info!(
                    job = job_number,
                    records = job_records.len(),
                    "job produced raw records"
                );
                records.extend(job_records);
            }
            Err(e) => {
                failed_jobs += 1;
                tracing::error!(job = job_number, error = %e, "job failed");
            }
        }
    }

    if failed_jobs > 0 {
        tracing::warn!(failed_jobs, total, "some jobs failed");
    }

    RunSummary {
        records,
        jobs: total,
        failed_jobs,
    }
}

pub(crate) fn normalize_and_dedupe(raw: Vec<RawRecord>) -> Vec<NormalizedRecord> {
    let raw_count = raw.len();
    tracing::info!(records = raw_count, "normalizing records");
    let normalized: Vec<NormalizedRecord> = raw.into_iter().map(normalize).collect();

    let deduped = dedupe(normalized);
    tracing::info!(
        before = raw_count,
        after = deduped.len(),
        "deduplicated records"
    );
    deduped
}

fn format_name(format: OutputFormat) -> &'static str {
    match format {
        OutputFormat::Json => "json",
        OutputFormat::Csv => "csv",
    }
}

#[cfg(test)]
#[path = "scrape_test.rs"]
mod tests;
