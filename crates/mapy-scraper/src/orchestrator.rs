//! Job execution: search-based and URL-based scraping.

use futures::stream::{self, StreamExt};
use mapy_core::{Job, ScraperSettings, SOURCE_SITE};
use reqwest::Url;

use crate::contact::absolutize;
use crate::error::ScraperError;
use crate::fetch::PageFetcher;
use crate::parse::{parse_detail_html, parse_search_page};
use crate::text::text_of_html;
use crate::types::RawRecord;

/// Characters of page text included in the "no cards" debug event.
const PAGE_PREVIEW_CHARS: usize = 200;

/// Runs scraping jobs against one Mapy site.
///
/// Owns the [`PageFetcher`]; construct once per run and reuse for every job.
#[derive(Debug, Clone)]
pub struct MapyScraper {
    fetcher: PageFetcher,
    /// Base site URL without trailing slashes.
    base_url: String,
    search_endpoint: Url,
    max_concurrent: usize,
}

impl MapyScraper {
    /// Builds a scraper from settings.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidBaseUrl`] if `base_url` is not an
    /// absolute http(s) URL, or [`ScraperError::Http`] if the HTTP client
    /// cannot be built.
    pub fn new(settings: &ScraperSettings) -> Result<Self, ScraperError> {
        let base_url = settings.base_url.trim().trim_end_matches('/').to_string();
        let invalid = |reason: String| ScraperError::InvalidBaseUrl {
            base_url: settings.base_url.clone(),
            reason,
        };

        let parsed = Url::parse(&base_url).map_err(|e| invalid(e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme {}", parsed.scheme())));
        }
        let search_endpoint =
            Url::parse(&format!("{base_url}/search")).map_err(|e| invalid(e.to_string()))?;

        Ok(Self {
            fetcher: PageFetcher::from_settings(settings)?,
            base_url,
            search_endpoint,
            max_concurrent: settings.max_concurrent_requests.max(1),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Search-result URL for `query` in `city`: `{base}/search?query=...`
    /// with the terms form-urlencoded.
    #[must_use]
    pub fn search_url(&self, query: &str, city: &str) -> String {
        let mut url = self.search_endpoint.clone();
        url.query_pairs_mut()
            .append_pair("query", &format!("{query} {city}"));
        url.to_string()
    }

    /// Runs one job and returns its records in discovery order.
    ///
    /// Search results come first, then direct URLs. Every record gets
    /// `source` and `raw_job` filled in where the parser left them unset.
    /// Retrieval failures reduce the output instead of failing the job.
    pub async fn run_job(&self, job: &Job) -> Vec<RawRecord> {
        let mut records = Vec::new();

        if let Some((query, city)) = job.search_terms() {
            tracing::info!(query, city, "running search-based scraping");
            records.extend(self.scrape_search(job, query, city).await);
        }

        if !job.urls.is_empty() {
            tracing::info!(urls = job.urls.len(), "running URL-based scraping");
            records.extend(self.scrape_urls(&job.urls).await);
        }

        for record in &mut records {
            if record.source.is_none() {
                record.source = Some(SOURCE_SITE.to_string());
            }
            if record.raw_job.is_none() {
                record.raw_job = Some(job.clone());
            }
        }
        records
    }

    async fn scrape_search(&self, job: &Job, query: &str, city: &str) -> Vec<RawRecord> {
        let url = self.search_url(query, city);
        tracing::debug!(url = %url, "search URL built");

        let Some(html) = self.fetcher.fetch_with_retries(&url).await else {
            return Vec::new();
        };

        let cards = parse_search_page(&html, &self.base_url);
        tracing::info!(cards = cards.len(), "parsed listing cards on search page");
        if cards.is_empty() {
            let preview: String = text_of_html(&html).chars().take(PAGE_PREVIEW_CHARS).collect();
            tracing::debug!(url = %url, preview = %preview, "search page has no listing cards");
        }

        let needle = query.to_lowercase();
        let selected: Vec<RawRecord> = cards
            .into_iter()
            .filter(|card| !job.exact_match || name_contains(card, &needle))
            .take(job.max_results)
            .collect();
        tracing::debug!(
            selected = selected.len(),
            max_results = job.max_results,
            "selected search results"
        );

        if job.fast_mode {
            return selected;
        }

        stream::iter(selected)
            .map(|card| self.with_detail(card))
            .buffered(self.max_concurrent)
            .collect()
            .await
    }

    /// Fetches the card's detail page, if it links one, and overlays it.
    async fn with_detail(&self, card: RawRecord) -> RawRecord {
        let Some(url) = card.url.clone() else {
            return card;
        };
        match self.scrape_detail(&url).await {
            Some(detail) => card.merged_with(detail),
            None => card,
        }
    }

    async fn scrape_urls(&self, urls: &[String]) -> Vec<RawRecord> {
        let resolved: Vec<String> = urls
            .iter()
            .map(|raw| absolutize(&self.base_url, raw))
            .collect();

        stream::iter(resolved)
            .map(|url| async move {
                tracing::debug!(url = %url, "scraping detail URL");
                let detail = self.scrape_detail(&url).await.unwrap_or_default();
                RawRecord {
                    url: Some(url),
                    ..detail
                }
            })
            .buffered(self.max_concurrent)
            .collect()
            .await
    }

    async fn scrape_detail(&self, url: &str) -> Option<RawRecord> {
        let html = self.fetcher.fetch_with_retries(url).await?;
        Some(parse_detail_html(&html, &self.base_url))
    }
}

fn name_contains(card: &RawRecord, needle: &str) -> bool {
    card.name
        .as_deref()
        .unwrap_or_default()
        .trim()
        .to_lowercase()
        .contains(needle)
}
