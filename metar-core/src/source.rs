use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use anyhow::{Context, Result, anyhow};
use reqwest::Client;

/// Default base URL of the aviation weather data service.
pub const DEFAULT_BASE_URL: &str = "https://aviationweather.gov/adds/dataserver_current/httpparam";

/// Cached documents older than this are refetched.
pub const CACHE_TTL: Duration = Duration::from_secs(900);

const USER_AGENT: &str = "Metar/1.0";

/// How station documents are obtained.
#[derive(Debug, Clone)]
pub struct SourceOptions {
    pub base_url: String,
    pub cache_dir: PathBuf,
    pub hours_before_now: u32,
    /// Always refetch, ignoring any cached copy.
    pub force_refresh: bool,
    /// Accept a cached copy regardless of its age.
    pub accept_stale: bool,
}

impl Default for SourceOptions {
    fn default() -> Self {
        SourceOptions {
            base_url: DEFAULT_BASE_URL.to_string(),
            cache_dir: std::env::temp_dir(),
            hours_before_now: 1,
            force_refresh: false,
            accept_stale: false,
        }
    }
}

/// Obtains station XML documents, consulting the local cache before the
/// network and writing fetched documents back to it.
#[derive(Debug, Clone)]
pub struct ReportSource {
    http: Client,
    options: SourceOptions,
}

impl ReportSource {
    pub fn new(options: SourceOptions) -> Result<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(ReportSource { http, options })
    }

    /// Cache file for one station; the station spelling is preserved.
    pub fn cache_path(&self, station: &str) -> PathBuf {
        self.options.cache_dir.join(format!("metar-{station}.xml"))
    }

    /// The station's document, from the cache when a usable copy exists,
    /// otherwise fetched. A cache-write failure is logged, not fatal.
    pub async fn document(&self, station: &str) -> Result<String> {
        if !self.options.force_refresh {
            if let Some(document) = self.cached_document(station).await {
                tracing::debug!("using cached document for {station}");
                return Ok(document);
            }
        }

        let body = self.fetch(station).await?;

        let path = self.cache_path(station);
        if let Err(err) = tokio::fs::write(&path, &body).await {
            tracing::warn!("failed to write cache file {}: {err}", path.display());
        }

        Ok(body)
    }

    async fn cached_document(&self, station: &str) -> Option<String> {
        let path = self.cache_path(station);
        let metadata = tokio::fs::metadata(&path).await.ok()?;

        if !self.options.accept_stale {
            let modified = metadata.modified().ok()?;
            if !is_fresh(modified) {
                tracing::debug!("cached document for {station} is stale");
                return None;
            }
        }

        tokio::fs::read_to_string(&path).await.ok()
    }

    async fn fetch(&self, station: &str) -> Result<String> {
        let hours = self.options.hours_before_now.to_string();

        tracing::debug!("requesting {station} from {}", self.options.base_url);
        let res = self
            .http
            .get(&self.options.base_url)
            .query(&[
                ("dataSource", "metars"),
                ("requestType", "retrieve"),
                ("format", "xml"),
                ("stationString", station),
                ("hoursBeforeNow", hours.as_str()),
            ])
            .send()
            .await
            .context("Failed to send request to the weather data server")?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context("Failed to read the weather data response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "Weather data request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        Ok(body)
    }

    /// Delete every cached station document in the cache directory and
    /// return how many were removed. A missing directory counts as empty.
    pub async fn purge_cache(&self) -> Result<usize> {
        let mut entries = match tokio::fs::read_dir(&self.options.cache_dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(err) => {
                return Err(err).with_context(|| {
                    format!(
                        "Failed to read cache directory: {}",
                        self.options.cache_dir.display()
                    )
                });
            }
        };

        let mut removed = 0;
        while let Some(entry) = entries
            .next_entry()
            .await
            .context("Failed to read cache directory entry")?
        {
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if name.starts_with("metar-") && name.ends_with(".xml") {
                if let Err(err) = tokio::fs::remove_file(entry.path()).await {
                    tracing::warn!("failed to remove cache file {name}: {err}");
                    continue;
                }
                removed += 1;
            }
        }

        Ok(removed)
    }
}

/// Whether a cache file written at `modified` is still usable. A timestamp
/// in the future counts as fresh.
fn is_fresh(modified: SystemTime) -> bool {
    modified.elapsed().unwrap_or(Duration::ZERO) < CACHE_TTL
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        format!("{}...", &body[..MAX])
    } else {
        body.to_string()
    }
}
