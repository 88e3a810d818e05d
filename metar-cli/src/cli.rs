use std::path::PathBuf;
use std::time::Duration;

use anyhow::bail;
use clap::Parser;

use metar_core::{
    Config, ReportSource, SourceOptions, decode_document, render_decoded, render_template,
};

/// Delay between stations to prevent server throttling.
const STATION_PACING: Duration = Duration::from_secs(1);

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "metar",
    version,
    about = "Retrieve and decode METAR/SPECI weather reports"
)]
pub struct Cli {
    /// 4-digit ICAO weather station code(s).
    pub stations: Vec<String>,

    /// Enable color output.
    #[arg(short = 'G', long)]
    pub color: bool,

    /// Decode each report before displaying it.
    #[arg(short, long)]
    pub decoded: bool,

    /// Output each report using a template, e.g. "{station_id}: {temp_c}".
    #[arg(short, long, value_name = "TEMPLATE")]
    pub format: Option<String>,

    /// Display no more than this many reports per station.
    #[arg(short, long, value_name = "N")]
    pub entries: Option<usize>,

    /// Number of hours in the past to request reports for.
    #[arg(short = 'H', long, value_name = "N")]
    pub hours: Option<u32>,

    /// Force a redownload even when a cached report is available.
    #[arg(short = 'n', long)]
    pub refresh: bool,

    /// Use a cached report regardless of its age.
    #[arg(short = 't', long)]
    pub cached: bool,

    /// Directory for cached reports.
    #[arg(short = 'p', long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Base URL of the weather data service.
    #[arg(short = 'u', long, value_name = "URL")]
    pub url: Option<String>,

    /// Purge the cache before retrieval.
    #[arg(short = 'x', long)]
    pub purge: bool,
}

enum OutputMode {
    Raw,
    Decoded,
    Template(String),
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let Cli {
            stations,
            color,
            decoded,
            format,
            entries,
            hours,
            refresh,
            cached,
            cache_dir,
            url,
            purge,
        } = self;

        let config = Config::load()?;

        let color = color || config.color();
        let entries = entries.unwrap_or_else(|| config.entries());
        let options = SourceOptions {
            base_url: url.unwrap_or_else(|| config.url().to_string()),
            cache_dir: cache_dir.unwrap_or_else(|| config.cache_dir()),
            hours_before_now: hours.unwrap_or_else(|| config.hours()),
            force_refresh: refresh,
            accept_stale: cached,
        };
        tracing::debug!(
            "using weather data service at {} with cache in {}",
            options.base_url,
            options.cache_dir.display()
        );
        let source = ReportSource::new(options)?;

        if purge {
            source.purge_cache().await?;
            if stations.is_empty() {
                eprintln!("Cache purged.");
                return Ok(());
            }
        }
        if stations.is_empty() {
            bail!("Please specify a weather station by 4-digit ICAO code");
        }

        // Decoded output wins when both -d and -f are given.
        let mode = if decoded {
            OutputMode::Decoded
        } else if let Some(template) = format {
            OutputMode::Template(template)
        } else {
            OutputMode::Raw
        };

        for (index, station) in stations.iter().enumerate() {
            if index > 0 {
                tokio::time::sleep(STATION_PACING).await;
            }
            show_station(&source, station, entries, &mode, color).await;
        }

        Ok(())
    }
}

/// Retrieve, decode, and print one station's reports. Failures are
/// reported per station and never abort the remaining ones.
async fn show_station(
    source: &ReportSource,
    station: &str,
    entries: usize,
    mode: &OutputMode,
    color: bool,
) {
    let document = match source.document(station).await {
        Ok(document) => document,
        Err(err) => {
            println!("No weather information for {station}: {err:#}.");
            return;
        }
    };

    let records = match decode_document(&document, entries) {
        Ok(records) => records,
        Err(err) => {
            println!("No weather information for {station}: {err}.");
            return;
        }
    };

    if records.is_empty() {
        println!("No weather information for {station} is available at this time.");
        return;
    }

    for record in &records {
        match mode {
            OutputMode::Raw => println!("{}", record.raw_text),
            OutputMode::Decoded => println!("{}", render_decoded(record, color)),
            OutputMode::Template(template) => {
                println!("{}", render_template(record, template, color));
            }
        }
    }
}
