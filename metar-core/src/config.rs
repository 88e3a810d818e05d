use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::Deserialize;
use std::{env, fs, path::PathBuf};

use crate::source::DEFAULT_BASE_URL;

const DEFAULT_HOURS: u32 = 1;
const DEFAULT_ENTRIES: usize = 10;

/// Optional on-disk defaults for the CLI flags. Every key may be omitted,
/// and command-line options always win over the file.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Base URL of the weather data service.
    pub url: Option<String>,
    /// Directory holding cached station documents.
    pub cache_dir: Option<PathBuf>,
    /// How many hours of past reports to request.
    pub hours: Option<u32>,
    /// Most reports shown per station.
    pub entries: Option<usize>,
    /// Color output by default.
    pub color: Option<bool>,
}

impl Config {
    /// Load config from disk, or return defaults when no file exists yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "metar", "metar-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn url(&self) -> &str {
        self.url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.cache_dir.clone().unwrap_or_else(env::temp_dir)
    }

    pub fn hours(&self) -> u32 {
        self.hours.unwrap_or(DEFAULT_HOURS)
    }

    pub fn entries(&self) -> usize {
        self.entries.unwrap_or(DEFAULT_ENTRIES)
    }

    pub fn color(&self) -> bool {
        self.color.unwrap_or(false)
    }
}
