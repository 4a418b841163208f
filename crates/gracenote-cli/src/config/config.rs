//! `AppConfig` struct and TOML loading.

use std::path::Path;

use anyhow::{Context, Result};
use gracenote_api::grid::{
    DEFAULT_BASE_URL, DEFAULT_MIN_INTERVAL, DEFAULT_REFERER, DEFAULT_USER_AGENT,
};
use gracenote_guide::guide::GuideOptions;
use gracenote_guide::time::EpisodeEncoding;
use serde::Deserialize;

/// Call signs included when `[channels].allowed` is not set.
const DEFAULT_ALLOWED: [&str; 4] = ["CIIIDT", "CKCODT", "CICADT", "CITYDT"];

/// Force-series patterns used when `[series].force` is not set.
const DEFAULT_FORCE_SERIES: [&str; 2] = ["*News*", "CTV Your Morning"];

/// Top-level application configuration.
#[derive(Debug, Deserialize, Default, PartialEq, Eq)]
pub struct AppConfig {
    /// Grid API endpoint settings.
    #[serde(default)]
    pub api: ApiConfig,
    /// Channel selection settings.
    #[serde(default)]
    pub channels: ChannelsConfig,
    /// Force-series settings.
    #[serde(default)]
    pub series: SeriesConfig,
}

/// Grid API endpoint configuration.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ApiConfig {
    /// Grid endpoint URL.
    pub base_url: String,
    /// `User-Agent` header value.
    pub user_agent: String,
    /// `Referer` header value.
    pub referer: String,
    /// Minimum pause between requests, in milliseconds.
    pub min_interval_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: String::from(DEFAULT_BASE_URL),
            user_agent: String::from(DEFAULT_USER_AGENT),
            referer: String::from(DEFAULT_REFERER),
            min_interval_ms: u64::try_from(DEFAULT_MIN_INTERVAL.as_millis()).unwrap_or(250),
        }
    }
}

/// Channel selection configuration.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ChannelsConfig {
    /// Call signs to include in the guide.
    pub allowed: Vec<String>,
}

impl Default for ChannelsConfig {
    fn default() -> Self {
        Self {
            allowed: DEFAULT_ALLOWED.iter().map(|s| String::from(*s)).collect(),
        }
    }
}

/// Force-series configuration.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SeriesConfig {
    /// Glob patterns over program titles.
    pub force: Vec<String>,
    /// Synthetic episode number encoding.
    pub encoding: EpisodeEncoding,
}

impl Default for SeriesConfig {
    fn default() -> Self {
        Self {
            force: DEFAULT_FORCE_SERIES.iter().map(|s| String::from(*s)).collect(),
            encoding: EpisodeEncoding::default(),
        }
    }
}

impl AppConfig {
    /// Loads config from a TOML file. Returns default if file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Mapping rules for the guide builder.
    #[must_use]
    pub fn guide_options(&self) -> GuideOptions {
        GuideOptions {
            allowed_channels: self.channels.allowed.clone(),
            force_series: self.series.force.clone(),
            encoding: self.series.encoding,
        }
    }
}
