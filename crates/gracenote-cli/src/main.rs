//! gracenote-xmltv - Gracenote TV listings to XMLTV.

/// Application configuration (TOML).
mod config;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::instrument;
use tracing_subscriber::filter::EnvFilter;
#[cfg(not(feature = "otel"))]
use tracing_subscriber::fmt;
#[cfg(feature = "otel")]
use tracing_subscriber::layer::SubscriberExt;
#[cfg(feature = "otel")]
use tracing_subscriber::util::SubscriberInitExt;
use url::Url;

use crate::config::{ApiConfig, AppConfig, resolve_config_path};
use gracenote_api::grid::{GridClient, fetch_listings};
use gracenote_guide::guide::{GuideMapper, assemble};

/// Lineup identifier used when `--lineup` is omitted.
const DEFAULT_LINEUP: &str = "CAN-lineupId-DEFAULT";

/// CLI argument parser.
#[derive(Parser)]
#[command(about, version)]
struct Cli {
    /// Override config directory.
    #[arg(long)]
    dir: Option<PathBuf>,

    /// Gracenote lineup identifier.
    #[arg(long, default_value = DEFAULT_LINEUP)]
    lineup: String,

    /// Postal code of the viewing area.
    #[arg(long)]
    postal: Option<String>,

    /// Country code.
    #[arg(long, default_value = "CAN")]
    country: String,

    /// Number of days of listings to fetch.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    days: u32,

    /// Output XMLTV file.
    #[arg(short, long, default_value = "gracenote.xml")]
    output: PathBuf,
}

/// Returns `value` if it is present and non-empty.
///
/// # Errors
///
/// Returns `missing argument: <name>` otherwise.
fn require<'a>(name: &str, value: Option<&'a str>) -> Result<&'a str> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => bail!("missing argument: {name}"),
    }
}

/// Builds a `GridClient` from the `[api]` config section.
///
/// # Errors
///
/// Returns an error if the base URL is invalid or the client fails to build.
fn build_client(api: &ApiConfig) -> Result<GridClient> {
    let base_url = Url::parse(&api.base_url)
        .with_context(|| format!("invalid base_url: {}", api.base_url))?;

    GridClient::builder()
        .base_url(base_url)
        .user_agent(api.user_agent.as_str())
        .referer(api.referer.as_str())
        .min_interval(Duration::from_millis(api.min_interval_ms))
        .build()
        .context("failed to build grid client")
}

/// Fetches listings and writes the XMLTV document.
///
/// # Errors
///
/// Returns an error if an argument is missing, the config is invalid, a grid
/// request fails or the output cannot be written.
#[instrument(skip_all)]
async fn run(cli: &Cli) -> Result<()> {
    let lineup = require("lineup", Some(cli.lineup.as_str()))?;
    let postal = require("postal", cli.postal.as_deref())?;
    let country = require("country", Some(cli.country.as_str()))?;

    let config_path = resolve_config_path(cli.dir.as_ref())?;
    let config = AppConfig::load(&config_path)?;
    let mapper =
        GuideMapper::new(&config.guide_options()).context("invalid [series] configuration")?;
    let client = build_client(&config.api)?;

    tracing::info!("Fetching data from Gracenote...");
    let blocks = fetch_listings(&client, lineup, postal, country, cli.days)
        .await
        .context("failed to fetch listings")?;

    tracing::info!("Processing {} channel blocks...", blocks.len());
    let tv = assemble(&blocks, mapper);

    tracing::info!("Writing {}...", cli.output.display());
    tv.write_to(&cli.output)?;
    tracing::info!(
        channels = tv.channels.len(),
        programmes = tv.programmes.len(),
        "Done"
    );

    Ok(())
}

/// Entry point.
///
/// # Errors
///
/// Returns an error if the run fails.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    #[cfg(not(feature = "otel"))]
    {
        fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_target(false)
            .init();
    }

    #[cfg(feature = "otel")]
    {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);

        let otel_layer = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
            .ok()
            .and_then(|_| {
                let exporter = opentelemetry_otlp::SpanExporter::builder()
                    .with_http()
                    .build()
                    .ok()?;

                let tracer_provider = opentelemetry_sdk::trace::SdkTracerProvider::builder()
                    .with_simple_exporter(exporter)
                    .build();

                let tracer = opentelemetry::trace::TracerProvider::tracer(
                    &tracer_provider,
                    env!("CARGO_PKG_NAME"),
                );
                opentelemetry::global::set_tracer_provider(tracer_provider);

                Some(tracing_opentelemetry::layer().with_tracer(tracer))
            });

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .with(otel_layer)
            .init();
    }

    let cli = Cli::parse();
    run(&cli).await
}
