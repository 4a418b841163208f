//! `GridClient` - Gracenote grid API client implementation.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderValue, REFERER};
use tokio::sync::Mutex;
use tracing::instrument;
use url::Url;

use super::api::LocalGridApi;
use super::params::GridQuery;
use super::rate_limiter::GridRateLimiter;
use super::types::{GridPayload, GridResponse};

/// Default grid endpoint.
pub const DEFAULT_BASE_URL: &str = "https://tvlistings.gracenote.com/api/grid";

/// Default User-Agent. The endpoint expects a browser.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:138.0) Gecko/20100101 Firefox/138.0";

/// Default Referer, the affiliate grid page that normally calls the endpoint.
pub const DEFAULT_REFERER: &str = "https://tvlistings.gracenote.com/grid-affiliates.html?aid=gapzap";

/// Number of body characters included in decode error messages.
const BODY_PREVIEW_CHARS: usize = 500;

/// Gracenote grid API client.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct GridClient {
    /// HTTP client (reqwest, gzip enabled, fixed headers).
    http_client: Client,
    /// Grid endpoint URL.
    base_url: Url,
    /// Rate limiter.
    rate_limiter: Arc<Mutex<GridRateLimiter>>,
}

/// Builder for `GridClient`.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct GridClientBuilder {
    base_url: Option<Url>,
    user_agent: Option<String>,
    referer: Option<String>,
    min_interval: Option<Duration>,
}

impl GridClientBuilder {
    /// Creates a new builder.
    const fn new() -> Self {
        Self {
            base_url: None,
            user_agent: None,
            referer: None,
            min_interval: None,
        }
    }

    /// Overrides the endpoint URL (for wiremock in tests).
    #[must_use]
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Sets the User-Agent (default: [`DEFAULT_USER_AGENT`]).
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Sets the Referer (default: [`DEFAULT_REFERER`]).
    #[must_use]
    pub fn referer(mut self, referer: impl Into<String>) -> Self {
        self.referer = Some(referer.into());
        self
    }

    /// Sets the minimum request interval (default: 250ms).
    #[must_use]
    pub const fn min_interval(mut self, interval: Duration) -> Self {
        self.min_interval = Some(interval);
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// - The Referer is not a valid header value.
    /// - `reqwest::Client` build fails.
    pub fn build(self) -> Result<GridClient> {
        let base_url = if let Some(url) = self.base_url {
            url
        } else {
            let result = Url::parse(DEFAULT_BASE_URL);
            result.context("invalid default base URL")?
        };

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| String::from(DEFAULT_USER_AGENT));
        let referer = self
            .referer
            .unwrap_or_else(|| String::from(DEFAULT_REFERER));

        let mut headers = HeaderMap::new();
        headers.insert(
            REFERER,
            HeaderValue::from_str(&referer).context("invalid Referer header value")?,
        );

        let http_client = Client::builder()
            .user_agent(&user_agent)
            .default_headers(headers)
            .gzip(true)
            .build()
            .context("failed to build HTTP client")?;

        let rate_limiter = self
            .min_interval
            .map_or_else(GridRateLimiter::default_interval, GridRateLimiter::new);

        Ok(GridClient {
            http_client,
            base_url,
            rate_limiter: Arc::new(Mutex::new(rate_limiter)),
        })
    }
}

impl GridClient {
    /// Creates a new builder.
    #[must_use]
    pub const fn builder() -> GridClientBuilder {
        GridClientBuilder::new()
    }

    /// Parses a 200 grid response body.
    pub(crate) fn parse_grid_response(body: &str) -> Result<GridPayload> {
        let raw_result: std::result::Result<GridPayload, _> = serde_json::from_str(body);
        raw_result.with_context(|| {
            let preview: String = body.chars().take(BODY_PREVIEW_CHARS).collect();
            format!("grid JSON decoding failed (len={}): {preview}", body.len())
        })
    }
}

impl LocalGridApi for GridClient {
    #[instrument(skip_all, fields(time = query.time))]
    async fn fetch_grid(&self, query: &GridQuery) -> Result<GridResponse> {
        self.rate_limiter.lock().await.wait().await;

        let request = self
            .http_client
            .get(self.base_url.clone())
            .query(&query.to_query_pairs())
            .build()
            .context("failed to build grid request")?;

        tracing::debug!(url = %request.url(), "Grid API request");

        let result = self.http_client.execute(request).await;
        let response = result.with_context(|| format!("grid request failed at {}", query.time))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            tracing::debug!(%status, "Grid API rejected request");
            return Ok(GridResponse::Rejected {
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .context("failed to read grid response body")?;
        tracing::debug!(body_len = body.len(), "Grid response body received");

        let payload = Self::parse_grid_response(&body)?;
        Ok(GridResponse::Listings(payload.channels))
    }
}
