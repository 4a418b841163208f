//! Grid API listing aggregation.
#![allow(clippy::future_not_send)]

use anyhow::{Context, Result};
use chrono::{DateTime, Local, TimeZone};
use tracing::instrument;

use super::api::LocalGridApi;
use super::params::{GridQuery, plan_windows};
use super::types::{ChannelBlock, GridResponse};

/// Fetches every grid window covering `days` days from now and concatenates
/// the returned channel blocks in window order.
///
/// Windows answered with a non-200 status are logged and skipped.
///
/// # Errors
///
/// Returns an error if window planning fails or any request fails at the
/// transport or JSON level.
#[instrument(skip(api))]
pub async fn fetch_listings(
    api: &(impl LocalGridApi + Sync),
    lineup_id: &str,
    postal_code: &str,
    country: &str,
    days: u32,
) -> Result<Vec<ChannelBlock>> {
    let template = GridQuery {
        lineup_id: String::from(lineup_id),
        postal_code: String::from(postal_code),
        country: String::from(country),
        time: 0,
    };
    fetch_listings_at(api, &template, days, &Local::now()).await
}

/// Same as [`fetch_listings`] with an explicit "now".
///
/// `template.time` is ignored and replaced per window.
///
/// # Errors
///
/// Returns an error if window planning fails or any request fails at the
/// transport or JSON level.
pub async fn fetch_listings_at<Tz: TimeZone>(
    api: &(impl LocalGridApi + Sync),
    template: &GridQuery,
    days: u32,
    now: &DateTime<Tz>,
) -> Result<Vec<ChannelBlock>> {
    let windows = plan_windows(now, days).context("failed to plan grid windows")?;
    let mut listings: Vec<ChannelBlock> = Vec::new();
    let mut failed: usize = 0;

    for window in &windows {
        let query = GridQuery {
            time: window.timestamp,
            ..template.clone()
        };

        let response = api.fetch_grid(&query).await.with_context(|| {
            format!(
                "grid request failed at +{}h (time={})",
                window.offset_hours, window.timestamp
            )
        })?;

        match response {
            GridResponse::Listings(channels) => {
                tracing::debug!(
                    offset_hours = window.offset_hours,
                    time = window.timestamp,
                    blocks = channels.len(),
                    "Grid window completed"
                );
                listings.extend(channels);
            }
            GridResponse::Rejected { status } => {
                failed = failed.saturating_add(1);
                tracing::warn!(
                    offset_hours = window.offset_hours,
                    time = window.timestamp,
                    status,
                    "Failed to fetch at {} - HTTP {}",
                    window.timestamp,
                    status
                );
            }
        }
    }

    tracing::debug!(
        windows = windows.len(),
        failed,
        blocks = listings.len(),
        "Grid fetch completed"
    );

    Ok(listings)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use std::sync::Mutex;

    use anyhow::Result;
    use chrono::Utc;

    use super::*;

    /// Mock API that replays pre-configured responses in order and records
    /// the queries it received.
    struct MockGridApi {
        responses: Mutex<Vec<Result<GridResponse>>>,
        queries: Mutex<Vec<GridQuery>>,
    }

    impl MockGridApi {
        fn new(mut responses: Vec<Result<GridResponse>>) -> Self {
            responses.reverse();
            Self {
                responses: Mutex::new(responses),
                queries: Mutex::new(Vec::new()),
            }
        }

        fn queries(&self) -> Vec<GridQuery> {
            self.queries.lock().unwrap().clone()
        }
    }

    impl LocalGridApi for MockGridApi {
        async fn fetch_grid(&self, query: &GridQuery) -> Result<GridResponse> {
            self.queries.lock().unwrap().push(query.clone());
            self.responses
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Ok(GridResponse::Listings(vec![])))
        }
    }

    fn block(channel_id: &str, call_sign: &str) -> ChannelBlock {
        ChannelBlock {
            channel_id: String::from(channel_id),
            call_sign: Some(String::from(call_sign)),
            thumbnail: None,
            events: vec![],
        }
    }

    fn template() -> GridQuery {
        GridQuery {
            lineup_id: String::from("CAN-lineupId-DEFAULT"),
            postal_code: String::from("M5V3L9"),
            country: String::from("CAN"),
            time: 0,
        }
    }

    #[tokio::test]
    async fn test_fetch_listings_one_request_per_window() {
        // Arrange: 18:00 UTC covers 18:00 and 21:00
        let mock = MockGridApi::new(vec![]);
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 18, 30, 0).unwrap();

        // Act
        let result = fetch_listings_at(&mock, &template(), 1, &now).await.unwrap();

        // Assert
        assert!(result.is_empty());
        let queries = mock.queries();
        assert_eq!(queries.len(), 2);
        assert_eq!(
            queries[0].time,
            Utc.with_ymd_and_hms(2025, 1, 1, 18, 0, 0).unwrap().timestamp()
        );
        assert_eq!(
            queries[1].time,
            Utc.with_ymd_and_hms(2025, 1, 1, 21, 0, 0).unwrap().timestamp()
        );
        assert_eq!(queries[0].lineup_id, "CAN-lineupId-DEFAULT");
        assert_eq!(queries[0].postal_code, "M5V3L9");
    }

    #[tokio::test]
    async fn test_fetch_listings_concatenates_windows() {
        // Arrange: the same channel comes back from both windows
        let mock = MockGridApi::new(vec![
            Ok(GridResponse::Listings(vec![block("10195", "CITYDT")])),
            Ok(GridResponse::Listings(vec![
                block("10195", "CITYDT"),
                block("20001", "WXYZ"),
            ])),
        ]);
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 18, 0, 0).unwrap();

        // Act
        let result = fetch_listings_at(&mock, &template(), 1, &now).await.unwrap();

        // Assert: no dedup at this stage
        assert_eq!(result.len(), 3);
        assert_eq!(result[0].channel_id, "10195");
        assert_eq!(result[1].channel_id, "10195");
        assert_eq!(result[2].channel_id, "20001");
    }

    #[tokio::test]
    async fn test_fetch_listings_skips_rejected_windows() {
        // Arrange
        let mock = MockGridApi::new(vec![
            Ok(GridResponse::Rejected { status: 500 }),
            Ok(GridResponse::Listings(vec![block("10195", "CITYDT")])),
        ]);
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 18, 0, 0).unwrap();

        // Act
        let result = fetch_listings_at(&mock, &template(), 1, &now).await.unwrap();

        // Assert
        assert_eq!(result.len(), 1);
        assert_eq!(mock.queries().len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_listings_logs_rejected_window() {
        use tracing_mock::{expect, subscriber};

        // Arrange
        let mock = MockGridApi::new(vec![Ok(GridResponse::Rejected { status: 404 })]);
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 21, 0, 0).unwrap();
        let expected_time = now.timestamp();

        let (subscriber, handle) = subscriber::mock()
            .event(
                expect::event()
                    .at_level(tracing::Level::WARN)
                    .with_fields(expect::msg(format!(
                        "Failed to fetch at {expected_time} - HTTP 404"
                    ))),
            )
            .run_with_handle();
        let _guard = tracing::subscriber::set_default(subscriber);

        // Act
        let result = fetch_listings_at(&mock, &template(), 1, &now).await.unwrap();

        // Assert
        assert!(result.is_empty());
        handle.assert_finished();
    }

    #[tokio::test]
    async fn test_fetch_listings_propagates_transport_error() {
        // Arrange
        let mock = MockGridApi::new(vec![Err(anyhow::anyhow!("connection refused"))]);
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 21, 0, 0).unwrap();

        // Act
        let result = fetch_listings_at(&mock, &template(), 1, &now).await;

        // Assert
        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("+21h"));
        assert!(message.contains("connection refused"));
    }

    #[tokio::test]
    async fn test_fetch_listings_zero_days_sends_nothing() {
        // Arrange
        let mock = MockGridApi::new(vec![]);
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();

        // Act
        let result = fetch_listings_at(&mock, &template(), 0, &now).await.unwrap();

        // Assert
        assert!(result.is_empty());
        assert!(mock.queries().is_empty());
    }
}
