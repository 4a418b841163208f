//! Grid API request parameter types and window planning.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, LocalResult, NaiveDateTime, NaiveTime, TimeZone, Timelike};

/// Length of one grid window in hours (`timespan` parameter).
pub const WINDOW_HOURS: u32 = 3;

/// `WINDOW_HOURS` as a step size for ranges.
const WINDOW_STEP: usize = 3;

/// Value sent as `headendId`. The web client always sends this literal.
const HEADEND_ID: &str = "lineupId";

/// Request parameters for one grid window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridQuery {
    /// Lineup identifier (e.g. `CAN-lineupId-DEFAULT`).
    pub lineup_id: String,
    /// Postal or ZIP code.
    pub postal_code: String,
    /// Country code (e.g. `CAN`, `USA`).
    pub country: String,
    /// Window start as a UNIX timestamp.
    pub time: i64,
}

impl GridQuery {
    /// Builds the query string pairs in the order the web client sends them.
    #[must_use]
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("lineupId", self.lineup_id.clone()),
            ("timespan", WINDOW_HOURS.to_string()),
            ("headendId", String::from(HEADEND_ID)),
            ("country", self.country.clone()),
            ("postalCode", self.postal_code.clone()),
            ("time", self.time.to_string()),
        ]
    }
}

/// One planned window: hour offset from local midnight and its UNIX timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchWindow {
    /// Hours after local midnight of the current day.
    pub offset_hours: u32,
    /// UNIX timestamp of the window start.
    pub timestamp: i64,
}

/// Resolves a local wall-clock time to an instant.
///
/// Ambiguous times take the earlier instant. Times inside a DST gap are
/// pushed forward one hour.
fn resolve_local<Tz: TimeZone>(tz: &Tz, local: &NaiveDateTime) -> Option<DateTime<Tz>> {
    match tz.from_local_datetime(local) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => Some(dt),
        LocalResult::None => {
            let shifted = local.checked_add_signed(Duration::hours(1))?;
            tz.from_local_datetime(&shifted).earliest()
        }
    }
}

/// Plans the grid windows covering `days` days starting at the 3-hour
/// boundary at or before `now`.
///
/// Offsets run from that boundary up to (excluding) `24 * days` hours after
/// local midnight, in steps of [`WINDOW_HOURS`].
///
/// # Errors
///
/// Returns an error if the day span overflows or a window start cannot be
/// represented in the given timezone.
#[allow(clippy::arithmetic_side_effects)]
pub fn plan_windows<Tz: TimeZone>(now: &DateTime<Tz>, days: u32) -> Result<Vec<FetchWindow>> {
    let tz = now.timezone();
    let midnight = now.date_naive().and_time(NaiveTime::MIN);
    let first = (now.hour() / WINDOW_HOURS) * WINDOW_HOURS;
    let end = days.checked_mul(24).context("day span is too large")?;

    (first..end)
        .step_by(WINDOW_STEP)
        .map(|offset_hours| {
            let local = midnight
                .checked_add_signed(Duration::hours(i64::from(offset_hours)))
                .with_context(|| format!("window offset out of range: {offset_hours}h"))?;
            let start = resolve_local(&tz, &local)
                .with_context(|| format!("cannot resolve local time {local}"))?;
            Ok(FetchWindow {
                offset_hours,
                timestamp: start.timestamp(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use chrono::{FixedOffset, Utc};

    use super::*;

    #[test]
    fn test_query_pairs() {
        // Arrange
        let query = GridQuery {
            lineup_id: String::from("CAN-lineupId-DEFAULT"),
            postal_code: String::from("M5V3L9"),
            country: String::from("CAN"),
            time: 1_735_707_600,
        };

        // Act
        let pairs = query.to_query_pairs();

        // Assert
        assert_eq!(
            pairs,
            vec![
                ("lineupId", String::from("CAN-lineupId-DEFAULT")),
                ("timespan", String::from("3")),
                ("headendId", String::from("lineupId")),
                ("country", String::from("CAN")),
                ("postalCode", String::from("M5V3L9")),
                ("time", String::from("1735707600")),
            ]
        );
    }

    #[test]
    fn test_plan_windows_from_midnight() {
        // Arrange
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 10, 0).unwrap();

        // Act
        let windows = plan_windows(&now, 1).unwrap();

        // Assert
        assert_eq!(windows.len(), 8);
        assert_eq!(windows[0].offset_hours, 0);
        assert_eq!(windows[0].timestamp, 1_735_689_600);
        assert_eq!(windows[7].offset_hours, 21);
        assert_eq!(windows[7].timestamp, 1_735_689_600 + 21 * 3600);
    }

    #[test]
    fn test_plan_windows_rounds_down_to_boundary() {
        // Arrange: 17:45 rounds down to 15:00
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 17, 45, 0).unwrap();

        // Act
        let windows = plan_windows(&now, 1).unwrap();

        // Assert
        let offsets: Vec<u32> = windows.iter().map(|w| w.offset_hours).collect();
        assert_eq!(offsets, vec![15, 18, 21]);
    }

    #[test]
    fn test_plan_windows_multiple_days() {
        // Arrange
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 22, 0, 0).unwrap();

        // Act
        let windows = plan_windows(&now, 2).unwrap();

        // Assert
        let offsets: Vec<u32> = windows.iter().map(|w| w.offset_hours).collect();
        assert_eq!(offsets, vec![21, 24, 27, 30, 33, 36, 39, 42, 45]);
    }

    #[test]
    fn test_plan_windows_zero_days_is_empty() {
        // Arrange
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();

        // Act
        let windows = plan_windows(&now, 0).unwrap();

        // Assert
        assert!(windows.is_empty());
    }

    #[test]
    fn test_plan_windows_uses_local_midnight() {
        // Arrange: UTC-5, local 2025-01-01 04:00 = 09:00 UTC
        let tz = FixedOffset::west_opt(5 * 3600).unwrap();
        let now = tz.with_ymd_and_hms(2025, 1, 1, 4, 0, 0).unwrap();

        // Act
        let windows = plan_windows(&now, 1).unwrap();

        // Assert: first window is local 03:00 = 08:00 UTC
        assert_eq!(windows[0].offset_hours, 3);
        assert_eq!(
            windows[0].timestamp,
            Utc.with_ymd_and_hms(2025, 1, 1, 8, 0, 0).unwrap().timestamp()
        );
    }
}
