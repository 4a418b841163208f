//! Grid timestamp conversions.
//!
//! The grid API delivers every timestamp as `YYYY-MM-DDTHH:MM:SSZ` (UTC).
//! Display helpers degrade to [`UNKNOWN`] on malformed input instead of
//! failing the run.

use std::fmt::Display;

use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, Local, NaiveDateTime, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel returned by the display helpers for unparseable timestamps.
pub const UNKNOWN: &str = "Unknown";

/// Grid timestamp format.
const GRID_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Local display format.
const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M";

/// XMLTV timestamp format (UTC, digits only).
const XMLTV_FORMAT: &str = "%Y%m%d%H%M%S";

/// Encoding used for synthetic episode numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EpisodeEncoding {
    /// `{month-1}.{day-1}.{half_hour}/48`
    XmltvNs,
    /// `MMDDHH` where `HH` is the half-hour index.
    DdProgid,
    /// `{day_of_year-1}.{half_hour}.0`
    #[default]
    XmltvNsDoy,
}

impl EpisodeEncoding {
    /// XMLTV `episode-num` `system` attribute for this encoding.
    #[must_use]
    pub const fn system(self) -> &'static str {
        match self {
            Self::XmltvNs | Self::XmltvNsDoy => "xmltv_ns",
            Self::DdProgid => "dd_progid",
        }
    }
}

/// Parses a grid timestamp as UTC.
///
/// # Errors
///
/// Returns an error if `s` is not exactly `YYYY-MM-DDTHH:MM:SSZ`.
pub fn parse_grid_time(s: &str) -> Result<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s, GRID_TIME_FORMAT)
        .map(|naive| naive.and_utc())
        .with_context(|| format!("invalid grid timestamp: {s:?}"))
}

/// Formats a grid timestamp as `YYYY-MM-DD HH:MM` in the host timezone.
#[must_use]
pub fn to_local_display(s: &str) -> String {
    to_display_in(s, &Local)
}

/// Formats a grid timestamp as `YYYY-MM-DD HH:MM` in `tz`.
#[must_use]
pub fn to_display_in<Tz: TimeZone>(s: &str, tz: &Tz) -> String
where
    Tz::Offset: Display,
{
    parse_grid_time(s).map_or_else(
        |_| String::from(UNKNOWN),
        |utc| utc.with_timezone(tz).format(DISPLAY_FORMAT).to_string(),
    )
}

/// Formats a grid timestamp as the XMLTV `YYYYMMDDHHMMSS` form in UTC.
#[must_use]
pub fn to_compact_utc(s: &str) -> String {
    parse_grid_time(s).map_or_else(
        |_| String::from(UNKNOWN),
        |utc| utc.format(XMLTV_FORMAT).to_string(),
    )
}

/// Index of the 30-minute slot of the day, in `0..48`.
#[must_use]
#[allow(clippy::arithmetic_side_effects)]
pub fn half_hour_index(hour: u32, minute: u32) -> u32 {
    hour * 2 + u32::from(minute >= 30)
}

/// Derives a stable pseudo episode number from a grid start time, using the
/// host timezone.
///
/// # Errors
///
/// Returns an error if the timestamp cannot be parsed.
pub fn synthetic_episode_number(s: &str, encoding: EpisodeEncoding) -> Result<String> {
    synthetic_episode_number_in(s, encoding, &Local)
}

/// Derives a stable pseudo episode number from a grid start time, using the
/// calendar date and half-hour slot in `tz`.
///
/// # Errors
///
/// Returns an error if the timestamp cannot be parsed.
#[allow(clippy::arithmetic_side_effects)]
pub fn synthetic_episode_number_in<Tz: TimeZone>(
    s: &str,
    encoding: EpisodeEncoding,
    tz: &Tz,
) -> Result<String> {
    let local = parse_grid_time(s)?.with_timezone(tz);
    let half_hours = half_hour_index(local.hour(), local.minute());

    // month(), day() and ordinal() are 1-based.
    Ok(match encoding {
        EpisodeEncoding::XmltvNs => format!(
            "{}.{}.{half_hours}/48",
            local.month() - 1,
            local.day() - 1
        ),
        EpisodeEncoding::DdProgid => {
            format!("{:02}{:02}{half_hours:02}", local.month(), local.day())
        }
        EpisodeEncoding::XmltvNsDoy => format!("{}.{half_hours}.0", local.ordinal() - 1),
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use chrono::FixedOffset;

    use super::*;

    fn eastern() -> FixedOffset {
        FixedOffset::west_opt(5 * 3600).unwrap()
    }

    #[test]
    fn test_to_compact_utc() {
        // Arrange & Act
        let compact = to_compact_utc("2025-01-01T05:00:00Z");

        // Assert
        assert_eq!(compact, "20250101050000");
    }

    #[test]
    fn test_to_compact_utc_roundtrips_instant() {
        // Arrange
        let inputs = [
            "2025-01-01T05:00:00Z",
            "2024-02-29T23:59:59Z",
            "1999-12-31T00:00:01Z",
        ];

        for input in inputs {
            // Act
            let compact = to_compact_utc(input);
            let reparsed = NaiveDateTime::parse_from_str(&compact, XMLTV_FORMAT)
                .unwrap()
                .and_utc();

            // Assert
            assert_eq!(compact.len(), 14);
            assert!(compact.chars().all(|c| c.is_ascii_digit()));
            assert_eq!(reparsed, parse_grid_time(input).unwrap());
        }
    }

    #[test]
    fn test_malformed_timestamps_are_unknown() {
        // Arrange
        let inputs = [
            "",
            "garbage",
            "2025-01-01 05:00:00",
            "2025-01-01T05:00:00",
            "2025-01-01T05:00:00+00:00",
            "2025-01-01T05:00:00.000Z",
            "2025-13-01T05:00:00Z",
        ];

        for input in inputs {
            // Act & Assert
            assert_eq!(to_compact_utc(input), UNKNOWN, "input: {input:?}");
            assert_eq!(to_display_in(input, &Utc), UNKNOWN, "input: {input:?}");
            assert_eq!(to_local_display(input), UNKNOWN, "input: {input:?}");
        }
    }

    #[test]
    fn test_to_display_in_converts_timezone() {
        // Arrange & Act
        let display = to_display_in("2025-01-01T05:00:00Z", &eastern());

        // Assert
        assert_eq!(display, "2025-01-01 00:00");
    }

    #[test]
    fn test_half_hour_index() {
        assert_eq!(half_hour_index(0, 0), 0);
        assert_eq!(half_hour_index(0, 29), 0);
        assert_eq!(half_hour_index(0, 30), 1);
        assert_eq!(half_hour_index(13, 45), 27);
        assert_eq!(half_hour_index(23, 59), 47);
    }

    #[test]
    fn test_synthetic_xmltv_ns_doy() {
        // Arrange & Act
        let first = synthetic_episode_number_in(
            "2025-01-01T05:00:00Z",
            EpisodeEncoding::XmltvNsDoy,
            &Utc,
        )
        .unwrap();
        let march = synthetic_episode_number_in(
            "2025-03-15T13:45:00Z",
            EpisodeEncoding::XmltvNsDoy,
            &Utc,
        )
        .unwrap();

        // Assert
        assert_eq!(first, "0.10.0");
        assert_eq!(march, "73.27.0");
    }

    #[test]
    fn test_synthetic_xmltv_ns() {
        // Arrange & Act
        let value =
            synthetic_episode_number_in("2025-03-15T13:45:00Z", EpisodeEncoding::XmltvNs, &Utc)
                .unwrap();

        // Assert
        assert_eq!(value, "2.14.27/48");
    }

    #[test]
    fn test_synthetic_dd_progid() {
        // Arrange & Act
        let value =
            synthetic_episode_number_in("2025-03-05T01:30:00Z", EpisodeEncoding::DdProgid, &Utc)
                .unwrap();

        // Assert
        assert_eq!(value, "030503");
    }

    #[test]
    fn test_synthetic_uses_local_calendar() {
        // Arrange: 03:00 UTC on Jan 1 is 22:00 on Dec 31 (leap year) at UTC-5
        let value = synthetic_episode_number_in(
            "2025-01-01T03:00:00Z",
            EpisodeEncoding::XmltvNsDoy,
            &eastern(),
        )
        .unwrap();

        // Assert
        assert_eq!(value, "365.44.0");
    }

    #[test]
    fn test_synthetic_is_deterministic() {
        // Arrange & Act
        let a = synthetic_episode_number_in(
            "2025-06-01T18:30:00Z",
            EpisodeEncoding::XmltvNsDoy,
            &Utc,
        )
        .unwrap();
        let b = synthetic_episode_number_in(
            "2025-06-01T18:30:00Z",
            EpisodeEncoding::XmltvNsDoy,
            &Utc,
        )
        .unwrap();

        // Assert
        assert_eq!(a, b);
    }

    #[test]
    fn test_synthetic_rejects_malformed() {
        // Arrange & Act
        let result = synthetic_episode_number("nope", EpisodeEncoding::XmltvNsDoy);

        // Assert
        assert!(result.is_err());
    }

    #[test]
    fn test_encoding_system_and_serde_names() {
        // Arrange
        #[derive(Deserialize)]
        struct Wrapper {
            encoding: EpisodeEncoding,
        }

        // Act
        let parsed: Wrapper = toml::from_str("encoding = \"dd_progid\"").unwrap();

        // Assert
        assert_eq!(parsed.encoding, EpisodeEncoding::DdProgid);
        assert_eq!(EpisodeEncoding::XmltvNs.system(), "xmltv_ns");
        assert_eq!(EpisodeEncoding::XmltvNsDoy.system(), "xmltv_ns");
        assert_eq!(EpisodeEncoding::DdProgid.system(), "dd_progid");
        assert_eq!(EpisodeEncoding::default(), EpisodeEncoding::XmltvNsDoy);
    }
}
