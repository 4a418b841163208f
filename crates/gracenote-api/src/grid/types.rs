//! Grid API response types.

use serde::Deserialize;

use super::de::{
    deserialize_empty_string_as_none, deserialize_null_as_empty,
    deserialize_optional_string_or_number, deserialize_string_or_number,
};

/// Top-level JSON body of a successful grid response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GridPayload {
    /// One block per channel covered by the requested window.
    #[serde(default)]
    pub channels: Vec<ChannelBlock>,
}

/// Outcome of a single grid window request.
#[derive(Debug, Clone)]
pub enum GridResponse {
    /// HTTP 200 with a decoded payload.
    Listings(Vec<ChannelBlock>),
    /// Any non-200 status. The window contributes no data.
    Rejected {
        /// HTTP status code returned by the upstream.
        status: u16,
    },
}

/// One channel's schedule within one fetched time window.
///
/// The same `channel_id` is repeated across windows; each block carries
/// only the events of its own window.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelBlock {
    /// Stable upstream channel identifier.
    #[serde(deserialize_with = "deserialize_string_or_number")]
    pub channel_id: String,
    /// Broadcast call sign (e.g. `CITYDT`).
    #[serde(default, deserialize_with = "deserialize_empty_string_as_none")]
    pub call_sign: Option<String>,
    /// Channel logo URL.
    #[serde(default, deserialize_with = "deserialize_empty_string_as_none")]
    pub thumbnail: Option<String>,
    /// Scheduled airings in this window.
    #[serde(default)]
    pub events: Vec<Event>,
}

/// A single scheduled airing.
///
/// Missing or `null` timestamps decode as `""` so one bad event does not
/// discard the whole window.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Start time, `YYYY-MM-DDTHH:MM:SSZ`.
    #[serde(default, deserialize_with = "deserialize_null_as_empty")]
    pub start_time: String,
    /// End time, `YYYY-MM-DDTHH:MM:SSZ`.
    #[serde(default, deserialize_with = "deserialize_null_as_empty")]
    pub end_time: String,
    /// Program metadata.
    #[serde(default)]
    pub program: Program,
}

/// Descriptive program metadata embedded in an event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Program {
    /// Program title.
    #[serde(default, deserialize_with = "deserialize_empty_string_as_none")]
    pub title: Option<String>,
    /// Episode title.
    #[serde(default, deserialize_with = "deserialize_empty_string_as_none")]
    pub episode_title: Option<String>,
    /// Short description.
    #[serde(default, deserialize_with = "deserialize_empty_string_as_none")]
    pub short_desc: Option<String>,
    /// Season number as delivered by the upstream.
    #[serde(default, deserialize_with = "deserialize_optional_string_or_number")]
    pub season: Option<String>,
    /// Episode number as delivered by the upstream.
    #[serde(default, deserialize_with = "deserialize_optional_string_or_number")]
    pub episode: Option<String>,
    /// TMS program identifier (e.g. `EP012345670123`).
    #[serde(default, deserialize_with = "deserialize_empty_string_as_none")]
    pub tms_id: Option<String>,
}
