//! Gracenote grid API client module.
//!
//! Handles HTTP requests to the `api/grid` endpoint and aggregates
//! the per-window channel blocks into one listing.

mod api;
mod client;
mod de;
mod params;
mod rate_limiter;
mod types;
mod util;

#[allow(clippy::module_name_repetitions)]
pub use api::{GridApi, LocalGridApi};
#[allow(clippy::module_name_repetitions)]
pub use client::{
    DEFAULT_BASE_URL, DEFAULT_REFERER, DEFAULT_USER_AGENT, GridClient, GridClientBuilder,
};
pub use params::{FetchWindow, GridQuery, WINDOW_HOURS, plan_windows};
pub use rate_limiter::DEFAULT_MIN_INTERVAL;
#[allow(clippy::module_name_repetitions)]
pub use types::{ChannelBlock, Event, GridPayload, GridResponse, Program};
pub use util::{fetch_listings, fetch_listings_at};
