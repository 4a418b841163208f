//! API client library for gracenote-xmltv.
//!
//! Provides a client for the Gracenote TV listings grid endpoint.

/// Gracenote grid API client.
pub mod grid;
