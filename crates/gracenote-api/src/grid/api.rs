//! `GridApi` trait definition.
#![allow(clippy::future_not_send)]

use anyhow::Result;

use super::params::GridQuery;
use super::types::GridResponse;

/// Gracenote grid API trait.
///
/// Abstracts the single grid request for mock substitution in tests.
/// Uses `trait_variant::make` to generate a `Send`-bound async trait.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(GridApi: Send)]
pub trait LocalGridApi {
    /// Fetches one grid window.
    ///
    /// A non-200 status is reported as [`GridResponse::Rejected`], not as an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be sent or a 200 body is not
    /// valid grid JSON.
    async fn fetch_grid(&self, query: &GridQuery) -> Result<GridResponse>;
}
