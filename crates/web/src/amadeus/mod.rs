//! Amadeus self-service API client.
//!
//! # Architecture
//!
//! - REST endpoints under a single origin (test or production)
//! - OAuth2 client-credentials flow; the bearer token is cached until
//!   shortly before it expires
//! - Handlers depend on the [`FlightProvider`] trait, not the concrete
//!   client, so tests can script offers and airline lookups
//!
//! # APIs
//!
//! ## Flight Offers Search
//! - `GET /v2/shopping/flight-offers` - priced offers for a route and date
//!
//! ## Airline Code Lookup
//! - `GET /v1/reference-data/airlines` - resolve a carrier code to its
//!   business name

mod client;
pub mod types;

pub use client::AmadeusClient;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::search::SearchQuery;
use types::FlightOffer;

/// Errors that can occur when interacting with the Amadeus APIs.
#[derive(Debug, Error)]
pub enum AmadeusError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The OAuth token request was rejected.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The API returned a non-success status.
    #[error("API error: HTTP {status}: {detail}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Truncated response body.
        detail: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// No airline record exists for a carrier code.
    #[error("No airline record for code {0}")]
    UnknownAirline(String),

    /// Rate limited by Amadeus.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),
}

/// Upstream source of flight offers and airline reference data.
///
/// The production implementation is [`AmadeusClient`]. `airline_name` is a
/// separate call per carrier; the search aggregator owns the pacing between
/// those calls.
#[async_trait]
pub trait FlightProvider: Send + Sync {
    /// Search priced offers for a query. At most `max` offers come back.
    async fn search_offers(
        &self,
        query: &SearchQuery,
        currency: &str,
        max: u32,
    ) -> Result<Vec<FlightOffer>, AmadeusError>;

    /// Resolve an airline carrier code to its display name.
    async fn airline_name(&self, carrier_code: &str) -> Result<String, AmadeusError>;
}
