//! Flight search aggregation.
//!
//! Combines the provider's offer search with per-offer airline name lookups
//! into display-ready [`FlightOffer`] values. Airline lookups run strictly
//! one at a time with a pacing delay between successive calls; the free
//! Amadeus tier rejects clients that exceed roughly one request per second.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use thiserror::Error;
use tracing::instrument;

use crate::amadeus::types::FlightOffer as ProviderOffer;
use crate::amadeus::{AmadeusError, FlightProvider};
use crate::models::search::SearchQuery;

/// Timestamp layout used by the provider, e.g. `2025-09-01T07:35:00`.
const PROVIDER_TIMESTAMP: &str = "%Y-%m-%dT%H:%M:%S";

/// Placeholder shown when the provider reports no departure terminal.
const GATE_UNKNOWN: &str = "NA";

/// Upper bound on offers fetched per search.
pub const MAX_OFFERS: u32 = 8;

/// Default delay between successive provider calls.
pub const DEFAULT_PACING: Duration = Duration::from_millis(1000);

/// Errors that can occur during a flight search.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The provider returned zero offers for the query.
    #[error("no flights found")]
    NoOffers,

    /// A provider call failed.
    #[error("provider error: {0}")]
    Provider(#[from] AmadeusError),

    /// A provider payload was missing something the aggregation needs.
    #[error("aggregation failed: {0}")]
    Aggregation(String),
}

/// A display-ready flight offer produced by one search.
///
/// Offers live only as long as the results page; booking copies the chosen
/// offer's fields verbatim into a booking row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlightOffer {
    /// Origin IATA code.
    pub departure: String,
    /// Destination IATA code.
    pub arrival: String,
    /// Airline display name of the first segment's carrier.
    pub carrier: String,
    /// ISO 8601 itinerary duration, e.g. `PT6H15M`.
    pub duration: String,
    /// Intermediate landings (segments minus one).
    pub number_of_stops: usize,
    /// Arrival IATA codes of every segment except the last.
    pub stop_locations: Vec<String>,
    pub journey_start_date: String,
    pub journey_start_time: String,
    pub journey_end_date: String,
    pub journey_end_time: String,
    /// Provider-formatted total in the configured currency.
    pub price: String,
    pub is_refundable: bool,
    pub has_change_penalty: bool,
    /// Departure terminal of the first segment, or `NA`.
    pub gate_no: String,
    /// Aircraft code of the first segment.
    pub flight_code: String,
}

/// Runs flight searches against a [`FlightProvider`].
pub struct Aggregator {
    provider: Arc<dyn FlightProvider>,
    currency: String,
    pacing: Duration,
}

impl Aggregator {
    /// Create an aggregator over `provider`.
    ///
    /// `pacing` is the delay inserted between successive provider calls;
    /// production uses [`DEFAULT_PACING`], tests pass something shorter.
    #[must_use]
    pub fn new(provider: Arc<dyn FlightProvider>, currency: String, pacing: Duration) -> Self {
        Self {
            provider,
            currency,
            pacing,
        }
    }

    /// Run a search and aggregate the provider's offers.
    ///
    /// Offers come back in provider order, at most [`MAX_OFFERS`] of them.
    /// Each offer costs one airline name lookup; for N offers the search
    /// makes exactly N lookups and takes at least (N - 1) pacing delays.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::NoOffers`] if the provider has nothing for the
    /// query, [`SearchError::Provider`] if any provider call fails, and
    /// [`SearchError::Aggregation`] if a payload is malformed. Every failure
    /// discards the entire result; partial lists are never returned.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &SearchQuery) -> Result<Vec<FlightOffer>, SearchError> {
        let offers = self
            .provider
            .search_offers(query, &self.currency, MAX_OFFERS)
            .await?;

        if offers.is_empty() {
            return Err(SearchError::NoOffers);
        }

        let mut results = Vec::with_capacity(offers.len());
        for (index, offer) in offers.iter().enumerate() {
            // Stay under the provider's request-per-second limit
            if index > 0 && !self.pacing.is_zero() {
                tokio::time::sleep(self.pacing).await;
            }
            results.push(self.aggregate_offer(offer).await?);
        }

        Ok(results)
    }

    /// Flatten one provider offer into its display form.
    async fn aggregate_offer(&self, offer: &ProviderOffer) -> Result<FlightOffer, SearchError> {
        let itinerary = offer
            .itineraries
            .first()
            .ok_or_else(|| SearchError::Aggregation("offer has no itineraries".to_owned()))?;

        let first = itinerary
            .segments
            .first()
            .ok_or_else(|| SearchError::Aggregation("itinerary has no segments".to_owned()))?;
        let last = itinerary
            .segments
            .last()
            .ok_or_else(|| SearchError::Aggregation("itinerary has no segments".to_owned()))?;

        let carrier = self.provider.airline_name(&first.carrier_code).await?;

        let number_of_stops = itinerary.segments.len() - 1;
        let stop_locations: Vec<String> = itinerary
            .segments
            .iter()
            .take(number_of_stops)
            .map(|segment| segment.arrival.iata_code.clone())
            .collect();

        let (journey_start_date, journey_start_time) = split_timestamp(&first.departure.at)?;
        let (journey_end_date, journey_end_time) = split_timestamp(&last.arrival.at)?;

        let fare_option = offer
            .traveler_pricings
            .first()
            .map(|pricing| pricing.fare_option.as_str())
            .ok_or_else(|| SearchError::Aggregation("offer has no traveler pricings".to_owned()))?;

        // Both flags derive from the same fare check; the offer views treat
        // them as independent facts.
        let is_refundable = fare_option == "STANDARD";
        let has_change_penalty = fare_option == "STANDARD";

        let gate_no = match first.departure.terminal.as_deref() {
            Some(terminal) if !terminal.is_empty() => terminal.to_owned(),
            _ => GATE_UNKNOWN.to_owned(),
        };

        Ok(FlightOffer {
            departure: first.departure.iata_code.clone(),
            arrival: last.arrival.iata_code.clone(),
            carrier,
            duration: itinerary.duration.clone(),
            number_of_stops,
            stop_locations,
            journey_start_date,
            journey_start_time,
            journey_end_date,
            journey_end_time,
            price: offer.price.total.clone(),
            is_refundable,
            has_change_penalty,
            gate_no,
            flight_code: first.aircraft.code.clone(),
        })
    }
}

/// Split a provider timestamp into display date (`YYYY-MM-DD`) and time (`HH:MM`).
fn split_timestamp(at: &str) -> Result<(String, String), SearchError> {
    let parsed = NaiveDateTime::parse_from_str(at, PROVIDER_TIMESTAMP)
        .map_err(|e| SearchError::Aggregation(format!("bad timestamp {at:?}: {e}")))?;

    Ok((
        parsed.format("%Y-%m-%d").to_string(),
        parsed.format("%H:%M").to_string(),
    ))
}
