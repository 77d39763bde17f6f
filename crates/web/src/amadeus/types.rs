//! Wire types for the Amadeus self-service REST APIs.
//!
//! Field names mirror the JSON payloads (camelCase). Only the fields the
//! search aggregator consumes are modeled; everything else in the payload is
//! ignored during deserialization.

use serde::Deserialize;

/// OAuth2 token response from `/v1/security/oauth2/token`.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    /// Bearer token for subsequent requests.
    pub access_token: String,
    /// Lifetime of the token in seconds.
    pub expires_in: u64,
}

/// Envelope for `/v2/shopping/flight-offers`.
#[derive(Debug, Deserialize)]
pub struct FlightOffersResponse {
    /// Priced offers, in provider ranking order.
    #[serde(default)]
    pub data: Vec<FlightOffer>,
}

/// A single priced offer.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightOffer {
    /// One itinerary per direction; one-way searches have exactly one.
    pub itineraries: Vec<Itinerary>,
    pub price: Price,
    /// Per-traveler fare details; the first entry drives the fare flags.
    pub traveler_pricings: Vec<TravelerPricing>,
}

/// An ordered sequence of flight segments.
#[derive(Debug, Clone, Deserialize)]
pub struct Itinerary {
    /// ISO 8601 duration, e.g. `PT6H15M`.
    pub duration: String,
    pub segments: Vec<Segment>,
}

/// One flight leg.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub departure: SegmentEndpoint,
    pub arrival: SegmentEndpoint,
    /// Two-letter airline code, e.g. `KL`.
    pub carrier_code: String,
    pub aircraft: Aircraft,
}

/// Departure or arrival point of a segment.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentEndpoint {
    /// Airport IATA code, e.g. `LOS`.
    pub iata_code: String,
    /// Terminal, when the airport reports one.
    #[serde(default)]
    pub terminal: Option<String>,
    /// Local timestamp without offset, e.g. `2025-09-01T07:35:00`.
    pub at: String,
}

/// Aircraft operating a segment.
#[derive(Debug, Clone, Deserialize)]
pub struct Aircraft {
    /// IATA aircraft type code, e.g. `788`.
    pub code: String,
}

/// Offer price.
#[derive(Debug, Clone, Deserialize)]
pub struct Price {
    /// Formatted total in the requested currency, e.g. `1254.30`.
    pub total: String,
}

/// Fare details for one traveler.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelerPricing {
    /// Fare option, e.g. `STANDARD`.
    pub fare_option: String,
}

/// Envelope for `/v1/reference-data/airlines`.
#[derive(Debug, Deserialize)]
pub struct AirlinesResponse {
    #[serde(default)]
    pub data: Vec<Airline>,
}

/// Airline reference data record.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Airline {
    /// Two-letter IATA code.
    pub iata_code: String,
    /// Registered airline name, e.g. `KLM ROYAL DUTCH AIRLINES`.
    pub business_name: String,
}
