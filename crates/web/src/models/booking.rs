//! Booking domain types.

use chrono::{DateTime, Utc};

use tripquest_core::{BookingId, UserId};

/// A persisted flight booking (domain type).
///
/// Every field is stored exactly as it appeared on the offer the user booked.
/// Prices stay provider-formatted strings and are never recomputed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booking {
    /// Unique booking ID.
    pub id: BookingId,
    /// Origin IATA code.
    pub departure: String,
    /// Destination IATA code.
    pub arrival: String,
    /// Airline display name resolved at search time.
    pub carrier: String,
    /// Itinerary duration string, e.g. `PT6H15M`.
    pub duration: String,
    pub journey_start_date: String,
    pub journey_start_time: String,
    pub journey_end_date: String,
    pub journey_end_time: String,
    /// Provider-formatted total, e.g. `123.45`.
    pub price: String,
    /// Departure terminal, or `NA` when the provider reported none.
    pub gate_no: String,
    /// Aircraft code of the first segment.
    pub flight_code: String,
    /// Owner of the booking.
    pub user_id: UserId,
    /// When the booking was saved.
    pub created_at: DateTime<Utc>,
}

/// Data required to persist a new booking.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub departure: String,
    pub arrival: String,
    pub carrier: String,
    pub duration: String,
    pub journey_start_date: String,
    pub journey_start_time: String,
    pub journey_end_date: String,
    pub journey_end_time: String,
    pub price: String,
    pub gate_no: String,
    pub flight_code: String,
}
