//! Flight search route handlers.
//!
//! `/search_result` is the only page reachable by both anonymous and
//! signed-in visitors: an anonymous search is stashed in the deferred
//! query cookie and the visitor is bounced to the login page, so the
//! results appear right after they sign in. `/booking-deal` re-reads a
//! single offer from its query string and shows it for review before
//! the save step.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use tracing::instrument;

use crate::error::add_breadcrumb;
use crate::middleware::AuthState;
use crate::models::SearchQuery;
use crate::search::{FlightOffer, SearchError};
use crate::session;
use crate::state::AppState;

use super::auth::LoginTemplate;
use super::redirect_with_error;

// =============================================================================
// Query Types
// =============================================================================

/// Raw search parameters from the landing page form.
///
/// Every field is optional: when the URL carries no parameters the
/// handler falls back to the deferred query cookie, and a rejection
/// here would turn that flow into a 400.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(rename = "Location")]
    pub location: Option<String>,
    #[serde(rename = "Destination")]
    pub destination: Option<String>,
    pub date: Option<String>,
    pub travelers: Option<String>,
}

impl SearchParams {
    /// Assemble a complete query, or `None` if any field is missing.
    fn into_query(self) -> Option<SearchQuery> {
        Some(SearchQuery {
            origin: self.location?,
            destination: self.destination?,
            date: self.date?,
            travelers: self.travelers?,
        })
    }
}

/// A single offer flattened into query parameters.
///
/// The results page serializes each offer into its booking link, and
/// the review and save handlers read the same shape back. Only the
/// fields that end up on a ticket survive the round trip; stop counts
/// and fare flags stay on the results page.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferParams {
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

impl From<&FlightOffer> for OfferParams {
    fn from(offer: &FlightOffer) -> Self {
        Self {
            departure: offer.departure.clone(),
            arrival: offer.arrival.clone(),
            carrier: offer.carrier.clone(),
            duration: offer.duration.clone(),
            journey_start_date: offer.journey_start_date.clone(),
            journey_start_time: offer.journey_start_time.clone(),
            journey_end_date: offer.journey_end_date.clone(),
            journey_end_time: offer.journey_end_time.clone(),
            price: offer.price.clone(),
            gate_no: offer.gate_no.clone(),
            flight_code: offer.flight_code.clone(),
        }
    }
}

/// Serialize an offer into a link under `path`.
fn offer_link(path: &str, offer: &OfferParams) -> String {
    format!(
        "{path}?departure={}&arrival={}&carrier={}&duration={}&journeyStartDate={}&journeyStartTime={}&journeyEndDate={}&journeyEndTime={}&price={}&gateNo={}&flightCode={}",
        urlencoding::encode(&offer.departure),
        urlencoding::encode(&offer.arrival),
        urlencoding::encode(&offer.carrier),
        urlencoding::encode(&offer.duration),
        urlencoding::encode(&offer.journey_start_date),
        urlencoding::encode(&offer.journey_start_time),
        urlencoding::encode(&offer.journey_end_date),
        urlencoding::encode(&offer.journey_end_time),
        urlencoding::encode(&offer.price),
        urlencoding::encode(&offer.gate_no),
        urlencoding::encode(&offer.flight_code),
    )
}

// =============================================================================
// View Types
// =============================================================================

/// Offer display data plus its booking link.
pub struct OfferView {
    pub offer: FlightOffer,
    pub booking_url: String,
}

impl From<&FlightOffer> for OfferView {
    fn from(offer: &FlightOffer) -> Self {
        Self {
            booking_url: offer_link("/booking-deal", &OfferParams::from(offer)),
            offer: offer.clone(),
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Search results template.
#[derive(Template, WebTemplate)]
#[template(path = "search/results.html")]
pub struct SearchResultTemplate {
    pub title: String,
    /// Travel date echoed above the results list.
    pub date: String,
    pub offers: Vec<OfferView>,
}

/// Booking review template.
#[derive(Template, WebTemplate)]
#[template(path = "booking/review.html")]
pub struct BookingDealTemplate {
    pub title: String,
    /// Link that persists this offer as a booking.
    pub save_url: String,
    pub offer: OfferParams,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display flight search results.
///
/// A deferred query cookie takes precedence over URL parameters and is
/// cleared as soon as it is read, so a stale search cannot shadow a
/// fresh one later.
#[instrument(skip(state, jar, params))]
pub async fn search_result(
    State(state): State<AppState>,
    auth: AuthState,
    jar: CookieJar,
    Query(params): Query<SearchParams>,
) -> Response {
    let deferred = jar
        .get(session::QUERY_COOKIE)
        .map(|cookie| cookie.value().to_owned());
    let (jar, search) = match deferred {
        Some(value) => (
            jar.add(session::query_removal()),
            session::parse_deferred_query(&value),
        ),
        None => (jar, params.into_query()),
    };

    match auth {
        AuthState::Authenticated(_) => {}
        AuthState::Expired => {
            let jar = defer_search(jar.add(session::session_removal()), search.as_ref());
            return (jar, LoginTemplate::with_error("Session expired")).into_response();
        }
        AuthState::Anonymous => {
            let jar = defer_search(jar, search.as_ref());
            return (jar, LoginTemplate::with_error("Please Login")).into_response();
        }
    }

    let Some(search) = search else {
        tracing::warn!("search request without a usable query");
        return (jar, Redirect::to("/")).into_response();
    };

    add_breadcrumb(
        "search",
        "flight search",
        Some(&[
            ("origin", &search.origin),
            ("destination", &search.destination),
            ("date", &search.date),
        ]),
    );

    match state.aggregator().search(&search).await {
        Ok(offers) => {
            let title = format!(
                "{} - {} | tripQuest Booking Service",
                search.origin, search.destination
            );
            let offers = offers.iter().map(OfferView::from).collect();
            (
                jar,
                SearchResultTemplate {
                    title,
                    date: search.date,
                    offers,
                },
            )
                .into_response()
        }
        Err(SearchError::NoOffers) => (jar, redirect_with_error("No flight found")).into_response(),
        Err(e) => {
            tracing::error!("flight search failed: {e}");
            (
                jar,
                redirect_with_error("Something went wrong, try again"),
            )
                .into_response()
        }
    }
}

/// Stash the pending query in a cookie so login can replay it.
fn defer_search(jar: CookieJar, search: Option<&SearchQuery>) -> CookieJar {
    let Some(search) = search else {
        return jar;
    };
    match session::deferred_query_cookie(search) {
        Ok(cookie) => jar.add(cookie),
        Err(e) => {
            tracing::warn!("failed to defer search query: {e}");
            jar
        }
    }
}

/// Display the booking review page for one offer.
pub async fn booking_deal(
    auth: AuthState,
    jar: CookieJar,
    Query(offer): Query<OfferParams>,
) -> Response {
    match auth {
        AuthState::Authenticated(_) => {}
        AuthState::Expired => {
            return (
                jar.add(session::session_removal()),
                LoginTemplate::with_error("Session expired"),
            )
                .into_response();
        }
        AuthState::Anonymous => {
            return LoginTemplate::with_error("Please login").into_response();
        }
    }

    BookingDealTemplate {
        title: format!("{} - {} booking review", offer.departure, offer.arrival),
        save_url: offer_link("/save-ticket", &offer),
        offer,
    }
    .into_response()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_offer() -> FlightOffer {
        FlightOffer {
            departure: "LOS".to_string(),
            arrival: "LHR".to_string(),
            carrier: "BRITISH AIRWAYS".to_string(),
            duration: "PT6H50M".to_string(),
            number_of_stops: 0,
            stop_locations: Vec::new(),
            journey_start_date: "2025-09-01".to_string(),
            journey_start_time: "08:15".to_string(),
            journey_end_date: "2025-09-01".to_string(),
            journey_end_time: "15:05".to_string(),
            price: "540000.00".to_string(),
            is_refundable: true,
            has_change_penalty: true,
            gate_no: "5".to_string(),
            flight_code: "82".to_string(),
        }
    }

    #[test]
    fn booking_link_encodes_every_field() {
        let view = OfferView::from(&sample_offer());
        assert!(view.booking_url.starts_with("/booking-deal?departure=LOS"));
        assert!(view.booking_url.contains("carrier=BRITISH%20AIRWAYS"));
        assert!(view.booking_url.contains("journeyStartTime=08%3A15"));
        assert!(view.booking_url.contains("flightCode=82"));
    }

    #[test]
    fn save_link_mirrors_booking_link_fields() {
        let offer = OfferParams::from(&sample_offer());
        let url = offer_link("/save-ticket", &offer);
        assert!(url.starts_with("/save-ticket?departure=LOS"));
        assert!(url.contains("gateNo=5"));
    }

    #[test]
    fn partial_params_do_not_form_a_query() {
        let params = SearchParams {
            location: Some("LOS".to_string()),
            destination: Some("LHR".to_string()),
            date: None,
            travelers: Some("1".to_string()),
        };
        assert!(params.into_query().is_none());
    }

    #[test]
    fn complete_params_form_a_query() {
        let params = SearchParams {
            location: Some("LOS".to_string()),
            destination: Some("LHR".to_string()),
            date: Some("2025-09-01".to_string()),
            travelers: Some("2".to_string()),
        };
        let query = params.into_query().unwrap();
        assert_eq!(query.origin, "LOS");
        assert_eq!(query.travelers, "2");
    }
}
