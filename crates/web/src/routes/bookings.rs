//! Booking route handlers.
//!
//! `/save-ticket` persists the offer the user just reviewed, exactly as
//! the review page displayed it. Once saved a booking is a plain record
//! of strings; it never goes back to the flight provider for a fresh
//! quote. The cart and ticket preview read those records back for the
//! signed-in owner only.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use tracing::instrument;

use tripquest_core::BookingId;

use crate::error::{AppError, Result};
use crate::middleware::{AuthState, RequireAuth};
use crate::models::{Booking, NewBooking};
use crate::session;
use crate::state::AppState;

use super::auth::LoginTemplate;
use super::flights::OfferParams;
use super::home::UserView;
use super::{redirect_with_error, redirect_with_success};

impl From<OfferParams> for NewBooking {
    fn from(offer: OfferParams) -> Self {
        Self {
            departure: offer.departure,
            arrival: offer.arrival,
            carrier: offer.carrier,
            duration: offer.duration,
            journey_start_date: offer.journey_start_date,
            journey_start_time: offer.journey_start_time,
            journey_end_date: offer.journey_end_date,
            journey_end_time: offer.journey_end_time,
            price: offer.price,
            gate_no: offer.gate_no,
            flight_code: offer.flight_code,
        }
    }
}

// =============================================================================
// View Types
// =============================================================================

/// Booking display data for templates.
pub struct BookingView {
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
    pub preview_url: String,
}

impl From<&Booking> for BookingView {
    fn from(booking: &Booking) -> Self {
        Self {
            departure: booking.departure.clone(),
            arrival: booking.arrival.clone(),
            carrier: booking.carrier.clone(),
            duration: booking.duration.clone(),
            journey_start_date: booking.journey_start_date.clone(),
            journey_start_time: booking.journey_start_time.clone(),
            journey_end_date: booking.journey_end_date.clone(),
            journey_end_time: booking.journey_end_time.clone(),
            price: booking.price.clone(),
            gate_no: booking.gate_no.clone(),
            flight_code: booking.flight_code.clone(),
            preview_url: format!("/ticket/preview/{}", booking.id.as_i32()),
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Booking cart template.
#[derive(Template, WebTemplate)]
#[template(path = "booking/cart.html")]
pub struct CartTemplate {
    pub title: String,
    pub user: UserView,
    pub bookings: Vec<BookingView>,
}

/// Printable ticket template.
#[derive(Template, WebTemplate)]
#[template(path = "booking/ticket.html")]
pub struct TicketTemplate {
    pub title: String,
    pub user: UserView,
    pub booking: BookingView,
}

// =============================================================================
// Handlers
// =============================================================================

/// Persist the reviewed offer as a booking for the signed-in user.
#[instrument(skip(state, jar, offer))]
pub async fn save_ticket(
    State(state): State<AppState>,
    auth: AuthState,
    jar: CookieJar,
    Query(offer): Query<OfferParams>,
) -> Response {
    let current = match auth {
        AuthState::Authenticated(current) => current,
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
    };

    match state
        .bookings()
        .create(NewBooking::from(offer), current.id)
        .await
    {
        Ok(booking) => {
            tracing::info!(
                booking_id = booking.id.as_i32(),
                user_id = current.id.as_i32(),
                "flight booked"
            );
            redirect_with_success("Flight booked").into_response()
        }
        Err(e) => {
            tracing::error!("failed to save booking: {e}");
            redirect_with_error("An error occured during booking, try again").into_response()
        }
    }
}

/// Display all bookings for the signed-in user.
#[instrument(skip(state))]
pub async fn cart(State(state): State<AppState>, RequireAuth(current): RequireAuth) -> Response {
    let user = match state.users().find_by_id(current.id).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            tracing::warn!(user_id = current.id.as_i32(), "cart for unknown user");
            return Redirect::to("/").into_response();
        }
        Err(e) => {
            tracing::error!("failed to load user for cart: {e}");
            return Redirect::to("/").into_response();
        }
    };

    let bookings = match state.bookings().find_by_owner(current.id).await {
        Ok(bookings) => bookings,
        Err(e) => {
            tracing::error!("failed to load bookings for cart: {e}");
            return Redirect::to("/").into_response();
        }
    };

    CartTemplate {
        title: format!("{} Booking details • tripQuest", user.firstname),
        user: UserView::from(&user),
        bookings: bookings.iter().map(BookingView::from).collect(),
    }
    .into_response()
}

/// Display one booking as a printable ticket.
///
/// Another user's booking is reported the same as a missing one.
#[instrument(skip(state))]
pub async fn ticket_preview(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Path(id): Path<i32>,
) -> Result<Response> {
    let user = state
        .users()
        .find_by_id(current.id)
        .await?
        .ok_or_else(|| AppError::NotFound("user".to_string()))?;

    let booking = state
        .bookings()
        .find_by_id(BookingId::new(id))
        .await?
        .filter(|booking| booking.user_id == current.id)
        .ok_or_else(|| AppError::NotFound(format!("booking {id}")))?;

    Ok(TicketTemplate {
        title: format!(
            "{}: {} - {} • Booking details • tripQuest",
            user.firstname, booking.departure, booking.arrival
        ),
        user: UserView::from(&user),
        booking: BookingView::from(&booking),
    }
    .into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;

    use tripquest_core::UserId;

    use super::*;

    #[test]
    fn offer_params_become_a_new_booking() {
        let offer = OfferParams {
            departure: "LOS".to_string(),
            arrival: "LHR".to_string(),
            carrier: "BRITISH AIRWAYS".to_string(),
            duration: "PT6H50M".to_string(),
            journey_start_date: "2025-09-01".to_string(),
            journey_start_time: "08:15".to_string(),
            journey_end_date: "2025-09-01".to_string(),
            journey_end_time: "15:05".to_string(),
            price: "540000.00".to_string(),
            gate_no: "5".to_string(),
            flight_code: "82".to_string(),
        };

        let booking = NewBooking::from(offer);
        assert_eq!(booking.departure, "LOS");
        assert_eq!(booking.gate_no, "5");
        assert_eq!(booking.flight_code, "82");
    }

    #[test]
    fn booking_view_links_to_its_preview() {
        let booking = Booking {
            id: BookingId::new(31),
            departure: "LOS".to_string(),
            arrival: "LHR".to_string(),
            carrier: "BRITISH AIRWAYS".to_string(),
            duration: "PT6H50M".to_string(),
            journey_start_date: "2025-09-01".to_string(),
            journey_start_time: "08:15".to_string(),
            journey_end_date: "2025-09-01".to_string(),
            journey_end_time: "15:05".to_string(),
            price: "540000.00".to_string(),
            gate_no: "NA".to_string(),
            flight_code: "82".to_string(),
            user_id: UserId::new(4),
            created_at: Utc::now(),
        };

        let view = BookingView::from(&booking);
        assert_eq!(view.preview_url, "/ticket/preview/31");
        assert_eq!(view.gate_no, "NA");
    }
}
