//! HTTP route handlers for the booking site.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Landing page with search form
//!
//! # Auth
//! GET  /login                  - Login page
//! POST /login                  - Login action
//! GET  /registration           - Registration page
//! POST /registration           - Registration action
//! GET  /logout                 - Logout action
//!
//! # Flights
//! GET  /search_result          - Flight search results
//! GET  /booking-deal           - Review a single offer before booking
//!
//! # Bookings
//! GET  /save-ticket            - Persist the reviewed offer as a booking
//! GET  /booking/cart           - All bookings for the signed-in user
//! GET  /ticket/preview/{id}    - Printable view of one booking
//! ```
//!
//! Every route is server rendered. Handlers that need a signed-in user
//! branch on [`crate::middleware::AuthState`] (or extract
//! [`crate::middleware::RequireAuth`] when all they do on failure is
//! bounce to the login page).

pub mod auth;
pub mod bookings;
pub mod flights;
pub mod home;

use axum::{Router, response::Redirect, routing::get};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route(
            "/registration",
            get(auth::registration_page).post(auth::register),
        )
        .route("/logout", get(auth::logout))
}

/// Create the flight search routes router.
pub fn flight_routes() -> Router<AppState> {
    Router::new()
        .route("/search_result", get(flights::search_result))
        .route("/booking-deal", get(flights::booking_deal))
}

/// Create the booking routes router.
pub fn booking_routes() -> Router<AppState> {
    Router::new()
        .route("/save-ticket", get(bookings::save_ticket))
        .route("/booking/cart", get(bookings::cart))
        .route("/ticket/preview/{id}", get(bookings::ticket_preview))
}

/// Create all routes for the booking site.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Landing page
        .route("/", get(home::landing))
        // Auth routes
        .merge(auth_routes())
        // Flight search routes
        .merge(flight_routes())
        // Booking routes
        .merge(booking_routes())
}

/// Redirect to the landing page with an error banner.
pub(crate) fn redirect_with_error(message: &str) -> Redirect {
    Redirect::to(&format!("/?error={}", urlencoding::encode(message)))
}

/// Redirect to the landing page with a success banner.
pub(crate) fn redirect_with_success(message: &str) -> Redirect {
    Redirect::to(&format!("/?success={}", urlencoding::encode(message)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn error_redirect_encodes_message() {
        let redirect = redirect_with_error("No flight found");
        let response = axum::response::IntoResponse::into_response(redirect);
        let location = response.headers().get("location").unwrap();
        assert_eq!(location, "/?error=No%20flight%20found");
    }

    #[test]
    fn success_redirect_encodes_message() {
        let redirect = redirect_with_success("Flight booked");
        let response = axum::response::IntoResponse::into_response(redirect);
        let location = response.headers().get("location").unwrap();
        assert_eq!(location, "/?success=Flight%20booked");
    }
}
