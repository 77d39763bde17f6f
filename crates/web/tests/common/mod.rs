//! Shared fixtures for the booking site flow tests.
//!
//! The whole site runs in process: handlers reach in-memory stores and
//! a scripted flight provider through the same traits the `PostgreSQL`
//! and Amadeus implementations use, so a request exercises every layer
//! except the real network edges.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicI32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{Request, StatusCode};
use axum::response::Response;
use chrono::Utc;
use http_body_util::BodyExt;
use secrecy::SecretString;
use tower::ServiceExt;

use tripquest_core::{BookingId, Email, UserId};
use tripquest_web::amadeus::types::{
    Aircraft, FlightOffer, Itinerary, Price, Segment, SegmentEndpoint, TravelerPricing,
};
use tripquest_web::amadeus::{AmadeusError, FlightProvider};
use tripquest_web::config::{AmadeusConfig, TripquestConfig};
use tripquest_web::db::{BookingStore, StoreError, UserStore};
use tripquest_web::models::{Booking, NewBooking, NewUser, SearchQuery, User};
use tripquest_web::session::{SESSION_TTL_MINUTES, Sessions};
use tripquest_web::{AppState, app};

/// Session signing secret shared by the app under test and forged tokens.
pub const SESSION_SECRET: &str = "kT9#mW2$xQ7!pL4@nR8&vB3*zD6^hJ1%";

/// Password used by every registered test user.
pub const PASSWORD: &str = "S3curePass1";

/// Configuration for an in-process app. Built directly, never validated
/// against the environment.
pub fn test_config() -> TripquestConfig {
    TripquestConfig {
        database_url: SecretString::from("postgres://localhost/tripquest_test"),
        host: "127.0.0.1".parse().expect("host"),
        port: 1234,
        session_secret: SecretString::from(SESSION_SECRET),
        currency: "NGN".to_string(),
        amadeus: AmadeusConfig {
            base_url: "https://test.api.amadeus.com".to_string(),
            client_id: "test-client".to_string(),
            client_secret: SecretString::from("test-secret"),
        },
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

// =============================================================================
// In-Memory Stores
// =============================================================================

/// `UserStore` backed by a `Vec`, with the same conflict semantics as
/// the `PostgreSQL` implementation.
#[derive(Default)]
pub struct InMemoryUsers {
    rows: Mutex<Vec<(User, String)>>,
    next_id: AtomicI32,
}

impl InMemoryUsers {
    /// Number of stored users.
    pub fn count(&self) -> usize {
        self.rows.lock().expect("users lock").len()
    }

    /// Stored password digest for `email`, if any.
    pub fn stored_hash(&self, email: &Email) -> Option<String> {
        self.rows
            .lock()
            .expect("users lock")
            .iter()
            .find(|(user, _)| user.email == *email)
            .map(|(_, hash)| hash.clone())
    }
}

#[async_trait]
impl UserStore for InMemoryUsers {
    async fn create(&self, new_user: NewUser) -> Result<User, StoreError> {
        let mut rows = self.rows.lock().expect("users lock");
        if rows.iter().any(|(user, _)| user.email == new_user.email) {
            return Err(StoreError::Conflict("email already exists".to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: UserId::new(self.next_id.fetch_add(1, Ordering::SeqCst) + 1),
            firstname: new_user.firstname,
            lastname: new_user.lastname,
            email: new_user.email,
            created_at: now,
            updated_at: now,
        };
        rows.push((user.clone(), new_user.password_hash));
        Ok(user)
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, StoreError> {
        Ok(self
            .rows
            .lock()
            .expect("users lock")
            .iter()
            .find(|(user, _)| user.email == *email)
            .map(|(user, _)| user.clone()))
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self
            .rows
            .lock()
            .expect("users lock")
            .iter()
            .find(|(user, _)| user.id == id)
            .map(|(user, _)| user.clone()))
    }

    async fn password_hash(&self, email: &Email) -> Result<Option<(User, String)>, StoreError> {
        Ok(self
            .rows
            .lock()
            .expect("users lock")
            .iter()
            .find(|(user, _)| user.email == *email)
            .cloned())
    }
}

/// `BookingStore` backed by a `Vec`.
#[derive(Default)]
pub struct InMemoryBookings {
    rows: Mutex<Vec<Booking>>,
    next_id: AtomicI32,
}

impl InMemoryBookings {
    /// Snapshot of every stored booking.
    pub fn all(&self) -> Vec<Booking> {
        self.rows.lock().expect("bookings lock").clone()
    }
}

#[async_trait]
impl BookingStore for InMemoryBookings {
    async fn create(&self, booking: NewBooking, owner: UserId) -> Result<Booking, StoreError> {
        let row = Booking {
            id: BookingId::new(self.next_id.fetch_add(1, Ordering::SeqCst) + 1),
            departure: booking.departure,
            arrival: booking.arrival,
            carrier: booking.carrier,
            duration: booking.duration,
            journey_start_date: booking.journey_start_date,
            journey_start_time: booking.journey_start_time,
            journey_end_date: booking.journey_end_date,
            journey_end_time: booking.journey_end_time,
            price: booking.price,
            gate_no: booking.gate_no,
            flight_code: booking.flight_code,
            user_id: owner,
            created_at: Utc::now(),
        };
        self.rows.lock().expect("bookings lock").push(row.clone());
        Ok(row)
    }

    async fn find_by_owner(&self, owner: UserId) -> Result<Vec<Booking>, StoreError> {
        Ok(self
            .rows
            .lock()
            .expect("bookings lock")
            .iter()
            .filter(|booking| booking.user_id == owner)
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: BookingId) -> Result<Option<Booking>, StoreError> {
        Ok(self
            .rows
            .lock()
            .expect("bookings lock")
            .iter()
            .find(|booking| booking.id == id)
            .cloned())
    }
}

// =============================================================================
// Scripted Flight Provider
// =============================================================================

/// Flight provider that returns a fixed set of offers and resolves a
/// couple of well-known carrier codes.
pub struct ScriptedProvider {
    offers: Vec<FlightOffer>,
}

impl ScriptedProvider {
    pub fn with_offers(offers: Vec<FlightOffer>) -> Self {
        Self { offers }
    }

    pub fn empty() -> Self {
        Self { offers: Vec::new() }
    }
}

#[async_trait]
impl FlightProvider for ScriptedProvider {
    async fn search_offers(
        &self,
        _query: &SearchQuery,
        _currency: &str,
        max: u32,
    ) -> Result<Vec<FlightOffer>, AmadeusError> {
        Ok(self.offers.iter().take(max as usize).cloned().collect())
    }

    async fn airline_name(&self, carrier_code: &str) -> Result<String, AmadeusError> {
        match carrier_code {
            "BA" => Ok("BRITISH AIRWAYS".to_string()),
            "KL" => Ok("KLM ROYAL DUTCH AIRLINES".to_string()),
            other => Err(AmadeusError::UnknownAirline(other.to_string())),
        }
    }
}

/// A direct LOS -> LHR offer as the provider would price it.
///
/// Aggregates to carrier `BRITISH AIRWAYS`, gate `I`, flight code `788`.
pub fn provider_offer() -> FlightOffer {
    FlightOffer {
        itineraries: vec![Itinerary {
            duration: "PT6H50M".to_string(),
            segments: vec![Segment {
                departure: SegmentEndpoint {
                    iata_code: "LOS".to_string(),
                    terminal: Some("I".to_string()),
                    at: "2025-09-01T08:15:00".to_string(),
                },
                arrival: SegmentEndpoint {
                    iata_code: "LHR".to_string(),
                    terminal: Some("5".to_string()),
                    at: "2025-09-01T15:05:00".to_string(),
                },
                carrier_code: "BA".to_string(),
                aircraft: Aircraft {
                    code: "788".to_string(),
                },
            }],
        }],
        price: Price {
            total: "540000.00".to_string(),
        },
        traveler_pricings: vec![TravelerPricing {
            fare_option: "STANDARD".to_string(),
        }],
    }
}

// =============================================================================
// App Assembly
// =============================================================================

/// The router under test plus handles to its backing stores.
pub struct TestApp {
    pub router: Router,
    pub users: Arc<InMemoryUsers>,
    pub bookings: Arc<InMemoryBookings>,
}

/// Build an app around `provider` with zero pacing delay.
pub fn test_app_with_provider(provider: ScriptedProvider) -> TestApp {
    let users = Arc::new(InMemoryUsers::default());
    let bookings = Arc::new(InMemoryBookings::default());
    let sessions = Sessions::new(
        &SecretString::from(SESSION_SECRET),
        chrono::Duration::minutes(SESSION_TTL_MINUTES),
    );
    let state = AppState::with_parts(
        test_config(),
        users.clone(),
        bookings.clone(),
        Arc::new(provider),
        sessions,
        Duration::ZERO,
    );
    TestApp {
        router: app(state),
        users,
        bookings,
    }
}

/// Build an app whose provider returns the standard direct offer.
pub fn test_app() -> TestApp {
    test_app_with_provider(ScriptedProvider::with_offers(vec![provider_offer()]))
}

// =============================================================================
// Request Helpers
// =============================================================================

/// GET request carrying `cookies` (each a `name=value` pair).
pub fn get(uri: &str, cookies: &[&str]) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if !cookies.is_empty() {
        builder = builder.header(COOKIE, cookies.join("; "));
    }
    builder.body(Body::empty()).expect("request")
}

/// POST form request carrying `cookies`.
pub fn post_form(uri: &str, body: &str, cookies: &[&str]) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded");
    if !cookies.is_empty() {
        builder = builder.header(COOKIE, cookies.join("; "));
    }
    builder.body(Body::from(body.to_string())).expect("request")
}

/// The `name=value` pair of the `Set-Cookie` header for `name`, ready to
/// send back in a `Cookie` header.
pub fn cookie_value(response: &Response, name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .find_map(|header| {
            let pair = header.to_str().ok()?.split(';').next()?.trim();
            pair.strip_prefix(prefix.as_str())
                .map(|value| format!("{name}={value}"))
        })
}

/// Whether the response tells the client to drop the cookie `name`.
pub fn clears_cookie(response: &Response, name: &str) -> bool {
    let prefix = format!("{name}=");
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|header| header.to_str().ok())
        .any(|header| header.starts_with(&prefix) && header.contains("Max-Age=0"))
}

/// `Location` header of a redirect response.
pub fn location(response: &Response) -> &str {
    response
        .headers()
        .get("location")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}

/// Collect the response body into a string.
pub async fn body_string(response: Response) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

/// Register a user through the registration form.
pub async fn register(router: &Router, firstname: &str, email: &str) {
    let form = format!("firstname={firstname}&lastname=Tester&usermail={email}&password={PASSWORD}");
    let response = router
        .clone()
        .oneshot(post_form("/registration", &form, &[]))
        .await
        .expect("registration");
    assert_eq!(response.status(), StatusCode::OK);
}

/// Log a registered user in, returning the session cookie pair.
pub async fn login(router: &Router, email: &str, cookies: &[&str]) -> String {
    let form = format!("usermail={email}&password={PASSWORD}");
    let response = router
        .clone()
        .oneshot(post_form("/login", &form, cookies))
        .await
        .expect("login");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    cookie_value(&response, "tripQuestToken").expect("session cookie")
}

/// Register and log in a fresh user, returning the session cookie pair.
pub async fn register_and_login(router: &Router, firstname: &str, email: &str) -> String {
    register(router, firstname, email).await;
    login(router, email, &[]).await
}
