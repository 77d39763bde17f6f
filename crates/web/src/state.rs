//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;

use crate::amadeus::{AmadeusClient, FlightProvider};
use crate::config::TripquestConfig;
use crate::db::{BookingStore, PgBookingStore, PgUserStore, UserStore};
use crate::search::{Aggregator, DEFAULT_PACING};
use crate::session::{SESSION_TTL_MINUTES, Sessions};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the stores, the search aggregator, and the
/// session token issuer.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: TripquestConfig,
    /// `None` when the state was assembled from parts for tests.
    pool: Option<PgPool>,
    users: Arc<dyn UserStore>,
    bookings: Arc<dyn BookingStore>,
    sessions: Sessions,
    aggregator: Aggregator,
}

impl AppState {
    /// Create the production state backed by `PostgreSQL` and the Amadeus API.
    ///
    /// # Arguments
    ///
    /// * `config` - Application configuration
    /// * `pool` - `PostgreSQL` connection pool
    #[must_use]
    pub fn new(config: TripquestConfig, pool: PgPool) -> Self {
        let users = Arc::new(PgUserStore::new(pool.clone()));
        let bookings = Arc::new(PgBookingStore::new(pool.clone()));
        let provider: Arc<dyn FlightProvider> = Arc::new(AmadeusClient::new(&config.amadeus));
        let sessions = Sessions::new(
            &config.session_secret,
            chrono::Duration::minutes(SESSION_TTL_MINUTES),
        );
        let aggregator = Aggregator::new(provider, config.currency.clone(), DEFAULT_PACING);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool: Some(pool),
                users,
                bookings,
                sessions,
                aggregator,
            }),
        }
    }

    /// Assemble state from explicit parts.
    ///
    /// Tests use this to inject in-memory stores and scripted providers; no
    /// database pool is attached.
    #[must_use]
    pub fn with_parts(
        config: TripquestConfig,
        users: Arc<dyn UserStore>,
        bookings: Arc<dyn BookingStore>,
        provider: Arc<dyn FlightProvider>,
        sessions: Sessions,
        pacing: Duration,
    ) -> Self {
        let aggregator = Aggregator::new(provider, config.currency.clone(), pacing);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool: None,
                users,
                bookings,
                sessions,
                aggregator,
            }),
        }
    }

    /// Get a reference to the application configuration.
    #[must_use]
    pub fn config(&self) -> &TripquestConfig {
        &self.inner.config
    }

    /// Get the database connection pool, if one is attached.
    #[must_use]
    pub fn pool(&self) -> Option<&PgPool> {
        self.inner.pool.as_ref()
    }

    /// Get the user store.
    #[must_use]
    pub fn users(&self) -> &dyn UserStore {
        &*self.inner.users
    }

    /// Get the booking store.
    #[must_use]
    pub fn bookings(&self) -> &dyn BookingStore {
        &*self.inner.bookings
    }

    /// Get the session token issuer.
    #[must_use]
    pub fn sessions(&self) -> &Sessions {
        &self.inner.sessions
    }

    /// Get the flight search aggregator.
    #[must_use]
    pub fn aggregator(&self) -> &Aggregator {
        &self.inner.aggregator
    }
}
