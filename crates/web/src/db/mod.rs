//! Database operations for tripQuest `PostgreSQL`.
//!
//! # Tables
//!
//! - `users` - registered accounts
//! - `user_password` - password digests, one row per user
//! - `bookings` - persisted flight bookings
//!
//! Handlers reach the database through the [`UserStore`] and [`BookingStore`]
//! traits; tests swap in in-memory implementations.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/web/migrations/` and run via:
//! ```bash
//! cargo run -p tripquest-cli -- migrate
//! ```

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use tripquest_core::{BookingId, Email, UserId};

use crate::models::booking::{Booking, NewBooking};
use crate::models::user::{NewUser, User};

pub mod bookings;
pub mod users;

pub use bookings::PgBookingStore;
pub use users::PgUserStore;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database connection or query failed
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Stored data failed domain validation
    #[error("Data corruption: {0}")]
    DataCorruption(String),

    /// Entity not found
    #[error("Not found")]
    NotFound,

    /// Unique constraint violation
    #[error("Conflict: {0}")]
    Conflict(String),
}

/// Access to registered users and their password digests.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Create a new user together with their password digest.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] if the email is already registered.
    async fn create(&self, new_user: NewUser) -> Result<User, StoreError>;

    /// Look up a user by email address.
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, StoreError>;

    /// Look up a user by id.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError>;

    /// Fetch a user together with their password digest for login checks.
    ///
    /// Returns `None` if the user doesn't exist or has no password set.
    async fn password_hash(&self, email: &Email) -> Result<Option<(User, String)>, StoreError>;
}

/// Access to persisted bookings. Bookings are never updated or deleted.
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Persist a booking for `owner`, returning the stored row.
    async fn create(&self, booking: NewBooking, owner: UserId) -> Result<Booking, StoreError>;

    /// All bookings owned by `owner`, oldest first.
    async fn find_by_owner(&self, owner: UserId) -> Result<Vec<Booking>, StoreError>;

    /// Look up a single booking by id.
    async fn find_by_id(&self, id: BookingId) -> Result<Option<Booking>, StoreError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
