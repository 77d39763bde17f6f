//! User domain types.
//!
//! These types represent validated domain objects separate from database row types.

use chrono::{DateTime, Utc};

use tripquest_core::{Email, UserId};

/// A registered tripQuest user (domain type).
///
/// The password digest lives in its own table and never travels with this type.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// User's first name, as entered at registration.
    pub firstname: String,
    /// User's last name.
    pub lastname: String,
    /// User's email address.
    pub email: Email,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Data required to create a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub firstname: String,
    pub lastname: String,
    pub email: Email,
    /// Argon2 digest of the password, never the plaintext.
    pub password_hash: String,
}
