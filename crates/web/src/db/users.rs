//! Postgres-backed user store.
//!
//! Queries are written against the `users` and `user_password` tables created
//! by the migrations in `crates/web/migrations/`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use tripquest_core::{Email, UserId};

use super::{StoreError, UserStore};
use crate::models::user::{NewUser, User};

/// `PostgreSQL` implementation of [`UserStore`].
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    /// Create a new user store on top of `pool`.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Map a `users` row to the domain type.
fn user_from_row(row: &PgRow) -> Result<User, StoreError> {
    let email: String = row.try_get("email")?;
    let email = Email::parse(&email)
        .map_err(|e| StoreError::DataCorruption(format!("invalid email in database: {e}")))?;

    Ok(User {
        id: UserId::new(row.try_get("id")?),
        firstname: row.try_get("firstname")?,
        lastname: row.try_get("lastname")?,
        email,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
    })
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, new_user: NewUser) -> Result<User, StoreError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            r"
            INSERT INTO users (firstname, lastname, email)
            VALUES ($1, $2, $3)
            RETURNING id, firstname, lastname, email, created_at, updated_at
            ",
        )
        .bind(&new_user.firstname)
        .bind(&new_user.lastname)
        .bind(new_user.email.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return StoreError::Conflict("email already exists".to_owned());
            }
            StoreError::Database(e)
        })?;

        let user = user_from_row(&row)?;

        sqlx::query(
            r"
            INSERT INTO user_password (user_id, password_hash)
            VALUES ($1, $2)
            ",
        )
        .bind(user.id.as_i32())
        .bind(&new_user.password_hash)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(user)
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(
            r"
            SELECT id, firstname, lastname, email, created_at, updated_at
            FROM users
            WHERE email = $1
            ",
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(
            r"
            SELECT id, firstname, lastname, email, created_at, updated_at
            FROM users
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn password_hash(&self, email: &Email) -> Result<Option<(User, String)>, StoreError> {
        let row = sqlx::query(
            r"
            SELECT u.id, u.firstname, u.lastname, u.email,
                   u.created_at, u.updated_at,
                   p.password_hash
            FROM users u
            LEFT JOIN user_password p ON u.id = p.user_id
            WHERE u.email = $1
            ",
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let Some(password_hash) = row.try_get::<Option<String>, _>("password_hash")? else {
            return Ok(None);
        };

        let user = user_from_row(&row)?;

        Ok(Some((user, password_hash)))
    }
}
