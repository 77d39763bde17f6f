//! Postgres-backed booking store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use tripquest_core::{BookingId, UserId};

use super::{BookingStore, StoreError};
use crate::models::booking::{Booking, NewBooking};

/// `PostgreSQL` implementation of [`BookingStore`].
#[derive(Clone)]
pub struct PgBookingStore {
    pool: PgPool,
}

impl PgBookingStore {
    /// Create a new booking store on top of `pool`.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Map a `bookings` row to the domain type.
fn booking_from_row(row: &PgRow) -> Result<Booking, StoreError> {
    Ok(Booking {
        id: BookingId::new(row.try_get("id")?),
        departure: row.try_get("departure")?,
        arrival: row.try_get("arrival")?,
        carrier: row.try_get("carrier")?,
        duration: row.try_get("duration")?,
        journey_start_date: row.try_get("journey_start_date")?,
        journey_start_time: row.try_get("journey_start_time")?,
        journey_end_date: row.try_get("journey_end_date")?,
        journey_end_time: row.try_get("journey_end_time")?,
        price: row.try_get("price")?,
        gate_no: row.try_get("gate_no")?,
        flight_code: row.try_get("flight_code")?,
        user_id: UserId::new(row.try_get("user_id")?),
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}

#[async_trait]
impl BookingStore for PgBookingStore {
    async fn create(&self, booking: NewBooking, owner: UserId) -> Result<Booking, StoreError> {
        let row = sqlx::query(
            r"
            INSERT INTO bookings (
                departure, arrival, carrier, duration,
                journey_start_date, journey_start_time,
                journey_end_date, journey_end_time,
                price, gate_no, flight_code, user_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING id, departure, arrival, carrier, duration,
                      journey_start_date, journey_start_time,
                      journey_end_date, journey_end_time,
                      price, gate_no, flight_code, user_id, created_at
            ",
        )
        .bind(&booking.departure)
        .bind(&booking.arrival)
        .bind(&booking.carrier)
        .bind(&booking.duration)
        .bind(&booking.journey_start_date)
        .bind(&booking.journey_start_time)
        .bind(&booking.journey_end_date)
        .bind(&booking.journey_end_time)
        .bind(&booking.price)
        .bind(&booking.gate_no)
        .bind(&booking.flight_code)
        .bind(owner.as_i32())
        .fetch_one(&self.pool)
        .await?;

        booking_from_row(&row)
    }

    async fn find_by_owner(&self, owner: UserId) -> Result<Vec<Booking>, StoreError> {
        let rows = sqlx::query(
            r"
            SELECT id, departure, arrival, carrier, duration,
                   journey_start_date, journey_start_time,
                   journey_end_date, journey_end_time,
                   price, gate_no, flight_code, user_id, created_at
            FROM bookings
            WHERE user_id = $1
            ORDER BY id
            ",
        )
        .bind(owner.as_i32())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(booking_from_row).collect()
    }

    async fn find_by_id(&self, id: BookingId) -> Result<Option<Booking>, StoreError> {
        let row = sqlx::query(
            r"
            SELECT id, departure, arrival, carrier, duration,
                   journey_start_date, journey_start_time,
                   journey_end_date, journey_end_time,
                   price, gate_no, flight_code, user_id, created_at
            FROM bookings
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(booking_from_row).transpose()
    }
}
