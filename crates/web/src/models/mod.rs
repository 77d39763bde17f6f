//! Domain models for tripQuest.

pub mod booking;
pub mod search;
pub mod user;

pub use booking::{Booking, NewBooking};
pub use search::SearchQuery;
pub use user::{NewUser, User};
