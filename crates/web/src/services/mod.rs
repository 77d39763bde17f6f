//! Business logic services for tripQuest.
//!
//! # Services
//!
//! - `auth` - Registration and password login

pub mod auth;
