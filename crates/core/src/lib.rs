//! # SlotBook Core
//!
//! Domain types and booking logic shared by the API, the database layer and
//! the notifier.
//!
//! - [`availability`]: computes the open hours of a date from rules and bookings
//! - [`validation`]: accepts or refuses a proposed slot and a booking form
//! - [`lifecycle`]: appointment status transitions
//! - [`services`]: the operations exposed by the API, written against the
//!   [`repository`] traits so they run on PostgreSQL or in memory

pub mod availability;
pub mod clock;
pub mod errors;
pub mod lifecycle;
pub mod models;
pub mod notifications;
pub mod repository;
pub mod services;
pub mod validation;
