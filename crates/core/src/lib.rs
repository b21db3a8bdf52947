//! Domain layer for the FleetFlow trip service.
//!
//! Holds the fleet record types, the error taxonomy, and the trip lifecycle
//! state machine. Nothing in this crate talks to a database directly; storage
//! is reached through the [`trip_lifecycle::TripStore`] trait.

pub mod error;
pub mod fleet;
pub mod trip_lifecycle;
pub mod types;
