//! Core business logic and domain layer for the FleetOS identity service.
//!
//! This crate is infrastructure-free: persistence and outbound delivery are
//! reached through the traits in [`repositories`] and [`services::outbound`].

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;
