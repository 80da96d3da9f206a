//! # HTTP API Layer
//!
//! actix-web application for the identity service: request DTOs and
//! validation, route handlers, the authentication resolver middleware,
//! error mapping and the admin bootstrap seeder.

pub mod app;
pub mod bootstrap;
pub mod config;
pub mod dto;
pub mod middleware;
pub mod routes;
