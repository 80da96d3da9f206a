//! CORS middleware configuration.
//!
//! The service normally sits behind the platform gateway, which owns the
//! real CORS policy; this permissive configuration exists for direct access
//! during development.

use actix_cors::Cors;
use actix_web::http::{header, Method};
use std::env;

/// Creates the CORS middleware for the current environment.
///
/// `ALLOWED_ORIGINS` (comma-separated) restricts origins; without it any
/// origin is accepted.
pub fn create_cors() -> Cors {
    let max_age = env::var("CORS_MAX_AGE")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(3600);

    let cors = Cors::default()
        .allowed_methods(vec![
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allowed_headers(vec![
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
        ])
        .max_age(max_age);

    match env::var("ALLOWED_ORIGINS") {
        Ok(origins) if !origins.is_empty() => {
            let mut cors = cors;
            for origin in origins.split(',').map(str::trim).filter(|o| !o.is_empty()) {
                cors = cors.allowed_origin(origin);
            }
            cors
        }
        _ => cors.allow_any_origin(),
    }
}
