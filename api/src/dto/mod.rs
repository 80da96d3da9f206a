//! Request and response DTOs.

pub mod auth_dto;
pub mod error_dto;
pub mod user_dto;
