//! Domain model: entities, commands and value objects.

pub mod commands;
pub mod entities;
pub mod value_objects;
