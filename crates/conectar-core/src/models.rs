//! Domain models for the marketplace.
//!
//! These are the core types shared across all crates. Wire names follow
//! the public JSON contract (`nombre`, `puntuacion`, ...) while the Rust
//! field names stay in English.

pub mod opinion;
pub mod service;
pub mod service_type;
pub mod technology;
pub mod user;
