//! AgroCRM Core — domain models, repository traits, and the unified
//! error type shared across all crates.

pub mod error;
pub mod models;
pub mod repository;
