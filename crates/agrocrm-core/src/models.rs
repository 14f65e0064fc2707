//! Domain models for AgroCRM.
//!
//! These are the core types shared across all crates. Field names are
//! English in Rust; serde renames keep the Portuguese wire format of
//! the public API.

pub mod customer;
pub mod user;
