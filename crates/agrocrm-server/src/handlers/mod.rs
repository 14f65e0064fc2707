//! JSON request handlers.

pub mod auth;
pub mod customer;
pub mod init;

use serde::{Deserialize, Deserializer};

/// Deserialize a field so that an absent key, an explicit `null`, and
/// a value are three distinct states. Pair with `#[serde(default)]`:
/// absent stays `None`, `null` becomes `Some(None)`.
fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(de).map(Some)
}
