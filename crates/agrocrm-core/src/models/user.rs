//! User domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The two mutually exclusive staff roles.
///
/// Managers administer user accounts; salespeople only work with
/// customer records. Serialized as `gerente` / `vendedor` on the wire
/// and in storage.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Role {
    #[serde(rename = "gerente")]
    Manager,
    #[serde(rename = "vendedor")]
    Salesperson,
}

impl Role {
    /// Parse the wire/storage form. Returns `None` for anything that
    /// is not exactly one of the two valid values.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "gerente" => Some(Role::Manager),
            "vendedor" => Some(Role::Salesperson),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Manager => "gerente",
            Role::Salesperson => "vendedor",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    #[serde(rename = "nome")]
    pub name: String,
    pub email: String,
    /// Argon2id PHC string. Never serialized in API responses.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    #[serde(rename = "tipo")]
    pub role: Role,
    #[serde(rename = "ativo")]
    pub active: bool,
    #[serde(rename = "criado_em")]
    pub created_at: DateTime<Utc>,
    /// User that registered this account. The bootstrap admin has
    /// none. Internal bookkeeping only, never part of API responses.
    #[serde(skip_serializing, default)]
    pub created_by: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    /// Raw password (hashed with Argon2id before storage).
    pub password: String,
    pub role: Role,
    pub created_by: Option<Uuid>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub active: Option<bool>,
    /// Re-hashed on apply. Empty strings are ignored by the caller.
    pub password: Option<String>,
}
