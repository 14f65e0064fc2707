//! SurrealDB implementation of [`UserRepository`].
//!
//! Password hashing uses Argon2id with OWASP-recommended parameters
//! (memory: 19 MiB, iterations: 2, parallelism: 1). Salt is randomly
//! generated per hash. An optional pepper (server-side secret) can be
//! provided at construction time.
//!
//! Email uniqueness is pre-checked in the application, but the unique
//! index on `user.email` remains the final arbiter: an index violation
//! raised by the store is still surfaced as a duplicate, never as an
//! internal error.

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHasher};
use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use agrocrm_core::error::CrmResult;
use agrocrm_core::models::user::{CreateUser, Role, UpdateUser, User};
use agrocrm_core::repository::UserRepository;

use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct UserRow {
    name: String,
    email: String,
    password_hash: String,
    role: String,
    active: bool,
    created_at: DateTime<Utc>,
    created_by: Option<String>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct UserRowWithId {
    record_id: String,
    name: String,
    email: String,
    password_hash: String,
    role: String,
    active: bool,
    created_at: DateTime<Utc>,
    created_by: Option<String>,
}

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

fn parse_role(s: &str) -> Result<Role, DbError> {
    Role::parse(s).ok_or_else(|| DbError::Decode(format!("unknown user role: {s}")))
}

fn parse_opt_uuid(s: Option<String>) -> Result<Option<Uuid>, DbError> {
    s.map(|v| {
        Uuid::parse_str(&v).map_err(|e| DbError::Decode(format!("invalid creator UUID: {e}")))
    })
    .transpose()
}

impl UserRow {
    fn into_user(self, id: Uuid) -> Result<User, DbError> {
        Ok(User {
            id,
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            role: parse_role(&self.role)?,
            active: self.active,
            created_at: self.created_at,
            created_by: parse_opt_uuid(self.created_by)?,
        })
    }
}

impl UserRowWithId {
    fn try_into_user(self) -> Result<User, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Decode(format!("invalid UUID: {e}")))?;
        Ok(User {
            id,
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            role: parse_role(&self.role)?,
            active: self.active,
            created_at: self.created_at,
            created_by: parse_opt_uuid(self.created_by)?,
        })
    }
}

/// Hash a password with Argon2id using OWASP-recommended parameters.
///
/// If a pepper is provided, it is prepended to the password before
/// hashing. The salt is randomly generated for each call.
pub(crate) fn hash_password(password: &str, pepper: Option<&str>) -> Result<String, DbError> {
    // OWASP ASVS recommended: m=19456 (19 MiB), t=2, p=1
    let params = argon2::Params::new(19456, 2, 1, None)
        .map_err(|e| DbError::Decode(format!("argon2 params error: {e}")))?;
    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

    let peppered: String;
    let input = match pepper {
        Some(p) => {
            peppered = format!("{p}{password}");
            peppered.as_bytes()
        }
        None => password.as_bytes(),
    };

    let salt = SaltString::generate(&mut argon2::password_hash::rand_core::OsRng);
    let hash = argon2
        .hash_password(input, &salt)
        .map_err(|e| DbError::Decode(format!("password hash error: {e}")))?;

    Ok(hash.to_string())
}

/// True when a store error is the `idx_user_email` unique index firing.
fn is_duplicate_email(err: &str) -> bool {
    err.contains("idx_user_email")
}

/// SurrealDB implementation of the user repository.
pub struct SurrealUserRepository<C: Connection> {
    db: Surreal<C>,
    /// Optional server-side pepper for password hashing.
    pepper: Option<String>,
}

// Manual impl: `Surreal<C>` is Clone for any engine, a derive would
// also demand `C: Clone`.
impl<C: Connection> Clone for SurrealUserRepository<C> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            pepper: self.pepper.clone(),
        }
    }
}

impl<C: Connection> SurrealUserRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db, pepper: None }
    }

    pub fn with_pepper(db: Surreal<C>, pepper: String) -> Self {
        Self {
            db,
            pepper: Some(pepper),
        }
    }

    /// Best-effort duplicate pre-check; the unique index still decides
    /// concurrent races.
    async fn email_taken(&self, email: &str, exclude: Option<Uuid>) -> Result<bool, DbError> {
        let mut result = match exclude {
            Some(id) => {
                self.db
                    .query(
                        "SELECT count() AS total FROM user \
                         WHERE email = $email AND meta::id(id) != $id GROUP ALL",
                    )
                    .bind(("email", email.to_string()))
                    .bind(("id", id.to_string()))
                    .await?
            }
            None => {
                self.db
                    .query("SELECT count() AS total FROM user WHERE email = $email GROUP ALL")
                    .bind(("email", email.to_string()))
                    .await?
            }
        };
        let rows: Vec<CountRow> = result.take(0)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0) > 0)
    }
}

impl<C: Connection> UserRepository for SurrealUserRepository<C> {
    async fn create(&self, input: CreateUser) -> CrmResult<User> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        if self.email_taken(&input.email, None).await? {
            return Err(DbError::AlreadyExists {
                entity: "user".into(),
            }
            .into());
        }

        let password_hash = hash_password(&input.password, self.pepper.as_deref())?;

        let result = self
            .db
            .query(
                "CREATE type::record('user', $id) SET \
                 name = $name, email = $email, \
                 password_hash = $password_hash, \
                 role = $role, active = true, \
                 created_by = $created_by",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("email", input.email))
            .bind(("password_hash", password_hash))
            .bind(("role", input.role.as_str().to_string()))
            .bind(("created_by", input.created_by.map(|u| u.to_string())))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| {
            let msg = e.to_string();
            if is_duplicate_email(&msg) {
                DbError::AlreadyExists {
                    entity: "user".into(),
                }
            } else {
                DbError::Decode(msg)
            }
        })?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> CrmResult<User> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('user', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(id)?)
    }

    async fn get_by_email(&self, email: &str) -> CrmResult<User> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM user \
                 WHERE email = $email",
            )
            .bind(("email", email.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: format!("email={email}"),
        })?;

        Ok(row.try_into_user()?)
    }

    async fn update(&self, id: Uuid, input: UpdateUser) -> CrmResult<User> {
        let id_str = id.to_string();

        if let Some(ref email) = input.email {
            if self.email_taken(email, Some(id)).await? {
                return Err(DbError::AlreadyExists {
                    entity: "user".into(),
                }
                .into());
            }
        }

        // Empty passwords are treated as "no change".
        let new_hash = match input.password.as_deref() {
            Some(p) if !p.is_empty() => Some(hash_password(p, self.pepper.as_deref())?),
            _ => None,
        };

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.email.is_some() {
            sets.push("email = $email");
        }
        if input.role.is_some() {
            sets.push("role = $role");
        }
        if input.active.is_some() {
            sets.push("active = $active");
        }
        if new_hash.is_some() {
            sets.push("password_hash = $password_hash");
        }

        if sets.is_empty() {
            // Nothing to apply; still answer with the current record.
            return self.get_by_id(id).await;
        }

        let query = format!(
            "UPDATE type::record('user', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));
        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(email) = input.email {
            builder = builder.bind(("email", email));
        }
        if let Some(role) = input.role {
            builder = builder.bind(("role", role.as_str().to_string()));
        }
        if let Some(active) = input.active {
            builder = builder.bind(("active", active));
        }
        if let Some(hash) = new_hash {
            builder = builder.bind(("password_hash", hash));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(|e| {
            let msg = e.to_string();
            if is_duplicate_email(&msg) {
                DbError::AlreadyExists {
                    entity: "user".into(),
                }
            } else {
                DbError::Decode(msg)
            }
        })?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(id)?)
    }

    async fn deactivate(&self, id: Uuid) -> CrmResult<()> {
        // Soft delete; setting active = false twice is a no-op success.
        self.db
            .query("UPDATE type::record('user', $id) SET active = false")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list(&self) -> CrmResult<Vec<User>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM user \
                 ORDER BY created_at ASC",
            )
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;
        let users = rows
            .into_iter()
            .map(|row| row.try_into_user())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(users)
    }

    async fn role_exists(&self, role: Role) -> CrmResult<bool> {
        let mut result = self
            .db
            .query("SELECT count() AS total FROM user WHERE role = $role GROUP ALL")
            .bind(("role", role.as_str().to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0) > 0)
    }
}
