//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Implementations live in the
//! database crate; the auth and server layers depend only on these
//! traits.

use uuid::Uuid;

use crate::error::CrmResult;
use crate::models::{
    customer::{
        CreateCustomer, CreateHistoryEntry, CreatePhotoRecord, Customer, HistoryEntry,
        PhotoRecord, UpdateCustomer,
    },
    user::{CreateUser, Role, UpdateUser, User},
};

/// Persisted staff accounts with salted password hashes.
pub trait UserRepository: Send + Sync {
    /// Hashes the raw password and inserts the user. Fails with
    /// `AlreadyExists` on a duplicate email.
    fn create(&self, input: CreateUser) -> impl Future<Output = CrmResult<User>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = CrmResult<User>> + Send;
    fn get_by_email(&self, email: &str) -> impl Future<Output = CrmResult<User>> + Send;
    /// Partial update. Email uniqueness is re-checked against all
    /// other users; a supplied password is re-hashed.
    fn update(&self, id: Uuid, input: UpdateUser)
    -> impl Future<Output = CrmResult<User>> + Send;
    /// Soft delete: clears the active flag. Idempotent — deactivating
    /// an already inactive user is a no-op success.
    fn deactivate(&self, id: Uuid) -> impl Future<Output = CrmResult<()>> + Send;
    fn list(&self) -> impl Future<Output = CrmResult<Vec<User>>> + Send;
    /// True when at least one user (active or not) holds the role.
    fn role_exists(&self, role: Role) -> impl Future<Output = CrmResult<bool>> + Send;
}

/// Customer records plus their owned history and photo collections.
///
/// Reads are eager: every returned [`Customer`] carries its full
/// history (chronological) and photo lists.
pub trait CustomerRepository: Send + Sync {
    fn create(&self, input: CreateCustomer)
    -> impl Future<Output = CrmResult<Customer>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = CrmResult<Customer>> + Send;
    fn list(&self) -> impl Future<Output = CrmResult<Vec<Customer>>> + Send;
    /// Refreshes `updated_at` on every successful mutation, regardless
    /// of which fields changed.
    fn update(
        &self,
        id: Uuid,
        input: UpdateCustomer,
    ) -> impl Future<Output = CrmResult<Customer>> + Send;
    /// Deletes the customer and cascades to its history and photo
    /// children in a single atomic transaction.
    fn delete(&self, id: Uuid) -> impl Future<Output = CrmResult<()>> + Send;
    fn add_history(
        &self,
        customer_id: Uuid,
        input: CreateHistoryEntry,
    ) -> impl Future<Output = CrmResult<HistoryEntry>> + Send;
    fn delete_history(
        &self,
        customer_id: Uuid,
        history_id: Uuid,
    ) -> impl Future<Output = CrmResult<()>> + Send;
    fn add_photo(
        &self,
        customer_id: Uuid,
        input: CreatePhotoRecord,
    ) -> impl Future<Output = CrmResult<PhotoRecord>> + Send;
}
