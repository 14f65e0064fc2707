//! Shared application state.

use std::sync::Arc;

use surrealdb::{Connection, Surreal};

use agrocrm_auth::{AuthConfig, AuthService};
use agrocrm_db::repository::{SurrealCustomerRepository, SurrealUserRepository};

/// State shared by all handlers and middleware.
///
/// Generic over the SurrealDB engine so the same router runs against
/// the remote engine in production and the in-memory engine in tests.
pub struct AppState<C: Connection> {
    pub auth: Arc<AuthService<SurrealUserRepository<C>>>,
    pub users: SurrealUserRepository<C>,
    pub customers: SurrealCustomerRepository<C>,
}

impl<C: Connection> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            auth: Arc::clone(&self.auth),
            users: self.users.clone(),
            customers: self.customers.clone(),
        }
    }
}

impl<C: Connection> AppState<C> {
    /// Wire up repositories and the auth service over one DB handle.
    pub fn new(db: Surreal<C>, config: AuthConfig) -> Self {
        let users = match config.pepper.clone() {
            Some(pepper) => SurrealUserRepository::with_pepper(db.clone(), pepper),
            None => SurrealUserRepository::new(db.clone()),
        };
        let auth = Arc::new(AuthService::new(users.clone(), config));

        Self {
            auth,
            users,
            customers: SurrealCustomerRepository::new(db),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use surrealdb::engine::local::Mem;

    // Engine types are not themselves Clone; the state (and the repos
    // inside it) must still clone through the Surreal handle alone.
    #[tokio::test]
    async fn state_clones_without_a_clone_engine() {
        let db = Surreal::new::<Mem>(()).await.unwrap();
        let state = AppState::new(db, AuthConfig::default());

        let copy = state.clone();
        let _users = copy.users.clone();
        let _customers = copy.customers.clone();
    }
}
