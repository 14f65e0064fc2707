//! Authentication service — login, token authentication, and the
//! first-run administrator bootstrap.

use agrocrm_core::error::{CrmError, CrmResult};
use agrocrm_core::models::user::{CreateUser, Role, User};
use agrocrm_core::repository::UserRepository;
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::password;
use crate::token;

/// Name, email and password of the bootstrap administrator account.
pub const BOOTSTRAP_ADMIN_NAME: &str = "Administrador";
pub const BOOTSTRAP_ADMIN_EMAIL: &str = "admin@agrocrm.com";
pub const BOOTSTRAP_ADMIN_PASSWORD: &str = "admin123";

/// Successful login result.
#[derive(Debug)]
pub struct LoginOutput {
    /// Signed JWT.
    pub token: String,
    /// The authenticated user.
    pub user: User,
    /// Token lifetime in seconds.
    pub expires_in: u64,
}

/// Authentication service.
///
/// Generic over the repository implementation so that the auth layer
/// has no dependency on the database crate.
pub struct AuthService<U: UserRepository> {
    user_repo: U,
    config: AuthConfig,
}

impl<U: UserRepository> AuthService<U> {
    pub fn new(user_repo: U, config: AuthConfig) -> Self {
        Self { user_repo, config }
    }

    /// Authenticate with email + password and issue a token.
    ///
    /// Every failure mode — unknown email, wrong password, inactive
    /// account — collapses into `InvalidCredentials` so the response
    /// does not reveal which check failed.
    pub async fn login(&self, email: &str, password: &str) -> CrmResult<LoginOutput> {
        let user = match self.user_repo.get_by_email(email).await {
            Ok(u) => u,
            Err(CrmError::NotFound { .. }) => {
                return Err(AuthError::InvalidCredentials.into());
            }
            Err(e) => return Err(e),
        };

        let valid = password::verify_password(
            password,
            &user.password_hash,
            self.config.pepper.as_deref(),
        )
        .map_err(|e| CrmError::Crypto(e.to_string()))?;

        if !valid || !user.active {
            return Err(AuthError::InvalidCredentials.into());
        }

        let token = token::issue_token(user.id, &self.config)?;

        Ok(LoginOutput {
            token,
            user,
            expires_in: self.config.token_lifetime_secs,
        })
    }

    /// Resolve a bearer token to its user.
    ///
    /// The account's active flag is re-checked on every call, so a
    /// token keeps working only as long as the account does. All
    /// failure modes collapse into `TokenInvalid`.
    pub async fn authenticate(&self, raw_token: &str) -> CrmResult<User> {
        let claims = token::decode_token(raw_token, &self.config)?;

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AuthError::TokenInvalid("malformed subject".into()))?;

        let user = match self.user_repo.get_by_id(user_id).await {
            Ok(u) => u,
            Err(CrmError::NotFound { .. }) => {
                return Err(AuthError::TokenInvalid("unknown subject".into()).into());
            }
            Err(e) => return Err(e),
        };

        if !user.active {
            return Err(AuthError::TokenInvalid("subject is inactive".into()).into());
        }

        Ok(user)
    }

    /// Create the bootstrap administrator account.
    ///
    /// Fails with `AlreadyExists` once any manager account exists,
    /// active or not.
    pub async fn init_admin(&self) -> CrmResult<User> {
        if self.user_repo.role_exists(Role::Manager).await? {
            return Err(CrmError::AlreadyExists {
                entity: "administrador".into(),
            });
        }

        self.user_repo
            .create(CreateUser {
                name: BOOTSTRAP_ADMIN_NAME.into(),
                email: BOOTSTRAP_ADMIN_EMAIL.into(),
                password: BOOTSTRAP_ADMIN_PASSWORD.into(),
                role: Role::Manager,
                created_by: None,
            })
            .await
    }
}
