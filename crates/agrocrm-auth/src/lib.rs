//! AgroCRM Auth — Password verification, JWT issuance/validation,
//! and the login/bootstrap service.

pub mod config;
pub mod error;
pub mod password;
pub mod service;
pub mod token;

pub use config::AuthConfig;
pub use error::AuthError;
pub use service::{AuthService, LoginOutput};
pub use token::TokenClaims;
