//! Authentication configuration.

/// Configuration for the authentication service.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Shared secret for HS256 JWT signing and verification.
    pub secret_key: String,
    /// Token lifetime in seconds (default: 86_400 = 24 hours).
    pub token_lifetime_secs: u64,
    /// Optional pepper prepended to passwords before Argon2id
    /// hashing and verification.
    pub pepper: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret_key: String::new(),
            token_lifetime_secs: 86_400,
            pepper: None,
        }
    }
}
