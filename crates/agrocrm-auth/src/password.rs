//! Argon2id password checks.
//!
//! Hashes are produced by the user repository at registration time;
//! this module only verifies them at login. Both sides prepend the
//! same optional pepper, so a pepper change invalidates every stored
//! credential.

use argon2::{Argon2, PasswordVerifier};

use crate::error::AuthError;

/// Prepend the pepper, when configured, to the raw password bytes.
fn with_pepper(password: &str, pepper: Option<&str>) -> Vec<u8> {
    match pepper {
        Some(p) => [p.as_bytes(), password.as_bytes()].concat(),
        None => password.as_bytes().to_vec(),
    }
}

/// Check `password` against a stored PHC-format hash.
///
/// A mismatch is `Ok(false)`; only an unparseable or otherwise broken
/// hash becomes `Err(AuthError::Crypto)`.
pub fn verify_password(
    password: &str,
    hash: &str,
    pepper: Option<&str>,
) -> Result<bool, AuthError> {
    let input = with_pepper(password, pepper);

    let parsed = argon2::PasswordHash::new(hash)
        .map_err(|e| AuthError::Crypto(format!("stored hash is not valid PHC: {e}")))?;

    match Argon2::default().verify_password(&input, &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::Crypto(format!("password verification: {e}"))),
    }
}
