use std::sync::LazyLock;

use argon2::Argon2;
use argon2::password_hash::{
    self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use thiserror::Error;

/// Modular-crypt prefixes of bcrypt hashes written by earlier deployments.
const BCRYPT_PREFIXES: [&str; 4] = ["$2a$", "$2b$", "$2x$", "$2y$"];

/// Argon2 hash of a throwaway password, checked when a login names an unknown user.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("unknown-user-placeholder").ok());

#[derive(Debug, Error)]
pub enum HashError {
    #[error("failed to hash password: {0}")]
    Hash(String),
    #[error("stored password hash is malformed: {0}")]
    Malformed(String),
}

/// Hash a password into an Argon2 PHC string.
pub fn hash_password(password: &str) -> Result<String, HashError> {
    let salt_bytes: [u8; 16] = rand::random();
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| HashError::Hash(e.to_string()))?;

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| HashError::Hash(e.to_string()))
}

/// Whether a stored hash is a legacy bcrypt hash that should be replaced with Argon2.
pub fn needs_rehash(stored: &str) -> bool {
    BCRYPT_PREFIXES.iter().any(|prefix| stored.starts_with(prefix))
}

/// Check a password against a stored hash.
///
/// Accepts Argon2 PHC strings and legacy bcrypt hashes.
pub fn verify_password(password: &str, stored: &str) -> Result<bool, HashError> {
    if needs_rehash(stored) {
        return bcrypt::verify(password, stored).map_err(|e| HashError::Malformed(e.to_string()));
    }

    let parsed = PasswordHash::new(stored).map_err(|e| HashError::Malformed(e.to_string()))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(HashError::Hash(e.to_string())),
    }
}

/// Run a full Argon2 verification whose result is discarded.
///
/// Keeps the response time of a login for an unknown username in line with a wrong password.
pub fn verify_dummy(password: &str) {
    if let Some(stored) = DUMMY_HASH.as_deref() {
        let _ = verify_password(password, stored);
    }
}
