//! Credential hashing and strength rules
//!
//! Stored credentials are Argon2id PHC strings. Hashing failures surface as
//! `ConnectError::Internal`, weak passwords as `ConnectError::Validation`.

use argon2::{
    password_hash::{self, rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::ConnectError;

const MIN_PASSWORD_CHARS: usize = 8;
const MAX_PASSWORD_CHARS: usize = 128;

/// Hash `plaintext` with Argon2id and a fresh random salt
pub fn hash_password(plaintext: &str) -> Result<String, ConnectError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| kdf_failure("hashing", e))
}

/// Check `plaintext` against a stored PHC hash.
///
/// The digest comparison inside `argon2` is constant-time. A mismatch is
/// `Ok(false)`; an unparseable stored hash is an error.
pub fn verify_password(plaintext: &str, stored: &str) -> Result<bool, ConnectError> {
    let parsed = PasswordHash::new(stored).map_err(|e| kdf_failure("parsing", e))?;
    match Argon2::default().verify_password(plaintext.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(kdf_failure("verification", e)),
    }
}

/// Strength rules for new credentials: 8 to 128 characters with at least one
/// lowercase letter, one uppercase letter and one digit.
pub fn validate_password(plaintext: &str) -> Result<(), ConnectError> {
    let chars = plaintext.chars().count();
    let problem = if chars < MIN_PASSWORD_CHARS {
        Some(format!("Password must be at least {} characters long", MIN_PASSWORD_CHARS))
    } else if chars > MAX_PASSWORD_CHARS {
        Some(format!("Password must be at most {} characters long", MAX_PASSWORD_CHARS))
    } else if !plaintext.chars().any(|c| c.is_ascii_lowercase()) {
        Some("Password must contain a lowercase letter".to_string())
    } else if !plaintext.chars().any(|c| c.is_ascii_uppercase()) {
        Some("Password must contain an uppercase letter".to_string())
    } else if !plaintext.chars().any(|c| c.is_ascii_digit()) {
        Some("Password must contain a digit".to_string())
    } else {
        None
    };

    match problem {
        Some(message) => Err(ConnectError::Validation(message)),
        None => Ok(()),
    }
}

fn kdf_failure(stage: &str, e: password_hash::Error) -> ConnectError {
    log::error!("Password {} error: {}", stage, e);
    ConnectError::Internal(format!("password {} failed", stage))
}
