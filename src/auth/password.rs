/// Password Hashing and Verification
///
/// Salted bcrypt digests with a configurable work factor. Policy checks on
/// the plaintext (length, emptiness) belong to the request validators, not here.

use bcrypt::{hash, verify};

use crate::error::AuthError;

/// Lowest work factor bcrypt accepts
pub const MIN_PASSWORD_COST: u32 = 4;
/// Highest work factor bcrypt accepts
pub const MAX_PASSWORD_COST: u32 = 31;

/// Hash a password using bcrypt
///
/// # Arguments
/// * `password` - Plain text password to hash
/// * `cost` - bcrypt work factor (`MIN_PASSWORD_COST..=MAX_PASSWORD_COST`)
///
/// # Errors
/// Returns `AuthError::Hashing` if the cost is out of range or salt
/// generation fails
pub fn hash_password(password: &str, cost: u32) -> Result<String, AuthError> {
    hash(password, cost).map_err(|e| AuthError::Hashing(e.to_string()))
}

/// Verify a password against its digest
///
/// The digest comparison inside bcrypt is constant-time; only a structurally
/// invalid digest short-circuits, and that is reported as an error rather
/// than a mismatch.
///
/// # Errors
/// Returns `AuthError::Hashing` if `digest` is not a bcrypt hash
pub fn verify_password(password: &str, digest: &str) -> Result<bool, AuthError> {
    verify(password, digest).map_err(|e| AuthError::Hashing(e.to_string()))
}
