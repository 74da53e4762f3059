use bcrypt::{hash, verify, DEFAULT_COST};

use super::AuthError;

/// Hash a plaintext password for storage.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    Ok(hash(password, DEFAULT_COST)?)
}

/// Compare a plaintext password against a stored hash.
pub fn verify_password(password: &str, hashed: &str) -> Result<bool, AuthError> {
    Ok(verify(password, hashed)?)
}
