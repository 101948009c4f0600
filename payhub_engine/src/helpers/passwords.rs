//! Password hashing and verification.
//!
//! Passwords are hashed with Argon2id and stored in PHC string format, so every hash carries its
//! own salt and cost parameters. Verification never returns an error to the caller: a malformed
//! or mismatched hash is simply a failed verification.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, SaltString},
    Argon2,
    PasswordVerifier,
};
use log::debug;

/// Hash a plaintext password with a fresh random salt.
pub fn hash_password(plain: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(plain.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a plaintext password against a stored PHC hash string.
///
/// The cost parameters embedded in the hash drive the verification, so the work factor is the
/// same whether the password matches or not. Returns `false` for any hash that cannot be parsed.
pub fn verify_password(plain: &str, hash: &str) -> bool {
    let parsed = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(e) => {
            debug!("🔑️ Stored password hash could not be parsed. {e}");
            return false;
        },
    };
    Argon2::default().verify_password(plain.as_bytes(), &parsed).is_ok()
}
