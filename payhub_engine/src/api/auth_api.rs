//! Credential checks and identity lookups for the authentication flow.

use std::fmt::Debug;

use log::debug;
use thiserror::Error;

use crate::{
    db_types::User,
    helpers::verify_password,
    traits::{UserApiError, UserManagement},
};

/// A well-formed Argon2id hash that no password verifies against. Login attempts for unknown
/// emails are checked against this hash so that the rejection path costs the same as a real
/// password mismatch and does not leak which emails exist.
const UNMATCHABLE_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$gZiV/M1gPc22ElAH/Jh1Hw$CWOrkoo7oJBQ/iyh7uJ0LO2aLEfrHwTWllSAxT0zRno";

#[derive(Debug, Clone, Error)]
pub enum AuthApiError {
    /// Deliberately covers both "unknown email" and "wrong password", so callers cannot tell the
    /// two apart.
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<UserApiError> for AuthApiError {
    fn from(e: UserApiError) -> Self {
        AuthApiError::DatabaseError(e.to_string())
    }
}

pub struct AuthApi<B> {
    db: B,
}

impl<B: Debug> Debug for AuthApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AuthApi ({:?})", self.db)
    }
}

impl<B> AuthApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> AuthApi<B>
where B: UserManagement
{
    /// Checks the given credentials and returns the matching user.
    ///
    /// Fails with [`AuthApiError::InvalidCredentials`] for an unknown email as well as for a
    /// password mismatch. A full password verification runs in both cases.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, AuthApiError> {
        let user = self.db.fetch_user_by_email(email).await?;
        let stored_hash = user.as_ref().map(|u| u.password_hash.as_str()).unwrap_or(UNMATCHABLE_HASH);
        let password_matches = verify_password(password, stored_hash);
        match user {
            Some(user) if password_matches => Ok(user),
            _ => {
                debug!("🔐️ Authentication failed for {email}");
                Err(AuthApiError::InvalidCredentials)
            },
        }
    }

    /// Fetches the user record behind a token subject. Returns `None` if the user has been
    /// deleted since the token was issued.
    pub async fn fetch_user_by_email(&self, email: &str) -> Result<Option<User>, AuthApiError> {
        let user = self.db.fetch_user_by_email(email).await?;
        Ok(user)
    }
}
