use thiserror::Error;

use crate::db_types::{NewUser, User, UserUpdate};

#[derive(Debug, Clone, Error)]
pub enum UserApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("User with id {0} does not exist")]
    UserNotFound(i64),
    #[error("A user with email {0} already exists")]
    EmailAlreadyExists(String),
}

impl From<sqlx::Error> for UserApiError {
    fn from(e: sqlx::Error) -> Self {
        UserApiError::DatabaseError(e.to_string())
    }
}

/// The `UserManagement` trait defines behaviour for managing user records.
///
/// It covers the lookups needed by authentication (email is the login subject) as well as the
/// administrative CRUD surface. Deleting a user cascades to the accounts it owns and their
/// payments.
#[allow(async_fn_in_trait)]
pub trait UserManagement {
    /// Fetches the user with the given id. If no user exists, `None` is returned.
    async fn fetch_user_by_id(&self, user_id: i64) -> Result<Option<User>, UserApiError>;

    /// Fetches the user with the given email address. Emails are unique, so at most one record
    /// can match. If no user exists, `None` is returned.
    async fn fetch_user_by_email(&self, email: &str) -> Result<Option<User>, UserApiError>;

    async fn fetch_all_users(&self) -> Result<Vec<User>, UserApiError>;

    /// Inserts a new user record and returns it. Fails with [`UserApiError::EmailAlreadyExists`]
    /// if the email is taken.
    async fn insert_user(&self, user: NewUser) -> Result<User, UserApiError>;

    /// Applies a partial update to the user with the given id and returns the updated record.
    async fn update_user(&self, user_id: i64, update: UserUpdate) -> Result<User, UserApiError>;

    /// Deletes the user with the given id, along with the accounts it owns and their payments.
    async fn delete_user(&self, user_id: i64) -> Result<(), UserApiError>;
}
