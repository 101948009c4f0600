//! Unifies API for administering user records.

use std::fmt::Debug;

use log::debug;

use crate::{
    db_types::{NewUser, User, UserUpdate},
    traits::{UserApiError, UserManagement},
};

/// The `UserApi` provides a unified API for the administrative user CRUD surface.
pub struct UserApi<B> {
    db: B,
}

impl<B: Debug> Debug for UserApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "UserApi ({:?})", self.db)
    }
}

impl<B> UserApi<B>
where B: UserManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub async fn user_by_id(&self, user_id: i64) -> Result<Option<User>, UserApiError> {
        self.db.fetch_user_by_id(user_id).await
    }

    pub async fn all_users(&self) -> Result<Vec<User>, UserApiError> {
        self.db.fetch_all_users().await
    }

    pub async fn create_user(&self, user: NewUser) -> Result<User, UserApiError> {
        let user = self.db.insert_user(user).await?;
        debug!("🧑️ New user #{} ({}) created with role {}", user.id, user.email, user.role);
        Ok(user)
    }

    pub async fn update_user(&self, user_id: i64, update: UserUpdate) -> Result<User, UserApiError> {
        self.db.update_user(user_id, update).await
    }

    pub async fn delete_user(&self, user_id: i64) -> Result<(), UserApiError> {
        self.db.delete_user(user_id).await?;
        debug!("🧑️ User #{user_id} deleted");
        Ok(())
    }
}
