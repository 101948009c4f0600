use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewUser, User, UserUpdate},
    traits::UserApiError,
};

pub async fn user_by_id(user_id: i64, conn: &mut SqliteConnection) -> Result<Option<User>, UserApiError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(conn)
        .await?;
    Ok(user)
}

pub async fn user_by_email(email: &str, conn: &mut SqliteConnection) -> Result<Option<User>, UserApiError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(conn)
        .await?;
    Ok(user)
}

pub async fn all_users(conn: &mut SqliteConnection) -> Result<Vec<User>, UserApiError> {
    let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY id").fetch_all(conn).await?;
    Ok(users)
}

pub async fn insert_user(user: NewUser, conn: &mut SqliteConnection) -> Result<User, UserApiError> {
    let email = user.email.clone();
    let user = sqlx::query_as::<_, User>(
        r#"
            INSERT INTO users (email, password_hash, full_name, role) VALUES ($1, $2, $3, $4)
            RETURNING *;
        "#,
    )
    .bind(user.email)
    .bind(user.password_hash)
    .bind(user.full_name)
    .bind(user.role)
    .fetch_one(conn)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(err) if err.is_unique_violation() => UserApiError::EmailAlreadyExists(email),
        _ => UserApiError::from(e),
    })?;
    debug!("📝️ Created new user #{} ({})", user.id, user.email);
    Ok(user)
}

/// Applies a partial update to a user record. Absent fields keep their current value.
pub async fn update_user(user_id: i64, update: UserUpdate, conn: &mut SqliteConnection) -> Result<User, UserApiError> {
    let mut user = user_by_id(user_id, conn).await?.ok_or(UserApiError::UserNotFound(user_id))?;
    if let Some(email) = update.email {
        user.email = email;
    }
    if let Some(full_name) = update.full_name {
        user.full_name = full_name;
    }
    if let Some(role) = update.role {
        user.role = role;
    }
    let updated = sqlx::query_as::<_, User>(
        r#"
            UPDATE users SET
                email = $1,
                full_name = $2,
                role = $3,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = $4
            RETURNING *;
        "#,
    )
    .bind(user.email.clone())
    .bind(user.full_name)
    .bind(user.role)
    .bind(user_id)
    .fetch_one(conn)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(err) if err.is_unique_violation() => UserApiError::EmailAlreadyExists(user.email),
        _ => UserApiError::from(e),
    })?;
    debug!("🧑️ Updated user #{user_id}");
    Ok(updated)
}

/// Deletes a user and everything it owns. The cascade is explicit: payments hanging off the
/// user's accounts go first, then the accounts, then the user record itself.
pub async fn delete_user(user_id: i64, conn: &mut SqliteConnection) -> Result<(), UserApiError> {
    sqlx::query("DELETE FROM payments WHERE account_id IN (SELECT id FROM accounts WHERE owner_id = $1)")
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
    sqlx::query("DELETE FROM accounts WHERE owner_id = $1").bind(user_id).execute(&mut *conn).await?;
    let result = sqlx::query("DELETE FROM users WHERE id = $1").bind(user_id).execute(conn).await?;
    if result.rows_affected() == 0 {
        return Err(UserApiError::UserNotFound(user_id));
    }
    debug!("🧑️ Deleted user #{user_id} and its accounts");
    Ok(())
}
