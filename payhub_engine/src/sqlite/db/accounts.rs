use log::{debug, trace};
use ph_common::Money;
use sqlx::SqliteConnection;

use crate::{db_types::Account, traits::AccountApiError};

pub async fn account_by_id(account_id: i64, conn: &mut SqliteConnection) -> Result<Option<Account>, AccountApiError> {
    let account = sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE id = $1")
        .bind(account_id)
        .fetch_optional(conn)
        .await?;
    Ok(account)
}

pub async fn accounts_for_user(user_id: i64, conn: &mut SqliteConnection) -> Result<Vec<Account>, AccountApiError> {
    let accounts = sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE owner_id = $1 ORDER BY id")
        .bind(user_id)
        .fetch_all(conn)
        .await?;
    Ok(accounts)
}

/// Fetches the account with the given id, creating it with a zero balance if it does not exist.
///
/// The owner id is recorded as given. It is not validated against the users table: payment
/// providers may notify us about accounts before the corresponding user has been registered.
pub async fn fetch_or_create_account(
    account_id: i64,
    owner_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Account, AccountApiError> {
    if let Some(account) = account_by_id(account_id, &mut *conn).await? {
        trace!("🧑️ Account #{account_id} exists with balance {}", account.balance);
        return Ok(account);
    }
    let account = sqlx::query_as::<_, Account>(
        "INSERT INTO accounts (id, owner_id, balance) VALUES ($1, $2, 0) RETURNING *",
    )
    .bind(account_id)
    .bind(owner_id)
    .fetch_one(conn)
    .await?;
    debug!("📝️ Created new account #{account_id} for owner {owner_id}");
    Ok(account)
}

/// Adds a delta to the given account's balance, rather than setting it to an absolute value.
/// Concurrent payments to the same account therefore cannot lose updates.
pub async fn adjust_balance(
    account_id: i64,
    delta: Money,
    conn: &mut SqliteConnection,
) -> Result<(), AccountApiError> {
    let _ = sqlx::query(
        r#"UPDATE accounts SET
       balance = balance + $1,
       updated_at = CURRENT_TIMESTAMP
       WHERE id = $2
       "#,
    )
    .bind(delta)
    .bind(account_id)
    .execute(conn)
    .await?;
    Ok(())
}
