use thiserror::Error;

use crate::db_types::{Account, Payment};

#[derive(Debug, Clone, Error)]
pub enum AccountApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for AccountApiError {
    fn from(e: sqlx::Error) -> Self {
        AccountApiError::DatabaseError(e.to_string())
    }
}

/// The `AccountManagement` trait defines read-side behaviour over accounts and the payments
/// booked against them. The write side (provisioning accounts and applying balance changes) is
/// the concern of [`crate::traits::PaymentGatewayDatabase`].
#[allow(async_fn_in_trait)]
pub trait AccountManagement {
    /// Fetches the account with the given id. If no account exists, `None` is returned.
    async fn fetch_account(&self, account_id: i64) -> Result<Option<Account>, AccountApiError>;

    /// Fetches all accounts owned by the given user.
    async fn fetch_accounts_for_user(&self, user_id: i64) -> Result<Vec<Account>, AccountApiError>;

    /// Fetches all payments booked against the given account.
    async fn fetch_payments_for_account(&self, account_id: i64) -> Result<Vec<Payment>, AccountApiError>;

    /// Fetches all payments across every account owned by the given user.
    async fn fetch_payments_for_user(&self, user_id: i64) -> Result<Vec<Payment>, AccountApiError>;
}
