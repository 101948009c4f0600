//! Unifies API for accessing accounts.

use std::fmt::Debug;

use crate::{
    db_types::{Account, Payment},
    traits::{AccountApiError, AccountManagement},
};

/// The `AccountApi` provides a unified API for accessing accounts and the payments booked against
/// them.
pub struct AccountApi<B> {
    db: B,
}

impl<B: Debug> Debug for AccountApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AccountApi ({:?})", self.db)
    }
}

impl<B> AccountApi<B>
where B: AccountManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// Fetches all accounts owned by the given user, with their current balances.
    pub async fn accounts_for_user(&self, user_id: i64) -> Result<Vec<Account>, AccountApiError> {
        self.db.fetch_accounts_for_user(user_id).await
    }

    /// Fetches all payments across every account owned by the given user.
    pub async fn payments_for_user(&self, user_id: i64) -> Result<Vec<Payment>, AccountApiError> {
        self.db.fetch_payments_for_user(user_id).await
    }
}
