//! `SqliteDatabase` is a concrete implementation of a Payhub engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the
//! [`crate::traits`] module.
use std::fmt::Debug;

use log::*;
use sqlx::SqlitePool;

use super::db::{accounts, new_pool, payments, users};
use crate::{
    db_types::{Account, NewPayment, NewUser, Payment, User, UserUpdate},
    traits::{
        AccountApiError,
        AccountManagement,
        PaymentGatewayDatabase,
        PaymentGatewayError,
        UserApiError,
        UserManagement,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl UserManagement for SqliteDatabase {
    async fn fetch_user_by_id(&self, user_id: i64) -> Result<Option<User>, UserApiError> {
        let mut conn = self.pool.acquire().await?;
        users::user_by_id(user_id, &mut conn).await
    }

    async fn fetch_user_by_email(&self, email: &str) -> Result<Option<User>, UserApiError> {
        let mut conn = self.pool.acquire().await?;
        users::user_by_email(email, &mut conn).await
    }

    async fn fetch_all_users(&self) -> Result<Vec<User>, UserApiError> {
        let mut conn = self.pool.acquire().await?;
        users::all_users(&mut conn).await
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, UserApiError> {
        let mut conn = self.pool.acquire().await?;
        users::insert_user(user, &mut conn).await
    }

    async fn update_user(&self, user_id: i64, update: UserUpdate) -> Result<User, UserApiError> {
        let mut tx = self.pool.begin().await?;
        let user = users::update_user(user_id, update, &mut tx).await?;
        tx.commit().await?;
        Ok(user)
    }

    async fn delete_user(&self, user_id: i64) -> Result<(), UserApiError> {
        let mut tx = self.pool.begin().await?;
        users::delete_user(user_id, &mut tx).await?;
        tx.commit().await?;
        Ok(())
    }
}

impl AccountManagement for SqliteDatabase {
    async fn fetch_account(&self, account_id: i64) -> Result<Option<Account>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        accounts::account_by_id(account_id, &mut conn).await
    }

    async fn fetch_accounts_for_user(&self, user_id: i64) -> Result<Vec<Account>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        accounts::accounts_for_user(user_id, &mut conn).await
    }

    async fn fetch_payments_for_account(&self, account_id: i64) -> Result<Vec<Payment>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        payments::payments_for_account(account_id, &mut conn).await
    }

    async fn fetch_payments_for_user(&self, user_id: i64) -> Result<Vec<Payment>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        payments::payments_for_user(user_id, &mut conn).await
    }
}

impl PaymentGatewayDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn fetch_payment_by_transaction_id(
        &self,
        transaction_id: &str,
    ) -> Result<Option<Payment>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        payments::payment_by_transaction_id(transaction_id, &mut conn).await
    }

    /// Takes a new payment and, in a single atomic transaction,
    /// * checks whether the transaction id has been booked before (early exit; the unique
    ///   constraint on `payments.transaction_id` is the authoritative guard),
    /// * creates the target account with a zero balance if it does not exist,
    /// * stores the payment record,
    /// * credits the payment amount to the account balance with a relative update.
    async fn process_webhook_payment(&self, payment: NewPayment) -> Result<Payment, PaymentGatewayError> {
        let mut tx = self.pool.begin().await?;
        let transaction_id = payment.transaction_id.clone();
        if let Some(existing) = payments::payment_by_transaction_id(&transaction_id, &mut tx).await? {
            debug!("🗃️ Transaction {transaction_id} has already been booked as payment #{}", existing.id);
            return Err(PaymentGatewayError::PaymentAlreadyExists(transaction_id));
        }
        let account = accounts::fetch_or_create_account(payment.account_id, payment.user_id, &mut tx).await?;
        let amount = payment.amount;
        let saved = payments::idempotent_insert(payment, &mut tx).await?;
        accounts::adjust_balance(account.id, amount, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Transaction {transaction_id} booked. {amount} credited to account #{}", account.id);
        Ok(saved)
    }
}
