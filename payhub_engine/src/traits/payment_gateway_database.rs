use thiserror::Error;

use crate::{
    db_types::{NewPayment, Payment},
    traits::{AccountApiError, AccountManagement},
};

/// This trait defines the highest level of behaviour for backends supporting the Payhub engine:
/// booking externally-triggered payments against accounts.
#[allow(async_fn_in_trait)]
pub trait PaymentGatewayDatabase: AccountManagement {
    /// The URL of the database.
    fn url(&self) -> &str;

    /// Fetches the payment for the given transaction id, if one has been booked.
    async fn fetch_payment_by_transaction_id(
        &self,
        transaction_id: &str,
    ) -> Result<Option<Payment>, PaymentGatewayError>;

    /// Takes a new payment and, in a single atomic transaction,
    /// * rejects the payment if its transaction id has already been booked,
    /// * creates the target account with a zero balance if it does not exist yet,
    /// * stores the payment record,
    /// * applies the payment amount to the account balance as a relative update.
    ///
    /// The pre-existence check is an early exit only: the unique constraint on the transaction id
    /// is what serializes concurrent deliveries of the same transaction.
    ///
    /// Returns the newly created payment record.
    async fn process_webhook_payment(&self, payment: NewPayment) -> Result<Payment, PaymentGatewayError>;
}

#[derive(Debug, Clone, Error)]
pub enum PaymentGatewayError {
    #[error("We have an internal database engine (configuration/uptime etc.) : {0}")]
    DatabaseError(String),
    #[error("Cannot insert payment, since it already exists with transaction id {0}")]
    PaymentAlreadyExists(String),
    #[error("{0}")]
    AccountError(#[from] AccountApiError),
}

impl From<sqlx::Error> for PaymentGatewayError {
    fn from(e: sqlx::Error) -> Self {
        PaymentGatewayError::DatabaseError(e.to_string())
    }
}
