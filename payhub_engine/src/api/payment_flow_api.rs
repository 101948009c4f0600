use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{NewPayment, Payment},
    traits::{PaymentGatewayDatabase, PaymentGatewayError},
};

/// `PaymentFlowApi` is the primary API for booking payments in response to webhook deliveries
/// from the upstream payment provider.
pub struct PaymentFlowApi<B> {
    db: B,
}

impl<B> Debug for PaymentFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PaymentFlowApi")
    }
}

impl<B> PaymentFlowApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> PaymentFlowApi<B>
where B: PaymentGatewayDatabase
{
    /// Submit a new payment notification.
    ///
    /// This should be a brand-new transaction. Redelivery of a transaction id that has already
    /// been booked returns [`PaymentGatewayError::PaymentAlreadyExists`] and has no effect on any
    /// balance. The account is provisioned on the fly if this is the first payment referencing it.
    pub async fn process_webhook_payment(&self, payment: NewPayment) -> Result<Payment, PaymentGatewayError> {
        let transaction_id = payment.transaction_id.clone();
        let saved = self.db.process_webhook_payment(payment).await?;
        debug!("🔄️💰️ Transaction [{transaction_id}] processing complete. Payment #{} booked.", saved.id);
        Ok(saved)
    }

    /// Fetches the payment for the given transaction id, if one has been booked.
    pub async fn payment_by_transaction_id(
        &self,
        transaction_id: &str,
    ) -> Result<Option<Payment>, PaymentGatewayError> {
        self.db.fetch_payment_by_transaction_id(transaction_id).await
    }
}
