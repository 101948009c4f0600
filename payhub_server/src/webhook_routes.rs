//----------------------------------------------   Webhook  ----------------------------------------------------

use actix_web::{web, HttpResponse};
use log::{info, trace, warn};
use payhub_engine::{db_types::NewPayment, PaymentFlowApi, PaymentGatewayDatabase, PaymentGatewayError};

use crate::{
    config::WebhookConfig,
    data_objects::{DetailResponse, WebhookPayload},
    errors::{ServerError, WebhookError},
    helpers::verify_webhook_signature,
    route,
};

route!(webhook => Post "/webhook" impl PaymentGatewayDatabase);
/// Route handler for the payment webhook
///
/// The payment provider calls this endpoint to report a transaction. The request is not bearer
/// authenticated; instead the body carries a signature over its own fields and the shared webhook
/// secret, which must verify before anything is booked.
///
/// Redeliveries are safe: a transaction id that has already been booked is rejected with a 400
/// and leaves every balance untouched.
pub async fn webhook<B: PaymentGatewayDatabase>(
    body: web::Json<WebhookPayload>,
    api: web::Data<PaymentFlowApi<B>>,
    config: web::Data<WebhookConfig>,
) -> Result<HttpResponse, ServerError> {
    let payload = body.into_inner();
    trace!("💸️ Received webhook notification for transaction [{}]", payload.transaction_id);
    if !verify_webhook_signature(&payload, config.secret.reveal()) {
        warn!("💸️ Invalid signature on webhook notification for transaction [{}]", payload.transaction_id);
        return Err(WebhookError::BadSignature.into());
    }
    let payment = NewPayment::from(payload);
    match api.process_webhook_payment(payment).await {
        Ok(saved) => {
            info!("💸️ Transaction [{}] booked as payment #{}", saved.transaction_id, saved.id);
            Ok(HttpResponse::Ok().json(DetailResponse::new("Payment processed successfully")))
        },
        Err(PaymentGatewayError::PaymentAlreadyExists(txid)) => {
            info!("💸️ Transaction [{txid}] has already been processed. Ignoring redelivery.");
            Err(WebhookError::DuplicateTransaction.into())
        },
        Err(e) => {
            warn!("💸️ Unexpected error while booking webhook payment. {e}");
            Err(ServerError::BackendError(e.to_string()))
        },
    }
}
