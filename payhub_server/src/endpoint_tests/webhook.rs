use actix_web::{body::MessageBody, http::StatusCode, test, test::TestRequest, web, web::ServiceConfig, App};
use payhub_engine::{traits::PaymentGatewayError, PaymentFlowApi};
use ph_common::Money;

use super::mocks::*;
use crate::{config::WebhookConfig, data_objects::WebhookPayload, helpers::webhook_signature, webhook_routes::WebhookRoute};

const SECRET: &str = "secret-key";

/// `process_result` is what the payment booking returns; `None` means the test expects the
/// booking never to be reached.
fn configure_app(process_result: Option<Result<(), PaymentGatewayError>>) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let mut gateway = MockPaymentGateway::new();
        if let Some(result) = process_result {
            gateway.expect_process_webhook_payment().times(1).returning(move |payment| {
                result.clone().map(|()| stored_payment(1, &payment.transaction_id, payment.amount.value(), payment.account_id))
            });
        }
        cfg.app_data(web::Data::new(PaymentFlowApi::new(gateway)))
            .app_data(web::Data::new(WebhookConfig::new(SECRET)))
            .service(WebhookRoute::<MockPaymentGateway>::new());
    }
}

fn payload(signature: &str) -> WebhookPayload {
    WebhookPayload {
        transaction_id: "tx1".to_string(),
        user_id: 2,
        account_id: 1,
        amount: Money::from(100.0),
        signature: signature.to_string(),
    }
}

async fn post_webhook(
    payload: &WebhookPayload,
    process_result: Option<Result<(), PaymentGatewayError>>,
) -> (StatusCode, String) {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::post().uri("/webhook").set_json(payload).to_request();
    let app = App::new().configure(configure_app(process_result));
    let app = test::init_service(app).await;
    let (_, res) = test::call_service(&app, req).await.into_parts();
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    (status, body)
}

#[actix_web::test]
async fn a_correctly_signed_notification_is_booked() {
    // The pinned wire vector: sha256("1100.0tx12secret-key")
    let payload = payload("d50a974df5b5eef096bf843004d6c60e1f5f7066d77fe9823a27eaff89539d60");
    let (status, body) = post_webhook(&payload, Some(Ok(()))).await;
    assert!(status.is_success(), "was: {body}");
    assert_eq!(body, r#"{"detail":"Payment processed successfully"}"#);
}

#[actix_web::test]
async fn a_bad_signature_is_rejected_without_booking() {
    // No expectation is set on the gateway: reaching the booking would fail the test
    let payload = payload("0000000000000000000000000000000000000000000000000000000000000000");
    let (status, body) = post_webhook(&payload, None).await;
    assert_eq!(status.as_u16(), StatusCode::BAD_REQUEST.as_u16());
    assert_eq!(body, r#"{"error":"Invalid signature"}"#);
}

#[actix_web::test]
async fn a_signature_over_different_fields_is_rejected() {
    // Sign a 100.0 payment, then claim it was 900.0
    let mut tampered = payload("");
    tampered.signature = webhook_signature(&tampered, SECRET);
    tampered.amount = Money::from(900.0);
    let (status, body) = post_webhook(&tampered, None).await;
    assert_eq!(status.as_u16(), StatusCode::BAD_REQUEST.as_u16());
    assert_eq!(body, r#"{"error":"Invalid signature"}"#);
}

#[actix_web::test]
async fn a_redelivered_transaction_is_rejected() {
    let mut payload = payload("");
    payload.signature = webhook_signature(&payload, SECRET);
    let duplicate = PaymentGatewayError::PaymentAlreadyExists("tx1".to_string());
    let (status, body) = post_webhook(&payload, Some(Err(duplicate))).await;
    assert_eq!(status.as_u16(), StatusCode::BAD_REQUEST.as_u16());
    assert_eq!(body, r#"{"error":"Transaction already processed"}"#);
}

#[actix_web::test]
async fn a_backend_failure_is_a_server_error() {
    let mut payload = payload("");
    payload.signature = webhook_signature(&payload, SECRET);
    let failure = PaymentGatewayError::DatabaseError("the database is on fire".to_string());
    let (status, body) = post_webhook(&payload, Some(Err(failure))).await;
    assert_eq!(status.as_u16(), StatusCode::INTERNAL_SERVER_ERROR.as_u16(), "was: {body}");
}
