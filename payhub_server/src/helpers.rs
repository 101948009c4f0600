use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::data_objects::WebhookPayload;

/// Derive the expected signature for a webhook notification.
///
/// The payment provider concatenates the account id, the amount (in its natural decimal form,
/// keeping the trailing `.0` on whole values), the transaction id, the user id and the shared
/// secret, in that order, and signs the result with a hex-encoded SHA-256 digest. The field order
/// and rendering are part of the wire contract; changing either breaks interoperability with the
/// sender.
pub fn webhook_signature(payload: &WebhookPayload, secret: &str) -> String {
    let message =
        format!("{}{}{}{}{secret}", payload.account_id, payload.amount, payload.transaction_id, payload.user_id);
    hex::encode(Sha256::digest(message.as_bytes()))
}

/// Check the signature field of a webhook notification against the derived one.
///
/// The comparison runs in constant time, so an attacker probing the endpoint cannot learn the
/// expected signature byte by byte from response timing.
pub fn verify_webhook_signature(payload: &WebhookPayload, secret: &str) -> bool {
    let expected = webhook_signature(payload, secret);
    expected.as_bytes().ct_eq(payload.signature.as_bytes()).into()
}
