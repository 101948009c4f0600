use std::fmt::Display;

use payhub_engine::db_types::{NewPayment, NewUser, Role, User};
use ph_common::Money;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token_str: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
    pub token_type: String,
}

/// The webhook notification body as sent by the payment provider. The signature covers the other
/// four fields; see [`crate::helpers::webhook_signature`] for the exact derivation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookPayload {
    pub transaction_id: String,
    pub user_id: i64,
    pub account_id: i64,
    pub amount: Money,
    pub signature: String,
}

impl From<WebhookPayload> for NewPayment {
    fn from(payload: WebhookPayload) -> Self {
        NewPayment::new(payload.transaction_id, payload.user_id, payload.account_id, payload.amount)
    }
}

/// The request body for creating a user. The admin supplies the password hash rather than the
/// plaintext password; see [`payhub_engine::helpers::hash_password`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewUserRequest {
    pub email: String,
    pub hashed_password: String,
    pub full_name: String,
    pub role: Role,
}

impl From<NewUserRequest> for NewUser {
    fn from(request: NewUserRequest) -> Self {
        NewUser {
            email: request.email,
            password_hash: request.hashed_password,
            full_name: request.full_name,
            role: request.role,
        }
    }
}

/// A user record as exposed over HTTP. Everything except the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    pub role: Role,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self { id: user.id, email: user.email, full_name: user.full_name, role: user.role }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailResponse {
    pub detail: String,
}

impl DetailResponse {
    pub fn new<S: Display>(detail: S) -> Self {
        Self { detail: detail.to_string() }
    }
}
