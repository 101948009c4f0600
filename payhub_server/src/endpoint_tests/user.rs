use actix_web::{body::MessageBody, http::StatusCode, test, test::TestRequest, web, web::ServiceConfig, App};
use chrono::Duration;
use payhub_engine::{
    db_types::{Role, User},
    AccountApi,
    AuthApi,
};

use super::{auth::test_auth_config, mocks::*};
use crate::{
    auth::{TokenIssuer, TokenKind},
    routes::{MyAccountsRoute, MyPaymentsRoute, MyProfileRoute},
};

fn configure_app(user: Option<User>) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let mut user_manager = MockUserManager::new();
        user_manager.expect_fetch_user_by_email().returning(move |_| Ok(user.clone()));
        let mut account_manager = MockAccountManager::new();
        account_manager
            .expect_fetch_accounts_for_user()
            .returning(|user_id| Ok(vec![stored_account(10, user_id, 250.5)]));
        account_manager
            .expect_fetch_payments_for_user()
            .returning(|_| Ok(vec![stored_payment(1, "tx-100", 250.5, 10)]));
        let auth_api = AuthApi::new(user_manager);
        let accounts_api = AccountApi::new(account_manager);
        let jwt_signer = TokenIssuer::new(&test_auth_config());
        cfg.app_data(web::Data::new(auth_api))
            .app_data(web::Data::new(accounts_api))
            .app_data(web::Data::new(jwt_signer))
            .service(MyProfileRoute::<MockUserManager>::new())
            .service(MyAccountsRoute::<MockUserManager, MockAccountManager>::new())
            .service(MyPaymentsRoute::<MockUserManager, MockAccountManager>::new());
    }
}

async fn get_with_token(path: &str, token: Option<&str>, user: Option<User>) -> (StatusCode, String) {
    let _ = env_logger::try_init().ok();
    let mut req = TestRequest::get().uri(path);
    if let Some(token) = token {
        req = req.insert_header(("Authorization", format!("Bearer {token}")));
    }
    let app = App::new().configure(configure_app(user));
    let app = test::init_service(app).await;
    let (_, res) = test::call_service(&app, req.to_request()).await.into_parts();
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    (status, body)
}

fn access_token_for(user: &User) -> String {
    let issuer = TokenIssuer::new(&test_auth_config());
    issuer.issue(TokenKind::Access, user, Duration::minutes(5)).unwrap()
}

#[actix_web::test]
async fn profile_without_token() {
    let user = stored_user(3, "carol@example.com", "irrelevant", Role::User);
    let (status, body) = get_with_token("/user/me", None, Some(user)).await;
    assert_eq!(status.as_u16(), StatusCode::UNAUTHORIZED.as_u16());
    assert!(body.contains("Auth token missing or not provided."), "was: {body}");
}

#[actix_web::test]
async fn profile_with_valid_token() {
    let user = stored_user(3, "carol@example.com", "super-secret-hash", Role::User);
    let token = access_token_for(&user);
    let (status, body) = get_with_token("/user/me", Some(&token), Some(user)).await;
    assert!(status.is_success(), "was: {body}");
    assert!(body.contains(r#""email":"carol@example.com""#), "was: {body}");
    // The stored hash must never appear in a response
    assert!(!body.contains("super-secret-hash"), "was: {body}");
    assert!(!body.contains("password"), "was: {body}");
}

#[actix_web::test]
async fn profile_with_stale_token_for_deleted_user() {
    let user = stored_user(3, "carol@example.com", "irrelevant", Role::User);
    let token = access_token_for(&user);
    let (status, body) = get_with_token("/user/me", Some(&token), None).await;
    assert_eq!(status.as_u16(), StatusCode::UNAUTHORIZED.as_u16());
    assert_eq!(body, r#"{"error":"Authentication Error. User account not found."}"#);
}

#[actix_web::test]
async fn profile_with_expired_token() {
    let user = stored_user(3, "carol@example.com", "irrelevant", Role::User);
    let issuer = TokenIssuer::new(&test_auth_config());
    let token = issuer.issue(TokenKind::Access, &user, Duration::seconds(-5)).unwrap();
    let (status, body) = get_with_token("/user/me", Some(&token), Some(user)).await;
    assert_eq!(status.as_u16(), StatusCode::UNAUTHORIZED.as_u16());
    assert!(body.contains("Auth token has expired."), "was: {body}");
}

#[actix_web::test]
async fn profile_with_refresh_token_is_rejected() {
    // A leaked refresh token must not authorize requests
    let user = stored_user(3, "carol@example.com", "irrelevant", Role::User);
    let issuer = TokenIssuer::new(&test_auth_config());
    let token = issuer.issue(TokenKind::Refresh, &user, Duration::minutes(5)).unwrap();
    let (status, body) = get_with_token("/user/me", Some(&token), Some(user)).await;
    assert_eq!(status.as_u16(), StatusCode::UNAUTHORIZED.as_u16());
    assert!(body.contains("not valid for this operation"), "was: {body}");
}

#[actix_web::test]
async fn my_accounts_lists_balances() {
    let user = stored_user(3, "carol@example.com", "irrelevant", Role::User);
    let token = access_token_for(&user);
    let (status, body) = get_with_token("/user/me/accounts", Some(&token), Some(user)).await;
    assert!(status.is_success(), "was: {body}");
    assert!(body.contains(r#""balance":250.5"#), "was: {body}");
    assert!(body.contains(r#""owner_id":3"#), "was: {body}");
}

#[actix_web::test]
async fn my_payments_lists_booked_payments() {
    let user = stored_user(3, "carol@example.com", "irrelevant", Role::User);
    let token = access_token_for(&user);
    let (status, body) = get_with_token("/user/me/payments", Some(&token), Some(user)).await;
    assert!(status.is_success(), "was: {body}");
    assert!(body.contains(r#""transaction_id":"tx-100""#), "was: {body}");
}
