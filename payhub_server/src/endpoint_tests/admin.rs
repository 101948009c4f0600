use actix_web::{
    body::MessageBody,
    http::{Method, StatusCode},
    test,
    test::TestRequest,
    web,
    web::ServiceConfig,
    App,
};
use chrono::Duration;
use payhub_engine::{
    db_types::{Role, User},
    traits::UserApiError,
    AccountApi,
    AuthApi,
    UserApi,
};

use super::{auth::test_auth_config, mocks::*};
use crate::{
    auth::{TokenIssuer, TokenKind},
    routes::{AllUsersRoute, CreateUserRoute, DeleteUserRoute, UpdateUserRoute, UserAccountsRoute, UserByIdRoute},
};

/// Configures every admin route with mocks. `caller` is what the identity lookup resolves the
/// bearer token to.
fn configure_app(caller: Option<User>) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let mut auth_manager = MockUserManager::new();
        auth_manager.expect_fetch_user_by_email().returning(move |_| Ok(caller.clone()));

        let mut user_manager = MockUserManager::new();
        user_manager.expect_fetch_all_users().returning(|| {
            Ok(vec![
                stored_user(1, "admin@example.com", "hash-one", Role::Admin),
                stored_user(2, "user@example.com", "hash-two", Role::User),
            ])
        });
        user_manager.expect_fetch_user_by_id().returning(|user_id| match user_id {
            2 => Ok(Some(stored_user(2, "user@example.com", "hash-two", Role::User))),
            _ => Ok(None),
        });
        user_manager.expect_insert_user().returning(|new_user| {
            if new_user.email == "taken@example.com" {
                Err(UserApiError::EmailAlreadyExists(new_user.email))
            } else {
                Ok(stored_user(3, &new_user.email, &new_user.password_hash, new_user.role))
            }
        });
        user_manager.expect_update_user().returning(|user_id, update| {
            let mut user = stored_user(user_id, "user@example.com", "hash-two", Role::User);
            if let Some(full_name) = update.full_name {
                user.full_name = full_name;
            }
            if let Some(role) = update.role {
                user.role = role;
            }
            Ok(user)
        });
        user_manager.expect_delete_user().returning(|_| Ok(()));

        let mut account_manager = MockAccountManager::new();
        account_manager
            .expect_fetch_accounts_for_user()
            .returning(|user_id| Ok(vec![stored_account(55, user_id, 99.5)]));

        cfg.app_data(web::Data::new(AuthApi::new(auth_manager)))
            .app_data(web::Data::new(UserApi::new(user_manager)))
            .app_data(web::Data::new(AccountApi::new(account_manager)))
            .app_data(web::Data::new(TokenIssuer::new(&test_auth_config())))
            .service(AllUsersRoute::<MockUserManager>::new())
            .service(CreateUserRoute::<MockUserManager>::new())
            .service(UserAccountsRoute::<MockUserManager, MockAccountManager>::new())
            .service(UserByIdRoute::<MockUserManager>::new())
            .service(UpdateUserRoute::<MockUserManager>::new())
            .service(DeleteUserRoute::<MockUserManager>::new());
    }
}

fn token_for(user: &User) -> String {
    let issuer = TokenIssuer::new(&test_auth_config());
    issuer.issue(TokenKind::Access, user, Duration::minutes(5)).unwrap()
}

async fn request(
    method: Method,
    path: &str,
    body: Option<serde_json::Value>,
    caller: Option<User>,
) -> (StatusCode, String) {
    let _ = env_logger::try_init().ok();
    let token = caller.as_ref().map(token_for);
    let mut req = TestRequest::with_uri(path).method(method);
    if let Some(token) = token {
        req = req.insert_header(("Authorization", format!("Bearer {token}")));
    }
    if let Some(body) = body {
        req = req.set_json(body);
    }
    let app = App::new().configure(configure_app(caller));
    let app = test::init_service(app).await;
    let (_, res) = test::call_service(&app, req.to_request()).await.into_parts();
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    (status, body)
}

fn admin() -> User {
    stored_user(1, "admin@example.com", "hash-one", Role::Admin)
}

fn plain_user() -> User {
    stored_user(2, "user@example.com", "hash-two", Role::User)
}

#[actix_web::test]
async fn admins_can_list_all_users() {
    let (status, body) = request(Method::GET, "/users/all", None, Some(admin())).await;
    assert!(status.is_success(), "was: {body}");
    assert!(body.contains("admin@example.com"), "was: {body}");
    assert!(body.contains("user@example.com"), "was: {body}");
    assert!(!body.contains("hash-"), "Password hashes must not be exposed: {body}");
}

#[actix_web::test]
async fn every_admin_route_rejects_plain_users() {
    let new_user = serde_json::json!({
        "email": "new@example.com", "hashed_password": "h", "full_name": "N", "role": "user"
    });
    let patch = serde_json::json!({"full_name": "Renamed"});
    let cases = [
        (Method::GET, "/users/all", None),
        (Method::POST, "/users/new", Some(new_user)),
        (Method::GET, "/users/2", None),
        (Method::PATCH, "/users/2", Some(patch)),
        (Method::DELETE, "/users/2", None),
        (Method::GET, "/users/2/accounts", None),
    ];
    for (method, path, body) in cases {
        let (status, body) = request(method.clone(), path, body, Some(plain_user())).await;
        assert_eq!(
            status.as_u16(),
            StatusCode::FORBIDDEN.as_u16(),
            "{method} {path} must be admin-gated, was: {body}"
        );
        assert!(body.contains("Insufficient Permissions."), "was: {body}");
    }
}

#[actix_web::test]
async fn admin_routes_reject_anonymous_callers() {
    let (status, body) = request(Method::GET, "/users/all", None, None).await;
    assert_eq!(status.as_u16(), StatusCode::UNAUTHORIZED.as_u16(), "was: {body}");
}

#[actix_web::test]
async fn fetching_a_user_by_id() {
    let (status, body) = request(Method::GET, "/users/2", None, Some(admin())).await;
    assert!(status.is_success(), "was: {body}");
    assert!(body.contains("user@example.com"), "was: {body}");

    let (status, body) = request(Method::GET, "/users/404", None, Some(admin())).await;
    assert_eq!(status.as_u16(), StatusCode::NOT_FOUND.as_u16(), "was: {body}");
}

#[actix_web::test]
async fn creating_a_user() {
    let new_user = serde_json::json!({
        "email": "new@example.com", "hashed_password": "a-hash", "full_name": "Newbie", "role": "user"
    });
    let (status, body) = request(Method::POST, "/users/new", Some(new_user), Some(admin())).await;
    assert!(status.is_success(), "was: {body}");
    assert!(body.contains("new@example.com"), "was: {body}");
}

#[actix_web::test]
async fn creating_a_user_with_a_taken_email() {
    let new_user = serde_json::json!({
        "email": "taken@example.com", "hashed_password": "a-hash", "full_name": "Dup", "role": "user"
    });
    let (status, body) = request(Method::POST, "/users/new", Some(new_user), Some(admin())).await;
    assert_eq!(status.as_u16(), StatusCode::BAD_REQUEST.as_u16(), "was: {body}");
    assert!(body.contains("already exists"), "was: {body}");
}

#[actix_web::test]
async fn creating_a_user_with_an_invalid_role() {
    // "superuser" is not a role; deserialization rejects it before the handler runs
    let new_user = serde_json::json!({
        "email": "new@example.com", "hashed_password": "a-hash", "full_name": "N", "role": "superuser"
    });
    let (status, _body) = request(Method::POST, "/users/new", Some(new_user), Some(admin())).await;
    assert_eq!(status.as_u16(), StatusCode::BAD_REQUEST.as_u16());
}

#[actix_web::test]
async fn updating_a_user() {
    let patch = serde_json::json!({"full_name": "Renamed", "role": "admin"});
    let (status, body) = request(Method::PATCH, "/users/2", Some(patch), Some(admin())).await;
    assert!(status.is_success(), "was: {body}");
    assert!(body.contains("Renamed"), "was: {body}");
    assert!(body.contains(r#""role":"admin""#), "was: {body}");
}

#[actix_web::test]
async fn deleting_a_user() {
    let (status, body) = request(Method::DELETE, "/users/2", None, Some(admin())).await;
    assert!(status.is_success(), "was: {body}");
    assert_eq!(body, r#"{"detail":"User deleted"}"#);
}

#[actix_web::test]
async fn listing_another_users_accounts() {
    let (status, body) = request(Method::GET, "/users/2/accounts", None, Some(admin())).await;
    assert!(status.is_success(), "was: {body}");
    assert!(body.contains(r#""balance":99.5"#), "was: {body}");
}
