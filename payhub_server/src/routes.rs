//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests:
//! ```nocompile
//!     fn my_handler() -> impl Responder {
//!         std::thread::sleep(Duration::from_secs(5)); // <-- Bad practice! Will cause the current worker thread to
//! hang!
//!     }
//! ```
//! For this reason, any long, non-cpu-bound operation (e.g. I/O, database operations, etc.) should be expressed as
//! futures or asynchronous functions. Async handlers get executed concurrently by worker threads and thus don’t block
//! execution:
//!
//! ```nocompile
//!     async fn my_handler() -> impl Responder {
//!         tokio::time::sleep(Duration::from_secs(5)).await; // <-- Ok. Worker thread will handle other requests here
//!     }
//! ```
use actix_web::{get, web, HttpResponse, Responder};
use log::*;
use payhub_engine::{
    db_types::{Role, User, UserUpdate},
    AccountApi,
    AccountManagement,
    AuthApi,
    UserApi,
    UserManagement,
};

use crate::{
    auth::{require_role, resolve_identity, JwtClaims, TokenIssuer, TokenKind},
    data_objects::{DetailResponse, LoginRequest, NewUserRequest, RefreshRequest, UserResponse},
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Auth  ----------------------------------------------------
route!(login => Post "/login" impl UserManagement);
/// Route handler for the login endpoint
///
/// Checks the supplied email and password and, if they match a stored user record, issues an
/// access/refresh token pair. The failure response is the same generic 401 whether the email is
/// unknown or the password is wrong, so the endpoint cannot be used to enumerate accounts.
pub async fn login<B: UserManagement>(
    body: web::Json<LoginRequest>,
    api: web::Data<AuthApi<B>>,
    signer: web::Data<TokenIssuer>,
) -> Result<HttpResponse, ServerError> {
    let LoginRequest { email, password } = body.into_inner();
    debug!("💻️ POST login for {email}");
    let user = api.authenticate(&email, &password).await?;
    let pair = signer.issue_pair(&user)?;
    info!("💻️ {} logged in and received a new token pair", user.email);
    Ok(HttpResponse::Ok().json(pair))
}

route!(refresh_token => Post "/refresh_token" impl UserManagement);
/// Route handler for the refresh endpoint
///
/// Exchanges a valid refresh token for a new access token. Only `refresh` tokens are accepted
/// here; presenting an access token fails with a 401. The user record is re-read, so the new
/// access token reflects the current role even if it changed after the refresh token was issued.
pub async fn refresh_token<B: UserManagement>(
    body: web::Json<RefreshRequest>,
    api: web::Data<AuthApi<B>>,
    signer: web::Data<TokenIssuer>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ POST refresh_token");
    let claims = signer.validate(&body.refresh_token_str, TokenKind::Refresh)?;
    let user = resolve_identity(&claims, api.as_ref()).await?;
    let access = signer.issue_access(&user)?;
    debug!("💻️ Issued a fresh access token for {}", user.email);
    Ok(HttpResponse::Ok().json(access))
}

//----------------------------------------------   Profile  ----------------------------------------------------
route!(my_profile => Get "/user/me" impl UserManagement);
/// Route handler for the `/user/me` endpoint
///
/// Returns the authenticated caller's own user record. The record behind the token subject is
/// re-read on every call, so a deleted user holding a still-valid token gets a 401 here.
pub async fn my_profile<B: UserManagement>(
    claims: JwtClaims,
    api: web::Data<AuthApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET my_profile for {}", claims.sub);
    let user = resolve_identity(&claims, api.as_ref()).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

route!(my_accounts => Get "/user/me/accounts" impl UserManagement, AccountManagement);
/// Route handler for the `/user/me/accounts` endpoint
///
/// Returns the accounts owned by the authenticated caller, with their current balances.
pub async fn my_accounts<TUser: UserManagement, TAcc: AccountManagement>(
    claims: JwtClaims,
    auth: web::Data<AuthApi<TUser>>,
    accounts: web::Data<AccountApi<TAcc>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET my_accounts for {}", claims.sub);
    let user = resolve_identity(&claims, auth.as_ref()).await?;
    let accounts = accounts.accounts_for_user(user.id).await?;
    Ok(HttpResponse::Ok().json(accounts))
}

route!(my_payments => Get "/user/me/payments" impl UserManagement, AccountManagement);
/// Route handler for the `/user/me/payments` endpoint
///
/// Returns every payment booked against any of the caller's accounts.
pub async fn my_payments<TUser: UserManagement, TAcc: AccountManagement>(
    claims: JwtClaims,
    auth: web::Data<AuthApi<TUser>>,
    accounts: web::Data<AccountApi<TAcc>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET my_payments for {}", claims.sub);
    let user = resolve_identity(&claims, auth.as_ref()).await?;
    let payments = accounts.payments_for_user(user.id).await?;
    Ok(HttpResponse::Ok().json(payments))
}

//----------------------------------------------   Admin  ----------------------------------------------------
route!(all_users => Get "/users/all" impl UserManagement);
/// Route handler for the `/users/all` endpoint
///
/// Admin users can fetch the full user list. Like every admin route, this resolves the caller's
/// identity and checks the admin role before doing anything else.
pub async fn all_users<B: UserManagement>(
    claims: JwtClaims,
    auth: web::Data<AuthApi<B>>,
    api: web::Data<UserApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let admin = resolve_admin(&claims, auth.as_ref()).await?;
    debug!("💻️ GET all_users for admin {}", admin.email);
    let users = api.all_users().await?.into_iter().map(UserResponse::from).collect::<Vec<UserResponse>>();
    Ok(HttpResponse::Ok().json(users))
}

route!(create_user => Post "/users/new" impl UserManagement);
/// Route handler for creating users
///
/// Admin users can create new user records. The role field goes through the [`Role`] enum, so an
/// out-of-range role never reaches the database.
pub async fn create_user<B: UserManagement>(
    claims: JwtClaims,
    body: web::Json<NewUserRequest>,
    auth: web::Data<AuthApi<B>>,
    api: web::Data<UserApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let admin = resolve_admin(&claims, auth.as_ref()).await?;
    let new_user = body.into_inner();
    debug!("💻️ POST create_user {} by admin {}", new_user.email, admin.email);
    let user = api.create_user(new_user.into()).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

route!(user_by_id => Get "/users/{user_id}" impl UserManagement);
/// Route handler for fetching a single user by id. Admin only.
pub async fn user_by_id<B: UserManagement>(
    claims: JwtClaims,
    path: web::Path<i64>,
    auth: web::Data<AuthApi<B>>,
    api: web::Data<UserApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let _admin = resolve_admin(&claims, auth.as_ref()).await?;
    let user_id = path.into_inner();
    debug!("💻️ GET user_by_id({user_id})");
    let user = api
        .user_by_id(user_id)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("User with id {user_id} does not exist")))?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

route!(update_user => Patch "/users/{user_id}" impl UserManagement);
/// Route handler for partially updating a user. Admin only.
///
/// Only the fields present in the body are touched. Each present field is validated on
/// deserialization, so e.g. an invalid role is rejected before the handler runs.
pub async fn update_user<B: UserManagement>(
    claims: JwtClaims,
    path: web::Path<i64>,
    body: web::Json<UserUpdate>,
    auth: web::Data<AuthApi<B>>,
    api: web::Data<UserApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let admin = resolve_admin(&claims, auth.as_ref()).await?;
    let user_id = path.into_inner();
    debug!("💻️ PATCH update_user({user_id}) by admin {}", admin.email);
    let user = api.update_user(user_id, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

route!(delete_user => Delete "/users/{user_id}" impl UserManagement);
/// Route handler for deleting a user. Admin only.
///
/// Deletes the user record along with the accounts it owns and their payments.
pub async fn delete_user<B: UserManagement>(
    claims: JwtClaims,
    path: web::Path<i64>,
    auth: web::Data<AuthApi<B>>,
    api: web::Data<UserApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let admin = resolve_admin(&claims, auth.as_ref()).await?;
    let user_id = path.into_inner();
    debug!("💻️ DELETE user({user_id}) by admin {}", admin.email);
    api.delete_user(user_id).await?;
    Ok(HttpResponse::Ok().json(DetailResponse::new("User deleted")))
}

route!(user_accounts => Get "/users/{user_id}/accounts" impl UserManagement, AccountManagement);
/// Route handler for fetching the accounts of an arbitrary user. Admin only.
pub async fn user_accounts<TUser: UserManagement, TAcc: AccountManagement>(
    claims: JwtClaims,
    path: web::Path<i64>,
    auth: web::Data<AuthApi<TUser>>,
    accounts: web::Data<AccountApi<TAcc>>,
) -> Result<HttpResponse, ServerError> {
    let _admin = resolve_admin(&claims, auth.as_ref()).await?;
    let user_id = path.into_inner();
    debug!("💻️ GET user_accounts({user_id})");
    let accounts = accounts.accounts_for_user(user_id).await?;
    Ok(HttpResponse::Ok().json(accounts))
}

/// Every administrative operation goes through this gate: resolve the identity behind the token,
/// then check the admin role against the freshly-loaded record (not the token claims, which may
/// be stale).
pub async fn resolve_admin<B: UserManagement>(claims: &JwtClaims, api: &AuthApi<B>) -> Result<User, ServerError> {
    let user = resolve_identity(claims, api).await?;
    require_role(&user, Role::Admin)?;
    Ok(user)
}
