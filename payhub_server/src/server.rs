use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use payhub_engine::{AccountApi, AuthApi, PaymentFlowApi, SqliteDatabase, UserApi};

use crate::{
    auth::TokenIssuer,
    config::{ServerConfig, WebhookConfig},
    errors::ServerError,
    routes::{
        health,
        AllUsersRoute,
        CreateUserRoute,
        DeleteUserRoute,
        LoginRoute,
        MyAccountsRoute,
        MyPaymentsRoute,
        MyProfileRoute,
        RefreshTokenRoute,
        UpdateUserRoute,
        UserAccountsRoute,
        UserByIdRoute,
    },
    webhook_routes::WebhookRoute,
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let srv = create_server_instance(config, db)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(config: ServerConfig, db: SqliteDatabase) -> Result<Server, ServerError> {
    let host = config.host.clone();
    let port = config.port;
    let srv = HttpServer::new(move || {
        let auth_api = AuthApi::new(db.clone());
        let user_api = UserApi::new(db.clone());
        let accounts_api = AccountApi::new(db.clone());
        let payments_api = PaymentFlowApi::new(db.clone());
        let jwt_signer = TokenIssuer::new(&config.auth);
        let webhook_config = WebhookConfig::from_config(&config);
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("phs::access_log"))
            .app_data(web::Data::new(auth_api))
            .app_data(web::Data::new(user_api))
            .app_data(web::Data::new(accounts_api))
            .app_data(web::Data::new(payments_api))
            .app_data(web::Data::new(jwt_signer))
            .app_data(web::Data::new(webhook_config))
            .service(health)
            .service(LoginRoute::<SqliteDatabase>::new())
            .service(RefreshTokenRoute::<SqliteDatabase>::new())
            .service(MyProfileRoute::<SqliteDatabase>::new())
            .service(MyAccountsRoute::<SqliteDatabase, SqliteDatabase>::new())
            .service(MyPaymentsRoute::<SqliteDatabase, SqliteDatabase>::new())
            // Literal paths must register ahead of the /users/{user_id} matcher
            .service(AllUsersRoute::<SqliteDatabase>::new())
            .service(CreateUserRoute::<SqliteDatabase>::new())
            .service(UserAccountsRoute::<SqliteDatabase, SqliteDatabase>::new())
            .service(UserByIdRoute::<SqliteDatabase>::new())
            .service(UpdateUserRoute::<SqliteDatabase>::new())
            .service(DeleteUserRoute::<SqliteDatabase>::new())
            .service(WebhookRoute::<SqliteDatabase>::new())
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((host.as_str(), port))?
    .run();
    Ok(srv)
}
