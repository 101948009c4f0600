use std::{env, io::Write};

use chrono::Duration;
use jsonwebtoken::Algorithm;
use log::*;
use ph_common::Secret;
use rand::{distributions::Alphanumeric, thread_rng, Rng};
use serde_json::json;
use tempfile::NamedTempFile;

use crate::errors::ServerError;

const DEFAULT_PH_HOST: &str = "127.0.0.1";
const DEFAULT_PH_PORT: u16 = 8480;
const DEFAULT_ACCESS_TOKEN_EXPIRY: Duration = Duration::minutes(15);
const DEFAULT_REFRESH_TOKEN_EXPIRY: Duration = Duration::minutes(10_080);

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub auth: AuthConfig,
    /// The shared secret used to verify the signature field on incoming webhook notifications.
    pub webhook_secret: Secret<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_PH_HOST.to_string(),
            port: DEFAULT_PH_PORT,
            database_url: String::default(),
            auth: AuthConfig::default(),
            webhook_secret: Secret::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_env_or_default() -> Self {
        let host = env::var("PH_HOST").ok().unwrap_or_else(|| DEFAULT_PH_HOST.into());
        let port = env::var("PH_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for PH_PORT. {e} Using the default, {DEFAULT_PH_PORT}, instead."
                    );
                    DEFAULT_PH_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_PH_PORT);
        let database_url = env::var("PH_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ PH_DATABASE_URL is not set. Please set it to the URL for the Payhub database.");
            String::default()
        });
        let auth = AuthConfig::try_from_env().unwrap_or_else(|e| {
            warn!(
                "🪛️ Could not load the authentication configuration from environment variables. {e}. Reverting to the \
                 default configuration."
            );
            AuthConfig::default()
        });
        let webhook_secret = env::var("PH_WEBHOOK_SECRET").ok().unwrap_or_else(|| {
            error!(
                "🪛️ PH_WEBHOOK_SECRET is not set. Please set it to the shared secret your payment provider signs \
                 webhook notifications with. Until then, every webhook delivery will be rejected."
            );
            String::default()
        });
        Self { host, port, database_url, auth, webhook_secret: Secret::new(webhook_secret) }
    }
}

//-------------------------------------------------  AuthConfig  -------------------------------------------------------
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// The shared secret used to sign and verify JWTs.
    pub jwt_secret: Secret<String>,
    /// The signing algorithm. Must be one of the HMAC family (HS256, HS384, HS512), since signing
    /// and verification share a single secret.
    pub algorithm: Algorithm,
    pub access_token_expiry: Duration,
    pub refresh_token_expiry: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        let mut tmpfile = NamedTempFile::new().ok().and_then(|f| f.keep().ok());
        warn!(
            "🚨️🚨️🚨️ The JWT signing secret has not been set. I'm using a random value for this session. DO NOT \
             operate on production like this, since every token will be invalidated when the server restarts. 🚨️🚨️🚨️"
        );
        let secret: String = thread_rng().sample_iter(&Alphanumeric).take(48).map(char::from).collect();
        match &mut tmpfile {
            Some((f, p)) => {
                let key_data = json!({ "jwt_secret": secret }).to_string();
                match writeln!(f, "{key_data}") {
                    Ok(()) => warn!(
                        "🚨️🚨️🚨️ The JWT signing secret for this session was written to {}. If this is a production \
                         instance, you are doing it wrong! Set the PH_JWT_SECRET environment variable instead. 🚨️🚨️🚨️",
                        p.to_str().unwrap_or("???")
                    ),
                    Err(e) => warn!("🪛️ Could not write the JWT signing secret to the temporary file. {e}"),
                }
            },
            None => {
                warn!("🪛️ Could not create a temporary file to store the JWT signing secret. ");
            },
        }
        Self {
            jwt_secret: Secret::new(secret),
            algorithm: Algorithm::HS256,
            access_token_expiry: DEFAULT_ACCESS_TOKEN_EXPIRY,
            refresh_token_expiry: DEFAULT_REFRESH_TOKEN_EXPIRY,
        }
    }
}

impl AuthConfig {
    pub fn try_from_env() -> Result<Self, ServerError> {
        let jwt_secret =
            env::var("PH_JWT_SECRET").map_err(|e| ServerError::ConfigurationError(format!("{e} [PH_JWT_SECRET]")))?;
        let algorithm = match env::var("PH_JWT_ALGORITHM") {
            Ok(s) => s.parse::<Algorithm>().map_err(|_| {
                ServerError::ConfigurationError(format!("Invalid algorithm in PH_JWT_ALGORITHM: {s}"))
            })?,
            Err(_) => {
                info!("🪛️ PH_JWT_ALGORITHM is not set. Using the default, HS256.");
                Algorithm::HS256
            },
        };
        if !matches!(algorithm, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512) {
            return Err(ServerError::ConfigurationError(format!(
                "{algorithm:?} is not a shared-secret algorithm. Use one of HS256, HS384 or HS512."
            )));
        }
        let (access_token_expiry, refresh_token_expiry) = configure_token_expiries();
        Ok(Self { jwt_secret: Secret::new(jwt_secret), algorithm, access_token_expiry, refresh_token_expiry })
    }
}

fn configure_token_expiries() -> (Duration, Duration) {
    let access_token_expiry = env::var("PH_ACCESS_TOKEN_EXPIRY_MINUTES")
        .map_err(|_| {
            info!(
                "🪛️ PH_ACCESS_TOKEN_EXPIRY_MINUTES is not set. Using the default value of {} min.",
                DEFAULT_ACCESS_TOKEN_EXPIRY.num_minutes()
            )
        })
        .and_then(|s| {
            s.parse::<i64>()
                .map(Duration::minutes)
                .map_err(|e| warn!("🪛️ Invalid configuration value for PH_ACCESS_TOKEN_EXPIRY_MINUTES. {e}"))
        })
        .ok()
        .unwrap_or(DEFAULT_ACCESS_TOKEN_EXPIRY);
    let refresh_token_expiry = env::var("PH_REFRESH_TOKEN_EXPIRY_MINUTES")
        .map_err(|_| {
            info!(
                "🪛️ PH_REFRESH_TOKEN_EXPIRY_MINUTES is not set. Using the default value of {} min.",
                DEFAULT_REFRESH_TOKEN_EXPIRY.num_minutes()
            )
        })
        .and_then(|s| {
            s.parse::<i64>()
                .map(Duration::minutes)
                .map_err(|e| warn!("🪛️ Invalid configuration value for PH_REFRESH_TOKEN_EXPIRY_MINUTES. {e}"))
        })
        .ok()
        .unwrap_or(DEFAULT_REFRESH_TOKEN_EXPIRY);
    (access_token_expiry, refresh_token_expiry)
}

//-------------------------------------------------  WebhookConfig  ----------------------------------------------------
/// The subset of the server configuration needed by the webhook endpoint. Kept small so that
/// request handlers do not carry the rest of the configuration (and its secrets) around.
#[derive(Clone, Debug, Default)]
pub struct WebhookConfig {
    pub secret: Secret<String>,
}

impl WebhookConfig {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self { secret: config.webhook_secret.clone() }
    }

    pub fn new<S: Into<String>>(secret: S) -> Self {
        Self { secret: Secret::new(secret.into()) }
    }
}
