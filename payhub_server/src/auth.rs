//! Token issuance and validation, and the identity checks built on top of it.
//!
//! Two kinds of token are issued: short-lived `access` tokens that authorize individual requests
//! and carry the user's role, and long-lived `refresh` tokens whose only purpose is to mint new
//! access tokens. The kind is embedded in the claims and checked on validation, so a leaked
//! refresh token cannot be used to call protected endpoints, and an access token cannot be used
//! to refresh itself indefinitely.
//!
//! Tokens are self-contained: validity is determined entirely by the signature and the embedded
//! expiry. There is no revocation list; once issued, a token lives until its natural expiry.

use std::{
    fmt::Display,
    future::{ready, Ready},
};

use actix_web::{dev::Payload, http::header, FromRequest, HttpRequest, web};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use log::debug;
use payhub_engine::{
    db_types::{Role, User},
    AuthApi,
    UserManagement,
};
use serde::{Deserialize, Serialize};

use crate::{
    config::AuthConfig,
    data_objects::{AccessTokenResponse, TokenPair},
    errors::{AuthError, ServerError},
};

pub const TOKEN_TYPE_BEARER: &str = "bearer";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Access => write!(f, "access"),
            TokenKind::Refresh => write!(f, "refresh"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// The email address of the user the token was issued to.
    pub sub: String,
    pub id: i64,
    pub role: Role,
    #[serde(rename = "type")]
    pub token_kind: TokenKind,
    /// Unix timestamp of the expiry instant.
    pub exp: i64,
}

pub struct TokenIssuer {
    header: Header,
    validation: Validation,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_expiry: Duration,
    refresh_token_expiry: Duration,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.jwt_secret.reveal().as_bytes();
        let mut validation = Validation::new(config.algorithm);
        // A token is invalid from its expiry instant; no grace period.
        validation.leeway = 0;
        Self {
            header: Header::new(config.algorithm),
            validation,
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            access_token_expiry: config.access_token_expiry,
            refresh_token_expiry: config.refresh_token_expiry,
        }
    }

    /// Issue a token of the given kind for the given user, expiring `ttl` from now.
    pub fn issue(&self, kind: TokenKind, user: &User, ttl: Duration) -> Result<String, AuthError> {
        let claims = JwtClaims {
            sub: user.email.clone(),
            id: user.id,
            role: user.role,
            token_kind: kind,
            exp: (Utc::now() + ttl).timestamp(),
        };
        let token = encode(&self.header, &claims, &self.encoding_key)
            .map_err(|e| AuthError::MalformedClaims(format!("{e}")))?;
        debug!("🔐️ Issued {kind} token for {} (expires {})", claims.sub, claims.exp);
        Ok(token)
    }

    /// Issue a fresh access token for the given user, using the configured access expiry.
    pub fn issue_access(&self, user: &User) -> Result<AccessTokenResponse, AuthError> {
        let access_token = self.issue(TokenKind::Access, user, self.access_token_expiry)?;
        Ok(AccessTokenResponse { access_token, token_type: TOKEN_TYPE_BEARER.to_string() })
    }

    /// Issue an access/refresh token pair for the given user, using the configured expiries.
    pub fn issue_pair(&self, user: &User) -> Result<TokenPair, AuthError> {
        let access_token = self.issue(TokenKind::Access, user, self.access_token_expiry)?;
        let refresh_token = self.issue(TokenKind::Refresh, user, self.refresh_token_expiry)?;
        Ok(TokenPair { access_token, refresh_token, token_type: TOKEN_TYPE_BEARER.to_string() })
    }

    /// Validate a token and return its claims.
    ///
    /// Fails with [`AuthError::InvalidSignature`] if the signature does not verify,
    /// [`AuthError::Expired`] if the expiry instant has passed, [`AuthError::WrongKind`] if the
    /// embedded kind is not `expected_kind`, and [`AuthError::MalformedClaims`] if required
    /// claims are absent.
    pub fn validate(&self, token: &str, expected_kind: TokenKind) -> Result<JwtClaims, AuthError> {
        let data = decode::<JwtClaims>(token, &self.decoding_key, &self.validation).map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::Expired,
            ErrorKind::Json(_) | ErrorKind::MissingRequiredClaim(_) => AuthError::MalformedClaims(format!("{e}")),
            _ => AuthError::InvalidSignature,
        })?;
        let claims = data.claims;
        if claims.token_kind != expected_kind {
            debug!("🔐️ A {} token was presented where a {expected_kind} token was required", claims.token_kind);
            return Err(AuthError::WrongKind);
        }
        if claims.sub.trim().is_empty() {
            return Err(AuthError::MalformedClaims("The subject claim is empty".to_string()));
        }
        Ok(claims)
    }
}

/// Extracting `JwtClaims` performs the bearer-token check: the `Authorization` header must carry
/// a valid, unexpired access token. Handlers that take `JwtClaims` as an argument are therefore
/// only ever invoked for authenticated callers.
impl FromRequest for JwtClaims {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(claims_from_request(req))
    }
}

fn claims_from_request(req: &HttpRequest) -> Result<JwtClaims, ServerError> {
    let issuer = req
        .app_data::<web::Data<TokenIssuer>>()
        .ok_or_else(|| ServerError::InitializeError("No TokenIssuer configured on the server".to_string()))?;
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(AuthError::MissingToken)?;
    let claims = issuer.validate(token, TokenKind::Access)?;
    Ok(claims)
}

/// Look up the identity behind a validated token. Tokens outlive user records: a user can be
/// deleted while still holding a valid token, so the lookup can legitimately come up empty. That
/// staleness window is bounded by the access-token expiry.
pub async fn resolve_identity<B: UserManagement>(
    claims: &JwtClaims,
    api: &AuthApi<B>,
) -> Result<User, ServerError> {
    let user = api.fetch_user_by_email(&claims.sub).await?;
    user.ok_or_else(|| {
        debug!("🔐️ Token subject {} no longer has a user record", claims.sub);
        AuthError::UserNotFound.into()
    })
}

/// Capability check for role-gated operations.
pub fn require_role(user: &User, role: Role) -> Result<(), AuthError> {
    if user.role == role {
        Ok(())
    } else {
        debug!("🔐️ User {} does not hold the {role} role", user.email);
        Err(AuthError::Forbidden(format!("The {role} role is required for this operation")))
    }
}
