use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use payhub_engine::{AccountApiError, AuthApiError, UserApiError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Authentication Error. {0}")]
    AuthenticationError(#[from] AuthError),
    #[error("{0}")]
    WebhookError(#[from] WebhookError),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::AuthenticationError(e) => match e {
                AuthError::Forbidden(_) => StatusCode::FORBIDDEN,
                _ => StatusCode::UNAUTHORIZED,
            },
            Self::WebhookError(_) => StatusCode::BAD_REQUEST,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

/// The ways a bearer token (or the identity behind it) can fail to authorize a request.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("Auth token signature is invalid.")]
    InvalidSignature,
    #[error("Auth token has expired.")]
    Expired,
    #[error("Auth token is not valid for this operation.")]
    WrongKind,
    #[error("Auth token claims are malformed. {0}")]
    MalformedClaims(String),
    #[error("Auth token missing or not provided.")]
    MissingToken,
    #[error("User account not found.")]
    UserNotFound,
    #[error("Insufficient Permissions. {0}")]
    Forbidden(String),
}

/// The client-facing failures of the webhook endpoint. The messages are part of the wire
/// contract with the payment provider.
#[derive(Debug, Clone, Error)]
pub enum WebhookError {
    #[error("Invalid signature")]
    BadSignature,
    #[error("Transaction already processed")]
    DuplicateTransaction,
}

impl From<AuthApiError> for ServerError {
    fn from(e: AuthApiError) -> Self {
        match e {
            AuthApiError::InvalidCredentials => Self::InvalidCredentials,
            AuthApiError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
        }
    }
}

impl From<UserApiError> for ServerError {
    fn from(e: UserApiError) -> Self {
        match e {
            UserApiError::UserNotFound(_) => Self::NoRecordFound(e.to_string()),
            UserApiError::EmailAlreadyExists(_) => Self::InvalidRequestBody(e.to_string()),
            UserApiError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
        }
    }
}

impl From<AccountApiError> for ServerError {
    fn from(e: AccountApiError) -> Self {
        Self::BackendError(e.to_string())
    }
}
