//! Payhub Engine
//!
//! The Payhub Engine contains the core logic for the payment gateway: user management, account
//! balances and the webhook-driven payment booking flow. It is server-agnostic.
//!
//! The library is divided into two main sections:
//! 1. Database management and control ([`mod@sqlite`]). You should never need to access the
//!    database directly. Instead, use the public API provided by the engine. The exception is the
//!    data types used in the database, which are defined in the `db_types` module and are public.
//! 2. The engine public API ([`mod@api`]). This provides the public-facing functionality of the
//!    engine: authentication, user administration, account queries and payment intake. Specific
//!    backends need to implement the traits in the [`mod@traits`] module in order to act as a
//!    backend for the Payhub server.
pub mod api;
pub mod db_types;
pub mod helpers;
pub mod traits;

#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use api::{
    accounts_api::AccountApi,
    auth_api::{AuthApi, AuthApiError},
    payment_flow_api::PaymentFlowApi,
    user_api::UserApi,
};
pub use traits::{
    AccountApiError,
    AccountManagement,
    PaymentGatewayDatabase,
    PaymentGatewayError,
    UserApiError,
    UserManagement,
};
