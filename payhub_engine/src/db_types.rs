use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use ph_common::Money;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

//--------------------------------------        Role         ---------------------------------------------------------
/// The authorization level attached to a user record.
///
/// This enum is the single authoritative validator for roles: the JSON deserializer, the database
/// encoding and [`FromStr`] all go through it, so an out-of-range role string is rejected before
/// it can reach a write path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Role must be 'user' or 'admin', but got {0}")]
pub struct InvalidRoleError(String);

impl FromStr for Role {
    type Err = InvalidRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            s => Err(InvalidRoleError(s.to_string())),
        }
    }
}

//--------------------------------------        User         ---------------------------------------------------------
/// A user record. Deliberately does not derive `Serialize`: the password hash must never end up
/// in a response body, so the server exposes users through its own response type.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

//--------------------------------------       NewUser       ---------------------------------------------------------
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub email: String,
    /// The password hash in PHC string format, as produced by [`crate::helpers::hash_password`].
    pub password_hash: String,
    pub full_name: String,
    pub role: Role,
}

//--------------------------------------      UserUpdate     ---------------------------------------------------------
/// A partial update for a user record. Every mutable attribute is optional; absent fields are left
/// untouched. The password hash is not updatable through this path.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub role: Option<Role>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.full_name.is_none() && self.role.is_none()
    }
}

//--------------------------------------       Account       ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Account {
    pub id: i64,
    /// The user that owns this account. Accounts provisioned by webhooks may reference an owner id
    /// that does not (yet) exist in the users table.
    pub owner_id: i64,
    pub balance: Money,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------       Payment       ---------------------------------------------------------
/// A booked payment. Immutable once created.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Payment {
    pub id: i64,
    /// The globally unique transaction identifier assigned by the upstream payment provider.
    pub transaction_id: String,
    pub amount: Money,
    pub account_id: i64,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------      NewPayment     ---------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPayment {
    pub transaction_id: String,
    /// The owner the account will be assigned to, should it need to be created.
    pub user_id: i64,
    pub account_id: i64,
    pub amount: Money,
}

impl NewPayment {
    pub fn new(transaction_id: String, user_id: i64, account_id: i64, amount: Money) -> Self {
        Self { transaction_id, user_id, account_id, amount }
    }
}

impl Display for NewPayment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Payment [{}] of {} to account #{} (owner {})", self.transaction_id, self.amount, self.account_id, self.user_id)
    }
}
