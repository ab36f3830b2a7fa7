//! User, session and password-reset data models.
//!
//! Users own accounts and budgets directly, and transactions/invoices
//! transitively through their accounts. Every query in the system filters
//! on the authenticated user — that filter is the only access-control
//! invariant.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role assigned to a user at registration.
///
/// `Owner` may delete accounts; both roles may do everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Owner,
    Accountant,
}

/// A user record from the `users` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    /// Argon2id hash in PHC string format.
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// A single-use password reset token.
///
/// One per user; issuing a new one deletes the old. Expires 24 hours after
/// issue and is deleted on consumption.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PasswordResetToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl PasswordResetToken {
    pub fn is_expired(&self) -> bool {
        self.expires_at < Utc::now()
    }
}

/// Request body for `POST /api/auth/register`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// Request body for `POST /api/auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Response body for a successful login.
///
/// ```json
/// {
///   "token": "pXg4...48 chars...",
///   "token_type": "Bearer",
///   "id": "550e8400-e29b-41d4-a716-446655440000",
///   "username": "alice",
///   "email": "alice@example.com",
///   "role": "OWNER"
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// The opaque bearer token. Only its SHA-256 digest is stored.
    pub token: String,
    pub token_type: &'static str,
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: Role,
}

/// Request body for `POST /api/auth/password/reset-request`.
#[derive(Debug, Deserialize)]
pub struct PasswordResetRequest {
    pub email: String,
}

/// Request body for `POST /api/auth/password/reset`.
#[derive(Debug, Deserialize)]
pub struct PasswordResetConfirm {
    pub token: String,
    pub password: String,
}
