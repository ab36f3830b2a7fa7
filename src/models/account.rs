//! Account data models and API request/response types.
//!
//! This module defines:
//! - `Account`: database entity representing a financial account
//! - `CreateAccountRequest` / `UpdateAccountRequest`: request bodies
//! - `AccountResponse`: response body returned to clients

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Classification of an account on the balance sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "account_type", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum AccountType {
    Asset,
    Liability,
}

/// Represents an account record from the database.
///
/// # Balance Invariant
///
/// `balance` always equals the initial balance plus the signed sum of the
/// transactions currently attached to this account (INCOME adds, EXPENSE
/// subtracts). Only the ledger service mutates it, inside the same
/// database transaction as the transaction row it accounts for.
///
/// Amounts are `NUMERIC(19,4)` in Postgres, mapped to `rust_decimal`.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Account {
    pub id: Uuid,

    /// Owning user. Every account query filters on this column.
    pub user_id: Uuid,

    /// Human-readable name, unique per user.
    pub name: String,

    pub account_type: AccountType,

    /// Current balance. See the invariant above.
    pub balance: Decimal,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for creating a new account.
///
/// ```json
/// {
///   "name": "Business Checking",
///   "type": "ASSET",
///   "initial_balance": "1000.00"
/// }
/// ```
#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    pub name: String,

    #[serde(rename = "type")]
    pub account_type: AccountType,

    /// Starting balance; defaults to zero.
    #[serde(default)]
    pub initial_balance: Decimal,
}

/// Request body for renaming an account.
#[derive(Debug, Deserialize)]
pub struct UpdateAccountRequest {
    pub name: String,
}

/// Response body for account endpoints. Drops the internal `user_id`.
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub account_type: AccountType,
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            name: account.name,
            account_type: account.account_type,
            balance: account.balance,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}
