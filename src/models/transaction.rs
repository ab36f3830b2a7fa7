//! Transaction data models and API request/response types.
//!
//! A transaction records a single income or expense against one account.
//! The amount is always positive; the direction is carried by
//! `transaction_type`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Direction of a transaction's effect on the account balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "transaction_type", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    /// Adds to the account balance.
    Income,
    /// Subtracts from the account balance.
    Expense,
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionType::Income => f.write_str("INCOME"),
            TransactionType::Expense => f.write_str("EXPENSE"),
        }
    }
}

impl FromStr for TransactionType {
    type Err = ();

    /// Case-insensitive, used by the CSV importer.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "INCOME" => Ok(TransactionType::Income),
            "EXPENSE" => Ok(TransactionType::Expense),
            _ => Err(()),
        }
    }
}

/// Represents a transaction record from the database.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Transaction {
    pub id: Uuid,

    /// Owning account; ownership checks go through this reference.
    pub account_id: Uuid,

    /// Always positive (enforced by a CHECK constraint).
    pub amount: Decimal,

    pub transaction_type: TransactionType,

    /// Free-text category, e.g. "Office Supplies". Budgets and reports
    /// group on this value.
    pub category: String,

    /// When the transaction occurred. Must not be in the future.
    pub date: DateTime<Utc>,

    pub description: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for creating or updating a transaction.
///
/// ```json
/// {
///   "account_id": "550e8400-e29b-41d4-a716-446655440000",
///   "amount": "125.50",
///   "type": "EXPENSE",
///   "category": "Office Supplies",
///   "date": "2024-03-01T10:30:00Z",
///   "description": "Printer paper"
/// }
/// ```
#[derive(Debug, Deserialize)]
pub struct TransactionRequest {
    pub account_id: Uuid,
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub category: String,
    pub date: DateTime<Utc>,
    pub description: Option<String>,
}

/// Response body for transaction endpoints.
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    pub id: Uuid,
    pub account_id: Uuid,
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub category: String,
    pub date: DateTime<Utc>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Transaction> for TransactionResponse {
    fn from(t: Transaction) -> Self {
        Self {
            id: t.id,
            account_id: t.account_id,
            amount: t.amount,
            transaction_type: t.transaction_type,
            category: t.category,
            date: t.date,
            description: t.description,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

/// Paged envelope returned by the transaction list endpoint.
#[derive(Debug, Serialize)]
pub struct TransactionPage {
    pub transactions: Vec<TransactionResponse>,
    pub current_page: i64,
    pub total_items: i64,
    pub total_pages: i64,
}
