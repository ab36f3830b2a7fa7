//! Centralized ownership checks.
//!
//! Every entity below a user is scoped to exactly one owner, directly
//! (accounts, budgets) or via an account (transactions, invoices). These
//! helpers are the single place that predicate lives: they fetch an entity
//! filtered by the authenticated user and answer `NotFound` otherwise, so
//! other users' records are indistinguishable from missing ones.

use uuid::Uuid;

use crate::{
    db::DbPool,
    error::AppError,
    models::{account::Account, invoice::Invoice, transaction::Transaction},
};

/// Fetch an account only if `user_id` owns it.
pub async fn owned_account(
    pool: &DbPool,
    user_id: Uuid,
    account_id: Uuid,
) -> Result<Account, AppError> {
    sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE id = $1 AND user_id = $2")
        .bind(account_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound("account"))
}

/// Fetch a transaction only if it belongs to one of `user_id`'s accounts.
pub async fn owned_transaction(
    pool: &DbPool,
    user_id: Uuid,
    transaction_id: Uuid,
) -> Result<Transaction, AppError> {
    sqlx::query_as::<_, Transaction>(
        r#"
        SELECT t.*
        FROM transactions t
        JOIN accounts a ON a.id = t.account_id
        WHERE t.id = $1 AND a.user_id = $2
        "#,
    )
    .bind(transaction_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound("transaction"))
}

/// Fetch an invoice only if it belongs to one of `user_id`'s accounts.
pub async fn owned_invoice(
    pool: &DbPool,
    user_id: Uuid,
    invoice_id: Uuid,
) -> Result<Invoice, AppError> {
    sqlx::query_as::<_, Invoice>(
        r#"
        SELECT i.*
        FROM invoices i
        JOIN accounts a ON a.id = i.account_id
        WHERE i.id = $1 AND a.user_id = $2
        "#,
    )
    .bind(invoice_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound("invoice"))
}
