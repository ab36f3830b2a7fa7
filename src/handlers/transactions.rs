//! Transaction HTTP handlers.
//!
//! This module implements transaction-related API endpoints:
//! - POST /api/transactions - Record an income/expense transaction
//! - GET /api/transactions - List with filters and pagination
//! - GET /api/transactions/:id - Get transaction details
//! - PUT /api/transactions/:id - Rewrite a transaction (balances stay exact)
//! - DELETE /api/transactions/:id - Delete and revert the balance effect
//!
//! All balance mutation goes through the ledger service; handlers only
//! validate input and check ownership.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::AppError,
    middleware::auth::AuthContext,
    models::transaction::{
        Transaction, TransactionPage, TransactionRequest, TransactionResponse, TransactionType,
    },
    services::{ledger_service, ownership},
    state::AppState,
};

fn validate(request: &TransactionRequest) -> Result<(), AppError> {
    if request.amount <= Decimal::ZERO {
        return Err(AppError::Validation("Amount must be positive".to_string()));
    }
    if request.category.trim().is_empty() {
        return Err(AppError::Validation("Category is required".to_string()));
    }
    if request.date > Utc::now() {
        return Err(AppError::Validation(
            "Date must not be in the future".to_string(),
        ));
    }
    Ok(())
}

/// Record a transaction and update the account balance atomically.
///
/// # Request Body
///
/// ```json
/// {
///   "account_id": "550e8400-...",
///   "amount": "125.50",
///   "type": "EXPENSE",
///   "category": "Office Supplies",
///   "date": "2024-03-01T10:30:00Z",
///   "description": "Printer paper"
/// }
/// ```
pub async fn create_transaction(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<TransactionRequest>,
) -> Result<(StatusCode, Json<TransactionResponse>), AppError> {
    validate(&request)?;

    let account = ownership::owned_account(&state.pool, auth.user_id, request.account_id).await?;

    let transaction = ledger_service::create_transaction(
        &state.pool,
        account.id,
        request.amount,
        request.transaction_type,
        request.category,
        request.date,
        request.description,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(transaction.into())))
}

/// Get transaction details. 404 unless it belongs to one of the caller's
/// accounts.
pub async fn get_transaction(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(transaction_id): Path<Uuid>,
) -> Result<Json<TransactionResponse>, AppError> {
    let transaction =
        ownership::owned_transaction(&state.pool, auth.user_id, transaction_id).await?;
    Ok(Json(transaction.into()))
}

/// Query parameters accepted by the transaction list endpoint.
#[derive(Debug, Deserialize)]
pub struct ListTransactionsQuery {
    pub account_id: Option<Uuid>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub category: Option<String>,
    #[serde(rename = "type")]
    pub transaction_type: Option<TransactionType>,
    #[serde(default)]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub size: i64,
}

fn default_page_size() -> i64 {
    10
}

/// Validate pagination parameters and compute the SQL OFFSET.
///
/// Rejects negative pages, non-positive sizes, and page/size pairs whose
/// offset would not fit in an `i64` (Postgres would see a negative OFFSET).
pub(crate) fn page_offset(page: i64, size: i64) -> Result<i64, AppError> {
    if page < 0 || size <= 0 {
        return Err(AppError::Validation(
            "page must be >= 0 and size must be > 0".to_string(),
        ));
    }
    page.checked_mul(size)
        .ok_or_else(|| AppError::Validation("page is out of range".to_string()))
}

/// List transactions across the user's accounts, newest first.
///
/// Every filter is optional and they combine; pagination defaults to
/// page 0, size 10. When `account_id` is given it must be owned by the
/// caller (404 otherwise) rather than silently matching nothing.
pub async fn list_transactions(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ListTransactionsQuery>,
) -> Result<Json<TransactionPage>, AppError> {
    let offset = page_offset(query.page, query.size)?;

    if let Some(account_id) = query.account_id {
        ownership::owned_account(&state.pool, auth.user_id, account_id).await?;
    }

    const FILTER: &str = r#"
        FROM transactions t
        JOIN accounts a ON a.id = t.account_id
        WHERE a.user_id = $1
          AND ($2::uuid IS NULL OR t.account_id = $2)
          AND ($3::timestamptz IS NULL OR t.date >= $3)
          AND ($4::timestamptz IS NULL OR t.date <= $4)
          AND ($5::text IS NULL OR t.category = $5)
          AND ($6::transaction_type IS NULL OR t.transaction_type = $6)
    "#;

    let total_items: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) {FILTER}"))
        .bind(auth.user_id)
        .bind(query.account_id)
        .bind(query.start_date)
        .bind(query.end_date)
        .bind(&query.category)
        .bind(query.transaction_type)
        .fetch_one(&state.pool)
        .await?;

    let transactions = sqlx::query_as::<_, Transaction>(&format!(
        "SELECT t.* {FILTER} ORDER BY t.date DESC LIMIT $7 OFFSET $8"
    ))
    .bind(auth.user_id)
    .bind(query.account_id)
    .bind(query.start_date)
    .bind(query.end_date)
    .bind(&query.category)
    .bind(query.transaction_type)
    .bind(query.size)
    .bind(offset)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(TransactionPage {
        transactions: transactions.into_iter().map(Into::into).collect(),
        current_page: query.page,
        total_items,
        total_pages: (total_items as u64).div_ceil(query.size as u64) as i64,
    }))
}

/// Rewrite a transaction.
///
/// The ledger service reverts the old effect on the old account and
/// applies the new effect on the new one, so no balance drifts even when
/// the transaction moves between accounts or flips type.
pub async fn update_transaction(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(transaction_id): Path<Uuid>,
    Json(request): Json<TransactionRequest>,
) -> Result<Json<TransactionResponse>, AppError> {
    validate(&request)?;

    let existing = ownership::owned_transaction(&state.pool, auth.user_id, transaction_id).await?;

    // When the transaction moves, the target account must also be ours.
    if request.account_id != existing.account_id {
        ownership::owned_account(&state.pool, auth.user_id, request.account_id).await?;
    }

    let updated = ledger_service::update_transaction(
        &state.pool,
        &existing,
        request.account_id,
        request.amount,
        request.transaction_type,
        request.category,
        request.date,
        request.description,
    )
    .await?;

    Ok(Json(updated.into()))
}

/// Delete a transaction, reverting its effect from the account balance.
pub async fn delete_transaction(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(transaction_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let transaction =
        ownership::owned_transaction(&state.pool, auth.user_id, transaction_id).await?;

    ledger_service::delete_transaction(&state.pool, &transaction).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_offset_multiplies_page_by_size() {
        assert_eq!(page_offset(0, 10).unwrap(), 0);
        assert_eq!(page_offset(3, 25).unwrap(), 75);
    }

    #[test]
    fn page_offset_rejects_bad_parameters() {
        assert!(page_offset(-1, 10).is_err());
        assert!(page_offset(0, 0).is_err());
        assert!(page_offset(0, -5).is_err());
    }

    #[test]
    fn page_offset_rejects_overflow_instead_of_wrapping() {
        assert!(page_offset(i64::MAX, 2).is_err());
        assert!(page_offset(i64::MAX / 10 + 1, 10).is_err());
    }
}
