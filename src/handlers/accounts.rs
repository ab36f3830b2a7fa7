//! Account management HTTP handlers.
//!
//! This module implements the account-related API endpoints:
//! - POST /api/accounts - Create a new account
//! - GET /api/accounts - List accounts (optional `type` filter)
//! - GET /api/accounts/:id - Get account by ID
//! - PUT /api/accounts/:id - Rename an account
//! - DELETE /api/accounts/:id - Delete an account (OWNER, no transactions)

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::AppError,
    middleware::auth::AuthContext,
    models::{
        account::{Account, AccountResponse, AccountType, CreateAccountRequest, UpdateAccountRequest},
        user::Role,
    },
    services::ownership,
    state::AppState,
};

/// Create a new account.
///
/// # Response
///
/// - **201 Created** with the account body
/// - **409 Conflict** when the user already has an account by that name
pub async fn create_account(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<CreateAccountRequest>,
) -> Result<(StatusCode, Json<AccountResponse>), AppError> {
    if request.name.trim().is_empty() {
        return Err(AppError::Validation("Account name is required".to_string()));
    }

    let name_taken: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM accounts WHERE user_id = $1 AND name = $2)")
            .bind(auth.user_id)
            .bind(&request.name)
            .fetch_one(&state.pool)
            .await?;
    if name_taken {
        return Err(AppError::Conflict(
            "An account with this name already exists".to_string(),
        ));
    }

    let account = sqlx::query_as::<_, Account>(
        r#"
        INSERT INTO accounts (user_id, name, account_type, balance)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(auth.user_id)
    .bind(&request.name)
    .bind(request.account_type)
    .bind(request.initial_balance)
    .fetch_one(&state.pool)
    .await?;

    Ok((StatusCode::CREATED, Json(account.into())))
}

/// Get a specific account by ID.
///
/// Answers 404 both for missing accounts and for accounts owned by someone
/// else, so other users' accounts cannot be enumerated.
pub async fn get_account(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(account_id): Path<Uuid>,
) -> Result<Json<AccountResponse>, AppError> {
    let account = ownership::owned_account(&state.pool, auth.user_id, account_id).await?;
    Ok(Json(account.into()))
}

#[derive(Debug, Deserialize)]
pub struct ListAccountsQuery {
    #[serde(rename = "type")]
    pub account_type: Option<AccountType>,
}

/// List the authenticated user's accounts, optionally filtered by type.
pub async fn list_accounts(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ListAccountsQuery>,
) -> Result<Json<Vec<AccountResponse>>, AppError> {
    let accounts = sqlx::query_as::<_, Account>(
        r#"
        SELECT *
        FROM accounts
        WHERE user_id = $1
          AND ($2::account_type IS NULL OR account_type = $2)
        ORDER BY created_at DESC
        "#,
    )
    .bind(auth.user_id)
    .bind(query.account_type)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(accounts.into_iter().map(Into::into).collect()))
}

/// Rename an account, keeping names unique per user.
pub async fn update_account(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(account_id): Path<Uuid>,
    Json(request): Json<UpdateAccountRequest>,
) -> Result<Json<AccountResponse>, AppError> {
    if request.name.trim().is_empty() {
        return Err(AppError::Validation("Account name is required".to_string()));
    }

    let account = ownership::owned_account(&state.pool, auth.user_id, account_id).await?;

    if account.name != request.name {
        let name_taken: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM accounts WHERE user_id = $1 AND name = $2)",
        )
        .bind(auth.user_id)
        .bind(&request.name)
        .fetch_one(&state.pool)
        .await?;
        if name_taken {
            return Err(AppError::Conflict(
                "An account with this name already exists".to_string(),
            ));
        }
    }

    let updated = sqlx::query_as::<_, Account>(
        "UPDATE accounts SET name = $1, updated_at = NOW() WHERE id = $2 RETURNING *",
    )
    .bind(&request.name)
    .bind(account.id)
    .fetch_one(&state.pool)
    .await?;

    Ok(Json(updated.into()))
}

/// Delete an account.
///
/// Restricted to the OWNER role, and only when no transactions reference
/// the account (otherwise the balance history would dangle).
pub async fn delete_account(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(account_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if auth.role != Role::Owner {
        return Err(AppError::Unauthorized);
    }

    let account = ownership::owned_account(&state.pool, auth.user_id, account_id).await?;

    let has_transactions: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM transactions WHERE account_id = $1)")
            .bind(account.id)
            .fetch_one(&state.pool)
            .await?;
    if has_transactions {
        return Err(AppError::Conflict(
            "Account has transactions and cannot be deleted".to_string(),
        ));
    }

    sqlx::query("DELETE FROM accounts WHERE id = $1")
        .bind(account.id)
        .execute(&state.pool)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
