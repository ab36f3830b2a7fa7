//! Budget HTTP handlers.
//!
//! - POST /api/budgets - Create a budget (one per user/category/period)
//! - GET /api/budgets - List budgets with current-period spend
//! - GET /api/budgets/alerts - Budgets at or past the 70% warning line
//!
//! Spend figures are always computed at read time from expense
//! transactions in the budget's current period window.

use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{
    error::AppError,
    middleware::auth::AuthContext,
    models::budget::{Budget, BudgetAlertResponse, BudgetPeriod, BudgetRequest, BudgetResponse},
    services::budget_service,
    state::AppState,
};

/// Create a budget.
///
/// # Response
///
/// - **201 Created** with spend figures for the current period
/// - **409 Conflict** when a budget for the same (category, period) exists
pub async fn create_budget(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<BudgetRequest>,
) -> Result<(StatusCode, Json<BudgetResponse>), AppError> {
    if request.category.trim().is_empty() {
        return Err(AppError::Validation("Category is required".to_string()));
    }
    if request.amount <= Decimal::ZERO {
        return Err(AppError::Validation("Amount must be positive".to_string()));
    }

    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM budgets WHERE user_id = $1 AND category = $2 AND period = $3)",
    )
    .bind(auth.user_id)
    .bind(&request.category)
    .bind(request.period)
    .fetch_one(&state.pool)
    .await?;
    if exists {
        return Err(AppError::Conflict(
            "A budget for this category and period already exists".to_string(),
        ));
    }

    let budget = sqlx::query_as::<_, Budget>(
        r#"
        INSERT INTO budgets (user_id, category, amount, period)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(auth.user_id)
    .bind(&request.category)
    .bind(request.amount)
    .bind(request.period)
    .fetch_one(&state.pool)
    .await?;

    let spent = budget_service::current_spend(&state.pool, &budget).await?;

    Ok((
        StatusCode::CREATED,
        Json(BudgetResponse::from_budget(budget, spent)),
    ))
}

#[derive(Debug, Deserialize)]
pub struct ListBudgetsQuery {
    pub period: Option<BudgetPeriod>,
}

/// List budgets with current spend, optionally filtered by period.
pub async fn list_budgets(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ListBudgetsQuery>,
) -> Result<Json<Vec<BudgetResponse>>, AppError> {
    let budgets = sqlx::query_as::<_, Budget>(
        r#"
        SELECT *
        FROM budgets
        WHERE user_id = $1
          AND ($2::budget_period IS NULL OR period = $2)
        ORDER BY category, period
        "#,
    )
    .bind(auth.user_id)
    .bind(query.period)
    .fetch_all(&state.pool)
    .await?;

    let mut responses = Vec::with_capacity(budgets.len());
    for budget in budgets {
        let spent = budget_service::current_spend(&state.pool, &budget).await?;
        responses.push(BudgetResponse::from_budget(budget, spent));
    }

    Ok(Json(responses))
}

/// Budgets whose current spend is at or past the warning threshold.
///
/// Entries at >= 70% are WARNING, >= 90% DANGER; anything below 70% is
/// omitted from the alert list entirely.
pub async fn budget_alerts(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Vec<BudgetAlertResponse>>, AppError> {
    let budgets = sqlx::query_as::<_, Budget>("SELECT * FROM budgets WHERE user_id = $1")
        .bind(auth.user_id)
        .fetch_all(&state.pool)
        .await?;

    let mut alerts = Vec::new();
    for budget in budgets {
        let spent = budget_service::current_spend(&state.pool, &budget).await?;
        let response = BudgetResponse::from_budget(budget, spent);
        if response.percent_used >= 70.0 {
            alerts.push(BudgetAlertResponse::from(response));
        }
    }

    Ok(Json(alerts))
}
