//! Financial report HTTP handlers.
//!
//! - GET /api/reports/balance-sheet - Assets/liabilities/equity snapshot
//! - GET /api/reports/profit-and-loss - Revenue vs. expenses by category
//! - GET /api/reports/cash-flow - Inflows/outflows by category

use axum::{
    Extension, Json,
    extract::{Query, State},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::{
    error::AppError,
    middleware::auth::AuthContext,
    services::report_service::{
        self, BalanceSheetResponse, CashFlowResponse, ProfitAndLossResponse,
    },
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct BalanceSheetQuery {
    /// Echoed into the report; balances themselves are a current snapshot.
    pub as_of_date: Option<DateTime<Utc>>,
}

/// Generate the balance sheet.
pub async fn balance_sheet(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<BalanceSheetQuery>,
) -> Result<Json<BalanceSheetResponse>, AppError> {
    let report =
        report_service::balance_sheet(&state.pool, auth.user_id, query.as_of_date).await?;
    Ok(Json(report))
}

#[derive(Debug, Deserialize)]
pub struct DateRangeQuery {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

impl DateRangeQuery {
    fn validate(&self) -> Result<(), AppError> {
        if self.start_date > self.end_date {
            return Err(AppError::Validation(
                "start_date must not be after end_date".to_string(),
            ));
        }
        Ok(())
    }
}

/// Generate the profit & loss statement over a required date range.
pub async fn profit_and_loss(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<DateRangeQuery>,
) -> Result<Json<ProfitAndLossResponse>, AppError> {
    query.validate()?;
    let report = report_service::profit_and_loss(
        &state.pool,
        auth.user_id,
        query.start_date,
        query.end_date,
    )
    .await?;
    Ok(Json(report))
}

/// Generate the cash flow report over a required date range.
pub async fn cash_flow(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<DateRangeQuery>,
) -> Result<Json<CashFlowResponse>, AppError> {
    query.validate()?;
    let report =
        report_service::cash_flow(&state.pool, auth.user_id, query.start_date, query.end_date)
            .await?;
    Ok(Json(report))
}
