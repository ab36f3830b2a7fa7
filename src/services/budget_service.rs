//! Spend aggregation for budgets.
//!
//! A budget is user-scoped, not account-scoped, so spend is summed over
//! expense transactions across *all* of the user's accounts, restricted to
//! the budget's category and the current period window.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{db::DbPool, error::AppError, models::budget::Budget, services::period};

/// Sum of expense amounts for `category` across the user's accounts within
/// `[start, end]`. Zero when nothing matches.
pub async fn spend_in_window(
    pool: &DbPool,
    user_id: Uuid,
    category: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Decimal, AppError> {
    let spent: Decimal = sqlx::query_scalar(
        r#"
        SELECT COALESCE(SUM(t.amount), 0)
        FROM transactions t
        JOIN accounts a ON a.id = t.account_id
        WHERE a.user_id = $1
          AND t.transaction_type = 'EXPENSE'
          AND t.category = $2
          AND t.date >= $3
          AND t.date <= $4
        "#,
    )
    .bind(user_id)
    .bind(category)
    .bind(start)
    .bind(end)
    .fetch_one(pool)
    .await?;

    Ok(spent)
}

/// Spend against `budget` in its current period window (ending now).
pub async fn current_spend(pool: &DbPool, budget: &Budget) -> Result<Decimal, AppError> {
    let now = Utc::now();
    let start = period::window_start(budget.period, now);
    spend_in_window(pool, budget.user_id, &budget.category, start, now).await
}
