//! Budget data models and API request/response types.
//!
//! A budget is a spending ceiling for one category over a recurring
//! period. Spend against it is computed on read from expense transactions
//! in the current period window; nothing is stored.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Recurring period a budget covers. The current window always starts at
/// the period boundary on/before "now" (see `services::period`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "budget_period", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum BudgetPeriod {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

/// Represents a budget record from the database.
///
/// At most one budget exists per (user, category, period) triple,
/// enforced by a unique constraint.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Budget {
    pub id: Uuid,
    pub user_id: Uuid,
    pub category: String,
    /// Positive spending ceiling for the period.
    pub amount: Decimal,
    pub period: BudgetPeriod,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for creating a budget.
#[derive(Debug, Deserialize)]
pub struct BudgetRequest {
    pub category: String,
    pub amount: Decimal,
    pub period: BudgetPeriod,
}

/// Response body for budget endpoints, with derived spend figures.
///
/// ```json
/// {
///   "id": "660e8400-e29b-41d4-a716-446655440001",
///   "category": "Marketing",
///   "amount": "500.00",
///   "period": "MONTHLY",
///   "spent": "350.00",
///   "remaining": "150.00",
///   "percent_used": 70.0,
///   "created_at": "2024-03-01T00:00:00Z",
///   "updated_at": "2024-03-01T00:00:00Z"
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct BudgetResponse {
    pub id: Uuid,
    pub category: String,
    pub amount: Decimal,
    pub period: BudgetPeriod,
    pub spent: Decimal,
    pub remaining: Decimal,
    pub percent_used: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BudgetResponse {
    /// Build the response from a budget and its computed spend.
    pub fn from_budget(budget: Budget, spent: Decimal) -> Self {
        let remaining = budget.amount - spent;
        let percent_used = percent_used(spent, budget.amount);
        Self {
            id: budget.id,
            category: budget.category,
            amount: budget.amount,
            period: budget.period,
            spent,
            remaining,
            percent_used,
            created_at: budget.created_at,
            updated_at: budget.updated_at,
        }
    }
}

/// Share of the budget consumed, as a percentage.
///
/// A zero ceiling cannot be created (amounts are validated positive), but
/// the division is still guarded: zero ceiling counts as 100% used when
/// there is any spend and 0% otherwise.
pub fn percent_used(spent: Decimal, amount: Decimal) -> f64 {
    if amount.is_zero() {
        return if spent.is_zero() { 0.0 } else { 100.0 };
    }
    let spent = spent.to_f64().unwrap_or(0.0);
    let amount = amount.to_f64().unwrap_or(f64::MAX);
    spent / amount * 100.0
}

/// Severity bucket for budget alerts.
///
/// Boundaries are inclusive on the upper bucket: exactly 70% is WARNING,
/// exactly 90% is DANGER.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertLevel {
    Ok,
    Warning,
    Danger,
}

impl AlertLevel {
    pub fn for_percent(percent_used: f64) -> Self {
        if percent_used >= 90.0 {
            AlertLevel::Danger
        } else if percent_used >= 70.0 {
            AlertLevel::Warning
        } else {
            AlertLevel::Ok
        }
    }
}

/// Entry returned by `GET /api/budgets/alerts`.
#[derive(Debug, Serialize)]
pub struct BudgetAlertResponse {
    pub budget_id: Uuid,
    pub category: String,
    pub period: BudgetPeriod,
    pub amount: Decimal,
    pub spent: Decimal,
    pub remaining: Decimal,
    pub percent_used: f64,
    pub alert_level: AlertLevel,
}

impl From<BudgetResponse> for BudgetAlertResponse {
    fn from(b: BudgetResponse) -> Self {
        Self {
            budget_id: b.id,
            category: b.category,
            period: b.period,
            amount: b.amount,
            spent: b.spent,
            remaining: b.remaining,
            percent_used: b.percent_used,
            alert_level: AlertLevel::for_percent(b.percent_used),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_used_is_a_plain_ratio() {
        assert_eq!(percent_used(Decimal::from(350), Decimal::from(500)), 70.0);
        assert_eq!(percent_used(Decimal::ZERO, Decimal::from(500)), 0.0);
    }

    #[test]
    fn zero_ceiling_is_guarded() {
        assert_eq!(percent_used(Decimal::ZERO, Decimal::ZERO), 0.0);
        assert_eq!(percent_used(Decimal::ONE, Decimal::ZERO), 100.0);
    }

    #[test]
    fn alert_boundaries_are_inclusive_upward() {
        assert_eq!(AlertLevel::for_percent(69.99), AlertLevel::Ok);
        assert_eq!(AlertLevel::for_percent(70.0), AlertLevel::Warning);
        assert_eq!(AlertLevel::for_percent(89.99), AlertLevel::Warning);
        assert_eq!(AlertLevel::for_percent(90.0), AlertLevel::Danger);
        assert_eq!(AlertLevel::for_percent(150.0), AlertLevel::Danger);
    }
}
