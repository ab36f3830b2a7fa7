//! Financial report builders: balance sheet, profit & loss, cash flow.
//!
//! All three views are built from the user's accounts and transactions.
//! Grouping and summing happens in SQL (`GROUP BY category`); the pure
//! composition arithmetic lives in small helpers that the unit tests
//! exercise directly.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    db::DbPool,
    error::AppError,
    models::{
        account::{Account, AccountType},
        transaction::TransactionType,
    },
};

/// One category with its summed amount, as reported by P&L and cash flow.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow, Serialize)]
pub struct CategoryAmount {
    pub category: String,
    pub amount: Decimal,
}

/// One account with its balance, as reported by the balance sheet.
#[derive(Debug, Serialize)]
pub struct AccountBalance {
    pub account_id: Uuid,
    pub account_name: String,
    pub balance: Decimal,
}

/// Response body for `GET /api/reports/balance-sheet`.
///
/// Balances are the *current* stored balances: the report is a
/// point-in-time snapshot taken at call time. `as_of_date` is echoed back
/// for labeling but not applied to any historical reconstruction.
#[derive(Debug, Serialize)]
pub struct BalanceSheetResponse {
    pub as_of_date: DateTime<Utc>,
    pub assets: Vec<AccountBalance>,
    pub liabilities: Vec<AccountBalance>,
    pub total_assets: Decimal,
    pub total_liabilities: Decimal,
    pub equity: Decimal,
}

/// Response body for `GET /api/reports/profit-and-loss`.
#[derive(Debug, Serialize)]
pub struct ProfitAndLossResponse {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub revenue: Vec<CategoryAmount>,
    pub expenses: Vec<CategoryAmount>,
    pub total_revenue: Decimal,
    pub total_expenses: Decimal,
    pub net_profit: Decimal,
}

/// Response body for `GET /api/reports/cash-flow`.
#[derive(Debug, Serialize)]
pub struct CashFlowResponse {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub inflows: Vec<CategoryAmount>,
    pub outflows: Vec<CategoryAmount>,
    pub total_inflows: Decimal,
    pub total_outflows: Decimal,
    pub net_cash_flow: Decimal,
    pub opening_balance: Decimal,
    pub closing_balance: Decimal,
}

/// Per-category sums of one transaction type over a date range, across all
/// of the user's accounts.
async fn sums_by_category(
    pool: &DbPool,
    user_id: Uuid,
    transaction_type: TransactionType,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<CategoryAmount>, AppError> {
    let rows = sqlx::query_as::<_, CategoryAmount>(
        r#"
        SELECT t.category, SUM(t.amount) AS amount
        FROM transactions t
        JOIN accounts a ON a.id = t.account_id
        WHERE a.user_id = $1
          AND t.transaction_type = $2
          AND t.date >= $3
          AND t.date <= $4
        GROUP BY t.category
        ORDER BY t.category
        "#,
    )
    .bind(user_id)
    .bind(transaction_type)
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

fn total(items: &[CategoryAmount]) -> Decimal {
    items.iter().map(|c| c.amount).sum()
}

fn balances(accounts: &[Account], account_type: AccountType) -> Vec<AccountBalance> {
    accounts
        .iter()
        .filter(|a| a.account_type == account_type)
        .map(|a| AccountBalance {
            account_id: a.id,
            account_name: a.name.clone(),
            balance: a.balance,
        })
        .collect()
}

fn sum_balances(entries: &[AccountBalance]) -> Decimal {
    entries.iter().map(|e| e.balance).sum()
}

/// Build the balance sheet from the user's current account balances.
pub async fn balance_sheet(
    pool: &DbPool,
    user_id: Uuid,
    as_of_date: Option<DateTime<Utc>>,
) -> Result<BalanceSheetResponse, AppError> {
    let accounts =
        sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE user_id = $1 ORDER BY name")
            .bind(user_id)
            .fetch_all(pool)
            .await?;

    Ok(build_balance_sheet(
        &accounts,
        as_of_date.unwrap_or_else(Utc::now),
    ))
}

fn build_balance_sheet(accounts: &[Account], as_of_date: DateTime<Utc>) -> BalanceSheetResponse {
    let assets = balances(accounts, AccountType::Asset);
    let liabilities = balances(accounts, AccountType::Liability);
    let total_assets = sum_balances(&assets);
    let total_liabilities = sum_balances(&liabilities);

    BalanceSheetResponse {
        as_of_date,
        equity: total_assets - total_liabilities,
        assets,
        liabilities,
        total_assets,
        total_liabilities,
    }
}

/// Build the profit & loss statement over `[start, end]`.
pub async fn profit_and_loss(
    pool: &DbPool,
    user_id: Uuid,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<ProfitAndLossResponse, AppError> {
    let revenue = sums_by_category(pool, user_id, TransactionType::Income, start, end).await?;
    let expenses = sums_by_category(pool, user_id, TransactionType::Expense, start, end).await?;

    let total_revenue = total(&revenue);
    let total_expenses = total(&expenses);

    Ok(ProfitAndLossResponse {
        start_date: start,
        end_date: end,
        revenue,
        expenses,
        total_revenue,
        total_expenses,
        net_profit: total_revenue - total_expenses,
    })
}

/// Build the cash flow report over `[start, end]`.
///
/// The closing balance is the sum of current ASSET account balances; the
/// opening balance is that figure minus the window's net cash flow. This
/// is an approximation, not a ledger replay.
pub async fn cash_flow(
    pool: &DbPool,
    user_id: Uuid,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<CashFlowResponse, AppError> {
    let inflows = sums_by_category(pool, user_id, TransactionType::Income, start, end).await?;
    let outflows = sums_by_category(pool, user_id, TransactionType::Expense, start, end).await?;

    let closing_balance: Decimal = sqlx::query_scalar(
        "SELECT COALESCE(SUM(balance), 0) FROM accounts WHERE user_id = $1 AND account_type = 'ASSET'",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(build_cash_flow(start, end, inflows, outflows, closing_balance))
}

fn build_cash_flow(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    inflows: Vec<CategoryAmount>,
    outflows: Vec<CategoryAmount>,
    closing_balance: Decimal,
) -> CashFlowResponse {
    let total_inflows = total(&inflows);
    let total_outflows = total(&outflows);
    let net_cash_flow = total_inflows - total_outflows;

    CashFlowResponse {
        start_date: start,
        end_date: end,
        inflows,
        outflows,
        total_inflows,
        total_outflows,
        net_cash_flow,
        opening_balance: closing_balance - net_cash_flow,
        closing_balance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn cat(name: &str, amount: i64) -> CategoryAmount {
        CategoryAmount {
            category: name.to_string(),
            amount: Decimal::from(amount),
        }
    }

    fn account(name: &str, account_type: AccountType, balance: i64) -> Account {
        Account {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: name.to_string(),
            account_type,
            balance: Decimal::from(balance),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn balance_sheet_partitions_and_totals() {
        let accounts = vec![
            account("Checking", AccountType::Asset, 5000),
            account("Savings", AccountType::Asset, 2000),
            account("Credit Card", AccountType::Liability, 1500),
        ];
        let sheet = build_balance_sheet(&accounts, Utc::now());

        assert_eq!(sheet.assets.len(), 2);
        assert_eq!(sheet.liabilities.len(), 1);
        assert_eq!(sheet.total_assets, Decimal::from(7000));
        assert_eq!(sheet.total_liabilities, Decimal::from(1500));
        assert_eq!(sheet.equity, Decimal::from(5500));
    }

    #[test]
    fn empty_account_set_yields_zero_sheet() {
        let sheet = build_balance_sheet(&[], Utc::now());
        assert_eq!(sheet.total_assets, Decimal::ZERO);
        assert_eq!(sheet.total_liabilities, Decimal::ZERO);
        assert_eq!(sheet.equity, Decimal::ZERO);
    }

    #[test]
    fn cash_flow_derives_opening_from_closing() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 3, 31, 23, 59, 59).unwrap();

        let report = build_cash_flow(
            start,
            end,
            vec![cat("Sales", 900), cat("Interest", 100)],
            vec![cat("Rent", 400)],
            Decimal::from(5000),
        );

        assert_eq!(report.total_inflows, Decimal::from(1000));
        assert_eq!(report.total_outflows, Decimal::from(400));
        assert_eq!(report.net_cash_flow, Decimal::from(600));
        assert_eq!(report.closing_balance, Decimal::from(5000));
        // opening = closing - net, by definition.
        assert_eq!(report.opening_balance, Decimal::from(4400));
    }
}
