//! Ledger service - balance maintenance for transaction writes.
//!
//! Every create/update/delete of a transaction adjusts the owning
//! account's balance in the same database transaction as the row change,
//! so the balance invariant (initial balance plus signed sum of attached
//! transactions) holds at every commit point.
//!
//! # Update semantics
//!
//! An update reverts the old effect on the old account, then applies the
//! new effect on the new account (which may be the same row). Both account
//! updates are issued before the transaction row is written, so no commit
//! ever exposes a half-applied edit.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    db::DbPool,
    error::AppError,
    models::transaction::{Transaction, TransactionType},
};

/// Effect of a transaction on its account's balance: positive for income,
/// negative for expense.
pub fn signed_amount(transaction_type: TransactionType, amount: Decimal) -> Decimal {
    match transaction_type {
        TransactionType::Income => amount,
        TransactionType::Expense => -amount,
    }
}

/// Apply a transaction's effect inside an open database transaction:
/// bump the account balance and insert the row.
///
/// Shared by transaction creation and the invoice PAID side effect, which
/// needs the apply to commit atomically with its own status write.
pub async fn apply_transaction(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    account_id: Uuid,
    amount: Decimal,
    transaction_type: TransactionType,
    category: &str,
    date: DateTime<Utc>,
    description: Option<&str>,
) -> Result<Transaction, AppError> {
    // Atomic balance update; the row lock it takes serializes concurrent
    // writers against the same account.
    let updated = sqlx::query(
        r#"
        UPDATE accounts
        SET balance = balance + $1,
            updated_at = NOW()
        WHERE id = $2
        "#,
    )
    .bind(signed_amount(transaction_type, amount))
    .bind(account_id)
    .execute(&mut **tx)
    .await?
    .rows_affected();

    if updated == 0 {
        return Err(AppError::NotFound("account"));
    }

    let transaction = sqlx::query_as::<_, Transaction>(
        r#"
        INSERT INTO transactions (account_id, amount, transaction_type, category, date, description)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(account_id)
    .bind(amount)
    .bind(transaction_type)
    .bind(category)
    .bind(date)
    .bind(description)
    .fetch_one(&mut **tx)
    .await?;

    Ok(transaction)
}

/// Record a new transaction and apply its effect to the account balance.
///
/// The caller has already verified ownership of `account_id` and validated
/// the amount (positive) and date (not in the future).
pub async fn create_transaction(
    pool: &DbPool,
    account_id: Uuid,
    amount: Decimal,
    transaction_type: TransactionType,
    category: String,
    date: DateTime<Utc>,
    description: Option<String>,
) -> Result<Transaction, AppError> {
    let mut tx = pool.begin().await?;

    let transaction = apply_transaction(
        &mut tx,
        account_id,
        amount,
        transaction_type,
        &category,
        date,
        description.as_deref(),
    )
    .await?;

    tx.commit().await?;

    Ok(transaction)
}

/// Rewrite an existing transaction, keeping both the old and the new
/// account balances exact.
///
/// `existing` is the row as currently persisted; the remaining arguments
/// are the new values. The old effect is reverted on `existing.account_id`
/// and the new effect applied on `account_id` even when they are equal —
/// two signed updates compose to the correct delta either way.
pub async fn update_transaction(
    pool: &DbPool,
    existing: &Transaction,
    account_id: Uuid,
    amount: Decimal,
    transaction_type: TransactionType,
    category: String,
    date: DateTime<Utc>,
    description: Option<String>,
) -> Result<Transaction, AppError> {
    let mut tx = pool.begin().await?;

    // Revert the old effect on the old account.
    sqlx::query(
        "UPDATE accounts SET balance = balance - $1, updated_at = NOW() WHERE id = $2",
    )
    .bind(signed_amount(existing.transaction_type, existing.amount))
    .bind(existing.account_id)
    .execute(&mut *tx)
    .await?;

    // Apply the new effect on the (possibly different) new account.
    let applied = sqlx::query(
        "UPDATE accounts SET balance = balance + $1, updated_at = NOW() WHERE id = $2",
    )
    .bind(signed_amount(transaction_type, amount))
    .bind(account_id)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    if applied == 0 {
        tx.rollback().await?;
        return Err(AppError::NotFound("account"));
    }

    // Both account rows are settled; now rewrite the transaction itself.
    let transaction = sqlx::query_as::<_, Transaction>(
        r#"
        UPDATE transactions
        SET account_id = $1,
            amount = $2,
            transaction_type = $3,
            category = $4,
            date = $5,
            description = $6,
            updated_at = NOW()
        WHERE id = $7
        RETURNING *
        "#,
    )
    .bind(account_id)
    .bind(amount)
    .bind(transaction_type)
    .bind(&category)
    .bind(date)
    .bind(&description)
    .bind(existing.id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(transaction)
}

/// Delete a transaction and revert its effect from the account balance.
pub async fn delete_transaction(pool: &DbPool, transaction: &Transaction) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        "UPDATE accounts SET balance = balance - $1, updated_at = NOW() WHERE id = $2",
    )
    .bind(signed_amount(transaction.transaction_type, transaction.amount))
    .bind(transaction.account_id)
    .execute(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM transactions WHERE id = $1")
        .bind(transaction.id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(v: i64) -> Decimal {
        Decimal::from(v)
    }

    #[test]
    fn income_adds_and_expense_subtracts() {
        assert_eq!(signed_amount(TransactionType::Income, d(200)), d(200));
        assert_eq!(signed_amount(TransactionType::Expense, d(200)), d(-200));
    }

    #[test]
    fn revert_then_reapply_matches_the_edit() {
        // Account at 1000, add income 200 -> 1200.
        let mut balance = d(1000);
        balance += signed_amount(TransactionType::Income, d(200));
        assert_eq!(balance, d(1200));

        // Edit the transaction to expense 150: revert old, apply new -> 850.
        balance -= signed_amount(TransactionType::Income, d(200));
        balance += signed_amount(TransactionType::Expense, d(150));
        assert_eq!(balance, d(850));
    }

    #[test]
    fn cross_account_edit_moves_the_full_effect() {
        let mut old_account = d(500);
        let mut new_account = d(300);
        // Expense 100 sits on the old account.
        old_account += signed_amount(TransactionType::Expense, d(100));
        assert_eq!(old_account, d(400));

        // Moving it reverts the old account and charges the new one.
        old_account -= signed_amount(TransactionType::Expense, d(100));
        new_account += signed_amount(TransactionType::Expense, d(100));
        assert_eq!(old_account, d(500));
        assert_eq!(new_account, d(200));
    }
}
