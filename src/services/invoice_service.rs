//! Invoice totaling and status transitions.
//!
//! The derived total drives the one side effect in the status machine:
//! marking an invoice PAID (from any non-PAID status) posts a single
//! INCOME transaction for the total and bumps the account balance, inside
//! one database transaction. Re-marking an already PAID invoice does
//! nothing to the ledger, and un-PAIDing later does not reverse the
//! posted transaction.

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    db::DbPool,
    error::AppError,
    models::invoice::{Invoice, InvoiceItem, InvoiceItemRequest, InvoiceStatus},
    models::transaction::TransactionType,
    services::ledger_service,
};

/// Category assigned to transactions posted by the PAID transition.
pub const INVOICE_PAYMENT_CATEGORY: &str = "Invoice Payment";

/// Derived invoice total: Σ quantity × unit_price over the items.
pub fn invoice_total(items: &[InvoiceItem]) -> Decimal {
    items.iter().map(InvoiceItem::total).sum()
}

/// Insert an invoice and its line items in one database transaction.
///
/// Items keep their submitted order via `line_no`.
pub async fn create_invoice(
    pool: &DbPool,
    account_id: Uuid,
    client_name: &str,
    client_email: &str,
    due_date: chrono::NaiveDate,
    items: &[InvoiceItemRequest],
) -> Result<(Invoice, Vec<InvoiceItem>), AppError> {
    let mut tx = pool.begin().await?;

    let invoice = sqlx::query_as::<_, Invoice>(
        r#"
        INSERT INTO invoices (account_id, client_name, client_email, due_date, status)
        VALUES ($1, $2, $3, $4, 'DRAFT')
        RETURNING *
        "#,
    )
    .bind(account_id)
    .bind(client_name)
    .bind(client_email)
    .bind(due_date)
    .fetch_one(&mut *tx)
    .await?;

    let mut inserted = Vec::with_capacity(items.len());
    for (line_no, item) in items.iter().enumerate() {
        let row = sqlx::query_as::<_, InvoiceItem>(
            r#"
            INSERT INTO invoice_items (invoice_id, line_no, description, quantity, unit_price)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(invoice.id)
        .bind(line_no as i32)
        .bind(&item.description)
        .bind(item.quantity)
        .bind(item.unit_price)
        .fetch_one(&mut *tx)
        .await?;
        inserted.push(row);
    }

    tx.commit().await?;

    Ok((invoice, inserted))
}

/// Line items of an invoice, in submission order.
pub async fn items_for(pool: &DbPool, invoice_id: Uuid) -> Result<Vec<InvoiceItem>, AppError> {
    let items = sqlx::query_as::<_, InvoiceItem>(
        "SELECT * FROM invoice_items WHERE invoice_id = $1 ORDER BY line_no",
    )
    .bind(invoice_id)
    .fetch_all(pool)
    .await?;

    Ok(items)
}

/// Whether a status change posts the payment transaction.
///
/// Only the non-PAID -> PAID edge does: re-marking an already PAID
/// invoice is inert, and leaving PAID never reverses the posting.
pub fn posts_payment(old: InvoiceStatus, new: InvoiceStatus) -> bool {
    new == InvoiceStatus::Paid && old != InvoiceStatus::Paid
}

/// Set an invoice's status, posting the payment when it becomes PAID.
///
/// The posted transaction and the status write commit atomically.
pub async fn set_status(
    pool: &DbPool,
    invoice: &Invoice,
    new_status: InvoiceStatus,
) -> Result<(Invoice, Vec<InvoiceItem>), AppError> {
    let items = items_for(pool, invoice.id).await?;

    let mut tx = pool.begin().await?;

    if posts_payment(invoice.status, new_status) {
        let total = invoice_total(&items);
        let description = format!(
            "Payment for invoice {} from {}",
            invoice.id, invoice.client_name
        );
        ledger_service::apply_transaction(
            &mut tx,
            invoice.account_id,
            total,
            TransactionType::Income,
            INVOICE_PAYMENT_CATEGORY,
            Utc::now(),
            Some(&description),
        )
        .await?;
    }

    let updated = sqlx::query_as::<_, Invoice>(
        "UPDATE invoices SET status = $1, updated_at = NOW() WHERE id = $2 RETURNING *",
    )
    .bind(new_status)
    .bind(invoice.id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok((updated, items))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(quantity: i64, unit_price: &str) -> InvoiceItem {
        InvoiceItem {
            id: Uuid::new_v4(),
            invoice_id: Uuid::new_v4(),
            line_no: 0,
            description: "item".to_string(),
            quantity: Decimal::from(quantity),
            unit_price: unit_price.parse().unwrap(),
        }
    }

    #[test]
    fn total_is_sum_of_quantity_times_unit_price() {
        let items = vec![item(10, "150.00"), item(3, "9.99")];
        assert_eq!(invoice_total(&items), "1529.97".parse().unwrap());
    }

    #[test]
    fn empty_invoice_totals_zero() {
        assert_eq!(invoice_total(&[]), Decimal::ZERO);
    }

    #[test]
    fn payment_posts_only_on_the_edge_into_paid() {
        assert!(posts_payment(InvoiceStatus::Draft, InvoiceStatus::Paid));
        assert!(posts_payment(InvoiceStatus::Sent, InvoiceStatus::Paid));
        assert!(posts_payment(InvoiceStatus::Overdue, InvoiceStatus::Paid));

        // Re-marking PAID is inert.
        assert!(!posts_payment(InvoiceStatus::Paid, InvoiceStatus::Paid));

        // Leaving PAID never reverses the posted payment.
        assert!(!posts_payment(InvoiceStatus::Paid, InvoiceStatus::Sent));
        assert!(!posts_payment(InvoiceStatus::Paid, InvoiceStatus::Draft));

        // Transitions that never touch PAID do nothing to the ledger.
        assert!(!posts_payment(InvoiceStatus::Draft, InvoiceStatus::Sent));
        assert!(!posts_payment(InvoiceStatus::Sent, InvoiceStatus::Overdue));
    }

    #[test]
    fn total_tracks_item_changes_with_no_stale_caching() {
        let mut items = vec![item(2, "50.00")];
        assert_eq!(invoice_total(&items), Decimal::from(100));
        items.push(item(1, "25.00"));
        assert_eq!(invoice_total(&items), Decimal::from(125));
        items.remove(0);
        assert_eq!(invoice_total(&items), Decimal::from(25));
    }
}
