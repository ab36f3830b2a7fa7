//! Invoice and line-item data models and API request/response types.
//!
//! The invoice total is a derived value: the sum of `quantity * unit_price`
//! over its items, computed on every read and never persisted.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle of an invoice.
///
/// DRAFT → SENT → PAID are client-driven; OVERDUE is a date-driven side
/// state that clients may set explicitly (it is never auto-transitioned).
/// Only DRAFT invoices may be deleted. The PAID transition posts an income
/// transaction — a one-way side effect that is not reversed if the status
/// later changes away from PAID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "invoice_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum InvoiceStatus {
    Draft,
    Sent,
    Paid,
    Overdue,
}

/// Represents an invoice record from the database.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Invoice {
    pub id: Uuid,
    /// Account that receives the payment when the invoice is marked PAID.
    pub account_id: Uuid,
    pub client_name: String,
    pub client_email: String,
    pub due_date: NaiveDate,
    pub status: InvoiceStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Represents an invoice line item from the database.
///
/// `line_no` preserves the order items were submitted in.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct InvoiceItem {
    pub id: Uuid,
    pub invoice_id: Uuid,
    pub line_no: i32,
    pub description: String,
    /// Positive (CHECK constraint).
    pub quantity: Decimal,
    /// Positive (CHECK constraint).
    pub unit_price: Decimal,
}

impl InvoiceItem {
    /// Derived line total.
    pub fn total(&self) -> Decimal {
        self.quantity * self.unit_price
    }
}

/// Request body for creating an invoice.
///
/// ```json
/// {
///   "client_name": "Acme Corp",
///   "client_email": "billing@acme.example",
///   "due_date": "2024-04-15",
///   "account_id": "550e8400-e29b-41d4-a716-446655440000",
///   "items": [
///     {"description": "Consulting", "quantity": "10", "unit_price": "150.00"}
///   ]
/// }
/// ```
#[derive(Debug, Deserialize)]
pub struct InvoiceRequest {
    pub client_name: String,
    pub client_email: String,
    pub due_date: NaiveDate,
    pub account_id: Uuid,
    pub items: Vec<InvoiceItemRequest>,
}

/// One line item in an invoice creation request.
#[derive(Debug, Deserialize)]
pub struct InvoiceItemRequest {
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
}

/// Request body for `PUT /api/invoices/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct UpdateInvoiceStatusRequest {
    pub status: InvoiceStatus,
}

/// Response body for invoice endpoints, items and derived totals included.
#[derive(Debug, Serialize)]
pub struct InvoiceResponse {
    pub id: Uuid,
    pub account_id: Uuid,
    pub client_name: String,
    pub client_email: String,
    pub due_date: NaiveDate,
    pub status: InvoiceStatus,
    pub items: Vec<InvoiceItemResponse>,
    /// Sum of item totals, computed on read.
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InvoiceResponse {
    pub fn from_parts(invoice: Invoice, items: Vec<InvoiceItem>) -> Self {
        let total = crate::services::invoice_service::invoice_total(&items);
        Self {
            id: invoice.id,
            account_id: invoice.account_id,
            client_name: invoice.client_name,
            client_email: invoice.client_email,
            due_date: invoice.due_date,
            status: invoice.status,
            items: items.into_iter().map(Into::into).collect(),
            total,
            created_at: invoice.created_at,
            updated_at: invoice.updated_at,
        }
    }
}

/// One line item in an invoice response.
#[derive(Debug, Serialize)]
pub struct InvoiceItemResponse {
    pub id: Uuid,
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub total: Decimal,
}

impl From<InvoiceItem> for InvoiceItemResponse {
    fn from(item: InvoiceItem) -> Self {
        let total = item.total();
        Self {
            id: item.id,
            description: item.description,
            quantity: item.quantity,
            unit_price: item.unit_price,
            total,
        }
    }
}

/// Paged envelope returned by the invoice list endpoint.
#[derive(Debug, Serialize)]
pub struct InvoicePage {
    pub invoices: Vec<InvoiceResponse>,
    pub current_page: i64,
    pub total_items: i64,
    pub total_pages: i64,
}
