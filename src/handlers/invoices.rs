//! Invoice HTTP handlers.
//!
//! - POST /api/invoices - Create a DRAFT invoice with line items
//! - GET /api/invoices - List with filters and pagination
//! - GET /api/invoices/:id - Get an invoice with items and derived total
//! - PUT /api/invoices/:id/status - Transition status (PAID posts income)
//! - DELETE /api/invoices/:id - Delete a DRAFT invoice

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::AppError,
    handlers::transactions::page_offset,
    middleware::auth::AuthContext,
    models::invoice::{
        Invoice, InvoicePage, InvoiceRequest, InvoiceResponse, InvoiceStatus,
        UpdateInvoiceStatusRequest,
    },
    services::{invoice_service, ownership},
    state::AppState,
};

fn validate(request: &InvoiceRequest) -> Result<(), AppError> {
    if request.client_name.trim().is_empty() {
        return Err(AppError::Validation("Client name is required".to_string()));
    }
    if !request.client_email.contains('@') {
        return Err(AppError::Validation("Client email is invalid".to_string()));
    }
    if request.items.is_empty() {
        return Err(AppError::Validation(
            "Invoice must have at least one item".to_string(),
        ));
    }
    for item in &request.items {
        if item.description.trim().is_empty() {
            return Err(AppError::Validation(
                "Item description is required".to_string(),
            ));
        }
        if item.quantity <= Decimal::ZERO || item.unit_price <= Decimal::ZERO {
            return Err(AppError::Validation(
                "Item quantity and unit price must be positive".to_string(),
            ));
        }
    }
    Ok(())
}

/// Create an invoice in DRAFT status.
pub async fn create_invoice(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<InvoiceRequest>,
) -> Result<(StatusCode, Json<InvoiceResponse>), AppError> {
    validate(&request)?;

    let account = ownership::owned_account(&state.pool, auth.user_id, request.account_id).await?;

    let (invoice, items) = invoice_service::create_invoice(
        &state.pool,
        account.id,
        &request.client_name,
        &request.client_email,
        request.due_date,
        &request.items,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(InvoiceResponse::from_parts(invoice, items)),
    ))
}

/// Get an invoice with its items and derived total.
pub async fn get_invoice(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(invoice_id): Path<Uuid>,
) -> Result<Json<InvoiceResponse>, AppError> {
    let invoice = ownership::owned_invoice(&state.pool, auth.user_id, invoice_id).await?;
    let items = invoice_service::items_for(&state.pool, invoice.id).await?;
    Ok(Json(InvoiceResponse::from_parts(invoice, items)))
}

/// Query parameters accepted by the invoice list endpoint.
#[derive(Debug, Deserialize)]
pub struct ListInvoicesQuery {
    pub status: Option<InvoiceStatus>,
    /// Case-insensitive substring match on the client name.
    pub client_name: Option<String>,
    /// Due-date range, inclusive.
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub size: i64,
}

fn default_page_size() -> i64 {
    10
}

/// List invoices across the user's accounts, latest due date first.
pub async fn list_invoices(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ListInvoicesQuery>,
) -> Result<Json<InvoicePage>, AppError> {
    let offset = page_offset(query.page, query.size)?;

    const FILTER: &str = r#"
        FROM invoices i
        JOIN accounts a ON a.id = i.account_id
        WHERE a.user_id = $1
          AND ($2::invoice_status IS NULL OR i.status = $2)
          AND ($3::text IS NULL OR i.client_name ILIKE '%' || $3 || '%')
          AND ($4::date IS NULL OR i.due_date >= $4)
          AND ($5::date IS NULL OR i.due_date <= $5)
    "#;

    let total_items: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) {FILTER}"))
        .bind(auth.user_id)
        .bind(query.status)
        .bind(&query.client_name)
        .bind(query.start_date)
        .bind(query.end_date)
        .fetch_one(&state.pool)
        .await?;

    let invoices = sqlx::query_as::<_, Invoice>(&format!(
        "SELECT i.* {FILTER} ORDER BY i.due_date DESC LIMIT $6 OFFSET $7"
    ))
    .bind(auth.user_id)
    .bind(query.status)
    .bind(&query.client_name)
    .bind(query.start_date)
    .bind(query.end_date)
    .bind(query.size)
    .bind(offset)
    .fetch_all(&state.pool)
    .await?;

    let mut responses = Vec::with_capacity(invoices.len());
    for invoice in invoices {
        let items = invoice_service::items_for(&state.pool, invoice.id).await?;
        responses.push(InvoiceResponse::from_parts(invoice, items));
    }

    Ok(Json(InvoicePage {
        invoices: responses,
        current_page: query.page,
        total_items,
        total_pages: (total_items as u64).div_ceil(query.size as u64) as i64,
    }))
}

/// Transition an invoice's status.
///
/// Moving to PAID from any non-PAID status posts a single income
/// transaction for the derived total; repeating PAID is inert.
pub async fn update_invoice_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(invoice_id): Path<Uuid>,
    Json(request): Json<UpdateInvoiceStatusRequest>,
) -> Result<Json<InvoiceResponse>, AppError> {
    let invoice = ownership::owned_invoice(&state.pool, auth.user_id, invoice_id).await?;

    let (updated, items) = invoice_service::set_status(&state.pool, &invoice, request.status).await?;

    Ok(Json(InvoiceResponse::from_parts(updated, items)))
}

/// Delete an invoice. Only DRAFT invoices may be deleted.
pub async fn delete_invoice(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(invoice_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let invoice = ownership::owned_invoice(&state.pool, auth.user_id, invoice_id).await?;

    if invoice.status != InvoiceStatus::Draft {
        return Err(AppError::Validation(
            "Only draft invoices can be deleted".to_string(),
        ));
    }

    // Items go with it via ON DELETE CASCADE.
    sqlx::query("DELETE FROM invoices WHERE id = $1")
        .bind(invoice.id)
        .execute(&state.pool)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
