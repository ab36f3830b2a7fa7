//! Transaction export/import HTTP handlers.
//!
//! - GET /api/export/transactions - Download transactions as CSV or PDF
//! - POST /api/import/transactions - Upload a CSV of transactions
//!
//! Import is all-or-nothing: rows are validated up front and any error
//! aborts the batch with the full per-line error list; on success every
//! row is inserted and the account balance adjusted in one database
//! transaction.

use axum::{
    Extension, Json,
    extract::{Multipart, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{
    error::AppError,
    middleware::auth::AuthContext,
    services::{
        export_service::{self, ExportRow},
        ledger_service, ownership,
    },
    state::AppState,
};

/// Output format for the export endpoint.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Pdf,
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub account_id: Option<Uuid>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub format: ExportFormat,
}

/// Export transactions, newest first, as a CSV or PDF attachment.
///
/// Defaults: all of the user's accounts, the last 365 days.
pub async fn export_transactions(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ExportQuery>,
) -> Result<impl IntoResponse, AppError> {
    if let Some(account_id) = query.account_id {
        ownership::owned_account(&state.pool, auth.user_id, account_id).await?;
    }

    let end_date = query.end_date.unwrap_or_else(Utc::now);
    let start_date = query
        .start_date
        .unwrap_or_else(|| end_date - Duration::days(365));

    let rows = sqlx::query_as::<_, ExportRow>(
        r#"
        SELECT t.id, a.name AS account_name, t.amount, t.transaction_type,
               t.category, t.date, t.description
        FROM transactions t
        JOIN accounts a ON a.id = t.account_id
        WHERE a.user_id = $1
          AND ($2::uuid IS NULL OR t.account_id = $2)
          AND t.date >= $3
          AND t.date <= $4
        ORDER BY t.date DESC
        "#,
    )
    .bind(auth.user_id)
    .bind(query.account_id)
    .bind(start_date)
    .bind(end_date)
    .fetch_all(&state.pool)
    .await?;

    let (content_type, disposition, body) = match query.format {
        ExportFormat::Csv => (
            "text/csv",
            "attachment; filename=\"transactions.csv\"",
            export_service::write_csv(&rows)?,
        ),
        ExportFormat::Pdf => {
            let source = export_service::render_typst(&rows);
            (
                "application/pdf",
                "attachment; filename=\"transactions.pdf\"",
                export_service::compile_typst_pdf(&source).await?,
            )
        }
    };

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}

/// Import transactions from an uploaded CSV file.
///
/// Multipart fields: `account_id` (target account, must be owned) and
/// `file` (the CSV). Responds 201 with a row count, or 400 with the
/// collected per-line errors and nothing committed.
pub async fn import_transactions(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let mut account_id: Option<Uuid> = None;
    let mut file: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        match field.name() {
            Some("account_id") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Unreadable account_id: {e}")))?;
                let id = text
                    .trim()
                    .parse()
                    .map_err(|_| AppError::Validation("Invalid account_id".to_string()))?;
                account_id = Some(id);
            }
            Some("file") => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Unreadable file: {e}")))?;
                file = Some(bytes.to_vec());
            }
            _ => {}
        }
    }

    let account_id =
        account_id.ok_or_else(|| AppError::Validation("account_id is required".to_string()))?;
    let file = file.ok_or_else(|| AppError::Validation("Please upload a file".to_string()))?;
    if file.is_empty() {
        return Err(AppError::Validation("Please upload a file".to_string()));
    }

    let account = ownership::owned_account(&state.pool, auth.user_id, account_id).await?;

    let rows = export_service::parse_csv(&file).map_err(AppError::ImportFailed)?;

    // All rows validated; commit them and the net balance change together.
    let net_delta: Decimal = rows
        .iter()
        .map(|r| ledger_service::signed_amount(r.transaction_type, r.amount))
        .sum();

    let mut tx = state.pool.begin().await?;

    for row in &rows {
        sqlx::query(
            r#"
            INSERT INTO transactions (account_id, amount, transaction_type, category, date, description)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(account.id)
        .bind(row.amount)
        .bind(row.transaction_type)
        .bind(&row.category)
        .bind(row.date)
        .bind(&row.description)
        .execute(&mut *tx)
        .await?;
    }

    sqlx::query("UPDATE accounts SET balance = balance + $1, updated_at = NOW() WHERE id = $2")
        .bind(net_delta)
        .bind(account.id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": format!("Successfully imported {} transactions", rows.len())
        })),
    ))
}
