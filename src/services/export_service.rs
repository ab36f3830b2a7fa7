//! Transaction export (CSV, PDF) and CSV import.
//!
//! # CSV schema
//!
//! Header `ID,Account,Amount,Type,Category,Date,Description`, dates
//! formatted `%Y-%m-%d %H:%M:%S` (UTC). Export and import share the
//! schema, so an exported file re-imports losslessly (the ID and Account
//! columns are informational on import; the target account comes from the
//! request).
//!
//! # Import failure model
//!
//! Row errors are collected with their line numbers rather than failing
//! fast, and any error aborts the whole batch: either every row commits or
//! none does.
//!
//! # PDF
//!
//! The export is rendered as a Typst document and compiled by invoking the
//! external `typst` binary (override the path with `TYPST_BIN`).

use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use rand::{Rng, distr::Alphanumeric};
use rust_decimal::Decimal;
use tokio::process::Command;
use uuid::Uuid;

use crate::{error::AppError, models::transaction::TransactionType};

/// Column order shared by the CSV and PDF exports.
pub const CSV_HEADERS: [&str; 7] = [
    "ID",
    "Account",
    "Amount",
    "Type",
    "Category",
    "Date",
    "Description",
];

/// Date format used in exported/imported files.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One exportable transaction, joined with its account name.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ExportRow {
    pub id: Uuid,
    pub account_name: String,
    pub amount: Decimal,
    pub transaction_type: TransactionType,
    pub category: String,
    pub date: DateTime<Utc>,
    pub description: Option<String>,
}

/// One validated row from an import file, ready to insert.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedRow {
    pub amount: Decimal,
    pub transaction_type: TransactionType,
    pub category: String,
    pub date: DateTime<Utc>,
    pub description: Option<String>,
}

/// Serialize rows to CSV bytes.
pub fn write_csv(rows: &[ExportRow]) -> Result<Vec<u8>, AppError> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record(CSV_HEADERS)
        .map_err(|e| AppError::Internal(format!("CSV write failed: {e}")))?;

    for row in rows {
        writer
            .write_record([
                row.id.to_string(),
                row.account_name.clone(),
                row.amount.to_string(),
                row.transaction_type.to_string(),
                row.category.clone(),
                row.date.format(DATE_FORMAT).to_string(),
                row.description.clone().unwrap_or_default(),
            ])
            .map_err(|e| AppError::Internal(format!("CSV write failed: {e}")))?;
    }

    writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("CSV write failed: {e}")))
}

/// Parse and validate an import file.
///
/// Returns every valid row, or the full list of per-line errors if any
/// row fails validation. Line numbers count the header as line 1.
pub fn parse_csv(data: &[u8]) -> Result<Vec<ImportedRow>, Vec<String>> {
    let mut reader = csv::Reader::from_reader(data);

    let headers = match reader.headers() {
        Ok(h) => h.clone(),
        Err(e) => return Err(vec![format!("Line 1: unreadable header: {e}")]),
    };
    let col = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));

    let (amount_col, type_col, category_col, date_col) = match (
        col("Amount"),
        col("Type"),
        col("Category"),
        col("Date"),
    ) {
        (Some(a), Some(t), Some(c), Some(d)) => (a, t, c, d),
        _ => {
            return Err(vec![
                "Line 1: header must contain Amount, Type, Category and Date columns".to_string(),
            ]);
        }
    };
    let description_col = col("Description");

    let mut rows = Vec::new();
    let mut errors = Vec::new();

    for (index, record) in reader.records().enumerate() {
        let line = index + 2;

        let record = match record {
            Ok(r) => r,
            Err(e) => {
                errors.push(format!("Line {line}: {e}"));
                continue;
            }
        };
        let field = |i: usize| record.get(i).unwrap_or("").trim();

        let amount = match Decimal::from_str(field(amount_col)) {
            Ok(a) if a > Decimal::ZERO => a,
            Ok(_) => {
                errors.push(format!("Line {line}: Amount must be positive"));
                continue;
            }
            Err(_) => {
                errors.push(format!("Line {line}: Invalid amount"));
                continue;
            }
        };

        let transaction_type = match TransactionType::from_str(field(type_col)) {
            Ok(t) => t,
            Err(()) => {
                errors.push(format!(
                    "Line {line}: Invalid transaction type. Must be INCOME or EXPENSE"
                ));
                continue;
            }
        };

        let date = match NaiveDateTime::parse_from_str(field(date_col), DATE_FORMAT) {
            Ok(d) => d.and_utc(),
            Err(_) => {
                errors.push(format!(
                    "Line {line}: Invalid date format. Use yyyy-MM-dd HH:mm:ss"
                ));
                continue;
            }
        };

        let category = field(category_col);
        if category.is_empty() {
            errors.push(format!("Line {line}: Category is required"));
            continue;
        }

        let description = description_col
            .map(field)
            .filter(|d| !d.is_empty())
            .map(str::to_string);

        rows.push(ImportedRow {
            amount,
            transaction_type,
            category: category.to_string(),
            date,
            description,
        });
    }

    if errors.is_empty() { Ok(rows) } else { Err(errors) }
}

/// Escape text for interpolation into Typst markup.
fn typst_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' | '#' | '[' | ']' | '*' | '_' | '$' | '@' | '<' | '>' | '`' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

/// Render the export rows as a Typst document.
pub fn render_typst(rows: &[ExportRow]) -> String {
    let mut source = String::from(
        "#set page(flipped: true, margin: 1.5cm)\n\
         #set text(size: 8pt)\n\
         = Transactions Report\n\n\
         #table(\n  columns: 7,\n",
    );

    for header in CSV_HEADERS {
        source.push_str(&format!("  [*{header}*],\n"));
    }

    for row in rows {
        source.push_str(&format!(
            "  [{}], [{}], [{}], [{}], [{}], [{}], [{}],\n",
            row.id,
            typst_escape(&row.account_name),
            row.amount,
            row.transaction_type,
            typst_escape(&row.category),
            row.date.format(DATE_FORMAT),
            typst_escape(row.description.as_deref().unwrap_or("")),
        ));
    }

    source.push_str(")\n");
    source
}

/// Compile Typst markup to PDF bytes with the external `typst` binary.
pub async fn compile_typst_pdf(source: &str) -> Result<Vec<u8>, AppError> {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(12)
        .map(char::from)
        .collect();
    let tmp_dir = std::env::temp_dir().join(format!("ledgerbook-typst-{suffix}"));

    tokio::fs::create_dir(&tmp_dir)
        .await
        .map_err(|e| AppError::Internal(format!("temp dir creation failed: {e}")))?;

    let input_path = tmp_dir.join("export.typ");
    let output_path = tmp_dir.join("export.pdf");

    let result = async {
        tokio::fs::write(&input_path, source)
            .await
            .map_err(|e| AppError::Internal(format!("temp file write failed: {e}")))?;

        let typst_bin = std::env::var("TYPST_BIN").unwrap_or_else(|_| "typst".to_string());
        let output = Command::new(&typst_bin)
            .arg("compile")
            .arg(&input_path)
            .arg(&output_path)
            .output()
            .await
            .map_err(|e| AppError::Internal(format!("failed to run `{typst_bin}`: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AppError::Internal(format!("typst compile failed: {stderr}")));
        }

        tokio::fs::read(&output_path)
            .await
            .map_err(|e| AppError::Internal(format!("PDF read failed: {e}")))
    }
    .await;

    let _ = tokio::fs::remove_dir_all(&tmp_dir).await;

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn row(amount: &str, transaction_type: TransactionType) -> ExportRow {
        ExportRow {
            id: Uuid::new_v4(),
            account_name: "Checking".to_string(),
            amount: amount.parse().unwrap(),
            transaction_type,
            category: "Sales".to_string(),
            date: Utc.with_ymd_and_hms(2024, 3, 17, 10, 30, 0).unwrap(),
            description: Some("March order".to_string()),
        }
    }

    #[test]
    fn csv_round_trip_preserves_fields() {
        let rows = vec![
            row("120.50", TransactionType::Income),
            row("33.10", TransactionType::Expense),
        ];

        let bytes = write_csv(&rows).unwrap();
        let imported = parse_csv(&bytes).unwrap();

        assert_eq!(imported.len(), rows.len());
        for (got, want) in imported.iter().zip(&rows) {
            assert_eq!(got.amount, want.amount);
            assert_eq!(got.transaction_type, want.transaction_type);
            assert_eq!(got.category, want.category);
            assert_eq!(got.date, want.date);
            assert_eq!(got.description, want.description);
        }
    }

    #[test]
    fn dates_use_the_documented_format() {
        let bytes = write_csv(&[row("5", TransactionType::Income)]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("2024-03-17 10:30:00"));
    }

    #[test]
    fn import_errors_are_collected_per_line() {
        let data = b"ID,Account,Amount,Type,Category,Date,Description\n\
            1,Checking,-5,INCOME,Sales,2024-03-17 10:30:00,bad amount\n\
            2,Checking,10,SIDEWAYS,Sales,2024-03-17 10:30:00,bad type\n\
            3,Checking,10,EXPENSE,,2024-03-17 10:30:00,missing category\n\
            4,Checking,10,EXPENSE,Sales,17/03/2024,bad date\n";

        let errors = parse_csv(data).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors[0].starts_with("Line 2:"));
        assert!(errors[1].contains("INCOME or EXPENSE"));
        assert!(errors[2].contains("Category"));
        assert!(errors[3].contains("date format"));
    }

    #[test]
    fn any_row_error_fails_the_whole_batch() {
        let data = b"ID,Account,Amount,Type,Category,Date,Description\n\
            1,Checking,10,INCOME,Sales,2024-03-17 10:30:00,fine\n\
            2,Checking,0,INCOME,Sales,2024-03-17 10:30:00,zero amount\n";

        // One valid row does not rescue the batch.
        assert!(parse_csv(data).is_err());
    }

    #[test]
    fn type_parsing_is_case_insensitive() {
        let data = b"ID,Account,Amount,Type,Category,Date,Description\n\
            1,Checking,10,income,Sales,2024-03-17 10:30:00,\n";

        let rows = parse_csv(data).unwrap();
        assert_eq!(rows[0].transaction_type, TransactionType::Income);
        assert_eq!(rows[0].description, None);
    }

    #[test]
    fn typst_markup_lists_every_row_and_escapes_text() {
        let mut r = row("7", TransactionType::Expense);
        r.category = "R#D [special]".to_string();
        let source = render_typst(&[r]);

        assert!(source.contains("= Transactions Report"));
        assert!(source.contains("R\\#D \\[special\\]"));
        assert!(source.contains("EXPENSE"));
    }
}
