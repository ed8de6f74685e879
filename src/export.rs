//! CSV export endpoints.
//!
//! The exports consume the same query and aggregate functions the pages use
//! and stream them back as `text/csv` downloads, matching the columns the
//! in-browser export of the original app produced.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    transaction::{TransactionKind, get_transactions_by_kind, total_by_kind},
};

/// The state needed for the export endpoints.
#[derive(Debug, Clone)]
pub struct ExportState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ExportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Query parameters selecting which kind of transactions to export.
#[derive(Debug, Deserialize)]
pub struct ExportParams {
    /// "pemasukan" or "pengeluaran".
    pub kind: String,
}

fn csv_response(filename: &str, body: Vec<u8>) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_owned()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
        .into_response()
}

/// Route handler that downloads one kind's transactions as CSV.
///
/// Income rows carry date, amount, source and memo; expense rows add the
/// category column.
pub async fn export_transactions_csv(
    Query(params): Query<ExportParams>,
    State(state): State<ExportState>,
) -> Result<Response, Error> {
    let kind: TransactionKind = params.kind.parse()?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let rows = get_transactions_by_kind(kind, &connection)?;

    let mut writer = csv::Writer::from_writer(Vec::new());

    let write_result = (|| -> Result<(), csv::Error> {
        match kind {
            TransactionKind::Income => {
                writer.write_record(["Tanggal", "Jumlah", "Sumber", "Keterangan"])?;

                for (transaction, _) in &rows {
                    writer.write_record([
                        transaction.date.to_string(),
                        format!("{:.0}", transaction.amount),
                        transaction.source.to_string(),
                        transaction.memo.clone(),
                    ])?;
                }
            }
            TransactionKind::Expense => {
                writer.write_record(["Tanggal", "Jumlah", "Kategori", "Sumber", "Keterangan"])?;

                for (transaction, category_name) in &rows {
                    writer.write_record([
                        transaction.date.to_string(),
                        format!("{:.0}", transaction.amount),
                        category_name.clone().unwrap_or_else(|| "-".to_owned()),
                        transaction.source.to_string(),
                        transaction.memo.clone(),
                    ])?;
                }
            }
        }

        Ok(())
    })();

    write_result.map_err(|error| Error::CsvError(error.to_string()))?;

    let body = writer
        .into_inner()
        .map_err(|error| Error::CsvError(error.to_string()))?;

    Ok(csv_response(&format!("{}.csv", kind.as_str()), body))
}

/// Route handler that downloads the income/expense totals as CSV.
pub async fn export_summary_csv(State(state): State<ExportState>) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let total_income = total_by_kind(TransactionKind::Income, &connection)?;
    let total_expenses = total_by_kind(TransactionKind::Expense, &connection)?;

    let mut writer = csv::Writer::from_writer(Vec::new());

    let write_result = (|| -> Result<(), csv::Error> {
        writer.write_record(["Ringkasan", "Jumlah"])?;
        writer.write_record(["Total Pemasukan", &format!("{total_income:.0}")])?;
        writer.write_record(["Total Pengeluaran", &format!("{total_expenses:.0}")])?;
        writer.write_record(["Saldo Bersih", &format!("{:.0}", total_income - total_expenses)])?;
        Ok(())
    })();

    write_result.map_err(|error| Error::CsvError(error.to_string()))?;

    let body = writer
        .into_inner()
        .map_err(|error| Error::CsvError(error.to_string()))?;

    Ok(csv_response("ringkasan.csv", body))
}
