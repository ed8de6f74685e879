//! Defines the endpoint for deleting a debt.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{AppState, Error, alert::Alert, debt::DebtId};

use super::core::delete_debt;

/// The state needed to delete a debt.
#[derive(Debug, Clone)]
pub struct DeleteDebtState {
    /// The database connection for managing debts.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteDebtState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting a debt along with its payment history.
pub async fn delete_debt_endpoint(
    Path(debt_id): Path<DebtId>,
    State(state): State<DeleteDebtState>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_debt(debt_id, &connection) {
        Ok(()) => Alert::SuccessSimple {
            message: "Hutang berhasil dihapus".to_owned(),
        }
        .into_response(),
        Err(Error::DeleteMissingDebt) => Error::DeleteMissingDebt.into_alert_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while deleting debt {debt_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}
