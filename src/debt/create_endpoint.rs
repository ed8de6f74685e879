//! Defines the endpoint for creating a new debt.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use serde::Deserialize;
use time::Date;

use crate::{AppState, Error, debt::core::{NewDebt, create_debt}, endpoints};

/// The state needed to create a debt.
#[derive(Debug, Clone)]
pub struct CreateDebtState {
    /// The database connection for managing debts.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateDebtState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for creating or editing a debt.
#[derive(Debug, Deserialize)]
pub struct DebtForm {
    /// Who the money is owed to.
    pub creditor: String,
    /// The amount originally borrowed, in Rupiah.
    pub principal: f64,
    /// When the debt was taken on.
    pub debt_date: Date,
    /// The optional date the debt should be fully paid by.
    #[serde(default)]
    pub due_date: Option<Date>,
    /// A text description of the debt.
    #[serde(default)]
    pub memo: String,
    /// The fixed monthly installment amount (cicilan).
    #[serde(default)]
    pub installment_amount: Option<f64>,
    /// The day of the month the installment is due.
    #[serde(default)]
    pub installment_day: Option<u8>,
    /// How many months the installment plan runs for.
    #[serde(default)]
    pub installment_months: Option<u32>,
}

impl From<DebtForm> for NewDebt {
    fn from(form: DebtForm) -> Self {
        NewDebt {
            creditor: form.creditor,
            principal: form.principal,
            debt_date: form.debt_date,
            due_date: form.due_date,
            memo: form.memo,
            installment_amount: form.installment_amount,
            installment_day: form.installment_day,
            installment_months: form.installment_months,
        }
    }
}

/// A route handler for creating a new debt, redirects to the debts page on
/// success.
pub async fn create_debt_endpoint(
    State(state): State<CreateDebtState>,
    Form(form): Form<DebtForm>,
) -> impl IntoResponse {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_debt(form.into(), &connection) {
        Ok(_) => (
            HxRedirect(endpoints::DEBTS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(
            error @ (Error::EmptyCreditorName
            | Error::InvalidAmount
            | Error::InvalidInstallmentDay(_)),
        ) => error.into_alert_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a debt: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{extract::State, response::IntoResponse};
    use axum_extra::extract::Form;
    use axum_htmx::HX_REDIRECT;
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{db::initialize, debt::core::get_all_debts};

    use super::{CreateDebtState, DebtForm, create_debt_endpoint};

    fn form() -> DebtForm {
        DebtForm {
            creditor: "Bank BTN".to_owned(),
            principal: 12_000_000.0,
            debt_date: date!(2025 - 01 - 15),
            due_date: Some(date!(2026 - 01 - 15)),
            memo: "KPR".to_owned(),
            installment_amount: Some(1_000_000.0),
            installment_day: Some(5),
            installment_months: Some(12),
        }
    }

    #[tokio::test]
    async fn creates_debt_with_installment_plan() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let state = CreateDebtState {
            db_connection: Arc::new(Mutex::new(conn)),
        };

        let response = create_debt_endpoint(State(state.clone()), Form(form()))
            .await
            .into_response();

        assert!(response.headers().get(HX_REDIRECT).is_some());
        let connection = state.db_connection.lock().unwrap();
        let debts = get_all_debts(&connection).unwrap();
        assert_eq!(debts.len(), 1);
        assert_eq!(debts[0].installment_amount, Some(1_000_000.0));
        assert_eq!(debts[0].amount_paid, 0.0);
    }

    #[tokio::test]
    async fn rejects_invalid_installment_day() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let state = CreateDebtState {
            db_connection: Arc::new(Mutex::new(conn)),
        };
        let mut bad_form = form();
        bad_form.installment_day = Some(0);

        let response = create_debt_endpoint(State(state.clone()), Form(bad_form))
            .await
            .into_response();

        assert_eq!(response.status(), axum::http::StatusCode::BAD_REQUEST);
        let connection = state.db_connection.lock().unwrap();
        assert!(get_all_debts(&connection).unwrap().is_empty());
    }
}
