//! Defines the endpoints for recording and deleting debt payments.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error,
    alert::Alert,
    debt::{
        DebtId,
        core::{PaymentId, delete_payment, edit_payment, record_payment},
    },
    endpoints,
};

/// The state needed for the payment endpoints.
#[derive(Debug, Clone)]
pub struct PaymentState {
    /// The database connection for the payment ledger.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for PaymentState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for recording a payment.
#[derive(Debug, Deserialize)]
pub struct PaymentForm {
    /// The paid amount in Rupiah.
    pub amount: f64,
    /// When the payment was made.
    pub date: Date,
}

/// A route handler for recording a payment towards a debt, redirects to the
/// debts page on success.
///
/// The payment is deliberately not bounded by the remaining balance; paying
/// more than is owed settles the debt and keeps the excess in the paid total.
pub async fn record_payment_endpoint(
    Path(debt_id): Path<DebtId>,
    State(state): State<PaymentState>,
    Form(form): Form<PaymentForm>,
) -> Response {
    let mut connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match record_payment(debt_id, form.amount, form.date, &mut connection) {
        Ok(_) => (
            HxRedirect(endpoints::DEBTS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error @ (Error::InvalidAmount | Error::NotFound)) => error.into_alert_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while recording a payment for debt {debt_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

/// A route handler for correcting a payment's amount.
///
/// The amount delta is applied to the owning debt's paid total (floored at
/// zero) and the status is recomputed, in both directions: raising a payment
/// past the principal settles the debt, shrinking it reopens the debt.
pub async fn edit_payment_endpoint(
    Path(payment_id): Path<PaymentId>,
    State(state): State<PaymentState>,
    Form(form): Form<PaymentForm>,
) -> Response {
    let mut connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match edit_payment(payment_id, form.amount, form.date, &mut connection) {
        Ok(()) => (
            HxRedirect(endpoints::DEBTS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error @ (Error::InvalidAmount | Error::NotFound)) => error.into_alert_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while editing payment {payment_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

/// A route handler for deleting a payment, reverting its effect on the owning
/// debt's paid total and status.
pub async fn delete_payment_endpoint(
    Path(payment_id): Path<PaymentId>,
    State(state): State<PaymentState>,
) -> Response {
    let mut connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_payment(payment_id, &mut connection) {
        Ok(()) => Alert::SuccessSimple {
            message: "Pembayaran berhasil dihapus".to_owned(),
        }
        .into_response(),
        Err(Error::DeleteMissingPayment) => Error::DeleteMissingPayment.into_alert_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while deleting payment {payment_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::{Path, State};
    use axum_extra::extract::Form;
    use axum_htmx::HX_REDIRECT;
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        db::initialize,
        debt::core::{
            DebtStatus, NewDebt, create_debt, get_debt, get_payments_for_debt, record_payment,
        },
    };

    use super::{
        PaymentForm, PaymentState, delete_payment_endpoint, edit_payment_endpoint,
        record_payment_endpoint,
    };

    fn get_test_state() -> PaymentState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        PaymentState {
            db_connection: Arc::new(Mutex::new(conn)),
        }
    }

    fn new_debt(principal: f64) -> NewDebt {
        NewDebt {
            creditor: "Bank".to_owned(),
            principal,
            debt_date: date!(2025 - 01 - 15),
            due_date: None,
            memo: String::new(),
            installment_amount: None,
            installment_day: None,
            installment_months: None,
        }
    }

    #[tokio::test]
    async fn records_payment_and_settles_debt() {
        let state = get_test_state();
        let debt = {
            let connection = state.db_connection.lock().unwrap();
            create_debt(new_debt(100_000.0), &connection).unwrap()
        };

        let form = PaymentForm {
            amount: 100_000.0,
            date: date!(2025 - 02 - 01),
        };

        let response = record_payment_endpoint(Path(debt.id), State(state.clone()), Form(form)).await;

        assert!(response.headers().get(HX_REDIRECT).is_some());
        let connection = state.db_connection.lock().unwrap();
        let debt = get_debt(debt.id, &connection).unwrap();
        assert_eq!(debt.status, DebtStatus::Paid);
    }

    #[tokio::test]
    async fn rejects_non_positive_payment() {
        let state = get_test_state();
        let debt = {
            let connection = state.db_connection.lock().unwrap();
            create_debt(new_debt(100_000.0), &connection).unwrap()
        };

        let form = PaymentForm {
            amount: -10.0,
            date: date!(2025 - 02 - 01),
        };

        let response = record_payment_endpoint(Path(debt.id), State(state.clone()), Form(form)).await;

        assert_eq!(response.status(), axum::http::StatusCode::BAD_REQUEST);
        let connection = state.db_connection.lock().unwrap();
        assert!(get_payments_for_debt(debt.id, &connection).unwrap().is_empty());
    }

    #[tokio::test]
    async fn edit_payment_recomputes_status() {
        let state = get_test_state();
        let (debt, payment) = {
            let mut connection = state.db_connection.lock().unwrap();
            let debt = create_debt(new_debt(100_000.0), &connection).unwrap();
            record_payment(debt.id, 100_000.0, date!(2025 - 02 - 01), &mut connection).unwrap();
            let payment = get_payments_for_debt(debt.id, &connection).unwrap()[0].clone();
            (debt, payment)
        };

        let form = PaymentForm {
            amount: 40_000.0,
            date: date!(2025 - 02 - 01),
        };

        edit_payment_endpoint(Path(payment.id), State(state.clone()), Form(form)).await;

        let connection = state.db_connection.lock().unwrap();
        let debt = get_debt(debt.id, &connection).unwrap();
        assert_eq!(debt.amount_paid, 40_000.0);
        assert_eq!(debt.status, DebtStatus::Active);
    }

    #[tokio::test]
    async fn delete_payment_reopens_debt() {
        let state = get_test_state();
        let (debt, payment) = {
            let mut connection = state.db_connection.lock().unwrap();
            let debt = create_debt(new_debt(100_000.0), &connection).unwrap();
            record_payment(debt.id, 100_000.0, date!(2025 - 02 - 01), &mut connection).unwrap();
            let payment = get_payments_for_debt(debt.id, &connection).unwrap()[0].clone();
            (debt, payment)
        };

        delete_payment_endpoint(Path(payment.id), State(state.clone())).await;

        let connection = state.db_connection.lock().unwrap();
        let debt = get_debt(debt.id, &connection).unwrap();
        assert_eq!(debt.amount_paid, 0.0);
        assert_eq!(debt.status, DebtStatus::Active);
    }
}
