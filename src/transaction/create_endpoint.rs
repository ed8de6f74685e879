//! Defines the endpoint for creating a new transaction.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::IntoResponse,
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error, endpoints,
    category::CategoryId,
    transaction::{
        Transaction, TransactionKind,
        core::create_transaction,
        models::{Bank, FundSource},
    },
};

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for creating or editing a transaction.
#[derive(Debug, Deserialize)]
pub struct TransactionForm {
    /// "pemasukan" or "pengeluaran".
    pub kind: String,
    /// The value of the transaction in Rupiah.
    pub amount: f64,
    /// The date when the transaction occurred.
    pub date: Date,
    /// Text detailing the transaction.
    #[serde(default)]
    pub memo: String,
    /// The source of funds, "Cash" or "Debit".
    pub source: String,
    /// The bank/e-wallet name for debit transactions.
    #[serde(default)]
    pub bank: Option<String>,
    /// The category to file an expense under.
    #[serde(default)]
    pub category_id: Option<CategoryId>,
}

impl TransactionForm {
    /// Parse the form's tag strings and assemble a transaction builder.
    ///
    /// # Errors
    /// Returns an error if the kind, source or bank strings do not match the
    /// closed sets of known values.
    pub fn into_builder(self) -> Result<crate::transaction::TransactionBuilder, Error> {
        let kind: TransactionKind = self.kind.parse()?;
        let source: FundSource = self.source.parse()?;
        let bank = self
            .bank
            .as_deref()
            .filter(|raw| !raw.is_empty())
            .map(str::parse::<Bank>)
            .transpose()?;

        Ok(Transaction::build(kind, self.amount, self.date)
            .memo(&self.memo)
            .source(source)
            .bank(bank)
            .category_id(self.category_id))
    }
}

/// Which listing page to return to after a mutation, based on the kind.
pub(super) fn listing_endpoint(kind: TransactionKind) -> &'static str {
    match kind {
        TransactionKind::Income => endpoints::INCOME_VIEW,
        TransactionKind::Expense => endpoints::EXPENSES_VIEW,
    }
}

/// A route handler for creating a new transaction, redirects to the matching
/// listing page on success.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Form(form): Form<TransactionForm>,
) -> impl IntoResponse {
    let builder = match form.into_builder() {
        Ok(builder) => builder,
        Err(error) => return error.into_alert_response(),
    };
    let kind = builder.kind;

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    if let Err(error) = create_transaction(builder, &connection) {
        return error.into_alert_response();
    }

    (
        HxRedirect(listing_endpoint(kind).to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{extract::State, response::IntoResponse};
    use axum_extra::extract::Form;
    use axum_htmx::HX_REDIRECT;
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        db::initialize,
        endpoints,
        transaction::{TransactionKind, core::count_transactions},
    };

    use super::{CreateTransactionState, TransactionForm, create_transaction_endpoint};

    fn get_test_state() -> CreateTransactionState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        CreateTransactionState {
            db_connection: Arc::new(Mutex::new(conn)),
        }
    }

    fn form(kind: &str, amount: f64) -> TransactionForm {
        TransactionForm {
            kind: kind.to_owned(),
            amount,
            date: date!(2025 - 10 - 05),
            memo: "test transaction".to_owned(),
            source: "Cash".to_owned(),
            bank: None,
            category_id: None,
        }
    }

    #[tokio::test]
    async fn creates_transaction_and_redirects() {
        let state = get_test_state();

        let response = create_transaction_endpoint(
            State(state.clone()),
            Form(form(TransactionKind::Income.as_str(), 12_500.0)),
        )
        .await
        .into_response();

        assert_eq!(
            response.headers().get(HX_REDIRECT).unwrap(),
            endpoints::INCOME_VIEW
        );
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(count_transactions(&connection).unwrap(), 1);
    }

    #[tokio::test]
    async fn rejects_non_positive_amount_without_writing() {
        let state = get_test_state();

        let response = create_transaction_endpoint(
            State(state.clone()),
            Form(form(TransactionKind::Expense.as_str(), -5.0)),
        )
        .await
        .into_response();

        assert!(response.headers().get(HX_REDIRECT).is_none());
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(count_transactions(&connection).unwrap(), 0);
    }

    #[test]
    fn form_parses_empty_optional_fields_as_none() {
        // axum_extra's Form parses empty strings as None, which is what the
        // browser sends for untouched optional selects.
        let form: TransactionForm = serde_html_form::from_str(
            "kind=pengeluaran&amount=9500&date=2025-10-05&memo=Kopi&source=Debit&bank=&category_id=",
        )
        .unwrap();

        assert_eq!(form.category_id, None);
        assert_eq!(form.amount, 9_500.0);

        let builder = form.into_builder().unwrap();
        assert_eq!(builder.bank, None);
    }

    #[tokio::test]
    async fn rejects_unknown_source_tag() {
        let state = get_test_state();
        let mut bad_form = form(TransactionKind::Expense.as_str(), 10_000.0);
        bad_form.source = "Kredit".to_owned();

        let response = create_transaction_endpoint(State(state.clone()), Form(bad_form))
            .await
            .into_response();

        assert!(response.headers().get(HX_REDIRECT).is_none());
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(count_transactions(&connection).unwrap(), 0);
    }
}
