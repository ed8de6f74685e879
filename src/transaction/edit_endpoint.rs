//! Defines the edit transaction page and the endpoint that applies the edit.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::html;
use rusqlite::Connection;

use crate::{
    AppState, Error, endpoints,
    category::{CategoryKind, get_categories_by_kind},
    html::{FORM_CONTAINER_STYLE, base},
    navigation::NavBar,
    transaction::{
        TransactionId, TransactionKind,
        core::{get_transaction, update_transaction},
        create_endpoint::{TransactionForm, listing_endpoint},
        form::{TransactionFormValues, transaction_form_view},
    },
};

/// The state needed to show the edit page and update a transaction.
#[derive(Debug, Clone)]
pub struct EditTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Route handler for the page with the form to edit an existing transaction.
pub async fn get_edit_transaction_page(
    Path(transaction_id): Path<TransactionId>,
    State(state): State<EditTransactionState>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transaction = get_transaction(transaction_id, &connection)?;

    let categories = match transaction.kind {
        TransactionKind::Expense => get_categories_by_kind(CategoryKind::Expense, &connection)?,
        TransactionKind::Income => Vec::new(),
    };

    let values = TransactionFormValues {
        amount: Some(transaction.amount),
        date: transaction.date,
        memo: transaction.memo.clone(),
        source: transaction.source,
        bank: transaction.bank,
        category_id: transaction.category_id,
    };

    let update_endpoint = endpoints::format_endpoint(endpoints::TRANSACTION, transaction_id);
    let nav_bar = NavBar::new(listing_endpoint(transaction.kind)).into_html();
    let form = transaction_form_view(
        transaction.kind,
        &update_endpoint,
        true,
        &categories,
        &values,
        "",
    );

    let title = format!("Edit {}", transaction.kind.label());
    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold my-4" { (title) }
            (form)
        }
    };

    Ok(base(&title, &[], &content).into_response())
}

/// A route handler for updating a transaction, redirects to the matching
/// listing page on success.
pub async fn edit_transaction_endpoint(
    Path(transaction_id): Path<TransactionId>,
    State(state): State<EditTransactionState>,
    Form(form): Form<TransactionForm>,
) -> Response {
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

    match update_transaction(transaction_id, builder, &connection) {
        Ok(()) => (
            HxRedirect(listing_endpoint(kind).to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(Error::UpdateMissingTransaction) => {
            Error::UpdateMissingTransaction.into_alert_response()
        }
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while updating transaction {transaction_id}: {error}"
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
        transaction::{
            Transaction, TransactionKind,
            core::{create_transaction, get_transaction},
        },
    };

    use super::{EditTransactionState, TransactionForm, edit_transaction_endpoint};

    #[tokio::test]
    async fn updates_transaction_and_redirects() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let transaction = create_transaction(
            Transaction::build(TransactionKind::Expense, 10_000.0, date!(2025 - 10 - 01)),
            &conn,
        )
        .unwrap();
        let state = EditTransactionState {
            db_connection: Arc::new(Mutex::new(conn)),
        };

        let form = TransactionForm {
            kind: "pengeluaran".to_owned(),
            amount: 17_500.0,
            date: date!(2025 - 10 - 02),
            memo: "Makan malam".to_owned(),
            source: "Debit".to_owned(),
            bank: Some("DANA".to_owned()),
            category_id: None,
        };

        let response =
            edit_transaction_endpoint(Path(transaction.id), State(state.clone()), Form(form)).await;

        assert!(response.headers().get(HX_REDIRECT).is_some());
        let connection = state.db_connection.lock().unwrap();
        let updated = get_transaction(transaction.id, &connection).unwrap();
        assert_eq!(updated.amount, 17_500.0);
        assert_eq!(updated.memo, "Makan malam");
    }

    #[tokio::test]
    async fn missing_transaction_returns_alert() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let state = EditTransactionState {
            db_connection: Arc::new(Mutex::new(conn)),
        };

        let form = TransactionForm {
            kind: "pengeluaran".to_owned(),
            amount: 17_500.0,
            date: date!(2025 - 10 - 02),
            memo: String::new(),
            source: "Cash".to_owned(),
            bank: None,
            category_id: None,
        };

        let response = edit_transaction_endpoint(Path(999), State(state), Form(form)).await;

        assert!(response.headers().get(HX_REDIRECT).is_none());
        assert_eq!(response.status(), axum::http::StatusCode::NOT_FOUND);
    }
}
