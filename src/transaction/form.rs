//! The shared transaction form and the new-transaction page.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error,
    category::{Category, CategoryId, CategoryKind, get_categories_by_kind},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_SELECT_STYLE,
        FORM_TEXT_INPUT_STYLE, base,
    },
    navigation::NavBar,
    timezone::today_in,
    transaction::models::{ALL_BANKS, Bank, FundSource, TransactionKind},
};

/// The values used to pre-fill the transaction form.
pub(super) struct TransactionFormValues {
    pub(super) amount: Option<f64>,
    pub(super) date: Date,
    pub(super) memo: String,
    pub(super) source: FundSource,
    pub(super) bank: Option<Bank>,
    pub(super) category_id: Option<CategoryId>,
}

impl TransactionFormValues {
    pub(super) fn empty(date: Date) -> Self {
        Self {
            amount: None,
            date,
            memo: String::new(),
            source: FundSource::Cash,
            bank: None,
            category_id: None,
        }
    }
}

/// Renders the form used by both the create and edit transaction pages.
///
/// Submitting issues an HTMX POST to `submit_url` when creating and a PUT
/// when editing.
pub(super) fn transaction_form_view(
    kind: TransactionKind,
    submit_url: &str,
    is_edit: bool,
    categories: &[Category],
    values: &TransactionFormValues,
    error_message: &str,
) -> Markup {
    let submit_label = if is_edit { "Update" } else { "Tambah" };

    html! {
        form
            hx-post=[(!is_edit).then_some(submit_url)]
            hx-put=[is_edit.then_some(submit_url)]
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            input type="hidden" name="kind" value=(kind.as_str());

            div
            {
                label for="amount" class=(FORM_LABEL_STYLE) { "Jumlah (Rp)" }

                input
                    id="amount"
                    type="number"
                    name="amount"
                    min="1"
                    step="any"
                    placeholder="100000"
                    value=[values.amount]
                    required
                    autofocus
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="date" class=(FORM_LABEL_STYLE) { "Tanggal" }

                input
                    id="date"
                    type="date"
                    name="date"
                    value=(values.date)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            @if kind == TransactionKind::Expense {
                div
                {
                    label for="category_id" class=(FORM_LABEL_STYLE) { "Kategori" }

                    select id="category_id" name="category_id" class=(FORM_SELECT_STYLE)
                    {
                        option value="" { "Tanpa kategori" }

                        @for category in categories {
                            option
                                value=(category.id)
                                selected[values.category_id == Some(category.id)]
                            {
                                (category.name)
                            }
                        }
                    }
                }
            }

            div
            {
                label for="source" class=(FORM_LABEL_STYLE) { "Sumber Pembayaran" }

                select id="source" name="source" class=(FORM_SELECT_STYLE)
                {
                    option
                        value=(FundSource::Cash.as_str())
                        selected[values.source == FundSource::Cash]
                    {
                        "Cash"
                    }
                    option
                        value=(FundSource::Debit.as_str())
                        selected[values.source == FundSource::Debit]
                    {
                        "Debit"
                    }
                }
            }

            div
            {
                label for="bank" class=(FORM_LABEL_STYLE) { "Bank/E-Wallet (untuk Debit)" }

                select id="bank" name="bank" class=(FORM_SELECT_STYLE)
                {
                    option value="" { "Pilih Bank/E-Wallet" }

                    @for bank in ALL_BANKS {
                        option value=(bank.as_str()) selected[values.bank == Some(bank)]
                        {
                            (bank.as_str())
                        }
                    }
                }
            }

            div
            {
                label for="memo" class=(FORM_LABEL_STYLE) { "Keterangan" }

                input
                    id="memo"
                    type="text"
                    name="memo"
                    placeholder="Deskripsi transaksi"
                    value=(values.memo)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400" { (error_message) }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { (submit_label) " " (kind.label()) }
        }
    }
}

/// The state needed for the new transaction page.
#[derive(Debug, Clone)]
pub struct NewTransactionPageState {
    /// The database connection for reading categories.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Jakarta".
    pub local_timezone: String,
}

impl FromRef<AppState> for NewTransactionPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Query parameters selecting which kind of transaction to create.
#[derive(Debug, Deserialize)]
pub struct NewTransactionParams {
    /// "pemasukan" or "pengeluaran"; defaults to an expense.
    #[serde(default)]
    pub kind: Option<String>,
}

/// Route handler for the page with the form to create a new transaction.
pub async fn get_new_transaction_page(
    Query(params): Query<NewTransactionParams>,
    State(state): State<NewTransactionPageState>,
) -> Result<Response, Error> {
    let kind = params
        .kind
        .as_deref()
        .unwrap_or(TransactionKind::Expense.as_str())
        .parse::<TransactionKind>()?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let categories = match kind {
        TransactionKind::Expense => get_categories_by_kind(CategoryKind::Expense, &connection)?,
        TransactionKind::Income => Vec::new(),
    };

    let today = today_in(&state.local_timezone);
    let values = TransactionFormValues::empty(today);

    let nav_bar = NavBar::new(match kind {
        TransactionKind::Income => endpoints::INCOME_VIEW,
        TransactionKind::Expense => endpoints::EXPENSES_VIEW,
    })
    .into_html();

    let form = transaction_form_view(
        kind,
        endpoints::TRANSACTIONS_API,
        false,
        &categories,
        &values,
        "",
    );

    let title = format!("Tambah {}", kind.label());
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
