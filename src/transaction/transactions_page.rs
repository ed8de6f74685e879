//! The income (pemasukan) and expense (pengeluaran) listing pages.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, endpoints,
    html::{
        BUTTON_DELETE_STYLE, LINK_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base, rupiah,
    },
    navigation::NavBar,
    transaction::{
        Transaction, TransactionKind,
        core::{get_transactions_by_kind, total_by_kind},
    },
};

/// The state needed for the transaction listing pages.
#[derive(Debug, Clone)]
pub struct TransactionsPageState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Route handler for the income listing page.
pub async fn get_income_page(State(state): State<TransactionsPageState>) -> Result<Response, Error> {
    get_listing_page(TransactionKind::Income, &state)
}

/// Route handler for the expense listing page.
pub async fn get_expenses_page(
    State(state): State<TransactionsPageState>,
) -> Result<Response, Error> {
    get_listing_page(TransactionKind::Expense, &state)
}

fn get_listing_page(
    kind: TransactionKind,
    state: &TransactionsPageState,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let rows = get_transactions_by_kind(kind, &connection)?;
    let total = total_by_kind(kind, &connection)?;

    Ok(listing_view(kind, &rows, total).into_response())
}

fn transaction_row_view(kind: TransactionKind, transaction: &Transaction, category_name: Option<&str>) -> Markup {
    let source_label = match transaction.bank {
        Some(bank) => format!("{} ({})", transaction.source, bank),
        None => transaction.source.to_string(),
    };

    html! {
        tr class=(TABLE_ROW_STYLE)
        {
            td class=(TABLE_CELL_STYLE) { (transaction.date) }
            td class=(TABLE_CELL_STYLE) { (rupiah(transaction.amount)) }

            @if kind == TransactionKind::Expense {
                td class=(TABLE_CELL_STYLE) { (category_name.unwrap_or("Lain-lain")) }
            }

            td class=(TABLE_CELL_STYLE) { (source_label) }
            td class=(TABLE_CELL_STYLE) { (transaction.memo) }
            td class=(TABLE_CELL_STYLE)
            {
                a
                    href=(endpoints::format_endpoint(endpoints::EDIT_TRANSACTION_VIEW, transaction.id))
                    class=(LINK_STYLE)
                {
                    "Edit"
                }

                " "

                button
                    hx-delete=(endpoints::format_endpoint(endpoints::TRANSACTION, transaction.id))
                    hx-target="closest tr"
                    hx-swap="outerHTML"
                    hx-confirm="Yakin ingin menghapus transaksi ini?"
                    class=(BUTTON_DELETE_STYLE)
                {
                    "Hapus"
                }
            }
        }
    }
}

fn listing_view(
    kind: TransactionKind,
    rows: &[(Transaction, Option<String>)],
    total: f64,
) -> Markup {
    let active_endpoint = match kind {
        TransactionKind::Income => endpoints::INCOME_VIEW,
        TransactionKind::Expense => endpoints::EXPENSES_VIEW,
    };
    let nav_bar = NavBar::new(active_endpoint).into_html();
    let new_transaction_url = format!(
        "{}?kind={}",
        endpoints::NEW_TRANSACTION_VIEW,
        kind.as_str()
    );
    let export_url = format!(
        "{}?kind={}",
        endpoints::EXPORT_TRANSACTIONS,
        kind.as_str()
    );

    let content = html! {
        (nav_bar)

        div class="flex flex-col px-6 py-8 mx-auto max-w-screen-lg text-gray-900 dark:text-white"
        {
            div class="flex justify-between items-center mb-4"
            {
                h1 class="text-xl font-bold" { (kind.label()) }

                div
                {
                    a href=(new_transaction_url) class=(LINK_STYLE) { "Tambah" }
                    " "
                    a href=(export_url) class=(LINK_STYLE) { "Export CSV" }
                }
            }

            p class="mb-4 text-gray-600 dark:text-gray-400"
            {
                "Total " (kind.label()) ": " (rupiah(total))
            }

            @if rows.is_empty() {
                p class="text-gray-500 dark:text-gray-400 text-center py-8"
                {
                    "Belum ada " (kind.label().to_lowercase()) " tercatat"
                }
            } @else {
                table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Tanggal" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Jumlah" }

                            @if kind == TransactionKind::Expense {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Kategori" }
                            }

                            th scope="col" class=(TABLE_CELL_STYLE) { "Sumber" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Keterangan" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "" }
                        }
                    }

                    tbody
                    {
                        @for (transaction, category_name) in rows {
                            (transaction_row_view(kind, transaction, category_name.as_deref()))
                        }
                    }
                }
            }
        }
    };

    base(kind.label(), &[], &content)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use rusqlite::Connection;
    use scraper::{Html, Selector};
    use time::macros::date;

    use crate::{
        db::initialize,
        transaction::{
            FundSource, Transaction, TransactionKind,
            core::create_transaction,
            models::Bank,
        },
    };

    use super::{TransactionsPageState, get_expenses_page, get_income_page};

    fn get_test_state() -> TransactionsPageState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        TransactionsPageState {
            db_connection: Arc::new(Mutex::new(conn)),
        }
    }

    async fn parse(response: axum::response::Response) -> Html {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        Html::parse_document(&String::from_utf8_lossy(&body))
    }

    #[tokio::test]
    async fn income_page_shows_prompt_when_empty() {
        let state = get_test_state();

        let response = get_income_page(State(state)).await.unwrap();

        let html = parse(response).await;
        assert!(html.html().contains("Belum ada pemasukan tercatat"));
    }

    #[tokio::test]
    async fn expense_page_lists_transactions_with_bank() {
        let state = get_test_state();
        {
            let connection = state.db_connection.lock().unwrap();
            create_transaction(
                Transaction::build(TransactionKind::Expense, 45_000.0, date!(2025 - 10 - 03))
                    .memo("Belanja mingguan")
                    .source(FundSource::Debit)
                    .bank(Some(Bank::Dana)),
                &connection,
            )
            .unwrap();
        }

        let response = get_expenses_page(State(state)).await.unwrap();

        let html = parse(response).await;
        let row_selector = Selector::parse("tbody tr").unwrap();
        assert_eq!(html.select(&row_selector).count(), 1);
        assert!(html.html().contains("Debit (DANA)"));
        assert!(html.html().contains("Rp 45.000"));
    }
}
