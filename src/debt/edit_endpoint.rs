//! Defines the edit debt page and the endpoint that applies the edit.

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
    AppState, Error,
    debt::{
        DebtId,
        core::{get_debt, update_debt},
        create_endpoint::DebtForm,
    },
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
    },
    navigation::NavBar,
};

/// The state needed to show the edit page and update a debt.
#[derive(Debug, Clone)]
pub struct EditDebtState {
    /// The database connection for managing debts.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditDebtState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Route handler for the page with the form to edit an existing debt.
pub async fn get_edit_debt_page(
    Path(debt_id): Path<DebtId>,
    State(state): State<EditDebtState>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let debt = get_debt(debt_id, &connection)?;
    let update_endpoint = endpoints::format_endpoint(endpoints::DEBT, debt_id);
    let nav_bar = NavBar::new(endpoints::DEBTS_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold my-4" { "Edit Hutang" }

            form
                hx-put=(update_endpoint)
                hx-target-error="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                div
                {
                    label for="creditor" class=(FORM_LABEL_STYLE) { "Nama Kreditor" }

                    input
                        id="creditor"
                        type="text"
                        name="creditor"
                        value=(debt.creditor)
                        placeholder="Bank, Teman, dll"
                        required
                        autofocus
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="principal" class=(FORM_LABEL_STYLE) { "Jumlah Hutang (Rp)" }

                    input
                        id="principal"
                        type="number"
                        name="principal"
                        min="1"
                        step="any"
                        value=(debt.principal)
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="debt_date" class=(FORM_LABEL_STYLE) { "Tanggal Hutang" }

                    input
                        id="debt_date"
                        type="date"
                        name="debt_date"
                        value=(debt.debt_date)
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="due_date" class=(FORM_LABEL_STYLE) { "Tanggal Jatuh Tempo (Opsional)" }

                    input
                        id="due_date"
                        type="date"
                        name="due_date"
                        value=[debt.due_date]
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="memo" class=(FORM_LABEL_STYLE) { "Keterangan" }

                    input
                        id="memo"
                        type="text"
                        name="memo"
                        value=(debt.memo)
                        placeholder="Deskripsi hutang"
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="installment_amount" class=(FORM_LABEL_STYLE) { "Cicilan per Bulan (Opsional, Rp)" }

                    input
                        id="installment_amount"
                        type="number"
                        name="installment_amount"
                        min="1"
                        step="any"
                        value=[debt.installment_amount]
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="installment_day" class=(FORM_LABEL_STYLE) { "Tanggal Cicilan (1-31)" }

                    input
                        id="installment_day"
                        type="number"
                        name="installment_day"
                        min="1"
                        max="31"
                        value=[debt.installment_day]
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="installment_months" class=(FORM_LABEL_STYLE) { "Durasi Cicilan (bulan)" }

                    input
                        id="installment_months"
                        type="number"
                        name="installment_months"
                        min="1"
                        value=[debt.installment_months]
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Update Hutang" }
            }
        }
    };

    Ok(base("Edit Hutang", &[], &content).into_response())
}

/// A route handler for updating a debt, redirects to the debts page on
/// success.
///
/// The paid total is untouched; the status is recomputed in case the
/// principal changed.
pub async fn edit_debt_endpoint(
    Path(debt_id): Path<DebtId>,
    State(state): State<EditDebtState>,
    Form(form): Form<DebtForm>,
) -> Response {
    let mut connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match update_debt(debt_id, form.into(), &mut connection) {
        Ok(()) => (
            HxRedirect(endpoints::DEBTS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(
            error @ (Error::EmptyCreditorName
            | Error::InvalidAmount
            | Error::InvalidInstallmentDay(_)
            | Error::UpdateMissingDebt),
        ) => error.into_alert_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while updating debt {debt_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}
