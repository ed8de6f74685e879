//! The debts (hutang) page: status filtering, payment progress and the
//! per-debt payment forms.

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
    AppState, Error, endpoints,
    debt::core::{
        Debt, DebtPayment, DebtStatus, InstallmentSummary, aggregate_monthly_installments,
        get_all_debts, get_payments_for_debt, is_overdue, progress_percentage, remaining_amount,
    },
    html::{
        BADGE_GREEN_STYLE, BADGE_RED_STYLE, BADGE_YELLOW_STYLE, BUTTON_DELETE_STYLE,
        BUTTON_PRIMARY_STYLE, CARD_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE,
        base, rupiah,
    },
    navigation::NavBar,
    timezone::today_in,
};

/// The status filter options on the debts page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum StatusFilter {
    /// Show every debt.
    #[default]
    All,
    /// Only debts that are still outstanding.
    Active,
    /// Only fully paid debts.
    Paid,
    /// Only unpaid debts that are past their due date.
    Overdue,
}

impl StatusFilter {
    fn from_query(raw: Option<&str>) -> Self {
        match raw {
            Some("aktif") => StatusFilter::Active,
            Some("lunas") => StatusFilter::Paid,
            Some("lewat_tempo") => StatusFilter::Overdue,
            _ => StatusFilter::All,
        }
    }

    fn matches(self, debt: &Debt, today: Date) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => debt.status == DebtStatus::Active,
            StatusFilter::Paid => debt.status == DebtStatus::Paid,
            StatusFilter::Overdue => is_overdue(debt, today),
        }
    }
}

/// The state needed for the debts page.
#[derive(Debug, Clone)]
pub struct DebtsPageState {
    /// The database connection for reading debts and payments.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Jakarta".
    pub local_timezone: String,
}

impl FromRef<AppState> for DebtsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Query parameters for the debts page.
#[derive(Debug, Deserialize)]
pub struct DebtsPageParams {
    /// "semua", "aktif", "lunas" or "lewat_tempo".
    #[serde(default)]
    pub status: Option<String>,
}

/// Route handler for the debts page.
pub async fn get_debts_page(
    Query(params): Query<DebtsPageParams>,
    State(state): State<DebtsPageState>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let today = today_in(&state.local_timezone);
    let filter = StatusFilter::from_query(params.status.as_deref());

    let all_debts = get_all_debts(&connection)?;
    let installments = aggregate_monthly_installments(&all_debts);

    let mut debts_with_payments = Vec::new();
    for debt in all_debts
        .into_iter()
        .filter(|debt| filter.matches(debt, today))
    {
        let payments = get_payments_for_debt(debt.id, &connection)?;
        debts_with_payments.push((debt, payments));
    }

    Ok(debts_view(&debts_with_payments, &installments, filter, today).into_response())
}

fn status_badge(debt: &Debt, today: Date) -> Markup {
    if debt.status == DebtStatus::Paid {
        return html!( span class=(BADGE_GREEN_STYLE) { "Lunas" } );
    }

    if is_overdue(debt, today) {
        return html!( span class=(BADGE_RED_STYLE) { "Lewat Tempo" } );
    }

    html!( span class=(BADGE_YELLOW_STYLE) { "Aktif" } )
}

fn payment_history_view(payments: &[DebtPayment]) -> Markup {
    html! {
        @if !payments.is_empty() {
            details class="mt-2 text-sm"
            {
                summary class="cursor-pointer text-gray-600 dark:text-gray-400"
                {
                    "Riwayat pembayaran (" (payments.len()) ")"
                }

                ul class="mt-2 space-y-1"
                {
                    @for payment in payments {
                        @let payment_endpoint = endpoints::format_endpoint(endpoints::PAYMENT, payment.id);

                        li
                        {
                            form
                                hx-put=(payment_endpoint)
                                hx-target-error="#alert-container"
                                class="flex justify-between items-center gap-2"
                            {
                                span { (payment.date) }

                                input type="hidden" name="date" value=(payment.date);

                                input
                                    type="number"
                                    name="amount"
                                    min="1"
                                    step="any"
                                    value=(payment.amount)
                                    required
                                    class=(FORM_TEXT_INPUT_STYLE);

                                button type="submit" class=(LINK_STYLE) { "Simpan" }

                                button
                                    type="button"
                                    hx-delete=(payment_endpoint)
                                    hx-confirm="Hapus pembayaran ini? Status hutang akan dihitung ulang."
                                    class=(BUTTON_DELETE_STYLE)
                                {
                                    "Hapus"
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn debt_card_view(debt: &Debt, payments: &[DebtPayment], today: Date) -> Markup {
    let percentage = progress_percentage(debt);
    let remaining = remaining_amount(debt);
    let payment_endpoint = endpoints::format_endpoint(endpoints::DEBT_PAYMENTS, debt.id);

    html! {
        div class=(CARD_STYLE)
        {
            div class="flex justify-between items-start mb-2"
            {
                div
                {
                    h4 class="font-semibold" { (debt.creditor) }
                    p class="text-sm text-gray-600 dark:text-gray-400" { (debt.memo) }

                    @if let Some(due_date) = debt.due_date {
                        p class="text-xs mt-1 text-gray-500"
                        {
                            "Jatuh tempo: " (due_date)
                            @if is_overdue(debt, today) { " (Lewat Tempo)" }
                        }
                    }

                    @if let (Some(amount), Some(day)) = (debt.installment_amount, debt.installment_day) {
                        p class="text-xs mt-1 text-gray-500"
                        {
                            "Cicilan " (rupiah(amount)) " setiap tanggal " (day)

                            @if let Some(months) = debt.installment_months {
                                " selama " (months) " bulan"
                            }
                        }
                    }
                }

                (status_badge(debt, today))
            }

            div class="mb-3"
            {
                div class="flex justify-between text-sm mb-1"
                {
                    span { "Progress Pembayaran" }
                    span { (format!("{percentage:.1}%")) }
                }

                div class="w-full bg-gray-200 dark:bg-gray-700 rounded-full h-2"
                {
                    div
                        class="bg-green-600 h-2 rounded-full"
                        style=(format!("width: {percentage}%"))
                    {}
                }
            }

            div class="flex justify-between items-start text-sm"
            {
                div
                {
                    p class="text-gray-600 dark:text-gray-400"
                    {
                        "Terbayar: " (rupiah(debt.amount_paid))
                    }
                    p class="text-red-600 font-medium" { "Sisa: " (rupiah(remaining)) }
                }

                div
                {
                    a
                        href=(endpoints::format_endpoint(endpoints::EDIT_DEBT_VIEW, debt.id))
                        class=(LINK_STYLE)
                    {
                        "Edit"
                    }

                    " "

                    button
                        hx-delete=(endpoints::format_endpoint(endpoints::DEBT, debt.id))
                        hx-confirm="Yakin ingin menghapus hutang ini beserta riwayat pembayarannya?"
                        class=(BUTTON_DELETE_STYLE)
                    {
                        "Hapus"
                    }
                }
            }

            @if debt.status == DebtStatus::Active {
                form
                    hx-post=(payment_endpoint)
                    hx-target-error="#alert-container"
                    class="mt-3 flex flex-wrap gap-2 items-end"
                {
                    input type="hidden" name="date" value=(today);

                    div
                    {
                        label class=(FORM_LABEL_STYLE) { "Jumlah Pembayaran (Rp)" }
                        input
                            type="number"
                            name="amount"
                            min="1"
                            step="any"
                            placeholder="100000"
                            required
                            class=(FORM_TEXT_INPUT_STYLE);
                    }

                    button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Bayar" }
                }
            }

            (payment_history_view(payments))
        }
    }
}

fn filter_link(label: &str, value: &str, is_current: bool) -> Markup {
    let url = format!("{}?status={value}", endpoints::DEBTS_VIEW);
    let style = if is_current {
        "font-semibold text-blue-700 dark:text-blue-500 underline"
    } else {
        LINK_STYLE
    };

    html!( a href=(url) class=(style) { (label) } )
}

fn debts_view(
    debts_with_payments: &[(Debt, Vec<DebtPayment>)],
    installments: &InstallmentSummary,
    filter: StatusFilter,
    today: Date,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::DEBTS_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class="flex flex-col px-6 py-8 mx-auto max-w-screen-lg text-gray-900 dark:text-white"
        {
            div class="flex justify-between items-center mb-4"
            {
                h1 class="text-xl font-bold" { "Daftar Hutang" }

                div class="flex gap-3 text-sm"
                {
                    (filter_link("Semua", "semua", filter == StatusFilter::All))
                    (filter_link("Aktif", "aktif", filter == StatusFilter::Active))
                    (filter_link("Lunas", "lunas", filter == StatusFilter::Paid))
                    (filter_link("Lewat Tempo", "lewat_tempo", filter == StatusFilter::Overdue))
                }
            }

            @if !installments.entries.is_empty() {
                div class=(CARD_STYLE)
                {
                    p class="text-sm text-gray-600 dark:text-gray-400" { "Beban cicilan bulan ini" }
                    p class="text-xl font-semibold" { (rupiah(installments.total)) }

                    ul class="mt-2 text-sm text-gray-600 dark:text-gray-400"
                    {
                        @for entry in &installments.entries {
                            li { (entry.creditor) ": " (rupiah(entry.amount)) }
                        }
                    }
                }

                div class="mb-4" {}
            }

            @if debts_with_payments.is_empty() {
                p class="text-gray-500 dark:text-gray-400 text-center py-8"
                {
                    @if filter == StatusFilter::All {
                        "Belum ada hutang tercatat"
                    } @else {
                        "Tidak ada hutang dengan status ini"
                    }
                }
            } @else {
                div class="space-y-4 mb-8"
                {
                    @for (debt, payments) in debts_with_payments {
                        (debt_card_view(debt, payments, today))
                    }
                }
            }

            h2 class="text-lg font-semibold mb-2" { "Tambah Hutang Baru" }
            (new_debt_form_view(today))
        }
    };

    base("Hutang", &[], &content)
}

fn new_debt_form_view(today: Date) -> Markup {
    html! {
        form
            hx-post=(endpoints::DEBTS_API)
            hx-target-error="#alert-container"
            class="w-full max-w-md space-y-4"
        {
            div
            {
                label for="creditor" class=(FORM_LABEL_STYLE) { "Nama Kreditor" }

                input
                    id="creditor"
                    type="text"
                    name="creditor"
                    placeholder="Bank, Teman, dll"
                    required
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
                    placeholder="1000000"
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
                    value=(today)
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
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="memo" class=(FORM_LABEL_STYLE) { "Keterangan" }

                input
                    id="memo"
                    type="text"
                    name="memo"
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
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Tambah Hutang" }
        }
    }
}
