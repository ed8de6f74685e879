//! The savings goals (target) page: summary cards, goal progress and the
//! contribution history.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, endpoints,
    goal::core::{
        Goal, Saving, SavingsBySource, aggregate_by_source, get_all_goals, get_savings_history,
        goal_percentage,
    },
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, CARD_STYLE, FORM_LABEL_STYLE,
        FORM_SELECT_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, rupiah,
    },
    navigation::NavBar,
    timezone::today_in,
    transaction::FundSource,
};

/// How many contribution history rows to show on the page.
const HISTORY_LIMIT: u32 = 10;

/// The state needed for the goals page.
#[derive(Debug, Clone)]
pub struct GoalsPageState {
    /// The database connection for reading goals and contributions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Jakarta".
    pub local_timezone: String,
}

impl FromRef<AppState> for GoalsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Route handler for the goals page.
pub async fn get_goals_page(State(state): State<GoalsPageState>) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let goals = get_all_goals(&connection)?;
    let savings_balance = aggregate_by_source(&connection)?;
    let history = get_savings_history(HISTORY_LIMIT, &connection)?;
    let today = today_in(&state.local_timezone);

    Ok(goals_view(&goals, savings_balance, &history, today).into_response())
}

fn savings_balance_cards(savings_balance: SavingsBySource) -> Markup {
    html! {
        div class="grid grid-cols-1 md:grid-cols-2 gap-4 mb-6"
        {
            div class=(CARD_STYLE)
            {
                p class="text-sm text-gray-600 dark:text-gray-400" { "Tabungan Cash" }
                p class="text-xl font-semibold" { (rupiah(savings_balance.cash)) }
            }

            div class=(CARD_STYLE)
            {
                p class="text-sm text-gray-600 dark:text-gray-400" { "Tabungan Debit" }
                p class="text-xl font-semibold" { (rupiah(savings_balance.debit)) }
            }
        }
    }
}

fn goal_card_view(goal: &Goal, today: time::Date) -> Markup {
    let percentage = goal_percentage(goal);
    let contribute_endpoint = endpoints::format_endpoint(endpoints::GOAL_SAVINGS, goal.id);
    let remaining = (goal.target_amount - goal.progress).max(0.0);

    html! {
        div class=(CARD_STYLE)
        {
            div class="flex justify-between items-start mb-2"
            {
                div
                {
                    h4 class="font-semibold" { (goal.name) }

                    @if let Some(deadline) = goal.deadline {
                        p class="text-xs text-gray-500 mt-1" { "Deadline: " (deadline) }
                    }
                }

                div
                {
                    a
                        href=(endpoints::format_endpoint(endpoints::EDIT_GOAL_VIEW, goal.id))
                        class=(LINK_STYLE)
                    {
                        "Edit"
                    }

                    " "

                    button
                        hx-delete=(endpoints::format_endpoint(endpoints::GOAL, goal.id))
                        hx-target="closest div.goal-card"
                        hx-confirm="Yakin ingin menghapus target ini beserta riwayat tabungannya?"
                        class=(BUTTON_DELETE_STYLE)
                    {
                        "Hapus"
                    }
                }
            }

            div class="mb-3"
            {
                div class="flex justify-between text-sm mb-1"
                {
                    span { "Progress" }
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

            p class="text-sm text-gray-600 dark:text-gray-400"
            {
                "Terkumpul: " (rupiah(goal.progress)) " / " (rupiah(goal.target_amount))
                " (sisa " (rupiah(remaining)) ")"
            }

            form
                hx-post=(contribute_endpoint)
                hx-target-error="#alert-container"
                class="mt-3 flex flex-wrap gap-2 items-end"
            {
                input type="hidden" name="date" value=(today);

                div
                {
                    label class=(FORM_LABEL_STYLE) { "Jumlah (Rp)" }
                    input
                        type="number"
                        name="amount"
                        min="1"
                        step="any"
                        placeholder="50000"
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label class=(FORM_LABEL_STYLE) { "Sumber" }
                    select name="source" class=(FORM_SELECT_STYLE)
                    {
                        option value=(FundSource::Cash.as_str()) { "Cash" }
                        option value=(FundSource::Debit.as_str()) { "Debit" }
                    }
                }

                div
                {
                    label class=(FORM_LABEL_STYLE) { "Catatan" }
                    input
                        type="text"
                        name="note"
                        placeholder="Contoh: Bank BCA, Dompet, Celengan, dll"
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Nabung" }
            }
        }
    }
}

fn history_row_view(saving: &Saving, goal_name: &str) -> Markup {
    let update_endpoint = endpoints::format_endpoint(endpoints::SAVING, saving.id);

    html! {
        tr class=(TABLE_ROW_STYLE)
        {
            td class=(TABLE_CELL_STYLE) { (saving.date) }
            td class=(TABLE_CELL_STYLE) { (goal_name) }
            td class=(TABLE_CELL_STYLE) { "+" (rupiah(saving.amount)) }
            td class=(TABLE_CELL_STYLE) { (saving.source) }
            td class=(TABLE_CELL_STYLE) { (saving.note) }
            td class=(TABLE_CELL_STYLE)
            {
                form
                    hx-put=(update_endpoint)
                    hx-target-error="#alert-container"
                    class="flex gap-2 items-center"
                {
                    input
                        type="number"
                        name="amount"
                        min="1"
                        step="any"
                        value=(saving.amount)
                        required
                        class=(FORM_TEXT_INPUT_STYLE);

                    input
                        type="hidden"
                        name="note"
                        value=(saving.note);

                    button type="submit" class=(LINK_STYLE) { "Simpan" }

                    button
                        type="button"
                        hx-delete=(update_endpoint)
                        hx-target="closest tr"
                        hx-swap="outerHTML"
                        hx-confirm="Yakin ingin menghapus riwayat tabungan ini?"
                        class=(BUTTON_DELETE_STYLE)
                    {
                        "Hapus"
                    }
                }
            }
        }
    }
}

fn new_goal_form_view() -> Markup {
    html! {
        form
            hx-post=(endpoints::GOALS_API)
            hx-target-error="#alert-container"
            class="w-full max-w-md space-y-4"
        {
            div
            {
                label for="name" class=(FORM_LABEL_STYLE) { "Nama Target" }

                input
                    id="name"
                    type="text"
                    name="name"
                    placeholder="Dana darurat, Liburan, dll"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="target_amount" class=(FORM_LABEL_STYLE) { "Target (Rp)" }

                input
                    id="target_amount"
                    type="number"
                    name="target_amount"
                    min="1"
                    step="any"
                    placeholder="5000000"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="deadline" class=(FORM_LABEL_STYLE) { "Deadline (Opsional)" }

                input
                    id="deadline"
                    type="date"
                    name="deadline"
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Tambah Target" }
        }
    }
}

fn goals_view(
    goals: &[Goal],
    savings_balance: SavingsBySource,
    history: &[(Saving, String)],
    today: time::Date,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::GOALS_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class="flex flex-col px-6 py-8 mx-auto max-w-screen-lg text-gray-900 dark:text-white"
        {
            h1 class="text-xl font-bold mb-4" { "Target Keuangan" }

            (savings_balance_cards(savings_balance))

            @if goals.is_empty() {
                p class="text-gray-500 dark:text-gray-400 text-center py-8"
                {
                    "Belum ada target. Mulai tambahkan target keuangan di bawah."
                }
            } @else {
                div class="space-y-4 mb-8"
                {
                    @for goal in goals {
                        div class="goal-card" { (goal_card_view(goal, today)) }
                    }
                }
            }

            @if !history.is_empty() {
                h2 class="text-lg font-semibold mb-2" { "Riwayat Tabungan" }

                table class="w-full text-sm text-left text-gray-500 dark:text-gray-400 mb-8"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Tanggal" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Target" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Jumlah" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Sumber" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Catatan" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "" }
                        }
                    }

                    tbody
                    {
                        @for (saving, goal_name) in history {
                            (history_row_view(saving, goal_name))
                        }
                    }
                }
            }

            h2 class="text-lg font-semibold mb-2" { "Tambah Target Baru" }
            (new_goal_form_view())
        }
    };

    base("Target", &[], &content)
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
        goal::core::{contribute, create_goal},
        transaction::FundSource,
    };

    use super::{GoalsPageState, get_goals_page};

    async fn parse(response: axum::response::Response) -> Html {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        Html::parse_document(&String::from_utf8_lossy(&body))
    }

    #[tokio::test]
    async fn shows_goal_progress_and_history() {
        let mut conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let goal = create_goal("Liburan", 500_000.0, None, &conn).unwrap();
        contribute(
            goal.id,
            150_000.0,
            FundSource::Cash,
            "Celengan",
            date!(2025 - 10 - 01),
            &mut conn,
        )
        .unwrap();
        let state = GoalsPageState {
            db_connection: Arc::new(Mutex::new(conn)),
            local_timezone: "Etc/UTC".to_owned(),
        };

        let response = get_goals_page(State(state)).await.unwrap();

        let html = parse(response).await;
        assert!(html.html().contains("Liburan"));
        assert!(html.html().contains("30.0%"));
        assert!(html.html().contains("Celengan"));
    }

    #[tokio::test]
    async fn shows_prompt_when_no_goals() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let state = GoalsPageState {
            db_connection: Arc::new(Mutex::new(conn)),
            local_timezone: "Etc/UTC".to_owned(),
        };

        let response = get_goals_page(State(state)).await.unwrap();

        let html = parse(response).await;
        assert!(html.html().contains("Belum ada target"));
        let card_selector = Selector::parse("div.goal-card").unwrap();
        assert_eq!(html.select(&card_selector).count(), 0);
    }
}
