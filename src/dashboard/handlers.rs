//! The dashboard route handler and view rendering.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::Date;

use crate::{
    AppState, Error,
    dashboard::{
        aggregation::{
            balance_by_source, expense_by_category, month_start_before, monthly_balance_series,
        },
        cards::{
            DashboardTotals, SourceBalances, installment_card, source_balance_cards, totals_cards,
        },
        charts::{DashboardChart, balance_chart, charts_script, charts_view, expense_chart},
    },
    debt::{InstallmentSummary, aggregate_monthly_installments, get_all_debts},
    endpoints,
    goal::{Goal, get_all_goals, goal_percentage},
    html::{CARD_STYLE, HeadElement, base, link, rupiah},
    navigation::NavBar,
    notification::{Reminder, collect_reminders},
    timezone::today_in,
    transaction::{
        ALL_BANKS, FundSource, TransactionKind, get_all_transactions,
        get_expenses_with_category_names, get_transactions_in_date_range, total_by_kind,
    },
};

/// How many trailing months the balance chart covers.
const BALANCE_MONTHS_BACK: u32 = 6;

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading all domain models.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Jakarta".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Holds all the data needed to render the dashboard.
struct DashboardData {
    totals: DashboardTotals,
    source_balances: SourceBalances,
    goals: Vec<Goal>,
    installments: InstallmentSummary,
    reminders: Vec<Reminder>,
    charts: Vec<DashboardChart>,
}

/// Display a page with an overview of the user's data.
pub async fn get_dashboard_page(State(state): State<DashboardState>) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let today = today_in(&state.local_timezone);
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW);

    match build_dashboard_data(today, &connection)? {
        Some(data) => Ok(dashboard_view(nav_bar, &data).into_response()),
        None => Ok(dashboard_no_data_view(nav_bar).into_response()),
    }
}

/// Fetches and builds all data needed for the dashboard display.
///
/// Everything is recomputed from the store on each call; nothing is cached
/// between requests.
///
/// # Returns
/// All dashboard data ready for rendering, or `None` if neither transactions
/// nor goals nor debts exist yet.
fn build_dashboard_data(
    today: Date,
    connection: &Connection,
) -> Result<Option<DashboardData>, Error> {
    let total_income = total_by_kind(TransactionKind::Income, connection)?;
    let total_expenses = total_by_kind(TransactionKind::Expense, connection)?;
    let goals = get_all_goals(connection)?;
    let debts = get_all_debts(connection)?;

    if total_income == 0.0 && total_expenses == 0.0 && goals.is_empty() && debts.is_empty() {
        return Ok(None);
    }

    let totals = DashboardTotals {
        total_income,
        total_expenses,
        balance: total_income - total_expenses,
        active_goals: goals.len(),
    };

    // Chart data: trailing six months of transactions and the all-time
    // category breakdown.
    let window_start = month_start_before(today, BALANCE_MONTHS_BACK - 1);
    let window_transactions =
        get_transactions_in_date_range(window_start..=today, connection)?;

    let balance_series =
        monthly_balance_series(&window_transactions, BALANCE_MONTHS_BACK, today);
    let expense_slices = expense_by_category(&get_expenses_with_category_names(connection)?);

    let mut charts = Vec::new();
    if !expense_slices.is_empty() {
        charts.push(DashboardChart {
            id: "expense-chart",
            options: expense_chart(&expense_slices).to_string(),
        });
    }
    charts.push(DashboardChart {
        id: "balance-chart",
        options: balance_chart(&balance_series).to_string(),
    });

    // Per-source balances span the whole history, not just the chart window.
    let all_transactions = get_all_transactions(connection)?;
    let source_balances = SourceBalances {
        cash: balance_by_source(&all_transactions, FundSource::Cash, None),
        banks: ALL_BANKS
            .into_iter()
            .map(|bank| {
                (
                    bank,
                    balance_by_source(&all_transactions, FundSource::Debit, Some(bank)),
                )
            })
            .collect(),
    };

    let installments = aggregate_monthly_installments(&debts);
    let reminders = collect_reminders(today, connection)?;

    Ok(Some(DashboardData {
        totals,
        source_balances,
        goals,
        installments,
        reminders,
        charts,
    }))
}

/// Renders the dashboard page when no data exists yet.
fn dashboard_no_data_view(nav_bar: NavBar) -> Markup {
    let nav_bar = nav_bar.into_html();
    let income_link = link(endpoints::INCOME_VIEW, "pemasukan");
    let goals_link = link(endpoints::GOALS_VIEW, "target keuangan");

    let content = html!(
        (nav_bar)

        div class="flex flex-col items-center px-6 py-8 mx-auto text-gray-900 dark:text-white"
        {
            h2 class="text-xl font-bold"
            {
                "Belum ada data untuk ditampilkan"
            }

            p
            {
                "Mulai tambahkan " (income_link) ", pengeluaran, dan " (goals_link) "."
            }
        }
    );

    base("Dashboard", &[], &content)
}

fn reminders_view(reminders: &[Reminder]) -> Markup {
    html! {
        @if !reminders.is_empty() {
            div class=(CARD_STYLE)
            {
                h3 class="text-lg font-semibold mb-2" { "Pengingat" }

                ul class="space-y-1 text-sm"
                {
                    @for reminder in reminders {
                        li
                        {
                            span class="font-medium" { (reminder.title) ": " }
                            (reminder.body)
                        }
                    }
                }
            }

            div class="mb-4" {}
        }
    }
}

fn goals_summary_view(goals: &[Goal]) -> Markup {
    html! {
        @if !goals.is_empty() {
            div class=(CARD_STYLE)
            {
                h3 class="text-lg font-semibold mb-2" { "Ringkasan Target" }

                div class="space-y-3"
                {
                    @for goal in goals {
                        @let percentage = goal_percentage(goal);

                        div
                        {
                            div class="flex justify-between text-sm mb-1"
                            {
                                span { (goal.name) }
                                span { (format!("{percentage:.1}%")) }
                            }

                            div class="w-full bg-gray-200 dark:bg-gray-700 rounded-full h-2"
                            {
                                div
                                    class="bg-green-600 h-2 rounded-full"
                                    style=(format!("width: {percentage}%"))
                                {}
                            }

                            p class="text-xs text-gray-500 mt-1"
                            {
                                (rupiah(goal.progress)) " / " (rupiah(goal.target_amount))
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Renders the main dashboard page.
fn dashboard_view(nav_bar: NavBar, data: &DashboardData) -> Markup {
    let nav_bar = nav_bar.into_html();

    let content = html!(
        (nav_bar)

        div
            id="dashboard-content"
            class="flex flex-col px-2 lg:px-6 lg:py-8 mx-auto
                max-w-screen-xl text-gray-900 dark:text-white"
        {
            (totals_cards(&data.totals))
            (source_balance_cards(&data.source_balances))
            (reminders_view(&data.reminders))
            (installment_card(&data.installments))

            (charts_view(&data.charts))

            (goals_summary_view(&data.goals))

            p class="mt-4 text-sm"
            {
                (link(endpoints::EXPORT_SUMMARY, "Export ringkasan CSV"))
            }
        }
    );

    let scripts = [
        HeadElement::ScriptLink("/static/echarts.6.0.0.min.js".to_owned()),
        charts_script(&data.charts),
    ];

    base("Dashboard", &scripts, &content)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use rusqlite::Connection;
    use scraper::{Html, Selector};
    use time::{Duration, OffsetDateTime};

    use crate::{
        db::initialize,
        goal::create_goal,
        transaction::{FundSource, Transaction, TransactionKind, create_transaction},
    };

    use super::{DashboardState, get_dashboard_page};

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    async fn parse_html(response: axum::response::Response) -> Html {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        Html::parse_document(&String::from_utf8_lossy(&body))
    }

    #[track_caller]
    fn assert_chart_exists(html: &Html, chart_id: &str) {
        let selector = Selector::parse(&format!("#{}", chart_id)).unwrap();
        assert!(
            html.select(&selector).next().is_some(),
            "Chart with id '{}' not found",
            chart_id
        );
    }

    #[tokio::test]
    async fn dashboard_page_loads_successfully() {
        let conn = get_test_connection();
        let today = OffsetDateTime::now_utc().date();

        create_transaction(
            Transaction::build(TransactionKind::Income, 100_000.0, today)
                .source(FundSource::Debit),
            &conn,
        )
        .unwrap();
        create_transaction(
            Transaction::build(TransactionKind::Expense, 50_000.0, today - Duration::days(15)),
            &conn,
        )
        .unwrap();

        let state = DashboardState {
            db_connection: Arc::new(Mutex::new(conn)),
            local_timezone: "Etc/UTC".to_owned(),
        };

        let response = get_dashboard_page(State(state)).await.unwrap();

        assert_eq!(response.status(), axum::http::StatusCode::OK);

        let html = parse_html(response).await;
        assert_chart_exists(&html, "expense-chart");
        assert_chart_exists(&html, "balance-chart");
        assert!(html.html().contains("Total Pemasukan"));
        assert!(html.html().contains("Rp 100.000"));
    }

    #[tokio::test]
    async fn displays_prompt_text_on_no_data() {
        let conn = get_test_connection();
        let state = DashboardState {
            db_connection: Arc::new(Mutex::new(conn)),
            local_timezone: "Etc/UTC".to_owned(),
        };

        let response = get_dashboard_page(State(state)).await.unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::OK);

        let html = parse_html(response).await;
        assert!(html.html().contains("Belum ada data untuk ditampilkan"));
    }

    #[tokio::test]
    async fn goals_alone_still_render_dashboard() {
        let conn = get_test_connection();
        create_goal("Liburan", 500_000.0, None, &conn).unwrap();
        let state = DashboardState {
            db_connection: Arc::new(Mutex::new(conn)),
            local_timezone: "Etc/UTC".to_owned(),
        };

        let response = get_dashboard_page(State(state)).await.unwrap();

        let html = parse_html(response).await;
        assert!(html.html().contains("Ringkasan Target"));
        assert!(html.html().contains("Liburan"));
    }
}
