//! This file defines the `Budget` type, its database queries, the
//! limit-vs-actual usage computation and the budget page.
//!
//! A budget caps one expense category for one calendar month. Usage is a
//! plain percentage of the limit; crossing 90% surfaces a reminder.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::{Date, Month};

use crate::{
    AppState, Error,
    alert::Alert,
    category::{Category, CategoryId, CategoryKind, get_categories_by_kind},
    endpoints,
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, CARD_STYLE, FORM_LABEL_STYLE,
        FORM_SELECT_STYLE, FORM_TEXT_INPUT_STYLE, base, rupiah,
    },
    navigation::NavBar,
    timezone::today_in,
};

/// The ID of a budget.
pub type BudgetId = i64;

/// The usage threshold (in percent) past which a budget is flagged.
pub const BUDGET_WARNING_PERCENTAGE: f64 = 90.0;

/// A monthly spending cap for one expense category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    /// The ID of the budget.
    pub id: BudgetId,
    /// The expense category the cap applies to.
    pub category_id: CategoryId,
    /// The spending cap in Rupiah.
    pub limit_amount: f64,
    /// The calendar month the cap applies to, 1 to 12.
    pub month: u8,
    /// The calendar year the cap applies to.
    pub year: i32,
}

/// How much of a budget's limit has been spent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BudgetUsage {
    /// The summed expenses for the budget's category and month, in Rupiah.
    pub spent: f64,
    /// `spent` as a percentage of the limit. Not capped: an overrun budget
    /// reports more than 100.
    pub percentage: f64,
}

/// The first and last day of a calendar month.
pub fn month_bounds(year: i32, month: u8) -> Result<(Date, Date), Error> {
    let month = Month::try_from(month).map_err(|_| Error::InvalidBudgetMonth(month))?;
    let first = Date::from_calendar_date(year, month, 1)
        .map_err(|_| Error::InvalidBudgetMonth(month as u8))?;
    let last = Date::from_calendar_date(year, month, time::util::days_in_month(month, year))
        .expect("last day of a valid month is always valid");

    Ok((first, last))
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create a budget for a category and month.
///
/// # Errors
/// This function will return an [Error::InvalidAmount] if the limit is not
/// positive, an [Error::InvalidBudgetMonth] if the month is out of range, an
/// [Error::InvalidCategory] if the category does not exist, an
/// [Error::DuplicateBudget] if the category already has a budget for that
/// month, or an error if there is some other SQL error.
pub fn create_budget(
    category_id: CategoryId,
    limit_amount: f64,
    month: u8,
    year: i32,
    connection: &Connection,
) -> Result<Budget, Error> {
    if limit_amount <= 0.0 {
        return Err(Error::InvalidAmount);
    }

    if !(1..=12).contains(&month) {
        return Err(Error::InvalidBudgetMonth(month));
    }

    connection
        .execute(
            "INSERT INTO budget (category_id, limit_amount, month, year) VALUES (?1, ?2, ?3, ?4)",
            (category_id, limit_amount, month, year),
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::InvalidCategory(Some(category_id)),
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                },
                _,
            ) => Error::DuplicateBudget,
            error => error.into(),
        })?;

    Ok(Budget {
        id: connection.last_insert_rowid(),
        category_id,
        limit_amount,
        month,
        year,
    })
}

/// Delete a budget from the database.
///
/// # Errors
/// This function will return an [Error::DeleteMissingBudget] if the budget
/// does not exist, or an error if there is an SQL error.
pub fn delete_budget(budget_id: BudgetId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM budget WHERE id = ?1", [budget_id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingBudget);
    }

    Ok(())
}

/// Retrieve all budgets joined with their category names, newest month first.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn get_all_budgets(connection: &Connection) -> Result<Vec<(Budget, String)>, Error> {
    connection
        .prepare(
            "SELECT b.id, b.category_id, b.limit_amount, b.month, b.year, c.name
             FROM budget b
             JOIN category c ON c.id = b.category_id
             ORDER BY b.year DESC, b.month DESC, c.name ASC",
        )?
        .query_map([], map_budget_with_name_row)?
        .map(|maybe_row| maybe_row.map_err(|error| error.into()))
        .collect()
}

/// Retrieve the budgets for one calendar month, joined with their category
/// names.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn get_budgets_for_month(
    month: u8,
    year: i32,
    connection: &Connection,
) -> Result<Vec<(Budget, String)>, Error> {
    connection
        .prepare(
            "SELECT b.id, b.category_id, b.limit_amount, b.month, b.year, c.name
             FROM budget b
             JOIN category c ON c.id = b.category_id
             WHERE b.month = :month AND b.year = :year
             ORDER BY c.name ASC",
        )?
        .query_map(
            &[(":month", &(month as i64)), (":year", &(year as i64))],
            map_budget_with_name_row,
        )?
        .map(|maybe_row| maybe_row.map_err(|error| error.into()))
        .collect()
}

/// Compute how much of the budget's limit has been spent.
///
/// Sums the expenses filed under the budget's category whose date falls in
/// the budget's month.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn budget_usage(budget: &Budget, connection: &Connection) -> Result<BudgetUsage, Error> {
    let (first, last) = month_bounds(budget.year, budget.month)?;

    let spent: f64 = connection
        .prepare(
            "SELECT COALESCE(SUM(amount), 0) FROM \"transaction\"
             WHERE kind = 'pengeluaran' AND category_id = :category_id
               AND date >= :start AND date <= :end",
        )?
        .query_row(
            rusqlite::named_params! {
                ":category_id": budget.category_id,
                ":start": first,
                ":end": last,
            },
            |row| row.get(0),
        )?;

    Ok(BudgetUsage {
        spent,
        percentage: spent / budget.limit_amount * 100.0,
    })
}

/// Create the budget table in the database.
pub fn create_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS budget (
            id INTEGER PRIMARY KEY,
            category_id INTEGER NOT NULL,
            limit_amount REAL NOT NULL,
            month INTEGER NOT NULL CHECK (month BETWEEN 1 AND 12),
            year INTEGER NOT NULL,
            UNIQUE(category_id, month, year),
            FOREIGN KEY(category_id) REFERENCES category(id) ON DELETE CASCADE
        )",
        (),
    )?;

    Ok(())
}

fn map_budget_with_name_row(row: &Row) -> Result<(Budget, String), rusqlite::Error> {
    let budget = Budget {
        id: row.get(0)?,
        category_id: row.get(1)?,
        limit_amount: row.get(2)?,
        month: row.get(3)?,
        year: row.get(4)?,
    };
    let category_name: String = row.get(5)?;

    Ok((budget, category_name))
}

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// The state needed for the budget page and endpoints.
#[derive(Debug, Clone)]
pub struct BudgetState {
    /// The database connection for managing budgets.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Jakarta".
    pub local_timezone: String,
}

impl FromRef<AppState> for BudgetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The form data for creating a budget.
#[derive(Debug, Serialize, Deserialize)]
pub struct BudgetFormData {
    /// The expense category the cap applies to.
    pub category_id: CategoryId,
    /// The spending cap in Rupiah.
    pub limit_amount: f64,
    /// The calendar month, 1 to 12.
    pub month: u8,
    /// The calendar year.
    pub year: i32,
}

/// Route handler for the budget listing page.
pub async fn get_budgets_page(State(state): State<BudgetState>) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let budgets = get_all_budgets(&connection)?;

    let mut budgets_with_usage = Vec::with_capacity(budgets.len());
    for (budget, category_name) in budgets {
        let usage = budget_usage(&budget, &connection)?;
        budgets_with_usage.push((budget, category_name, usage));
    }

    let categories = get_categories_by_kind(CategoryKind::Expense, &connection)?;
    let today = today_in(&state.local_timezone);

    Ok(budgets_view(&budgets_with_usage, &categories, today).into_response())
}

/// A route handler for creating a budget.
pub async fn create_budget_endpoint(
    State(state): State<BudgetState>,
    Form(form): Form<BudgetFormData>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_budget(
        form.category_id,
        form.limit_amount,
        form.month,
        form.year,
        &connection,
    ) {
        Ok(_) => (
            HxRedirect(endpoints::BUDGETS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a budget: {error}");
            error.into_alert_response()
        }
    }
}

/// A route handler for deleting a budget.
pub async fn delete_budget_endpoint(
    Path(budget_id): Path<BudgetId>,
    State(state): State<BudgetState>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_budget(budget_id, &connection) {
        Ok(()) => Alert::SuccessSimple {
            message: "Budget berhasil dihapus".to_owned(),
        }
        .into_response(),
        Err(Error::DeleteMissingBudget) => Error::DeleteMissingBudget.into_alert_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while deleting budget {budget_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

// ============================================================================
// VIEWS
// ============================================================================

const MONTH_NAMES: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

fn budget_card_view(budget: &Budget, category_name: &str, usage: BudgetUsage) -> Markup {
    let month_name = MONTH_NAMES
        .get(budget.month as usize - 1)
        .copied()
        .unwrap_or("?");
    let bar_width = usage.percentage.clamp(0.0, 100.0);
    let over_threshold = usage.percentage >= BUDGET_WARNING_PERCENTAGE;
    let bar_style = if over_threshold {
        "bg-red-600 h-2 rounded-full"
    } else {
        "bg-blue-600 h-2 rounded-full"
    };

    html! {
        div class=(CARD_STYLE)
        {
            div class="flex justify-between items-start mb-2"
            {
                div
                {
                    h4 class="font-semibold" { (category_name) }
                    p class="text-sm text-gray-600 dark:text-gray-400"
                    {
                        (month_name) " " (budget.year)
                    }
                }

                button
                    hx-delete=(endpoints::format_endpoint(endpoints::BUDGET, budget.id))
                    hx-target="closest div.budget-card"
                    hx-confirm="Yakin ingin menghapus budget ini?"
                    class=(BUTTON_DELETE_STYLE)
                {
                    "Hapus"
                }
            }

            div class="mb-2"
            {
                div class="flex justify-between text-sm mb-1"
                {
                    span { (rupiah(usage.spent)) " / " (rupiah(budget.limit_amount)) }
                    span { (format!("{:.0}%", usage.percentage)) }
                }

                div class="w-full bg-gray-200 dark:bg-gray-700 rounded-full h-2"
                {
                    div class=(bar_style) style=(format!("width: {bar_width}%")) {}
                }
            }

            @if over_threshold {
                p class="text-sm text-red-600 font-medium"
                {
                    "Budget hampir habis!"
                }
            }
        }
    }
}

fn budgets_view(
    budgets_with_usage: &[(Budget, String, BudgetUsage)],
    categories: &[Category],
    today: Date,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::BUDGETS_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class="flex flex-col px-6 py-8 mx-auto max-w-screen-md text-gray-900 dark:text-white"
        {
            h1 class="text-xl font-bold mb-4" { "Budget Bulanan" }

            @if budgets_with_usage.is_empty() {
                p class="text-gray-500 dark:text-gray-400 text-center py-8"
                {
                    "Belum ada budget. Tambahkan budget untuk kategori pengeluaran di bawah."
                }
            } @else {
                div class="space-y-4 mb-8"
                {
                    @for (budget, category_name, usage) in budgets_with_usage {
                        div class="budget-card" { (budget_card_view(budget, category_name, *usage)) }
                    }
                }
            }

            h2 class="text-lg font-semibold mb-2" { "Tambah Budget Baru" }

            form
                hx-post=(endpoints::BUDGETS_API)
                hx-target-error="#alert-container"
                class="w-full max-w-md space-y-4"
            {
                div
                {
                    label for="category_id" class=(FORM_LABEL_STYLE) { "Kategori" }

                    select id="category_id" name="category_id" required class=(FORM_SELECT_STYLE)
                    {
                        @for category in categories {
                            option value=(category.id) { (category.name) }
                        }
                    }
                }

                div
                {
                    label for="limit_amount" class=(FORM_LABEL_STYLE) { "Limit (Rp)" }

                    input
                        id="limit_amount"
                        type="number"
                        name="limit_amount"
                        min="1"
                        step="any"
                        placeholder="1000000"
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="month" class=(FORM_LABEL_STYLE) { "Bulan" }

                    select id="month" name="month" class=(FORM_SELECT_STYLE)
                    {
                        @for (index, name) in MONTH_NAMES.iter().enumerate() {
                            option
                                value=((index + 1))
                                selected[(index + 1) as u8 == u8::from(today.month())]
                            {
                                (name)
                            }
                        }
                    }
                }

                div
                {
                    label for="year" class=(FORM_LABEL_STYLE) { "Tahun" }

                    input
                        id="year"
                        type="number"
                        name="year"
                        value=(today.year())
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Tambah Budget" }
            }
        }
    };

    base("Budget", &[], &content)
}

// ============================================================================
// TESTS
// ============================================================================


#[cfg(test)]
mod month_bounds_tests {
    use time::macros::date;

    use super::month_bounds;

    #[test]
    fn bounds_cover_whole_month() {
        let (first, last) = month_bounds(2025, 10).unwrap();

        assert_eq!(first, date!(2025 - 10 - 01));
        assert_eq!(last, date!(2025 - 10 - 31));
    }

    #[test]
    fn handles_leap_february() {
        let (_, last) = month_bounds(2024, 2).unwrap();

        assert_eq!(last, date!(2024 - 02 - 29));
    }
}
