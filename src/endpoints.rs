//! The API endpoint URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/debts/{debt_id}', use
//! [format_endpoint].

/// The root route which redirects to the dashboard.
pub const ROOT: &str = "/";
/// The landing page with summary cards, charts and reminders.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The page for listing income transactions.
pub const INCOME_VIEW: &str = "/pemasukan";
/// The page for listing expense transactions.
pub const EXPENSES_VIEW: &str = "/pengeluaran";
/// The page for creating a new transaction.
pub const NEW_TRANSACTION_VIEW: &str = "/transactions/new";
/// The page for editing an existing transaction.
pub const EDIT_TRANSACTION_VIEW: &str = "/transactions/{transaction_id}/edit";
/// The page for listing savings goals and the contribution history.
pub const GOALS_VIEW: &str = "/target";
/// The page for editing an existing goal.
pub const EDIT_GOAL_VIEW: &str = "/target/{goal_id}/edit";
/// The page for listing debts and their payment progress.
pub const DEBTS_VIEW: &str = "/hutang";
/// The page for editing an existing debt.
pub const EDIT_DEBT_VIEW: &str = "/hutang/{debt_id}/edit";
/// The page for listing and managing categories.
pub const CATEGORIES_VIEW: &str = "/kategori";
/// The page for editing an existing category.
pub const EDIT_CATEGORY_VIEW: &str = "/kategori/{category_id}/edit";
/// The page for listing monthly budgets and their usage.
pub const BUDGETS_VIEW: &str = "/budget";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route to create a transaction.
pub const TRANSACTIONS_API: &str = "/api/transactions";
/// The route to update or delete a single transaction.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}";
/// The route to create a goal.
pub const GOALS_API: &str = "/api/goals";
/// The route to update or delete a single goal.
pub const GOAL: &str = "/api/goals/{goal_id}";
/// The route to record a contribution towards a goal.
pub const GOAL_SAVINGS: &str = "/api/goals/{goal_id}/savings";
/// The route to update or delete a single contribution.
pub const SAVING: &str = "/api/savings/{saving_id}";
/// The route to create a debt.
pub const DEBTS_API: &str = "/api/debts";
/// The route to update or delete a single debt.
pub const DEBT: &str = "/api/debts/{debt_id}";
/// The route to record a payment towards a debt.
pub const DEBT_PAYMENTS: &str = "/api/debts/{debt_id}/payments";
/// The route to delete a single debt payment.
pub const PAYMENT: &str = "/api/payments/{payment_id}";
/// The route to create a category.
pub const CATEGORIES_API: &str = "/api/categories";
/// The route to update or delete a single category.
pub const CATEGORY: &str = "/api/categories/{category_id}";
/// The route to create a budget.
pub const BUDGETS_API: &str = "/api/budgets";
/// The route to delete a single budget.
pub const BUDGET: &str = "/api/budgets/{budget_id}";
/// The route to download transactions as CSV.
pub const EXPORT_TRANSACTIONS: &str = "/export/transactions.csv";
/// The route to download the income/expense summary as CSV.
pub const EXPORT_SUMMARY: &str = "/export/summary.csv";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/api/debts/{debt_id}', '{debt_id}' is
/// the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let Some(param_len) = endpoint_path[param_start..].find('}') else {
        return endpoint_path.to_owned();
    };

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_start + param_len + 1..]
    )
}
