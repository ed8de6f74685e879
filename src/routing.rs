//! Application router configuration.

use axum::{
    Router, middleware,
    response::Redirect,
    routing::{delete, get, post, put},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    budget::{create_budget_endpoint, delete_budget_endpoint, get_budgets_page},
    category::{
        create_category_endpoint, delete_category_endpoint, get_categories_page,
        get_edit_category_page, update_category_endpoint,
    },
    dashboard::get_dashboard_page,
    debt::{
        create_debt_endpoint, delete_debt_endpoint, delete_payment_endpoint, edit_debt_endpoint,
        edit_payment_endpoint, get_debts_page, get_edit_debt_page, record_payment_endpoint,
    },
    endpoints,
    export::{export_summary_csv, export_transactions_csv},
    goal::{
        contribute_endpoint, create_goal_endpoint, delete_contribution_endpoint,
        delete_goal_endpoint, edit_contribution_endpoint, edit_goal_endpoint, get_edit_goal_page,
        get_goals_page,
    },
    logging::logging_middleware,
    not_found::get_404_not_found,
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, edit_transaction_endpoint,
        get_edit_transaction_page, get_expenses_page, get_income_page, get_new_transaction_page,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let page_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(endpoints::INCOME_VIEW, get(get_income_page))
        .route(endpoints::EXPENSES_VIEW, get(get_expenses_page))
        .route(endpoints::NEW_TRANSACTION_VIEW, get(get_new_transaction_page))
        .route(endpoints::EDIT_TRANSACTION_VIEW, get(get_edit_transaction_page))
        .route(endpoints::GOALS_VIEW, get(get_goals_page))
        .route(endpoints::EDIT_GOAL_VIEW, get(get_edit_goal_page))
        .route(endpoints::DEBTS_VIEW, get(get_debts_page))
        .route(endpoints::EDIT_DEBT_VIEW, get(get_edit_debt_page))
        .route(endpoints::CATEGORIES_VIEW, get(get_categories_page))
        .route(endpoints::EDIT_CATEGORY_VIEW, get(get_edit_category_page))
        .route(endpoints::BUDGETS_VIEW, get(get_budgets_page))
        .route(endpoints::EXPORT_TRANSACTIONS, get(export_transactions_csv))
        .route(endpoints::EXPORT_SUMMARY, get(export_summary_csv));

    let api_routes = Router::new()
        .route(endpoints::TRANSACTIONS_API, post(create_transaction_endpoint))
        .route(
            endpoints::TRANSACTION,
            put(edit_transaction_endpoint).delete(delete_transaction_endpoint),
        )
        .route(endpoints::GOALS_API, post(create_goal_endpoint))
        .route(
            endpoints::GOAL,
            put(edit_goal_endpoint).delete(delete_goal_endpoint),
        )
        .route(endpoints::GOAL_SAVINGS, post(contribute_endpoint))
        .route(
            endpoints::SAVING,
            put(edit_contribution_endpoint).delete(delete_contribution_endpoint),
        )
        .route(endpoints::DEBTS_API, post(create_debt_endpoint))
        .route(
            endpoints::DEBT,
            put(edit_debt_endpoint).delete(delete_debt_endpoint),
        )
        .route(endpoints::DEBT_PAYMENTS, post(record_payment_endpoint))
        .route(
            endpoints::PAYMENT,
            put(edit_payment_endpoint).delete(delete_payment_endpoint),
        )
        .route(endpoints::CATEGORIES_API, post(create_category_endpoint))
        .route(
            endpoints::CATEGORY,
            put(update_category_endpoint).delete(delete_category_endpoint),
        )
        .route(endpoints::BUDGETS_API, post(create_budget_endpoint))
        .route(endpoints::BUDGET, delete(delete_budget_endpoint));

    page_routes
        .merge(api_routes)
        .layer(middleware::from_fn(logging_middleware))
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the dashboard page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::DASHBOARD_VIEW)
}

#[cfg(test)]
mod router_tests {
    use axum_test::TestServer;
    use rusqlite::Connection;

    use crate::{AppState, build_router};

    fn get_test_server() -> TestServer {
        let connection = Connection::open_in_memory().unwrap();
        let state = AppState::new(connection, "Etc/UTC").unwrap();

        TestServer::new(build_router(state))
    }

    #[tokio::test]
    async fn root_redirects_to_dashboard() {
        let server = get_test_server();

        let response = server.get("/").await;

        response.assert_status(axum::http::StatusCode::SEE_OTHER);
        assert_eq!(response.header("location"), "/dashboard");
    }

    #[tokio::test]
    async fn dashboard_serves_html() {
        let server = get_test_server();

        let response = server.get("/dashboard").await;

        response.assert_status_ok();
        assert!(response.text().contains("MoneyTracker"));
    }

    #[tokio::test]
    async fn unknown_path_returns_404_page() {
        let server = get_test_server();

        let response = server.get("/does-not-exist").await;

        response.assert_status_not_found();
        assert!(response.text().contains("404"));
    }

    #[tokio::test]
    async fn create_and_list_transaction_through_router() {
        let server = get_test_server();

        let response = server
            .post("/api/transactions")
            .form(&[
                ("kind", "pemasukan"),
                ("amount", "125000"),
                ("date", "2025-10-05"),
                ("memo", "Gaji"),
                ("source", "Cash"),
            ])
            .await;
        response.assert_status(axum::http::StatusCode::SEE_OTHER);

        let listing = server.get("/pemasukan").await;
        listing.assert_status_ok();
        assert!(listing.text().contains("Rp 125.000"));
    }
}
