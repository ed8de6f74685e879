//! MoneyTracker is a web app for tracking personal income, expenses, savings
//! goals and debts, with amounts recorded in Indonesian Rupiah.
//!
//! This library provides a REST API that directly serves HTML pages.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod alert;
mod app_state;
mod budget;
mod category;
mod dashboard;
mod db;
mod debt;
mod endpoints;
mod export;
mod goal;
mod html;
mod internal_server_error;
mod logging;
mod navigation;
mod not_found;
mod notification;
mod routing;
mod timezone;
mod transaction;

pub use app_state::AppState;
pub use db::initialize as initialize_db;
pub use logging::logging_middleware;
pub use routing::build_router;

use crate::{
    alert::Alert, category::CategoryId, internal_server_error::InternalServerError,
    not_found::get_404_not_found_response,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A zero or negative amount was used for a transaction, payment,
    /// contribution or limit.
    ///
    /// Money amounts are always positive; the direction of the money flow is
    /// carried by the record's kind.
    #[error("amount must be greater than zero")]
    InvalidAmount,

    /// An empty string was used to create a category name.
    #[error("Category name cannot be empty")]
    EmptyCategoryName,

    /// An empty string was used for a debt's creditor name.
    #[error("Creditor name cannot be empty")]
    EmptyCreditorName,

    /// An empty string was used for a savings goal's name.
    #[error("Goal name cannot be empty")]
    EmptyGoalName,

    /// A date string from a form could not be parsed as a calendar date.
    #[error("\"{0}\" is not a valid date (expected YYYY-MM-DD)")]
    InvalidDate(String),

    /// A source-of-funds string did not match "Cash" or "Debit".
    #[error("\"{0}\" is not a valid source of funds")]
    InvalidSource(String),

    /// A bank/e-wallet string did not match one of the known banks.
    #[error("\"{0}\" is not a known bank or e-wallet")]
    InvalidBank(String),

    /// A category kind string did not match "pemasukan" or "pengeluaran".
    #[error("\"{0}\" is not a valid category kind")]
    InvalidCategoryKind(String),

    /// A debt status string did not match "aktif" or "lunas".
    #[error("\"{0}\" is not a valid debt status")]
    InvalidDebtStatus(String),

    /// The category ID used to create a record did not match a valid category.
    #[error("the category ID does not refer to a valid category")]
    InvalidCategory(Option<CategoryId>),

    /// An installment day outside 1..=31 was given for a debt.
    #[error("{0} is not a valid day of the month for an installment")]
    InvalidInstallmentDay(u8),

    /// A month outside 1..=12 was given for a budget.
    #[error("{0} is not a valid month for a budget")]
    InvalidBudgetMonth(u8),

    /// The specified category name already exists for that kind.
    #[error("the category \"{0}\" already exists")]
    DuplicateCategoryName(String),

    /// A budget already exists for the category and month.
    #[error("a budget for this category and month already exists")]
    DuplicateBudget,

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// An error occurred while writing CSV rows for an export.
    #[error("could not write CSV export: {0}")]
    CsvError(String),

    /// Tried to update a transaction that does not exist
    #[error("tried to update a transaction that is not in the database")]
    UpdateMissingTransaction,

    /// Tried to delete a transaction that does not exist
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// Tried to update a category that does not exist
    #[error("tried to update a category that is not in the database")]
    UpdateMissingCategory,

    /// Tried to delete a category that does not exist
    #[error("tried to delete a category that is not in the database")]
    DeleteMissingCategory,

    /// Tried to update a goal that does not exist
    #[error("tried to update a goal that is not in the database")]
    UpdateMissingGoal,

    /// Tried to delete a goal that does not exist
    #[error("tried to delete a goal that is not in the database")]
    DeleteMissingGoal,

    /// Tried to update a savings contribution that does not exist
    #[error("tried to update a contribution that is not in the database")]
    UpdateMissingSaving,

    /// Tried to delete a savings contribution that does not exist
    #[error("tried to delete a contribution that is not in the database")]
    DeleteMissingSaving,

    /// Tried to update a debt that does not exist
    #[error("tried to update a debt that is not in the database")]
    UpdateMissingDebt,

    /// Tried to delete a debt that does not exist
    #[error("tried to delete a debt that is not in the database")]
    DeleteMissingDebt,

    /// Tried to delete a debt payment that does not exist
    #[error("tried to delete a payment that is not in the database")]
    DeleteMissingPayment,

    /// Tried to delete a budget that does not exist
    #[error("tried to delete a budget that is not in the database")]
    DeleteMissingBudget,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to a valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::DatabaseLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// Convert the error into an HTTP response with an HTML alert.
    pub fn into_alert_response(self) -> Response {
        let (status_code, alert) = match self {
            Error::InvalidAmount
            | Error::EmptyCategoryName
            | Error::EmptyCreditorName
            | Error::EmptyGoalName => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid input".to_owned(),
                    details: self.to_string(),
                },
            ),
            Error::InvalidDate(date) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid date".to_owned(),
                    details: format!("\"{date}\" could not be read as a date. Use YYYY-MM-DD."),
                },
            ),
            Error::InvalidCategory(category_id) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid category".to_owned(),
                    details: format!("Could not find a category with the ID {category_id:?}"),
                },
            ),
            Error::DuplicateCategoryName(name) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Duplicate category".to_owned(),
                    details: format!(
                        "The category {name} already exists. \
                        Choose a different name, or edit or delete the existing category.",
                    ),
                },
            ),
            Error::DuplicateBudget => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Duplicate budget".to_owned(),
                    details: "A budget for this category and month already exists. \
                        Edit or delete the existing budget instead."
                        .to_owned(),
                },
            ),
            Error::UpdateMissingTransaction => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not update transaction".to_owned(),
                    details: "The transaction could not be found.".to_owned(),
                },
            ),
            Error::DeleteMissingTransaction => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not delete transaction".to_owned(),
                    details: "The transaction could not be found. \
                    Try refreshing the page to see if the transaction has already been deleted."
                        .to_owned(),
                },
            ),
            Error::UpdateMissingCategory => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not update category".to_owned(),
                    details: "The category could not be found.".to_owned(),
                },
            ),
            Error::DeleteMissingCategory => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not delete category".to_owned(),
                    details: "The category could not be found. \
                    Try refreshing the page to see if the category has already been deleted."
                        .to_owned(),
                },
            ),
            Error::UpdateMissingGoal => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not update goal".to_owned(),
                    details: "The goal could not be found.".to_owned(),
                },
            ),
            Error::DeleteMissingGoal => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not delete goal".to_owned(),
                    details: "The goal could not be found. \
                    Try refreshing the page to see if the goal has already been deleted."
                        .to_owned(),
                },
            ),
            Error::UpdateMissingSaving => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not update contribution".to_owned(),
                    details: "The contribution could not be found.".to_owned(),
                },
            ),
            Error::DeleteMissingSaving => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not delete contribution".to_owned(),
                    details: "The contribution could not be found. \
                    Try refreshing the page to see if it has already been deleted."
                        .to_owned(),
                },
            ),
            Error::UpdateMissingDebt => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not update debt".to_owned(),
                    details: "The debt could not be found.".to_owned(),
                },
            ),
            Error::DeleteMissingDebt => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not delete debt".to_owned(),
                    details: "The debt could not be found. \
                    Try refreshing the page to see if the debt has already been deleted."
                        .to_owned(),
                },
            ),
            Error::DeleteMissingPayment => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not delete payment".to_owned(),
                    details: "The payment could not be found. \
                    Try refreshing the page to see if it has already been deleted."
                        .to_owned(),
                },
            ),
            Error::DeleteMissingBudget => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not delete budget".to_owned(),
                    details: "The budget could not be found. \
                    Try refreshing the page to see if it has already been deleted."
                        .to_owned(),
                },
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Something went wrong".to_owned(),
                    details:
                        "An unexpected error occurred, check the server logs for more details."
                            .to_owned(),
                },
            ),
        };

        (status_code, alert.into_html()).into_response()
    }
}
