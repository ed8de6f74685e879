//! Alert messages for displaying success and error feedback to users.
//!
//! Alerts are swapped into the fixed `#alert-container` element via HTMX
//! out-of-band swaps, so any endpoint can surface a transient message without
//! replacing the page content.

use axum::response::{IntoResponse, Response};
use maud::{Markup, html};

const ALERT_SUCCESS_STYLE: &str = "p-4 mb-4 text-sm text-green-800 rounded-lg \
    bg-green-50 dark:bg-gray-800 dark:text-green-400";

const ALERT_ERROR_STYLE: &str = "p-4 mb-4 text-sm text-red-800 rounded-lg \
    bg-red-50 dark:bg-gray-800 dark:text-red-400";

/// A transient message shown to the user after an operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// The operation succeeded, no details needed.
    SuccessSimple {
        /// Short headline, e.g. "Category deleted successfully".
        message: String,
    },
    /// The operation failed.
    Error {
        /// Short headline, e.g. "Could not delete debt".
        message: String,
        /// Supporting detail text, e.g. what the user can do about it.
        details: String,
    },
}

impl Alert {
    /// Render the alert as markup targeting the alert container.
    pub fn into_html(self) -> Markup {
        let (style, message, details) = match self {
            Alert::SuccessSimple { message } => (ALERT_SUCCESS_STYLE, message, String::new()),
            Alert::Error { message, details } => (ALERT_ERROR_STYLE, message, details),
        };

        html! {
            div
                id="alert-container"
                hx-swap-oob="true"
                class="w-full max-w-md px-4"
                style="position: fixed; bottom: 1rem; left: 50%; transform: translateX(-50%); z-index: 9999;"
            {
                div class=(style) role="alert"
                {
                    span class="font-medium" { (message) }

                    @if !details.is_empty() {
                        " " (details)
                    }
                }
            }
        }
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        self.into_html().into_response()
    }
}
