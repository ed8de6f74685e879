//! Defines the endpoint for creating a new savings goal.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use serde::Deserialize;
use time::Date;

use crate::{AppState, Error, endpoints, goal::core::create_goal};

/// The state needed to create a goal.
#[derive(Debug, Clone)]
pub struct CreateGoalState {
    /// The database connection for managing goals.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateGoalState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for creating or editing a goal.
#[derive(Debug, Deserialize)]
pub struct GoalForm {
    /// The name of the goal.
    pub name: String,
    /// The amount of money to save up, in Rupiah.
    pub target_amount: f64,
    /// The optional date to reach the target by.
    #[serde(default)]
    pub deadline: Option<Date>,
}

/// A route handler for creating a new goal, redirects to the goals page on
/// success.
pub async fn create_goal_endpoint(
    State(state): State<CreateGoalState>,
    Form(form): Form<GoalForm>,
) -> impl IntoResponse {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_goal(&form.name, form.target_amount, form.deadline, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::GOALS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error @ (Error::EmptyGoalName | Error::InvalidAmount)) => error.into_alert_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a goal: {error}");
            error.into_alert_response()
        }
    }
}
