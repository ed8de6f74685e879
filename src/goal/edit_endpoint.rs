//! Defines the edit goal page and the endpoint that applies the edit.

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
    AppState, Error, endpoints,
    goal::{
        GoalId,
        core::{get_goal, update_goal},
        create_endpoint::GoalForm,
    },
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
    },
    navigation::NavBar,
};

/// The state needed to show the edit page and update a goal.
#[derive(Debug, Clone)]
pub struct EditGoalState {
    /// The database connection for managing goals.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditGoalState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Route handler for the page with the form to edit an existing goal.
pub async fn get_edit_goal_page(
    Path(goal_id): Path<GoalId>,
    State(state): State<EditGoalState>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let goal = get_goal(goal_id, &connection)?;
    let update_endpoint = endpoints::format_endpoint(endpoints::GOAL, goal_id);
    let nav_bar = NavBar::new(endpoints::GOALS_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold my-4" { "Edit Target" }

            form
                hx-put=(update_endpoint)
                hx-target-error="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                div
                {
                    label for="name" class=(FORM_LABEL_STYLE) { "Nama Target" }

                    input
                        id="name"
                        type="text"
                        name="name"
                        value=(goal.name)
                        required
                        autofocus
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
                        value=(goal.target_amount)
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
                        value=[goal.deadline]
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Update Target" }
            }
        }
    };

    Ok(base("Edit Target", &[], &content).into_response())
}

/// A route handler for updating a goal, redirects to the goals page on
/// success. The goal's progress is left untouched.
pub async fn edit_goal_endpoint(
    Path(goal_id): Path<GoalId>,
    State(state): State<EditGoalState>,
    Form(form): Form<GoalForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match update_goal(
        goal_id,
        &form.name,
        form.target_amount,
        form.deadline,
        &connection,
    ) {
        Ok(()) => (
            HxRedirect(endpoints::GOALS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error @ (Error::EmptyGoalName | Error::InvalidAmount | Error::UpdateMissingGoal)) => {
            error.into_alert_response()
        }
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while updating goal {goal_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::{Path, State};
    use axum_extra::extract::Form;
    use axum_htmx::HX_REDIRECT;
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        db::initialize,
        goal::core::{create_goal, get_goal},
    };

    use super::{EditGoalState, GoalForm, edit_goal_endpoint};

    #[tokio::test]
    async fn updates_goal_fields() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let goal = create_goal("Liburan", 500_000.0, None, &conn).unwrap();
        let state = EditGoalState {
            db_connection: Arc::new(Mutex::new(conn)),
        };

        let form = GoalForm {
            name: "Liburan Bali".to_owned(),
            target_amount: 750_000.0,
            deadline: Some(date!(2026 - 06 - 01)),
        };

        let response = edit_goal_endpoint(Path(goal.id), State(state.clone()), Form(form)).await;

        assert!(response.headers().get(HX_REDIRECT).is_some());
        let connection = state.db_connection.lock().unwrap();
        let updated = get_goal(goal.id, &connection).unwrap();
        assert_eq!(updated.name, "Liburan Bali");
        assert_eq!(updated.deadline, Some(date!(2026 - 06 - 01)));
    }
}
