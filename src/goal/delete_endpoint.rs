//! Defines the endpoint for deleting a savings goal.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{AppState, Error, alert::Alert, goal::GoalId};

use super::core::delete_goal;

/// The state needed to delete a goal.
#[derive(Debug, Clone)]
pub struct DeleteGoalState {
    /// The database connection for managing goals.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteGoalState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting a goal along with its contribution history.
pub async fn delete_goal_endpoint(
    Path(goal_id): Path<GoalId>,
    State(state): State<DeleteGoalState>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_goal(goal_id, &connection) {
        Ok(()) => Alert::SuccessSimple {
            message: "Target berhasil dihapus".to_owned(),
        }
        .into_response(),
        Err(Error::DeleteMissingGoal) => Error::DeleteMissingGoal.into_alert_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while deleting goal {goal_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::{Path, State};
    use rusqlite::Connection;

    use crate::{
        db::initialize,
        goal::core::{create_goal, get_all_goals},
    };

    use super::{DeleteGoalState, delete_goal_endpoint};

    #[tokio::test]
    async fn deletes_goal() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let goal = create_goal("Liburan", 500_000.0, None, &conn).unwrap();
        let state = DeleteGoalState {
            db_connection: Arc::new(Mutex::new(conn)),
        };

        let response = delete_goal_endpoint(Path(goal.id), State(state.clone())).await;

        assert_eq!(response.status(), axum::http::StatusCode::OK);
        let connection = state.db_connection.lock().unwrap();
        assert!(get_all_goals(&connection).unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_goal_returns_not_found() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let state = DeleteGoalState {
            db_connection: Arc::new(Mutex::new(conn)),
        };

        let response = delete_goal_endpoint(Path(999), State(state)).await;

        assert_eq!(response.status(), axum::http::StatusCode::NOT_FOUND);
    }
}
