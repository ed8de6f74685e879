//! Defines the endpoints for recording, editing and deleting contributions
//! towards a savings goal.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error,
    alert::Alert,
    endpoints,
    goal::{
        GoalId,
        core::{SavingId, contribute, delete_contribution, edit_contribution},
    },
    transaction::FundSource,
};

/// The state needed for the contribution endpoints.
#[derive(Debug, Clone)]
pub struct ContributionState {
    /// The database connection for the contribution ledger.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ContributionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for recording a contribution.
#[derive(Debug, Deserialize)]
pub struct ContributionForm {
    /// The contributed amount in Rupiah.
    pub amount: f64,
    /// The source of funds, "Cash" or "Debit".
    pub source: String,
    /// A short note for the contribution.
    #[serde(default)]
    pub note: String,
    /// When the contribution was made.
    pub date: Date,
}

/// The form data for editing a contribution.
#[derive(Debug, Deserialize)]
pub struct EditContributionForm {
    /// The corrected amount in Rupiah.
    pub amount: f64,
    /// The corrected note.
    #[serde(default)]
    pub note: String,
}

/// A route handler for recording a contribution towards a goal, redirects to
/// the goals page on success.
pub async fn contribute_endpoint(
    Path(goal_id): Path<GoalId>,
    State(state): State<ContributionState>,
    Form(form): Form<ContributionForm>,
) -> Response {
    let source = match form.source.parse::<FundSource>() {
        Ok(source) => source,
        Err(error) => return error.into_alert_response(),
    };

    let mut connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match contribute(
        goal_id,
        form.amount,
        source,
        &form.note,
        form.date,
        &mut connection,
    ) {
        Ok(_) => (
            HxRedirect(endpoints::GOALS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error @ (Error::InvalidAmount | Error::NotFound)) => error.into_alert_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while contributing to goal {goal_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

/// A route handler for correcting a contribution's amount and note.
///
/// The amount delta is applied to the owning goal's progress, clamped at zero.
pub async fn edit_contribution_endpoint(
    Path(saving_id): Path<SavingId>,
    State(state): State<ContributionState>,
    Form(form): Form<EditContributionForm>,
) -> Response {
    let mut connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match edit_contribution(saving_id, form.amount, &form.note, &mut connection) {
        Ok(()) => (
            HxRedirect(endpoints::GOALS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error @ (Error::InvalidAmount | Error::UpdateMissingSaving)) => {
            error.into_alert_response()
        }
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while editing contribution {saving_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

/// A route handler for deleting a contribution, subtracting its amount from
/// the owning goal's progress.
pub async fn delete_contribution_endpoint(
    Path(saving_id): Path<SavingId>,
    State(state): State<ContributionState>,
) -> Response {
    let mut connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_contribution(saving_id, &mut connection) {
        Ok(()) => Alert::SuccessSimple {
            message: "Riwayat tabungan berhasil dihapus".to_owned(),
        }
        .into_response(),
        Err(Error::DeleteMissingSaving) => Error::DeleteMissingSaving.into_alert_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while deleting contribution {saving_id}: {error}"
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
        goal::core::{contribute, create_goal, get_goal},
        transaction::FundSource,
    };

    use super::{
        ContributionForm, ContributionState, EditContributionForm, contribute_endpoint,
        delete_contribution_endpoint, edit_contribution_endpoint,
    };

    fn get_test_state() -> ContributionState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        ContributionState {
            db_connection: Arc::new(Mutex::new(conn)),
        }
    }

    #[tokio::test]
    async fn contribute_updates_goal_progress() {
        let state = get_test_state();
        let goal = {
            let connection = state.db_connection.lock().unwrap();
            create_goal("Liburan", 500_000.0, None, &connection).unwrap()
        };

        let form = ContributionForm {
            amount: 50_000.0,
            source: "Cash".to_owned(),
            note: String::new(),
            date: date!(2025 - 10 - 01),
        };

        let response = contribute_endpoint(Path(goal.id), State(state.clone()), Form(form)).await;

        assert!(response.headers().get(HX_REDIRECT).is_some());
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(get_goal(goal.id, &connection).unwrap().progress, 50_000.0);
    }

    #[tokio::test]
    async fn edit_contribution_applies_delta() {
        let state = get_test_state();
        let (goal, saving) = {
            let mut connection = state.db_connection.lock().unwrap();
            let goal = create_goal("Liburan", 500_000.0, None, &connection).unwrap();
            let saving = contribute(
                goal.id,
                50_000.0,
                FundSource::Cash,
                "",
                date!(2025 - 10 - 01),
                &mut connection,
            )
            .unwrap();
            (goal, saving)
        };

        let form = EditContributionForm {
            amount: 20_000.0,
            note: "koreksi".to_owned(),
        };

        edit_contribution_endpoint(Path(saving.id), State(state.clone()), Form(form)).await;

        let connection = state.db_connection.lock().unwrap();
        assert_eq!(get_goal(goal.id, &connection).unwrap().progress, 20_000.0);
    }

    #[tokio::test]
    async fn delete_contribution_reverts_progress() {
        let state = get_test_state();
        let (goal, saving) = {
            let mut connection = state.db_connection.lock().unwrap();
            let goal = create_goal("Liburan", 500_000.0, None, &connection).unwrap();
            let saving = contribute(
                goal.id,
                50_000.0,
                FundSource::Cash,
                "",
                date!(2025 - 10 - 01),
                &mut connection,
            )
            .unwrap();
            (goal, saving)
        };

        delete_contribution_endpoint(Path(saving.id), State(state.clone())).await;

        let connection = state.db_connection.lock().unwrap();
        assert_eq!(get_goal(goal.id, &connection).unwrap().progress, 0.0);
    }

    #[tokio::test]
    async fn contribute_rejects_unknown_source() {
        let state = get_test_state();
        let goal = {
            let connection = state.db_connection.lock().unwrap();
            create_goal("Liburan", 500_000.0, None, &connection).unwrap()
        };

        let form = ContributionForm {
            amount: 50_000.0,
            source: "Transfer".to_owned(),
            note: String::new(),
            date: date!(2025 - 10 - 01),
        };

        let response = contribute_endpoint(Path(goal.id), State(state.clone()), Form(form)).await;

        assert!(response.headers().get(HX_REDIRECT).is_none());
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(get_goal(goal.id, &connection).unwrap().progress, 0.0);
    }
}
