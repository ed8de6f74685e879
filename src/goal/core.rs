//! Defines the core data models, database queries and ledger rules for
//! savings goals and their contributions.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, transaction::FundSource};

// ============================================================================
// MODELS
// ============================================================================

/// The ID of a savings goal.
pub type GoalId = i64;

/// The ID of a savings contribution.
pub type SavingId = i64;

/// A savings target, e.g. 'Dana darurat' or 'Liburan'.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    /// The ID of the goal.
    pub id: GoalId,
    /// The name of the goal.
    pub name: String,
    /// The amount of money to save up, in Rupiah.
    pub target_amount: f64,
    /// The sum of all contributions towards this goal. Never negative.
    pub progress: f64,
    /// The date the user wants to reach the target by.
    pub deadline: Option<Date>,
}

/// A single contribution towards a goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Saving {
    /// The ID of the contribution.
    pub id: SavingId,
    /// The goal this contribution belongs to.
    pub goal_id: GoalId,
    /// The contributed amount in Rupiah. Always positive.
    pub amount: f64,
    /// Where the money came from.
    pub source: FundSource,
    /// A short note, e.g. which envelope or account the money sits in.
    pub note: String,
    /// When the contribution was made.
    pub date: Date,
}

/// Total contributions split by source of funds, for the savings summary cards.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SavingsBySource {
    /// The sum of all Cash contributions.
    pub cash: f64,
    /// The sum of all Debit contributions.
    pub debit: f64,
}

/// How far along a goal is, as a percentage in `[0, 100]`.
///
/// A goal whose progress meets or exceeds the target reports exactly 100.
pub fn goal_percentage(goal: &Goal) -> f64 {
    if goal.target_amount <= 0.0 {
        return 0.0;
    }

    if goal.progress >= goal.target_amount {
        return 100.0;
    }

    (goal.progress / goal.target_amount * 100.0).clamp(0.0, 100.0)
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create a new goal with zero progress.
///
/// # Errors
/// This function will return an [Error::EmptyGoalName] if `name` is blank, an
/// [Error::InvalidAmount] if `target_amount` is not positive, or an error if
/// there is an SQL error.
pub fn create_goal(
    name: &str,
    target_amount: f64,
    deadline: Option<Date>,
    connection: &Connection,
) -> Result<Goal, Error> {
    let name = name.trim();

    if name.is_empty() {
        return Err(Error::EmptyGoalName);
    }

    if target_amount <= 0.0 {
        return Err(Error::InvalidAmount);
    }

    connection.execute(
        "INSERT INTO goal (name, target_amount, progress, deadline) VALUES (?1, ?2, 0, ?3)",
        (name, target_amount, deadline),
    )?;

    Ok(Goal {
        id: connection.last_insert_rowid(),
        name: name.to_owned(),
        target_amount,
        progress: 0.0,
        deadline,
    })
}

/// Retrieve the goal with `goal_id` from the database.
///
/// # Errors
/// This function will return an [Error::NotFound] if the goal does not exist,
/// or an error if there is an SQL error.
pub fn get_goal(goal_id: GoalId, connection: &Connection) -> Result<Goal, Error> {
    connection
        .prepare(
            "SELECT id, name, target_amount, progress, deadline FROM goal WHERE id = :id",
        )?
        .query_one(&[(":id", &goal_id)], map_goal_row)
        .map_err(|error| error.into())
}

/// Retrieve all goals, oldest first.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn get_all_goals(connection: &Connection) -> Result<Vec<Goal>, Error> {
    connection
        .prepare("SELECT id, name, target_amount, progress, deadline FROM goal ORDER BY id ASC")?
        .query_map([], map_goal_row)?
        .map(|maybe_goal| maybe_goal.map_err(|error| error.into()))
        .collect()
}

/// Update a goal's name, target and deadline. Progress is not touched: it
/// only ever changes through the contribution functions.
///
/// # Errors
/// This function will return an [Error::UpdateMissingGoal] if the goal does
/// not exist, or an error if there is an SQL error.
pub fn update_goal(
    goal_id: GoalId,
    name: &str,
    target_amount: f64,
    deadline: Option<Date>,
    connection: &Connection,
) -> Result<(), Error> {
    let name = name.trim();

    if name.is_empty() {
        return Err(Error::EmptyGoalName);
    }

    if target_amount <= 0.0 {
        return Err(Error::InvalidAmount);
    }

    let rows_affected = connection.execute(
        "UPDATE goal SET name = ?1, target_amount = ?2, deadline = ?3 WHERE id = ?4",
        (name, target_amount, deadline, goal_id),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingGoal);
    }

    Ok(())
}

/// Delete a goal and, via the cascading foreign key, its contribution history.
///
/// # Errors
/// This function will return an [Error::DeleteMissingGoal] if the goal does
/// not exist, or an error if there is an SQL error.
pub fn delete_goal(goal_id: GoalId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM goal WHERE id = ?1", [goal_id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingGoal);
    }

    Ok(())
}

/// Record a contribution towards a goal.
///
/// The contribution row and the goal's progress update are committed in a
/// single database transaction, so a failure cannot leave the contribution
/// recorded while the goal still shows the old progress.
///
/// # Errors
/// This function will return an [Error::InvalidAmount] if `amount` is not
/// positive, an [Error::NotFound] if the goal does not exist, or an error if
/// there is an SQL error.
pub fn contribute(
    goal_id: GoalId,
    amount: f64,
    source: FundSource,
    note: &str,
    date: Date,
    connection: &mut Connection,
) -> Result<Saving, Error> {
    if amount <= 0.0 {
        return Err(Error::InvalidAmount);
    }

    let tx = connection.transaction()?;

    let rows_affected = tx.execute(
        "UPDATE goal SET progress = progress + ?1 WHERE id = ?2",
        (amount, goal_id),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    tx.execute(
        "INSERT INTO goal_saving (goal_id, amount, source, note, date) VALUES (?1, ?2, ?3, ?4, ?5)",
        (goal_id, amount, source.as_str(), note, date),
    )?;
    let id = tx.last_insert_rowid();

    tx.commit()?;

    Ok(Saving {
        id,
        goal_id,
        amount,
        source,
        note: note.to_owned(),
        date,
    })
}

/// Change a contribution's amount and note, applying the amount delta to the
/// owning goal's progress.
///
/// The progress is clamped at zero: shrinking a contribution below what the
/// goal currently shows can never drive the progress negative.
///
/// # Errors
/// This function will return an [Error::InvalidAmount] if `new_amount` is not
/// positive, an [Error::UpdateMissingSaving] if the contribution does not
/// exist, or an error if there is an SQL error.
pub fn edit_contribution(
    saving_id: SavingId,
    new_amount: f64,
    new_note: &str,
    connection: &mut Connection,
) -> Result<(), Error> {
    if new_amount <= 0.0 {
        return Err(Error::InvalidAmount);
    }

    let tx = connection.transaction()?;

    let saving = get_saving(saving_id, &tx).map_err(|error| match error {
        Error::NotFound => Error::UpdateMissingSaving,
        error => error,
    })?;

    tx.execute(
        "UPDATE goal_saving SET amount = ?1, note = ?2 WHERE id = ?3",
        (new_amount, new_note, saving_id),
    )?;

    let delta = new_amount - saving.amount;
    tx.execute(
        "UPDATE goal SET progress = MAX(0, progress + ?1) WHERE id = ?2",
        (delta, saving.goal_id),
    )?;

    tx.commit()?;

    Ok(())
}

/// Delete a contribution, subtracting its amount from the owning goal's
/// progress (clamped at zero).
///
/// # Errors
/// This function will return an [Error::DeleteMissingSaving] if the
/// contribution does not exist, or an error if there is an SQL error.
pub fn delete_contribution(saving_id: SavingId, connection: &mut Connection) -> Result<(), Error> {
    let tx = connection.transaction()?;

    let saving = get_saving(saving_id, &tx).map_err(|error| match error {
        Error::NotFound => Error::DeleteMissingSaving,
        error => error,
    })?;

    tx.execute("DELETE FROM goal_saving WHERE id = ?1", [saving_id])?;

    tx.execute(
        "UPDATE goal SET progress = MAX(0, progress - ?1) WHERE id = ?2",
        (saving.amount, saving.goal_id),
    )?;

    tx.commit()?;

    Ok(())
}

/// Retrieve the contribution with `saving_id` from the database.
///
/// # Errors
/// This function will return an [Error::NotFound] if the contribution does
/// not exist, or an error if there is an SQL error.
pub fn get_saving(saving_id: SavingId, connection: &Connection) -> Result<Saving, Error> {
    connection
        .prepare(
            "SELECT id, goal_id, amount, source, note, date FROM goal_saving WHERE id = :id",
        )?
        .query_one(&[(":id", &saving_id)], map_saving_row)
        .map_err(|error| error.into())
}

/// Retrieve the latest contributions joined with their goal names, newest
/// first, up to `limit` rows.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn get_savings_history(
    limit: u32,
    connection: &Connection,
) -> Result<Vec<(Saving, String)>, Error> {
    connection
        .prepare(
            "SELECT s.id, s.goal_id, s.amount, s.source, s.note, s.date, g.name
             FROM goal_saving s
             JOIN goal g ON g.id = s.goal_id
             ORDER BY s.id DESC
             LIMIT :limit",
        )?
        .query_map(&[(":limit", &limit)], |row| {
            let saving = map_saving_row(row)?;
            let goal_name: String = row.get(6)?;
            Ok((saving, goal_name))
        })?
        .map(|maybe_row| maybe_row.map_err(|error| error.into()))
        .collect()
}

/// Total contributions grouped by source of funds.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn aggregate_by_source(connection: &Connection) -> Result<SavingsBySource, Error> {
    let mut totals = SavingsBySource::default();

    let mut statement =
        connection.prepare("SELECT source, COALESCE(SUM(amount), 0) FROM goal_saving GROUP BY source")?;
    let rows = statement.query_map([], |row| {
        let source: String = row.get(0)?;
        let total: f64 = row.get(1)?;
        Ok((source, total))
    })?;

    for row in rows {
        let (source, total) = row?;
        match source.parse::<FundSource>() {
            Ok(FundSource::Cash) => totals.cash = total,
            Ok(FundSource::Debit) => totals.debit = total,
            Err(error) => {
                tracing::warn!("skipping contributions with unknown source tag: {error}");
            }
        }
    }

    Ok(totals)
}

/// Create the goal table in the database.
pub fn create_goal_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS goal (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            target_amount REAL NOT NULL,
            progress REAL NOT NULL DEFAULT 0,
            deadline TEXT
        )",
        (),
    )?;

    Ok(())
}

/// Create the contribution table in the database.
pub fn create_goal_saving_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS goal_saving (
            id INTEGER PRIMARY KEY,
            goal_id INTEGER NOT NULL,
            amount REAL NOT NULL,
            source TEXT NOT NULL CHECK (source IN ('Cash', 'Debit')),
            note TEXT NOT NULL,
            date TEXT NOT NULL,
            FOREIGN KEY(goal_id) REFERENCES goal(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_goal_saving_goal ON goal_saving(goal_id);",
    )?;

    Ok(())
}

fn map_goal_row(row: &Row) -> Result<Goal, rusqlite::Error> {
    Ok(Goal {
        id: row.get(0)?,
        name: row.get(1)?,
        target_amount: row.get(2)?,
        progress: row.get(3)?,
        deadline: row.get(4)?,
    })
}

fn map_saving_row(row: &Row) -> Result<Saving, rusqlite::Error> {
    let raw_source: String = row.get(3)?;
    let source = raw_source.parse().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Text,
            format!("invalid source tag {raw_source}").into(),
        )
    })?;

    Ok(Saving {
        id: row.get(0)?,
        goal_id: row.get(1)?,
        amount: row.get(2)?,
        source,
        note: row.get(4)?,
        date: row.get(5)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod ledger_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{Error, db::initialize, transaction::FundSource};

    use super::{
        contribute, create_goal, delete_contribution, edit_contribution, get_goal,
        get_savings_history,
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    #[test]
    fn contribute_increases_progress() {
        let mut conn = get_test_connection();
        let goal = create_goal("Liburan", 500_000.0, None, &conn).unwrap();
        // Simulate pre-existing progress from an earlier contribution.
        contribute(
            goal.id,
            100_000.0,
            FundSource::Cash,
            "",
            date!(2025 - 09 - 01),
            &mut conn,
        )
        .unwrap();

        contribute(
            goal.id,
            50_000.0,
            FundSource::Cash,
            "",
            date!(2025 - 10 - 01),
            &mut conn,
        )
        .unwrap();

        let goal = get_goal(goal.id, &conn).unwrap();
        assert_eq!(goal.progress, 150_000.0);
        assert_eq!(super::goal_percentage(&goal), 30.0);
    }

    #[test]
    fn contribute_rejects_non_positive_amount() {
        let mut conn = get_test_connection();
        let goal = create_goal("Liburan", 500_000.0, None, &conn).unwrap();

        let result = contribute(
            goal.id,
            0.0,
            FundSource::Cash,
            "",
            date!(2025 - 10 - 01),
            &mut conn,
        );

        assert_eq!(result, Err(Error::InvalidAmount));
        assert_eq!(get_goal(goal.id, &conn).unwrap().progress, 0.0);
    }

    #[test]
    fn contribute_to_missing_goal_writes_nothing() {
        let mut conn = get_test_connection();

        let result = contribute(
            999,
            10_000.0,
            FundSource::Cash,
            "",
            date!(2025 - 10 - 01),
            &mut conn,
        );

        assert_eq!(result, Err(Error::NotFound));
        assert!(get_savings_history(10, &conn).unwrap().is_empty());
    }

    #[test]
    fn edit_contribution_applies_delta_to_progress() {
        let mut conn = get_test_connection();
        let goal = create_goal("Liburan", 500_000.0, None, &conn).unwrap();
        contribute(
            goal.id,
            100_000.0,
            FundSource::Cash,
            "",
            date!(2025 - 09 - 01),
            &mut conn,
        )
        .unwrap();
        let saving = contribute(
            goal.id,
            50_000.0,
            FundSource::Cash,
            "",
            date!(2025 - 10 - 01),
            &mut conn,
        )
        .unwrap();

        edit_contribution(saving.id, 20_000.0, "koreksi", &mut conn).unwrap();

        let goal = get_goal(goal.id, &conn).unwrap();
        assert_eq!(goal.progress, 120_000.0);
    }

    #[test]
    fn delete_contribution_clamps_progress_at_zero() {
        let mut conn = get_test_connection();
        let goal = create_goal("Liburan", 500_000.0, None, &conn).unwrap();
        let saving = contribute(
            goal.id,
            50_000.0,
            FundSource::Cash,
            "",
            date!(2025 - 10 - 01),
            &mut conn,
        )
        .unwrap();
        // Drive the stored progress below the contribution's amount, as an
        // earlier edit of another record could have.
        conn.execute("UPDATE goal SET progress = 30000 WHERE id = ?1", [goal.id])
            .unwrap();

        delete_contribution(saving.id, &mut conn).unwrap();

        let goal = get_goal(goal.id, &conn).unwrap();
        assert_eq!(goal.progress, 0.0);
    }

    #[test]
    fn delete_contribution_subtracts_amount() {
        let mut conn = get_test_connection();
        let goal = create_goal("Liburan", 500_000.0, None, &conn).unwrap();
        contribute(
            goal.id,
            100_000.0,
            FundSource::Cash,
            "",
            date!(2025 - 09 - 01),
            &mut conn,
        )
        .unwrap();
        let saving = contribute(
            goal.id,
            50_000.0,
            FundSource::Debit,
            "",
            date!(2025 - 10 - 01),
            &mut conn,
        )
        .unwrap();

        delete_contribution(saving.id, &mut conn).unwrap();

        assert_eq!(get_goal(goal.id, &conn).unwrap().progress, 100_000.0);
        assert_eq!(
            delete_contribution(saving.id, &mut conn),
            Err(Error::DeleteMissingSaving)
        );
    }
}

#[cfg(test)]
mod goal_percentage_tests {
    use super::{Goal, goal_percentage};

    fn goal_with(progress: f64, target_amount: f64) -> Goal {
        Goal {
            id: 1,
            name: "Test".to_owned(),
            target_amount,
            progress,
            deadline: None,
        }
    }

    #[test]
    fn percentage_is_exact_at_target() {
        assert_eq!(goal_percentage(&goal_with(500_000.0, 500_000.0)), 100.0);
    }

    #[test]
    fn percentage_is_capped_above_target() {
        assert_eq!(goal_percentage(&goal_with(700_000.0, 500_000.0)), 100.0);
    }

    #[test]
    fn percentage_stays_within_bounds() {
        for progress in [0.0, 1.0, 250_000.0, 499_999.99, 1_000_000.0] {
            let percentage = goal_percentage(&goal_with(progress, 500_000.0));
            assert!((0.0..=100.0).contains(&percentage), "out of bounds: {percentage}");
        }
    }

    #[test]
    fn zero_target_reports_zero() {
        assert_eq!(goal_percentage(&goal_with(100.0, 0.0)), 0.0);
    }
}
