//! Database initialization for the application's domain models.

use rusqlite::Connection;

use crate::{
    budget::create_budget_table,
    category::create_category_table,
    debt::{create_debt_payment_table, create_debt_table},
    goal::{create_goal_saving_table, create_goal_table},
    transaction::create_transaction_table,
};

/// Create the tables for all domain models if they do not exist yet.
///
/// Foreign keys are switched on for the connection since SQLite leaves them
/// off by default and the schema relies on cascading deletes for payment and
/// contribution history.
///
/// # Errors
/// Returns an error if any table cannot be created or if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.pragma_update(None, "foreign_keys", "ON")?;

    create_category_table(connection)?;
    create_transaction_table(connection)?;
    create_goal_table(connection)?;
    create_goal_saving_table(connection)?;
    create_debt_table(connection)?;
    create_debt_payment_table(connection)?;
    create_budget_table(connection)?;

    Ok(())
}

#[cfg(test)]
mod initialize_tests {
    use rusqlite::Connection;

    use super::initialize;

    #[test]
    fn sql_is_valid() {
        let connection =
            Connection::open_in_memory().expect("Could not initialise in-memory SQLite database");

        assert_eq!(Ok(()), initialize(&connection));
    }

    #[test]
    fn is_idempotent() {
        let connection = Connection::open_in_memory().unwrap();

        initialize(&connection).unwrap();

        assert_eq!(Ok(()), initialize(&connection));
    }
}
