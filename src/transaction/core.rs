//! Defines the core data model and database queries for transactions.

use std::ops::RangeInclusive;

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    category::CategoryId,
    transaction::models::{Bank, FundSource, TransactionId, TransactionKind},
};

// ============================================================================
// MODELS
// ============================================================================

/// An income or expense record, i.e. an event where money moved.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// Whether this is income or an expense.
    pub kind: TransactionKind,
    /// The amount of money in Rupiah. Always positive; the direction of the
    /// money flow is carried by `kind`.
    pub amount: f64,
    /// When the transaction happened.
    pub date: Date,
    /// A text description of what the transaction was for.
    pub memo: String,
    /// Where the money came from or went to.
    pub source: FundSource,
    /// The bank or e-wallet behind a debit transaction.
    pub bank: Option<Bank>,
    /// The category of an expense transaction.
    pub category_id: Option<CategoryId>,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(kind: TransactionKind, amount: f64, date: Date) -> TransactionBuilder {
        TransactionBuilder {
            kind,
            amount,
            date,
            memo: String::new(),
            source: FundSource::Cash,
            bank: None,
            category_id: None,
        }
    }
}

/// A builder for creating [Transaction] instances.
///
/// Optional fields default to an empty memo, the Cash source, no bank and no
/// category. Pass the finished builder to [create_transaction].
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// Whether this is income or an expense.
    pub kind: TransactionKind,
    /// The amount of money in Rupiah; must be positive.
    pub amount: f64,
    /// The date when the transaction occurred.
    pub date: Date,
    /// A human-readable description of the transaction.
    pub memo: String,
    /// Where the money came from or went to.
    pub source: FundSource,
    /// The bank or e-wallet behind a debit transaction. Only meaningful when
    /// `source` is Debit; ignored for cash.
    pub bank: Option<Bank>,
    /// The category of an expense transaction.
    pub category_id: Option<CategoryId>,
}

impl TransactionBuilder {
    /// Set the memo text for the transaction.
    pub fn memo(mut self, memo: &str) -> Self {
        self.memo = memo.to_owned();
        self
    }

    /// Set the source of funds for the transaction.
    pub fn source(mut self, source: FundSource) -> Self {
        self.source = source;
        self
    }

    /// Set the bank or e-wallet for a debit transaction.
    pub fn bank(mut self, bank: Option<Bank>) -> Self {
        self.bank = bank;
        self
    }

    /// Set the category for an expense transaction.
    pub fn category_id(mut self, category_id: Option<CategoryId>) -> Self {
        self.category_id = category_id;
        self
    }
}

/// An expense amount joined with the name of its category, if any.
///
/// Used by the dashboard's per-category breakdown and the CSV export.
#[derive(Debug, Clone, PartialEq)]
pub struct CategorisedExpense {
    /// The name of the expense's category; `None` when the transaction has no
    /// category or the category was deleted.
    pub category_name: Option<String>,
    /// The expense amount in Rupiah.
    pub amount: f64,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create a new transaction in the database from a builder.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidAmount] if the amount is zero or negative,
/// - or [Error::InvalidCategory] if the category ID does not refer to a real category,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    if builder.amount <= 0.0 {
        return Err(Error::InvalidAmount);
    }

    // A bank only makes sense for debit money.
    let bank = match builder.source {
        FundSource::Debit => builder.bank,
        FundSource::Cash => None,
    };

    let transaction = connection
        .prepare(
            "INSERT INTO \"transaction\" (kind, amount, date, memo, source, bank, category_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING id, kind, amount, date, memo, source, bank, category_id",
        )?
        .query_row(
            (
                builder.kind.as_str(),
                builder.amount,
                builder.date,
                &builder.memo,
                builder.source.as_str(),
                bank.map(Bank::as_str),
                builder.category_id,
            ),
            map_transaction_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::InvalidCategory(builder.category_id),
            error => error.into(),
        })?;

    Ok(transaction)
}

/// Retrieve a transaction from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(id: TransactionId, connection: &Connection) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "SELECT id, kind, amount, date, memo, source, bank, category_id
             FROM \"transaction\" WHERE id = :id",
        )?
        .query_one(&[(":id", &id)], map_transaction_row)?;

    Ok(transaction)
}

/// Overwrite the transaction with `id` using the fields in `builder`.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidAmount] if the amount is zero or negative,
/// - or [Error::UpdateMissingTransaction] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_transaction(
    id: TransactionId,
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<(), Error> {
    if builder.amount <= 0.0 {
        return Err(Error::InvalidAmount);
    }

    let bank = match builder.source {
        FundSource::Debit => builder.bank,
        FundSource::Cash => None,
    };

    let rows_affected = connection
        .execute(
            "UPDATE \"transaction\"
             SET kind = ?1, amount = ?2, date = ?3, memo = ?4, source = ?5, bank = ?6, category_id = ?7
             WHERE id = ?8",
            (
                builder.kind.as_str(),
                builder.amount,
                builder.date,
                &builder.memo,
                builder.source.as_str(),
                bank.map(Bank::as_str),
                builder.category_id,
                id,
            ),
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::InvalidCategory(builder.category_id),
            error => error.into(),
        })?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingTransaction);
    }

    Ok(())
}

/// Delete the transaction with `id` from the database.
///
/// # Errors
/// This function will return an [Error::DeleteMissingTransaction] if `id`
/// does not refer to a valid transaction, or an error if there is an SQL error.
pub fn delete_transaction(id: TransactionId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM \"transaction\" WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingTransaction);
    }

    Ok(())
}

/// Retrieve all transactions of one kind, latest first, joined with their
/// category names for display.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn get_transactions_by_kind(
    kind: TransactionKind,
    connection: &Connection,
) -> Result<Vec<(Transaction, Option<String>)>, Error> {
    connection
        .prepare(
            "SELECT t.id, t.kind, t.amount, t.date, t.memo, t.source, t.bank, t.category_id, c.name
             FROM \"transaction\" t
             LEFT JOIN category c ON c.id = t.category_id
             WHERE t.kind = :kind
             ORDER BY t.date DESC, t.id DESC",
        )?
        .query_map(&[(":kind", kind.as_str())], |row| {
            let transaction = map_transaction_row(row)?;
            let category_name: Option<String> = row.get(8)?;
            Ok((transaction, category_name))
        })?
        .map(|maybe_row| maybe_row.map_err(|error| error.into()))
        .collect()
}

/// Retrieve every transaction, oldest first.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn get_all_transactions(connection: &Connection) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, kind, amount, date, memo, source, bank, category_id
             FROM \"transaction\"
             ORDER BY date ASC, id ASC",
        )?
        .query_map([], map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect()
}

/// Retrieve the transactions whose date falls within `date_range` (inclusive
/// on both ends), oldest first.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn get_transactions_in_date_range(
    date_range: RangeInclusive<Date>,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, kind, amount, date, memo, source, bank, category_id
             FROM \"transaction\"
             WHERE date >= :start AND date <= :end
             ORDER BY date ASC, id ASC",
        )?
        .query_map(
            &[(":start", date_range.start()), (":end", date_range.end())],
            map_transaction_row,
        )?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect()
}

/// Get the total number of transactions in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn count_transactions(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM \"transaction\";", [], |row| {
            row.get(0)
        })
        .map_err(|error| error.into())
}

/// The sum of all transaction amounts of one kind.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn total_by_kind(kind: TransactionKind, connection: &Connection) -> Result<f64, Error> {
    let total = connection
        .prepare("SELECT COALESCE(SUM(amount), 0) FROM \"transaction\" WHERE kind = :kind")?
        .query_row(&[(":kind", kind.as_str())], |row| row.get(0))?;

    Ok(total)
}

/// Retrieve every expense amount with its category name, oldest first.
///
/// Expenses whose category reference is missing or no longer resolves come
/// back with `category_name: None` so callers can bucket them as "Lain-lain".
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn get_expenses_with_category_names(
    connection: &Connection,
) -> Result<Vec<CategorisedExpense>, Error> {
    connection
        .prepare(
            "SELECT c.name, t.amount
             FROM \"transaction\" t
             LEFT JOIN category c ON c.id = t.category_id
             WHERE t.kind = 'pengeluaran'
             ORDER BY t.date ASC, t.id ASC",
        )?
        .query_map([], |row| {
            Ok(CategorisedExpense {
                category_name: row.get(0)?,
                amount: row.get(1)?,
            })
        })?
        .map(|maybe_expense| maybe_expense.map_err(|error| error.into()))
        .collect()
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                kind TEXT NOT NULL CHECK (kind IN ('pemasukan', 'pengeluaran')),
                amount REAL NOT NULL,
                date TEXT NOT NULL,
                memo TEXT NOT NULL,
                source TEXT NOT NULL CHECK (source IN ('Cash', 'Debit')),
                bank TEXT,
                category_id INTEGER,
                FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE SET NULL
                )",
        (),
    )?;

    // Composite index used by the dashboard's date-range queries.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_date_kind ON \"transaction\"(date, kind);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_kind: String = row.get(1)?;
    let amount = row.get(2)?;
    let date = row.get(3)?;
    let memo = row.get(4)?;
    let raw_source: String = row.get(5)?;
    let raw_bank: Option<String> = row.get(6)?;
    let category_id = row.get(7)?;

    let kind = parse_tag(&raw_kind, 1)?;
    let source = parse_tag(&raw_source, 5)?;
    let bank = raw_bank.as_deref().map(|raw| parse_tag(raw, 6)).transpose()?;

    Ok(Transaction {
        id,
        kind,
        amount,
        date,
        memo,
        source,
        bank,
        category_id,
    })
}

/// Parse a stored tag string, converting a mismatch into a row-mapping error.
fn parse_tag<T: std::str::FromStr<Err = Error>>(
    raw: &str,
    column: usize,
) -> Result<T, rusqlite::Error> {
    raw.parse().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            column,
            rusqlite::types::Type::Text,
            format!("invalid tag value {raw}").into(),
        )
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod database_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        category::{CategoryKind, CategoryName, create_category},
        db::initialize,
        transaction::{
            Bank, FundSource, Transaction, TransactionKind,
            core::{
                create_transaction, delete_transaction, get_transaction,
                get_transactions_by_kind, get_transactions_in_date_range, total_by_kind,
                update_transaction,
            },
        },
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    #[test]
    fn create_succeeds() {
        let conn = get_test_connection();
        let amount = 250_000.0;

        let result = create_transaction(
            Transaction::build(TransactionKind::Income, amount, date!(2025 - 10 - 05))
                .memo("Gaji bulanan")
                .source(FundSource::Debit)
                .bank(Some(Bank::Seabank)),
            &conn,
        );

        match result {
            Ok(transaction) => {
                assert_eq!(transaction.amount, amount);
                assert_eq!(transaction.bank, Some(Bank::Seabank));
            }
            Err(error) => panic!("Unexpected error: {error}"),
        }
    }

    #[test]
    fn create_fails_on_non_positive_amount() {
        let conn = get_test_connection();

        let result = create_transaction(
            Transaction::build(TransactionKind::Expense, 0.0, date!(2025 - 10 - 05)),
            &conn,
        );

        assert_eq!(result, Err(Error::InvalidAmount));
    }

    #[test]
    fn create_fails_on_invalid_category_id() {
        let conn = get_test_connection();
        let category_id = Some(42);

        let result = create_transaction(
            Transaction::build(TransactionKind::Expense, 10_000.0, date!(2025 - 10 - 04))
                .category_id(category_id),
            &conn,
        );

        assert_eq!(result, Err(Error::InvalidCategory(category_id)));
    }

    #[test]
    fn create_drops_bank_for_cash() {
        let conn = get_test_connection();

        let transaction = create_transaction(
            Transaction::build(TransactionKind::Expense, 5_000.0, date!(2025 - 10 - 04))
                .source(FundSource::Cash)
                .bank(Some(Bank::Dana)),
            &conn,
        )
        .unwrap();

        assert_eq!(transaction.bank, None);
    }

    #[test]
    fn get_round_trips() {
        let conn = get_test_connection();
        let created = create_transaction(
            Transaction::build(TransactionKind::Expense, 15_000.0, date!(2025 - 09 - 30))
                .memo("Kopi"),
            &conn,
        )
        .unwrap();

        let got = get_transaction(created.id, &conn).unwrap();

        assert_eq!(created, got);
    }

    #[test]
    fn update_replaces_fields() {
        let conn = get_test_connection();
        let category = create_category(
            CategoryName::new("Makanan").unwrap(),
            CategoryKind::Expense,
            &conn,
        )
        .unwrap();
        let created = create_transaction(
            Transaction::build(TransactionKind::Expense, 15_000.0, date!(2025 - 09 - 30)),
            &conn,
        )
        .unwrap();

        update_transaction(
            created.id,
            Transaction::build(TransactionKind::Expense, 20_000.0, date!(2025 - 10 - 01))
                .memo("Makan siang")
                .category_id(Some(category.id)),
            &conn,
        )
        .unwrap();

        let got = get_transaction(created.id, &conn).unwrap();
        assert_eq!(got.amount, 20_000.0);
        assert_eq!(got.memo, "Makan siang");
        assert_eq!(got.category_id, Some(category.id));
    }

    #[test]
    fn update_fails_on_missing_id() {
        let conn = get_test_connection();

        let result = update_transaction(
            999,
            Transaction::build(TransactionKind::Expense, 20_000.0, date!(2025 - 10 - 01)),
            &conn,
        );

        assert_eq!(result, Err(Error::UpdateMissingTransaction));
    }

    #[test]
    fn delete_removes_row() {
        let conn = get_test_connection();
        let created = create_transaction(
            Transaction::build(TransactionKind::Income, 15_000.0, date!(2025 - 09 - 30)),
            &conn,
        )
        .unwrap();

        delete_transaction(created.id, &conn).unwrap();

        assert_eq!(get_transaction(created.id, &conn), Err(Error::NotFound));
        assert_eq!(
            delete_transaction(created.id, &conn),
            Err(Error::DeleteMissingTransaction)
        );
    }

    #[test]
    fn date_range_query_is_inclusive_and_ordered() {
        let conn = get_test_connection();
        for (amount, date) in [
            (1.0, date!(2025 - 01 - 31)),
            (2.0, date!(2025 - 02 - 01)),
            (3.0, date!(2025 - 02 - 28)),
            (4.0, date!(2025 - 03 - 01)),
        ] {
            create_transaction(
                Transaction::build(TransactionKind::Income, amount, date),
                &conn,
            )
            .unwrap();
        }

        let in_february = get_transactions_in_date_range(
            date!(2025 - 02 - 01)..=date!(2025 - 02 - 28),
            &conn,
        )
        .unwrap();

        let amounts: Vec<f64> = in_february.iter().map(|t| t.amount).collect();
        assert_eq!(amounts, vec![2.0, 3.0]);
    }

    #[test]
    fn totals_are_split_by_kind() {
        let conn = get_test_connection();
        create_transaction(
            Transaction::build(TransactionKind::Income, 100_000.0, date!(2025 - 10 - 01)),
            &conn,
        )
        .unwrap();
        create_transaction(
            Transaction::build(TransactionKind::Expense, 30_000.0, date!(2025 - 10 - 02)),
            &conn,
        )
        .unwrap();

        assert_eq!(total_by_kind(TransactionKind::Income, &conn).unwrap(), 100_000.0);
        assert_eq!(total_by_kind(TransactionKind::Expense, &conn).unwrap(), 30_000.0);
    }

    #[test]
    fn listing_by_kind_includes_category_names() {
        let conn = get_test_connection();
        let category = create_category(
            CategoryName::new("Makanan").unwrap(),
            CategoryKind::Expense,
            &conn,
        )
        .unwrap();
        create_transaction(
            Transaction::build(TransactionKind::Expense, 10_000.0, date!(2025 - 10 - 01))
                .category_id(Some(category.id)),
            &conn,
        )
        .unwrap();
        create_transaction(
            Transaction::build(TransactionKind::Expense, 5_000.0, date!(2025 - 10 - 02)),
            &conn,
        )
        .unwrap();

        let rows = get_transactions_by_kind(TransactionKind::Expense, &conn).unwrap();

        // Latest first
        assert_eq!(rows[0].0.amount, 5_000.0);
        assert_eq!(rows[0].1, None);
        assert_eq!(rows[1].1, Some("Makanan".to_owned()));
    }
}
