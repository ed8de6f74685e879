//! Defines the core data models, database queries and ledger rules for debts
//! and their payments.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};
use time::Date;

use crate::Error;

// ============================================================================
// MODELS
// ============================================================================

/// The ID of a debt.
pub type DebtId = i64;

/// The ID of a debt payment.
pub type PaymentId = i64;

/// Whether a debt is still outstanding or fully paid.
///
/// The status is derived: it is "lunas" exactly when the paid amount has
/// reached the principal, and it is recomputed whenever a payment is added,
/// edited or removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub enum DebtStatus {
    /// The debt is outstanding (aktif).
    Active,
    /// The debt is fully paid (lunas).
    Paid,
}

impl DebtStatus {
    /// The string stored in the database for this status.
    pub fn as_str(self) -> &'static str {
        match self {
            DebtStatus::Active => "aktif",
            DebtStatus::Paid => "lunas",
        }
    }

    /// The label shown in the UI for this status.
    pub fn label(self) -> &'static str {
        match self {
            DebtStatus::Active => "Aktif",
            DebtStatus::Paid => "Lunas",
        }
    }

    /// Derive the status from the paid amount and the principal.
    pub fn from_amounts(amount_paid: f64, principal: f64) -> Self {
        if amount_paid >= principal {
            DebtStatus::Paid
        } else {
            DebtStatus::Active
        }
    }
}

impl FromStr for DebtStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "aktif" => Ok(DebtStatus::Active),
            "lunas" => Ok(DebtStatus::Paid),
            other => Err(Error::InvalidDebtStatus(other.to_owned())),
        }
    }
}

impl Display for DebtStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Money owed to a creditor, with an optional fixed monthly installment plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Debt {
    /// The ID of the debt.
    pub id: DebtId,
    /// Who the money is owed to, e.g. a bank or a friend.
    pub creditor: String,
    /// The amount originally borrowed, in Rupiah.
    pub principal: f64,
    /// The sum of all payments towards this debt. Never negative, but may
    /// exceed the principal: a payment is deliberately not bounded by the
    /// remaining balance.
    pub amount_paid: f64,
    /// When the debt was taken on.
    pub debt_date: Date,
    /// When the debt should be fully paid.
    pub due_date: Option<Date>,
    /// A text description of the debt.
    pub memo: String,
    /// Whether the debt is outstanding or fully paid. Derived from the
    /// amounts, never set directly.
    pub status: DebtStatus,
    /// The fixed monthly installment amount (cicilan), if the debt has a plan.
    pub installment_amount: Option<f64>,
    /// The day of the month the installment is due, 1 to 31.
    pub installment_day: Option<u8>,
    /// How many months the installment plan runs for.
    pub installment_months: Option<u32>,
}

/// The user-editable fields of a debt, used to create or update one.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDebt {
    /// Who the money is owed to.
    pub creditor: String,
    /// The amount originally borrowed, in Rupiah.
    pub principal: f64,
    /// When the debt was taken on.
    pub debt_date: Date,
    /// When the debt should be fully paid.
    pub due_date: Option<Date>,
    /// A text description of the debt.
    pub memo: String,
    /// The fixed monthly installment amount (cicilan).
    pub installment_amount: Option<f64>,
    /// The day of the month the installment is due, 1 to 31.
    pub installment_day: Option<u8>,
    /// How many months the installment plan runs for.
    pub installment_months: Option<u32>,
}

impl NewDebt {
    fn validate(&self) -> Result<(), Error> {
        if self.creditor.trim().is_empty() {
            return Err(Error::EmptyCreditorName);
        }

        if self.principal <= 0.0 {
            return Err(Error::InvalidAmount);
        }

        if self.installment_amount.is_some_and(|amount| amount <= 0.0) {
            return Err(Error::InvalidAmount);
        }

        if let Some(day) = self.installment_day {
            if !(1..=31).contains(&day) {
                return Err(Error::InvalidInstallmentDay(day));
            }
        }

        Ok(())
    }
}

/// A single payment towards a debt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtPayment {
    /// The ID of the payment.
    pub id: PaymentId,
    /// The debt this payment belongs to.
    pub debt_id: DebtId,
    /// The paid amount in Rupiah. Always positive.
    pub amount: f64,
    /// When the payment was made.
    pub date: Date,
}

// ============================================================================
// LEDGER RULES
// ============================================================================

/// How much of the debt is left to pay, floored at zero.
///
/// The stored `amount_paid` may exceed the principal when the user overpays;
/// the remainder shown to the user never goes negative.
pub fn remaining_amount(debt: &Debt) -> f64 {
    (debt.principal - debt.amount_paid).max(0.0)
}

/// How much of the debt has been paid off, as a percentage in `[0, 100]`.
///
/// A lunas debt reports exactly 100 regardless of floating point rounding in
/// the division.
pub fn progress_percentage(debt: &Debt) -> f64 {
    if debt.status == DebtStatus::Paid {
        return 100.0;
    }

    if debt.principal <= 0.0 {
        return 0.0;
    }

    (debt.amount_paid / debt.principal * 100.0).clamp(0.0, 100.0)
}

/// Whether the debt is past its due date and still unpaid as of `as_of`.
pub fn is_overdue(debt: &Debt, as_of: Date) -> bool {
    match debt.due_date {
        Some(due_date) => due_date < as_of && debt.status != DebtStatus::Paid,
        None => false,
    }
}

/// One active installment plan in the monthly burden summary.
#[derive(Debug, Clone, PartialEq)]
pub struct InstallmentEntry {
    /// The debt the installment belongs to.
    pub debt_id: DebtId,
    /// Who the installment is paid to.
    pub creditor: String,
    /// The monthly installment amount in Rupiah.
    pub amount: f64,
}

/// The "this month's installment burden" figure: every active installment
/// plan and their sum.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InstallmentSummary {
    /// The active installment plans, in the order the debts were given.
    pub entries: Vec<InstallmentEntry>,
    /// The sum of all entries' amounts.
    pub total: f64,
}

/// Sum the monthly installment burden over all active debts with a plan.
///
/// A debt counts when its status is aktif and both the installment amount and
/// day are set. The sum is flat: no due-date arithmetic is done against the
/// installment day, so every active plan counts once regardless of where in
/// the month "today" falls.
pub fn aggregate_monthly_installments(debts: &[Debt]) -> InstallmentSummary {
    let mut summary = InstallmentSummary::default();

    for debt in debts {
        if debt.status != DebtStatus::Active {
            continue;
        }

        let (Some(amount), Some(_)) = (debt.installment_amount, debt.installment_day) else {
            continue;
        };

        summary.entries.push(InstallmentEntry {
            debt_id: debt.id,
            creditor: debt.creditor.clone(),
            amount,
        });
        summary.total += amount;
    }

    summary
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create a new debt with nothing paid towards it yet.
///
/// # Errors
/// This function will return an [Error::EmptyCreditorName],
/// [Error::InvalidAmount] or [Error::InvalidInstallmentDay] if validation
/// fails, or an error if there is an SQL error.
pub fn create_debt(new_debt: NewDebt, connection: &Connection) -> Result<Debt, Error> {
    new_debt.validate()?;

    connection.execute(
        "INSERT INTO debt (creditor, principal, amount_paid, debt_date, due_date, memo, status,
                           installment_amount, installment_day, installment_months)
         VALUES (?1, ?2, 0, ?3, ?4, ?5, 'aktif', ?6, ?7, ?8)",
        (
            new_debt.creditor.trim(),
            new_debt.principal,
            new_debt.debt_date,
            new_debt.due_date,
            &new_debt.memo,
            new_debt.installment_amount,
            new_debt.installment_day,
            new_debt.installment_months,
        ),
    )?;

    Ok(Debt {
        id: connection.last_insert_rowid(),
        creditor: new_debt.creditor.trim().to_owned(),
        principal: new_debt.principal,
        amount_paid: 0.0,
        debt_date: new_debt.debt_date,
        due_date: new_debt.due_date,
        memo: new_debt.memo,
        status: DebtStatus::Active,
        installment_amount: new_debt.installment_amount,
        installment_day: new_debt.installment_day,
        installment_months: new_debt.installment_months,
    })
}

/// Retrieve the debt with `debt_id` from the database.
///
/// # Errors
/// This function will return an [Error::NotFound] if the debt does not exist,
/// or an error if there is an SQL error.
pub fn get_debt(debt_id: DebtId, connection: &Connection) -> Result<Debt, Error> {
    connection
        .prepare(
            "SELECT id, creditor, principal, amount_paid, debt_date, due_date, memo, status,
                    installment_amount, installment_day, installment_months
             FROM debt WHERE id = :id",
        )?
        .query_one(&[(":id", &debt_id)], map_debt_row)
        .map_err(|error| error.into())
}

/// Retrieve all debts, newest first.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn get_all_debts(connection: &Connection) -> Result<Vec<Debt>, Error> {
    connection
        .prepare(
            "SELECT id, creditor, principal, amount_paid, debt_date, due_date, memo, status,
                    installment_amount, installment_day, installment_months
             FROM debt ORDER BY id DESC",
        )?
        .query_map([], map_debt_row)?
        .map(|maybe_debt| maybe_debt.map_err(|error| error.into()))
        .collect()
}

/// Update a debt's user-editable fields.
///
/// Since the principal may change, the status is recomputed against the
/// stored paid amount inside the same transaction.
///
/// # Errors
/// This function will return an [Error::UpdateMissingDebt] if the debt does
/// not exist, a validation error if the fields are invalid, or an error if
/// there is an SQL error.
pub fn update_debt(
    debt_id: DebtId,
    new_debt: NewDebt,
    connection: &mut Connection,
) -> Result<(), Error> {
    new_debt.validate()?;

    let tx = connection.transaction()?;

    let debt = get_debt(debt_id, &tx).map_err(|error| match error {
        Error::NotFound => Error::UpdateMissingDebt,
        error => error,
    })?;

    let status = DebtStatus::from_amounts(debt.amount_paid, new_debt.principal);

    tx.execute(
        "UPDATE debt
         SET creditor = ?1, principal = ?2, debt_date = ?3, due_date = ?4, memo = ?5, status = ?6,
             installment_amount = ?7, installment_day = ?8, installment_months = ?9
         WHERE id = ?10",
        (
            new_debt.creditor.trim(),
            new_debt.principal,
            new_debt.debt_date,
            new_debt.due_date,
            &new_debt.memo,
            status.as_str(),
            new_debt.installment_amount,
            new_debt.installment_day,
            new_debt.installment_months,
            debt_id,
        ),
    )?;

    tx.commit()?;

    Ok(())
}

/// Delete a debt and, via the cascading foreign key, its payment history.
///
/// # Errors
/// This function will return an [Error::DeleteMissingDebt] if the debt does
/// not exist, or an error if there is an SQL error.
pub fn delete_debt(debt_id: DebtId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM debt WHERE id = ?1", [debt_id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingDebt);
    }

    Ok(())
}

/// Record a payment towards a debt.
///
/// The payment row, the new paid amount and the recomputed status are
/// committed in a single database transaction, so a failure cannot leave the
/// payment recorded while the debt still shows the old totals.
///
/// A payment is deliberately not bounded by the remaining balance: paying
/// more than is owed flips the status to lunas and leaves the excess visible
/// in `amount_paid`.
///
/// # Errors
/// This function will return an [Error::InvalidAmount] if `amount` is not
/// positive, an [Error::NotFound] if the debt does not exist, or an error if
/// there is an SQL error.
pub fn record_payment(
    debt_id: DebtId,
    amount: f64,
    date: Date,
    connection: &mut Connection,
) -> Result<Debt, Error> {
    if amount <= 0.0 {
        return Err(Error::InvalidAmount);
    }

    let tx = connection.transaction()?;

    let debt = get_debt(debt_id, &tx)?;

    tx.execute(
        "INSERT INTO debt_payment (debt_id, amount, date) VALUES (?1, ?2, ?3)",
        (debt_id, amount, date),
    )?;

    let amount_paid = debt.amount_paid + amount;
    let status = DebtStatus::from_amounts(amount_paid, debt.principal);

    tx.execute(
        "UPDATE debt SET amount_paid = ?1, status = ?2 WHERE id = ?3",
        (amount_paid, status.as_str(), debt_id),
    )?;

    tx.commit()?;

    Ok(Debt {
        amount_paid,
        status,
        ..debt
    })
}

/// Correct a payment's amount and date, applying the amount delta to the
/// owning debt's paid total and recomputing the status.
///
/// The paid total is floored at zero.
///
/// # Errors
/// This function will return an [Error::InvalidAmount] if `new_amount` is not
/// positive, an [Error::NotFound] if the payment does not exist, or an error
/// if there is an SQL error.
pub fn edit_payment(
    payment_id: PaymentId,
    new_amount: f64,
    new_date: Date,
    connection: &mut Connection,
) -> Result<(), Error> {
    if new_amount <= 0.0 {
        return Err(Error::InvalidAmount);
    }

    let tx = connection.transaction()?;

    let payment = get_payment(payment_id, &tx)?;
    let debt = get_debt(payment.debt_id, &tx)?;

    tx.execute(
        "UPDATE debt_payment SET amount = ?1, date = ?2 WHERE id = ?3",
        (new_amount, new_date, payment_id),
    )?;

    let amount_paid = (debt.amount_paid + new_amount - payment.amount).max(0.0);
    let status = DebtStatus::from_amounts(amount_paid, debt.principal);

    tx.execute(
        "UPDATE debt SET amount_paid = ?1, status = ?2 WHERE id = ?3",
        (amount_paid, status.as_str(), debt.id),
    )?;

    tx.commit()?;

    Ok(())
}

/// Delete a payment, subtracting its amount from the owning debt's paid total
/// (floored at zero) and recomputing the status.
///
/// Deleting the payment that pushed a debt to lunas flips the status back to
/// aktif.
///
/// # Errors
/// This function will return an [Error::DeleteMissingPayment] if the payment
/// does not exist, or an error if there is an SQL error.
pub fn delete_payment(payment_id: PaymentId, connection: &mut Connection) -> Result<(), Error> {
    let tx = connection.transaction()?;

    let payment = get_payment(payment_id, &tx).map_err(|error| match error {
        Error::NotFound => Error::DeleteMissingPayment,
        error => error,
    })?;
    let debt = get_debt(payment.debt_id, &tx)?;

    tx.execute("DELETE FROM debt_payment WHERE id = ?1", [payment_id])?;

    let amount_paid = (debt.amount_paid - payment.amount).max(0.0);
    let status = DebtStatus::from_amounts(amount_paid, debt.principal);

    tx.execute(
        "UPDATE debt SET amount_paid = ?1, status = ?2 WHERE id = ?3",
        (amount_paid, status.as_str(), debt.id),
    )?;

    tx.commit()?;

    Ok(())
}

/// Retrieve the payment with `payment_id` from the database.
///
/// # Errors
/// This function will return an [Error::NotFound] if the payment does not
/// exist, or an error if there is an SQL error.
pub fn get_payment(payment_id: PaymentId, connection: &Connection) -> Result<DebtPayment, Error> {
    connection
        .prepare("SELECT id, debt_id, amount, date FROM debt_payment WHERE id = :id")?
        .query_one(&[(":id", &payment_id)], map_payment_row)
        .map_err(|error| error.into())
}

/// Retrieve a debt's payments, newest first.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn get_payments_for_debt(
    debt_id: DebtId,
    connection: &Connection,
) -> Result<Vec<DebtPayment>, Error> {
    connection
        .prepare(
            "SELECT id, debt_id, amount, date FROM debt_payment
             WHERE debt_id = :debt_id ORDER BY id DESC",
        )?
        .query_map(&[(":debt_id", &debt_id)], map_payment_row)?
        .map(|maybe_payment| maybe_payment.map_err(|error| error.into()))
        .collect()
}

/// Create the debt table in the database.
pub fn create_debt_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS debt (
            id INTEGER PRIMARY KEY,
            creditor TEXT NOT NULL,
            principal REAL NOT NULL,
            amount_paid REAL NOT NULL DEFAULT 0,
            debt_date TEXT NOT NULL,
            due_date TEXT,
            memo TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'aktif' CHECK (status IN ('aktif', 'lunas')),
            installment_amount REAL,
            installment_day INTEGER,
            installment_months INTEGER
        )",
        (),
    )?;

    Ok(())
}

/// Create the debt payment table in the database.
pub fn create_debt_payment_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS debt_payment (
            id INTEGER PRIMARY KEY,
            debt_id INTEGER NOT NULL,
            amount REAL NOT NULL,
            date TEXT NOT NULL,
            FOREIGN KEY(debt_id) REFERENCES debt(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_debt_payment_debt ON debt_payment(debt_id);",
    )?;

    Ok(())
}

fn map_debt_row(row: &Row) -> Result<Debt, rusqlite::Error> {
    let raw_status: String = row.get(7)?;
    let status = raw_status.parse().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            7,
            rusqlite::types::Type::Text,
            format!("invalid debt status {raw_status}").into(),
        )
    })?;

    Ok(Debt {
        id: row.get(0)?,
        creditor: row.get(1)?,
        principal: row.get(2)?,
        amount_paid: row.get(3)?,
        debt_date: row.get(4)?,
        due_date: row.get(5)?,
        memo: row.get(6)?,
        status,
        installment_amount: row.get(8)?,
        installment_day: row.get(9)?,
        installment_months: row.get(10)?,
    })
}

fn map_payment_row(row: &Row) -> Result<DebtPayment, rusqlite::Error> {
    Ok(DebtPayment {
        id: row.get(0)?,
        debt_id: row.get(1)?,
        amount: row.get(2)?,
        date: row.get(3)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================


#[cfg(test)]
mod derived_value_tests {
    use time::macros::date;

    use super::{Debt, DebtStatus, is_overdue, progress_percentage, remaining_amount};

    fn debt_with(amount_paid: f64, principal: f64, status: DebtStatus) -> Debt {
        Debt {
            id: 1,
            creditor: "Bank".to_owned(),
            principal,
            amount_paid,
            debt_date: date!(2025 - 01 - 15),
            due_date: None,
            memo: String::new(),
            status,
            installment_amount: None,
            installment_day: None,
            installment_months: None,
        }
    }

    #[test]
    fn remaining_never_negative() {
        let debt = debt_with(1_500_000.0, 1_000_000.0, DebtStatus::Paid);

        assert_eq!(remaining_amount(&debt), 0.0);
    }

    #[test]
    fn paid_debt_reports_exactly_one_hundred_percent() {
        // 1/3 of a million is not exact in binary floating point; the status
        // short-circuit keeps the figure at a flat 100.
        let debt = debt_with(1_000_000.0 / 3.0 * 3.0, 1_000_000.0, DebtStatus::Paid);

        assert_eq!(progress_percentage(&debt), 100.0);
    }

    #[test]
    fn progress_stays_within_bounds() {
        for amount_paid in [0.0, 1.0, 400_000.0, 999_999.0, 2_000_000.0] {
            let status = DebtStatus::from_amounts(amount_paid, 1_000_000.0);
            let percentage = progress_percentage(&debt_with(amount_paid, 1_000_000.0, status));
            assert!(
                (0.0..=100.0).contains(&percentage),
                "out of bounds: {percentage}"
            );
        }
    }

    #[test]
    fn overdue_requires_due_date_in_past_and_active_status() {
        let today = date!(2025 - 06 - 15);

        let mut debt = debt_with(0.0, 1_000_000.0, DebtStatus::Active);
        assert!(!is_overdue(&debt, today));

        debt.due_date = Some(date!(2025 - 06 - 14));
        assert!(is_overdue(&debt, today));

        debt.due_date = Some(today);
        assert!(!is_overdue(&debt, today));

        debt.due_date = Some(date!(2025 - 06 - 14));
        debt.status = DebtStatus::Paid;
        assert!(!is_overdue(&debt, today));
    }
}

#[cfg(test)]
mod installment_tests {
    use time::macros::date;

    use super::{Debt, DebtStatus, aggregate_monthly_installments};

    fn debt(id: i64, status: DebtStatus, amount: Option<f64>, day: Option<u8>) -> Debt {
        Debt {
            id,
            creditor: format!("Kreditor {id}"),
            principal: 1_000_000.0,
            amount_paid: 0.0,
            debt_date: date!(2025 - 01 - 15),
            due_date: None,
            memo: String::new(),
            status,
            installment_amount: amount,
            installment_day: day,
            installment_months: Some(12),
        }
    }

    #[test]
    fn sums_active_plans_only() {
        let debts = vec![
            debt(1, DebtStatus::Active, Some(250_000.0), Some(5)),
            debt(2, DebtStatus::Paid, Some(100_000.0), Some(10)),
            debt(3, DebtStatus::Active, Some(150_000.0), Some(25)),
        ];

        let summary = aggregate_monthly_installments(&debts);

        assert_eq!(summary.entries.len(), 2);
        assert_eq!(summary.total, 400_000.0);
        assert_eq!(summary.entries[0].debt_id, 1);
        assert_eq!(summary.entries[1].debt_id, 3);
    }

    #[test]
    fn requires_both_amount_and_day() {
        let debts = vec![
            debt(1, DebtStatus::Active, Some(250_000.0), None),
            debt(2, DebtStatus::Active, None, Some(10)),
        ];

        let summary = aggregate_monthly_installments(&debts);

        assert!(summary.entries.is_empty());
        assert_eq!(summary.total, 0.0);
    }

    #[test]
    fn empty_input_gives_empty_summary() {
        let summary = aggregate_monthly_installments(&[]);

        assert!(summary.entries.is_empty());
        assert_eq!(summary.total, 0.0);
    }
}

#[cfg(test)]
mod debt_crud_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{Error, db::initialize};

    use super::{
        DebtStatus, NewDebt, create_debt, delete_debt, get_all_debts, get_debt,
        get_payments_for_debt, record_payment, update_debt,
    };

    fn new_debt() -> NewDebt {
        NewDebt {
            creditor: "Teman".to_owned(),
            principal: 200_000.0,
            debt_date: date!(2025 - 03 - 01),
            due_date: Some(date!(2025 - 12 - 01)),
            memo: "Pinjam uang".to_owned(),
            installment_amount: None,
            installment_day: None,
            installment_months: None,
        }
    }

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    #[test]
    fn create_rejects_blank_creditor() {
        let conn = get_test_connection();
        let mut debt = new_debt();
        debt.creditor = "  ".to_owned();

        assert_eq!(create_debt(debt, &conn), Err(Error::EmptyCreditorName));
    }

    #[test]
    fn create_rejects_installment_day_out_of_range() {
        let conn = get_test_connection();
        let mut debt = new_debt();
        debt.installment_amount = Some(50_000.0);
        debt.installment_day = Some(32);

        assert_eq!(create_debt(debt, &conn), Err(Error::InvalidInstallmentDay(32)));
    }

    #[test]
    fn shrinking_principal_below_paid_settles_debt() {
        let mut conn = get_test_connection();
        let debt = create_debt(new_debt(), &conn).unwrap();
        record_payment(debt.id, 150_000.0, date!(2025 - 04 - 01), &mut conn).unwrap();

        let mut edited = new_debt();
        edited.principal = 100_000.0;
        update_debt(debt.id, edited, &mut conn).unwrap();

        let updated = get_debt(debt.id, &conn).unwrap();
        assert_eq!(updated.status, DebtStatus::Paid);
        assert_eq!(updated.amount_paid, 150_000.0);
    }

    #[test]
    fn delete_debt_cascades_to_payments() {
        let mut conn = get_test_connection();
        let debt = create_debt(new_debt(), &conn).unwrap();
        record_payment(debt.id, 50_000.0, date!(2025 - 04 - 01), &mut conn).unwrap();

        delete_debt(debt.id, &conn).unwrap();

        assert!(get_all_debts(&conn).unwrap().is_empty());
        assert!(get_payments_for_debt(debt.id, &conn).unwrap().is_empty());
    }

    #[test]
    fn delete_missing_debt_fails() {
        let conn = get_test_connection();

        assert_eq!(delete_debt(999, &conn), Err(Error::DeleteMissingDebt));
    }
}
