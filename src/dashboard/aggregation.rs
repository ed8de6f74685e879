//! Transaction data aggregation for the dashboard charts and summary cards.
//!
//! Provides functions to compute the trailing monthly balance series, group
//! expenses by category and derive per-source balances. Everything here is a
//! pure fold over rows fetched from the store; the handlers re-fetch and
//! recompute on every request.

use time::{Date, Month};

use crate::transaction::{Bank, CategorisedExpense, FundSource, Transaction};

/// The fixed chart palette, cycled over expense categories in the order the
/// categories first appear.
const PALETTE: [&str; 6] = [
    "#3B82F6", "#10B981", "#F59E0B", "#EF4444", "#8B5CF6", "#06B6D4",
];

/// The label used for expenses whose category is missing or unresolved.
pub const UNCATEGORISED_LABEL: &str = "Lain-lain";

/// One month's net balance in the trailing series.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthBalance {
    /// The month's three-letter Indonesian abbreviation, e.g. "Agu".
    pub label: String,
    /// Income minus expenses for the month. Zero for months with no data.
    pub balance: f64,
}

/// One category's share of total expenses.
#[derive(Debug, Clone, PartialEq)]
pub struct CategorySlice {
    /// The category name, or "Lain-lain" for uncategorised expenses.
    pub name: String,
    /// The summed expense amount in Rupiah.
    pub value: f64,
    /// The slice's chart color, assigned from the fixed palette by insertion
    /// order.
    pub color: &'static str,
}

/// Three-letter Indonesian month abbreviation, as the id-ID locale renders.
fn month_label(month: Month) -> &'static str {
    match month {
        Month::January => "Jan",
        Month::February => "Feb",
        Month::March => "Mar",
        Month::April => "Apr",
        Month::May => "Mei",
        Month::June => "Jun",
        Month::July => "Jul",
        Month::August => "Agu",
        Month::September => "Sep",
        Month::October => "Okt",
        Month::November => "Nov",
        Month::December => "Des",
    }
}

/// The first day of the month `months` calendar months before `date`'s month.
pub(super) fn month_start_before(date: Date, months: u32) -> Date {
    let mut month = date.month();
    let mut year = date.year();

    for _ in 0..months {
        if month == Month::January {
            year -= 1;
        }
        month = month.previous();
    }

    Date::from_calendar_date(year, month, 1).expect("day 1 exists in every month")
}

/// Net balance per trailing calendar month, oldest first.
///
/// Returns exactly `months_back` entries covering the months up to and
/// including `as_of`'s month. A month without transactions contributes a zero
/// balance. Only the transaction's date field is bucketed; each month spans
/// its first through last day inclusive.
pub fn monthly_balance_series(
    transactions: &[Transaction],
    months_back: u32,
    as_of: Date,
) -> Vec<MonthBalance> {
    let mut series = Vec::with_capacity(months_back as usize);

    for months_ago in (0..months_back).rev() {
        let month_start = month_start_before(as_of, months_ago);

        let balance = transactions
            .iter()
            .filter(|transaction| {
                transaction.date.year() == month_start.year()
                    && transaction.date.month() == month_start.month()
            })
            .map(|transaction| transaction.kind.sign() * transaction.amount)
            .sum();

        series.push(MonthBalance {
            label: month_label(month_start.month()).to_owned(),
            balance,
        });
    }

    series
}

/// Total expenses grouped by category name, in order of first appearance.
///
/// Expenses without a resolvable category are pooled under "Lain-lain". Each
/// group gets a deterministic color from the fixed palette, cycled by the
/// group's insertion order.
pub fn expense_by_category(expenses: &[CategorisedExpense]) -> Vec<CategorySlice> {
    let mut slices: Vec<CategorySlice> = Vec::new();

    for expense in expenses {
        let name = expense
            .category_name
            .as_deref()
            .unwrap_or(UNCATEGORISED_LABEL);

        match slices.iter_mut().find(|slice| slice.name == name) {
            Some(slice) => slice.value += expense.amount,
            None => {
                let color = PALETTE[slices.len() % PALETTE.len()];
                slices.push(CategorySlice {
                    name: name.to_owned(),
                    value: expense.amount,
                    color,
                });
            }
        }
    }

    slices
}

/// Net balance (income minus expenses) over the transactions from one source
/// of funds, optionally narrowed to one bank.
///
/// The bank filter compares the transaction's explicit bank column; a
/// transaction without a bank never matches a bank filter.
pub fn balance_by_source(
    transactions: &[Transaction],
    source: FundSource,
    bank: Option<Bank>,
) -> f64 {
    transactions
        .iter()
        .filter(|transaction| transaction.source == source)
        .filter(|transaction| bank.is_none() || transaction.bank == bank)
        .map(|transaction| transaction.kind.sign() * transaction.amount)
        .sum()
}

#[cfg(test)]
mod monthly_balance_series_tests {
    use time::macros::date;

    use crate::transaction::{Transaction, TransactionKind};

    use super::monthly_balance_series;

    fn transaction(kind: TransactionKind, amount: f64, date: time::Date) -> Transaction {
        Transaction {
            id: 0,
            kind,
            amount,
            date,
            memo: String::new(),
            source: crate::transaction::FundSource::Cash,
            bank: None,
            category_id: None,
        }
    }

    #[test]
    fn returns_exactly_months_back_entries_oldest_first() {
        let series = monthly_balance_series(&[], 6, date!(2025 - 08 - 07));

        assert_eq!(series.len(), 6);
        let labels: Vec<&str> = series.iter().map(|entry| entry.label.as_str()).collect();
        assert_eq!(labels, vec!["Mar", "Apr", "Mei", "Jun", "Jul", "Agu"]);
        assert!(series.iter().all(|entry| entry.balance == 0.0));
    }

    #[test]
    fn sums_income_minus_expense_per_month() {
        let transactions = vec![
            transaction(TransactionKind::Income, 100_000.0, date!(2025 - 07 - 01)),
            transaction(TransactionKind::Expense, 30_000.0, date!(2025 - 07 - 31)),
            transaction(TransactionKind::Income, 50_000.0, date!(2025 - 08 - 05)),
        ];

        let series = monthly_balance_series(&transactions, 3, date!(2025 - 08 - 07));

        assert_eq!(series[0].balance, 0.0); // Jun
        assert_eq!(series[1].balance, 70_000.0); // Jul
        assert_eq!(series[2].balance, 50_000.0); // Agu
    }

    #[test]
    fn ignores_transactions_outside_the_window() {
        let transactions = vec![
            transaction(TransactionKind::Income, 999_999.0, date!(2024 - 08 - 15)),
            transaction(TransactionKind::Income, 10_000.0, date!(2025 - 08 - 01)),
        ];

        let series = monthly_balance_series(&transactions, 2, date!(2025 - 08 - 07));

        assert_eq!(series.len(), 2);
        assert_eq!(series[1].balance, 10_000.0);
    }

    #[test]
    fn window_crosses_year_boundary() {
        let series = monthly_balance_series(&[], 6, date!(2025 - 02 - 10));

        let labels: Vec<&str> = series.iter().map(|entry| entry.label.as_str()).collect();
        assert_eq!(labels, vec!["Sep", "Okt", "Nov", "Des", "Jan", "Feb"]);
    }
}

#[cfg(test)]
mod expense_by_category_tests {
    use crate::transaction::CategorisedExpense;

    use super::{UNCATEGORISED_LABEL, expense_by_category};

    fn expense(category_name: Option<&str>, amount: f64) -> CategorisedExpense {
        CategorisedExpense {
            category_name: category_name.map(str::to_owned),
            amount,
        }
    }

    #[test]
    fn groups_in_order_of_first_appearance() {
        let expenses = vec![
            expense(Some("Makanan"), 10_000.0),
            expense(Some("Makanan"), 5_000.0),
            expense(None, 2_000.0),
        ];

        let slices = expense_by_category(&expenses);

        assert_eq!(slices.len(), 2);
        assert_eq!(slices[0].name, "Makanan");
        assert_eq!(slices[0].value, 15_000.0);
        assert_eq!(slices[1].name, UNCATEGORISED_LABEL);
        assert_eq!(slices[1].value, 2_000.0);
    }

    #[test]
    fn colors_are_assigned_by_insertion_order_and_cycle() {
        let expenses: Vec<_> = (0..8)
            .map(|index| expense(Some(&format!("Kategori {index}")), 1_000.0))
            .collect();

        let slices = expense_by_category(&expenses);

        assert_eq!(slices.len(), 8);
        assert_eq!(slices[0].color, "#3B82F6");
        assert_eq!(slices[5].color, "#06B6D4");
        // Palette wraps around after six categories.
        assert_eq!(slices[6].color, slices[0].color);
        assert_eq!(slices[7].color, slices[1].color);
    }

    #[test]
    fn empty_input_gives_no_slices() {
        assert!(expense_by_category(&[]).is_empty());
    }
}

#[cfg(test)]
mod balance_by_source_tests {
    use time::macros::date;

    use crate::transaction::{Bank, FundSource, Transaction, TransactionKind};

    use super::balance_by_source;

    fn transaction(
        kind: TransactionKind,
        amount: f64,
        source: FundSource,
        bank: Option<Bank>,
    ) -> Transaction {
        Transaction {
            id: 0,
            kind,
            amount,
            date: date!(2025 - 08 - 01),
            memo: String::new(),
            source,
            bank,
            category_id: None,
        }
    }

    #[test]
    fn filters_by_source() {
        let transactions = vec![
            transaction(TransactionKind::Income, 100_000.0, FundSource::Cash, None),
            transaction(TransactionKind::Expense, 40_000.0, FundSource::Cash, None),
            transaction(TransactionKind::Income, 500_000.0, FundSource::Debit, Some(Bank::Dana)),
        ];

        assert_eq!(
            balance_by_source(&transactions, FundSource::Cash, None),
            60_000.0
        );
    }

    #[test]
    fn bank_filter_narrows_debit_balance() {
        let transactions = vec![
            transaction(TransactionKind::Income, 500_000.0, FundSource::Debit, Some(Bank::Dana)),
            transaction(TransactionKind::Expense, 100_000.0, FundSource::Debit, Some(Bank::Dana)),
            transaction(TransactionKind::Income, 250_000.0, FundSource::Debit, Some(Bank::Seabank)),
            transaction(TransactionKind::Income, 75_000.0, FundSource::Debit, None),
        ];

        assert_eq!(
            balance_by_source(&transactions, FundSource::Debit, Some(Bank::Dana)),
            400_000.0
        );
        assert_eq!(
            balance_by_source(&transactions, FundSource::Debit, Some(Bank::Seabank)),
            250_000.0
        );
        // Without a bank filter the bankless transaction counts too.
        assert_eq!(
            balance_by_source(&transactions, FundSource::Debit, None),
            725_000.0
        );
    }
}
