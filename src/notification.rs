//! Deadline-proximity checks that produce reminder payloads.
//!
//! Each check is a pure function over rows fetched from the store; the
//! dashboard renders the resulting reminders and they are logged. Actual push
//! delivery is a presentation concern outside this crate's scope.

use rusqlite::Connection;
use time::Date;

use crate::{
    Error,
    budget::{BUDGET_WARNING_PERCENTAGE, budget_usage, get_budgets_for_month},
    debt::{Debt, DebtStatus, get_all_debts},
    goal::{Goal, get_all_goals},
};

/// How many days ahead a goal deadline triggers a reminder.
const GOAL_DEADLINE_WINDOW_DAYS: i64 = 7;

/// How many days ahead a debt due date triggers a reminder.
const DEBT_DUE_WINDOW_DAYS: i64 = 3;

/// A reminder computed from deadline or threshold proximity.
#[derive(Debug, Clone, PartialEq)]
pub struct Reminder {
    /// Short headline, e.g. "Hutang Jatuh Tempo".
    pub title: String,
    /// The full message shown to the user.
    pub body: String,
}

/// Reminders for goals whose deadline falls within the next seven days.
///
/// A deadline of today or in the past does not remind; the goal list itself
/// already shows those.
pub fn check_goal_deadlines(goals: &[Goal], as_of: Date) -> Vec<Reminder> {
    goals
        .iter()
        .filter_map(|goal| {
            let deadline = goal.deadline?;
            let days_left = (deadline - as_of).whole_days();

            if days_left > 0 && days_left <= GOAL_DEADLINE_WINDOW_DAYS {
                Some(Reminder {
                    title: "Target Mendekati Deadline".to_owned(),
                    body: format!(
                        "Target \"{}\" akan berakhir dalam {} hari!",
                        goal.name, days_left
                    ),
                })
            } else {
                None
            }
        })
        .collect()
}

/// Reminders for active debts whose due date falls within the next three
/// days, today included.
pub fn check_debt_due_dates(debts: &[Debt], as_of: Date) -> Vec<Reminder> {
    debts
        .iter()
        .filter(|debt| debt.status == DebtStatus::Active)
        .filter_map(|debt| {
            let due_date = debt.due_date?;
            let days_left = (due_date - as_of).whole_days();

            if (0..=DEBT_DUE_WINDOW_DAYS).contains(&days_left) {
                Some(Reminder {
                    title: "Hutang Jatuh Tempo".to_owned(),
                    body: format!(
                        "Hutang \"{}\" jatuh tempo dalam {} hari!",
                        debt.creditor, days_left
                    ),
                })
            } else {
                None
            }
        })
        .collect()
}

/// Reminders for current-month budgets whose usage has reached the warning
/// threshold.
pub fn check_budget_limits(
    budgets_with_usage: &[(String, f64)],
) -> Vec<Reminder> {
    budgets_with_usage
        .iter()
        .filter(|(_, percentage)| *percentage >= BUDGET_WARNING_PERCENTAGE)
        .map(|(category_name, percentage)| Reminder {
            title: "Budget Hampir Habis".to_owned(),
            body: format!(
                "Budget \"{category_name}\" sudah {percentage:.0}% terpakai!"
            ),
        })
        .collect()
}

/// Run every check against the store and collect the reminders.
///
/// Each reminder is also logged so a headless deployment still surfaces them.
///
/// # Errors
/// Returns an error if any of the underlying queries fail.
pub fn collect_reminders(as_of: Date, connection: &Connection) -> Result<Vec<Reminder>, Error> {
    let goals = get_all_goals(connection)?;
    let debts = get_all_debts(connection)?;

    let budgets = get_budgets_for_month(u8::from(as_of.month()), as_of.year(), connection)?;
    let mut budgets_with_usage = Vec::with_capacity(budgets.len());
    for (budget, category_name) in budgets {
        let usage = budget_usage(&budget, connection)?;
        budgets_with_usage.push((category_name, usage.percentage));
    }

    let mut reminders = check_goal_deadlines(&goals, as_of);
    reminders.extend(check_debt_due_dates(&debts, as_of));
    reminders.extend(check_budget_limits(&budgets_with_usage));

    for reminder in &reminders {
        tracing::info!("{}: {}", reminder.title, reminder.body);
    }

    Ok(reminders)
}

#[cfg(test)]
mod goal_deadline_tests {
    use time::macros::date;

    use crate::goal::Goal;

    use super::check_goal_deadlines;

    fn goal(deadline: Option<time::Date>) -> Goal {
        Goal {
            id: 1,
            name: "Liburan".to_owned(),
            target_amount: 500_000.0,
            progress: 0.0,
            deadline,
        }
    }

    #[test]
    fn reminds_within_seven_days() {
        let today = date!(2025 - 08 - 07);

        let reminders = check_goal_deadlines(&[goal(Some(date!(2025 - 08 - 10)))], today);

        assert_eq!(reminders.len(), 1);
        assert_eq!(
            reminders[0].body,
            "Target \"Liburan\" akan berakhir dalam 3 hari!"
        );
    }

    #[test]
    fn ignores_far_future_past_and_today() {
        let today = date!(2025 - 08 - 07);

        for deadline in [
            None,
            Some(date!(2025 - 09 - 01)),
            Some(today),
            Some(date!(2025 - 08 - 01)),
        ] {
            assert!(check_goal_deadlines(&[goal(deadline)], today).is_empty());
        }
    }
}

#[cfg(test)]
mod debt_due_tests {
    use time::macros::date;

    use crate::debt::{Debt, DebtStatus};

    use super::check_debt_due_dates;

    fn debt(status: DebtStatus, due_date: Option<time::Date>) -> Debt {
        Debt {
            id: 1,
            creditor: "Bank".to_owned(),
            principal: 1_000_000.0,
            amount_paid: 0.0,
            debt_date: date!(2025 - 01 - 15),
            due_date,
            memo: String::new(),
            status,
            installment_amount: None,
            installment_day: None,
            installment_months: None,
        }
    }

    #[test]
    fn reminds_on_due_day_and_up_to_three_days_ahead() {
        let today = date!(2025 - 08 - 07);

        for due in [today, date!(2025 - 08 - 08), date!(2025 - 08 - 10)] {
            let reminders = check_debt_due_dates(&[debt(DebtStatus::Active, Some(due))], today);
            assert_eq!(reminders.len(), 1, "no reminder for due date {due}");
        }
    }

    #[test]
    fn settled_or_far_debts_do_not_remind() {
        let today = date!(2025 - 08 - 07);

        assert!(
            check_debt_due_dates(&[debt(DebtStatus::Paid, Some(today))], today).is_empty()
        );
        assert!(
            check_debt_due_dates(
                &[debt(DebtStatus::Active, Some(date!(2025 - 08 - 20)))],
                today
            )
            .is_empty()
        );
        assert!(check_debt_due_dates(&[debt(DebtStatus::Active, None)], today).is_empty());
    }
}

#[cfg(test)]
mod budget_limit_tests {
    use super::check_budget_limits;

    #[test]
    fn reminds_at_ninety_percent() {
        let reminders = check_budget_limits(&[
            ("Makanan".to_owned(), 91.0),
            ("Transportasi".to_owned(), 45.0),
        ]);

        assert_eq!(reminders.len(), 1);
        assert_eq!(reminders[0].body, "Budget \"Makanan\" sudah 91% terpakai!");
    }

    #[test]
    fn overrun_budget_reports_over_one_hundred() {
        let reminders = check_budget_limits(&[("Makanan".to_owned(), 120.0)]);

        assert_eq!(reminders[0].body, "Budget \"Makanan\" sudah 120% terpakai!");
    }
}

#[cfg(test)]
mod collect_reminders_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        db::initialize,
        debt::{NewDebt, create_debt},
        goal::create_goal,
    };

    use super::collect_reminders;

    #[test]
    fn collects_across_all_checks() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let today = date!(2025 - 08 - 07);

        create_goal("Liburan", 500_000.0, Some(date!(2025 - 08 - 10)), &conn).unwrap();
        create_debt(
            NewDebt {
                creditor: "Bank".to_owned(),
                principal: 1_000_000.0,
                debt_date: date!(2025 - 01 - 15),
                due_date: Some(date!(2025 - 08 - 08)),
                memo: String::new(),
                installment_amount: None,
                installment_day: None,
                installment_months: None,
            },
            &conn,
        )
        .unwrap();

        let reminders = collect_reminders(today, &conn).unwrap();

        assert_eq!(reminders.len(), 2);
    }

    #[test]
    fn empty_store_gives_no_reminders() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        let reminders = collect_reminders(date!(2025 - 08 - 07), &conn).unwrap();

        assert!(reminders.is_empty());
    }
}
