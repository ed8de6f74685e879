//! Debts (hutang) and the payment ledger behind them.
//!
//! A debt's `amount_paid` and `status` are derived from its payment history.
//! Recording, editing or deleting a payment updates the debt row in the same
//! database transaction, and the status is always recomputed from the
//! amounts, never set directly: a debt is "lunas" exactly when the paid
//! amount has reached the principal.

mod core;
mod create_endpoint;
mod debts_page;
mod delete_endpoint;
mod edit_endpoint;
mod payment_endpoints;

pub use core::{
    Debt, DebtId, DebtPayment, DebtStatus, InstallmentEntry, InstallmentSummary, NewDebt,
    PaymentId, aggregate_monthly_installments, create_debt, create_debt_payment_table,
    create_debt_table, delete_payment, edit_payment, get_all_debts, get_debt, is_overdue,
    progress_percentage, record_payment, remaining_amount,
};
pub use create_endpoint::create_debt_endpoint;
pub use debts_page::get_debts_page;
pub use delete_endpoint::delete_debt_endpoint;
pub use edit_endpoint::{edit_debt_endpoint, get_edit_debt_page};
pub use payment_endpoints::{
    delete_payment_endpoint, edit_payment_endpoint, record_payment_endpoint,
};
