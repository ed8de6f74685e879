//! Transaction management for income (pemasukan) and expenses (pengeluaran).
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model with its source-of-funds and bank tags
//! - Database functions for storing, querying, and managing transactions
//! - View handlers for the income and expense pages

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod form;
mod models;
mod transactions_page;

pub use core::{
    CategorisedExpense, Transaction, TransactionBuilder, create_transaction,
    create_transaction_table, get_all_transactions, get_expenses_with_category_names,
    get_transaction, get_transactions_by_kind, get_transactions_in_date_range, total_by_kind,
};
pub use create_endpoint::create_transaction_endpoint;
pub use delete_endpoint::delete_transaction_endpoint;
pub use edit_endpoint::{edit_transaction_endpoint, get_edit_transaction_page};
pub use form::get_new_transaction_page;
pub use models::{ALL_BANKS, Bank, FundSource, TransactionId, TransactionKind};
pub use transactions_page::{get_expenses_page, get_income_page};
