//! Savings goals (target) and the contribution ledger behind them.
//!
//! A goal's `progress` is derived from its contribution history: recording,
//! editing or deleting a contribution adjusts the owning goal's progress in
//! the same database transaction, so the two can never drift apart.

mod contribution_endpoints;
mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod goals_page;

pub use contribution_endpoints::{
    contribute_endpoint, delete_contribution_endpoint, edit_contribution_endpoint,
};
pub use core::{
    Goal, GoalId, Saving, SavingId, SavingsBySource, aggregate_by_source, contribute, create_goal,
    create_goal_saving_table, create_goal_table, delete_contribution, edit_contribution,
    get_all_goals, get_goal, goal_percentage,
};
pub use create_endpoint::create_goal_endpoint;
pub use delete_endpoint::delete_goal_endpoint;
pub use edit_endpoint::{edit_goal_endpoint, get_edit_goal_page};
pub use goals_page::get_goals_page;
