//! Action and query interfaces for the expense tracker.
//!
//! Each module provides a struct that borrows from an
//! [`ExpenseTracker`](crate::ExpenseTracker) and exposes methods returning
//! `Result<T>`. Failures are logged where they happen and the store keeps
//! its previous contents.

pub mod categories;
pub mod session;
pub mod summary;
pub mod transactions;

pub use categories::CategoryQuery;
pub use session::SessionActions;
pub use summary::{MonthlySummary, SummaryQuery};
pub use transactions::{ModalState, TransactionActions};
