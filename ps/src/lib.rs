//! PantryStore - SQLite-backed household inventory store
//!
//! Persists the four record families pantryd works with:
//!
//! - **Items**: stock levels, restock thresholds, consumption rates
//! - **Preferences**: named household settings (budget, vendor choice, ...)
//! - **Orders**: vendor orders placed on the household's behalf
//! - **Cycles**: summaries of autonomous restock-check runs
//!
//! Every public operation maps to a single SQLite statement, so each call is
//! atomic on its own; the store never holds a transaction open across calls.

pub mod cli;
pub mod records;
pub mod store;

pub use records::{CycleRecord, Item, OrderRecord, OrderStatus, Preference};
pub use store::Store;
