//! Defines the traits for persisting and retrieving the domain models, and
//! the SQLite implementations of those traits.

pub mod sqlite;
mod transaction;
mod user;

pub use transaction::{SortOrder, TransactionQuery, TransactionStore, UpdateTransaction};
pub use user::{NewUser, UserStore, UserUpdate};
