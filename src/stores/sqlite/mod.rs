//! SQLite backed implementations of the store traits.

mod transaction;
mod user;

use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row};
use time::OffsetDateTime;

use crate::{Error, app_state::AppState};

pub use transaction::SqliteTransactionStore;
pub use user::SqliteUserStore;

/// The app state for SQLite backed stores.
pub type SqlAppState = AppState<SqliteTransactionStore, SqliteUserStore>;

/// A type that has a corresponding table in a SQLite database.
pub(crate) trait CreateTable {
    /// Create the table for the implementing type.
    ///
    /// # Errors
    /// Returns an error if the table could not be created.
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error>;
}

/// A type that can be mapped from a SQLite database row.
pub(crate) trait MapRow {
    /// The type produced from a row.
    type ReturnType;

    /// Map a row to `ReturnType`, assuming the columns start at index zero.
    ///
    /// # Errors
    /// Returns an error if a column is missing or holds an unexpected value.
    fn map_row(row: &Row) -> Result<Self::ReturnType, rusqlite::Error> {
        Self::map_row_with_offset(row, 0)
    }

    /// Map a row to `ReturnType` with the columns starting at `offset`.
    ///
    /// # Errors
    /// Returns an error if a column is missing or holds an unexpected value.
    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error>;
}

/// Create the tables the application needs in the database, if they do not
/// exist already.
///
/// # Errors
/// Returns an [Error::SqlError] if a table could not be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction = connection.unchecked_transaction()?;
    SqliteUserStore::create_table(&transaction)?;
    SqliteTransactionStore::create_table(&transaction)?;
    transaction.commit()?;

    Ok(())
}

/// Initialize `connection` and assemble the SQLite backed app state.
///
/// # Errors
/// Returns an [Error::SqlError] if the database could not be initialized.
pub fn create_app_state(connection: Connection, cookie_secret: &str) -> Result<SqlAppState, Error> {
    initialize(&connection)?;

    let connection = Arc::new(Mutex::new(connection));
    let transaction_store = SqliteTransactionStore::new(connection.clone());
    let user_store = SqliteUserStore::new(connection);

    Ok(AppState::new(cookie_secret, transaction_store, user_store))
}

/// Convert a unix timestamp column into an [OffsetDateTime].
pub(crate) fn datetime_from_unix(
    column_index: usize,
    timestamp: i64,
) -> Result<OffsetDateTime, rusqlite::Error> {
    OffsetDateTime::from_unix_timestamp(timestamp).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(
            column_index,
            rusqlite::types::Type::Integer,
            Box::new(error),
        )
    })
}

/// The current time in whole unix seconds.
///
/// Timestamps are stored at second precision so the values written to the
/// database round-trip exactly.
pub(crate) fn unix_now() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}
