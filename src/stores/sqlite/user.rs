//! Implements a SQLite backed user store.

use std::sync::{Arc, Mutex};

use email_address::EmailAddress;
use rusqlite::{Connection, Row, params_from_iter, types::Value};

use crate::{
    Error,
    models::{PasswordHash, User, UserId},
    stores::{
        NewUser, UserStore, UserUpdate,
        sqlite::{CreateTable, MapRow, datetime_from_unix, unix_now},
    },
};

const USER_COLUMNS: &str = "id, name, email, password_hash, created_at, updated_at";

/// Stores user accounts in a SQLite database.
#[derive(Debug, Clone)]
pub struct SqliteUserStore {
    connection: Arc<Mutex<Connection>>,
}

impl SqliteUserStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

impl UserStore for SqliteUserStore {
    fn create(&mut self, new_user: NewUser) -> Result<User, Error> {
        let now = unix_now();

        self.connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?
            .prepare(&format!(
                "INSERT INTO user (name, email, password_hash, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 RETURNING {USER_COLUMNS}"
            ))?
            .query_row(
                (
                    &new_user.name,
                    new_user.email.as_str(),
                    new_user.password_hash.as_str(),
                    now,
                    now,
                ),
                Self::map_row,
            )
            .map_err(|error| match error {
                // Code 2067 is a UNIQUE constraint failure: the email
                // address is already registered.
                rusqlite::Error::SqliteFailure(error, Some(_)) if error.extended_code == 2067 => {
                    Error::DuplicateEmail
                }
                error => error.into(),
            })
    }

    fn get(&self, id: UserId) -> Result<User, Error> {
        self.connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?
            .prepare(&format!("SELECT {USER_COLUMNS} FROM user WHERE id = ?1"))?
            .query_row([id.as_i64()], Self::map_row)
            .map_err(|error| match error {
                rusqlite::Error::QueryReturnedNoRows => Error::UserNotFound,
                error => error.into(),
            })
    }

    fn get_by_email(&self, email: &EmailAddress) -> Result<User, Error> {
        self.connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?
            .prepare(&format!("SELECT {USER_COLUMNS} FROM user WHERE email = ?1"))?
            .query_row([email.as_str()], Self::map_row)
            .map_err(|error| match error {
                rusqlite::Error::QueryReturnedNoRows => Error::UserNotFound,
                error => error.into(),
            })
    }

    fn update(&mut self, id: UserId, update: UserUpdate) -> Result<User, Error> {
        let mut set_clause_parts = vec![];
        let mut query_parameters = vec![];

        if let Some(name) = update.name {
            set_clause_parts.push(format!("name = ?{}", query_parameters.len() + 1));
            query_parameters.push(Value::Text(name));
        }

        if let Some(password_hash) = update.password_hash {
            set_clause_parts.push(format!("password_hash = ?{}", query_parameters.len() + 1));
            query_parameters.push(Value::Text(password_hash.as_str().to_string()));
        }

        set_clause_parts.push(format!("updated_at = ?{}", query_parameters.len() + 1));
        query_parameters.push(Value::Integer(unix_now()));

        let query_string = format!(
            "UPDATE user SET {} WHERE id = ?{} RETURNING {USER_COLUMNS}",
            set_clause_parts.join(", "),
            query_parameters.len() + 1,
        );
        query_parameters.push(Value::Integer(id.as_i64()));

        self.connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?
            .prepare(&query_string)?
            .query_row(params_from_iter(query_parameters.iter()), Self::map_row)
            .map_err(|error| match error {
                rusqlite::Error::QueryReturnedNoRows => Error::UserNotFound,
                error => error.into(),
            })
    }

    fn delete(&mut self, id: UserId) -> Result<(), Error> {
        let rows_deleted = self
            .connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?
            .execute("DELETE FROM user WHERE id = ?1", [id.as_i64()])?;

        if rows_deleted == 0 {
            Err(Error::UserNotFound)
        } else {
            Ok(())
        }
    }
}

impl CreateTable for SqliteUserStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS user (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL,
                    email TEXT UNIQUE NOT NULL,
                    password_hash TEXT NOT NULL,
                    created_at INTEGER NOT NULL,
                    updated_at INTEGER NOT NULL
                    )",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SqliteUserStore {
    type ReturnType = User;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        let id = UserId::new(row.get(offset)?);
        let name = row.get(offset + 1)?;

        let email: String = row.get(offset + 2)?;
        let email = email.parse().map_err(|error| {
            rusqlite::Error::FromSqlConversionFailure(
                offset + 2,
                rusqlite::types::Type::Text,
                Box::new(error),
            )
        })?;

        let password_hash: String = row.get(offset + 3)?;
        let password_hash = PasswordHash::new_unchecked(&password_hash);
        let created_at = datetime_from_unix(offset + 4, row.get(offset + 4)?)?;
        let updated_at = datetime_from_unix(offset + 5, row.get(offset + 5)?)?;

        Ok(User::new_unchecked(
            id,
            name,
            email,
            password_hash,
            created_at,
            updated_at,
        ))
    }
}

#[cfg(test)]
mod sqlite_user_store_tests {
    use rusqlite::Connection;

    use crate::{
        Error,
        models::PasswordHash,
        stores::{
            NewUser, TransactionStore, UserStore, UserUpdate,
            sqlite::{SqlAppState, create_app_state},
        },
    };

    fn get_app_state() -> SqlAppState {
        let connection = Connection::open_in_memory().unwrap();
        create_app_state(connection, "nekoteterces").unwrap()
    }

    fn new_user(name: &str, email: &str) -> NewUser {
        NewUser {
            name: name.to_string(),
            email: email.parse().unwrap(),
            password_hash: PasswordHash::new_unchecked("dummy hash"),
        }
    }

    #[test]
    fn create_succeeds() {
        let mut state = get_app_state();

        let got = state
            .user_store
            .create(new_user("Alice", "alice@example.com"))
            .unwrap();

        assert_eq!(got.name(), "Alice");
        assert_eq!(got.email().as_str(), "alice@example.com");
    }

    #[test]
    fn create_fails_on_duplicate_email() {
        let mut state = get_app_state();
        state
            .user_store
            .create(new_user("Alice", "alice@example.com"))
            .unwrap();

        let got = state
            .user_store
            .create(new_user("Other Alice", "alice@example.com"));

        assert_eq!(got, Err(Error::DuplicateEmail));
    }

    #[test]
    fn get_by_email_returns_the_created_user() {
        let mut state = get_app_state();
        let want = state
            .user_store
            .create(new_user("Alice", "alice@example.com"))
            .unwrap();

        let got = state
            .user_store
            .get_by_email(&"alice@example.com".parse().unwrap());

        assert_eq!(got, Ok(want));
    }

    #[test]
    fn get_by_email_fails_on_unknown_email() {
        let state = get_app_state();

        let got = state
            .user_store
            .get_by_email(&"nobody@example.com".parse().unwrap());

        assert_eq!(got, Err(Error::UserNotFound));
    }

    #[test]
    fn update_changes_the_name() {
        let mut state = get_app_state();
        let user = state
            .user_store
            .create(new_user("Alice", "alice@example.com"))
            .unwrap();

        let got = state
            .user_store
            .update(
                user.id(),
                UserUpdate {
                    name: Some("Alicia".to_string()),
                    password_hash: None,
                },
            )
            .unwrap();

        assert_eq!(got.name(), "Alicia");
        assert_eq!(got.email(), user.email());
    }

    #[test]
    fn delete_removes_the_user_and_their_transactions() {
        let mut state = get_app_state();
        let user = state
            .user_store
            .create(new_user("Alice", "alice@example.com"))
            .unwrap();
        let transaction = state
            .transaction_store
            .create(
                crate::models::Transaction::build(
                    "Groceries",
                    42.5,
                    crate::models::TransactionType::Expense,
                    crate::models::Category::Food,
                    user.id(),
                )
                .unwrap(),
            )
            .unwrap();

        state.user_store.delete(user.id()).unwrap();

        assert_eq!(state.user_store.get(user.id()), Err(Error::UserNotFound));
        assert_eq!(
            state.transaction_store.get(transaction.id(), user.id()),
            Err(Error::TransactionNotFound),
            "deleting a user should cascade to their transactions"
        );
    }

    #[test]
    fn delete_fails_on_unknown_id() {
        let mut state = get_app_state();

        let got = state.user_store.delete(crate::models::UserId::new(999));

        assert_eq!(got, Err(Error::UserNotFound));
    }
}
