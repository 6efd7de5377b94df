//! Implements a SQLite backed transaction store.

use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row, params_from_iter, types::Value};

use crate::{
    Error,
    models::{Category, Transaction, TransactionBuilder, TransactionId, TransactionType, UserId},
    stores::{
        TransactionStore, UpdateTransaction,
        sqlite::{CreateTable, MapRow, datetime_from_unix, unix_now},
        transaction::{SortOrder, TransactionQuery},
    },
};

const TRANSACTION_COLUMNS: &str =
    "id, title, amount, type, category, description, user_id, created_at, updated_at";

/// Stores transactions in a SQLite database.
///
/// Transactions reference the [User](crate::models::User) model, so the user
/// table must be set up in the same database.
#[derive(Debug, Clone)]
pub struct SqliteTransactionStore {
    connection: Arc<Mutex<Connection>>,
}

impl SqliteTransactionStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

impl TransactionStore for SqliteTransactionStore {
    fn create(&mut self, builder: TransactionBuilder) -> Result<Transaction, Error> {
        let connection = self
            .connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;

        let now = unix_now();
        let created_at = builder
            .created_at
            .map_or(now, |timestamp| timestamp.unix_timestamp());

        let transaction = connection
            .prepare(&format!(
                "INSERT INTO \"transaction\" (title, amount, type, category, description, user_id, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 RETURNING {TRANSACTION_COLUMNS}"
            ))?
            .query_row(
                (
                    &builder.title,
                    builder.amount,
                    builder.kind.as_str(),
                    builder.category.as_str(),
                    &builder.description,
                    builder.user_id.as_i64(),
                    created_at,
                    now,
                ),
                Self::map_row,
            )
            .map_err(|error| match error {
                // Code 787 is a FOREIGN KEY constraint failure: the owner
                // does not exist in the user table.
                rusqlite::Error::SqliteFailure(error, Some(_)) if error.extended_code == 787 => {
                    Error::UserNotFound
                }
                error => error.into(),
            })?;

        Ok(transaction)
    }

    fn get(&self, id: TransactionId, owner: UserId) -> Result<Transaction, Error> {
        self.connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?
            .prepare(&format!(
                "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" WHERE id = ?1 AND user_id = ?2"
            ))?
            .query_row((id, owner.as_i64()), Self::map_row)
            .map_err(|error| match error {
                rusqlite::Error::QueryReturnedNoRows => Error::TransactionNotFound,
                error => error.into(),
            })
    }

    fn get_page(&self, query: &TransactionQuery) -> Result<(Vec<Transaction>, u64), Error> {
        let (where_clause_parts, query_parameters) =
            query.filter.to_sql_conditions(query.owner);
        let where_clause = String::from("WHERE ") + &where_clause_parts.join(" AND ");

        let connection = self
            .connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;

        // SQLite reports COUNT as a signed integer.
        let total_items: i64 = connection
            .prepare(&format!(
                "SELECT COUNT(id) FROM \"transaction\" {where_clause}"
            ))?
            .query_row(params_from_iter(query_parameters.iter()), |row| row.get(0))?;

        let mut query_string_parts = vec![
            format!("SELECT {TRANSACTION_COLUMNS} FROM \"transaction\""),
            where_clause,
        ];

        match query.sort_created {
            Some(SortOrder::Ascending) => {
                query_string_parts.push("ORDER BY created_at ASC, id ASC".to_string())
            }
            Some(SortOrder::Descending) => {
                query_string_parts.push("ORDER BY created_at DESC, id DESC".to_string())
            }
            None => {}
        }

        if let Some(page) = query.page {
            query_string_parts.push(format!("LIMIT {} OFFSET {}", page.limit, page.offset()?));
        }

        let query_string = query_string_parts.join(" ");
        let params = params_from_iter(query_parameters.iter());

        let transactions = connection
            .prepare(&query_string)?
            .query_map(params, Self::map_row)?
            .map(|maybe_transaction| maybe_transaction.map_err(Error::SqlError))
            .collect::<Result<Vec<Transaction>, Error>>()?;

        Ok((transactions, total_items as u64))
    }

    fn get_all(&self, owner: UserId) -> Result<Vec<Transaction>, Error> {
        self.connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?
            .prepare(&format!(
                "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" WHERE user_id = ?1"
            ))?
            .query_map([owner.as_i64()], Self::map_row)?
            .map(|maybe_transaction| maybe_transaction.map_err(Error::SqlError))
            .collect()
    }

    fn update(
        &mut self,
        id: TransactionId,
        owner: UserId,
        update: UpdateTransaction,
    ) -> Result<Transaction, Error> {
        let mut set_clause_parts = vec![];
        let mut query_parameters = vec![];

        if let Some(title) = update.title {
            set_clause_parts.push(format!("title = ?{}", query_parameters.len() + 1));
            query_parameters.push(Value::Text(title.trim().to_string()));
        }

        if let Some(amount) = update.amount {
            set_clause_parts.push(format!("amount = ?{}", query_parameters.len() + 1));
            query_parameters.push(Value::Real(amount));
        }

        if let Some(kind) = update.kind {
            set_clause_parts.push(format!("type = ?{}", query_parameters.len() + 1));
            query_parameters.push(Value::Text(kind.as_str().to_string()));
        }

        if let Some(category) = update.category {
            set_clause_parts.push(format!("category = ?{}", query_parameters.len() + 1));
            query_parameters.push(Value::Text(category.as_str().to_string()));
        }

        if let Some(description) = update.description {
            set_clause_parts.push(format!("description = ?{}", query_parameters.len() + 1));
            query_parameters.push(Value::Text(description));
        }

        set_clause_parts.push(format!("updated_at = ?{}", query_parameters.len() + 1));
        query_parameters.push(Value::Integer(unix_now()));

        let query_string = format!(
            "UPDATE \"transaction\" SET {} WHERE id = ?{} AND user_id = ?{} RETURNING {TRANSACTION_COLUMNS}",
            set_clause_parts.join(", "),
            query_parameters.len() + 1,
            query_parameters.len() + 2,
        );
        query_parameters.push(Value::Integer(id));
        query_parameters.push(Value::Integer(owner.as_i64()));

        self.connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?
            .prepare(&query_string)?
            .query_row(params_from_iter(query_parameters.iter()), Self::map_row)
            .map_err(|error| match error {
                rusqlite::Error::QueryReturnedNoRows => Error::TransactionNotFound,
                error => error.into(),
            })
    }

    fn delete(&mut self, id: TransactionId, owner: UserId) -> Result<(), Error> {
        let rows_deleted = self
            .connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?
            .execute(
                "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
                (id, owner.as_i64()),
            )?;

        if rows_deleted == 0 {
            Err(Error::TransactionNotFound)
        } else {
            Ok(())
        }
    }
}

impl CreateTable for SqliteTransactionStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS \"transaction\" (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    title TEXT NOT NULL,
                    amount REAL NOT NULL,
                    type TEXT NOT NULL,
                    category TEXT NOT NULL,
                    description TEXT NOT NULL DEFAULT '',
                    user_id INTEGER NOT NULL,
                    created_at INTEGER NOT NULL,
                    updated_at INTEGER NOT NULL,
                    FOREIGN KEY(user_id) REFERENCES user(id) ON DELETE CASCADE
                    )",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SqliteTransactionStore {
    type ReturnType = Transaction;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        let id = row.get(offset)?;
        let title = row.get(offset + 1)?;
        let amount = row.get(offset + 2)?;

        let kind: String = row.get(offset + 3)?;
        let kind = TransactionType::parse(&kind).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                offset + 3,
                rusqlite::types::Type::Text,
                format!("unknown transaction type {kind:?}").into(),
            )
        })?;

        let category: String = row.get(offset + 4)?;
        let category = Category::parse(&category).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                offset + 4,
                rusqlite::types::Type::Text,
                format!("unknown category {category:?}").into(),
            )
        })?;

        let description = row.get(offset + 5)?;
        let user_id = UserId::new(row.get(offset + 6)?);
        let created_at = datetime_from_unix(offset + 7, row.get(offset + 7)?)?;
        let updated_at = datetime_from_unix(offset + 8, row.get(offset + 8)?)?;

        Ok(Transaction::new_unchecked(
            id,
            title,
            amount,
            kind,
            category,
            description,
            user_id,
            created_at,
            updated_at,
        ))
    }
}
