//! The transaction service: creating, listing, updating and removing a
//! user's transactions, with the response envelopes the API returns.

use serde::{Deserialize, Deserializer, Serialize, de};
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::{
    Error,
    filter::TransactionFilter,
    models::{Category, Transaction, TransactionBuilder, TransactionId, TransactionType, UserId, deserialize_amount},
    pagination::{PageInfo, PaginationParams},
    stores::{SortOrder, TransactionQuery, TransactionStore, UpdateTransaction},
};

pub(crate) const TRANSACTION_CREATED_MESSAGE: &str = "Your transaction was registered successfully!";
pub(crate) const TRANSACTIONS_LOADED_MESSAGE: &str = "Your transactions were loaded successfully!";
pub(crate) const TRANSACTION_LOADED_MESSAGE: &str = "Transaction loaded successfully.";
pub(crate) const TRANSACTION_UPDATED_MESSAGE: &str = "The transaction was updated successfully!";
pub(crate) const TRANSACTION_REMOVED_MESSAGE: &str = "The transaction was removed successfully!";

/// The data a client submits to record a transaction.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreateTransaction {
    /// A short label for the transaction.
    pub title: String,
    /// The amount of money, accepted as a JSON number or a numeric string.
    #[serde(deserialize_with = "deserialize_amount")]
    pub amount: f64,
    /// Whether the transaction is an income or an expense.
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// The category the transaction belongs to.
    pub category: Category,
    /// An optional longer text description.
    pub description: Option<String>,
}

/// The query parameters accepted by the transaction list endpoint.
///
/// The pagination fields are inlined rather than flattened from
/// [PaginationParams] because query string deserialization cannot parse
/// numbers inside a flattened struct.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TransactionListQuery {
    /// The one-indexed page number. Defaults to the first page.
    #[serde(default = "crate::pagination::default_page")]
    pub page: u64,
    /// How many transactions to return per page. Defaults to ten.
    #[serde(default = "crate::pagination::default_limit")]
    pub limit: u64,
    /// Only list transactions of this type.
    #[serde(rename = "type")]
    pub kind: Option<TransactionType>,
    /// Only list transactions in this category.
    pub category: Option<Category>,
    /// The first day to list transactions from, as `YYYY-MM-DD`.
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub from: Option<Date>,
    /// The last day to list transactions from, as `YYYY-MM-DD`.
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub to: Option<Date>,
}

impl TransactionListQuery {
    /// The pagination parameters the query asks for.
    pub(crate) fn pagination(&self) -> PaginationParams {
        PaginationParams {
            page: self.page,
            limit: self.limit,
        }
    }

    /// Convert the query parameters into a store query for `owner`.
    ///
    /// # Errors
    /// This function will return an:
    /// - [Error::IncompleteDateRange] if only one of `from` and `to` is set,
    /// - [Error::InvalidPageNumber] or [Error::InvalidPageSize] for invalid
    ///   pagination parameters.
    pub(crate) fn into_query(self, owner: UserId) -> Result<TransactionQuery, Error> {
        let page = self.pagination();
        page.validate()?;

        let date_range = match (self.from, self.to) {
            (Some(from), Some(to)) => Some(from..=to),
            (None, None) => None,
            _ => return Err(Error::IncompleteDateRange),
        };

        Ok(TransactionQuery {
            owner,
            filter: TransactionFilter {
                kind: self.kind,
                category: self.category,
                date_range,
            },
            sort_created: Some(SortOrder::Descending),
            page: Some(page),
        })
    }
}

/// A response envelope holding a single transaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionResponse {
    /// A human readable status message.
    pub message: &'static str,
    /// The transaction the operation produced or found.
    pub transaction: Transaction,
}

/// A response envelope holding one page of transactions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionListResponse {
    /// A human readable status message.
    pub message: &'static str,
    /// The transactions on the requested page, newest first.
    pub transactions: Vec<Transaction>,
    /// Where the page sits within the full result set.
    pub pagination: PageInfo,
}

/// A response envelope holding only a status message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageResponse {
    /// A human readable status message.
    pub message: &'static str,
}

/// Record a new transaction owned by `owner`.
///
/// # Errors
/// This function will return an:
/// - [Error::EmptyTitle], [Error::TitleTooLong], [Error::NonPositiveAmount]
///   or [Error::DescriptionTooLong] for invalid input,
/// - [Error::TransactionCreate] if the transaction could not be stored.
pub fn create_transaction<T>(
    store: &mut T,
    owner: UserId,
    data: CreateTransaction,
) -> Result<TransactionResponse, Error>
where
    T: TransactionStore,
{
    let mut builder = TransactionBuilder::new(&data.title, data.amount, data.kind, data.category, owner)?;

    if let Some(description) = &data.description {
        builder = builder.description(description)?;
    }

    let transaction = store
        .create(builder)
        .map_err(|error| error.or_internal(Error::TransactionCreate))?;

    Ok(TransactionResponse {
        message: TRANSACTION_CREATED_MESSAGE,
        transaction,
    })
}

/// List the page of `owner`'s transactions described by `query`, newest
/// first.
///
/// # Errors
/// This function will return an:
/// - [Error::IncompleteDateRange], [Error::InvalidPageNumber] or
///   [Error::InvalidPageSize] for invalid query parameters,
/// - [Error::TransactionsLoad] if the transactions could not be loaded.
pub fn list_transactions<T>(
    store: &T,
    owner: UserId,
    query: TransactionListQuery,
) -> Result<TransactionListResponse, Error>
where
    T: TransactionStore,
{
    let page = query.pagination();
    let store_query = query.into_query(owner)?;

    let (transactions, total_items) = store
        .get_page(&store_query)
        .map_err(|error| error.or_internal(Error::TransactionsLoad))?;

    Ok(TransactionListResponse {
        message: TRANSACTIONS_LOADED_MESSAGE,
        transactions,
        pagination: PageInfo::new(total_items, page)?,
    })
}

/// Retrieve one of `owner`'s transactions by its ID.
///
/// # Errors
/// This function will return an:
/// - [Error::TransactionNotFound] if there is no such transaction,
/// - [Error::TransactionLoad] if the transaction could not be loaded.
pub fn get_transaction<T>(
    store: &T,
    owner: UserId,
    id: TransactionId,
) -> Result<TransactionResponse, Error>
where
    T: TransactionStore,
{
    let transaction = store
        .get(id, owner)
        .map_err(|error| error.or_internal(Error::TransactionLoad))?;

    Ok(TransactionResponse {
        message: TRANSACTION_LOADED_MESSAGE,
        transaction,
    })
}

/// Apply `update` to one of `owner`'s transactions.
///
/// # Errors
/// This function will return an:
/// - [Error::EmptyUpdate] if no fields are set,
/// - [Error::EmptyTitle], [Error::TitleTooLong], [Error::NonPositiveAmount]
///   or [Error::DescriptionTooLong] for invalid input,
/// - [Error::TransactionNotFound] if there is no such transaction,
/// - [Error::TransactionUpdate] if the transaction could not be updated.
pub fn update_transaction<T>(
    store: &mut T,
    owner: UserId,
    id: TransactionId,
    update: UpdateTransaction,
) -> Result<TransactionResponse, Error>
where
    T: TransactionStore,
{
    if update.is_empty() {
        return Err(Error::EmptyUpdate);
    }

    update.validate()?;

    let transaction = store
        .update(id, owner, update)
        .map_err(|error| error.or_internal(Error::TransactionUpdate))?;

    Ok(TransactionResponse {
        message: TRANSACTION_UPDATED_MESSAGE,
        transaction,
    })
}

/// Delete one of `owner`'s transactions by its ID.
///
/// # Errors
/// This function will return an:
/// - [Error::TransactionNotFound] if there is no such transaction,
/// - [Error::TransactionRemove] if the transaction could not be removed.
pub fn remove_transaction<T>(
    store: &mut T,
    owner: UserId,
    id: TransactionId,
) -> Result<MessageResponse, Error>
where
    T: TransactionStore,
{
    store
        .delete(id, owner)
        .map_err(|error| error.or_internal(Error::TransactionRemove))?;

    Ok(MessageResponse {
        message: TRANSACTION_REMOVED_MESSAGE,
    })
}

const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// Deserialize an optional `YYYY-MM-DD` date query parameter.
fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<Date>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(text) => Date::parse(&text, DATE_FORMAT)
            .map(Some)
            .map_err(|_| de::Error::custom(format!("invalid date: {text:?}"))),
        None => Ok(None),
    }
}

#[cfg(test)]
mod transaction_service_tests {
    use rusqlite::Connection;

    use crate::{
        Error,
        models::{Category, PasswordHash, TransactionType, User, UserId},
        pagination::PaginationParams,
        stores::{NewUser, UpdateTransaction, UserStore, sqlite::SqliteTransactionStore, sqlite::create_app_state},
        transactions::{
            CreateTransaction, TransactionListQuery, create_transaction, get_transaction,
            list_transactions, remove_transaction, update_transaction,
        },
    };

    fn get_store() -> (SqliteTransactionStore, User) {
        let connection = Connection::open_in_memory().unwrap();
        let mut state = create_app_state(connection, "nekoteterces").unwrap();

        let user = state
            .user_store
            .create(NewUser {
                name: "Alice".to_string(),
                email: "alice@example.com".parse().unwrap(),
                password_hash: PasswordHash::new_unchecked("dummy hash"),
            })
            .unwrap();

        (state.transaction_store, user)
    }

    fn groceries() -> CreateTransaction {
        CreateTransaction {
            title: "Groceries".to_string(),
            amount: 42.5,
            kind: TransactionType::Expense,
            category: Category::Food,
            description: None,
        }
    }

    fn all_query() -> TransactionListQuery {
        TransactionListQuery {
            page: 1,
            limit: 10,
            kind: None,
            category: None,
            from: None,
            to: None,
        }
    }

    #[test]
    fn create_returns_the_stored_transaction() {
        let (mut store, user) = get_store();

        let got = create_transaction(&mut store, user.id(), groceries()).unwrap();

        assert_eq!(got.transaction.title(), "Groceries");
        assert_eq!(got.transaction.amount(), 42.5);
        assert_eq!(got.transaction.description(), "");
    }

    #[test]
    fn create_rejects_a_non_positive_amount() {
        let (mut store, user) = get_store();
        let data = CreateTransaction {
            amount: -1.0,
            ..groceries()
        };

        let got = create_transaction(&mut store, user.id(), data);

        assert_eq!(got, Err(Error::NonPositiveAmount));
    }

    #[test]
    fn list_returns_pagination_metadata() {
        let (mut store, user) = get_store();
        for _ in 0..3 {
            create_transaction(&mut store, user.id(), groceries()).unwrap();
        }

        let query = TransactionListQuery {
            limit: 2,
            ..all_query()
        };
        let got = list_transactions(&store, user.id(), query).unwrap();

        assert_eq!(got.transactions.len(), 2);
        assert_eq!(got.pagination.total_items, 3);
        assert_eq!(got.pagination.total_pages, 2);
        assert_eq!(got.pagination.current_page, 1);
    }

    #[test]
    fn list_rejects_a_half_open_date_range() {
        let (store, user) = get_store();
        let query = TransactionListQuery {
            from: Some(time::macros::date!(2025 - 01 - 01)),
            ..all_query()
        };

        let got = list_transactions(&store, user.id(), query);

        assert_eq!(got, Err(Error::IncompleteDateRange));
    }

    #[test]
    fn query_parameters_deserialize_from_strings() {
        let got: TransactionListQuery = serde_json::from_str(
            r#"{"page": 2, "limit": 5, "type": "expense", "category": "food", "from": "2025-01-01", "to": "2025-01-31"}"#,
        )
        .unwrap();

        assert_eq!(got.pagination(), PaginationParams { page: 2, limit: 5 });
        assert_eq!(got.kind, Some(TransactionType::Expense));
        assert_eq!(got.category, Some(Category::Food));
        assert_eq!(got.from, Some(time::macros::date!(2025 - 01 - 01)));
        assert_eq!(got.to, Some(time::macros::date!(2025 - 01 - 31)));
    }

    #[test]
    fn get_returns_only_the_owners_transaction() {
        let (mut store, user) = get_store();
        let created = create_transaction(&mut store, user.id(), groceries()).unwrap();

        let got = get_transaction(&store, UserId::new(999), created.transaction.id());

        assert_eq!(got, Err(Error::TransactionNotFound));
    }

    #[test]
    fn update_rejects_an_empty_update() {
        let (mut store, user) = get_store();
        let created = create_transaction(&mut store, user.id(), groceries()).unwrap();

        let got = update_transaction(
            &mut store,
            user.id(),
            created.transaction.id(),
            UpdateTransaction::default(),
        );

        assert_eq!(got, Err(Error::EmptyUpdate));
    }

    #[test]
    fn update_changes_the_stored_transaction() {
        let (mut store, user) = get_store();
        let created = create_transaction(&mut store, user.id(), groceries()).unwrap();

        let got = update_transaction(
            &mut store,
            user.id(),
            created.transaction.id(),
            UpdateTransaction {
                title: Some("Weekly groceries".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(got.transaction.title(), "Weekly groceries");
        assert_eq!(got.transaction.amount(), 42.5);
    }

    #[test]
    fn remove_deletes_the_transaction() {
        let (mut store, user) = get_store();
        let created = create_transaction(&mut store, user.id(), groceries()).unwrap();

        remove_transaction(&mut store, user.id(), created.transaction.id()).unwrap();

        let got = get_transaction(&store, user.id(), created.transaction.id());
        assert_eq!(got, Err(Error::TransactionNotFound));
    }
}
