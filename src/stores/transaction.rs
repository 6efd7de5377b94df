//! The interface for persisting and retrieving transactions.

use serde::Deserialize;

use crate::{
    Error,
    filter::TransactionFilter,
    models::{
        Category, Transaction, TransactionBuilder, TransactionId, TransactionType, UserId,
        deserialize_optional_amount,
    },
    pagination::PaginationParams,
};

/// The direction results are sorted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Oldest first.
    Ascending,
    /// Newest first.
    Descending,
}

/// A complete description of a transaction list query: whose transactions,
/// which of them, in what order, and which page.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionQuery {
    /// The user whose transactions to query. Queries never cross user
    /// boundaries.
    pub owner: UserId,
    /// Criteria restricting which transactions match.
    pub filter: TransactionFilter,
    /// Sort matches by creation time in this order, or leave the order
    /// unspecified when `None`.
    pub sort_created: Option<SortOrder>,
    /// Return only this page of matches, or every match when `None`.
    pub page: Option<PaginationParams>,
}

impl TransactionQuery {
    /// A query matching every transaction owned by `owner`.
    pub fn all_for(owner: UserId) -> Self {
        Self {
            owner,
            filter: TransactionFilter::default(),
            sort_created: None,
            page: None,
        }
    }
}

/// The fields of a transaction that can be changed after creation.
///
/// Unset fields keep their current value.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
pub struct UpdateTransaction {
    /// A new title.
    pub title: Option<String>,
    /// A new amount, accepted as a JSON number or a numeric string.
    #[serde(default, deserialize_with = "deserialize_optional_amount")]
    pub amount: Option<f64>,
    /// A new transaction type.
    #[serde(rename = "type")]
    pub kind: Option<TransactionType>,
    /// A new category.
    pub category: Option<Category>,
    /// A new description.
    pub description: Option<String>,
}

impl UpdateTransaction {
    /// Whether the update changes nothing.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.amount.is_none()
            && self.kind.is_none()
            && self.category.is_none()
            && self.description.is_none()
    }

    /// Check that every set field holds a valid value.
    ///
    /// # Errors
    /// This function will return an:
    /// - [Error::EmptyTitle] or [Error::TitleTooLong] for an invalid title,
    /// - [Error::NonPositiveAmount] for an invalid amount,
    /// - [Error::DescriptionTooLong] for an invalid description.
    pub fn validate(&self) -> Result<(), Error> {
        if let Some(title) = &self.title {
            crate::models::validate_title(title)?;
        }

        if let Some(amount) = self.amount {
            crate::models::validate_amount(amount)?;
        }

        if let Some(description) = &self.description {
            crate::models::validate_description(description)?;
        }

        Ok(())
    }
}

/// Manages the persistence of transactions.
pub trait TransactionStore {
    /// Insert the transaction described by `builder` and return it with its
    /// assigned ID and timestamps.
    ///
    /// # Errors
    /// This function will return an:
    /// - [Error::UserNotFound] if the builder's owner does not exist,
    /// - [Error::SqlError] if there is an unexpected SQL error.
    fn create(&mut self, builder: TransactionBuilder) -> Result<Transaction, Error>;

    /// Retrieve the transaction with `id`, restricted to those owned by
    /// `owner`.
    ///
    /// # Errors
    /// This function will return an:
    /// - [Error::TransactionNotFound] if there is no such transaction or it
    ///   belongs to a different user,
    /// - [Error::SqlError] if there is an unexpected SQL error.
    fn get(&self, id: TransactionId, owner: UserId) -> Result<Transaction, Error>;

    /// Retrieve the page of transactions described by `query` along with the
    /// total number of matches across all pages.
    ///
    /// # Errors
    /// This function will return an:
    /// - [Error::InvalidPageNumber] or [Error::InvalidPageSize] for invalid
    ///   pagination parameters,
    /// - [Error::SqlError] if there is an unexpected SQL error.
    fn get_page(&self, query: &TransactionQuery) -> Result<(Vec<Transaction>, u64), Error>;

    /// Retrieve every transaction owned by `owner`.
    ///
    /// # Errors
    /// This function will return an [Error::SqlError] if there is an
    /// unexpected SQL error.
    fn get_all(&self, owner: UserId) -> Result<Vec<Transaction>, Error>;

    /// Apply `update` to the transaction with `id` and return the updated
    /// transaction. The transaction must be owned by `owner`.
    ///
    /// # Errors
    /// This function will return an:
    /// - [Error::TransactionNotFound] if there is no such transaction or it
    ///   belongs to a different user,
    /// - [Error::SqlError] if there is an unexpected SQL error.
    fn update(
        &mut self,
        id: TransactionId,
        owner: UserId,
        update: UpdateTransaction,
    ) -> Result<Transaction, Error>;

    /// Delete the transaction with `id`, restricted to those owned by
    /// `owner`.
    ///
    /// # Errors
    /// This function will return an:
    /// - [Error::TransactionNotFound] if there is no such transaction or it
    ///   belongs to a different user,
    /// - [Error::SqlError] if there is an unexpected SQL error.
    fn delete(&mut self, id: TransactionId, owner: UserId) -> Result<(), Error>;
}
