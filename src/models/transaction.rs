//! This file defines the type `Transaction`, the core type of the finance
//! tracking part of the application, along with its type and category enums.

use serde::{Deserialize, Deserializer, Serialize, de};
use time::OffsetDateTime;

use crate::{Error, models::UserId};

/// An alias for the integer IDs used by transactions.
pub type TransactionId = i64;

/// The maximum number of characters allowed in a transaction title.
pub const MAX_TITLE_LENGTH: usize = 50;

/// The maximum number of characters allowed in a transaction description.
pub const MAX_DESCRIPTION_LENGTH: usize = 255;

/// Whether a transaction records money earned or money spent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money earned, e.g. a salary payment.
    Income,
    /// Money spent, e.g. a groceries purchase.
    Expense,
}

impl TransactionType {
    /// The lowercase string used for persistence and serialization.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }

    /// Parse the persisted string form, the inverse of
    /// [TransactionType::as_str].
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "income" => Some(TransactionType::Income),
            "expense" => Some(TransactionType::Expense),
            _ => None,
        }
    }
}

/// The fixed set of categories a transaction can belong to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Groceries and eating out.
    Food,
    /// Public transport, fuel, vehicle costs.
    Transport,
    /// Medical expenses.
    Health,
    /// Leisure spending.
    Entertainment,
    /// Wages and salary income.
    Salary,
    /// Everything else.
    Other,
}

impl Category {
    /// Every category in declaration order.
    ///
    /// Aggregation views that report per-category figures iterate this array
    /// so their output order is deterministic.
    pub const ALL: [Category; 6] = [
        Category::Food,
        Category::Transport,
        Category::Health,
        Category::Entertainment,
        Category::Salary,
        Category::Other,
    ];

    /// The lowercase string used for persistence and serialization.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Food => "food",
            Category::Transport => "transport",
            Category::Health => "health",
            Category::Entertainment => "entertainment",
            Category::Salary => "salary",
            Category::Other => "other",
        }
    }

    /// Parse the persisted string form, the inverse of [Category::as_str].
    pub fn parse(text: &str) -> Option<Self> {
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == text)
    }
}

/// An income or expense recorded by a user.
///
/// To create a new `Transaction`, use [Transaction::build] and insert the
/// builder through a [TransactionStore](crate::stores::TransactionStore).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    id: TransactionId,
    title: String,
    amount: f64,
    #[serde(rename = "type")]
    kind: TransactionType,
    category: Category,
    description: String,
    #[serde(skip)]
    user_id: UserId,
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    updated_at: OffsetDateTime,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder::new] for discoverability.
    ///
    /// # Errors
    /// See [TransactionBuilder::new].
    pub fn build(
        title: &str,
        amount: f64,
        kind: TransactionType,
        category: Category,
        user_id: UserId,
    ) -> Result<TransactionBuilder, Error> {
        TransactionBuilder::new(title, amount, kind, category, user_id)
    }

    /// Assemble a transaction from its parts without validation.
    ///
    /// Intended for store implementations mapping database rows back into
    /// the domain type.
    #[allow(clippy::too_many_arguments)]
    pub fn new_unchecked(
        id: TransactionId,
        title: String,
        amount: f64,
        kind: TransactionType,
        category: Category,
        description: String,
        user_id: UserId,
        created_at: OffsetDateTime,
        updated_at: OffsetDateTime,
    ) -> Self {
        Self {
            id,
            title,
            amount,
            kind,
            category,
            description,
            user_id,
            created_at,
            updated_at,
        }
    }

    /// The ID of the transaction.
    pub fn id(&self) -> TransactionId {
        self.id
    }

    /// A short label for the transaction.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The amount of money spent or earned, always positive.
    pub fn amount(&self) -> f64 {
        self.amount
    }

    /// Whether this transaction is an income or an expense.
    pub fn kind(&self) -> TransactionType {
        self.kind
    }

    /// The category the transaction belongs to.
    pub fn category(&self) -> Category {
        self.category
    }

    /// An optional longer text description, empty when not supplied.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The ID of the user that owns this transaction.
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// When the transaction was recorded.
    pub fn created_at(&self) -> &OffsetDateTime {
        &self.created_at
    }

    /// When the transaction was last modified.
    pub fn updated_at(&self) -> &OffsetDateTime {
        &self.updated_at
    }
}

/// A validated transaction that has not been assigned an ID yet.
///
/// Insert the builder through a
/// [TransactionStore](crate::stores::TransactionStore) to obtain a
/// [Transaction].
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionBuilder {
    pub(crate) title: String,
    pub(crate) amount: f64,
    pub(crate) kind: TransactionType,
    pub(crate) category: Category,
    pub(crate) description: String,
    pub(crate) user_id: UserId,
    pub(crate) created_at: Option<OffsetDateTime>,
}

impl TransactionBuilder {
    /// Create a new transaction builder, validating the title and amount.
    ///
    /// # Errors
    /// This function will return an:
    /// - [Error::EmptyTitle] if `title` is empty or whitespace,
    /// - [Error::TitleTooLong] if `title` has more than 50 characters,
    /// - [Error::NonPositiveAmount] if `amount` is zero, negative or not a
    ///   finite number.
    pub fn new(
        title: &str,
        amount: f64,
        kind: TransactionType,
        category: Category,
        user_id: UserId,
    ) -> Result<Self, Error> {
        validate_title(title)?;
        validate_amount(amount)?;

        Ok(Self {
            title: title.trim().to_string(),
            amount,
            kind,
            category,
            description: String::new(),
            user_id,
            created_at: None,
        })
    }

    /// Set the transaction description.
    ///
    /// # Errors
    /// Returns an [Error::DescriptionTooLong] if `description` has more than
    /// 255 characters.
    pub fn description(mut self, description: &str) -> Result<Self, Error> {
        validate_description(description)?;
        self.description = description.to_string();

        Ok(self)
    }

    /// Override the creation timestamp.
    ///
    /// Stores default to the current time; this is useful for seeding test
    /// data at known dates.
    pub fn created_at(mut self, created_at: OffsetDateTime) -> Self {
        self.created_at = Some(created_at);
        self
    }
}

pub(crate) fn validate_title(title: &str) -> Result<(), Error> {
    let title = title.trim();

    if title.is_empty() {
        return Err(Error::EmptyTitle);
    }

    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(Error::TitleTooLong);
    }

    Ok(())
}

pub(crate) fn validate_amount(amount: f64) -> Result<(), Error> {
    if amount.is_finite() && amount > 0.0 {
        Ok(())
    } else {
        Err(Error::NonPositiveAmount)
    }
}

pub(crate) fn validate_description(description: &str) -> Result<(), Error> {
    if description.chars().count() > MAX_DESCRIPTION_LENGTH {
        Err(Error::DescriptionTooLong)
    } else {
        Ok(())
    }
}

/// Deserialize an amount from either a JSON number or a numeric string.
///
/// Decimal database columns often round-trip through JSON as strings, so
/// `"200"` and `200` must be accepted interchangeably.
pub fn deserialize_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(f64),
        Text(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(amount) => Ok(amount),
        NumberOrString::Text(text) => text
            .trim()
            .parse::<f64>()
            .map_err(|_| de::Error::custom(format!("invalid amount: {text:?}"))),
    }
}

/// Deserialize an optional amount from a JSON number or numeric string.
///
/// A missing field deserializes to `None` through `#[serde(default)]`.
pub fn deserialize_optional_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Wrapper(#[serde(deserialize_with = "deserialize_amount")] f64);

    Option::<Wrapper>::deserialize(deserializer)
        .map(|maybe_wrapper| maybe_wrapper.map(|Wrapper(amount)| amount))
}
