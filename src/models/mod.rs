//! The domain models of the application.

mod password;
mod transaction;
mod user;

pub use password::PasswordHash;
pub use transaction::{
    Category, MAX_DESCRIPTION_LENGTH, MAX_TITLE_LENGTH, Transaction, TransactionBuilder,
    TransactionId, TransactionType, deserialize_amount, deserialize_optional_amount,
};
pub(crate) use transaction::{validate_amount, validate_description, validate_title};
pub use user::{User, UserId};
