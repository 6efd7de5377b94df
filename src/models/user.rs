//! This file defines a user of the application and its supporting types.

use std::fmt::Display;

use email_address::EmailAddress;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::models::PasswordHash;

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to
/// better compile time errors and more flexible generics that can have
/// distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(i64);

impl UserId {
    /// Wrap a raw database ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// The raw database ID.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A user of the application.
///
/// Users own transactions: deleting a user deletes all of the transactions
/// they created. To create a `User`, insert a [NewUser](crate::stores::NewUser)
/// through a [UserStore](crate::stores::UserStore).
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    id: UserId,
    name: String,
    email: EmailAddress,
    password_hash: PasswordHash,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl User {
    /// Assemble a user from its parts without validation.
    ///
    /// Intended for store implementations mapping database rows back into
    /// the domain type.
    pub fn new_unchecked(
        id: UserId,
        name: String,
        email: EmailAddress,
        password_hash: PasswordHash,
        created_at: OffsetDateTime,
        updated_at: OffsetDateTime,
    ) -> Self {
        Self {
            id,
            name,
            email,
            password_hash,
            created_at,
            updated_at,
        }
    }

    /// The user's ID in the database.
    pub fn id(&self) -> UserId {
        self.id
    }

    /// The display name chosen by the user.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The email address associated with the user.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// The user's password hash.
    pub fn password_hash(&self) -> &PasswordHash {
        &self.password_hash
    }

    /// When the account was created.
    pub fn created_at(&self) -> &OffsetDateTime {
        &self.created_at
    }

    /// When the account was last modified.
    pub fn updated_at(&self) -> &OffsetDateTime {
        &self.updated_at
    }
}
