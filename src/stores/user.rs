//! The interface for persisting and retrieving user accounts.

use email_address::EmailAddress;

use crate::{
    Error,
    models::{PasswordHash, User, UserId},
};

/// The data required to create a user account.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    /// The display name chosen by the user.
    pub name: String,
    /// The email address the user signs in with.
    pub email: EmailAddress,
    /// The hash of the user's password.
    pub password_hash: PasswordHash,
}

/// The fields of a user account that can be changed after registration.
///
/// Unset fields keep their current value.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct UserUpdate {
    /// A new display name.
    pub name: Option<String>,
    /// A new password hash.
    pub password_hash: Option<PasswordHash>,
}

impl UserUpdate {
    /// Whether the update changes nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.password_hash.is_none()
    }
}

/// Manages the persistence of user accounts.
pub trait UserStore {
    /// Insert `new_user` and return the created user with its assigned ID
    /// and timestamps.
    ///
    /// # Errors
    /// This function will return an:
    /// - [Error::DuplicateEmail] if the email address is already registered,
    /// - [Error::SqlError] if there is an unexpected SQL error.
    fn create(&mut self, new_user: NewUser) -> Result<User, Error>;

    /// Retrieve the user with `id`.
    ///
    /// # Errors
    /// This function will return an:
    /// - [Error::UserNotFound] if there is no user with `id`,
    /// - [Error::SqlError] if there is an unexpected SQL error.
    fn get(&self, id: UserId) -> Result<User, Error>;

    /// Retrieve the user registered with `email`.
    ///
    /// # Errors
    /// This function will return an:
    /// - [Error::UserNotFound] if no user is registered with `email`,
    /// - [Error::SqlError] if there is an unexpected SQL error.
    fn get_by_email(&self, email: &EmailAddress) -> Result<User, Error>;

    /// Apply `update` to the user with `id` and return the updated user.
    ///
    /// # Errors
    /// This function will return an:
    /// - [Error::UserNotFound] if there is no user with `id`,
    /// - [Error::SqlError] if there is an unexpected SQL error.
    fn update(&mut self, id: UserId, update: UserUpdate) -> Result<User, Error>;

    /// Delete the user with `id` along with all of their transactions.
    ///
    /// # Errors
    /// This function will return an:
    /// - [Error::UserNotFound] if there is no user with `id`,
    /// - [Error::SqlError] if there is an unexpected SQL error.
    fn delete(&mut self, id: UserId) -> Result<(), Error>;
}
