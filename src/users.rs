//! The user account service: registration, profile retrieval, account
//! updates and account deletion.

use email_address::EmailAddress;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Error,
    models::{PasswordHash, UserId},
    stores::{NewUser, UserStore, UserUpdate},
};

pub(crate) const USER_CREATED_MESSAGE: &str = "Your account was created successfully!";
pub(crate) const USER_LOADED_MESSAGE: &str = "User loaded successfully.";
pub(crate) const USER_UPDATED_MESSAGE: &str = "Your account was updated successfully!";
pub(crate) const USER_DELETED_MESSAGE: &str = "Your account was deleted successfully.";

/// The maximum number of characters allowed in a user's display name.
const MAX_NAME_LENGTH: usize = 50;

/// The data a client submits to register an account.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RegisterUser {
    /// The display name for the new account.
    pub name: String,
    /// The email address to register with.
    pub email: String,
    /// The password for the new account.
    pub password: String,
}

/// The data a client submits to change their account.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
pub struct UpdateUser {
    /// A new display name.
    pub name: Option<String>,
    /// A new password.
    pub password: Option<String>,
}

/// A response envelope confirming that an account was created.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegisterResponse {
    /// A human readable status message.
    pub message: &'static str,
    /// The ID assigned to the new account.
    pub id: UserId,
}

/// A response envelope holding the signed-in user's profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    /// A human readable status message.
    pub message: &'static str,
    /// The user's ID.
    pub id: UserId,
    /// The user's display name.
    pub name: String,
    /// The email address the account was registered with.
    pub email: String,
    /// When the account was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// A response envelope holding only a status message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserMessageResponse {
    /// A human readable status message.
    pub message: &'static str,
}

/// Register a new user account.
///
/// # Errors
/// This function will return an:
/// - [Error::InvalidName] if the name is empty or too long,
/// - [Error::InvalidEmail] if the email address cannot be parsed,
/// - [Error::PasswordTooShort] if the password has fewer than 8 characters,
/// - [Error::DuplicateEmail] if the email address is already registered,
/// - [Error::UserCreate] if the account could not be stored.
pub fn register_user<U>(store: &mut U, data: RegisterUser) -> Result<RegisterResponse, Error>
where
    U: UserStore,
{
    validate_name(&data.name)?;

    let email: EmailAddress = data.email.trim().parse().map_err(|_| Error::InvalidEmail)?;
    let password_hash = PasswordHash::from_raw_password(&data.password, PasswordHash::DEFAULT_COST)
        .map_err(|error| error.or_internal(Error::UserCreate))?;

    let user = store
        .create(NewUser {
            name: data.name.trim().to_string(),
            email,
            password_hash,
        })
        .map_err(|error| error.or_internal(Error::UserCreate))?;

    Ok(RegisterResponse {
        message: USER_CREATED_MESSAGE,
        id: user.id(),
    })
}

/// Load the profile of the user with `user_id`.
///
/// # Errors
/// This function will return an:
/// - [Error::UserNotFound] if there is no such user,
/// - [Error::UserLoad] if the profile could not be loaded.
pub fn get_profile<U>(store: &U, user_id: UserId) -> Result<ProfileResponse, Error>
where
    U: UserStore,
{
    let user = store
        .get(user_id)
        .map_err(|error| error.or_internal(Error::UserLoad))?;

    Ok(ProfileResponse {
        message: USER_LOADED_MESSAGE,
        id: user.id(),
        name: user.name().to_string(),
        email: user.email().to_string(),
        created_at: *user.created_at(),
    })
}

/// Apply `update` to the account of the user with `user_id`.
///
/// # Errors
/// This function will return an:
/// - [Error::EmptyUpdate] if no fields are set,
/// - [Error::InvalidName] if the new name is empty or too long,
/// - [Error::NameUnchanged] if the new name matches the current name,
/// - [Error::PasswordTooShort] if the new password has fewer than 8
///   characters,
/// - [Error::UserNotFound] if there is no such user,
/// - [Error::UserUpdate] if the account could not be updated.
pub fn update_user<U>(
    store: &mut U,
    user_id: UserId,
    update: UpdateUser,
) -> Result<UserMessageResponse, Error>
where
    U: UserStore,
{
    if update.name.is_none() && update.password.is_none() {
        return Err(Error::EmptyUpdate);
    }

    let name = match update.name {
        Some(name) => {
            validate_name(&name)?;

            let current = store
                .get(user_id)
                .map_err(|error| error.or_internal(Error::UserUpdate))?;

            if name.trim().eq_ignore_ascii_case(current.name()) {
                return Err(Error::NameUnchanged);
            }

            Some(name.trim().to_string())
        }
        None => None,
    };

    let password_hash = match update.password {
        Some(password) => Some(
            PasswordHash::from_raw_password(&password, PasswordHash::DEFAULT_COST)
                .map_err(|error| error.or_internal(Error::UserUpdate))?,
        ),
        None => None,
    };

    store
        .update(
            user_id,
            UserUpdate {
                name,
                password_hash,
            },
        )
        .map_err(|error| error.or_internal(Error::UserUpdate))?;

    Ok(UserMessageResponse {
        message: USER_UPDATED_MESSAGE,
    })
}

/// Delete the account of the user with `user_id` along with all of their
/// transactions.
///
/// # Errors
/// This function will return an:
/// - [Error::UserNotFound] if there is no such user,
/// - [Error::UserDelete] if the account could not be deleted.
pub fn delete_user<U>(store: &mut U, user_id: UserId) -> Result<UserMessageResponse, Error>
where
    U: UserStore,
{
    store
        .delete(user_id)
        .map_err(|error| error.or_internal(Error::UserDelete))?;

    Ok(UserMessageResponse {
        message: USER_DELETED_MESSAGE,
    })
}

fn validate_name(name: &str) -> Result<(), Error> {
    let name = name.trim();

    if name.is_empty() || name.chars().count() > MAX_NAME_LENGTH {
        return Err(Error::InvalidName);
    }

    Ok(())
}
