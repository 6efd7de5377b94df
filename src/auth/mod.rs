//! User authentication: credential verification, session cookies and the
//! middleware that protects routes.

pub(crate) mod cookie;
mod middleware;

use email_address::EmailAddress;
use serde::Deserialize;

use crate::{Error, models::User, stores::UserStore};

pub use cookie::COOKIE_SESSION;
pub(crate) use cookie::{invalidate_auth_cookie, set_auth_cookie};
pub use middleware::auth_guard;

pub(crate) const USER_AUTHENTICATED_MESSAGE: &str = "Signed in successfully!";
pub(crate) const USER_SIGNED_OUT_MESSAGE: &str = "Signed out successfully, see you soon.";

/// The data a user submits to sign in.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Credentials {
    /// The email address the account was registered with.
    pub email: EmailAddress,
    /// The account's password.
    pub password: String,
}

/// Check `credentials` against the stored account and return the matching
/// user.
///
/// # Errors
/// This function will return an:
/// - [Error::UserNotFound] if no account is registered with the email,
/// - [Error::IncorrectPassword] if the password does not match,
/// - [Error::SignIn] if the stored hash could not be checked.
pub(crate) fn verify_credentials<U>(credentials: &Credentials, store: &U) -> Result<User, Error>
where
    U: UserStore,
{
    let user = store
        .get_by_email(&credentials.email)
        .map_err(|error| error.or_internal(Error::SignIn))?;

    let password_matches = user
        .password_hash()
        .verify(&credentials.password)
        .map_err(|error| error.or_internal(Error::SignIn))?;

    if password_matches {
        Ok(user)
    } else {
        Err(Error::IncorrectPassword)
    }
}

#[cfg(test)]
mod verify_credentials_tests {
    use rusqlite::Connection;

    use crate::{
        Error,
        auth::{Credentials, verify_credentials},
        models::PasswordHash,
        stores::{NewUser, UserStore, sqlite::create_app_state},
    };

    const TEST_COST: u32 = 4;

    fn store_with_user() -> impl UserStore {
        let connection = Connection::open_in_memory().unwrap();
        let mut state = create_app_state(connection, "nekoteterces").unwrap();

        state
            .user_store
            .create(NewUser {
                name: "Alice".to_string(),
                email: "alice@example.com".parse().unwrap(),
                password_hash: PasswordHash::from_raw_password("averysecurepassword", TEST_COST)
                    .unwrap(),
            })
            .unwrap();

        state.user_store
    }

    #[test]
    fn accepts_correct_credentials() {
        let store = store_with_user();
        let credentials = Credentials {
            email: "alice@example.com".parse().unwrap(),
            password: "averysecurepassword".to_string(),
        };

        let got = verify_credentials(&credentials, &store).unwrap();

        assert_eq!(got.name(), "Alice");
    }

    #[test]
    fn rejects_unknown_email() {
        let store = store_with_user();
        let credentials = Credentials {
            email: "nobody@example.com".parse().unwrap(),
            password: "averysecurepassword".to_string(),
        };

        let got = verify_credentials(&credentials, &store);

        assert_eq!(got, Err(Error::UserNotFound));
    }

    #[test]
    fn rejects_wrong_password() {
        let store = store_with_user();
        let credentials = Credentials {
            email: "alice@example.com".parse().unwrap(),
            password: "notherpassword".to_string(),
        };

        let got = verify_credentials(&credentials, &store);

        assert_eq!(got, Err(Error::IncorrectPassword));
    }
}
