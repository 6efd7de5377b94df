//! Fintrack is a multi-tenant backend for tracking personal income and
//! expenses.
//!
//! This library provides a JSON REST API for user registration, transaction
//! CRUD, and a dashboard that aggregates a user's transactions into balance,
//! monthly-balance, and category-breakdown views. Every read and write is
//! scoped to the authenticated user.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod app_state;
mod auth;
pub mod dashboard;
pub mod endpoints;
mod filter;
pub mod models;
mod pagination;
mod routes;
pub mod stores;
pub mod summary;
pub mod transactions;
pub mod users;

pub use app_state::{AppState, AuthState, DashboardState, TransactionState, UserState};
pub use auth::{COOKIE_SESSION, Credentials};
pub use dashboard::{
    BalanceResponse, CategoryBreakdownResponse, LastTransactionsResponse, MonthlyBalanceResponse,
};
pub use filter::TransactionFilter;
pub use models::{
    Category, PasswordHash, Transaction, TransactionBuilder, TransactionId, TransactionType, User,
    UserId,
};
pub use pagination::{PageInfo, PaginationParams};
pub use routes::build_router;
pub use stores::{
    NewUser, SortOrder, TransactionQuery, TransactionStore, UpdateTransaction, UserStore,
    UserUpdate,
    sqlite::{SqlAppState, SqliteTransactionStore, SqliteUserStore, create_app_state, initialize},
};
pub use summary::{CategoryExpenses, MonthlyBalance, Summary};

/// An async task that waits for either the ctrl+c or terminate signal,
/// whichever comes first, and then signals the server to shut down
/// gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The broad class an [Error] belongs to.
///
/// User-facing classes pass through service error boundaries untouched,
/// while [ErrorKind::Internal] errors are masked with an operation-specific
/// message before they reach the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The requested resource does not exist.
    NotFound,
    /// The request was malformed or violated a domain constraint.
    BadRequest,
    /// The request conflicts with existing state, e.g. a duplicate email.
    Conflict,
    /// The caller is not authenticated or supplied bad credentials.
    Unauthorized,
    /// An unexpected failure that must never be shown to the client as-is.
    Internal,
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The requested resource was not found.
    #[error("The requested resource could not be found.")]
    NotFound,

    /// There is no transaction with the given ID owned by the caller.
    #[error("The transaction could not be found.")]
    TransactionNotFound,

    /// There is no user matching the given ID or email address.
    #[error("The user could not be found.")]
    UserNotFound,

    /// The password did not match the stored hash during log in.
    #[error("Incorrect password.")]
    IncorrectPassword,

    /// The request is missing a valid session cookie.
    #[error("Authentication is required to access this resource.")]
    Unauthorized,

    /// A partial update was requested with no fields to change.
    #[error("No data was provided for the update.")]
    EmptyUpdate,

    /// The new display name matches the current one.
    #[error("The new display name is the same as the current one.")]
    NameUnchanged,

    /// A transaction title was empty.
    #[error("The transaction title must not be empty.")]
    EmptyTitle,

    /// A transaction title exceeded the maximum length.
    #[error("The transaction title must be at most 50 characters.")]
    TitleTooLong,

    /// A transaction amount was zero or negative.
    #[error("The transaction amount must be a positive value.")]
    NonPositiveAmount,

    /// A transaction description exceeded the maximum length.
    #[error("The transaction description must be at most 255 characters.")]
    DescriptionTooLong,

    /// A user display name was empty or exceeded the maximum length.
    #[error("The display name must be between 1 and 50 characters.")]
    InvalidName,

    /// The email address could not be parsed.
    #[error("The email address is invalid.")]
    InvalidEmail,

    /// The password did not meet the minimum length requirement.
    #[error("The password must be at least 8 characters.")]
    PasswordTooShort,

    /// The requested page number was zero.
    #[error("The page number must be a positive number.")]
    InvalidPageNumber,

    /// The requested page size was zero.
    #[error("Items per page must be a positive number.")]
    InvalidPageSize,

    /// A date filter supplied only one end of the range.
    #[error("Both the from and to dates are required for a date filter.")]
    IncompleteDateRange,

    /// The email used to register is already taken.
    #[error("The email address is already in use.")]
    DuplicateEmail,

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the client this error is replaced with a
    /// general internal error message.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock.
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// The balance view could not be computed.
    #[error("Failed to load your balance information, please try again.")]
    BalanceLoad,

    /// The monthly balance view could not be computed.
    #[error("Failed to load your monthly balance, please try again.")]
    MonthlyBalanceLoad,

    /// The expenses-by-category view could not be computed.
    #[error("Failed to load your expenses by category, please try again.")]
    CategoryBreakdownLoad,

    /// The latest transactions view could not be computed.
    #[error("Failed to load your latest transactions, please try again.")]
    LastTransactionsLoad,

    /// A transaction list query failed unexpectedly.
    #[error("Failed to load your transactions, please try again.")]
    TransactionsLoad,

    /// A single transaction fetch failed unexpectedly.
    #[error("Failed to load the transaction, please try again.")]
    TransactionLoad,

    /// A transaction create failed unexpectedly.
    #[error("Failed to register the transaction, please try again.")]
    TransactionCreate,

    /// A transaction update failed unexpectedly.
    #[error("Failed to update the transaction, please try again.")]
    TransactionUpdate,

    /// A transaction delete failed unexpectedly.
    #[error("Failed to remove the transaction, please try again.")]
    TransactionRemove,

    /// A user registration failed unexpectedly.
    #[error("Failed to create your account, please try again.")]
    UserCreate,

    /// A user profile fetch failed unexpectedly.
    #[error("Failed to load your account, please try again.")]
    UserLoad,

    /// A user profile update failed unexpectedly.
    #[error("Failed to update your account, please try again.")]
    UserUpdate,

    /// A user delete failed unexpectedly.
    #[error("Failed to delete your account, please try again.")]
    UserDelete,

    /// A log in attempt failed unexpectedly.
    #[error("Failed to sign in, please try again.")]
    SignIn,
}

impl Error {
    /// The broad class this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotFound | Error::TransactionNotFound | Error::UserNotFound => {
                ErrorKind::NotFound
            }
            Error::EmptyUpdate
            | Error::NameUnchanged
            | Error::EmptyTitle
            | Error::TitleTooLong
            | Error::NonPositiveAmount
            | Error::DescriptionTooLong
            | Error::InvalidName
            | Error::InvalidEmail
            | Error::PasswordTooShort
            | Error::InvalidPageNumber
            | Error::InvalidPageSize
            | Error::IncompleteDateRange => ErrorKind::BadRequest,
            Error::DuplicateEmail => ErrorKind::Conflict,
            Error::IncorrectPassword | Error::Unauthorized => ErrorKind::Unauthorized,
            _ => ErrorKind::Internal,
        }
    }

    /// Whether this error is meant to be shown to the client unchanged.
    ///
    /// Service error boundaries re-raise user-facing errors and replace
    /// everything else with an operation-specific internal error.
    pub fn is_user_facing(&self) -> bool {
        self.kind() != ErrorKind::Internal
    }

    /// Pass the error through if it is user facing, otherwise log it and
    /// substitute `replacement`.
    ///
    /// `replacement` should be one of the operation-specific internal error
    /// variants so the client learns which operation failed without seeing
    /// the underlying error detail.
    pub(crate) fn or_internal(self, replacement: Error) -> Error {
        if self.is_user_facing() {
            self
        } else {
            tracing::error!("An unexpected error occurred: {self}");
            replacement
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.contains("email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => Error::SqlError(error),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match self.kind() {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Raw SQL/hashing/lock errors must never reach the client. The
        // service boundaries normally replace them, so hitting this branch
        // means an error escaped a boundary.
        let message = match self {
            Error::SqlError(_) | Error::HashingError(_) | Error::DatabaseLockError => {
                tracing::error!("An unmasked internal error reached the response layer: {self}");
                "An unexpected server error occurred, please try again.".to_owned()
            }
            error => error.to_string(),
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

#[cfg(test)]
mod error_tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::{Error, ErrorKind};

    #[test]
    fn not_found_errors_are_user_facing() {
        assert!(Error::TransactionNotFound.is_user_facing());
        assert!(Error::UserNotFound.is_user_facing());
        assert_eq!(Error::TransactionNotFound.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn internal_errors_are_masked_by_or_internal() {
        let error = Error::SqlError(rusqlite::Error::QueryReturnedNoRows);

        let got = error.or_internal(Error::BalanceLoad);

        assert_eq!(got, Error::BalanceLoad);
    }

    #[test]
    fn user_facing_errors_pass_through_or_internal() {
        let got = Error::TransactionNotFound.or_internal(Error::BalanceLoad);

        assert_eq!(got, Error::TransactionNotFound);
    }

    #[test]
    fn query_returned_no_rows_maps_to_not_found() {
        let got: Error = rusqlite::Error::QueryReturnedNoRows.into();

        assert_eq!(got, Error::NotFound);
    }

    #[test]
    fn sql_error_renders_as_internal_server_error() {
        let response =
            Error::SqlError(rusqlite::Error::InvalidQuery).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn duplicate_email_is_a_conflict() {
        assert_eq!(Error::DuplicateEmail.kind(), ErrorKind::Conflict);
    }
}
