//! Expense Tracker is a web app for keeping notes, logging income and
//! expenses, tracking account balances and viewing summaries of where the
//! money goes.
//!
//! This library provides a REST API that directly serves HTML pages, plus a
//! handful of JSON and PNG endpoints used by the pages' scripts.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde::Serialize;
use tokio::signal;

mod account;
mod aggregation;
mod alert;
mod app_state;
mod auth;
mod chart;
mod dashboard;
mod database_id;
mod db;
mod endpoints;
mod expense;
mod flash;
mod html;
mod internal_server_error;
mod landing;
mod logging;
mod navigation;
mod not_found;
mod note;
mod profile;
mod report;
mod routing;
mod timezone;

#[cfg(test)]
mod test_utils;

pub use account::{Account, AccountId, NewAccount, create_account};
pub use app_state::AppState;
pub use auth::{
    PasswordHash, User, UserID, ValidatedPassword, create_user, get_user_by_email, update_password,
};
pub use db::{initialize as initialize_db, unit_of_work};
pub use expense::{ExpenseType, NewExpense, create_expense};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use note::{NoteText, create_note};
pub use routing::build_router;
pub use timezone::get_local_offset;

use crate::{alert::Alert, internal_server_error::InternalServerError, not_found::NotFound};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
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

/// The broad categories of [Error] that callers report back to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The client sent a missing or invalid field.
    Validation,
    /// The client tried to access a record owned by another user.
    Authorization,
    /// The client referenced a record that does not exist.
    NotFound,
    /// The database failed to complete the unit of work.
    Persistence,
    /// Anything else that went wrong on the server.
    Internal,
}

impl ErrorKind {
    /// The HTTP status code that best describes this kind of error.
    pub fn status_code(self) -> StatusCode {
        match self {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Authorization => StatusCode::FORBIDDEN,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Persistence | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The email and password combination did not match a registered user.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The auth token cookie is missing from the cookie jar in the request.
    #[error("no cookies in the cookie jar :(")]
    CookieMissing,

    /// The auth token cookie has passed its expiry date.
    #[error("the auth token has expired")]
    TokenExpired,

    /// There was an error parsing the auth token or creating the new
    /// expiry date time.
    #[error("could not read the auth token: {0}")]
    InvalidToken(String),

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The email address could not be parsed.
    #[error("\"{0}\" is not a valid email address")]
    InvalidEmail(String),

    /// A user with the email address is already registered.
    #[error("Email already exists.")]
    DuplicateEmail,

    /// The first name given at sign-up is too short.
    #[error("First name must be greater than 1 character.")]
    FirstNameTooShort,

    /// A required form field was missing or blank.
    #[error("Please fill in all required fields!")]
    MissingRequiredFields,

    /// The amount could not be parsed as a finite number.
    #[error("Invalid amount!")]
    InvalidAmount(String),

    /// The amount was zero or negative.
    #[error("Amount must be greater than 0!")]
    NonPositiveAmount(f64),

    /// The transaction type was not one of "Income" or "Expense".
    #[error("\"{0}\" is not a valid transaction type, expected \"Income\" or \"Expense\"")]
    InvalidExpenseType(String),

    /// The note text was empty.
    #[error("Note is too short!")]
    EmptyNote,

    /// The account name was empty.
    #[error("Account name cannot be empty!")]
    EmptyAccountName,

    /// The account balance could not be parsed as a finite number.
    #[error("Invalid balance!")]
    InvalidBalance(String),

    /// The record is owned by a different user.
    #[error("Unauthorized!")]
    Unauthorized,

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// The chart image could not be drawn or encoded.
    #[error("could not render chart: {0}")]
    ChartRenderingError(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("user.email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl Error {
    /// Classify the error for reporting to the client.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidCredentials
            | Error::TooWeak(_)
            | Error::InvalidEmail(_)
            | Error::DuplicateEmail
            | Error::FirstNameTooShort
            | Error::MissingRequiredFields
            | Error::InvalidAmount(_)
            | Error::NonPositiveAmount(_)
            | Error::InvalidExpenseType(_)
            | Error::EmptyNote
            | Error::EmptyAccountName
            | Error::InvalidBalance(_) => ErrorKind::Validation,
            Error::CookieMissing
            | Error::TokenExpired
            | Error::InvalidToken(_)
            | Error::Unauthorized => ErrorKind::Authorization,
            Error::NotFound => ErrorKind::NotFound,
            Error::SqlError(_) | Error::DatabaseLockError => ErrorKind::Persistence,
            Error::HashingError(_)
            | Error::InvalidTimezoneError(_)
            | Error::JSONSerializationError(_)
            | Error::ChartRenderingError(_) => ErrorKind::Internal,
        }
    }

    /// The message to show the user when `action` (e.g., "adding expense")
    /// failed with this error.
    ///
    /// Persistence failures include the raw error text, everything else uses
    /// the error's display string.
    pub(crate) fn user_message(&self, action: &str) -> String {
        match self.kind() {
            ErrorKind::Persistence => format!("Error {action}: {self}"),
            ErrorKind::Internal => format!(
                "Something went wrong while {action}, check the server logs for more details."
            ),
            _ => self.to_string(),
        }
    }

    fn into_alert_response(self) -> Response {
        let status = self.kind().status_code();
        let alert = match self {
            Error::NotFound => Alert::Error {
                message: "Not found".to_owned(),
                details: "The record could not be found. \
                    Try refreshing the page to see if it has already been deleted."
                    .to_owned(),
            },
            Error::Unauthorized => Alert::Error {
                message: "Unauthorized".to_owned(),
                details: "You can only change records that belong to you.".to_owned(),
            },
            Error::InvalidTimezoneError(timezone) => Alert::Error {
                message: "Invalid Timezone Settings".to_owned(),
                details: format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            },
            error if error.kind() == ErrorKind::Validation => Alert::ErrorSimple {
                message: error.to_string(),
            },
            error => {
                tracing::error!("An unexpected error occurred: {error}");
                Alert::Error {
                    message: "Something went wrong".to_owned(),
                    details: "An unexpected error occurred, check the server logs for more details."
                        .to_owned(),
                }
            }
        };

        (status, alert).into_response()
    }

    fn into_json_response(self) -> Response {
        (self.kind().status_code(), Json(Acknowledgement::failure())).into_response()
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => NotFound.into_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::DatabaseLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

/// The JSON body returned by the endpoints called from page scripts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, serde::Deserialize)]
pub struct Acknowledgement {
    /// Whether the request changed the database.
    pub success: bool,
}

impl Acknowledgement {
    /// An acknowledgement for a request that succeeded.
    pub fn success() -> Self {
        Self { success: true }
    }

    /// An acknowledgement for a request that failed.
    pub fn failure() -> Self {
        Self { success: false }
    }
}
