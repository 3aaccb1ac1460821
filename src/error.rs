//! Defines the app level error type and its conversion into JSON error responses.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde_json::json;

use crate::{cash_flow::CashFlowKind, ledger::LedgerKind};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The email and password combination did not match a registered user.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The request did not include an `Authorization: Bearer` header.
    #[error("missing bearer token")]
    MissingToken,

    /// The bearer token could not be decoded, has been tampered with or has
    /// expired.
    #[error("invalid token")]
    InvalidToken,

    /// The token is valid but the user it was issued for no longer exists.
    #[error("the account for this token no longer exists")]
    UnknownOwner,

    /// The JSON web token could not be signed.
    ///
    /// The error string should only be logged on the server.
    #[error("could not create token: {0}")]
    TokenCreation(String),

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

    /// The string is not a valid email address.
    #[error("{0} is not a valid email address")]
    InvalidEmail(String),

    /// Another user already registered with the email address.
    #[error("a user with this email already exists")]
    DuplicateEmail,

    /// A required field was missing from the request.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// A text field was empty or only contained whitespace.
    #[error("{0} cannot be empty")]
    EmptyField(&'static str),

    /// A text field was longer than allowed.
    #[error("{field} cannot be longer than {max_length} characters")]
    FieldTooLong {
        /// The name of the offending field.
        field: &'static str,
        /// The maximum number of characters allowed.
        max_length: usize,
    },

    /// An amount of money was zero or negative.
    #[error("{0} must be a positive number")]
    NonPositiveAmount(&'static str),

    /// The category type was something other than "expense" or "income".
    #[error("type must be either 'expense' or 'income', got '{0}'")]
    InvalidCategoryType(String),

    /// The request body could not be parsed as the expected JSON object.
    #[error("could not parse the request body: {0}")]
    InvalidRequestBody(String),

    /// A payment or contribution would push a debt or goal past its target.
    #[error(
        "{} would bring the {} to {attempted}, which is more than the {} of {target}",
        .kind.entry_name(),
        .kind.accumulated_name(),
        .kind.target_name()
    )]
    LimitExceeded {
        /// Whether the ledger is a debt or a goal.
        kind: LedgerKind,
        /// The accumulated total the entry would have produced.
        attempted: Decimal,
        /// The ledger's target.
        target: Decimal,
    },

    /// A payment or contribution would make a running total too large to represent.
    #[error("the {0} would be too large to store")]
    AmountTooLarge(&'static str),

    /// A category with the same label and type already exists for the user.
    #[error("category already exists for this type")]
    DuplicateCategory,

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The debt or goal does not exist or belongs to another user.
    #[error("{} not found", .0.title())]
    LedgerNotFound(LedgerKind),

    /// The payment or contribution does not exist on the debt or goal.
    #[error("{} not found", .0.entry_title())]
    EntryNotFound(LedgerKind),

    /// The income or expense does not exist or belongs to another user.
    #[error("{} not found", .0.title())]
    CashFlowNotFound(CashFlowKind),

    /// The record was changed by another writer since it was read.
    #[error("the record was modified by another request, reload it and try again")]
    Conflict,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),
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
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.contains("category.") =>
            {
                Error::DuplicateCategory
            }
            // Code 787 occurs when a FOREIGN KEY constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, _) if sql_error.extended_code == 787 => {
                Error::UnknownOwner
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::InvalidRequestBody(rejection.body_text())
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::JSONSerializationError(error.to_string())
    }
}

impl Error {
    /// The HTTP status code the client should receive for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidCredentials | Error::MissingToken | Error::UnknownOwner => {
                StatusCode::UNAUTHORIZED
            }
            Error::InvalidToken => StatusCode::FORBIDDEN,
            Error::TooWeak(_)
            | Error::InvalidEmail(_)
            | Error::DuplicateEmail
            | Error::MissingField(_)
            | Error::EmptyField(_)
            | Error::FieldTooLong { .. }
            | Error::NonPositiveAmount(_)
            | Error::InvalidCategoryType(_)
            | Error::InvalidRequestBody(_)
            | Error::LimitExceeded { .. }
            | Error::AmountTooLarge(_)
            | Error::DuplicateCategory => StatusCode::BAD_REQUEST,
            Error::NotFound
            | Error::LedgerNotFound(_)
            | Error::EntryNotFound(_)
            | Error::CashFlowNotFound(_) => StatusCode::NOT_FOUND,
            Error::Conflict => StatusCode::CONFLICT,
            Error::TokenCreation(_)
            | Error::HashingError(_)
            | Error::SqlError(_)
            | Error::DatabaseLockError
            | Error::JSONSerializationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            // Any errors that are not handled above are not intended to be shown to the client.
            tracing::error!("An unexpected error occurred: {}", self);
            "An unexpected error occurred, check the server logs for more details.".to_owned()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, response::IntoResponse};
    use rust_decimal_macros::dec;
    use serde_json::Value;

    use crate::{Error, ledger::LedgerKind};

    async fn body_json(error: Error) -> (StatusCode, Value) {
        let response = error.into_response();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Could not get response body");

        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn limit_exceeded_is_a_bad_request_with_a_readable_message() {
        let (status, body) = body_json(Error::LimitExceeded {
            kind: LedgerKind::Debt,
            attempted: dec!(1100),
            target: dec!(1000),
        })
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"],
            "payment would bring the paid amount to 1100, which is more than the total amount of 1000"
        );
    }

    #[tokio::test]
    async fn not_found_messages_name_the_resource() {
        let (status, body) = body_json(Error::EntryNotFound(LedgerKind::Goal)).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Contribution not found");
    }

    #[tokio::test]
    async fn internal_errors_do_not_leak_details() {
        let (status, body) =
            body_json(Error::SqlError(rusqlite::Error::InvalidQuery)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let message = body["error"].as_str().unwrap();
        assert!(!message.contains("SQL"), "got {message}");
    }

    #[tokio::test]
    async fn missing_and_invalid_tokens_use_different_statuses() {
        assert_eq!(Error::MissingToken.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(Error::InvalidToken.status_code(), StatusCode::FORBIDDEN);
    }
}
