//! Handles log-in requests by exchanging an email and password for a bearer token.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use jsonwebtoken::EncodingKey;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use time::Duration;

use crate::{
    AppState, Error,
    auth::encode_token,
    json::JsonBody,
    user::{Email, UserProfile, get_user_by_email},
};

/// The state needed to log in a user.
#[derive(Clone)]
pub struct LogInState {
    /// The key for signing new tokens.
    pub encoding_key: EncodingKey,
    /// How long new tokens are valid for.
    pub token_duration: Duration,
    /// The database connection for looking up users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LogInState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            encoding_key: state.jwt_keys.encoding.clone(),
            token_duration: state.token_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The credentials entered at log-in.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct LogInData {
    /// Email entered during log-in.
    pub email: Option<String>,
    /// Password entered during log-in.
    pub password: Option<String>,
}

/// Handler for log-in requests.
///
/// Responds with `{message, data: {token, user}}` on success.
///
/// # Errors
///
/// Returns [Error::InvalidCredentials] if the email is not registered or the
/// password is wrong. The two cases are indistinguishable to the client.
pub async fn post_log_in(
    State(state): State<LogInState>,
    JsonBody(credentials): JsonBody<LogInData>,
) -> Result<Json<Value>, Error> {
    let raw_email = credentials.email.ok_or(Error::MissingField("email"))?;
    let password = credentials.password.ok_or(Error::MissingField("password"))?;
    let email = Email::new(&raw_email).map_err(|_| Error::InvalidCredentials)?;

    let user = {
        let connection = state
            .db_connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;

        match get_user_by_email(&email, &connection) {
            Ok(user) => user,
            Err(Error::NotFound) => return Err(Error::InvalidCredentials),
            Err(error) => return Err(error),
        }
    };

    if !user.password_hash.verify(&password)? {
        tracing::debug!("Wrong password for user {}", user.id);
        return Err(Error::InvalidCredentials);
    }

    let token = encode_token(user.id, state.token_duration, &state.encoding_key)?;

    Ok(Json(json!({
        "message": "Logged in successfully",
        "data": {
            "token": token,
            "user": UserProfile::from(&user),
        }
    })))
}

#[cfg(test)]
mod log_in_tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use crate::{
        auth::decode_token,
        endpoints,
        ledger::LimitPolicy,
        test_utils::{TEST_PASSWORD, TestApp, assert_error, assert_json, insert_test_user},
    };

    fn app_with_user() -> TestApp {
        let app = TestApp::new(LimitPolicy::Reject);
        insert_test_user(
            "foo@bar.baz",
            &app.state.db_connection.lock().unwrap(),
        );

        app
    }

    #[tokio::test]
    async fn log_in_returns_token_for_user() {
        let app = app_with_user();

        let response = app
            .server
            .post(endpoints::LOG_IN)
            .json(&json!({ "email": "foo@bar.baz", "password": TEST_PASSWORD }))
            .await;

        let body = assert_json(&response, StatusCode::OK);
        let token = body["data"]["token"].as_str().unwrap();
        let claims = decode_token(token, &app.state.jwt_keys.decoding).unwrap();
        assert_eq!(body["data"]["user"]["id"], json!(claims.user_id));
        assert_eq!(body["data"]["user"]["email"], "foo@bar.baz");
        assert_eq!(body["data"]["user"].get("password"), None::<&Value>);
    }

    #[tokio::test]
    async fn log_in_fails_with_wrong_password() {
        let app = app_with_user();

        let response = app
            .server
            .post(endpoints::LOG_IN)
            .json(&json!({ "email": "foo@bar.baz", "password": "notmypassword" }))
            .await;

        assert_error(&response, StatusCode::UNAUTHORIZED, "invalid email or password");
    }

    #[tokio::test]
    async fn log_in_fails_with_unknown_email() {
        let app = app_with_user();

        let response = app
            .server
            .post(endpoints::LOG_IN)
            .json(&json!({ "email": "who@bar.baz", "password": TEST_PASSWORD }))
            .await;

        assert_error(&response, StatusCode::UNAUTHORIZED, "invalid email or password");
    }

    #[tokio::test]
    async fn log_in_requires_password() {
        let app = app_with_user();

        let response = app
            .server
            .post(endpoints::LOG_IN)
            .json(&json!({ "email": "foo@bar.baz" }))
            .await;

        assert_error(&response, StatusCode::BAD_REQUEST, "password is required");
    }
}
