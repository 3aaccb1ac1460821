//! The endpoint for registering a new user.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{
    AppState, Error, PasswordHash, ValidatedPassword,
    json::JsonBody,
    user::{Email, UserName, UserProfile, create_user},
};

/// The state needed for creating a new user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// The database connection for managing users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The data for registering a new user.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct RegisterForm {
    /// The name the user goes by.
    pub name: Option<String>,
    /// The email the user will log in with.
    pub email: Option<String>,
    /// The user's password in plain text.
    pub password: Option<String>,
}

/// A route handler for creating a new user.
///
/// Responds with 201 and the new user's public profile.
///
/// # Errors
///
/// Returns a 400 error if a field is missing, the email is malformed or
/// already registered, or the password is too weak.
pub async fn register_user(
    State(state): State<RegistrationState>,
    JsonBody(form): JsonBody<RegisterForm>,
) -> Result<(StatusCode, Json<Value>), Error> {
    let name = UserName::new(form.name.as_deref().ok_or(Error::MissingField("name"))?)?;
    let email = Email::new(form.email.as_deref().ok_or(Error::MissingField("email"))?)?;
    let password = ValidatedPassword::new(
        form.password
            .as_deref()
            .ok_or(Error::MissingField("password"))?,
    )?;

    let password_hash = PasswordHash::new(password, PasswordHash::DEFAULT_COST)?;

    let user = create_user(
        name,
        email,
        password_hash,
        &*state
            .db_connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?,
    )?;

    tracing::debug!("Registered user {}", user.id);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User registered successfully",
            "user": UserProfile::from(&user),
        })),
    ))
}

#[cfg(test)]
mod register_user_tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::{
        endpoints,
        ledger::LimitPolicy,
        test_utils::{TEST_PASSWORD, TestApp, assert_error, assert_json},
    };

    #[tokio::test]
    async fn create_user_succeeds() {
        let app = TestApp::new(LimitPolicy::Reject);

        let response = app
            .server
            .post(endpoints::USERS)
            .json(&json!({ "name": "Jo", "email": "jo@bar.baz", "password": TEST_PASSWORD }))
            .await;

        let body = assert_json(&response, StatusCode::CREATED);
        assert_eq!(body["message"], "User registered successfully");
        assert_eq!(body["user"]["name"], "Jo");
        assert_eq!(body["user"]["email"], "jo@bar.baz");
    }

    #[tokio::test]
    async fn registered_user_can_log_in() {
        let app = TestApp::new(LimitPolicy::Reject);
        app.server
            .post(endpoints::USERS)
            .json(&json!({ "name": "Jo", "email": "jo@bar.baz", "password": TEST_PASSWORD }))
            .await
            .assert_status(StatusCode::CREATED);

        let response = app
            .server
            .post(endpoints::LOG_IN)
            .json(&json!({ "email": "jo@bar.baz", "password": TEST_PASSWORD }))
            .await;

        response.assert_status_ok();
    }

    #[tokio::test]
    async fn create_user_fails_with_existing_email() {
        let app = TestApp::new(LimitPolicy::Reject);
        app.user_with_token("jo@bar.baz");

        let response = app
            .server
            .post(endpoints::USERS)
            .json(&json!({ "name": "Jo", "email": "jo@bar.baz", "password": TEST_PASSWORD }))
            .await;

        assert_error(&response, StatusCode::BAD_REQUEST, "already exists");
    }

    #[tokio::test]
    async fn create_user_fails_with_weak_password() {
        let app = TestApp::new(LimitPolicy::Reject);

        let response = app
            .server
            .post(endpoints::USERS)
            .json(&json!({ "name": "Jo", "email": "jo@bar.baz", "password": "password1" }))
            .await;

        assert_error(&response, StatusCode::BAD_REQUEST, "password is too weak");
    }

    #[tokio::test]
    async fn create_user_fails_with_invalid_email() {
        let app = TestApp::new(LimitPolicy::Reject);

        let response = app
            .server
            .post(endpoints::USERS)
            .json(&json!({ "name": "Jo", "email": "jo.bar.baz", "password": TEST_PASSWORD }))
            .await;

        assert_error(&response, StatusCode::BAD_REQUEST, "not a valid email address");
    }

    #[tokio::test]
    async fn create_user_requires_name() {
        let app = TestApp::new(LimitPolicy::Reject);

        let response = app
            .server
            .post(endpoints::USERS)
            .json(&json!({ "email": "jo@bar.baz", "password": TEST_PASSWORD }))
            .await;

        assert_error(&response, StatusCode::BAD_REQUEST, "name is required");
    }
}
