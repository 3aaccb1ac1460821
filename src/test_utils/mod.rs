#![allow(missing_docs)]

use axum::http::StatusCode;
use axum_test::{TestResponse, TestServer};
use rusqlite::Connection;
use serde_json::Value;

use crate::{
    AppState, PasswordHash, build_router,
    auth::encode_token,
    db::initialize,
    ledger::LimitPolicy,
    user::{Email, User, UserName, create_user},
};

pub(crate) const TEST_SECRET: &str = "averysecretsecret";

/// A raw password that passes the strength check.
pub(crate) const TEST_PASSWORD: &str = "asomewhatlongpassword1";

#[track_caller]
pub(crate) fn get_test_connection() -> Connection {
    let connection =
        Connection::open_in_memory().expect("Could not open in-memory SQLite database");
    initialize(&connection).expect("Could not initialize database");

    connection
}

/// Insert a user whose password is [TEST_PASSWORD], hashed with a low cost to keep tests fast.
#[track_caller]
pub(crate) fn insert_test_user(email: &str, connection: &Connection) -> User {
    create_user(
        UserName::new_unchecked("Test User"),
        Email::new_unchecked(email),
        PasswordHash::from_raw_password(TEST_PASSWORD, 4).expect("Could not hash test password"),
        connection,
    )
    .expect("Could not create test user")
}

/// A server wrapping the full router, along with the state it shares.
pub(crate) struct TestApp {
    pub server: TestServer,
    pub state: AppState,
}

impl TestApp {
    #[track_caller]
    pub fn new(limit_policy: LimitPolicy) -> Self {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        let state = AppState::new(connection, TEST_SECRET, limit_policy)
            .expect("Could not create app state");
        let server =
            TestServer::try_new(build_router(state.clone())).expect("Could not create test server.");

        Self { server, state }
    }

    /// Insert a user and return them along with a valid bearer token.
    #[track_caller]
    pub fn user_with_token(&self, email: &str) -> (User, String) {
        let user = insert_test_user(
            email,
            &self
                .state
                .db_connection
                .lock()
                .expect("Could not acquire database lock"),
        );
        let token = encode_token(
            user.id,
            self.state.token_duration,
            &self.state.jwt_keys.encoding,
        )
        .expect("Could not create token");

        (user, token)
    }
}

pub(crate) fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

/// Check the status code and return the JSON body.
#[track_caller]
pub(crate) fn assert_json(response: &TestResponse, status: StatusCode) -> Value {
    response.assert_status(status);
    response.json::<Value>()
}

/// Check the status code and that the body is a JSON error mentioning `fragment`.
#[track_caller]
pub(crate) fn assert_error(response: &TestResponse, status: StatusCode, fragment: &str) {
    let body = assert_json(response, status);
    let message = body["error"]
        .as_str()
        .unwrap_or_else(|| panic!("want an error message, got {body}"));

    assert!(
        message.contains(fragment),
        "want error containing {fragment:?}, got {message:?}"
    );
}
