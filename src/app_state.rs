//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use jsonwebtoken::{DecodingKey, EncodingKey};
use rusqlite::Connection;
use time::Duration;

use crate::{Error, db::initialize, ledger::LimitPolicy};

/// How long a token issued at log-in stays valid unless configured otherwise.
pub const DEFAULT_TOKEN_DURATION: Duration = Duration::days(1);

/// The keys for signing and verifying JSON web tokens, derived from one secret.
#[derive(Clone)]
pub struct JwtKeys {
    /// Signs new tokens.
    pub encoding: EncodingKey,
    /// Verifies tokens sent by clients.
    pub decoding: DecodingKey,
}

impl JwtKeys {
    /// Create the HMAC keys for `secret`.
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

impl std::fmt::Debug for JwtKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("JwtKeys(********)")
    }
}

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,

    /// The keys for signing and verifying bearer tokens.
    pub jwt_keys: JwtKeys,

    /// How long a token issued at log-in is valid for.
    pub token_duration: Duration,

    /// What to do when a payment or contribution would overshoot its target.
    pub limit_policy: LimitPolicy,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(
        db_connection: Connection,
        jwt_secret: &str,
        limit_policy: LimitPolicy,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;

        Ok(Self {
            db_connection: Arc::new(Mutex::new(db_connection)),
            jwt_keys: JwtKeys::new(jwt_secret),
            token_duration: DEFAULT_TOKEN_DURATION,
            limit_policy,
        })
    }

    /// Replace how long tokens issued at log-in are valid for.
    pub fn with_token_duration(mut self, token_duration: Duration) -> Self {
        self.token_duration = token_duration;
        self
    }
}
