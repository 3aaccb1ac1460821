//! Endpoints for the logged in user's own account.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde_json::{Value, json};

use crate::{
    AppState, Error, UserID,
    user::{UserProfile, delete_user, get_user_by_id},
};

/// The state needed for the profile endpoints.
#[derive(Debug, Clone)]
pub struct ProfileState {
    /// The database connection for managing users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ProfileState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Get the profile of the user the bearer token was issued to.
///
/// A token for a deleted account yields [Error::UnknownOwner].
pub async fn get_profile(
    State(state): State<ProfileState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<Value>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let user = get_user_by_id(user_id, &connection).map_err(|error| match error {
        Error::NotFound => Error::UnknownOwner,
        error => error,
    })?;

    Ok(Json(json!({ "user": UserProfile::from(&user) })))
}

/// Delete the user's account along with all of their data.
pub async fn delete_account(
    State(state): State<ProfileState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<Value>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    delete_user(user_id, &connection).map_err(|error| match error {
        Error::NotFound => Error::UnknownOwner,
        error => error,
    })?;

    tracing::info!("Deleted user {user_id} and their data");

    Ok(Json(json!({ "message": "Account successfully deleted" })))
}
