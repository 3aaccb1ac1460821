//! Route handlers shared by debts and goals.
//!
//! Each handler is generic over a [LedgerResource] and is registered once for
//! [Debts](crate::ledger::Debts) and once for [Goals](crate::ledger::Goals).

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json, Router,
    extract::{FromRef, Path, State},
    http::StatusCode,
    routing::{get, post, put},
};
use rusqlite::Connection;
use serde_json::{Map, Value};

use crate::{
    AppState, Error, UserID,
    database_id::DatabaseId,
    json::JsonBody,
    ledger::{
        EntryForm, Ledger, LedgerForm, LedgerPatch, LimitPolicy,
        operations::{
            add_entry, create_ledger, delete_entry, delete_ledger, edit_entry, get_ledger,
            list_ledgers, update_ledger,
        },
        resource::LedgerResource,
    },
};

/// The state needed by the debt and goal handlers.
#[derive(Debug, Clone)]
pub struct LedgerState {
    /// The database connection for managing ledgers.
    pub db_connection: Arc<Mutex<Connection>>,
    /// Whether entries may overshoot a ledger's target.
    pub limit_policy: LimitPolicy,
}

impl FromRef<AppState> for LedgerState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            limit_policy: state.limit_policy,
        }
    }
}

/// The routes for one kind of ledger. Callers are expected to add the auth layer.
pub fn ledger_routes<R: LedgerResource>() -> Router<AppState> {
    Router::new()
        .route(
            R::COLLECTION_PATH,
            post(create_ledger_endpoint::<R>).get(list_ledgers_endpoint::<R>),
        )
        .route(
            R::ITEM_PATH,
            get(get_ledger_endpoint::<R>)
                .put(update_ledger_endpoint::<R>)
                .delete(delete_ledger_endpoint::<R>),
        )
        .route(R::ENTRIES_PATH, post(add_entry_endpoint::<R>))
        .route(
            R::ENTRY_PATH,
            put(edit_entry_endpoint::<R>).delete(delete_entry_endpoint::<R>),
        )
}

fn respond_with<R: LedgerResource>(message: String, ledger: Ledger) -> Result<Json<Value>, Error> {
    let mut body = Map::new();
    body.insert("message".to_owned(), Value::String(message));
    body.insert(
        R::ITEM_KEY.to_owned(),
        serde_json::to_value(R::View::from(ledger))?,
    );

    Ok(Json(Value::Object(body)))
}

fn lock(state: &LedgerState) -> Result<std::sync::MutexGuard<'_, Connection>, Error> {
    state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)
}

/// A route handler for creating a new debt or goal.
pub async fn create_ledger_endpoint<R: LedgerResource>(
    State(state): State<LedgerState>,
    Extension(user_id): Extension<UserID>,
    JsonBody(body): JsonBody<R::Body>,
) -> Result<(StatusCode, Json<Value>), Error> {
    let form = LedgerForm::parse(R::KIND, body.into())?;
    let ledger = create_ledger(user_id, R::KIND, form, &*lock(&state)?)?;

    let message = format!("{} successfully created", R::KIND.title());
    Ok((StatusCode::CREATED, respond_with::<R>(message, ledger)?))
}

/// A route handler for listing the user's debts or goals.
pub async fn list_ledgers_endpoint<R: LedgerResource>(
    State(state): State<LedgerState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<Vec<R::View>>, Error> {
    let ledgers = list_ledgers(user_id, R::KIND, &*lock(&state)?)?;

    Ok(Json(ledgers.into_iter().map(R::View::from).collect()))
}

/// A route handler for getting a single debt or goal.
pub async fn get_ledger_endpoint<R: LedgerResource>(
    State(state): State<LedgerState>,
    Extension(user_id): Extension<UserID>,
    Path(ledger_id): Path<DatabaseId>,
) -> Result<Json<R::View>, Error> {
    let ledger = get_ledger(ledger_id, user_id, R::KIND, &*lock(&state)?)?;

    Ok(Json(R::View::from(ledger)))
}

/// A route handler for changing the name, target or date of a debt or goal.
pub async fn update_ledger_endpoint<R: LedgerResource>(
    State(state): State<LedgerState>,
    Extension(user_id): Extension<UserID>,
    Path(ledger_id): Path<DatabaseId>,
    JsonBody(body): JsonBody<R::Body>,
) -> Result<Json<Value>, Error> {
    let patch = LedgerPatch::parse(R::KIND, body.into())?;
    let ledger = update_ledger(ledger_id, user_id, R::KIND, patch, &*lock(&state)?)?;

    respond_with::<R>(format!("{} successfully updated", R::KIND.title()), ledger)
}

/// A route handler for deleting a debt or goal and its entries.
pub async fn delete_ledger_endpoint<R: LedgerResource>(
    State(state): State<LedgerState>,
    Extension(user_id): Extension<UserID>,
    Path(ledger_id): Path<DatabaseId>,
) -> Result<Json<Value>, Error> {
    delete_ledger(ledger_id, user_id, R::KIND, &*lock(&state)?)?;

    Ok(Json(serde_json::json!({
        "message": format!("{} successfully deleted", R::KIND.title())
    })))
}

/// A route handler for adding a payment or contribution.
pub async fn add_entry_endpoint<R: LedgerResource>(
    State(state): State<LedgerState>,
    Extension(user_id): Extension<UserID>,
    Path(ledger_id): Path<DatabaseId>,
    JsonBody(body): JsonBody<R::EntryBody>,
) -> Result<Json<Value>, Error> {
    let form = EntryForm::parse(R::KIND, body.into())?;
    let ledger = add_entry(
        ledger_id,
        user_id,
        R::KIND,
        form,
        state.limit_policy,
        &*lock(&state)?,
    )?;

    respond_with::<R>(
        format!("{} successfully added", R::KIND.entry_title()),
        ledger,
    )
}

/// A route handler for editing a payment or contribution.
pub async fn edit_entry_endpoint<R: LedgerResource>(
    State(state): State<LedgerState>,
    Extension(user_id): Extension<UserID>,
    Path((ledger_id, entry_id)): Path<(DatabaseId, DatabaseId)>,
    JsonBody(body): JsonBody<R::EntryBody>,
) -> Result<Json<Value>, Error> {
    let form = EntryForm::parse(R::KIND, body.into())?;
    let ledger = edit_entry(
        ledger_id,
        entry_id,
        user_id,
        R::KIND,
        form,
        state.limit_policy,
        &*lock(&state)?,
    )?;

    respond_with::<R>(
        format!("{} successfully updated", R::KIND.entry_title()),
        ledger,
    )
}

/// A route handler for deleting a payment or contribution.
pub async fn delete_entry_endpoint<R: LedgerResource>(
    State(state): State<LedgerState>,
    Extension(user_id): Extension<UserID>,
    Path((ledger_id, entry_id)): Path<(DatabaseId, DatabaseId)>,
) -> Result<Json<Value>, Error> {
    let ledger = delete_entry(ledger_id, entry_id, user_id, R::KIND, &*lock(&state)?)?;

    respond_with::<R>(
        format!("{} successfully deleted", R::KIND.entry_title()),
        ledger,
    )
}
