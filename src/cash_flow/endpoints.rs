//! Route handlers shared by incomes and expenses.

use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    Extension, Json, Router,
    extract::{FromRef, Path, State},
    http::StatusCode,
    routing::{post, put},
};
use rusqlite::Connection;
use serde_json::{Map, Value, json};

use crate::{
    AppState, Error, UserID,
    cash_flow::{
        CashFlow, CashFlowFields, CashFlowForm, CashFlowKind, create_cash_flow,
        delete_cash_flow, get_cash_flows, update_cash_flow,
    },
    database_id::DatabaseId,
    endpoints,
    json::JsonBody,
};

/// Describes where one kind of cash flow lives in the REST API.
pub trait CashFlowResource: Send + Sync + 'static {
    /// Whether the routes manage incomes or expenses.
    const KIND: CashFlowKind;
    /// The route for listing and creating records.
    const COLLECTION_PATH: &'static str;
    /// The route for a single record.
    const ITEM_PATH: &'static str;
}

/// Money coming in.
pub struct Incomes;

/// Money going out.
pub struct Expenses;

impl CashFlowResource for Incomes {
    const KIND: CashFlowKind = CashFlowKind::Income;
    const COLLECTION_PATH: &'static str = endpoints::INCOMES;
    const ITEM_PATH: &'static str = endpoints::INCOME;
}

impl CashFlowResource for Expenses {
    const KIND: CashFlowKind = CashFlowKind::Expense;
    const COLLECTION_PATH: &'static str = endpoints::EXPENSES;
    const ITEM_PATH: &'static str = endpoints::EXPENSE;
}

/// The state needed by the income and expense handlers.
#[derive(Debug, Clone)]
pub struct CashFlowState {
    /// The database connection for managing incomes and expenses.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CashFlowState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The routes for incomes or expenses. Callers are expected to add the auth layer.
pub fn cash_flow_routes<R: CashFlowResource>() -> Router<AppState> {
    Router::new()
        .route(
            R::COLLECTION_PATH,
            post(create_cash_flow_endpoint::<R>).get(list_cash_flows_endpoint::<R>),
        )
        .route(
            R::ITEM_PATH,
            put(update_cash_flow_endpoint::<R>).delete(delete_cash_flow_endpoint::<R>),
        )
}

fn lock(state: &CashFlowState) -> Result<MutexGuard<'_, Connection>, Error> {
    state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)
}

fn respond_with(message: String, cash_flow: CashFlow) -> Result<Json<Value>, Error> {
    let mut body = Map::new();
    body.insert("message".to_owned(), Value::String(message));
    body.insert(
        cash_flow.kind.as_str().to_owned(),
        serde_json::to_value(cash_flow)?,
    );

    Ok(Json(Value::Object(body)))
}

/// A route handler for recording a new income or expense.
pub async fn create_cash_flow_endpoint<R: CashFlowResource>(
    State(state): State<CashFlowState>,
    Extension(user_id): Extension<UserID>,
    JsonBody(fields): JsonBody<CashFlowFields>,
) -> Result<(StatusCode, Json<Value>), Error> {
    let form = CashFlowForm::parse(fields)?;
    let cash_flow = create_cash_flow(R::KIND, form, user_id, &*lock(&state)?)?;

    let message = format!("{} successfully added", R::KIND.title());
    Ok((StatusCode::CREATED, respond_with(message, cash_flow)?))
}

/// A route handler for listing the user's incomes or expenses, newest first.
pub async fn list_cash_flows_endpoint<R: CashFlowResource>(
    State(state): State<CashFlowState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<Vec<CashFlow>>, Error> {
    get_cash_flows(user_id, R::KIND, &*lock(&state)?).map(Json)
}

/// A route handler for replacing an income or expense.
pub async fn update_cash_flow_endpoint<R: CashFlowResource>(
    State(state): State<CashFlowState>,
    Extension(user_id): Extension<UserID>,
    Path(cash_flow_id): Path<DatabaseId>,
    JsonBody(fields): JsonBody<CashFlowFields>,
) -> Result<Json<Value>, Error> {
    let form = CashFlowForm::parse(fields)?;
    let cash_flow = update_cash_flow(cash_flow_id, user_id, R::KIND, form, &*lock(&state)?)?;

    respond_with(format!("{} successfully updated", R::KIND.title()), cash_flow)
}

/// A route handler for deleting an income or expense.
pub async fn delete_cash_flow_endpoint<R: CashFlowResource>(
    State(state): State<CashFlowState>,
    Extension(user_id): Extension<UserID>,
    Path(cash_flow_id): Path<DatabaseId>,
) -> Result<Json<Value>, Error> {
    delete_cash_flow(cash_flow_id, user_id, R::KIND, &*lock(&state)?)?;

    Ok(Json(json!({
        "message": format!("{} successfully deleted", R::KIND.title())
    })))
}
