//! Route handlers for creating and listing categories.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Query, State},
    http::StatusCode,
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{
    AppState, Error, UserID,
    category::{Category, CategoryLabel, CategoryType, create_category, get_categories},
    json::JsonBody,
};

/// The state needed for the category endpoints.
#[derive(Debug, Clone)]
pub struct CategoryState {
    /// The database connection for managing categories.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The body of a create category request.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CategoryFormData {
    pub label: Option<String>,
    #[serde(rename = "type")]
    pub category_type: Option<String>,
}

/// The query string for listing categories.
#[derive(Debug, Default, Deserialize)]
pub struct CategoryQuery {
    #[serde(rename = "type")]
    pub category_type: Option<String>,
}

/// A route handler for creating a new category.
pub async fn create_category_endpoint(
    State(state): State<CategoryState>,
    Extension(user_id): Extension<UserID>,
    JsonBody(form): JsonBody<CategoryFormData>,
) -> Result<(StatusCode, Json<Value>), Error> {
    let category_type: CategoryType = form
        .category_type
        .as_deref()
        .ok_or(Error::MissingField("type"))?
        .parse()?;
    let label = CategoryLabel::new(form.label.as_deref().ok_or(Error::MissingField("label"))?)?;

    let category = create_category(
        label,
        category_type,
        user_id,
        &*state
            .db_connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?,
    )?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Category successfully created",
            "category": category,
        })),
    ))
}

/// A route handler for listing the user's categories, newest first.
///
/// A `type` query parameter other than "expense" or "income" is ignored.
pub async fn list_categories_endpoint(
    State(state): State<CategoryState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<CategoryQuery>,
) -> Result<Json<Vec<Category>>, Error> {
    let category_type = query
        .category_type
        .as_deref()
        .and_then(|raw_type| raw_type.parse().ok());

    let categories = get_categories(
        user_id,
        category_type,
        &*state
            .db_connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?,
    )?;

    Ok(Json(categories))
}

#[cfg(test)]
mod category_endpoint_tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use crate::{
        endpoints,
        ledger::LimitPolicy,
        test_utils::{TestApp, assert_error, assert_json, bearer},
    };

    async fn create(app: &TestApp, token: &str, label: &str, category_type: &str) -> StatusCode {
        app.server
            .post(endpoints::CATEGORIES)
            .add_header("Authorization", bearer(token))
            .json(&json!({ "label": label, "type": category_type }))
            .await
            .status_code()
    }

    #[tokio::test]
    async fn create_category_returns_category() {
        let app = TestApp::new(LimitPolicy::Reject);
        let (_, token) = app.user_with_token("foo@bar.baz");

        let response = app
            .server
            .post(endpoints::CATEGORIES)
            .add_header("Authorization", bearer(&token))
            .json(&json!({ "label": "Eating Out", "type": "expense" }))
            .await;

        let body = assert_json(&response, StatusCode::CREATED);
        assert_eq!(body["message"], "Category successfully created");
        assert_eq!(body["category"]["value"], "eating_out");
        assert_eq!(body["category"]["type"], "expense");
        assert_eq!(body["category"].get("userId"), None::<&Value>);
    }

    #[tokio::test]
    async fn create_category_rejects_unknown_type() {
        let app = TestApp::new(LimitPolicy::Reject);
        let (_, token) = app.user_with_token("foo@bar.baz");

        let response = app
            .server
            .post(endpoints::CATEGORIES)
            .add_header("Authorization", bearer(&token))
            .json(&json!({ "label": "Eating Out", "type": "savings" }))
            .await;

        assert_error(
            &response,
            StatusCode::BAD_REQUEST,
            "type must be either 'expense' or 'income'",
        );
    }

    #[tokio::test]
    async fn create_duplicate_category_fails() {
        let app = TestApp::new(LimitPolicy::Reject);
        let (_, token) = app.user_with_token("foo@bar.baz");
        assert_eq!(
            create(&app, &token, "Gifts", "income").await,
            StatusCode::CREATED
        );

        let response = app
            .server
            .post(endpoints::CATEGORIES)
            .add_header("Authorization", bearer(&token))
            .json(&json!({ "label": "Gifts", "type": "income" }))
            .await;

        assert_error(&response, StatusCode::BAD_REQUEST, "category already exists");
    }

    #[tokio::test]
    async fn list_categories_filters_by_known_type() {
        let app = TestApp::new(LimitPolicy::Reject);
        let (_, token) = app.user_with_token("foo@bar.baz");
        create(&app, &token, "Salary", "income").await;
        create(&app, &token, "Rent", "expense").await;

        let incomes = app
            .server
            .get(endpoints::CATEGORIES)
            .add_query_param("type", "income")
            .add_header("Authorization", bearer(&token))
            .await
            .json::<Value>();
        let ignored_filter = app
            .server
            .get(endpoints::CATEGORIES)
            .add_query_param("type", "bogus")
            .add_header("Authorization", bearer(&token))
            .await
            .json::<Value>();

        assert_eq!(incomes.as_array().unwrap().len(), 1);
        assert_eq!(incomes[0]["label"], "Salary");
        assert_eq!(ignored_filter.as_array().unwrap().len(), 2);
        assert_eq!(ignored_filter[0]["label"], "Rent");
    }

    #[tokio::test]
    async fn categories_are_private_to_each_user() {
        let app = TestApp::new(LimitPolicy::Reject);
        let (_, owner_token) = app.user_with_token("owner@bar.baz");
        let (_, other_token) = app.user_with_token("other@bar.baz");
        create(&app, &owner_token, "Salary", "income").await;

        let response = app
            .server
            .get(endpoints::CATEGORIES)
            .add_header("Authorization", bearer(&other_token))
            .await;

        assert_eq!(assert_json(&response, StatusCode::OK), json!([]));
    }
}
