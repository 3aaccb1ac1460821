//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::{
    AppState,
    auth::{auth_guard, post_log_in},
    cash_flow::{Expenses, Incomes, cash_flow_routes},
    category::{create_category_endpoint, list_categories_endpoint},
    endpoints,
    ledger::{Debts, Goals, ledger_routes},
    not_found::get_404_not_found,
    profile::{delete_account, get_profile},
    register_user::register_user,
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::USERS, post(register_user))
        .route(endpoints::LOG_IN, post(post_log_in));

    let protected_routes = Router::new()
        .route(
            endpoints::CURRENT_USER,
            get(get_profile).delete(delete_account),
        )
        .route(
            endpoints::CATEGORIES,
            post(create_category_endpoint).get(list_categories_endpoint),
        )
        .merge(cash_flow_routes::<Incomes>())
        .merge(cash_flow_routes::<Expenses>())
        .merge(ledger_routes::<Debts>())
        .merge(ledger_routes::<Goals>())
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    protected_routes
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}
