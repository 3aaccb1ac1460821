//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/debts/{debt_id}', use [format_endpoint].
//! For entry endpoints with two parameters use [format_entry_endpoint].

/// The route for logging in a user.
pub const LOG_IN: &str = "/api/log_in";
/// The route for registering users.
pub const USERS: &str = "/api/users";
/// The route for the profile of the logged in user.
pub const CURRENT_USER: &str = "/api/users/me";
/// The route for creating and listing categories.
pub const CATEGORIES: &str = "/api/categories";
/// The route for creating and listing incomes.
pub const INCOMES: &str = "/api/incomes";
/// The route for a single income.
pub const INCOME: &str = "/api/incomes/{income_id}";
/// The route for creating and listing expenses.
pub const EXPENSES: &str = "/api/expenses";
/// The route for a single expense.
pub const EXPENSE: &str = "/api/expenses/{expense_id}";
/// The route for creating and listing debts.
pub const DEBTS: &str = "/api/debts";
/// The route for a single debt.
pub const DEBT: &str = "/api/debts/{debt_id}";
/// The route for adding payments to a debt.
pub const DEBT_PAYMENTS: &str = "/api/debts/{debt_id}/payments";
/// The route for a single payment on a debt.
pub const DEBT_PAYMENT: &str = "/api/debts/{debt_id}/payments/{payment_id}";
/// The route for creating and listing goals.
pub const GOALS: &str = "/api/goals";
/// The route for a single goal.
pub const GOAL: &str = "/api/goals/{goal_id}";
/// The route for adding contributions to a goal.
pub const GOAL_CONTRIBUTIONS: &str = "/api/goals/{goal_id}/contributions";
/// The route for a single contribution to a goal.
pub const GOAL_CONTRIBUTION: &str = "/api/goals/{goal_id}/contributions/{contribution_id}";

/// Replace the first parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/users/{user_id}', '{user_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let param_start = match endpoint_path.find('{') {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|end| param_start + end + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}

/// Replace the two parameters in an entry path such as [DEBT_PAYMENT].
pub fn format_entry_endpoint(endpoint_path: &str, ledger_id: i64, entry_id: i64) -> String {
    format_endpoint(&format_endpoint(endpoint_path, ledger_id), entry_id)
}

// These tests are here so that we know when we call `Uri::from_shared` it will not panic.
#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    use super::{format_endpoint, format_entry_endpoint};

    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok());
    }

    #[test]
    fn endpoints_are_valid_uris() {
        assert_endpoint_is_valid_uri(endpoints::LOG_IN);
        assert_endpoint_is_valid_uri(endpoints::USERS);
        assert_endpoint_is_valid_uri(endpoints::CURRENT_USER);
        assert_endpoint_is_valid_uri(endpoints::CATEGORIES);
        assert_endpoint_is_valid_uri(endpoints::INCOMES);
        assert_endpoint_is_valid_uri(endpoints::INCOME);
        assert_endpoint_is_valid_uri(endpoints::EXPENSES);
        assert_endpoint_is_valid_uri(endpoints::EXPENSE);
        assert_endpoint_is_valid_uri(endpoints::DEBTS);
        assert_endpoint_is_valid_uri(endpoints::DEBT);
        assert_endpoint_is_valid_uri(endpoints::DEBT_PAYMENTS);
        assert_endpoint_is_valid_uri(endpoints::DEBT_PAYMENT);
        assert_endpoint_is_valid_uri(endpoints::GOALS);
        assert_endpoint_is_valid_uri(endpoints::GOAL);
        assert_endpoint_is_valid_uri(endpoints::GOAL_CONTRIBUTIONS);
        assert_endpoint_is_valid_uri(endpoints::GOAL_CONTRIBUTION);
    }

    #[test]
    fn produces_valid_uri() {
        let formatted_path = format_endpoint("/hello/{world_id}", 1);

        assert_eq!(formatted_path, "/hello/1");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn returns_original_path_with_no_parameter() {
        let formatted_path = format_endpoint("/hello/world", 1);

        assert_eq!(formatted_path, "/hello/world");
    }

    #[test]
    fn parameter_in_middle() {
        let formatted_path = format_endpoint("/hello/{world}/bye", 1);

        assert_eq!(formatted_path, "/hello/1/bye");
    }

    #[test]
    fn entry_endpoint_replaces_both_parameters() {
        let formatted_path = format_entry_endpoint(endpoints::DEBT_PAYMENT, 3, 14);

        assert_eq!(formatted_path, "/api/debts/3/payments/14");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }
}
