//! Fintrack is a web service for tracking your personal finances.
//!
//! This library provides a JSON REST API for recording incomes, expenses,
//! categories, debts with their payments, and savings goals with their
//! contributions.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod app_state;
mod auth;
mod cash_flow;
mod category;
mod database_id;
mod db;
mod endpoints;
mod error;
mod json;
mod ledger;
mod logging;
mod not_found;
mod profile;
mod register_user;
mod routing;
mod user;

#[cfg(test)]
mod test_utils;

pub use app_state::{AppState, DEFAULT_TOKEN_DURATION};
pub use auth::{PasswordHash, ValidatedPassword};
pub use cash_flow::{CashFlow, CashFlowFields, CashFlowForm, CashFlowKind, create_cash_flow};
pub use category::{Category, CategoryLabel, CategoryType, create_category};
pub use db::initialize as initialize_db;
pub use error::Error;
pub use ledger::{
    EntryFields, EntryForm, Ledger, LedgerEntry, LedgerFields, LedgerForm, LedgerKind,
    LimitPolicy, add_entry, create_ledger,
};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;
pub use user::{
    Email, User, UserID, UserName, create_user, get_user_by_email, get_user_by_id,
    update_password,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}
