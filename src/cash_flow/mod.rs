//! Incomes and expenses.

mod db;
mod domain;
mod endpoints;

pub use db::{
    create_cash_flow, create_cash_flow_table, delete_cash_flow, get_cash_flows, update_cash_flow,
};
pub use domain::{
    CASH_FLOW_DESCRIPTION_MAX_LENGTH, CASH_FLOW_TITLE_MAX_LENGTH, CashFlow, CashFlowFields,
    CashFlowForm, CashFlowKind,
};
pub use endpoints::{Expenses, Incomes, cash_flow_routes};
