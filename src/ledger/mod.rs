//! Debts with their payments and savings goals with their contributions.

mod db;
mod domain;
mod endpoints;
mod operations;
mod resource;

pub use db::create_ledger_tables;
pub use domain::{
    EntryFields, EntryForm, LEDGER_LABEL_MAX_LENGTH, Ledger, LedgerEntry, LedgerFields,
    LedgerForm, LedgerKind, LedgerLabel, LedgerPatch, LimitPolicy, PositiveAmount,
};
pub use endpoints::ledger_routes;
pub use operations::{
    add_entry, create_ledger, delete_entry, delete_ledger, edit_entry, get_ledger, list_ledgers,
    update_ledger,
};
pub use resource::{Debts, Goals};
