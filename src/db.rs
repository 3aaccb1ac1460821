//! Sets up the application's SQLite database.

use std::str::FromStr;

use rust_decimal::Decimal;
use rusqlite::{Connection, Row, Transaction, TransactionBehavior, types::Type};

use crate::{
    cash_flow::create_cash_flow_table, category::create_category_table,
    ledger::create_ledger_tables, user::create_user_table,
};

/// Enable foreign key enforcement and create the tables for all the domain models.
///
/// Safe to call on a database that has already been initialized.
///
/// # Errors
/// Returns an error if a table could not be created or if there is some other SQL error.
pub fn initialize(connection: &Connection) -> Result<(), rusqlite::Error> {
    // Has no effect inside a transaction, so it must come first.
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_category_table(&transaction)?;
    create_cash_flow_table(&transaction)?;
    create_ledger_tables(&transaction)?;

    transaction.commit()?;

    Ok(())
}

/// Read a decimal amount stored as TEXT from column `index`.
///
/// Amounts are stored as text so that SQLite never rounds them through a float.
pub(crate) fn get_decimal(row: &Row, index: usize) -> Result<Decimal, rusqlite::Error> {
    let raw_amount: String = row.get(index)?;

    Decimal::from_str(&raw_amount).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(error))
    })
}
