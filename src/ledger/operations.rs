//! Transactional operations on debts and goals.
//!
//! Every mutation loads the ledger and its entries, changes them in memory,
//! writes the changed rows and the new totals, and commits. If any step fails
//! the transaction is dropped and nothing is written.

use rusqlite::Connection;

use crate::{
    Error, UserID,
    database_id::DatabaseId,
    ledger::{
        EntryForm, Ledger, LedgerForm, LedgerKind, LedgerPatch, LimitPolicy,
        db::{
            delete_entry_row, delete_ledger_row, insert_entry, insert_ledger, save_ledger,
            select_ledger, select_ledgers, update_entry,
        },
    },
};

/// Create a debt or goal with nothing paid or saved yet.
pub fn create_ledger(
    user_id: UserID,
    kind: LedgerKind,
    form: LedgerForm,
    connection: &Connection,
) -> Result<Ledger, Error> {
    insert_ledger(user_id, kind, form, connection)
}

/// All of the user's debts or goals, oldest first.
pub fn list_ledgers(
    user_id: UserID,
    kind: LedgerKind,
    connection: &Connection,
) -> Result<Vec<Ledger>, Error> {
    select_ledgers(user_id, kind, connection)
}

/// One of the user's debts or goals.
///
/// # Errors
///
/// Returns [Error::LedgerNotFound] if it does not exist or belongs to someone else.
pub fn get_ledger(
    id: DatabaseId,
    user_id: UserID,
    kind: LedgerKind,
    connection: &Connection,
) -> Result<Ledger, Error> {
    select_ledger(id, user_id, kind, connection)
}

/// Change the name, target or date of a debt or goal.
pub fn update_ledger(
    id: DatabaseId,
    user_id: UserID,
    kind: LedgerKind,
    patch: LedgerPatch,
    connection: &Connection,
) -> Result<Ledger, Error> {
    let transaction = connection.unchecked_transaction()?;

    let mut ledger = select_ledger(id, user_id, kind, &transaction)?;
    ledger.apply_patch(patch);
    save_ledger(&mut ledger, &transaction)?;

    transaction.commit()?;

    Ok(ledger)
}

/// Delete a debt or goal along with its entries.
pub fn delete_ledger(
    id: DatabaseId,
    user_id: UserID,
    kind: LedgerKind,
    connection: &Connection,
) -> Result<(), Error> {
    delete_ledger_row(id, user_id, kind, connection)
}

/// Record a payment or contribution and return the updated ledger.
///
/// # Errors
///
/// Returns [Error::LedgerNotFound] if the ledger does not exist or belongs to
/// someone else, [Error::LimitExceeded] if `policy` refuses the amount, or
/// [Error::Conflict] if the ledger was changed concurrently.
pub fn add_entry(
    ledger_id: DatabaseId,
    user_id: UserID,
    kind: LedgerKind,
    form: EntryForm,
    policy: LimitPolicy,
    connection: &Connection,
) -> Result<Ledger, Error> {
    let transaction = connection.unchecked_transaction()?;

    let mut ledger = select_ledger(ledger_id, user_id, kind, &transaction)?;
    let entry = insert_entry(ledger.id, &form, &transaction)?;
    ledger.apply_add(entry, policy)?;
    save_ledger(&mut ledger, &transaction)?;

    transaction.commit()?;

    Ok(ledger)
}

/// Change the amount and date of a payment or contribution.
///
/// # Errors
///
/// Returns [Error::EntryNotFound] if the entry is not on the ledger, plus the
/// errors listed for [add_entry].
pub fn edit_entry(
    ledger_id: DatabaseId,
    entry_id: DatabaseId,
    user_id: UserID,
    kind: LedgerKind,
    form: EntryForm,
    policy: LimitPolicy,
    connection: &Connection,
) -> Result<Ledger, Error> {
    let transaction = connection.unchecked_transaction()?;

    let mut ledger = select_ledger(ledger_id, user_id, kind, &transaction)?;
    ledger.apply_edit(entry_id, &form, policy)?;
    if let Some(entry) = ledger.entries.iter().find(|entry| entry.id == entry_id) {
        update_entry(ledger.id, entry, &transaction)?;
    }
    save_ledger(&mut ledger, &transaction)?;

    transaction.commit()?;

    Ok(ledger)
}

/// Remove a payment or contribution and return the updated ledger.
pub fn delete_entry(
    ledger_id: DatabaseId,
    entry_id: DatabaseId,
    user_id: UserID,
    kind: LedgerKind,
    connection: &Connection,
) -> Result<Ledger, Error> {
    let transaction = connection.unchecked_transaction()?;

    let mut ledger = select_ledger(ledger_id, user_id, kind, &transaction)?;
    let entry = ledger.apply_remove(entry_id)?;
    delete_entry_row(ledger.id, entry.id, &transaction)?;
    save_ledger(&mut ledger, &transaction)?;

    transaction.commit()?;

    Ok(ledger)
}
