//! Database operations for debts, goals and their entries.

use std::collections::HashMap;

use rusqlite::{Connection, Row};
use time::OffsetDateTime;

use crate::{
    Error, UserID,
    database_id::DatabaseId,
    db::get_decimal,
    ledger::{EntryForm, Ledger, LedgerEntry, LedgerForm, LedgerKind, LedgerLabel},
};

/// Create the ledger and ledger entry tables and their indexes.
pub fn create_ledger_tables(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS ledger (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            kind TEXT NOT NULL CHECK (kind IN ('debt', 'goal')),
            label TEXT NOT NULL,
            target TEXT NOT NULL,
            accumulated TEXT NOT NULL,
            reference_date TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            version INTEGER NOT NULL DEFAULT 1,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_ledger_user_kind ON ledger(user_id, kind);

        CREATE TABLE IF NOT EXISTS ledger_entry (
            id INTEGER PRIMARY KEY,
            ledger_id INTEGER NOT NULL,
            amount TEXT NOT NULL,
            date TEXT NOT NULL,
            FOREIGN KEY(ledger_id) REFERENCES ledger(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_ledger_entry_ledger ON ledger_entry(ledger_id);",
    )?;

    Ok(())
}

/// Insert a new ledger with no entries and return it.
///
/// # Errors
///
/// Returns [Error::UnknownOwner] if `user_id` does not refer to a user.
pub fn insert_ledger(
    user_id: UserID,
    kind: LedgerKind,
    form: LedgerForm,
    connection: &Connection,
) -> Result<Ledger, Error> {
    let now = OffsetDateTime::now_utc();
    let accumulated = rust_decimal::Decimal::ZERO;

    connection.execute(
        "INSERT INTO ledger
            (user_id, kind, label, target, accumulated, reference_date, created_at, updated_at, version)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7, 1)",
        (
            user_id.as_i64(),
            kind.as_str(),
            form.label.as_ref(),
            form.target.get().to_string(),
            accumulated.to_string(),
            form.reference_date,
            now,
        ),
    )?;

    Ok(Ledger {
        id: connection.last_insert_rowid(),
        user_id,
        kind,
        label: form.label,
        target: form.target.get(),
        accumulated,
        reference_date: form.reference_date,
        created_at: now,
        updated_at: now,
        version: 1,
        entries: Vec::new(),
    })
}

const SELECT_LEDGER_COLUMNS: &str = "SELECT id, user_id, kind, label, target, accumulated, \
    reference_date, created_at, updated_at, version FROM ledger";

/// Get the ledger of `kind` with `id` owned by `user_id`, with its entries.
///
/// # Errors
///
/// Returns [Error::LedgerNotFound] if there is no such ledger, including when
/// it belongs to another user.
pub fn select_ledger(
    id: DatabaseId,
    user_id: UserID,
    kind: LedgerKind,
    connection: &Connection,
) -> Result<Ledger, Error> {
    let mut ledger = connection
        .prepare(&format!(
            "{SELECT_LEDGER_COLUMNS} WHERE id = ?1 AND user_id = ?2 AND kind = ?3"
        ))?
        .query_row((id, user_id.as_i64(), kind.as_str()), |row| {
            map_ledger_row(row, kind)
        })
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::LedgerNotFound(kind),
            error => error.into(),
        })?;

    ledger.entries = connection
        .prepare("SELECT id, amount, date FROM ledger_entry WHERE ledger_id = ?1 ORDER BY id")?
        .query_map([id], map_entry_row)?
        .collect::<Result<_, _>>()?;

    Ok(ledger)
}

/// Get all ledgers of `kind` owned by `user_id` in the order they were created.
pub fn select_ledgers(
    user_id: UserID,
    kind: LedgerKind,
    connection: &Connection,
) -> Result<Vec<Ledger>, Error> {
    let mut ledgers: Vec<Ledger> = connection
        .prepare(&format!(
            "{SELECT_LEDGER_COLUMNS} WHERE user_id = ?1 AND kind = ?2 ORDER BY id"
        ))?
        .query_map((user_id.as_i64(), kind.as_str()), |row| {
            map_ledger_row(row, kind)
        })?
        .collect::<Result<_, _>>()?;

    let mut entries_by_ledger: HashMap<DatabaseId, Vec<LedgerEntry>> = HashMap::new();
    let mut statement = connection.prepare(
        "SELECT ledger_entry.ledger_id, ledger_entry.id, ledger_entry.amount, ledger_entry.date
         FROM ledger_entry
         INNER JOIN ledger ON ledger.id = ledger_entry.ledger_id
         WHERE ledger.user_id = ?1 AND ledger.kind = ?2
         ORDER BY ledger_entry.id",
    )?;
    let rows = statement.query_map((user_id.as_i64(), kind.as_str()), |row| {
        let ledger_id: DatabaseId = row.get(0)?;
        let entry = LedgerEntry {
            id: row.get(1)?,
            amount: get_decimal(row, 2)?,
            date: row.get(3)?,
        };

        Ok((ledger_id, entry))
    })?;

    for row in rows {
        let (ledger_id, entry) = row?;
        entries_by_ledger.entry(ledger_id).or_default().push(entry);
    }

    for ledger in &mut ledgers {
        ledger.entries = entries_by_ledger.remove(&ledger.id).unwrap_or_default();
    }

    Ok(ledgers)
}

/// Write the ledger's own fields and bump its version.
///
/// The write only succeeds if the stored version still matches
/// `ledger.version`. On success `ledger.version` and `ledger.updated_at` are
/// updated to match the stored row.
///
/// # Errors
///
/// Returns [Error::Conflict] if the ledger was saved by someone else since it
/// was read, or was deleted.
pub fn save_ledger(ledger: &mut Ledger, connection: &Connection) -> Result<(), Error> {
    let now = OffsetDateTime::now_utc();

    let rows_affected = connection.execute(
        "UPDATE ledger
         SET label = ?1, target = ?2, accumulated = ?3, reference_date = ?4,
             updated_at = ?5, version = version + 1
         WHERE id = ?6 AND version = ?7",
        (
            ledger.label.as_ref(),
            ledger.target.to_string(),
            ledger.accumulated.to_string(),
            ledger.reference_date,
            now,
            ledger.id,
            ledger.version,
        ),
    )?;

    if rows_affected == 0 {
        tracing::warn!(
            "{} {} was modified concurrently, expected version {}",
            ledger.kind,
            ledger.id,
            ledger.version
        );
        return Err(Error::Conflict);
    }

    ledger.version += 1;
    ledger.updated_at = now;

    Ok(())
}

/// Delete the ledger of `kind` with `id` owned by `user_id`. Its entries are deleted with it.
///
/// # Errors
///
/// Returns [Error::LedgerNotFound] if there is no such ledger.
pub fn delete_ledger_row(
    id: DatabaseId,
    user_id: UserID,
    kind: LedgerKind,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM ledger WHERE id = ?1 AND user_id = ?2 AND kind = ?3",
        (id, user_id.as_i64(), kind.as_str()),
    )?;

    if rows_affected == 0 {
        return Err(Error::LedgerNotFound(kind));
    }

    Ok(())
}

/// Insert an entry for the ledger with `ledger_id` and return it.
pub fn insert_entry(
    ledger_id: DatabaseId,
    form: &EntryForm,
    connection: &Connection,
) -> Result<LedgerEntry, Error> {
    connection.execute(
        "INSERT INTO ledger_entry (ledger_id, amount, date) VALUES (?1, ?2, ?3)",
        (ledger_id, form.amount.get().to_string(), form.date),
    )?;

    Ok(LedgerEntry {
        id: connection.last_insert_rowid(),
        amount: form.amount.get(),
        date: form.date,
    })
}

/// Overwrite the amount and date of a stored entry.
pub fn update_entry(
    ledger_id: DatabaseId,
    entry: &LedgerEntry,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE ledger_entry SET amount = ?1, date = ?2 WHERE id = ?3 AND ledger_id = ?4",
        (entry.amount.to_string(), entry.date, entry.id, ledger_id),
    )?;

    if rows_affected == 0 {
        return Err(Error::Conflict);
    }

    Ok(())
}

/// Delete a stored entry.
pub fn delete_entry_row(
    ledger_id: DatabaseId,
    entry_id: DatabaseId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM ledger_entry WHERE id = ?1 AND ledger_id = ?2",
        (entry_id, ledger_id),
    )?;

    if rows_affected == 0 {
        return Err(Error::Conflict);
    }

    Ok(())
}

fn map_ledger_row(row: &Row, kind: LedgerKind) -> Result<Ledger, rusqlite::Error> {
    let raw_label: String = row.get(3)?;

    Ok(Ledger {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        kind,
        label: LedgerLabel::new_unchecked(&raw_label),
        target: get_decimal(row, 4)?,
        accumulated: get_decimal(row, 5)?,
        reference_date: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
        version: row.get(9)?,
        entries: Vec::new(),
    })
}

fn map_entry_row(row: &Row) -> Result<LedgerEntry, rusqlite::Error> {
    Ok(LedgerEntry {
        id: row.get(0)?,
        amount: get_decimal(row, 1)?,
        date: row.get(2)?,
    })
}

#[cfg(test)]
mod ledger_query_tests {
    use rusqlite::Connection;
    use rust_decimal_macros::dec;
    use time::macros::date;

    use crate::{
        Error, UserID,
        ledger::{
            EntryForm, LedgerForm, LedgerKind, LedgerLabel, PositiveAmount,
            db::{
                delete_ledger_row, insert_entry, insert_ledger, save_ledger, select_ledger,
                select_ledgers,
            },
        },
        test_utils::{get_test_connection, insert_test_user},
    };

    fn car_loan() -> LedgerForm {
        LedgerForm {
            label: LedgerLabel::new_unchecked("Car Loan"),
            target: PositiveAmount::new(dec!(1000), "totalAmount").unwrap(),
            reference_date: Some(date!(2025 - 03 - 01)),
        }
    }

    fn setup() -> (Connection, UserID) {
        let connection = get_test_connection();
        let user = insert_test_user("foo@bar.baz", &connection);

        (connection, user.id)
    }

    #[test]
    fn insert_then_select_round_trips_fields() {
        let (connection, user_id) = setup();

        let inserted = insert_ledger(user_id, LedgerKind::Debt, car_loan(), &connection).unwrap();
        let selected = select_ledger(inserted.id, user_id, LedgerKind::Debt, &connection).unwrap();

        assert_eq!(selected, inserted);
        assert_eq!(selected.version, 1);
        assert_eq!(selected.accumulated, dec!(0));
    }

    #[test]
    fn select_with_other_kind_is_not_found() {
        let (connection, user_id) = setup();
        let debt = insert_ledger(user_id, LedgerKind::Debt, car_loan(), &connection).unwrap();

        let result = select_ledger(debt.id, user_id, LedgerKind::Goal, &connection);

        assert_eq!(result, Err(Error::LedgerNotFound(LedgerKind::Goal)));
    }

    #[test]
    fn select_ledgers_groups_entries_by_ledger() {
        let (connection, user_id) = setup();
        let first = insert_ledger(user_id, LedgerKind::Debt, car_loan(), &connection).unwrap();
        let second = insert_ledger(user_id, LedgerKind::Debt, car_loan(), &connection).unwrap();
        let form = EntryForm {
            amount: PositiveAmount::new(dec!(12.5), "amount").unwrap(),
            date: date!(2025 - 04 - 01),
        };
        let entry = insert_entry(second.id, &form, &connection).unwrap();

        let ledgers = select_ledgers(user_id, LedgerKind::Debt, &connection).unwrap();

        assert_eq!(ledgers.len(), 2);
        assert_eq!(ledgers[0].id, first.id);
        assert!(ledgers[0].entries.is_empty());
        assert_eq!(ledgers[1].entries, vec![entry]);
    }

    #[test]
    fn save_with_stale_version_conflicts() {
        let (connection, user_id) = setup();
        let inserted = insert_ledger(user_id, LedgerKind::Goal, car_loan(), &connection).unwrap();
        let mut first_reader = inserted.clone();
        let mut second_reader = inserted;

        save_ledger(&mut first_reader, &connection).unwrap();
        let result = save_ledger(&mut second_reader, &connection);

        assert_eq!(result, Err(Error::Conflict));
        assert_eq!(first_reader.version, 2);
        let stored = select_ledger(first_reader.id, user_id, LedgerKind::Goal, &connection).unwrap();
        assert_eq!(stored.version, 2);
    }

    #[test]
    fn delete_removes_entries() {
        let (connection, user_id) = setup();
        let debt = insert_ledger(user_id, LedgerKind::Debt, car_loan(), &connection).unwrap();
        let form = EntryForm {
            amount: PositiveAmount::new(dec!(1), "amount").unwrap(),
            date: date!(2025 - 04 - 01),
        };
        insert_entry(debt.id, &form, &connection).unwrap();

        delete_ledger_row(debt.id, user_id, LedgerKind::Debt, &connection).unwrap();

        let entry_count: i64 = connection
            .query_row("SELECT COUNT(*) FROM ledger_entry", [], |row| row.get(0))
            .unwrap();
        assert_eq!(entry_count, 0);
        assert_eq!(
            delete_ledger_row(debt.id, user_id, LedgerKind::Debt, &connection),
            Err(Error::LedgerNotFound(LedgerKind::Debt))
        );
    }

    #[test]
    fn insert_for_missing_user_is_unknown_owner() {
        let connection = get_test_connection();

        let result = insert_ledger(UserID::new(99), LedgerKind::Debt, car_loan(), &connection);

        assert_eq!(result, Err(Error::UnknownOwner));
    }
}
