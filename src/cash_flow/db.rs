//! Database operations for incomes and expenses.

use rusqlite::{Connection, Row};
use time::OffsetDateTime;

use crate::{
    Error, UserID,
    cash_flow::{CashFlow, CashFlowForm, CashFlowKind},
    database_id::DatabaseId,
    db::get_decimal,
};

/// Create the table holding both incomes and expenses.
pub fn create_cash_flow_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS cash_flow (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            kind TEXT NOT NULL CHECK (kind IN ('income', 'expense')),
            title TEXT NOT NULL,
            amount TEXT NOT NULL,
            category TEXT NOT NULL,
            description TEXT NOT NULL,
            date TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_cash_flow_user_kind ON cash_flow(user_id, kind);",
    )?;

    Ok(())
}

/// Save a new income or expense for `user_id`.
///
/// # Errors
///
/// Returns [Error::UnknownOwner] if `user_id` does not refer to a user.
pub fn create_cash_flow(
    kind: CashFlowKind,
    form: CashFlowForm,
    user_id: UserID,
    connection: &Connection,
) -> Result<CashFlow, Error> {
    let now = OffsetDateTime::now_utc();

    connection.execute(
        "INSERT INTO cash_flow
            (user_id, kind, title, amount, category, description, date, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
        (
            user_id.as_i64(),
            kind.as_str(),
            &form.title,
            form.amount.get().to_string(),
            &form.category,
            &form.description,
            form.date,
            now,
        ),
    )?;

    Ok(CashFlow {
        id: connection.last_insert_rowid(),
        kind,
        title: form.title,
        amount: form.amount.get(),
        category: form.category,
        description: form.description,
        date: form.date,
        user_id,
        created_at: now,
        updated_at: now,
    })
}

const SELECT_CASH_FLOW_COLUMNS: &str = "SELECT id, kind, title, amount, category, description, \
    date, user_id, created_at, updated_at FROM cash_flow";

/// Get the user's incomes or expenses, most recently created first.
pub fn get_cash_flows(
    user_id: UserID,
    kind: CashFlowKind,
    connection: &Connection,
) -> Result<Vec<CashFlow>, Error> {
    connection
        .prepare(&format!(
            "{SELECT_CASH_FLOW_COLUMNS} WHERE user_id = ?1 AND kind = ?2 \
             ORDER BY created_at DESC, id DESC"
        ))?
        .query_map((user_id.as_i64(), kind.as_str()), |row| map_row(row, kind))?
        .map(|maybe_cash_flow| maybe_cash_flow.map_err(|error| error.into()))
        .collect()
}

/// Replace every field of an income or expense owned by `user_id`.
///
/// # Errors
///
/// Returns [Error::CashFlowNotFound] if there is no such record, including
/// when it belongs to another user.
pub fn update_cash_flow(
    id: DatabaseId,
    user_id: UserID,
    kind: CashFlowKind,
    form: CashFlowForm,
    connection: &Connection,
) -> Result<CashFlow, Error> {
    let rows_affected = connection.execute(
        "UPDATE cash_flow
         SET title = ?1, amount = ?2, category = ?3, description = ?4, date = ?5, updated_at = ?6
         WHERE id = ?7 AND user_id = ?8 AND kind = ?9",
        (
            &form.title,
            form.amount.get().to_string(),
            &form.category,
            &form.description,
            form.date,
            OffsetDateTime::now_utc(),
            id,
            user_id.as_i64(),
            kind.as_str(),
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::CashFlowNotFound(kind));
    }

    connection
        .prepare(&format!("{SELECT_CASH_FLOW_COLUMNS} WHERE id = ?1"))?
        .query_row([id], |row| map_row(row, kind))
        .map_err(|error| error.into())
}

/// Delete an income or expense owned by `user_id`.
///
/// # Errors
///
/// Returns [Error::CashFlowNotFound] if there is no such record, including
/// when it belongs to another user.
pub fn delete_cash_flow(
    id: DatabaseId,
    user_id: UserID,
    kind: CashFlowKind,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM cash_flow WHERE id = ?1 AND user_id = ?2 AND kind = ?3",
        (id, user_id.as_i64(), kind.as_str()),
    )?;

    if rows_affected == 0 {
        return Err(Error::CashFlowNotFound(kind));
    }

    Ok(())
}

fn map_row(row: &Row, kind: CashFlowKind) -> Result<CashFlow, rusqlite::Error> {
    Ok(CashFlow {
        id: row.get(0)?,
        kind,
        title: row.get(2)?,
        amount: get_decimal(row, 3)?,
        category: row.get(4)?,
        description: row.get(5)?,
        date: row.get(6)?,
        user_id: UserID::new(row.get(7)?),
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

#[cfg(test)]
mod cash_flow_query_tests {
    use rust_decimal_macros::dec;
    use time::macros::date;

    use crate::{
        Error,
        cash_flow::{
            CashFlowFields, CashFlowForm, CashFlowKind, create_cash_flow, delete_cash_flow,
            get_cash_flows, update_cash_flow,
        },
        test_utils::{get_test_connection, insert_test_user},
    };

    fn form(title: &str, amount: rust_decimal::Decimal) -> CashFlowForm {
        CashFlowForm::parse(CashFlowFields {
            title: Some(title.to_owned()),
            amount: Some(amount),
            category: Some("groceries".to_owned()),
            description: Some("weekly shop".to_owned()),
            date: Some(date!(2025 - 10 - 04)),
        })
        .unwrap()
    }

    #[test]
    fn create_cash_flow_keeps_exact_amount() {
        let connection = get_test_connection();
        let user = insert_test_user("foo@bar.baz", &connection);

        let created = create_cash_flow(
            CashFlowKind::Expense,
            form("Supermarket", dec!(0.1)),
            user.id,
            &connection,
        )
        .unwrap();
        let listed = get_cash_flows(user.id, CashFlowKind::Expense, &connection).unwrap();

        assert_eq!(listed, vec![created]);
        assert_eq!(listed[0].amount, dec!(0.1));
    }

    #[test]
    fn get_cash_flows_is_newest_first_and_separates_kinds() {
        let connection = get_test_connection();
        let user = insert_test_user("foo@bar.baz", &connection);
        let first = create_cash_flow(
            CashFlowKind::Expense,
            form("First", dec!(1)),
            user.id,
            &connection,
        )
        .unwrap();
        let second = create_cash_flow(
            CashFlowKind::Expense,
            form("Second", dec!(2)),
            user.id,
            &connection,
        )
        .unwrap();
        create_cash_flow(
            CashFlowKind::Income,
            form("Salary", dec!(3)),
            user.id,
            &connection,
        )
        .unwrap();

        let expenses = get_cash_flows(user.id, CashFlowKind::Expense, &connection).unwrap();

        assert_eq!(expenses, vec![second, first]);
    }

    #[test]
    fn update_cash_flow_replaces_fields() {
        let connection = get_test_connection();
        let user = insert_test_user("foo@bar.baz", &connection);
        let created = create_cash_flow(
            CashFlowKind::Income,
            form("Salary", dec!(100)),
            user.id,
            &connection,
        )
        .unwrap();

        let updated = update_cash_flow(
            created.id,
            user.id,
            CashFlowKind::Income,
            form("Bonus", dec!(250)),
            &connection,
        )
        .unwrap();

        assert_eq!(updated.title, "Bonus");
        assert_eq!(updated.amount, dec!(250));
        assert_eq!(updated.created_at, created.created_at);
    }

    #[test]
    fn other_users_cannot_update_or_delete() {
        let connection = get_test_connection();
        let owner = insert_test_user("owner@bar.baz", &connection);
        let other = insert_test_user("other@bar.baz", &connection);
        let created = create_cash_flow(
            CashFlowKind::Income,
            form("Salary", dec!(100)),
            owner.id,
            &connection,
        )
        .unwrap();

        let update = update_cash_flow(
            created.id,
            other.id,
            CashFlowKind::Income,
            form("Mine now", dec!(1)),
            &connection,
        );
        let delete = delete_cash_flow(created.id, other.id, CashFlowKind::Income, &connection);

        assert_eq!(update, Err(Error::CashFlowNotFound(CashFlowKind::Income)));
        assert_eq!(delete, Err(Error::CashFlowNotFound(CashFlowKind::Income)));
        assert_eq!(
            get_cash_flows(owner.id, CashFlowKind::Income, &connection).unwrap(),
            vec![created]
        );
    }

    #[test]
    fn kind_is_part_of_identity() {
        let connection = get_test_connection();
        let user = insert_test_user("foo@bar.baz", &connection);
        let income = create_cash_flow(
            CashFlowKind::Income,
            form("Salary", dec!(100)),
            user.id,
            &connection,
        )
        .unwrap();

        let result = delete_cash_flow(income.id, user.id, CashFlowKind::Expense, &connection);

        assert_eq!(result, Err(Error::CashFlowNotFound(CashFlowKind::Expense)));
    }
}
