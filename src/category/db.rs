//! Database operations for categories.

use rusqlite::{Connection, Row};
use time::OffsetDateTime;

use crate::{
    Error, UserID,
    category::{Category, CategoryLabel, CategoryType},
};

/// Create a category for `user_id` and return it with its generated ID.
///
/// # Errors
///
/// Returns [Error::DuplicateCategory] if the user already has a category with
/// the same label and type.
pub fn create_category(
    label: CategoryLabel,
    category_type: CategoryType,
    user_id: UserID,
    connection: &Connection,
) -> Result<Category, Error> {
    let value = label.slug();
    let created_at = OffsetDateTime::now_utc();

    connection.execute(
        "INSERT INTO category (user_id, label, value, type, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        (
            user_id.as_i64(),
            label.as_ref(),
            &value,
            category_type.as_str(),
            created_at,
        ),
    )?;

    Ok(Category {
        id: connection.last_insert_rowid(),
        label,
        value,
        category_type,
        user_id,
        created_at,
    })
}

/// Retrieve the user's categories, newest first, optionally only those of one type.
pub fn get_categories(
    user_id: UserID,
    category_type: Option<CategoryType>,
    connection: &Connection,
) -> Result<Vec<Category>, Error> {
    let mut statement = connection.prepare(
        "SELECT id, label, value, type, user_id, created_at FROM category
         WHERE user_id = ?1 AND (?2 IS NULL OR type = ?2)
         ORDER BY created_at DESC, id DESC",
    )?;

    statement
        .query_map(
            (
                user_id.as_i64(),
                category_type.as_ref().map(CategoryType::as_str),
            ),
            map_row,
        )?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Initialize the category table.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            label TEXT NOT NULL,
            value TEXT NOT NULL,
            type TEXT NOT NULL CHECK (type IN ('expense', 'income')),
            created_at TEXT NOT NULL,
            UNIQUE(user_id, label, type),
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_category_user ON category(user_id);",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let raw_label: String = row.get(1)?;
    let raw_type: String = row.get(3)?;
    let category_type = raw_type.parse().map_err(|error: Error| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(error))
    })?;

    Ok(Category {
        id: row.get(0)?,
        label: CategoryLabel::new_unchecked(&raw_label),
        value: row.get(2)?,
        category_type,
        user_id: UserID::new(row.get(4)?),
        created_at: row.get(5)?,
    })
}
