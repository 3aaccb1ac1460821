use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rust_decimal::Decimal;
use rusqlite::Connection;
use time::macros::date;

use fintrack_rs::{
    CashFlowFields, CashFlowForm, CashFlowKind, CategoryLabel, CategoryType, Email, EntryFields,
    EntryForm, LedgerFields, LedgerForm, LedgerKind, LimitPolicy, PasswordHash, UserName,
    ValidatedPassword, add_entry, create_cash_flow, create_category, create_ledger, create_user,
    initialize_db,
};

/// The email of the demo user.
const TEST_EMAIL: &str = "test@example.com";
/// The password of the demo user.
const TEST_PASSWORD: &str = "test";

/// A utility for creating a test database for the REST API server of fintrack_rs.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        Some(extension) if !extension.is_empty() => {}
        _ => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;
    initialize_db(&conn)?;

    let transaction = conn.unchecked_transaction()?;
    seed(&transaction)?;
    transaction.commit()?;

    println!("Success! Log in as {TEST_EMAIL} with the password '{TEST_PASSWORD}'.");

    Ok(())
}

fn seed(conn: &Connection) -> Result<(), Box<dyn Error>> {
    println!("Creating test user...");
    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked(TEST_PASSWORD),
        PasswordHash::DEFAULT_COST,
    )?;
    let user = create_user(
        UserName::new("Test User")?,
        Email::new(TEST_EMAIL)?,
        password_hash,
        conn,
    )?;

    println!("Creating categories, an income and an expense...");
    let salary = create_category(
        CategoryLabel::new("Salary")?,
        CategoryType::Income,
        user.id,
        conn,
    )?;
    let groceries = create_category(
        CategoryLabel::new("Groceries")?,
        CategoryType::Expense,
        user.id,
        conn,
    )?;

    create_cash_flow(
        CashFlowKind::Income,
        CashFlowForm::parse(CashFlowFields {
            title: Some("October salary".to_owned()),
            amount: Some(Decimal::new(4200_00, 2)),
            category: Some(salary.value),
            description: Some("Monthly pay".to_owned()),
            date: Some(date!(2025 - 10 - 25)),
        })?,
        user.id,
        conn,
    )?;
    create_cash_flow(
        CashFlowKind::Expense,
        CashFlowForm::parse(CashFlowFields {
            title: Some("Supermarket".to_owned()),
            amount: Some(Decimal::new(87_45, 2)),
            category: Some(groceries.value),
            description: Some("Weekly shop".to_owned()),
            date: Some(date!(2025 - 10 - 27)),
        })?,
        user.id,
        conn,
    )?;

    println!("Creating a debt and a goal...");
    seed_ledger(
        conn,
        user.id,
        LedgerKind::Debt,
        "Car loan",
        Decimal::new(12_000, 0),
        Decimal::new(450, 0),
    )?;
    seed_ledger(
        conn,
        user.id,
        LedgerKind::Goal,
        "Holiday",
        Decimal::new(3_000, 0),
        Decimal::new(250, 0),
    )?;

    Ok(())
}

fn seed_ledger(
    conn: &Connection,
    user_id: fintrack_rs::UserID,
    kind: LedgerKind,
    label: &str,
    target: Decimal,
    first_entry: Decimal,
) -> Result<(), Box<dyn Error>> {
    let form = LedgerForm::parse(
        kind,
        LedgerFields {
            label: Some(label.to_owned()),
            target: Some(target),
            reference_date: Some(Some(date!(2025 - 01 - 01))),
        },
    )?;
    let ledger = create_ledger(user_id, kind, form, conn)?;

    let entry = EntryForm::parse(
        kind,
        EntryFields {
            amount: Some(first_entry),
            date: Some(date!(2025 - 10 - 01)),
        },
    )?;
    add_entry(ledger.id, user_id, kind, entry, LimitPolicy::Reject, conn)?;

    Ok(())
}
