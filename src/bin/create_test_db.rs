use std::{error::Error, path::Path, process::exit, str::FromStr};

use clap::Parser;
use email_address::EmailAddress;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use expense_tracker::{
    ExpenseType, NewAccount, NewExpense, NoteText, PasswordHash, ValidatedPassword,
    create_account, create_expense, create_note, create_user, initialize_db, unit_of_work,
};

/// A utility for creating a test database for the expense tracker.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

const DEMO_EMAIL: &str = "demo@example.com";
const DEMO_PASSWORD: &str = "test";

/// (days ago, amount, category, type, payment mode, description)
const SAMPLE_EXPENSES: [(i64, f64, &str, ExpenseType, &str, &str); 10] = [
    (75, 3200.0, "Salary", ExpenseType::Income, "Bank Transfer", "Monthly pay"),
    (70, 1200.0, "Bills", ExpenseType::Expense, "Bank Transfer", "Rent"),
    (62, 84.35, "Food", ExpenseType::Expense, "Card", "Groceries"),
    (45, 3200.0, "Salary", ExpenseType::Income, "Bank Transfer", "Monthly pay"),
    (41, 1200.0, "Bills", ExpenseType::Expense, "Bank Transfer", "Rent"),
    (33, 60.0, "Transportation", ExpenseType::Expense, "Card", "Bus pass"),
    (20, 150.0, "Gift", ExpenseType::Income, "Cash", "Birthday"),
    (14, 3200.0, "Salary", ExpenseType::Income, "Bank Transfer", "Monthly pay"),
    (10, 1200.0, "Bills", ExpenseType::Expense, "Bank Transfer", "Rent"),
    (3, 42.5, "Entertainment", ExpenseType::Expense, "Card", "Concert tickets"),
];

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test user {DEMO_EMAIL} with the password \"{DEMO_PASSWORD}\"...");

    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked(DEMO_PASSWORD),
        PasswordHash::DEFAULT_COST,
    )?;

    unit_of_work(&conn, |transaction| {
        let user = create_user(
            &EmailAddress::from_str(DEMO_EMAIL).map_err(|error| {
                expense_tracker::Error::InvalidEmail(format!("{DEMO_EMAIL}: {error}"))
            })?,
            "Demo",
            password_hash,
            transaction,
        )?;

        let now = OffsetDateTime::now_utc();

        println!("Adding notes...");
        for (days_ago, text) in [(2, "Cancel the gym membership"), (0, "Pay the power bill")] {
            create_note(
                NoteText::new(text)?,
                user.id,
                now - Duration::days(days_ago),
                transaction,
            )?;
        }

        println!("Adding transactions...");
        for (days_ago, amount, category, expense_type, payment_mode, description) in
            SAMPLE_EXPENSES
        {
            let expense = NewExpense::new(amount, category, expense_type)?
                .payment_mode(Some(payment_mode))
                .description(Some(description))
                .date(now - Duration::days(days_ago));

            create_expense(expense, user.id, transaction)?;
        }

        println!("Adding accounts...");
        for (name, number, account_type, balance) in [
            ("Everyday", Some("1234-5678-9012"), Some("Checking"), 1520.75),
            ("Savings", None, Some("Savings"), 8400.0),
            ("Credit Card", Some("4321-XXXX-XXXX"), Some("Credit"), -312.4),
        ] {
            create_account(
                NewAccount::new(name, number, account_type, balance)?,
                user.id,
                transaction,
            )?;
        }

        Ok(())
    })?;

    println!("Success!");

    Ok(())
}
