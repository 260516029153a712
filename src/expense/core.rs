//! Defines the core data models and database queries for expenses.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row,
    types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, auth::UserID, database_id::DatabaseID};

// ============================================================================
// MODELS
// ============================================================================

/// Database identifier for an expense.
pub type ExpenseId = DatabaseID;

/// Whether money was earned or spent.
///
/// New records are always [ExpenseType::Income] or [ExpenseType::Expense].
/// Rows written with any other label are read back as [ExpenseType::Other]
/// and are left out of every total.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExpenseType {
    Income,
    Expense,
    Other(String),
}

impl ExpenseType {
    pub fn as_str(&self) -> &str {
        match self {
            ExpenseType::Income => "Income",
            ExpenseType::Expense => "Expense",
            ExpenseType::Other(label) => label,
        }
    }

    fn from_label(label: &str) -> Self {
        match label {
            "Income" => ExpenseType::Income,
            "Expense" => ExpenseType::Expense,
            other => ExpenseType::Other(other.to_owned()),
        }
    }
}

impl FromStr for ExpenseType {
    type Err = Error;

    /// Parse the type submitted by a client, only "Income" and "Expense" are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match ExpenseType::from_label(s.trim()) {
            ExpenseType::Other(label) => Err(Error::InvalidExpenseType(label)),
            expense_type => Ok(expense_type),
        }
    }
}

impl Display for ExpenseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ToSql for ExpenseType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for ExpenseType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value.as_str().map(ExpenseType::from_label)
    }
}

/// An income or expense owned by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: ExpenseId,
    /// The amount of money earned or spent, always positive.
    pub amount: f64,
    pub category: String,
    pub expense_type: ExpenseType,
    /// How the money was paid, e.g. "Cash" or "Card".
    pub payment_mode: Option<String>,
    pub description: Option<String>,
    /// When the expense was recorded, in UTC.
    pub date: OffsetDateTime,
    pub user_id: UserID,
}

/// A validated expense that has not been saved yet.
///
/// Create one with [NewExpense::new] and chain the setters for the optional fields.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub(crate) amount: f64,
    pub(crate) category: String,
    pub(crate) expense_type: ExpenseType,
    pub(crate) payment_mode: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) date: OffsetDateTime,
}

impl NewExpense {
    /// Validate the required fields of an expense dated now.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - [Error::InvalidAmount] if `amount` is NaN or infinite,
    /// - [Error::NonPositiveAmount] if `amount` is zero or negative,
    /// - [Error::MissingRequiredFields] if `category` is blank.
    pub fn new(amount: f64, category: &str, expense_type: ExpenseType) -> Result<Self, Error> {
        if !amount.is_finite() {
            return Err(Error::InvalidAmount(amount.to_string()));
        }

        if amount <= 0.0 {
            return Err(Error::NonPositiveAmount(amount));
        }

        let category = category.trim();

        if category.is_empty() {
            return Err(Error::MissingRequiredFields);
        }

        Ok(Self {
            amount,
            category: category.to_owned(),
            expense_type,
            payment_mode: None,
            description: None,
            date: OffsetDateTime::now_utc(),
        })
    }

    /// Set the payment mode, blank strings are stored as `None`.
    pub fn payment_mode(mut self, payment_mode: Option<&str>) -> Self {
        self.payment_mode = non_blank(payment_mode);
        self
    }

    /// Set the description, blank strings are stored as `None`.
    pub fn description(mut self, description: Option<&str>) -> Self {
        self.description = non_blank(description);
        self
    }

    pub fn date(mut self, date: OffsetDateTime) -> Self {
        self.date = date;
        self
    }
}

fn non_blank(text: Option<&str>) -> Option<String> {
    text.map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_owned)
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

pub fn create_expense_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS expense (
            id INTEGER PRIMARY KEY,
            amount REAL NOT NULL,
            category TEXT NOT NULL,
            type TEXT NOT NULL,
            payment_mode TEXT,
            description TEXT,
            date TEXT NOT NULL,
            user_id INTEGER NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_expense_user_date ON expense(user_id, date)",
        (),
    )?;

    Ok(())
}

/// Save `expense` for `user_id`.
///
/// # Errors
///
/// Returns [Error::SqlError] if the user does not exist or there is some
/// other SQL error.
pub fn create_expense(
    expense: NewExpense,
    user_id: UserID,
    connection: &Connection,
) -> Result<Expense, Error> {
    connection
        .prepare(
            "INSERT INTO expense (amount, category, type, payment_mode, description, date, user_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING id, amount, category, type, payment_mode, description, date, user_id",
        )?
        .query_row(
            (
                expense.amount,
                expense.category,
                expense.expense_type,
                expense.payment_mode,
                expense.description,
                expense.date,
                user_id.as_i64(),
            ),
            map_expense_row,
        )
        .map_err(Error::from)
}

/// Get the expenses owned by `user_id`, most recent first.
pub fn get_user_expenses(user_id: UserID, connection: &Connection) -> Result<Vec<Expense>, Error> {
    connection
        .prepare(
            "SELECT id, amount, category, type, payment_mode, description, date, user_id
             FROM expense
             WHERE user_id = ?1
             ORDER BY date DESC, id DESC",
        )?
        .query_map([user_id.as_i64()], map_expense_row)?
        .map(|maybe_expense| maybe_expense.map_err(Error::from))
        .collect()
}

pub fn count_expenses(user_id: UserID, connection: &Connection) -> Result<i64, Error> {
    connection
        .query_row(
            "SELECT COUNT(id) FROM expense WHERE user_id = ?1",
            [user_id.as_i64()],
            |row| row.get(0),
        )
        .map_err(Error::from)
}

/// Delete the expense `expense_id` if it is owned by `user_id`.
///
/// # Errors
///
/// Returns:
/// - [Error::NotFound] if no expense has the ID,
/// - [Error::Unauthorized] if the expense belongs to a different user, the
///   expense is not modified.
pub fn delete_expense(
    expense_id: ExpenseId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let owner_id: i64 = connection.query_row(
        "SELECT user_id FROM expense WHERE id = ?1",
        [expense_id],
        |row| row.get(0),
    )?;

    if owner_id != user_id.as_i64() {
        return Err(Error::Unauthorized);
    }

    connection.execute("DELETE FROM expense WHERE id = ?1", [expense_id])?;

    Ok(())
}

fn map_expense_row(row: &Row) -> Result<Expense, rusqlite::Error> {
    Ok(Expense {
        id: row.get(0)?,
        amount: row.get(1)?,
        category: row.get(2)?,
        expense_type: row.get(3)?,
        payment_mode: row.get(4)?,
        description: row.get(5)?,
        date: row.get(6)?,
        user_id: UserID::new(row.get(7)?),
    })
}


#[cfg(test)]
mod new_expense_tests {
    use crate::Error;

    use super::{ExpenseType, NewExpense};

    #[test]
    fn rejects_zero_and_negative_amounts() {
        assert_eq!(
            NewExpense::new(0.0, "Food", ExpenseType::Expense),
            Err(Error::NonPositiveAmount(0.0))
        );
        assert_eq!(
            NewExpense::new(-5.0, "Food", ExpenseType::Expense),
            Err(Error::NonPositiveAmount(-5.0))
        );
    }

    #[test]
    fn rejects_non_finite_amounts() {
        assert!(matches!(
            NewExpense::new(f64::NAN, "Food", ExpenseType::Expense),
            Err(Error::InvalidAmount(_))
        ));
        assert!(matches!(
            NewExpense::new(f64::INFINITY, "Food", ExpenseType::Expense),
            Err(Error::InvalidAmount(_))
        ));
    }

    #[test]
    fn rejects_blank_category() {
        assert_eq!(
            NewExpense::new(12.0, "  ", ExpenseType::Expense),
            Err(Error::MissingRequiredFields)
        );
    }

    #[test]
    fn blank_optional_fields_are_none() {
        let expense = NewExpense::new(12.0, "Food", ExpenseType::Expense)
            .unwrap()
            .payment_mode(Some(""))
            .description(Some("   "));

        assert_eq!(expense.payment_mode, None);
        assert_eq!(expense.description, None);
    }
}

#[cfg(test)]
mod expense_db_tests {
    use time::macros::datetime;

    use crate::{
        Error,
        test_utils::{create_test_user, get_test_connection},
    };

    use super::{
        ExpenseType, NewExpense, count_expenses, create_expense, delete_expense,
        get_user_expenses,
    };

    #[test]
    fn create_expense_returns_saved_row() {
        let connection = get_test_connection();
        let user = create_test_user(&connection, "test@example.com");
        let new_expense = NewExpense::new(12.5, "Food", ExpenseType::Expense)
            .unwrap()
            .payment_mode(Some("Card"))
            .description(Some("Lunch"))
            .date(datetime!(2025-10-05 12:00 UTC));

        let expense = create_expense(new_expense, user.id, &connection).unwrap();

        assert_eq!(expense.amount, 12.5);
        assert_eq!(expense.category, "Food");
        assert_eq!(expense.expense_type, ExpenseType::Expense);
        assert_eq!(expense.payment_mode.as_deref(), Some("Card"));
        assert_eq!(expense.description.as_deref(), Some("Lunch"));
        assert_eq!(expense.date, datetime!(2025-10-05 12:00 UTC));
        assert_eq!(expense.user_id, user.id);
    }

    #[test]
    fn lists_own_expenses_newest_first() {
        let connection = get_test_connection();
        let user = create_test_user(&connection, "test@example.com");
        let other_user = create_test_user(&connection, "other@example.com");
        let older = create_expense(
            NewExpense::new(1.0, "Food", ExpenseType::Expense)
                .unwrap()
                .date(datetime!(2025-10-01 12:00 UTC)),
            user.id,
            &connection,
        )
        .unwrap();
        let newer = create_expense(
            NewExpense::new(2.0, "Salary", ExpenseType::Income)
                .unwrap()
                .date(datetime!(2025-10-02 12:00 UTC)),
            user.id,
            &connection,
        )
        .unwrap();
        create_expense(
            NewExpense::new(3.0, "Food", ExpenseType::Expense).unwrap(),
            other_user.id,
            &connection,
        )
        .unwrap();

        let expenses = get_user_expenses(user.id, &connection).unwrap();

        assert_eq!(expenses, vec![newer, older]);
    }

    #[test]
    fn unknown_type_label_is_read_as_other() {
        let connection = get_test_connection();
        let user = create_test_user(&connection, "test@example.com");
        connection
            .execute(
                "INSERT INTO expense (amount, category, type, date, user_id)
                 VALUES (10.0, 'Savings', 'Transfer', ?1, ?2)",
                (datetime!(2025-10-05 12:00 UTC), user.id.as_i64()),
            )
            .unwrap();

        let expenses = get_user_expenses(user.id, &connection).unwrap();

        assert_eq!(
            expenses[0].expense_type,
            ExpenseType::Other("Transfer".to_owned())
        );
    }

    #[test]
    fn delete_expense_checks_owner() {
        let connection = get_test_connection();
        let owner = create_test_user(&connection, "owner@example.com");
        let intruder = create_test_user(&connection, "intruder@example.com");
        let expense = create_expense(
            NewExpense::new(10.0, "Food", ExpenseType::Expense).unwrap(),
            owner.id,
            &connection,
        )
        .unwrap();

        assert_eq!(
            delete_expense(expense.id, intruder.id, &connection),
            Err(Error::Unauthorized)
        );
        assert_eq!(count_expenses(owner.id, &connection), Ok(1));

        assert_eq!(delete_expense(expense.id, owner.id, &connection), Ok(()));
        assert_eq!(count_expenses(owner.id, &connection), Ok(0));
    }

    #[test]
    fn delete_missing_expense_is_not_found() {
        let connection = get_test_connection();
        let user = create_test_user(&connection, "test@example.com");

        assert_eq!(delete_expense(99, user.id, &connection), Err(Error::NotFound));
    }
}
