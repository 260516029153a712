//! Database initialization and the per-request unit of work.

use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::{
    Error, account::create_account_table, auth::create_user_table,
    expense::create_expense_table, note::create_note_table,
};

/// Create the tables for all of the domain models.
///
/// The tables are created in a single exclusive transaction so a partially
/// initialized database is never left behind.
///
/// # Errors
/// Returns an error if any of the tables could not be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction =
        Transaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_note_table(&transaction)?;
    create_expense_table(&transaction)?;
    create_account_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

/// Run `work` inside a single database transaction.
///
/// The transaction is committed if `work` returns `Ok`, otherwise it is
/// rolled back and the error from `work` is returned unchanged.
///
/// # Errors
/// Returns an error if `work` fails, or if the transaction could not be
/// started or committed.
pub fn unit_of_work<T>(
    connection: &Connection,
    work: impl FnOnce(&Transaction) -> Result<T, Error>,
) -> Result<T, Error> {
    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Immediate)?;

    match work(&transaction) {
        Ok(value) => {
            transaction.commit()?;
            Ok(value)
        }
        Err(error) => {
            if let Err(rollback_error) = transaction.rollback() {
                tracing::error!("could not roll back transaction: {rollback_error}");
            }

            Err(error)
        }
    }
}


#[cfg(test)]
mod unit_of_work_tests {
    use std::str::FromStr;

    use email_address::EmailAddress;
    use rusqlite::Connection;

    use crate::{Error, PasswordHash, auth::create_user};

    use super::{initialize, unit_of_work};

    fn get_test_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        connection
    }

    fn count_users(connection: &Connection) -> i64 {
        connection
            .query_row("SELECT COUNT(id) FROM user", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn commits_on_success() {
        let connection = get_test_connection();

        let result = unit_of_work(&connection, |transaction| {
            create_user(
                &EmailAddress::from_str("foo@bar.baz").unwrap(),
                "Foo",
                PasswordHash::new_unchecked("hunter2"),
                transaction,
            )
        });

        assert!(result.is_ok());
        assert_eq!(count_users(&connection), 1);
    }

    #[test]
    fn rolls_back_on_error() {
        let connection = get_test_connection();

        let result: Result<(), Error> = unit_of_work(&connection, |transaction| {
            create_user(
                &EmailAddress::from_str("foo@bar.baz").unwrap(),
                "Foo",
                PasswordHash::new_unchecked("hunter2"),
                transaction,
            )?;

            Err(Error::Unauthorized)
        });

        assert_eq!(result, Err(Error::Unauthorized));
        assert_eq!(count_users(&connection), 0);
    }
}
