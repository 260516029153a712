//! Named accounts with balances, e.g. a bank account or a wallet.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{Error, auth::UserID, database_id::DatabaseID};

pub type AccountId = DatabaseID;

/// The number shown for accounts created without one.
pub const DEFAULT_ACCOUNT_NUMBER: &str = "XXXX-XXXX-XXXX";

/// The type given to accounts created without one.
pub const DEFAULT_ACCOUNT_TYPE: &str = "General";

/// The amount of money held in an account owned by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// The id for the account.
    pub id: AccountId,
    pub name: String,
    /// The account number for display, it is not validated.
    pub number: String,
    /// Free text describing the account, e.g. "Savings".
    pub account_type: String,
    /// The balance, may be negative for debts.
    pub balance: f64,
    pub user_id: UserID,
}

/// The validated fields for creating or updating an account.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAccount {
    pub(crate) name: String,
    pub(crate) number: String,
    pub(crate) account_type: String,
    pub(crate) balance: f64,
}

impl NewAccount {
    /// Validate the fields of an account.
    ///
    /// A blank `number` or `account_type` is replaced with
    /// [DEFAULT_ACCOUNT_NUMBER] or [DEFAULT_ACCOUNT_TYPE].
    ///
    /// # Errors
    ///
    /// Returns [Error::EmptyAccountName] if `name` is blank, or
    /// [Error::InvalidBalance] if `balance` is NaN or infinite.
    pub fn new(
        name: &str,
        number: Option<&str>,
        account_type: Option<&str>,
        balance: f64,
    ) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            return Err(Error::EmptyAccountName);
        }

        if !balance.is_finite() {
            return Err(Error::InvalidBalance(balance.to_string()));
        }

        let or_default = |text: Option<&str>, default: &str| {
            text.map(str::trim)
                .filter(|text| !text.is_empty())
                .unwrap_or(default)
                .to_owned()
        };

        Ok(Self {
            name: name.to_owned(),
            number: or_default(number, DEFAULT_ACCOUNT_NUMBER),
            account_type: or_default(account_type, DEFAULT_ACCOUNT_TYPE),
            balance,
        })
    }
}

pub fn create_account_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS account (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            number TEXT NOT NULL,
            type TEXT NOT NULL,
            balance REAL NOT NULL,
            user_id INTEGER NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        )",
        (),
    )?;

    Ok(())
}

pub fn map_row_to_account(row: &Row) -> Result<Account, rusqlite::Error> {
    Ok(Account {
        id: row.get(0)?,
        name: row.get(1)?,
        number: row.get(2)?,
        account_type: row.get(3)?,
        balance: row.get(4)?,
        user_id: UserID::new(row.get(5)?),
    })
}

/// Save `account` for `user_id`.
///
/// # Errors
///
/// Returns [Error::SqlError] if the user does not exist or there is some
/// other SQL error.
pub fn create_account(
    account: NewAccount,
    user_id: UserID,
    connection: &Connection,
) -> Result<Account, Error> {
    connection
        .prepare(
            "INSERT INTO account (name, number, type, balance, user_id)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id, name, number, type, balance, user_id",
        )?
        .query_row(
            (
                account.name,
                account.number,
                account.account_type,
                account.balance,
                user_id.as_i64(),
            ),
            map_row_to_account,
        )
        .map_err(Error::from)
}

/// Get the accounts owned by `user_id` sorted by name.
pub fn get_user_accounts(user_id: UserID, connection: &Connection) -> Result<Vec<Account>, Error> {
    connection
        .prepare(
            "SELECT id, name, number, type, balance, user_id FROM account
             WHERE user_id = ?1
             ORDER BY name ASC, id ASC",
        )?
        .query_map([user_id.as_i64()], map_row_to_account)?
        .map(|maybe_account| maybe_account.map_err(Error::from))
        .collect()
}

pub fn get_account(account_id: AccountId, connection: &Connection) -> Result<Account, Error> {
    connection
        .query_row(
            "SELECT id, name, number, type, balance, user_id FROM account WHERE id = ?1",
            [account_id],
            map_row_to_account,
        )
        .map_err(Error::from)
}

/// Check that `account_id` exists and is owned by `user_id`.
fn check_owner(
    account_id: AccountId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let account = get_account(account_id, connection)?;

    if account.user_id == user_id {
        Ok(())
    } else {
        Err(Error::Unauthorized)
    }
}

/// Replace the fields of the account `account_id` owned by `user_id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if the account does not exist, or
/// [Error::Unauthorized] if it belongs to another user. The account is not
/// modified in either case.
pub fn update_account(
    account_id: AccountId,
    account: NewAccount,
    user_id: UserID,
    connection: &Connection,
) -> Result<Account, Error> {
    check_owner(account_id, user_id, connection)?;

    connection
        .prepare(
            "UPDATE account SET name = ?1, number = ?2, type = ?3, balance = ?4
             WHERE id = ?5
             RETURNING id, name, number, type, balance, user_id",
        )?
        .query_row(
            (
                account.name,
                account.number,
                account.account_type,
                account.balance,
                account_id,
            ),
            map_row_to_account,
        )
        .map_err(Error::from)
}

/// Delete the account `account_id` owned by `user_id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if the account does not exist, or
/// [Error::Unauthorized] if it belongs to another user.
pub fn delete_account(
    account_id: AccountId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    check_owner(account_id, user_id, connection)?;

    connection.execute("DELETE FROM account WHERE id = ?1", [account_id])?;

    Ok(())
}

/// Get the total balance across all of the accounts owned by `user_id`.
///
/// # Errors
/// Returns [Error::SqlError] if the SQL query fails.
pub fn get_total_account_balance(user_id: UserID, connection: &Connection) -> Result<f64, Error> {
    let mut stmt =
        connection.prepare("SELECT COALESCE(SUM(balance), 0) FROM account WHERE user_id = ?1")?;

    let total: f64 = stmt.query_row([user_id.as_i64()], |row| row.get(0))?;

    Ok(total)
}

pub fn count_accounts(user_id: UserID, connection: &Connection) -> Result<i64, Error> {
    connection
        .query_row(
            "SELECT COUNT(id) FROM account WHERE user_id = ?1",
            [user_id.as_i64()],
            |row| row.get(0),
        )
        .map_err(Error::from)
}


#[cfg(test)]
mod account_db_tests {
    use crate::{
        Error,
        test_utils::{create_test_user, get_test_connection},
    };

    use super::{
        NewAccount, count_accounts, create_account, delete_account, get_account,
        get_total_account_balance, get_user_accounts, update_account,
    };

    #[test]
    fn create_and_list_accounts_by_name() {
        let connection = get_test_connection();
        let user = create_test_user(&connection, "test@example.com");
        let other_user = create_test_user(&connection, "other@example.com");
        let wallet = create_account(
            NewAccount::new("Wallet", None, None, 20.0).unwrap(),
            user.id,
            &connection,
        )
        .unwrap();
        let bank = create_account(
            NewAccount::new("Bank", Some("12-3456"), Some("Savings"), 1000.0).unwrap(),
            user.id,
            &connection,
        )
        .unwrap();
        create_account(
            NewAccount::new("Secret", None, None, 5.0).unwrap(),
            other_user.id,
            &connection,
        )
        .unwrap();

        let accounts = get_user_accounts(user.id, &connection).unwrap();

        assert_eq!(accounts, vec![bank, wallet]);
        assert_eq!(count_accounts(user.id, &connection), Ok(2));
    }

    #[test]
    fn total_balance_only_counts_own_accounts() {
        let connection = get_test_connection();
        let user = create_test_user(&connection, "test@example.com");
        let other_user = create_test_user(&connection, "other@example.com");
        for (name, balance) in [("Bank", 100.5), ("Savings", 250.75), ("Card", -50.25)] {
            create_account(
                NewAccount::new(name, None, None, balance).unwrap(),
                user.id,
                &connection,
            )
            .unwrap();
        }
        create_account(
            NewAccount::new("Other", None, None, 1000.0).unwrap(),
            other_user.id,
            &connection,
        )
        .unwrap();

        assert_eq!(get_total_account_balance(user.id, &connection), Ok(301.0));
    }

    #[test]
    fn total_balance_is_zero_without_accounts() {
        let connection = get_test_connection();
        let user = create_test_user(&connection, "test@example.com");

        assert_eq!(get_total_account_balance(user.id, &connection), Ok(0.0));
    }

    #[test]
    fn owner_can_update_account() {
        let connection = get_test_connection();
        let user = create_test_user(&connection, "test@example.com");
        let account = create_account(
            NewAccount::new("Wallet", None, None, 20.0).unwrap(),
            user.id,
            &connection,
        )
        .unwrap();

        let updated = update_account(
            account.id,
            NewAccount::new("Cash", Some("N/A"), Some("Cash"), 15.0).unwrap(),
            user.id,
            &connection,
        )
        .unwrap();

        assert_eq!(updated.name, "Cash");
        assert_eq!(updated.number, "N/A");
        assert_eq!(updated.account_type, "Cash");
        assert_eq!(updated.balance, 15.0);
        assert_eq!(get_account(account.id, &connection), Ok(updated));
    }

    #[test]
    fn other_user_cannot_update_or_delete_account() {
        let connection = get_test_connection();
        let owner = create_test_user(&connection, "owner@example.com");
        let intruder = create_test_user(&connection, "intruder@example.com");
        let account = create_account(
            NewAccount::new("Wallet", None, None, 20.0).unwrap(),
            owner.id,
            &connection,
        )
        .unwrap();

        assert_eq!(
            update_account(
                account.id,
                NewAccount::new("Mine now", None, None, 0.0).unwrap(),
                intruder.id,
                &connection,
            ),
            Err(Error::Unauthorized)
        );
        assert_eq!(
            delete_account(account.id, intruder.id, &connection),
            Err(Error::Unauthorized)
        );
        assert_eq!(get_account(account.id, &connection), Ok(account));
    }

    #[test]
    fn missing_account_is_not_found() {
        let connection = get_test_connection();
        let user = create_test_user(&connection, "test@example.com");

        assert_eq!(delete_account(7, user.id, &connection), Err(Error::NotFound));
        assert_eq!(
            update_account(
                7,
                NewAccount::new("Wallet", None, None, 0.0).unwrap(),
                user.id,
                &connection,
            ),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn owner_can_delete_account() {
        let connection = get_test_connection();
        let user = create_test_user(&connection, "test@example.com");
        let account = create_account(
            NewAccount::new("Wallet", None, None, 20.0).unwrap(),
            user.id,
            &connection,
        )
        .unwrap();

        assert_eq!(delete_account(account.id, user.id, &connection), Ok(()));
        assert_eq!(get_account(account.id, &connection), Err(Error::NotFound));
    }
}
