use std::str::FromStr;

use email_address::EmailAddress;
use rusqlite::Connection;

use crate::{PasswordHash, User, auth::create_user, db::initialize};

/// An in-memory database with all of the tables created.
pub(crate) fn get_test_connection() -> Connection {
    let connection =
        Connection::open_in_memory().expect("Could not open in-memory SQLite database");
    initialize(&connection).expect("Could not initialize database");

    connection
}

/// Register a user whose password is "hunter2" (hashed with a low cost).
pub(crate) fn create_test_user(connection: &Connection, email: &str) -> User {
    let password_hash = PasswordHash::new(crate::ValidatedPassword::new_unchecked("hunter2"), 4)
        .expect("Could not hash password");

    create_user(
        &EmailAddress::from_str(email).expect("Invalid test email"),
        "Test",
        password_hash,
        connection,
    )
    .expect("Could not create test user")
}
