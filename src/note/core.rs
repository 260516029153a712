//! Note domain types and database queries.

use std::fmt::Display;

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, auth::UserID, database_id::DatabaseID};

/// Database identifier for a note.
pub type NoteId = DatabaseID;

/// The body of a note, guaranteed to contain more than whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteText(String);

impl NoteText {
    /// Create the text for a note.
    ///
    /// # Errors
    ///
    /// Returns [Error::EmptyNote] if `text` is empty or only whitespace.
    pub fn new(text: &str) -> Result<Self, Error> {
        let text = text.trim();

        if text.is_empty() {
            Err(Error::EmptyNote)
        } else {
            Ok(Self(text.to_owned()))
        }
    }
}

impl AsRef<str> for NoteText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for NoteText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub id: NoteId,
    pub text: NoteText,
    pub created_at: OffsetDateTime,
    pub user_id: UserID,
}

pub fn create_note_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS note (
            id INTEGER PRIMARY KEY,
            text TEXT NOT NULL,
            created_at TEXT NOT NULL,
            user_id INTEGER NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_note_user_id ON note(user_id)",
        (),
    )?;

    Ok(())
}

/// Save a note written by `user_id` at `created_at`.
///
/// # Errors
///
/// Returns [Error::SqlError] if the user does not exist or the insert failed.
pub fn create_note(
    text: NoteText,
    user_id: UserID,
    created_at: OffsetDateTime,
    connection: &Connection,
) -> Result<Note, Error> {
    connection.execute(
        "INSERT INTO note (text, created_at, user_id) VALUES (?1, ?2, ?3)",
        (text.as_ref(), created_at, user_id.as_i64()),
    )?;

    Ok(Note {
        id: connection.last_insert_rowid(),
        text,
        created_at,
        user_id,
    })
}

/// Get the notes written by `user_id`, newest first.
pub fn get_user_notes(user_id: UserID, connection: &Connection) -> Result<Vec<Note>, Error> {
    connection
        .prepare(
            "SELECT id, text, created_at, user_id FROM note
            WHERE user_id = ?1
            ORDER BY created_at DESC, id DESC",
        )?
        .query_map([user_id.as_i64()], map_note_row)?
        .map(|maybe_note| maybe_note.map_err(Error::from))
        .collect()
}

pub fn count_notes(user_id: UserID, connection: &Connection) -> Result<i64, Error> {
    connection
        .query_row(
            "SELECT COUNT(id) FROM note WHERE user_id = ?1",
            [user_id.as_i64()],
            |row| row.get(0),
        )
        .map_err(Error::from)
}

/// Delete the note `note_id` if it was written by `user_id`.
///
/// # Errors
///
/// Returns:
/// - [Error::NotFound] if there is no note with the ID.
/// - [Error::Unauthorized] if the note belongs to another user, in which case
///   the note is left unchanged.
pub fn delete_note(note_id: NoteId, user_id: UserID, connection: &Connection) -> Result<(), Error> {
    let owner_id: i64 = connection.query_row(
        "SELECT user_id FROM note WHERE id = ?1",
        [note_id],
        |row| row.get(0),
    )?;

    if owner_id != user_id.as_i64() {
        return Err(Error::Unauthorized);
    }

    connection.execute("DELETE FROM note WHERE id = ?1", [note_id])?;

    Ok(())
}

fn map_note_row(row: &Row) -> Result<Note, rusqlite::Error> {
    Ok(Note {
        id: row.get(0)?,
        text: NoteText(row.get(1)?),
        created_at: row.get(2)?,
        user_id: UserID::new(row.get(3)?),
    })
}
