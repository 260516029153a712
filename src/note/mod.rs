//! Free-text notes written on the home page.

mod core;
mod delete_endpoint;
mod home_page;

pub use core::{
    Note, NoteId, NoteText, count_notes, create_note, create_note_table, delete_note,
    get_user_notes,
};
pub use delete_endpoint::delete_note_endpoint;
pub use home_page::{get_home_page, post_note};
