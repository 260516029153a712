//! Deleting a note from the home page's script.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State, rejection::JsonRejection},
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    Acknowledgement, AppState, Error,
    auth::UserID,
    db::unit_of_work,
    flash::{FlashMessage, push_flash},
    note::{NoteId, delete_note},
};

#[derive(Debug, Clone)]
pub struct DeleteNoteState {
    pub cookie_key: Key,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteNoteState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

impl FromRef<DeleteNoteState> for Key {
    fn from_ref(state: &DeleteNoteState) -> Self {
        state.cookie_key.clone()
    }
}

/// The JSON body sent by the page script.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteNoteRequest {
    #[serde(rename = "noteId")]
    pub note_id: NoteId,
}

/// Delete a note owned by the requesting user.
///
/// Responds with `{"success": bool}` and queues a flash message describing
/// the outcome for the next page load. A body that is not a valid JSON
/// request is treated as a missing note ID.
pub async fn delete_note_endpoint(
    State(state): State<DeleteNoteState>,
    Extension(user_id): Extension<UserID>,
    jar: PrivateCookieJar,
    request: Result<Json<DeleteNoteRequest>, JsonRejection>,
) -> Response {
    let request = match request {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::warn!("User {user_id} sent an invalid delete note request: {rejection}");
            let error = Error::MissingRequiredFields;

            return (
                push_flash(jar, FlashMessage::error(error.user_message("deleting note"))),
                error.into_json_response(),
            )
                .into_response();
        }
    };

    let result = match state.db_connection.lock() {
        Ok(connection) => unit_of_work(&connection, |transaction| {
            delete_note(request.note_id, user_id, transaction)
        }),
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            Err(Error::DatabaseLockError)
        }
    };

    match result {
        Ok(()) => (
            push_flash(jar, FlashMessage::success("Note deleted!")),
            Json(Acknowledgement::success()),
        )
            .into_response(),
        Err(error) => {
            tracing::warn!(
                "User {user_id} could not delete note {}: {error}",
                request.note_id
            );
            let message = match &error {
                Error::NotFound => "Note not found!".to_owned(),
                error => error.user_message("deleting note"),
            };

            (
                push_flash(jar, FlashMessage::error(message)),
                error.into_json_response(),
            )
                .into_response()
        }
    }
}
