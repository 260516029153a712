//! The home page where users write notes, and the handler for new notes.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::{OffsetDateTime, UtcOffset, macros::format_description};

use crate::{
    AppState, Error,
    auth::{UserID, get_user_by_id},
    db::unit_of_work,
    endpoints,
    flash::{FlashMessage, flash_messages_view, push_flash, take_flashes},
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, CARD_STYLE, FORM_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE, PAGE_CONTAINER_STYLE, base,
    },
    navigation::NavBar,
    note::{Note, NoteText, create_note, get_user_notes},
    timezone::get_local_offset,
};

/// The state needed for the home page and for saving notes.
#[derive(Debug, Clone)]
pub struct HomePageState {
    pub cookie_key: Key,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for HomePageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

impl FromRef<HomePageState> for Key {
    fn from_ref(state: &HomePageState) -> Self {
        state.cookie_key.clone()
    }
}

fn format_timestamp(timestamp: OffsetDateTime, local_offset: UtcOffset) -> String {
    timestamp
        .to_offset(local_offset)
        .format(format_description!(
            "[day] [month repr:short] [year], [hour]:[minute]"
        ))
        .unwrap_or_else(|error| {
            tracing::warn!("Could not format note timestamp {timestamp}: {error}");
            timestamp.to_string()
        })
}

fn note_list(notes: &[Note], local_offset: UtcOffset) -> Markup {
    html! {
        ul id="notes" class="w-full space-y-2"
        {
            @for note in notes {
                li
                    class={ "flex items-start justify-between " (CARD_STYLE) }
                    data-note-id=(note.id)
                {
                    div
                    {
                        p class="whitespace-pre-wrap" { (note.text) }
                        p class="mt-1 text-xs text-gray-500 dark:text-gray-400"
                        {
                            (format_timestamp(note.created_at, local_offset))
                        }
                    }

                    button
                        type="button"
                        class={ "ms-4 delete-note " (BUTTON_DELETE_STYLE) }
                        data-note-id=(note.id)
                        aria-label="Delete note"
                    {
                        "Delete"
                    }
                }
            }

            @if notes.is_empty() {
                li class="text-center text-gray-500 dark:text-gray-400" { "No notes yet." }
            }
        }
    }
}

fn home_view(
    first_name: &str,
    notes: &[Note],
    local_offset: UtcOffset,
    flashes: &[FlashMessage],
) -> Markup {
    let content = html! {
        (NavBar::new(endpoints::HOME_VIEW).into_html())

        div class=(PAGE_CONTAINER_STYLE)
        {
            (flash_messages_view(flashes))

            div class="w-full max-w-2xl space-y-6"
            {
                h1 class="text-2xl font-bold" { "Hi, " (first_name) "!" }

                form method="post" action=(endpoints::HOME_VIEW) class="space-y-4"
                {
                    label for="note" class=(FORM_LABEL_STYLE) { "New note" }

                    textarea
                        name="note"
                        id="note"
                        rows="3"
                        required
                        class=(FORM_TEXT_INPUT_STYLE)
                    {}

                    button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add Note" }
                }

                (note_list(notes, local_offset))
            }
        }
    };

    base("Home", &[], &content)
}

/// Display the user's notes and the form for adding a note.
pub async fn get_home_page(
    State(state): State<HomePageState>,
    Extension(user_id): Extension<UserID>,
    jar: PrivateCookieJar,
) -> Response {
    let Some(local_offset) = get_local_offset(&state.local_timezone) else {
        return Error::InvalidTimezoneError(state.local_timezone).into_response();
    };

    let (user, notes) = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return Error::DatabaseLockError.into_response();
            }
        };

        let user = get_user_by_id(user_id, &connection);
        let notes = get_user_notes(user_id, &connection);

        match (user, notes) {
            (Ok(user), Ok(notes)) => (user, notes),
            (Err(error), _) | (_, Err(error)) => {
                tracing::error!("Could not load the home page for user {user_id}: {error}");
                return error.into_response();
            }
        }
    };

    let (jar, flashes) = take_flashes(jar);

    (jar, home_view(&user.first_name, &notes, local_offset, &flashes)).into_response()
}

#[derive(Debug, Deserialize)]
pub struct NoteForm {
    pub note: String,
}

/// Save a note and redirect back to the home page.
///
/// The outcome is reported with a flash message on the redirected page.
pub async fn post_note(
    State(state): State<HomePageState>,
    Extension(user_id): Extension<UserID>,
    jar: PrivateCookieJar,
    Form(form): Form<NoteForm>,
) -> Response {
    let redirect = Redirect::to(endpoints::HOME_VIEW);

    let text = match NoteText::new(&form.note) {
        Ok(text) => text,
        Err(error) => {
            return (push_flash(jar, FlashMessage::error(error.to_string())), redirect)
                .into_response();
        }
    };

    let result = match state.db_connection.lock() {
        Ok(connection) => unit_of_work(&connection, |transaction| {
            create_note(text, user_id, OffsetDateTime::now_utc(), transaction)
        }),
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            Err(Error::DatabaseLockError)
        }
    };

    let message = match result {
        Ok(_) => FlashMessage::success("Note added!"),
        Err(error) => {
            tracing::error!("Could not add note for user {user_id}: {error}");
            FlashMessage::error(error.user_message("adding note"))
        }
    };

    (push_flash(jar, message), redirect).into_response()
}

#[cfg(test)]
mod home_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, Form, extract::State, http::StatusCode};
    use axum_extra::extract::PrivateCookieJar;
    use rusqlite::Connection;
    use scraper::Selector;
    use time::OffsetDateTime;

    use crate::{
        UserID,
        app_state::create_cookie_key,
        endpoints,
        flash::{FlashCategory, FlashMessage, push_flash},
        note::{NoteText, create_note, get_user_notes},
        test_utils::{
            assert_valid_html, create_test_user, get_flash_messages, get_header,
            get_test_connection, parse_html_document,
        },
    };

    use super::{HomePageState, NoteForm, get_home_page, post_note};

    fn get_state() -> (HomePageState, UserID) {
        let connection = get_test_connection();
        let user = create_test_user(&connection, "test@example.com");

        (
            HomePageState {
                cookie_key: create_cookie_key("foobar"),
                local_timezone: "Etc/UTC".to_owned(),
                db_connection: Arc::new(Mutex::new(connection)),
            },
            user.id,
        )
    }

    fn with_connection<T>(state: &HomePageState, f: impl FnOnce(&Connection) -> T) -> T {
        f(&state.db_connection.lock().unwrap())
    }

    #[tokio::test]
    async fn home_page_lists_notes_and_flashes() {
        let (state, user_id) = get_state();
        with_connection(&state, |connection| {
            create_note(
                NoteText::new("buy milk").unwrap(),
                user_id,
                OffsetDateTime::now_utc(),
                connection,
            )
            .unwrap();
        });
        let jar = push_flash(
            PrivateCookieJar::new(state.cookie_key.clone()),
            FlashMessage::success("Note added!"),
        );

        let response = get_home_page(State(state), Extension(user_id), jar).await;

        assert_eq!(response.status(), StatusCode::OK);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);

        let notes: Vec<String> = document
            .select(&Selector::parse("#notes li[data-note-id] p").unwrap())
            .map(|p| p.text().collect())
            .take(1)
            .collect();
        assert_eq!(notes, vec!["buy milk"]);

        let flash = document
            .select(&Selector::parse("#flash-messages [role=alert] span").unwrap())
            .next()
            .expect("flash message missing");
        assert_eq!(flash.text().collect::<String>(), "Note added!");
    }

    #[tokio::test]
    async fn home_page_shows_placeholder_without_notes() {
        let (state, user_id) = get_state();
        let jar = PrivateCookieJar::new(state.cookie_key.clone());

        let response = get_home_page(State(state), Extension(user_id), jar).await;

        let document = parse_html_document(response).await;
        let text: String = document
            .select(&Selector::parse("#notes").unwrap())
            .next()
            .unwrap()
            .text()
            .collect();
        assert!(text.contains("No notes yet."));
    }

    #[tokio::test]
    async fn post_note_saves_and_redirects() {
        let (state, user_id) = get_state();
        let key = state.cookie_key.clone();
        let jar = PrivateCookieJar::new(key.clone());

        let response = post_note(
            State(state.clone()),
            Extension(user_id),
            jar,
            Form(NoteForm {
                note: "pay rent".to_owned(),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(get_header(&response, "location"), endpoints::HOME_VIEW);
        assert_eq!(
            get_flash_messages(&response, &key),
            vec![FlashMessage::success("Note added!")]
        );

        let notes = with_connection(&state, |connection| get_user_notes(user_id, connection))
            .unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].text.as_ref(), "pay rent");
    }

    #[tokio::test]
    async fn post_empty_note_is_rejected() {
        let (state, user_id) = get_state();
        let key = state.cookie_key.clone();
        let jar = PrivateCookieJar::new(key.clone());

        let response = post_note(
            State(state.clone()),
            Extension(user_id),
            jar,
            Form(NoteForm {
                note: "".to_owned(),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let flashes = get_flash_messages(&response, &key);
        assert_eq!(flashes.len(), 1);
        assert_eq!(flashes[0].category, FlashCategory::Error);
        assert_eq!(flashes[0].message, "Note is too short!");

        let notes = with_connection(&state, |connection| get_user_notes(user_id, connection))
            .unwrap();
        assert!(notes.is_empty());
    }
}
