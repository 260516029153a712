//! Defines the endpoint the dashboard script calls to add an expense.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
// axum_extra's Form reads empty fields as `None` instead of rejecting the request.
use axum_extra::extract::{Form, PrivateCookieJar, cookie::Key};
use rusqlite::Connection;

use crate::{
    Acknowledgement, AppState, Error, ErrorKind,
    auth::UserID,
    db::unit_of_work,
    expense::{ExpenseForm, create_expense},
    flash::{FlashMessage, push_flash},
};

/// The state needed to create an expense.
#[derive(Debug, Clone)]
pub struct CreateExpenseState {
    pub cookie_key: Key,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

impl FromRef<CreateExpenseState> for Key {
    fn from_ref(state: &CreateExpenseState) -> Self {
        state.cookie_key.clone()
    }
}

/// A route handler for adding an expense for the logged in user.
///
/// Responds with `{"success": bool}`, the message for the user is queued as
/// a flash message that the dashboard shows after the script reloads it.
pub async fn create_expense_endpoint(
    State(state): State<CreateExpenseState>,
    Extension(user_id): Extension<UserID>,
    jar: PrivateCookieJar,
    Form(form): Form<ExpenseForm>,
) -> Response {
    let result = form.validate().and_then(|new_expense| {
        let connection = state.db_connection.lock().map_err(|error| {
            tracing::error!("could not acquire database lock: {error}");
            Error::DatabaseLockError
        })?;

        unit_of_work(&connection, |transaction| {
            create_expense(new_expense, user_id, transaction)
        })
    });

    match result {
        Ok(expense) => {
            tracing::debug!("User {user_id} added expense {}", expense.id);
            (
                push_flash(jar, FlashMessage::success("Expense added successfully!")),
                Json(Acknowledgement::success()),
            )
                .into_response()
        }
        Err(error) => {
            if error.kind() != ErrorKind::Validation {
                tracing::error!("could not create expense for user {user_id}: {error}");
            }

            (
                push_flash(jar, FlashMessage::error(error.user_message("adding expense"))),
                error.into_json_response(),
            )
                .into_response()
        }
    }
}
