//! Defines the endpoint for creating a new account.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{Form, PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    account::{AccountForm, create_account},
    auth::UserID,
    db::unit_of_work,
    endpoints,
    flash::{FlashMessage, push_flash},
};

/// The state needed to create, update or delete an account.
#[derive(Debug, Clone)]
pub struct AccountEndpointState {
    pub cookie_key: Key,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AccountEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

impl FromRef<AccountEndpointState> for Key {
    fn from_ref(state: &AccountEndpointState) -> Self {
        state.cookie_key.clone()
    }
}

/// The response for a successful change to the accounts: reload the
/// accounts page and show `message` on it.
pub(super) fn redirect_to_accounts(jar: PrivateCookieJar, message: &str) -> Response {
    (
        StatusCode::SEE_OTHER,
        HxRedirect(endpoints::ACCOUNTS.to_owned()),
        push_flash(jar, FlashMessage::success(message)),
    )
        .into_response()
}

/// A route handler for creating a new account, redirects to the accounts view on success.
pub async fn create_account_endpoint(
    State(state): State<AccountEndpointState>,
    Extension(user_id): Extension<UserID>,
    jar: PrivateCookieJar,
    Form(form): Form<AccountForm>,
) -> Response {
    let new_account = match form.validate() {
        Ok(new_account) => new_account,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match unit_of_work(&connection, |transaction| {
        create_account(new_account, user_id, transaction)
    }) {
        Ok(account) => {
            redirect_to_accounts(jar, &format!("Account \"{}\" created!", account.name))
        }
        Err(error) => {
            tracing::error!("Could not create account for user {user_id}: {error}");
            error.into_alert_response()
        }
    }
}
