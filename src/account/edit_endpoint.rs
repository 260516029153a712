//! Defines the endpoint for updating an account.

use axum::{
    Extension,
    extract::{Path, State},
    response::Response,
};
use axum_extra::extract::{Form, PrivateCookieJar};

use crate::{
    Error,
    account::{AccountForm, AccountId, create_endpoint::AccountEndpointState, update_account},
    auth::UserID,
    db::unit_of_work,
};

use super::create_endpoint::redirect_to_accounts;

/// A route handler for updating an account owned by the logged in user.
///
/// Responds with an HTMX redirect to the accounts page on success, or an
/// alert explaining why the account was not changed.
pub async fn edit_account_endpoint(
    State(state): State<AccountEndpointState>,
    Path(account_id): Path<AccountId>,
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
        update_account(account_id, new_account, user_id, transaction)
    }) {
        Ok(account) => {
            redirect_to_accounts(jar, &format!("Account \"{}\" updated!", account.name))
        }
        Err(error) => {
            tracing::warn!("User {user_id} could not update account {account_id}: {error}");
            error.into_alert_response()
        }
    }
}
