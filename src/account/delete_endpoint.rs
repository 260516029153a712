//! Defines the endpoint for deleting an account.

use axum::{
    Extension,
    extract::{Path, State},
    response::Response,
};
use axum_extra::extract::PrivateCookieJar;

use crate::{
    Error,
    account::{AccountId, create_endpoint::AccountEndpointState, delete_account},
    auth::UserID,
    db::unit_of_work,
};

use super::create_endpoint::redirect_to_accounts;

/// A route handler for deleting an account, redirects to the accounts view on success.
pub async fn delete_account_endpoint(
    State(state): State<AccountEndpointState>,
    Path(account_id): Path<AccountId>,
    Extension(user_id): Extension<UserID>,
    jar: PrivateCookieJar,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match unit_of_work(&connection, |transaction| {
        delete_account(account_id, user_id, transaction)
    }) {
        Ok(()) => redirect_to_accounts(jar, "Account deleted!"),
        Err(error) => {
            tracing::warn!("User {user_id} could not delete account {account_id}: {error}");
            error.into_alert_response()
        }
    }
}
