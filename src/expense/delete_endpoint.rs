//! Defines the endpoint for deleting an expense.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use rusqlite::Connection;

use crate::{
    Acknowledgement, AppState, Error,
    auth::UserID,
    db::unit_of_work,
    expense::{ExpenseId, delete_expense},
    flash::{FlashMessage, push_flash},
};

#[derive(Debug, Clone)]
pub struct DeleteExpenseState {
    pub cookie_key: Key,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

impl FromRef<DeleteExpenseState> for Key {
    fn from_ref(state: &DeleteExpenseState) -> Self {
        state.cookie_key.clone()
    }
}

/// A route handler for deleting an expense owned by the logged in user.
pub async fn delete_expense_endpoint(
    Path(expense_id): Path<ExpenseId>,
    State(state): State<DeleteExpenseState>,
    Extension(user_id): Extension<UserID>,
    jar: PrivateCookieJar,
) -> Response {
    let result = match state.db_connection.lock() {
        Ok(connection) => unit_of_work(&connection, |transaction| {
            delete_expense(expense_id, user_id, transaction)
        }),
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            Err(Error::DatabaseLockError)
        }
    };

    match result {
        Ok(()) => (
            push_flash(jar, FlashMessage::success("Expense deleted!")),
            Json(Acknowledgement::success()),
        )
            .into_response(),
        Err(error) => {
            tracing::warn!("User {user_id} could not delete expense {expense_id}: {error}");
            let message = match &error {
                Error::NotFound => "Expense not found!".to_owned(),
                error => error.user_message("deleting expense"),
            };

            (
                push_flash(jar, FlashMessage::error(message)),
                error.into_json_response(),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod delete_expense_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
    };
    use axum_extra::extract::PrivateCookieJar;

    use crate::{
        Acknowledgement,
        app_state::create_cookie_key,
        expense::{ExpenseType, NewExpense, count_expenses, create_expense},
        flash::FlashMessage,
        test_utils::{create_test_user, get_flash_messages, get_test_connection, parse_json_body},
    };

    use super::{DeleteExpenseState, delete_expense_endpoint};

    #[tokio::test]
    async fn owner_can_delete_expense() {
        let connection = get_test_connection();
        let user = create_test_user(&connection, "test@example.com");
        let expense = create_expense(
            NewExpense::new(10.0, "Food", ExpenseType::Expense).unwrap(),
            user.id,
            &connection,
        )
        .unwrap();
        let state = DeleteExpenseState {
            cookie_key: create_cookie_key("foobar"),
            db_connection: Arc::new(Mutex::new(connection)),
        };
        let key = state.cookie_key.clone();

        let response = delete_expense_endpoint(
            Path(expense.id),
            State(state.clone()),
            Extension(user.id),
            PrivateCookieJar::new(key.clone()),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            get_flash_messages(&response, &key),
            vec![FlashMessage::success("Expense deleted!")]
        );
        let body: Acknowledgement = parse_json_body(response).await;
        assert_eq!(body, Acknowledgement::success());
        assert_eq!(
            count_expenses(user.id, &state.db_connection.lock().unwrap()),
            Ok(0)
        );
    }

    #[tokio::test]
    async fn other_user_cannot_delete_expense() {
        let connection = get_test_connection();
        let owner = create_test_user(&connection, "owner@example.com");
        let intruder = create_test_user(&connection, "intruder@example.com");
        let expense = create_expense(
            NewExpense::new(10.0, "Food", ExpenseType::Expense).unwrap(),
            owner.id,
            &connection,
        )
        .unwrap();
        let state = DeleteExpenseState {
            cookie_key: create_cookie_key("foobar"),
            db_connection: Arc::new(Mutex::new(connection)),
        };
        let key = state.cookie_key.clone();

        let response = delete_expense_endpoint(
            Path(expense.id),
            State(state.clone()),
            Extension(intruder.id),
            PrivateCookieJar::new(key.clone()),
        )
        .await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            get_flash_messages(&response, &key),
            vec![FlashMessage::error("Unauthorized!")]
        );
        let body: Acknowledgement = parse_json_body(response).await;
        assert_eq!(body, Acknowledgement::failure());
        assert_eq!(
            count_expenses(owner.id, &state.db_connection.lock().unwrap()),
            Ok(1)
        );
    }

    #[tokio::test]
    async fn missing_expense_is_not_found() {
        let connection = get_test_connection();
        let user = create_test_user(&connection, "test@example.com");
        let state = DeleteExpenseState {
            cookie_key: create_cookie_key("foobar"),
            db_connection: Arc::new(Mutex::new(connection)),
        };
        let key = state.cookie_key.clone();

        let response = delete_expense_endpoint(
            Path(404),
            State(state),
            Extension(user.id),
            PrivateCookieJar::new(key.clone()),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            get_flash_messages(&response, &key),
            vec![FlashMessage::error("Expense not found!")]
        );
    }
}
