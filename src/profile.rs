//! The profile page shows who is logged in and how much they have recorded.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    account::{count_accounts, get_total_account_balance},
    auth::{User, UserID, get_user_by_id},
    endpoints,
    expense::count_expenses,
    html::{CARD_STYLE, PAGE_CONTAINER_STYLE, base, format_currency},
    navigation::NavBar,
    note::count_notes,
};

/// The state needed for the profile page.
#[derive(Debug, Clone)]
pub struct ProfileState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ProfileState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

struct Profile {
    user: User,
    note_count: i64,
    expense_count: i64,
    account_count: i64,
    total_account_balance: f64,
}

fn get_profile(user_id: UserID, connection: &Connection) -> Result<Profile, Error> {
    Ok(Profile {
        user: get_user_by_id(user_id, connection)?,
        note_count: count_notes(user_id, connection)?,
        expense_count: count_expenses(user_id, connection)?,
        account_count: count_accounts(user_id, connection)?,
        total_account_balance: get_total_account_balance(user_id, connection)?,
    })
}

fn profile_row(id: &str, label: &str, value: &str) -> Markup {
    html! {
        div class="flex justify-between py-3"
        {
            dt class="text-gray-500 dark:text-gray-400" { (label) }
            dd id=(id) class="font-medium" { (value) }
        }
    }
}

fn profile_view(profile: &Profile) -> Markup {
    let content = html! {
        (NavBar::new(endpoints::PROFILE_VIEW).into_html())

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class={ "w-full max-w-md " (CARD_STYLE) }
            {
                h1 class="text-2xl font-bold mb-4" { "Profile" }

                dl class="divide-y divide-gray-200 dark:divide-gray-700"
                {
                    (profile_row("profile-email", "Email", profile.user.email.as_str()))
                    (profile_row("profile-first-name", "First name", &profile.user.first_name))
                    (profile_row("note-count", "Notes", &profile.note_count.to_string()))
                    (profile_row("expense-count", "Transactions", &profile.expense_count.to_string()))
                    (profile_row("account-count", "Accounts", &profile.account_count.to_string()))
                    (profile_row(
                        "total-account-balance",
                        "Total account balance",
                        &format_currency(profile.total_account_balance),
                    ))
                }
            }
        }
    };

    base("Profile", &[], &content)
}

/// Display the logged in user's details and record counts.
pub async fn get_profile_page(
    State(state): State<ProfileState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let profile = get_profile(user_id, &connection)
        .inspect_err(|error| tracing::error!("Could not get profile for user {user_id}: {error}"))?;

    Ok(profile_view(&profile).into_response())
}
