//! Displays accounts and their balances, with forms to add and edit them.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    account::{Account, DEFAULT_ACCOUNT_NUMBER, DEFAULT_ACCOUNT_TYPE, get_user_accounts},
    auth::UserID,
    endpoints::{self, format_endpoint},
    flash::{flash_messages_view, take_flashes},
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, CARD_STYLE, FORM_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, format_currency,
    },
    navigation::NavBar,
};

/// The state needed for the [get_accounts_page](crate::account::get_accounts_page) route handler.
#[derive(Debug, Clone)]
pub struct AccountState {
    pub cookie_key: Key,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AccountState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

impl FromRef<AccountState> for Key {
    fn from_ref(state: &AccountState) -> Self {
        state.cookie_key.clone()
    }
}

/// The inputs shared by the create and edit forms.
///
/// `id_prefix` keeps the element IDs unique when several forms are on the page.
fn account_form_fields(id_prefix: &str, account: Option<&Account>) -> Markup {
    let balance = account.map(|account| format!("{:.2}", account.balance));

    html! {
        div
        {
            label for={ (id_prefix) "-name" } class=(FORM_LABEL_STYLE) { "Name" }
            input
                type="text"
                name="name"
                id={ (id_prefix) "-name" }
                required
                value=[account.map(|account| account.name.as_str())]
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label for={ (id_prefix) "-number" } class=(FORM_LABEL_STYLE) { "Number" }
            input
                type="text"
                name="number"
                id={ (id_prefix) "-number" }
                placeholder=(DEFAULT_ACCOUNT_NUMBER)
                value=[account.map(|account| account.number.as_str())]
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label for={ (id_prefix) "-type" } class=(FORM_LABEL_STYLE) { "Type" }
            input
                type="text"
                name="type"
                id={ (id_prefix) "-type" }
                placeholder=(DEFAULT_ACCOUNT_TYPE)
                value=[account.map(|account| account.account_type.as_str())]
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label for={ (id_prefix) "-balance" } class=(FORM_LABEL_STYLE) { "Balance" }
            input
                type="number"
                name="balance"
                id={ (id_prefix) "-balance" }
                step="0.01"
                placeholder="0.00"
                value=[balance]
                class=(FORM_TEXT_INPUT_STYLE);
        }
    }
}

fn account_row(account: &Account) -> Markup {
    let update_url = format_endpoint(endpoints::UPDATE_ACCOUNT, account.id);
    let delete_url = format_endpoint(endpoints::DELETE_ACCOUNT, account.id);
    let id_prefix = format!("account-{}", account.id);

    html! {
        tr class=(TABLE_ROW_STYLE) data-account-id=(account.id)
        {
            th
                scope="row"
                class="px-6 py-4 font-medium text-gray-900 whitespace-nowrap dark:text-white"
            {
                (account.name)
            }
            td class=(TABLE_CELL_STYLE) { (account.number) }
            td class=(TABLE_CELL_STYLE) { (account.account_type) }
            td class="px-6 py-4 text-right tabular-nums" { (format_currency(account.balance)) }
            td class=(TABLE_CELL_STYLE)
            {
                details
                {
                    summary class={ "cursor-pointer " (LINK_STYLE) } { "Edit" }

                    form
                        hx-post=(update_url)
                        hx-target-error="#alert-container"
                        class="mt-2 space-y-2"
                    {
                        (account_form_fields(&id_prefix, Some(account)))

                        button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save" }
                    }
                }

                button
                    type="button"
                    hx-post=(delete_url)
                    hx-confirm={
                        "Are you sure you want to delete the account '" (account.name)
                        "'? This cannot be undone."
                    }
                    hx-target-error="#alert-container"
                    class={ "mt-2 " (BUTTON_DELETE_STYLE) }
                {
                    "Delete"
                }
            }
        }
    }
}

fn accounts_view(accounts: &[Account], flashes: &Markup) -> Markup {
    let total_balance: f64 = accounts.iter().map(|account| account.balance).sum();

    let content = html!(
        (NavBar::new(endpoints::ACCOUNTS).into_html())

        main class=(PAGE_CONTAINER_STYLE)
        {
            (flashes)

            section class="w-full max-w-5xl space-y-6"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Accounts" }

                    p id="total-balance" class="text-lg"
                    {
                        "Total: " (format_currency(total_balance))
                    }
                }

                div class="overflow-x-auto"
                {
                    table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Number" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Type" }
                                th scope="col" class="px-6 py-3 text-right" { "Balance" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for account in accounts {
                                (account_row(account))
                            }

                            @if accounts.is_empty() {
                                tr
                                {
                                    td
                                        colspan="5"
                                        class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                                    {
                                        "No accounts found. Add one below."
                                    }
                                }
                            }
                        }
                    }
                }

                section class={ "max-w-md " (CARD_STYLE) }
                {
                    h2 class="mb-4 text-lg font-semibold" { "Add Account" }

                    form
                        id="create-account-form"
                        hx-post=(endpoints::ACCOUNTS)
                        hx-target-error="#alert-container"
                        class="space-y-4"
                    {
                        (account_form_fields("new-account", None))

                        button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add Account" }
                    }
                }
            }
        }
    );

    base("Accounts", &[], &content)
}

/// Renders the accounts page showing the user's accounts.
pub async fn get_accounts_page(
    State(state): State<AccountState>,
    Extension(user_id): Extension<UserID>,
    jar: PrivateCookieJar,
) -> Result<Response, Error> {
    let accounts = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_user_accounts(user_id, &connection)
            .inspect_err(|error| tracing::error!("could not get accounts: {error}"))?
    };

    let (jar, flashes) = take_flashes(jar);

    Ok((jar, accounts_view(&accounts, &flash_messages_view(&flashes))).into_response())
}
