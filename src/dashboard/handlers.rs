//! The dashboard page: totals, the form for adding an expense and the
//! table of expenses.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use maud::{Markup, html};
use rusqlite::Connection;
use time::UtcOffset;

use crate::{
    AppState, Error,
    aggregation::{Totals, income_expense_balance},
    auth::UserID,
    dashboard::{cards::totals_cards, table::expenses_table},
    endpoints,
    expense::{EXPENSE_CATEGORIES, Expense, INCOME_CATEGORIES, get_user_expenses},
    flash::{FlashMessage, flash_messages_view, take_flashes},
    html::{
        BUTTON_PRIMARY_STYLE, CARD_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        PAGE_CONTAINER_STYLE, base,
    },
    navigation::NavBar,
    timezone::get_local_offset,
};

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    pub cookie_key: Key,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

impl FromRef<DashboardState> for Key {
    fn from_ref(state: &DashboardState) -> Self {
        state.cookie_key.clone()
    }
}

/// The categories for each type as JSON arrays for the form script.
struct CategoryLists {
    income: String,
    expense: String,
}

impl CategoryLists {
    fn new() -> Result<Self, Error> {
        let to_json = |categories: &[&str]| {
            serde_json::to_string(categories)
                .map_err(|error| Error::JSONSerializationError(error.to_string()))
        };

        Ok(Self {
            income: to_json(&INCOME_CATEGORIES)?,
            expense: to_json(&EXPENSE_CATEGORIES)?,
        })
    }
}

/// The form for adding an expense.
///
/// The script in `app.js` submits it to the add expense endpoint and swaps
/// the category options when the type changes. Income is selected initially.
fn expense_form(categories: &CategoryLists) -> Markup {
    html! {
        form
            id="expenseForm"
            method="post"
            action=(endpoints::ADD_EXPENSE)
            class={ "w-full space-y-4 " (CARD_STYLE) }
        {
            h2 class="text-lg font-semibold" { "Add Transaction" }

            fieldset class="flex gap-6"
            {
                legend class=(FORM_LABEL_STYLE) { "Type" }

                label class="flex items-center gap-2"
                {
                    input type="radio" id="incomeRadio" name="type" value="Income" checked required;
                    "Income"
                }

                label class="flex items-center gap-2"
                {
                    input type="radio" id="expenseRadio" name="type" value="Expense";
                    "Expense"
                }
            }

            div class="grid grid-cols-1 md:grid-cols-2 gap-4"
            {
                div
                {
                    label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }
                    input
                        type="number"
                        id="amount"
                        name="amount"
                        min="0.01"
                        step="0.01"
                        placeholder="0.00"
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="categorySelect" class=(FORM_LABEL_STYLE) { "Category" }
                    select
                        id="categorySelect"
                        name="category"
                        required
                        data-income-categories=(categories.income)
                        data-expense-categories=(categories.expense)
                        class=(FORM_TEXT_INPUT_STYLE)
                    {
                        option value="" selected disabled { "Select category" }

                        @for category in INCOME_CATEGORIES {
                            option value=(category) { (category) }
                        }
                    }
                }

                div
                {
                    label for="paymentMode" class=(FORM_LABEL_STYLE) { "Payment Mode" }
                    input
                        type="text"
                        id="paymentMode"
                        name="paymentMode"
                        placeholder="Cash, card, ..."
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="description" class=(FORM_LABEL_STYLE) { "Description" }
                    input
                        type="text"
                        id="description"
                        name="description"
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add" }
        }
    }
}

fn dashboard_view(
    expenses: &[Expense],
    totals: &Totals,
    categories: &CategoryLists,
    local_offset: UtcOffset,
    flashes: &[FlashMessage],
) -> Markup {
    let content = html! {
        (NavBar::new(endpoints::DASHBOARD_VIEW).into_html())

        div class=(PAGE_CONTAINER_STYLE)
        {
            (flash_messages_view(flashes))

            div class="w-full max-w-screen-xl space-y-6"
            {
                h1 class="text-2xl font-bold" { "Dashboard" }

                (totals_cards(totals))
                (expense_form(categories))
                (expenses_table(expenses, local_offset))
            }
        }
    };

    base("Dashboard", &[], &content)
}

/// Display the user's expenses, most recent first, with their totals.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
    jar: PrivateCookieJar,
) -> Response {
    let Some(local_offset) = get_local_offset(&state.local_timezone) else {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        return Error::InvalidTimezoneError(state.local_timezone).into_response();
    };

    let categories = match CategoryLists::new() {
        Ok(categories) => categories,
        Err(error) => return error.into_response(),
    };

    let expenses = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return Error::DatabaseLockError.into_response();
            }
        };

        match get_user_expenses(user_id, &connection) {
            Ok(expenses) => expenses,
            Err(error) => {
                tracing::error!("Could not get expenses for user {user_id}: {error}");
                return error.into_response();
            }
        }
    };

    let totals = income_expense_balance(&expenses);
    let (jar, flashes) = take_flashes(jar);

    (
        jar,
        dashboard_view(&expenses, &totals, &categories, local_offset, &flashes),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};
    use axum_extra::extract::PrivateCookieJar;
    use scraper::{Html, Selector};
    use time::macros::datetime;

    use crate::{
        UserID,
        app_state::create_cookie_key,
        endpoints,
        expense::{EXPENSE_CATEGORIES, ExpenseType, INCOME_CATEGORIES, NewExpense, create_expense},
        flash::{FlashMessage, push_flash},
        test_utils::{
            assert_valid_html, create_test_user, get_test_connection, parse_html_document,
        },
    };

    use super::{DashboardState, get_dashboard_page};

    fn get_state() -> (DashboardState, UserID, UserID) {
        let connection = get_test_connection();
        let user = create_test_user(&connection, "test@example.com");
        let other_user = create_test_user(&connection, "other@example.com");

        (
            DashboardState {
                cookie_key: create_cookie_key("foobar"),
                local_timezone: "Etc/UTC".to_owned(),
                db_connection: Arc::new(Mutex::new(connection)),
            },
            user.id,
            other_user.id,
        )
    }

    fn add_expense(
        state: &DashboardState,
        user_id: UserID,
        amount: f64,
        expense_type: ExpenseType,
        day: time::OffsetDateTime,
    ) {
        let connection = state.db_connection.lock().unwrap();
        create_expense(
            NewExpense::new(amount, "Food", expense_type)
                .unwrap()
                .date(day),
            user_id,
            &connection,
        )
        .unwrap();
    }

    fn text_of(document: &Html, selector: &str) -> String {
        document
            .select(&Selector::parse(selector).unwrap())
            .next()
            .unwrap_or_else(|| panic!("{selector} missing"))
            .text()
            .collect()
    }

    async fn get_document(state: DashboardState, user_id: UserID) -> Html {
        let jar = PrivateCookieJar::new(state.cookie_key.clone());
        let response = get_dashboard_page(State(state), Extension(user_id), jar).await;
        assert_eq!(response.status(), StatusCode::OK);

        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        document
    }

    #[tokio::test]
    async fn shows_totals_and_expenses_most_recent_first() {
        let (state, user_id, other_user_id) = get_state();
        add_expense(&state, user_id, 100.0, ExpenseType::Income, datetime!(2025-10-01 9:00 UTC));
        add_expense(&state, user_id, 40.0, ExpenseType::Expense, datetime!(2025-10-03 9:00 UTC));
        add_expense(&state, user_id, 10.0, ExpenseType::Expense, datetime!(2025-10-02 9:00 UTC));
        add_expense(&state, other_user_id, 999.0, ExpenseType::Expense, datetime!(2025-10-04 9:00 UTC));

        let document = get_document(state, user_id).await;

        assert!(text_of(&document, "#total-income").contains("$100.00"));
        assert!(text_of(&document, "#total-expense").contains("$50.00"));
        assert!(text_of(&document, "#total-balance").contains("$50.00"));

        let dates: Vec<String> = document
            .select(&Selector::parse("#expenses tbody tr td:first-child").unwrap())
            .map(|cell| cell.text().collect())
            .collect();
        assert_eq!(dates, vec!["03 Oct 2025", "02 Oct 2025", "01 Oct 2025"]);
    }

    #[tokio::test]
    async fn empty_dashboard_has_zero_totals() {
        let (state, user_id, _) = get_state();

        let document = get_document(state, user_id).await;

        assert!(text_of(&document, "#total-income").contains("$0.00"));
        assert!(text_of(&document, "#total-expense").contains("$0.00"));
        assert!(text_of(&document, "#total-balance").contains("$0.00"));
        assert!(text_of(&document, "#expenses tbody").contains("No transactions yet."));
    }

    #[tokio::test]
    async fn has_add_expense_form() {
        let (state, user_id, _) = get_state();

        let document = get_document(state, user_id).await;

        let form = document
            .select(&Selector::parse("form#expenseForm").unwrap())
            .next()
            .expect("expense form missing");
        assert_eq!(form.value().attr("action"), Some(endpoints::ADD_EXPENSE));

        for selector in [
            "input#incomeRadio[name=type][value=Income][checked]",
            "input#expenseRadio[name=type][value=Expense]",
            "input[name=amount][type=number][required]",
            "input[name=paymentMode]",
            "input[name=description]",
            "button[type=submit]",
        ] {
            assert!(
                form.select(&Selector::parse(selector).unwrap()).next().is_some(),
                "missing {selector}"
            );
        }

        let select = form
            .select(&Selector::parse("select#categorySelect[name=category]").unwrap())
            .next()
            .expect("category select missing");
        let options: Vec<&str> = select
            .select(&Selector::parse("option:not([disabled])").unwrap())
            .filter_map(|option| option.value().attr("value"))
            .collect();
        assert_eq!(options, INCOME_CATEGORIES);

        let expense_categories: Vec<String> = serde_json::from_str(
            select.value().attr("data-expense-categories").unwrap(),
        )
        .unwrap();
        assert_eq!(expense_categories, EXPENSE_CATEGORIES);
    }

    #[tokio::test]
    async fn shows_flash_messages() {
        let (state, user_id, _) = get_state();
        let jar = push_flash(
            PrivateCookieJar::new(state.cookie_key.clone()),
            FlashMessage::success("Expense added successfully!"),
        );

        let response = get_dashboard_page(State(state), Extension(user_id), jar).await;

        let document = parse_html_document(response).await;
        assert_eq!(
            text_of(&document, "#flash-messages [role=alert] span"),
            "Expense added successfully!"
        );
    }
}
