//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/accounts/delete/{account_id}', use [format_endpoint].

/// The public landing page.
pub const ROOT: &str = "/";
/// The page for writing and listing notes.
pub const HOME_VIEW: &str = "/home";
/// The page listing the user's expenses with totals.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The page showing the user's details.
pub const PROFILE_VIEW: &str = "/profile";
/// The page embedding the expense charts.
pub const CHARTS_VIEW: &str = "/charts";
/// The page with the category and monthly breakdown.
pub const REPORTS_VIEW: &str = "/reports";
/// The page for listing and creating accounts.
pub const ACCOUNTS: &str = "/accounts";
/// The route for getting the sign-up page and registering a user.
pub const SIGN_UP: &str = "/sign-up";
/// The route for getting the log in page and logging in.
pub const LOG_IN: &str = "/login";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/logout";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route to create an expense.
pub const ADD_EXPENSE: &str = "/add-expense";
/// The route to delete an expense.
pub const DELETE_EXPENSE: &str = "/delete-expense/{expense_id}";
/// The route to delete a note, the note ID is sent in the JSON body.
pub const DELETE_NOTE: &str = "/delete-note";
/// The route to update an account.
pub const UPDATE_ACCOUNT: &str = "/accounts/update/{account_id}";
/// The route to delete an account.
pub const DELETE_ACCOUNT: &str = "/accounts/delete/{account_id}";
/// The PNG pie chart of expenses by category.
pub const EXPENSE_PIE_CHART: &str = "/expense_pie_chart";
/// The PNG bar chart of expenses by category.
pub const EXPENSE_BAR_CHART: &str = "/expense_bar_chart";
/// The PNG line chart of expenses by category.
pub const EXPENSE_LINE_CHART: &str = "/expense_line_chart";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/users/{user_id}', '{user_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let mut param_start = None;
    let mut param_end = None;

    for (i, c) in endpoint_path.chars().enumerate() {
        if c == '{' {
            param_start = Some(i);
        } else if param_start.is_some() && c == '}' {
            param_end = Some(i + 1);
            break;
        }
    }

    let param_start = match param_start {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = param_end.unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
