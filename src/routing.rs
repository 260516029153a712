//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    account::{
        create_account_endpoint, delete_account_endpoint, edit_account_endpoint,
        get_accounts_page,
    },
    auth::{
        auth_guard, auth_guard_hx, get_log_in_page, get_log_out, get_sign_up_page, post_log_in,
        post_sign_up,
    },
    chart::{get_charts_page, get_expense_bar_chart, get_expense_line_chart, get_expense_pie_chart},
    dashboard::get_dashboard_page,
    endpoints,
    expense::{create_expense_endpoint, delete_expense_endpoint},
    internal_server_error::get_internal_server_error_page,
    landing::get_landing_page,
    not_found::get_404_not_found,
    note::{delete_note_endpoint, get_home_page, post_note},
    profile::get_profile_page,
    report::get_report_page,
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::ROOT, get(get_landing_page))
        .route(
            endpoints::SIGN_UP,
            get(get_sign_up_page).post(post_sign_up),
        )
        .route(endpoints::LOG_IN, get(get_log_in_page).post(post_log_in))
        .route(endpoints::LOG_OUT, get(get_log_out))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let protected_routes = Router::new()
        .route(endpoints::HOME_VIEW, get(get_home_page).post(post_note))
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(endpoints::PROFILE_VIEW, get(get_profile_page))
        .route(endpoints::CHARTS_VIEW, get(get_charts_page))
        .route(endpoints::EXPENSE_PIE_CHART, get(get_expense_pie_chart))
        .route(endpoints::EXPENSE_BAR_CHART, get(get_expense_bar_chart))
        .route(endpoints::EXPENSE_LINE_CHART, get(get_expense_line_chart))
        .route(endpoints::ACCOUNTS, get(get_accounts_page))
        .route(endpoints::REPORTS_VIEW, get(get_report_page))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    // These routes are called by scripts and HTMX, so auth redirects have to use the HX-Redirect header.
    let protected_routes = protected_routes.merge(
        Router::new()
            .route(endpoints::ADD_EXPENSE, post(create_expense_endpoint))
            .route(endpoints::DELETE_EXPENSE, post(delete_expense_endpoint))
            .route(endpoints::DELETE_NOTE, post(delete_note_endpoint))
            .route(endpoints::ACCOUNTS, post(create_account_endpoint))
            .route(endpoints::UPDATE_ACCOUNT, post(edit_account_endpoint))
            .route(endpoints::DELETE_ACCOUNT, post(delete_account_endpoint))
            .layer(middleware::from_fn_with_state(state.clone(), auth_guard_hx)),
    );

    protected_routes
        .merge(unprotected_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}
