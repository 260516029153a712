//! The public landing page.

use axum::response::{IntoResponse, Response};
use axum_extra::extract::PrivateCookieJar;
use maud::{Markup, html};

use crate::{
    auth::get_token_from_cookies,
    endpoints,
    html::{APP_NAME, BUTTON_PRIMARY_STYLE, LINK_STYLE, base},
};

fn landing_view(is_logged_in: bool) -> Markup {
    let content = html! {
        section class="flex flex-col items-center justify-center min-h-screen px-6 text-center text-gray-900 dark:text-white"
        {
            h1 class="mb-4 text-4xl md:text-5xl font-extrabold tracking-tight" { (APP_NAME) }

            p class="mb-8 max-w-xl text-lg text-gray-600 dark:text-gray-400"
            {
                "Keep notes, log your income and expenses, track your account "
                "balances and see where your money goes."
            }

            div id="landing-links" class="flex flex-col sm:flex-row gap-4 w-full max-w-sm"
            {
                @if is_logged_in {
                    a href=(endpoints::DASHBOARD_VIEW) class=(BUTTON_PRIMARY_STYLE) { "Go to dashboard" }
                    a href=(endpoints::HOME_VIEW) class={ "self-center " (LINK_STYLE) } { "Notes" }
                } @else {
                    a href=(endpoints::LOG_IN) class=(BUTTON_PRIMARY_STYLE) { "Log in" }
                    a href=(endpoints::SIGN_UP) class={ "self-center " (LINK_STYLE) } { "Sign up" }
                }
            }
        }
    };

    base("Welcome", &[], &content)
}

/// Display the landing page, with links into the app for logged in users
/// and to the log-in and sign-up pages for everyone else.
pub async fn get_landing_page(jar: PrivateCookieJar) -> Response {
    let is_logged_in = get_token_from_cookies(&jar).is_ok();

    landing_view(is_logged_in).into_response()
}
