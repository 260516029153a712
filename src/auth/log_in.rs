//! The log-in page and the handler for log-in form submissions.

use std::{
    str::FromStr,
    sync::{Arc, Mutex},
};

use axum::{
    Form,
    extract::{FromRef, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use email_address::EmailAddress;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    AppState, Error,
    auth::{get_user_by_email, invalidate_auth_cookie, normalize_redirect_url, set_auth_cookie},
    endpoints,
    flash::{FlashMessage, push_flash},
    html::{
        BUTTON_PRIMARY_STYLE, base, email_input, link, loading_spinner, log_in_register,
        password_input,
    },
    timezone::get_local_offset,
};

/// How long the auth cookie should last if the user selects "remember me" at log-in.
pub(super) const REMEMBER_ME_COOKIE_DURATION: Duration = Duration::days(7);

pub(super) const UNKNOWN_EMAIL_ERROR_MSG: &str = "Email does not exist.";
pub(super) const INVALID_CREDENTIALS_ERROR_MSG: &str = "Incorrect password, try again.";
const INTERNAL_ERROR_MSG: &str = "An internal error occurred. Please try again later.";

/// The form field values and errors to render the log-in form with.
#[derive(Default)]
struct LogInFormView<'a> {
    email: &'a str,
    email_error: Option<&'a str>,
    password_error: Option<&'a str>,
    redirect_url: Option<&'a str>,
}

fn log_in_form(view: LogInFormView) -> Markup {
    html! {
        form
            hx-post=(endpoints::LOG_IN)
            hx-indicator="#indicator"
            hx-disabled-elt="#email, #password, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            @if let Some(redirect_url) = view.redirect_url {
                input type="hidden" name="redirect_url" value=(redirect_url);
            }

            (email_input(view.email, view.email_error))
            (password_input("", 0, view.password_error))

            div class="flex items-center gap-x-3"
            {
                input
                    type="checkbox"
                    name="remember_me"
                    id="remember_me"
                    tabindex="0"
                    class="rounded-xs";

                label
                    for="remember_me"
                    class="block text-sm font-medium text-gray-900 dark:text-white"
                {
                    "Keep me logged in for one week"
                }
            }

            button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator"
                {
                    (loading_spinner())
                }
                "Log in"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400" {
                "Don't have an account? "
                (link(endpoints::SIGN_UP, "Sign up here"))
            }
        }
    }
}

fn parse_redirect_url(raw_url: Option<&str>, source: &str) -> Option<String> {
    let redirect_url = raw_url.and_then(normalize_redirect_url);

    if let (None, Some(raw_url)) = (&redirect_url, raw_url) {
        tracing::warn!("Invalid redirect URL from {source}: {raw_url}");
    }

    redirect_url
}

#[derive(Deserialize)]
pub struct RedirectQuery {
    pub redirect_url: Option<String>,
}

/// Display the log-in page.
pub async fn get_log_in_page(Query(query): Query<RedirectQuery>) -> Response {
    let redirect_url = parse_redirect_url(query.redirect_url.as_deref(), "log-in query");
    let form = log_in_form(LogInFormView {
        redirect_url: redirect_url.as_deref(),
        ..Default::default()
    });

    base("Log In", &[], &log_in_register("Log in to your account", &form)).into_response()
}

/// The state needed to perform a login.
#[derive(Debug, Clone)]
pub struct LoginState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LoginState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<LoginState> for Key {
    fn from_ref(state: &LoginState) -> Self {
        state.cookie_key.clone()
    }
}

/// The raw data entered by the user in the log-in form.
///
/// The password is kept as a plain string since it is only compared against
/// the stored hash.
#[derive(Clone, Serialize, Deserialize)]
pub struct LogInData {
    pub email: String,
    pub password: String,

    /// Whether to extend the initial auth cookie duration.
    ///
    /// This value comes from a checkbox, so it either has a string value or
    /// is not set. `Some` means `true` regardless of the value.
    pub remember_me: Option<String>,

    /// Where to go after logging in, only accepted if it is a relative path.
    pub redirect_url: Option<String>,
}

/// Handler for log-in requests via the POST method.
///
/// On success the auth cookie is set and the client is redirected to the
/// requested page, or the home page. Otherwise, the form is returned with an
/// error message explaining the problem.
pub async fn post_log_in(
    State(state): State<LoginState>,
    jar: PrivateCookieJar,
    Form(user_data): Form<LogInData>,
) -> Response {
    let redirect_url = parse_redirect_url(user_data.redirect_url.as_deref(), "log-in form");
    let form_view = LogInFormView {
        email: &user_data.email,
        redirect_url: redirect_url.as_deref(),
        ..Default::default()
    };

    let email = match EmailAddress::from_str(user_data.email.trim()) {
        Ok(email) => email,
        Err(_) => {
            return log_in_form(LogInFormView {
                email_error: Some(UNKNOWN_EMAIL_ERROR_MSG),
                ..form_view
            })
            .into_response();
        }
    };

    let user = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return log_in_form(LogInFormView {
                    password_error: Some(INTERNAL_ERROR_MSG),
                    ..form_view
                })
                .into_response();
            }
        };

        get_user_by_email(&email, &connection)
    };

    let user = match user {
        Ok(user) => user,
        Err(Error::NotFound) => {
            return log_in_form(LogInFormView {
                email_error: Some(UNKNOWN_EMAIL_ERROR_MSG),
                ..form_view
            })
            .into_response();
        }
        Err(error) => {
            tracing::error!("Unhandled error while looking up {email}: {error}");
            return log_in_form(LogInFormView {
                password_error: Some(INTERNAL_ERROR_MSG),
                ..form_view
            })
            .into_response();
        }
    };

    match user.password_hash.verify(&user_data.password) {
        Ok(true) => {}
        Ok(false) => {
            return log_in_form(LogInFormView {
                password_error: Some(INVALID_CREDENTIALS_ERROR_MSG),
                ..form_view
            })
            .into_response();
        }
        Err(error) => {
            tracing::error!("Unhandled error while verifying credentials: {error}");
            return log_in_form(LogInFormView {
                password_error: Some(INTERNAL_ERROR_MSG),
                ..form_view
            })
            .into_response();
        }
    }

    let cookie_duration = if user_data.remember_me.is_some() {
        REMEMBER_ME_COOKIE_DURATION
    } else {
        state.cookie_duration
    };

    let Some(local_offset) = get_local_offset(&state.local_timezone) else {
        return Error::InvalidTimezoneError(state.local_timezone).into_response();
    };

    let redirect_url = redirect_url.unwrap_or_else(|| endpoints::HOME_VIEW.to_owned());

    match set_auth_cookie(jar.clone(), user.id, cookie_duration, local_offset) {
        Ok(jar) => (
            StatusCode::SEE_OTHER,
            HxRedirect(redirect_url),
            push_flash(jar, FlashMessage::success("Logged in successfully!")),
        )
            .into_response(),
        Err(error) => {
            tracing::error!("Error setting auth cookie: {error}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                HxRedirect(endpoints::INTERNAL_ERROR_VIEW.to_owned()),
                invalidate_auth_cookie(jar),
            )
                .into_response()
        }
    }
}


#[cfg(test)]
mod log_in_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Router, http::StatusCode, routing::post};
    use axum_test::TestServer;
    use time::{Duration, OffsetDateTime};

    use crate::{
        app_state::create_cookie_key,
        auth::{COOKIE_TOKEN, DEFAULT_COOKIE_DURATION},
        endpoints,
        test_utils::{create_test_user, get_test_connection},
    };

    use super::{
        INVALID_CREDENTIALS_ERROR_MSG, LoginState, REMEMBER_ME_COOKIE_DURATION,
        UNKNOWN_EMAIL_ERROR_MSG, post_log_in,
    };

    fn get_test_server() -> TestServer {
        let connection = get_test_connection();
        create_test_user(&connection, "jane@example.com");

        let state = LoginState {
            cookie_key: create_cookie_key("foobar"),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            local_timezone: "Etc/UTC".to_owned(),
            db_connection: Arc::new(Mutex::new(connection)),
        };
        let app = Router::new()
            .route(endpoints::LOG_IN, post(post_log_in))
            .with_state(state);

        TestServer::new(app)
    }

    #[track_caller]
    fn assert_date_time_close(left: OffsetDateTime, right: OffsetDateTime) {
        assert!(
            (left - right).abs() < Duration::seconds(2),
            "got date time {left:?}, want {right:?}"
        );
    }

    #[tokio::test]
    async fn log_in_succeeds_with_valid_credentials() {
        let server = get_test_server();

        let response = server
            .post(endpoints::LOG_IN)
            .form(&[("email", "jane@example.com"), ("password", "hunter2")])
            .await;

        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header("hx-redirect"), endpoints::HOME_VIEW);
        assert_date_time_close(
            response.cookie(COOKIE_TOKEN).expires_datetime().unwrap(),
            OffsetDateTime::now_utc() + DEFAULT_COOKIE_DURATION,
        );
    }

    #[tokio::test]
    async fn remember_me_extends_auth_cookie() {
        let server = get_test_server();

        let response = server
            .post(endpoints::LOG_IN)
            .form(&[
                ("email", "jane@example.com"),
                ("password", "hunter2"),
                ("remember_me", "on"),
            ])
            .await;

        response.assert_status(StatusCode::SEE_OTHER);
        assert_date_time_close(
            response.cookie(COOKIE_TOKEN).expires_datetime().unwrap(),
            OffsetDateTime::now_utc() + REMEMBER_ME_COOKIE_DURATION,
        );
    }

    #[tokio::test]
    async fn log_in_redirects_to_requested_url() {
        let server = get_test_server();

        let response = server
            .post(endpoints::LOG_IN)
            .form(&[
                ("email", "jane@example.com"),
                ("password", "hunter2"),
                ("redirect_url", "/reports"),
            ])
            .await;

        assert_eq!(response.header("hx-redirect"), "/reports");
    }

    #[tokio::test]
    async fn log_in_ignores_external_redirect_url() {
        let server = get_test_server();

        let response = server
            .post(endpoints::LOG_IN)
            .form(&[
                ("email", "jane@example.com"),
                ("password", "hunter2"),
                ("redirect_url", "https://example.com"),
            ])
            .await;

        assert_eq!(response.header("hx-redirect"), endpoints::HOME_VIEW);
    }

    #[tokio::test]
    async fn unknown_email_is_reported() {
        let server = get_test_server();

        let response = server
            .post(endpoints::LOG_IN)
            .form(&[("email", "john@example.com"), ("password", "hunter2")])
            .await;

        response.assert_status_ok();
        assert!(response.text().contains(UNKNOWN_EMAIL_ERROR_MSG));
        assert!(response.maybe_cookie(COOKIE_TOKEN).is_none());
    }

    #[tokio::test]
    async fn wrong_password_is_reported() {
        let server = get_test_server();

        let response = server
            .post(endpoints::LOG_IN)
            .form(&[("email", "jane@example.com"), ("password", "hunter3")])
            .await;

        response.assert_status_ok();
        assert!(response.text().contains(INVALID_CREDENTIALS_ERROR_MSG));
        assert!(response.maybe_cookie(COOKIE_TOKEN).is_none());
    }

    #[tokio::test]
    async fn missing_fields_are_rejected() {
        let server = get_test_server();

        server
            .post(endpoints::LOG_IN)
            .content_type("application/x-www-form-urlencoded")
            .await
            .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }
}
