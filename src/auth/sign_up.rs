//! The sign-up page and the handler for registering a new user.

use std::{
    str::FromStr,
    sync::{Arc, Mutex},
};

use axum::{
    Form,
    extract::{FromRef, State},
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
    AppState, Error, PasswordHash, ValidatedPassword,
    auth::{create_user, invalidate_auth_cookie, set_auth_cookie},
    endpoints,
    flash::{FlashMessage, push_flash},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base, email_input, link,
        loading_spinner, log_in_register, password_input,
    },
    timezone::get_local_offset,
};

/// The minimum number of characters the password should have to be considered
/// valid on the client side (server-side validation is done on top of this).
const PASSWORD_INPUT_MIN_LENGTH: u8 = 8;

const PASSWORDS_DO_NOT_MATCH_MSG: &str = "Passwords do not match.";
const INTERNAL_ERROR_MSG: &str = "An internal error occurred. Please try again later.";

fn first_name_input(first_name: &str, error_message: Option<&str>) -> Markup {
    html! {
        div
        {
            label for="first_name" class=(FORM_LABEL_STYLE) { "First Name" }

            input
                type="text"
                name="first_name"
                id="first_name"
                placeholder="Jane"
                class=(FORM_TEXT_INPUT_STYLE)
                required
                minlength="2"
                autofocus[error_message.is_some()]
                value=(first_name);

            @if let Some(error_message) = error_message
            {
                p class="text-red-500 text-base" { (error_message) }
            }
        }
    }
}

fn confirm_password_input(error_message: Option<&str>) -> Markup {
    html! {
        div
        {
            label for="confirm_password" class=(FORM_LABEL_STYLE) { "Confirm Password" }

            input
                type="password"
                name="confirm_password"
                id="confirm_password"
                placeholder="••••••••"
                class=(FORM_TEXT_INPUT_STYLE)
                required
                minlength=(PASSWORD_INPUT_MIN_LENGTH)
                autofocus[error_message.is_some()];

            @if let Some(error_message) = error_message
            {
                p class="text-red-500 text-base" { (error_message) }
            }
        }
    }
}

/// The field values and errors to render the sign-up form with.
#[derive(Default)]
struct SignUpFormView<'a> {
    email: &'a str,
    first_name: &'a str,
    email_error: Option<&'a str>,
    first_name_error: Option<&'a str>,
    password_error: Option<&'a str>,
    confirm_password_error: Option<&'a str>,
}

fn sign_up_form(view: SignUpFormView) -> Markup {
    html! {
        form
            hx-post=(endpoints::SIGN_UP)
            hx-indicator="#indicator"
            hx-disabled-elt="#email, #first_name, #password, #confirm_password, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            (email_input(view.email, view.email_error))
            (first_name_input(view.first_name, view.first_name_error))
            (password_input("", PASSWORD_INPUT_MIN_LENGTH, view.password_error))
            (confirm_password_input(view.confirm_password_error))

            button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator"
                {
                    (loading_spinner())
                }
                "Sign up"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Already have an account? "
                (link(endpoints::LOG_IN, "Log in here"))
            }
        }
    }
}

/// Display the sign-up page.
pub async fn get_sign_up_page() -> Response {
    let form = sign_up_form(SignUpFormView::default());
    let content = log_in_register("Create an account", &form);

    base("Sign Up", &[], &content).into_response()
}

/// The state needed for creating a new user.
#[derive(Debug, Clone)]
pub struct SignUpState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SignUpState {
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
impl FromRef<SignUpState> for Key {
    fn from_ref(state: &SignUpState) -> Self {
        state.cookie_key.clone()
    }
}

#[derive(Serialize, Deserialize)]
pub struct SignUpForm {
    pub email: String,
    pub first_name: String,
    pub password: String,
    pub confirm_password: String,
}

/// Register a new user and log them in.
///
/// Validation failures re-render the form with the error next to the
/// offending field. On success the auth cookie is set and the client is
/// redirected to the home page.
pub async fn post_sign_up(
    State(state): State<SignUpState>,
    jar: PrivateCookieJar,
    Form(user_data): Form<SignUpForm>,
) -> Response {
    let email_text = user_data.email.trim();
    let first_name = user_data.first_name.trim();
    let form_view = SignUpFormView {
        email: email_text,
        first_name,
        ..Default::default()
    };

    let email = match EmailAddress::from_str(email_text) {
        Ok(email) => email,
        Err(_) => {
            let message = Error::InvalidEmail(email_text.to_owned()).to_string();
            return sign_up_form(SignUpFormView {
                email_error: Some(&message),
                ..form_view
            })
            .into_response();
        }
    };

    if first_name.chars().count() < 2 {
        let message = Error::FirstNameTooShort.to_string();
        return sign_up_form(SignUpFormView {
            first_name_error: Some(&message),
            ..form_view
        })
        .into_response();
    }

    if user_data.password != user_data.confirm_password {
        return sign_up_form(SignUpFormView {
            confirm_password_error: Some(PASSWORDS_DO_NOT_MATCH_MSG),
            ..form_view
        })
        .into_response();
    }

    let validated_password =
        match ValidatedPassword::new(&user_data.password, &[email_text, first_name]) {
            Ok(password) => password,
            Err(error) => {
                let message = error.to_string();
                return sign_up_form(SignUpFormView {
                    password_error: Some(&message),
                    ..form_view
                })
                .into_response();
            }
        };

    let password_hash = match PasswordHash::new(validated_password, PasswordHash::DEFAULT_COST) {
        Ok(hash) => hash,
        Err(error) => {
            tracing::error!("an error occurred while hashing a password: {error}");
            return sign_up_form(SignUpFormView {
                password_error: Some(INTERNAL_ERROR_MSG),
                ..form_view
            })
            .into_response();
        }
    };

    let Some(local_offset) = get_local_offset(&state.local_timezone) else {
        return Error::InvalidTimezoneError(state.local_timezone).into_response();
    };

    let user = match state.db_connection.lock() {
        Ok(connection) => create_user(&email, first_name, password_hash, &connection),
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            Err(Error::DatabaseLockError)
        }
    };

    let user = match user {
        Ok(user) => user,
        Err(Error::DuplicateEmail) => {
            let message = Error::DuplicateEmail.to_string();
            return sign_up_form(SignUpFormView {
                email_error: Some(&message),
                ..form_view
            })
            .into_response();
        }
        Err(error) => {
            tracing::error!("An unhandled error occurred while inserting a new user: {error}");
            return sign_up_form(SignUpFormView {
                email_error: Some(INTERNAL_ERROR_MSG),
                ..form_view
            })
            .into_response();
        }
    };

    tracing::info!("Registered user {} ({})", user.id, user.email);

    match set_auth_cookie(jar.clone(), user.id, state.cookie_duration, local_offset) {
        Ok(jar) => (
            StatusCode::SEE_OTHER,
            HxRedirect(endpoints::HOME_VIEW.to_owned()),
            push_flash(jar, FlashMessage::success("Account created!")),
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An error occurred while setting the auth cookie: {error}");
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
mod sign_up_page_tests {
    use axum::http::StatusCode;
    use scraper::Selector;

    use crate::{
        endpoints,
        test_utils::{
            assert_form_input, assert_form_submit_button, assert_hx_endpoint, assert_valid_html,
            must_get_form, parse_html_document,
        },
    };

    use super::get_sign_up_page;

    #[tokio::test]
    async fn sign_up_page_displays_form() {
        let response = get_sign_up_page().await;

        assert_eq!(response.status(), StatusCode::OK);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);

        let form = must_get_form(&document);
        assert_hx_endpoint(&form, endpoints::SIGN_UP, "hx-post");
        assert_form_input(&form, "email", "email");
        assert_form_input(&form, "first_name", "text");
        assert_form_input(&form, "password", "password");
        assert_form_input(&form, "confirm_password", "password");
        assert_form_submit_button(&form);

        let links: Vec<_> = form.select(&Selector::parse("a[href]").unwrap()).collect();
        assert_eq!(links.len(), 1, "want 1 link, got {}", links.len());
        assert_eq!(links[0].value().attr("href"), Some(endpoints::LOG_IN));
    }
}
