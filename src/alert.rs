//! Alert messages returned to HTMX requests.
//!
//! An alert is swapped out-of-band into the `#alert-container` element that
//! [crate::html::base] places on every page, so any HTMX response can show
//! one regardless of its target.

use axum::response::{Html, IntoResponse, Response};
use maud::{Markup, html};

/// A dismissable success or error message.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// A success message with a second line of explanation.
    Success { message: String, details: String },
    /// A success message on its own.
    SuccessSimple { message: String },
    /// An error message with a second line explaining how to fix it.
    Error { message: String, details: String },
    /// An error message on its own.
    ErrorSimple { message: String },
}

impl Alert {
    fn is_success(&self) -> bool {
        matches!(self, Alert::Success { .. } | Alert::SuccessSimple { .. })
    }

    fn message(&self) -> &str {
        match self {
            Alert::Success { message, .. }
            | Alert::SuccessSimple { message }
            | Alert::Error { message, .. }
            | Alert::ErrorSimple { message } => message,
        }
    }

    fn details(&self) -> Option<&str> {
        match self {
            Alert::Success { details, .. } | Alert::Error { details, .. } => Some(details),
            Alert::SuccessSimple { .. } | Alert::ErrorSimple { .. } => None,
        }
    }

    pub fn into_html(self) -> Markup {
        let (alert_style, role) = if self.is_success() {
            (
                "text-green-800 border-green-300 bg-green-50 dark:bg-gray-800 \
                dark:text-green-400 dark:border-green-800",
                "status",
            )
        } else {
            (
                "text-red-800 border-red-300 bg-red-50 dark:bg-gray-800 \
                dark:text-red-400 dark:border-red-800",
                "alert",
            )
        };

        html! {
            div
                id="alert-container"
                hx-swap-oob="true"
                class="w-full max-w-md px-4"
                style="position: fixed; bottom: 1rem; left: 50%; transform: translateX(-50%); z-index: 9999;"
            {
                div
                    role=(role)
                    class={ "flex items-start justify-between p-4 text-sm border rounded-lg " (alert_style) }
                {
                    div
                    {
                        p class="font-medium" { (self.message()) }

                        @if let Some(details) = self.details() {
                            p class="mt-1" { (details) }
                        }
                    }

                    button
                        type="button"
                        class="ms-4 font-bold"
                        aria-label="Dismiss"
                        onclick="this.closest('#alert-container').classList.add('hidden')"
                    { "×" }
                }
            }
        }
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        Html(self.into_html().into_string()).into_response()
    }
}
