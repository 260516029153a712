//! One-shot messages that survive a redirect or page reload.
//!
//! Handlers push a [FlashMessage] into an encrypted cookie and the next page
//! that renders takes the messages out of the cookie and shows them once.

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use maud::{Markup, html};
use serde::{Deserialize, Serialize};

/// The name of the cookie holding the pending messages as JSON.
pub const FLASH_COOKIE: &str = "flash";

/// Whether a message reports a success or a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashCategory {
    Success,
    Error,
}

/// A message to show the user on the next page they see.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub category: FlashCategory,
    pub message: String,
}

impl FlashMessage {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            category: FlashCategory::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            category: FlashCategory::Error,
            message: message.into(),
        }
    }
}

fn read_flashes(jar: &PrivateCookieJar) -> Vec<FlashMessage> {
    let Some(cookie) = jar.get(FLASH_COOKIE) else {
        return Vec::new();
    };

    serde_json::from_str(cookie.value_trimmed()).unwrap_or_else(|error| {
        tracing::warn!("Discarding unreadable flash cookie: {error}");
        Vec::new()
    })
}

/// Queue `message` after any messages already in `jar`.
pub fn push_flash(jar: PrivateCookieJar, message: FlashMessage) -> PrivateCookieJar {
    let mut messages = read_flashes(&jar);
    messages.push(message);

    match serde_json::to_string(&messages) {
        Ok(value) => jar.add(
            Cookie::build((FLASH_COOKIE, value))
                .path("/")
                .http_only(true)
                .same_site(SameSite::Strict)
                .secure(true),
        ),
        Err(error) => {
            tracing::error!("Could not serialize flash messages: {error}");
            jar
        }
    }
}

/// Remove and return the queued messages.
pub fn take_flashes(jar: PrivateCookieJar) -> (PrivateCookieJar, Vec<FlashMessage>) {
    let messages = read_flashes(&jar);

    if jar.get(FLASH_COOKIE).is_none() {
        return (jar, messages);
    }

    (jar.remove(Cookie::build(FLASH_COOKIE).path("/")), messages)
}

pub fn flash_messages_view(messages: &[FlashMessage]) -> Markup {
    html! {
        @if !messages.is_empty() {
            div id="flash-messages" class="w-full max-w-2xl mx-auto space-y-2 mb-4"
            {
                @for flash in messages {
                    @let style = match flash.category {
                        FlashCategory::Success => "text-green-800 bg-green-50 border-green-300 \
                            dark:bg-gray-800 dark:text-green-400 dark:border-green-800",
                        FlashCategory::Error => "text-red-800 bg-red-50 border-red-300 \
                            dark:bg-gray-800 dark:text-red-400 dark:border-red-800",
                    };

                    div
                        role="alert"
                        data-category=(match flash.category {
                            FlashCategory::Success => "success",
                            FlashCategory::Error => "error",
                        })
                        class={ "flex items-center justify-between p-4 text-sm border rounded-lg " (style) }
                    {
                        span { (flash.message) }
                        button
                            type="button"
                            class="ms-4 font-bold"
                            aria-label="Dismiss"
                            onclick="this.parentElement.remove()"
                        { "×" }
                    }
                }
            }
        }
    }
}
