//! User accounts and authentication: sign-up, log-in, log-out, the auth
//! cookie and the middleware guarding the protected routes.

mod cookie;
mod log_in;
mod log_out;
mod middleware;
mod password;
mod redirect;
mod sign_up;
mod token;
mod user;

pub use cookie::{DEFAULT_COOKIE_DURATION, invalidate_auth_cookie, set_auth_cookie};
pub use log_in::{get_log_in_page, post_log_in};
pub use log_out::get_log_out;
pub use middleware::{auth_guard, auth_guard_hx};
pub use password::{PasswordHash, ValidatedPassword};
pub use redirect::normalize_redirect_url;
pub use sign_up::{get_sign_up_page, post_sign_up};
pub(crate) use token::Token;
pub use user::{
    User, UserID, create_user, create_user_table, get_user_by_email, get_user_by_id,
    update_password,
};

pub(crate) use cookie::get_token_from_cookies;

#[cfg(test)]
pub(crate) use cookie::COOKIE_TOKEN;
