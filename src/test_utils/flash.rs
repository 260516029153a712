use axum::{
    body::Body,
    http::{HeaderMap, HeaderValue, header::COOKIE, header::SET_COOKIE},
    response::Response,
};
use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, Key},
};

use crate::flash::{FLASH_COOKIE, FlashMessage, take_flashes};

/// Decrypt the flash messages a response set.
pub(crate) fn get_flash_messages(response: &Response<Body>, key: &Key) -> Vec<FlashMessage> {
    let mut headers = HeaderMap::new();

    for header in response.headers().get_all(SET_COOKIE) {
        let cookie = Cookie::parse(header.to_str().unwrap().to_owned()).unwrap();

        if cookie.name() == FLASH_COOKIE {
            headers.append(
                COOKIE,
                HeaderValue::from_str(&format!("{}={}", cookie.name(), cookie.value())).unwrap(),
            );
        }
    }

    take_flashes(PrivateCookieJar::from_headers(&headers, key.clone())).1
}
