//! Where to send a user after they log in.
//!
//! Only relative paths on this site are accepted so the `redirect_url`
//! query parameter cannot be used as an open redirect.

use axum::{extract::Request, http::Uri};

use crate::endpoints;

fn is_safe_redirect_url(redirect_url: &str) -> bool {
    if !redirect_url.starts_with('/') || redirect_url.starts_with("//") {
        return false;
    }

    let path = redirect_url
        .split_once('?')
        .map_or(redirect_url, |(path, _)| path);

    path != endpoints::LOG_IN && path != endpoints::LOG_OUT && path != endpoints::SIGN_UP
}

/// Reduce `raw_url` to its path and query, or `None` if it is not a
/// relative path on this site.
pub fn normalize_redirect_url(raw_url: &str) -> Option<String> {
    let uri = raw_url.parse::<Uri>().ok()?;

    if uri.scheme().is_some() || uri.authority().is_some() {
        return None;
    }

    let path_and_query = uri.path_and_query()?.as_str();

    is_safe_redirect_url(path_and_query).then(|| path_and_query.to_owned())
}

/// Whether `request` was sent by HTMX rather than a page navigation.
pub(crate) fn is_hx_request(request: &Request) -> bool {
    request
        .headers()
        .get("hx-request")
        .and_then(|header| header.to_str().ok())
        .is_some_and(|header| header.eq_ignore_ascii_case("true"))
}

/// The log-in URL that brings the user back to what `request` was after.
///
/// HTMX requests point back to the page the user is looking at, taken from
/// the `HX-Current-URL` header, since the request URI is only a fragment
/// endpoint.
pub fn build_log_in_redirect_url(request: &Request) -> Option<String> {
    let redirect_target = if is_hx_request(request) {
        redirect_target_from_hx_current_url(request)?
    } else {
        normalize_redirect_url(request.uri().path_and_query()?.as_str())?
    };

    build_log_in_redirect_url_from_target(&redirect_target)
}

/// The log-in URL with `redirect_target` in the `redirect_url` query parameter.
pub fn build_log_in_redirect_url_from_target(redirect_target: &str) -> Option<String> {
    match serde_urlencoded::to_string([("redirect_url", redirect_target)]) {
        Ok(query) => Some(format!("{}?{}", endpoints::LOG_IN, query)),
        Err(error) => {
            tracing::error!("Could not encode redirect URL {redirect_target}: {error}");
            None
        }
    }
}

fn redirect_target_from_hx_current_url(request: &Request) -> Option<String> {
    let Some(current_url) = request
        .headers()
        .get("hx-current-url")
        .and_then(|header| header.to_str().ok())
    else {
        tracing::warn!("Missing HX-Current-URL header for HTMX request.");
        return None;
    };

    // Unlike form input, the browser sends the full URL here.
    let redirect_url = current_url
        .parse::<Uri>()
        .ok()
        .and_then(|uri| uri.path_and_query().map(|path| path.as_str().to_owned()))
        .filter(|path| is_safe_redirect_url(path));

    if redirect_url.is_none() {
        tracing::warn!("Invalid HX-Current-URL header value: {current_url}");
    }

    redirect_url
}

#[cfg(test)]
mod redirect_tests {
    use axum::{body::Body, extract::Request};

    use crate::endpoints;

    use super::{build_log_in_redirect_url, normalize_redirect_url};

    #[test]
    fn keeps_relative_path_and_query() {
        assert_eq!(
            normalize_redirect_url("/dashboard?month=2025-01"),
            Some("/dashboard?month=2025-01".to_owned())
        );
    }

    #[test]
    fn rejects_absolute_and_protocol_relative_urls() {
        assert_eq!(normalize_redirect_url("https://example.com/home"), None);
        assert_eq!(normalize_redirect_url("//example.com/home"), None);
        assert_eq!(normalize_redirect_url("home"), None);
    }

    #[test]
    fn rejects_auth_pages() {
        assert_eq!(normalize_redirect_url(endpoints::LOG_IN), None);
        assert_eq!(normalize_redirect_url("/login?redirect_url=%2Fhome"), None);
        assert_eq!(normalize_redirect_url(endpoints::LOG_OUT), None);
    }

    #[test]
    fn page_request_redirects_back_to_itself() {
        let request = Request::builder()
            .uri("/reports?year=2025")
            .body(Body::empty())
            .unwrap();

        assert_eq!(
            build_log_in_redirect_url(&request),
            Some("/login?redirect_url=%2Freports%3Fyear%3D2025".to_owned())
        );
    }

    #[test]
    fn hx_request_redirects_back_to_current_page() {
        let request = Request::builder()
            .uri("/accounts/delete/1")
            .header("HX-Request", "true")
            .header("HX-Current-URL", "http://localhost:3000/accounts")
            .body(Body::empty())
            .unwrap();

        assert_eq!(
            build_log_in_redirect_url(&request),
            Some("/login?redirect_url=%2Faccounts".to_owned())
        );
    }

    #[test]
    fn hx_request_without_current_url_has_no_redirect() {
        let request = Request::builder()
            .uri("/accounts/delete/1")
            .header("HX-Request", "true")
            .body(Body::empty())
            .unwrap();

        assert_eq!(build_log_in_redirect_url(&request), None);
    }
}
