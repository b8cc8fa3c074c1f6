//! Cookies set and read by the web layer.
//!
//! Two cookies are used: the session id ([`SESSION_COOKIE`]) and pending
//! flash notices ([`crate::flash::FLASH_COOKIE`]). Both are `HttpOnly`,
//! `SameSite=Lax` and scoped to `/`.

use axum::http::HeaderMap;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "ticketing_session";

/// Value of cookie `name` sent with the request.
#[must_use]
pub fn read(headers: &HeaderMap, name: &str) -> Option<String> {
    CookieJar::from_headers(headers)
        .get(name)
        .map(|cookie| cookie.value().to_string())
}

/// A browser-session cookie with the shared attributes.
#[must_use]
pub fn scoped(name: &'static str, value: impl Into<String>) -> Cookie<'static> {
    Cookie::build((name, value.into()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// The session cookie for a fresh login.
#[must_use]
pub fn session(session_id: impl Into<String>, max_age_secs: i64, secure: bool) -> Cookie<'static> {
    let mut cookie = scoped(SESSION_COOKIE, session_id);
    cookie.set_max_age(time::Duration::seconds(max_age_secs));
    cookie.set_secure(secure);
    cookie
}

/// A cookie that removes `name` from the client.
#[must_use]
pub fn removal(name: &'static str) -> Cookie<'static> {
    let mut cookie = scoped(name, "");
    cookie.make_removal();
    cookie
}
