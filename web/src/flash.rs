//! Flash notices, page views and redirects.
//!
//! A form post answers `303 See Other` and may leave notices for the next
//! page. Notices travel in the [`FLASH_COOKIE`] cookie as base64-encoded
//! JSON; the next [`Page`] drains them into its `notices` field and clears
//! the cookie.

use crate::cookies;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;

/// Name of the flash cookie.
pub const FLASH_COOKIE: &str = "ticketing_flash";

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    /// Operation succeeded
    Success,
    /// Neutral information
    Info,
    /// Operation was refused
    Error,
}

/// A one-shot message shown on the next page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    /// Severity
    pub level: NoticeLevel,
    /// Text shown to the user
    pub message: String,
}

impl Notice {
    /// A success notice.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    /// An informational notice.
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    /// An error notice.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

fn encode_notices(notices: &[Notice]) -> Option<String> {
    serde_json::to_vec(notices)
        .ok()
        .map(|json| URL_SAFE_NO_PAD.encode(json))
}

fn decode_notices(raw: &str) -> Vec<Notice> {
    URL_SAFE_NO_PAD
        .decode(raw)
        .ok()
        .and_then(|json| serde_json::from_slice(&json).ok())
        .unwrap_or_default()
}

/// Notices pending for the current request.
///
/// Never rejects; a malformed cookie yields no notices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Flash(pub Vec<Notice>);

#[async_trait]
impl<S> FromRequestParts<S> for Flash
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(
            cookies::read(&parts.headers, FLASH_COOKIE)
                .map(|raw| decode_notices(&raw))
                .unwrap_or_default(),
        ))
    }
}

#[derive(Serialize)]
struct PageBody<T> {
    #[serde(flatten)]
    view: T,
    notices: Vec<Notice>,
}

/// A `200 OK` JSON page view with drained notices.
///
/// `view` must serialize as a JSON object; its fields sit next to
/// `notices` in the body.
#[derive(Debug)]
pub struct Page<T> {
    view: T,
    flash: Flash,
}

impl<T: Serialize> Page<T> {
    /// Render `view` together with the request's pending notices.
    pub const fn new(view: T, flash: Flash) -> Self {
        Self { view, flash }
    }
}

impl<T: Serialize> IntoResponse for Page<T> {
    fn into_response(self) -> Response {
        let mut jar = CookieJar::new();
        if !self.flash.0.is_empty() {
            jar = jar.add(cookies::removal(FLASH_COOKIE));
        }
        let body = PageBody {
            view: self.view,
            notices: self.flash.0,
        };
        (StatusCode::OK, jar, Json(body)).into_response()
    }
}

/// A `303 See Other` redirect, optionally carrying notices and cookies.
#[derive(Debug)]
#[must_use]
pub struct SeeOther {
    location: String,
    notices: Vec<Notice>,
    jar: CookieJar,
}

impl SeeOther {
    /// Redirect to `location`.
    pub fn to(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            notices: Vec::new(),
            jar: CookieJar::new(),
        }
    }

    /// Leave a notice for the next page.
    pub fn notice(mut self, notice: Notice) -> Self {
        self.notices.push(notice);
        self
    }

    /// Set or clear a cookie along with the redirect.
    pub fn cookie(mut self, cookie: Cookie<'static>) -> Self {
        self.jar = self.jar.add(cookie);
        self
    }

    /// Target of the redirect.
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }
}

impl IntoResponse for SeeOther {
    fn into_response(self) -> Response {
        let Ok(location) = HeaderValue::from_str(&self.location) else {
            tracing::warn!(location = %self.location, "Redirect target is not a valid header");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        };

        let mut jar = self.jar;
        if !self.notices.is_empty() {
            if let Some(encoded) = encode_notices(&self.notices) {
                jar = jar.add(cookies::scoped(FLASH_COOKIE, encoded));
            }
        }
        (StatusCode::SEE_OTHER, [(header::LOCATION, location)], jar).into_response()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn flash_cookie_of(response: &Response) -> Option<String> {
        response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find(|v| v.starts_with(&format!("{FLASH_COOKIE}=")))
            .map(str::to_string)
    }

    #[tokio::test]
    async fn test_notices_survive_the_redirect() {
        let response = SeeOther::to("/")
            .notice(Notice::error("Sorry, this event is sold out"))
            .into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/");

        let set_cookie = flash_cookie_of(&response).unwrap();
        let pair = set_cookie.split(';').next().unwrap().to_string();

        let req = Request::builder()
            .header(header::COOKIE, pair)
            .body(())
            .unwrap();
        let (mut parts, ()) = req.into_parts();
        let Ok(flash) = Flash::from_request_parts(&mut parts, &()).await;
        assert_eq!(flash.0, vec![Notice::error("Sorry, this event is sold out")]);
    }

    #[test]
    fn test_redirect_carries_extra_cookies_next_to_notices() {
        let response = SeeOther::to("/")
            .cookie(cookies::session("abc", 60, false))
            .notice(Notice::success("Welcome back"))
            .into_response();
        let set_cookies: Vec<_> = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect();
        assert_eq!(set_cookies.len(), 2);
        assert!(set_cookies
            .iter()
            .any(|v| v.starts_with("ticketing_session=abc") && v.contains("Max-Age=60")));
        assert!(flash_cookie_of(&response).is_some());
    }

    #[tokio::test]
    async fn test_garbage_cookie_yields_nothing() {
        let req = Request::builder()
            .header(header::COOKIE, "ticketing_flash=%%%not-base64")
            .body(())
            .unwrap();
        let (mut parts, ()) = req.into_parts();
        let Ok(flash) = Flash::from_request_parts(&mut parts, &()).await;
        assert!(flash.0.is_empty());
    }

    #[test]
    fn test_page_clears_drained_notices() {
        let page = Page::new(
            serde_json::json!({ "title": "Home" }),
            Flash(vec![Notice::info("Logged out")]),
        )
        .into_response();
        assert_eq!(page.status(), StatusCode::OK);
        assert!(flash_cookie_of(&page).unwrap().contains("Max-Age=0"));

        let quiet = Page::new(serde_json::json!({ "title": "Home" }), Flash::default())
            .into_response();
        assert!(flash_cookie_of(&quiet).is_none());
    }
}
