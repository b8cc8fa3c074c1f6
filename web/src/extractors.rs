//! Custom Axum extractors.
//!
//! - [`CorrelationId`]: the request's correlation id
//! - [`SessionToken`]: session id from the cookie or a bearer header
//! - [`CurrentCaller`]: the resolved [`Caller`] for this request
//!
//! # Example
//!
//! ```ignore
//! async fn handler(
//!     State(state): State<AppState>,
//!     CurrentCaller(caller): CurrentCaller,
//! ) -> Result<Json<Vec<TransactionRecord>>, AppError> {
//!     Ok(Json(state.history.history(&caller).await?))
//! }
//! ```

use crate::cookies::{self, SESSION_COOKIE};
use crate::error::AppError;
use crate::state::AppState;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use std::convert::Infallible;
use ticketing_auth::SessionId;
use ticketing_core::Caller;
use uuid::Uuid;

/// Correlation ID for request tracing.
///
/// Set by [`crate::middleware::correlation_id_layer`]; read from the
/// `X-Correlation-ID` header or generated when the layer is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorrelationId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for CorrelationId
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(id) = parts.extensions.get::<Self>() {
            return Ok(*id);
        }

        let correlation_id = parts
            .headers
            .get("X-Correlation-ID")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| Uuid::parse_str(s).ok())
            .unwrap_or_else(Uuid::new_v4);

        Ok(Self(correlation_id))
    }
}

/// Session id presented by the client, if any.
///
/// The session cookie wins over an `Authorization: Bearer <session-id>`
/// header. Unparseable values count as absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionToken(pub Option<SessionId>);

impl SessionToken {
    fn from_headers(headers: &HeaderMap) -> Self {
        let from_cookie = cookies::read(headers, SESSION_COOKIE).and_then(|raw| raw.parse().ok());
        let from_bearer = || {
            headers
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.strip_prefix("Bearer "))
                .and_then(|token| token.trim().parse().ok())
        };
        Self(from_cookie.or_else(from_bearer))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for SessionToken
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}

/// The caller behind this request.
///
/// Never rejects for missing or stale sessions (those resolve to
/// [`Caller::Anonymous`]); only a failing session or user store rejects,
/// with a 500.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentCaller(pub Caller);

#[async_trait]
impl FromRequestParts<AppState> for CurrentCaller {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let SessionToken(session_id) = SessionToken::from_headers(&parts.headers);
        let caller = state.identity.resolve(session_id).await?;
        Ok(Self(caller))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(builder: axum::http::request::Builder) -> Parts {
        builder.body(()).expect("Valid request").into_parts().0
    }

    #[tokio::test]
    async fn test_correlation_id_from_header() {
        let uuid = Uuid::new_v4();
        let mut parts = parts(Request::builder().header("X-Correlation-ID", uuid.to_string()));
        let Ok(correlation_id) = CorrelationId::from_request_parts(&mut parts, &()).await;
        assert_eq!(correlation_id.0, uuid);
    }

    #[tokio::test]
    async fn test_correlation_id_generates_new() {
        let mut parts = parts(Request::builder());
        let Ok(correlation_id) = CorrelationId::from_request_parts(&mut parts, &()).await;
        assert_ne!(correlation_id.0, Uuid::nil());
    }

    #[tokio::test]
    async fn test_session_token_from_cookie_or_bearer() {
        let cookie_id = SessionId::new();
        let bearer_id = SessionId::new();

        let mut both = parts(
            Request::builder()
                .header(header::COOKIE, format!("{SESSION_COOKIE}={cookie_id}"))
                .header(header::AUTHORIZATION, format!("Bearer {bearer_id}")),
        );
        let Ok(token) = SessionToken::from_request_parts(&mut both, &()).await;
        assert_eq!(token.0, Some(cookie_id));

        let mut bearer_only =
            parts(Request::builder().header(header::AUTHORIZATION, format!("Bearer {bearer_id}")));
        let Ok(token) = SessionToken::from_request_parts(&mut bearer_only, &()).await;
        assert_eq!(token.0, Some(bearer_id));
    }

    #[tokio::test]
    async fn test_session_token_ignores_garbage() {
        let mut garbage = parts(
            Request::builder()
                .header(header::COOKIE, format!("{SESSION_COOKIE}=not-a-uuid"))
                .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz"),
        );
        let Ok(token) = SessionToken::from_request_parts(&mut garbage, &()).await;
        assert_eq!(token.0, None);
    }
}
