//! Registration, login and logout.

use super::{require_login, safe_next};
use crate::cookies::{self, SESSION_COOKIE};
use crate::error::AppError;
use crate::extractors::{CurrentCaller, SessionToken};
use crate::flash::{Flash, Notice, Page, SeeOther};
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    Form,
};
use serde::{Deserialize, Serialize};
use ticketing_auth::{service::MIN_PASSWORD_LEN, AuthError, Credentials, Registration};

/// Registration page body.
#[derive(Debug, Serialize)]
pub struct RegisterView {
    /// Page heading
    pub title: &'static str,
    /// Shortest accepted password
    pub min_password_length: usize,
}

/// Login page body.
#[derive(Debug, Serialize)]
pub struct LoginView {
    /// Page heading
    pub title: &'static str,
    /// Where to go after logging in
    pub next: String,
}

/// `?next=` on the login page.
#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    /// Local path to return to
    pub next: Option<String>,
}

/// Login form.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    /// Login email
    pub email: String,
    /// Password
    pub password: String,
    /// Local path to return to; overrides the query string
    #[serde(default)]
    pub next: Option<String>,
}

/// `GET /register`
#[allow(clippy::unused_async)]
pub async fn register_page(flash: Flash) -> Page<RegisterView> {
    Page::new(
        RegisterView {
            title: "Register",
            min_password_length: MIN_PASSWORD_LEN,
        },
        flash,
    )
}

/// `POST /register`
///
/// Redirects to the login page on success, back to the form with a notice
/// otherwise.
///
/// # Errors
///
/// Returns 500 if a store fails.
pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<Registration>,
) -> Result<SeeOther, AppError> {
    match state.identity.register(form).await {
        Ok(_) => Ok(SeeOther::to("/login").notice(Notice::success(
            "Registration successful, please log in.",
        ))),
        Err(AuthError::Validation(message)) => {
            Ok(SeeOther::to("/register").notice(Notice::error(message)))
        }
        Err(err) => Err(err.into()),
    }
}

/// `GET /login`
#[allow(clippy::unused_async)]
pub async fn login_page(Query(query): Query<NextQuery>, flash: Flash) -> Page<LoginView> {
    Page::new(
        LoginView {
            title: "Login",
            next: safe_next(query.next.as_deref()).to_string(),
        },
        flash,
    )
}

/// `POST /login`
///
/// Sets the session cookie and redirects to `next` (local paths only) or
/// home.
///
/// # Errors
///
/// Returns 500 if a store fails.
pub async fn login(
    State(state): State<AppState>,
    Query(query): Query<NextQuery>,
    Form(form): Form<LoginForm>,
) -> Result<SeeOther, AppError> {
    let next = safe_next(form.next.as_deref().or(query.next.as_deref())).to_string();
    let credentials = Credentials {
        email: form.email,
        password: form.password,
    };

    match state.identity.login(&credentials).await {
        Ok((session, _)) => {
            let cookie = cookies::session(
                session.session_id.to_string(),
                state.identity.session_ttl().num_seconds(),
                state.secure_cookies,
            );
            Ok(SeeOther::to(next).cookie(cookie))
        }
        Err(err @ AuthError::InvalidCredentials) => {
            let back = if next == "/" {
                "/login".to_string()
            } else {
                format!("/login?next={}", urlencoding::encode(&next))
            };
            Ok(SeeOther::to(back).notice(Notice::error(err.to_string())))
        }
        Err(err) => Err(err.into()),
    }
}

/// `GET /logout`
///
/// # Errors
///
/// Returns 500 if the session store fails.
pub async fn logout(
    State(state): State<AppState>,
    CurrentCaller(caller): CurrentCaller,
    SessionToken(session_id): SessionToken,
) -> Result<Response, AppError> {
    if let Err(redirect) = require_login(&caller, "/") {
        return Ok(redirect);
    }
    if let Some(session_id) = session_id {
        state.identity.logout(session_id).await?;
    }

    Ok(SeeOther::to("/")
        .cookie(cookies::removal(SESSION_COOKIE))
        .notice(Notice::info("You have been logged out."))
        .into_response())
}
