//! Account registration, login and session resolution.

use crate::error::{AuthError, Result};
use crate::password::{hash_password, verify_password};
use crate::session::{Session, SessionId, SessionStore};
use chrono::Duration;
use serde::Deserialize;
use std::sync::Arc;
use ticketing_core::{Caller, Clock, Identity, NewUser, User, UserStore, metrics};

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Registration form fields.
#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Login email
    pub email: String,
    /// Chosen password
    pub password: String,
    /// Password typed a second time
    pub confirm_password: String,
}

/// Login form fields.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    /// Login email
    pub email: String,
    /// Password
    pub password: String,
}

/// Normalize an email for storage and lookup.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.contains(char::is_whitespace)
}

impl Registration {
    /// Check the form and return the normalized email.
    fn validate(&self) -> Result<String> {
        if self.first_name.trim().is_empty() || self.last_name.trim().is_empty() {
            return Err(AuthError::Validation(
                "First and last name are required".to_string(),
            ));
        }
        let email = normalize_email(&self.email);
        if !is_plausible_email(&email) {
            return Err(AuthError::Validation("Email address is not valid".to_string()));
        }
        if self.password != self.confirm_password {
            return Err(AuthError::Validation("Passwords do not match".to_string()));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::Validation(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        Ok(email)
    }
}

/// Registration, authentication and per-request identity resolution.
#[derive(Clone)]
pub struct IdentityService {
    users: Arc<dyn UserStore>,
    sessions: Arc<dyn SessionStore>,
    clock: Arc<dyn Clock>,
    session_ttl: Duration,
}

impl IdentityService {
    /// Create a service.
    #[must_use]
    pub fn new(
        users: Arc<dyn UserStore>,
        sessions: Arc<dyn SessionStore>,
        clock: Arc<dyn Clock>,
        session_ttl: Duration,
    ) -> Self {
        Self {
            users,
            sessions,
            clock,
            session_ttl,
        }
    }

    /// Lifetime of new sessions.
    #[must_use]
    pub const fn session_ttl(&self) -> Duration {
        self.session_ttl
    }

    /// Create a regular (non-admin) account.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] for blank names, a malformed email,
    /// mismatched or short passwords and already registered emails. No
    /// account is created on error.
    pub async fn register(&self, form: Registration) -> Result<User> {
        let email = form.validate()?;
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AuthError::Validation("Email is already registered".to_string()));
        }

        let user = self
            .users
            .create_user(NewUser {
                first_name: form.first_name.trim().to_string(),
                last_name: form.last_name.trim().to_string(),
                email,
                password_hash: hash_password(&form.password)?,
                is_admin: false,
            })
            .await?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Check credentials.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] for an unknown email or a
    /// wrong password.
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<Identity> {
        let email = normalize_email(&credentials.email);
        let user = self.users.find_by_email(&email).await?;

        let verified = match &user {
            Some(user) => verify_password(&credentials.password, &user.password_hash)?,
            None => false,
        };
        metrics::record_login(verified);

        match user {
            Some(user) if verified => Ok(Identity::from(&user)),
            _ => {
                tracing::info!("Login rejected");
                Err(AuthError::InvalidCredentials)
            }
        }
    }

    /// Check credentials and open a session.
    ///
    /// # Errors
    ///
    /// Same as [`IdentityService::authenticate`], plus session store errors.
    pub async fn login(&self, credentials: &Credentials) -> Result<(Session, Identity)> {
        let identity = self.authenticate(credentials).await?;
        let session = Session::start(identity.user_id, self.clock.now(), self.session_ttl);
        self.sessions
            .create_session(&session, self.session_ttl)
            .await?;
        tracing::info!(user_id = %identity.user_id, "User logged in");
        Ok((session, identity))
    }

    /// Resolve the caller for a request.
    ///
    /// Missing, unknown and expired sessions resolve to
    /// [`Caller::Anonymous`]; expired sessions are deleted.
    ///
    /// # Errors
    ///
    /// Returns error only when a store fails.
    pub async fn resolve(&self, session_id: Option<SessionId>) -> Result<Caller> {
        let Some(session_id) = session_id else {
            return Ok(Caller::Anonymous);
        };

        let session = match self.sessions.get_session(session_id).await {
            Ok(session) => session,
            Err(AuthError::SessionNotFound) => return Ok(Caller::Anonymous),
            Err(err) => return Err(err),
        };

        if session.is_expired(self.clock.now()) {
            self.sessions.delete_session(session_id).await?;
            tracing::debug!(session_id = %session_id, "Expired session removed");
            return Ok(Caller::Anonymous);
        }

        Ok(self
            .users
            .get_user(session.user_id)
            .await?
            .map_or(Caller::Anonymous, |user| {
                Caller::Authenticated(Identity::from(&user))
            }))
    }

    /// End a session.
    ///
    /// # Errors
    ///
    /// Returns error if the session store fails.
    pub async fn logout(&self, session_id: SessionId) -> Result<()> {
        self.sessions.delete_session(session_id).await?;
        tracing::info!(session_id = %session_id, "User logged out");
        Ok(())
    }

    /// Make sure an administrator account exists for `email`.
    ///
    /// An existing account is promoted (its password is left alone); a
    /// missing one is created with `password`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] when `password` is too short for a
    /// new account, plus store errors.
    pub async fn ensure_admin(&self, email: &str, password: &str) -> Result<User> {
        let email = normalize_email(email);
        if let Some(user) = self.users.find_by_email(&email).await? {
            if user.is_admin {
                return Ok(user);
            }
            let user = self.users.set_admin(user.id, true).await?;
            tracing::info!(user_id = %user.id, "Existing account promoted to admin");
            return Ok(user);
        }

        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::Validation(format!(
                "Admin password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        let user = self
            .users
            .create_user(NewUser {
                first_name: "Admin".to_string(),
                last_name: "Ticketing".to_string(),
                email,
                password_hash: hash_password(password)?,
                is_admin: true,
            })
            .await?;
        tracing::info!(user_id = %user.id, "Admin account created");
        Ok(user)
    }

    /// Check that the session backend is reachable.
    ///
    /// # Errors
    ///
    /// Returns error if the session store fails.
    pub async fn ping(&self) -> Result<()> {
        self.sessions.ping().await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::stores::InMemorySessionStore;
    use ticketing_core::InMemoryStore;
    use ticketing_testing::test_clock;

    fn service_with(ttl: Duration) -> (IdentityService, InMemoryStore, InMemorySessionStore) {
        let users = InMemoryStore::new();
        let sessions = InMemorySessionStore::new();
        let service = IdentityService::new(
            Arc::new(users.clone()),
            Arc::new(sessions.clone()),
            Arc::new(test_clock()),
            ttl,
        );
        (service, users, sessions)
    }

    fn service() -> (IdentityService, InMemoryStore, InMemorySessionStore) {
        service_with(Duration::hours(24))
    }

    fn registration(email: &str, password: &str, confirm: &str) -> Registration {
        Registration {
            first_name: "Rina".to_string(),
            last_name: "Tanaka".to_string(),
            email: email.to_string(),
            password: password.to_string(),
            confirm_password: confirm.to_string(),
        }
    }

    fn credentials(email: &str, password: &str) -> Credentials {
        Credentials {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let (service, _, sessions) = service();
        let user = service
            .register(registration(" Rina@Example.com ", "rahasia123", "rahasia123"))
            .await
            .unwrap();
        assert_eq!(user.email, "rina@example.com");
        assert!(!user.is_admin);
        assert_ne!(user.password_hash, "rahasia123");

        let (session, identity) = service
            .login(&credentials("RINA@example.com", "rahasia123"))
            .await
            .unwrap();
        assert_eq!(identity.user_id, user.id);
        assert_eq!(sessions.session_count().unwrap(), 1);

        let caller = service.resolve(Some(session.session_id)).await.unwrap();
        assert_eq!(caller, Caller::Authenticated(identity));

        service.logout(session.session_id).await.unwrap();
        assert_eq!(
            service.resolve(Some(session.session_id)).await.unwrap(),
            Caller::Anonymous
        );
    }

    #[tokio::test]
    async fn test_register_rejections_create_nothing() {
        let (service, users, _) = service();
        let cases = [
            registration("rina@example.com", "rahasia123", "rahasia124"),
            registration("rina@example.com", "short", "short"),
            registration("not-an-email", "rahasia123", "rahasia123"),
            Registration {
                first_name: " ".to_string(),
                ..registration("rina@example.com", "rahasia123", "rahasia123")
            },
        ];
        for form in cases {
            let err = service.register(form).await.unwrap_err();
            assert!(matches!(err, AuthError::Validation(_)), "{err:?}");
        }
        assert!(users.find_by_email("rina@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let (service, _, _) = service();
        service
            .register(registration("rina@example.com", "rahasia123", "rahasia123"))
            .await
            .unwrap();
        let err = service
            .register(registration("RINA@example.com", "lainnya123", "lainnya123"))
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::Validation("Email is already registered".to_string()));
    }

    #[tokio::test]
    async fn test_bad_email_and_bad_password_look_the_same() {
        let (service, _, _) = service();
        service
            .register(registration("rina@example.com", "rahasia123", "rahasia123"))
            .await
            .unwrap();

        let wrong_password = service
            .authenticate(&credentials("rina@example.com", "salah12345"))
            .await
            .unwrap_err();
        let unknown_email = service
            .authenticate(&credentials("nobody@example.com", "rahasia123"))
            .await
            .unwrap_err();
        assert_eq!(wrong_password, AuthError::InvalidCredentials);
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    }

    #[tokio::test]
    async fn test_expired_session_resolves_anonymous() {
        let (service, users, sessions) = service_with(Duration::zero());
        users
            .create_user(NewUser {
                first_name: "Ken".to_string(),
                last_name: "Sato".to_string(),
                email: "ken@example.com".to_string(),
                password_hash: hash_password("rahasia123").unwrap(),
                is_admin: false,
            })
            .await
            .unwrap();

        let (session, _) = service
            .login(&credentials("ken@example.com", "rahasia123"))
            .await
            .unwrap();
        assert_eq!(
            service.resolve(Some(session.session_id)).await.unwrap(),
            Caller::Anonymous
        );
        assert_eq!(sessions.session_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unknown_session_is_anonymous() {
        let (service, _, _) = service();
        assert_eq!(service.resolve(None).await.unwrap(), Caller::Anonymous);
        assert_eq!(
            service.resolve(Some(SessionId::new())).await.unwrap(),
            Caller::Anonymous
        );
    }

    #[tokio::test]
    async fn test_ensure_admin_creates_then_promotes() {
        let (service, _, _) = service();
        let admin = service
            .ensure_admin("adminmu@weaboo.com", "admin12345")
            .await
            .unwrap();
        assert!(admin.is_admin);

        let again = service
            .ensure_admin("adminmu@weaboo.com", "ignored")
            .await
            .unwrap();
        assert_eq!(again.id, admin.id);

        let user = service
            .register(registration("fan@example.com", "rahasia123", "rahasia123"))
            .await
            .unwrap();
        let promoted = service.ensure_admin("fan@example.com", "").await.unwrap();
        assert_eq!(promoted.id, user.id);
        assert!(promoted.is_admin);

        // Promotion keeps the original password.
        let identity = service
            .authenticate(&credentials("fan@example.com", "rahasia123"))
            .await
            .unwrap();
        assert!(identity.is_admin);
    }
}
