//! Who is making a request.
//!
//! Every operation receives an explicit [`Caller`]; there is no ambient
//! "current user".

use crate::error::{Result, TicketingError};
use crate::types::{User, UserId};
use serde::{Deserialize, Serialize};

/// An authenticated user as seen by domain operations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Authenticated user
    pub user_id: UserId,
    /// Login email
    pub email: String,
    /// Whether the user may manage the catalog
    pub is_admin: bool,
}

impl From<&User> for Identity {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            email: user.email.clone(),
            is_admin: user.is_admin,
        }
    }
}

/// The caller of an operation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Caller {
    /// No valid session
    #[default]
    Anonymous,
    /// Resolved session
    Authenticated(Identity),
}

impl Caller {
    /// The caller's identity.
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::Unauthorized`] for anonymous callers.
    pub const fn identity(&self) -> Result<&Identity> {
        match self {
            Self::Authenticated(identity) => Ok(identity),
            Self::Anonymous => Err(TicketingError::Unauthorized),
        }
    }

    /// The caller's identity, if it has administrator rights.
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::Unauthorized`] for anonymous callers and
    /// [`TicketingError::Forbidden`] for non-admins.
    pub fn require_admin(&self) -> Result<&Identity> {
        let identity = self.identity()?;
        if identity.is_admin {
            Ok(identity)
        } else {
            Err(TicketingError::Forbidden(
                "Administrator access required".to_string(),
            ))
        }
    }

    /// Whether the caller is logged in
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}
