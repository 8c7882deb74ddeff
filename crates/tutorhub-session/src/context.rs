//! The signed-in user, passed explicitly into every controller.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Role of a signed-in user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Books appointments and registers with tutors.
    Student,
    /// Publishes availability and reviews requests.
    Tutor,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Student => write!(f, "student"),
            Self::Tutor => write!(f, "tutor"),
        }
    }
}

/// An authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Backend user id (student or tutor id).
    pub id: i64,
    /// Login name.
    pub username: String,
    /// Role.
    pub role: Role,
}

/// Who is using the client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Session {
    /// Nobody is signed in; registration actions are disabled.
    #[default]
    Anonymous,
    /// A signed-in user.
    Authenticated(User),
}

impl Session {
    /// Creates an authenticated student session.
    #[must_use]
    pub fn student(id: i64, username: impl Into<String>) -> Self {
        Self::Authenticated(User {
            id,
            username: username.into(),
            role: Role::Student,
        })
    }

    /// Creates an authenticated tutor session.
    #[must_use]
    pub fn tutor(id: i64, username: impl Into<String>) -> Self {
        Self::Authenticated(User {
            id,
            username: username.into(),
            role: Role::Tutor,
        })
    }

    /// Returns the signed-in user, if any.
    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(user) => Some(user),
        }
    }

    /// Returns the signed-in user's id, if any.
    #[must_use]
    pub fn user_id(&self) -> Option<i64> {
        self.user().map(|user| user.id)
    }

    /// Returns `true` if someone is signed in.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}
