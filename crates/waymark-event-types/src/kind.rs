//! Event kinds.

use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{AsRefStr, EnumString};

/// What happened to the subject.
///
/// Unknown tags parse into [`EventKind::Custom`] so that producers can record
/// kinds this crate does not enumerate. Matching is exact: `"Login"` stays a
/// custom tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(AsRefStr, EnumString)]
#[serde(from = "String", into = "String")]
#[strum(serialize_all = "snake_case")]
pub enum EventKind {
    /// The user logged in.
    Login,
    /// The user logged out.
    Logout,
    /// The user entered a region.
    RegionEnter,
    /// Any other tag.
    #[strum(default)]
    Custom(String),
}

impl EventKind {
    /// The tag recorded for this kind.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Custom(tag) => tag,
            other => other.as_ref(),
        }
    }

    /// Check if this is a session boundary (login or logout).
    pub fn is_session_boundary(&self) -> bool {
        matches!(self, Self::Login | Self::Logout)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for EventKind {
    fn from(tag: String) -> Self {
        match tag.parse() {
            Ok(kind) => kind,
            Err(_) => Self::Custom(tag),
        }
    }
}

impl From<EventKind> for String {
    fn from(kind: EventKind) -> Self {
        match kind {
            EventKind::Custom(tag) => tag,
            other => other.as_str().to_string(),
        }
    }
}
