//! The user presence event.

use crate::{EventKind, SubjectId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One observed occurrence, such as a login or a region entry.
///
/// Events are immutable once built; fields are read through accessors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserEvent {
    subject_id: SubjectId,
    subject_name: String,
    kind: EventKind,
    location: String,
    timestamp: DateTime<Utc>,
}

impl UserEvent {
    /// Create an event stamped with the current time.
    pub fn new(
        subject_id: SubjectId,
        subject_name: impl Into<String>,
        kind: EventKind,
        location: impl Into<String>,
    ) -> Self {
        Self::builder(subject_id, kind)
            .subject_name(subject_name)
            .location(location)
            .build()
    }

    /// Create an event builder.
    pub fn builder(subject_id: SubjectId, kind: EventKind) -> UserEventBuilder {
        UserEventBuilder::new(subject_id, kind)
    }

    /// A login at `location`.
    pub fn login(subject_id: SubjectId, subject_name: impl Into<String>, location: impl Into<String>) -> Self {
        Self::new(subject_id, subject_name, EventKind::Login, location)
    }

    /// A logout from `location`.
    pub fn logout(subject_id: SubjectId, subject_name: impl Into<String>, location: impl Into<String>) -> Self {
        Self::new(subject_id, subject_name, EventKind::Logout, location)
    }

    /// An entry into the region `location`.
    pub fn region_enter(
        subject_id: SubjectId,
        subject_name: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self::new(subject_id, subject_name, EventKind::RegionEnter, location)
    }

    /// Identifier of the user.
    pub fn subject_id(&self) -> SubjectId {
        self.subject_id
    }

    /// Display name of the user.
    pub fn subject_name(&self) -> &str {
        &self.subject_name
    }

    /// What happened.
    pub fn kind(&self) -> &EventKind {
        &self.kind
    }

    /// Name of the location the event originated from.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// When the event occurred.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Builder for constructing user events.
#[derive(Debug)]
pub struct UserEventBuilder {
    subject_id: SubjectId,
    kind: EventKind,
    subject_name: String,
    location: String,
    timestamp: Option<DateTime<Utc>>,
}

impl UserEventBuilder {
    /// Create a new builder.
    pub fn new(subject_id: SubjectId, kind: EventKind) -> Self {
        Self {
            subject_id,
            kind,
            subject_name: String::new(),
            location: String::new(),
            timestamp: None,
        }
    }

    /// Set the subject display name.
    pub fn subject_name(mut self, name: impl Into<String>) -> Self {
        self.subject_name = name.into();
        self
    }

    /// Set the origin location name.
    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Set an explicit timestamp (defaults to now).
    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Build the event.
    pub fn build(self) -> UserEvent {
        UserEvent {
            subject_id: self.subject_id,
            subject_name: self.subject_name,
            kind: self.kind,
            location: self.location,
            timestamp: self.timestamp.unwrap_or_else(Utc::now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    #[test]
    fn test_constructors_set_kind() {
        let id = SubjectId::new();
        assert_eq!(UserEvent::login(id, "Ada", "Lobby").kind(), &EventKind::Login);
        assert_eq!(UserEvent::logout(id, "Ada", "Lobby").kind(), &EventKind::Logout);
        assert_eq!(
            UserEvent::region_enter(id, "Ada", "Harbor").kind(),
            &EventKind::RegionEnter
        );
    }

    #[test]
    fn test_builder_fields() {
        let id = SubjectId::new();
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let event = UserEvent::builder(id, EventKind::Custom("teleport".into()))
            .subject_name("Grace")
            .location("Harbor")
            .timestamp(at)
            .build();

        assert_eq!(event.subject_id(), id);
        assert_eq!(event.subject_name(), "Grace");
        assert_eq!(event.kind().as_str(), "teleport");
        assert_eq!(event.location(), "Harbor");
        assert_eq!(event.timestamp(), at);
    }

    #[test]
    fn test_default_timestamp_is_now() {
        let before = Utc::now();
        let event = UserEvent::login(SubjectId::new(), "Ada", "Lobby");
        assert!(event.timestamp() >= before);
        assert!(event.timestamp() <= Utc::now());
    }

    #[test]
    fn test_json_shape() {
        let event = UserEvent::login(SubjectId::new(), "Ada", "Lobby");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "login");
        assert_eq!(json["subject_name"], "Ada");
        assert_eq!(json["location"], "Lobby");
    }

    proptest! {
        #[test]
        fn test_kind_tag_survives_json(tag in "[A-Za-z_]{1,16}") {
            let event = UserEvent::new(SubjectId::new(), "n", EventKind::from(tag.clone()), "l");
            let json = serde_json::to_string(&event).unwrap();
            let back: UserEvent = serde_json::from_str(&json).unwrap();
            prop_assert_eq!(back.kind().as_str(), tag.as_str());
        }
    }
}
