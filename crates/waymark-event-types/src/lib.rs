//! User presence event types for Waymark.

mod event;
mod id;
mod kind;

pub use event::{UserEvent, UserEventBuilder};
pub use id::SubjectId;
pub use kind::EventKind;
