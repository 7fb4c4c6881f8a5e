//! Normalized client-side entities.
//!
//! These are the shapes the stores hold. Wire objects are converted into them
//! by [`crate::normalize`]. Each entity with a partial wire form also has a
//! patch type whose `None` fields mean "not present in the payload".

mod conversation;
mod folder;
mod message;
mod participant;
mod tag;

use chrono::{DateTime, Utc};

pub use conversation::{ConvMessage, Conversation, ConversationFlags, ConversationPatch};
pub use folder::{Folder, FolderPatch, join_path};
pub use message::{IncompleteMessage, MailMessage, MessageFlags, MessagePatch};
pub use participant::Participant;
pub use tag::{Tag, TagDirectory};

/// Folder identifier.
pub type FolderId = String;

/// Converts a millisecond timestamp into a UTC date.
#[must_use]
pub fn timestamp_to_datetime(millis: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
}
