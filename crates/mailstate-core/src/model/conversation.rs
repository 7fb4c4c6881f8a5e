//! Conversation model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{FolderId, Participant, timestamp_to_datetime};

/// Message stub embedded in a conversation.
///
/// Full messages live in the message map and are joined by id when needed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvMessage {
    /// Message id.
    pub id: String,
    /// Folder containing the message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<FolderId>,
    /// Date (ms since epoch).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<i64>,
}

impl ConvMessage {
    /// Creates a stub.
    #[must_use]
    pub fn new(id: impl Into<String>, parent: Option<FolderId>, date: Option<i64>) -> Self {
        Self {
            id: id.into(),
            parent,
            date,
        }
    }
}

/// Boolean conversation attributes decoded from the packed flag string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)] // One bool per wire flag
pub struct ConversationFlags {
    /// Every message has been read.
    pub read: bool,
    /// Some message has attachments.
    pub attachment: bool,
    /// Some message is flagged.
    pub flagged: bool,
    /// Some message is urgent.
    pub urgent: bool,
}

/// A conversation as held by the stores.
///
/// `parent` always mirrors the folder of the first message stub; it is
/// re-derived whenever the stub list changes and is `None` for an empty list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[allow(clippy::struct_excessive_bools)]
pub struct Conversation {
    /// Conversation id.
    pub id: String,
    /// Date of the most recent message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<i64>,
    /// Message count.
    pub msg_count: u32,
    /// Unread message count.
    pub unread_msg_count: u32,
    messages: Vec<ConvMessage>,
    /// Participants.
    pub participants: Vec<Participant>,
    /// Subject.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// Preview of the latest message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fragment: Option<String>,
    /// Every message has been read.
    pub read: bool,
    /// Some message has attachments.
    pub attachment: bool,
    /// Some message is flagged.
    pub flagged: bool,
    /// Some message is urgent.
    pub urgent: bool,
    /// Tag ids.
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent: Option<FolderId>,
}

impl Conversation {
    /// Creates an empty conversation.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            date: None,
            msg_count: 0,
            unread_msg_count: 0,
            messages: Vec::new(),
            participants: Vec::new(),
            subject: None,
            fragment: None,
            read: true,
            attachment: false,
            flagged: false,
            urgent: false,
            tags: Vec::new(),
            parent: None,
        }
    }

    /// Builds a conversation from a patch, applying conversation defaults.
    ///
    /// Without a flag string, a conversation is read unless it has unread
    /// messages.
    #[must_use]
    pub fn from_patch(patch: ConversationPatch) -> Self {
        let mut conversation = Self::new(patch.id.clone());
        conversation.read = patch.unread_msg_count.unwrap_or(0) == 0;
        conversation.apply(&patch);
        conversation
    }

    /// Merges the present fields of a patch.
    ///
    /// When the patch changes the unread count but carries no flags, `read` is
    /// re-derived from the new count.
    pub fn apply(&mut self, patch: &ConversationPatch) {
        if let Some(date) = patch.date {
            self.date = Some(date);
        }
        if let Some(n) = patch.msg_count {
            self.msg_count = n;
        }
        if let Some(u) = patch.unread_msg_count {
            self.unread_msg_count = u;
        }
        if let Some(messages) = &patch.messages {
            self.set_messages(messages.clone());
        }
        if let Some(participants) = &patch.participants {
            self.participants.clone_from(participants);
        }
        if let Some(subject) = &patch.subject {
            self.subject = Some(subject.clone());
        }
        if let Some(fragment) = &patch.fragment {
            self.fragment = Some(fragment.clone());
        }
        match patch.flags {
            Some(flags) => {
                self.read = flags.read;
                self.attachment = flags.attachment;
                self.flagged = flags.flagged;
                self.urgent = flags.urgent;
            }
            None => {
                if let Some(u) = patch.unread_msg_count {
                    self.read = u == 0;
                }
            }
        }
        if let Some(tags) = &patch.tags {
            self.tags.clone_from(tags);
        }
    }

    /// Returns the message stubs.
    #[must_use]
    pub fn messages(&self) -> &[ConvMessage] {
        &self.messages
    }

    /// Returns the folder of the first message, if any.
    #[must_use]
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// Replaces the message stubs.
    pub fn set_messages(&mut self, messages: Vec<ConvMessage>) {
        self.messages = messages;
        self.refresh_parent();
    }

    /// Mutates the message stubs in place and re-derives `parent`.
    pub fn update_messages<R>(&mut self, f: impl FnOnce(&mut Vec<ConvMessage>) -> R) -> R {
        let result = f(&mut self.messages);
        self.refresh_parent();
        result
    }

    /// Date of the most recent message as a UTC timestamp.
    #[must_use]
    pub fn last_activity(&self) -> Option<DateTime<Utc>> {
        self.date.and_then(timestamp_to_datetime)
    }

    /// Returns true if a stub with this id is present.
    #[must_use]
    pub fn contains_message(&self, id: &str) -> bool {
        self.messages.iter().any(|m| m.id == id)
    }

    fn refresh_parent(&mut self) {
        self.parent = self.messages.first().and_then(|m| m.parent.clone());
    }
}

/// Partial conversation: only fields present in the wire payload are `Some`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationPatch {
    /// Conversation id.
    pub id: String,
    /// Date.
    pub date: Option<i64>,
    /// Message count.
    pub msg_count: Option<u32>,
    /// Unread message count.
    pub unread_msg_count: Option<u32>,
    /// Message stubs.
    pub messages: Option<Vec<ConvMessage>>,
    /// Participants.
    pub participants: Option<Vec<Participant>>,
    /// Subject.
    pub subject: Option<String>,
    /// Fragment.
    pub fragment: Option<String>,
    /// Decoded flags.
    pub flags: Option<ConversationFlags>,
    /// Tag ids.
    pub tags: Option<Vec<String>>,
}

impl ConversationPatch {
    /// Creates an empty patch for a conversation id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Returns the folder the patched stub list would derive, if it has stubs.
    #[must_use]
    pub fn parent(&self) -> Option<&str> {
        self.messages
            .as_ref()
            .and_then(|m| m.first())
            .and_then(|m| m.parent.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stub(id: &str, parent: &str) -> ConvMessage {
        ConvMessage::new(id, Some(parent.to_string()), None)
    }

    #[test]
    fn parent_follows_first_message() {
        let mut conv = Conversation::new("c1");
        assert_eq!(conv.parent(), None);

        conv.set_messages(vec![stub("1", "2"), stub("3", "5")]);
        assert_eq!(conv.parent(), Some("2"));

        conv.update_messages(|m| m.remove(0));
        assert_eq!(conv.parent(), Some("5"));

        conv.update_messages(Vec::clear);
        assert_eq!(conv.parent(), None);
    }

    #[test]
    fn last_activity_from_date() {
        let conv = Conversation::from_patch(ConversationPatch {
            date: Some(0),
            ..ConversationPatch::new("c1")
        });
        assert_eq!(
            conv.last_activity().map(|d| d.to_rfc3339()).as_deref(),
            Some("1970-01-01T00:00:00+00:00")
        );
        assert!(Conversation::new("c2").last_activity().is_none());
    }

    #[test]
    fn from_patch_defaults_read_from_unread_count() {
        let unread = Conversation::from_patch(ConversationPatch {
            unread_msg_count: Some(2),
            ..ConversationPatch::new("c1")
        });
        assert!(!unread.read);

        let read = Conversation::from_patch(ConversationPatch::new("c2"));
        assert!(read.read);
    }

    #[test]
    fn flags_win_over_unread_count() {
        let conv = Conversation::from_patch(ConversationPatch {
            unread_msg_count: Some(2),
            flags: Some(ConversationFlags {
                read: true,
                ..ConversationFlags::default()
            }),
            ..ConversationPatch::new("c1")
        });
        assert!(conv.read);
    }

    #[test]
    fn apply_unread_count_without_flags_updates_read() {
        let mut conv = Conversation::new("c1");
        conv.apply(&ConversationPatch {
            unread_msg_count: Some(1),
            ..ConversationPatch::new("c1")
        });
        assert!(!conv.read);
        assert_eq!(conv.unread_msg_count, 1);
    }

    #[test]
    fn apply_keeps_absent_fields() {
        let mut conv = Conversation::from_patch(ConversationPatch {
            subject: Some("Hello".into()),
            tags: Some(vec!["4".into()]),
            messages: Some(vec![stub("1", "2")]),
            ..ConversationPatch::new("c1")
        });
        conv.apply(&ConversationPatch {
            fragment: Some("frag".into()),
            ..ConversationPatch::new("c1")
        });
        assert_eq!(conv.subject.as_deref(), Some("Hello"));
        assert_eq!(conv.tags, ["4"]);
        assert_eq!(conv.parent(), Some("2"));
        assert_eq!(conv.fragment.as_deref(), Some("frag"));
    }

    #[test]
    fn patch_parent() {
        let patch = ConversationPatch {
            messages: Some(vec![stub("1", "7")]),
            ..ConversationPatch::new("c1")
        };
        assert_eq!(patch.parent(), Some("7"));
        assert_eq!(ConversationPatch::new("c1").parent(), None);
    }
}
