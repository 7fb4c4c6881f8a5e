//! Message model.

use mailstate_mime::{Attachment, MailMessagePart, MessageBody};
use mailstate_soap::{Flags, ParticipantRole};
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use serde_json::Value;

use super::{FolderId, Participant, timestamp_to_datetime};

/// Boolean message attributes decoded from the packed flag string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[allow(clippy::struct_excessive_bools)] // One bool per wire flag
pub struct MessageFlags {
    /// Message has been read.
    pub read: bool,
    /// Message has attachments.
    pub attachment: bool,
    /// Message is flagged.
    pub flagged: bool,
    /// Message is urgent.
    pub urgent: bool,
    /// Message is marked as deleted.
    pub deleted: bool,
    /// Message is a draft.
    pub draft: bool,
    /// Message has been forwarded.
    pub forwarded: bool,
    /// Message was sent by the mailbox owner.
    pub sent_by_me: bool,
    /// Message carries a calendar invite.
    pub invite: bool,
    /// Message has been replied to.
    pub replied: bool,
    /// A read receipt has already been sent.
    pub notification_sent: bool,
    /// The sender asked for a read receipt that was not sent yet. Derived from
    /// the participants, not from the flag string.
    pub read_receipt_requested: bool,
}

impl Default for MessageFlags {
    /// Messages without a flag string are considered read.
    fn default() -> Self {
        Self {
            read: true,
            attachment: false,
            flagged: false,
            urgent: false,
            deleted: false,
            draft: false,
            forwarded: false,
            sent_by_me: false,
            invite: false,
            replied: false,
            notification_sent: false,
            read_receipt_requested: false,
        }
    }
}

impl From<&Flags> for MessageFlags {
    fn from(flags: &Flags) -> Self {
        Self {
            read: flags.is_read(),
            attachment: flags.has_attachment(),
            flagged: flags.is_flagged(),
            urgent: flags.is_urgent(),
            deleted: flags.is_deleted(),
            draft: flags.is_draft(),
            forwarded: flags.is_forwarded(),
            sent_by_me: flags.is_sent_by_me(),
            invite: flags.is_invite(),
            replied: flags.is_replied(),
            notification_sent: flags.is_notification_sent(),
            read_receipt_requested: false,
        }
    }
}

impl MessageFlags {
    /// Decodes an optional flag string, falling back to the message defaults.
    #[must_use]
    pub fn from_wire(f: Option<&str>) -> Self {
        Flags::decode(f).map_or_else(Self::default, |flags| Self::from(&flags))
    }
}

/// A message as held by the stores.
///
/// Incomplete messages come from searches and notifications and may lack the
/// part tree; complete ones come from a full message fetch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncompleteMessage {
    /// Message id.
    pub id: String,
    /// Conversation id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation: Option<String>,
    /// Date (ms since epoch).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<i64>,
    /// Size in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Folder containing the message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<FolderId>,
    /// Body preview.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fragment: Option<String>,
    /// Subject.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// Composed body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<MessageBody>,
    /// MIME part tree.
    #[serde(default)]
    pub parts: Vec<MailMessagePart>,
    /// Participants.
    #[serde(default)]
    pub participants: Vec<Participant>,
    /// Tag ids, possibly `nil:<name>` placeholders.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Attachments extracted from the part tree.
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    /// Decoded flags.
    #[serde(flatten)]
    pub flags: MessageFlags,
    /// Whether the full message was fetched.
    #[serde(default)]
    pub is_complete: bool,
    /// Scheduled send time (ms since epoch).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_send_time: Option<i64>,
    /// Calendar invite payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invite: Option<Value>,
    /// Share notification payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share: Option<Value>,
}

/// A fully fetched message.
pub type MailMessage = IncompleteMessage;

impl IncompleteMessage {
    /// Builds a message from a patch, applying message defaults to absent fields.
    #[must_use]
    pub fn from_patch(patch: MessagePatch) -> Self {
        let mut message = Self {
            id: patch.id.clone(),
            ..Self::default()
        };
        message.apply(&patch);
        message
    }

    /// Merges the present fields of a patch into this message.
    pub fn apply(&mut self, patch: &MessagePatch) {
        fn merge<T: Clone>(target: &mut T, value: Option<&T>) {
            if let Some(value) = value {
                target.clone_from(value);
            }
        }
        fn merge_optional<T: Clone>(target: &mut Option<T>, value: Option<&T>) {
            if let Some(value) = value {
                *target = Some(value.clone());
            }
        }

        merge_optional(&mut self.conversation, patch.conversation.as_ref());
        merge_optional(&mut self.date, patch.date.as_ref());
        merge_optional(&mut self.size, patch.size.as_ref());
        merge_optional(&mut self.parent, patch.parent.as_ref());
        merge_optional(&mut self.fragment, patch.fragment.as_ref());
        merge_optional(&mut self.subject, patch.subject.as_ref());
        merge_optional(&mut self.body, patch.body.as_ref());
        merge(&mut self.parts, patch.parts.as_ref());
        merge(&mut self.participants, patch.participants.as_ref());
        merge(&mut self.tags, patch.tags.as_ref());
        merge(&mut self.attachments, patch.attachments.as_ref());
        merge(&mut self.flags, patch.flags.as_ref());
        merge(&mut self.is_complete, patch.is_complete.as_ref());
        merge_optional(&mut self.auto_send_time, patch.auto_send_time.as_ref());
        merge_optional(&mut self.invite, patch.invite.as_ref());
        merge_optional(&mut self.share, patch.share.as_ref());
        self.flags.read_receipt_requested = !self.flags.notification_sent
            && self
                .participants
                .iter()
                .any(|p| p.role == ParticipantRole::ReadReceiptNotification);
    }

    /// Returns true if sending is scheduled for later.
    #[must_use]
    pub const fn is_scheduled(&self) -> bool {
        self.auto_send_time.is_some()
    }

    /// Date of the message as a UTC timestamp.
    #[must_use]
    pub fn received_at(&self) -> Option<DateTime<Utc>> {
        self.date.and_then(timestamp_to_datetime)
    }

    /// Scheduled send time as a UTC timestamp.
    #[must_use]
    pub fn scheduled_for(&self) -> Option<DateTime<Utc>> {
        self.auto_send_time.and_then(timestamp_to_datetime)
    }

    /// Returns the first participant with the given role.
    #[must_use]
    pub fn participant(&self, role: ParticipantRole) -> Option<&Participant> {
        self.participants.iter().find(|p| p.role == role)
    }
}

/// Partial message: only fields present in the wire payload are `Some`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessagePatch {
    /// Message id.
    pub id: String,
    /// Conversation id.
    pub conversation: Option<String>,
    /// Date.
    pub date: Option<i64>,
    /// Size.
    pub size: Option<u64>,
    /// Folder.
    pub parent: Option<FolderId>,
    /// Body preview.
    pub fragment: Option<String>,
    /// Subject.
    pub subject: Option<String>,
    /// Composed body.
    pub body: Option<MessageBody>,
    /// Part tree.
    pub parts: Option<Vec<MailMessagePart>>,
    /// Participants.
    pub participants: Option<Vec<Participant>>,
    /// Tag ids.
    pub tags: Option<Vec<String>>,
    /// Attachments.
    pub attachments: Option<Vec<Attachment>>,
    /// Decoded flags.
    pub flags: Option<MessageFlags>,
    /// Whether the full message was fetched.
    pub is_complete: Option<bool>,
    /// Scheduled send time.
    pub auto_send_time: Option<i64>,
    /// Calendar invite payload.
    pub invite: Option<Value>,
    /// Share notification payload.
    pub share: Option<Value>,
}

impl MessagePatch {
    /// Creates an empty patch for a message id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Sets the folder.
    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<FolderId>) -> Self {
        self.parent = Some(parent.into());
        self
    }
}
