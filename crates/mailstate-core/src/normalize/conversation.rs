//! Conversation normalization.

use mailstate_soap::{Flags, SoapConversation, SoapMessage};

use super::normalize_participants;
use super::tags::resolve_tag_patch;
use crate::Result;
use crate::model::{ConvMessage, Conversation, ConversationFlags, ConversationPatch, TagDirectory};

/// A wire conversation plus the messages the caller already holds for it.
#[derive(Debug, Clone, Copy)]
pub struct ConversationSource<'a> {
    /// The conversation.
    pub c: &'a SoapConversation,
    /// Full messages from the same response, used when `c.m` is empty and to
    /// fill in stub fields the embedded list omits.
    pub messages: Option<&'a [SoapMessage]>,
}

impl<'a> ConversationSource<'a> {
    /// A conversation on its own.
    #[must_use]
    pub const fn new(c: &'a SoapConversation) -> Self {
        Self { c, messages: None }
    }

    /// A conversation with the messages of the same response.
    #[must_use]
    pub const fn with_messages(c: &'a SoapConversation, messages: &'a [SoapMessage]) -> Self {
        Self {
            c,
            messages: Some(messages),
        }
    }

    fn stubs(&self) -> Option<Vec<ConvMessage>> {
        let find = |id: &str| self.messages.and_then(|ms| ms.iter().find(|m| m.id == id));
        match (&self.c.m, self.messages) {
            (Some(embedded), _) if !embedded.is_empty() => Some(
                embedded
                    .iter()
                    .map(|stub| {
                        let full = find(&stub.id);
                        ConvMessage::new(
                            stub.id.clone(),
                            stub.l.clone().or_else(|| full.and_then(|m| m.l.clone())),
                            stub.d.or_else(|| full.and_then(|m| m.d)),
                        )
                    })
                    .collect(),
            ),
            (_, Some(messages)) => Some(
                messages
                    .iter()
                    .filter(|m| m.cid.as_deref() == Some(self.c.id.as_str()))
                    .map(|m| ConvMessage::new(m.id.clone(), m.l.clone(), m.d))
                    .collect(),
            ),
            (embedded, None) => embedded.as_ref().map(|_| Vec::new()),
        }
    }
}

fn conversation_flags(f: &str) -> ConversationFlags {
    let flags = Flags::parse(f);
    ConversationFlags {
        read: flags.is_read(),
        attachment: flags.has_attachment(),
        flagged: flags.is_flagged(),
        urgent: flags.is_urgent(),
    }
}

/// Normalizes a wire conversation into a patch holding only the fields it
/// carries.
///
/// # Errors
///
/// Returns an error if a participant has an unknown role.
pub fn normalize_conversation_patch(
    source: ConversationSource<'_>,
    tags: &TagDirectory,
) -> Result<ConversationPatch> {
    let c = source.c;
    Ok(ConversationPatch {
        id: c.id.clone(),
        date: c.d,
        msg_count: c.n,
        unread_msg_count: c.u,
        messages: source.stubs(),
        participants: c.e.as_deref().map(normalize_participants).transpose()?,
        subject: c.su.clone(),
        fragment: c.fr.clone(),
        flags: c.f.as_deref().map(conversation_flags),
        tags: resolve_tag_patch(c.t.as_deref(), c.tn.as_deref(), tags),
    })
}

/// Normalizes a wire conversation into a full entity, applying conversation
/// defaults. `parent` is the folder of the first message stub.
///
/// # Errors
///
/// Returns an error if a participant has an unknown role.
pub fn normalize_conversation(
    source: ConversationSource<'_>,
    tags: &TagDirectory,
) -> Result<Conversation> {
    normalize_conversation_patch(source, tags).map(Conversation::from_patch)
}
