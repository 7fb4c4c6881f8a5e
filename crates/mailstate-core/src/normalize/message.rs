//! Message and part normalization.

use mailstate_mime::{
    Disposition, LeafPart, MailMessagePart, generate_body, get_attachments_from_parts,
};
use mailstate_soap::{SoapMessage, SoapMessagePart};

use super::normalize_participants;
use super::tags::resolve_tag_patch;
use crate::Result;
use crate::config::SyncConfig;
use crate::model::{IncompleteMessage, MessageFlags, MessagePatch, TagDirectory};

/// Converts a wire part into the typed tree. Parts with an `mp` list are
/// containers, everything else is a leaf.
#[must_use]
pub fn normalize_part(part: &SoapMessagePart) -> MailMessagePart {
    let size = part.s.unwrap_or(0);
    match &part.mp {
        Some(children) => {
            MailMessagePart::container(&part.part, &part.ct, normalize_parts(children))
                .with_size(size)
        }
        None => MailMessagePart::leaf(
            &part.part,
            &part.ct,
            LeafPart {
                filename: part.filename.clone(),
                content: part.content.clone(),
                ci: part.ci.clone(),
                disposition: Disposition::parse(part.cd.as_deref()),
                is_body: part.body.unwrap_or(false),
            },
        )
        .with_size(size),
    }
}

/// Converts a list of wire parts.
#[must_use]
pub fn normalize_parts(parts: &[SoapMessagePart]) -> Vec<MailMessagePart> {
    parts.iter().map(normalize_part).collect()
}

/// Normalizes a wire message into a patch holding only the fields it carries.
///
/// When the part tree is present, attachments and body are derived from it.
///
/// # Errors
///
/// Returns an error if a participant has an unknown role.
pub fn normalize_message_patch(
    m: &SoapMessage,
    tags: &TagDirectory,
    config: &SyncConfig,
) -> Result<MessagePatch> {
    let participants = m.e.as_deref().map(normalize_participants).transpose()?;
    let parts = m.mp.as_deref().map(normalize_parts);
    let attachments = parts.as_deref().map(get_attachments_from_parts);
    let body = parts
        .as_deref()
        .map(|parts| generate_body(parts, &m.id, &config.download_url_base));

    Ok(MessagePatch {
        id: m.id.clone(),
        conversation: m.cid.clone(),
        date: m.d,
        size: m.s,
        parent: m.l.clone(),
        fragment: m.fr.clone(),
        subject: m.su.clone(),
        body,
        parts,
        participants,
        tags: resolve_tag_patch(m.t.as_deref(), m.tn.as_deref(), tags),
        attachments,
        flags: m.f.as_deref().map(|f| MessageFlags::from_wire(Some(f))),
        is_complete: None,
        auto_send_time: m.auto_send_time,
        invite: m.inv.clone(),
        share: m.shr.clone(),
    })
}

/// Normalizes a wire message into a full entity, applying message defaults.
///
/// # Errors
///
/// Returns an error if a participant has an unknown role.
pub fn normalize_mail_message(
    m: &SoapMessage,
    is_complete: bool,
    tags: &TagDirectory,
    config: &SyncConfig,
) -> Result<IncompleteMessage> {
    let mut patch = normalize_message_patch(m, tags, config)?;
    patch.is_complete = Some(is_complete);
    Ok(IncompleteMessage::from_patch(patch))
}
