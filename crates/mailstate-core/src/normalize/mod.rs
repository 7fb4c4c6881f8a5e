//! Wire-to-entity normalizers.
//!
//! Pure functions turning SOAP objects into the shapes the stores hold. Absent
//! wire fields stay absent (`None` in the patch types); the only hard failure
//! is a participant role code the client does not know.

mod conversation;
mod folder;
mod message;
mod tags;

use mailstate_soap::{ParticipantRole, SoapParticipant};

use crate::Result;
use crate::model::Participant;

pub use conversation::{ConversationSource, normalize_conversation, normalize_conversation_patch};
pub use folder::{FolderLookup, normalize_folder, normalize_folder_patch, normalize_folder_tree};
pub use message::{normalize_mail_message, normalize_message_patch, normalize_part, normalize_parts};
pub use tags::{UNRESOLVED_TAG_PREFIX, resolve_tag_ids, resolve_tag_patch};

/// Normalizes a wire participant.
///
/// # Errors
///
/// Returns an error if the role code is missing or unknown.
pub fn normalize_participant(p: &SoapParticipant) -> Result<Participant> {
    let role = ParticipantRole::parse(p.t.as_deref().unwrap_or_default())?;
    Ok(Participant {
        role,
        address: p.a.clone(),
        name: p.d.clone(),
        full_name: p.p.clone(),
    })
}

/// Normalizes a list of wire participants, failing on the first bad role.
///
/// # Errors
///
/// Returns an error if any role code is missing or unknown.
pub fn normalize_participants(participants: &[SoapParticipant]) -> Result<Vec<Participant>> {
    participants.iter().map(normalize_participant).collect()
}
