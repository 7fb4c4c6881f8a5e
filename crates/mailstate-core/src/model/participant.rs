//! Participant model.

use mailstate_soap::ParticipantRole;
use serde::{Deserialize, Serialize};

/// A typed participant of a message or conversation.
///
/// `==` is structural: every field takes part, so equality is total and
/// symmetric. [`Participant::matches`] offers the looser, one-sided
/// comparison used when looking up a participant by partial information.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    /// Role in the message.
    #[serde(rename = "type")]
    pub role: ParticipantRole,
    /// Email address.
    pub address: String,
    /// Display (short) name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Full name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

impl Participant {
    /// Creates a participant without names.
    #[must_use]
    pub fn new(role: ParticipantRole, address: impl Into<String>) -> Self {
        Self {
            role,
            address: address.into(),
            name: None,
            full_name: None,
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the full name.
    #[must_use]
    pub fn with_full_name(mut self, full_name: impl Into<String>) -> Self {
        self.full_name = Some(full_name.into());
        self
    }

    /// One-sided comparison with `self` acting as a template.
    ///
    /// Role and address must always match. `name` and `full_name` are only
    /// compared when present on `self`, so `a.matches(b)` does not imply
    /// `b.matches(a)`.
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        self.role == other.role
            && self.address == other.address
            && self.name.as_ref().is_none_or(|n| other.name.as_ref() == Some(n))
            && self
                .full_name
                .as_ref()
                .is_none_or(|n| other.full_name.as_ref() == Some(n))
    }

    /// Returns the best available label: full name, then name, then address.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or(&self.address)
    }
}
