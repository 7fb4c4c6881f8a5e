//! Message participants (email addresses with a role).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Role of a participant in a message or conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParticipantRole {
    /// Author (`f`).
    From,
    /// Primary recipient (`t`).
    To,
    /// Carbon copy (`c`).
    Cc,
    /// Blind carbon copy (`b`).
    Bcc,
    /// Reply-To address (`r`).
    ReplyTo,
    /// Sender acting on behalf of the author (`s`).
    Sender,
    /// Address requesting a read receipt (`n`).
    ReadReceiptNotification,
    /// Resent-From address (`rf`).
    ResentFrom,
}

impl ParticipantRole {
    /// Parses a wire role code.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownParticipantRole`] for any code the client does not
    /// understand. This indicates a protocol mismatch with the server.
    pub fn parse(code: &str) -> Result<Self> {
        match code {
            "f" => Ok(Self::From),
            "t" => Ok(Self::To),
            "c" => Ok(Self::Cc),
            "b" => Ok(Self::Bcc),
            "r" => Ok(Self::ReplyTo),
            "s" => Ok(Self::Sender),
            "n" => Ok(Self::ReadReceiptNotification),
            "rf" => Ok(Self::ResentFrom),
            other => Err(Error::UnknownParticipantRole(other.to_string())),
        }
    }

    /// Returns the wire role code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::From => "f",
            Self::To => "t",
            Self::Cc => "c",
            Self::Bcc => "b",
            Self::ReplyTo => "r",
            Self::Sender => "s",
            Self::ReadReceiptNotification => "n",
            Self::ResentFrom => "rf",
        }
    }
}

impl fmt::Display for ParticipantRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Wire participant record (`{t, a, d, p}`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoapParticipant {
    /// Role code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t: Option<String>,
    /// Email address.
    #[serde(default)]
    pub a: String,
    /// Display (short) name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub d: Option<String>,
    /// Personal (full) name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p: Option<String>,
}
