//! Packed item flags.
//!
//! The server encodes boolean item attributes as a compact string where each
//! character that is present means "true", e.g. `"ua!"` for an unread, urgent
//! message with attachments.

use std::fmt;
use std::str::FromStr;

/// A single item flag character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flag {
    /// Item has not been read (`u`).
    Unread,
    /// Item is flagged for follow-up (`f`).
    Flagged,
    /// Item has attachments (`a`).
    Attachment,
    /// Item has been replied to (`r`).
    Replied,
    /// Item was sent by the mailbox owner (`s`).
    SentByMe,
    /// Item has been forwarded (`w`).
    Forwarded,
    /// Item carries a calendar invite (`v`).
    Invite,
    /// Item is a draft (`d`).
    Draft,
    /// Item is marked as deleted (`x`).
    Deleted,
    /// A read-receipt notification has already been sent (`n`).
    NotificationSent,
    /// Item is urgent (`!`).
    Urgent,
    /// Item has low priority (`?`).
    LowPriority,
    /// Item has high priority (`+`).
    Priority,
    /// Any character without a known meaning.
    Other(char),
}

impl Flag {
    /// Maps a flag character to a flag.
    #[must_use]
    pub const fn from_char(c: char) -> Self {
        match c {
            'u' => Self::Unread,
            'f' => Self::Flagged,
            'a' => Self::Attachment,
            'r' => Self::Replied,
            's' => Self::SentByMe,
            'w' => Self::Forwarded,
            'v' => Self::Invite,
            'd' => Self::Draft,
            'x' => Self::Deleted,
            'n' => Self::NotificationSent,
            '!' => Self::Urgent,
            '?' => Self::LowPriority,
            '+' => Self::Priority,
            other => Self::Other(other),
        }
    }

    /// Returns the wire character for this flag.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::Unread => 'u',
            Self::Flagged => 'f',
            Self::Attachment => 'a',
            Self::Replied => 'r',
            Self::SentByMe => 's',
            Self::Forwarded => 'w',
            Self::Invite => 'v',
            Self::Draft => 'd',
            Self::Deleted => 'x',
            Self::NotificationSent => 'n',
            Self::Urgent => '!',
            Self::LowPriority => '?',
            Self::Priority => '+',
            Self::Other(c) => c,
        }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Collection of item flags decoded from a packed flag string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Flags {
    flags: Vec<Flag>,
}

impl Flags {
    /// Creates an empty flags collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a packed flag string. Whitespace is ignored and duplicates collapse.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        let mut flags = Self::new();
        for c in s.chars().filter(|c| !c.is_whitespace()) {
            flags.insert(Flag::from_char(c));
        }
        flags
    }

    /// Decodes an optional flag string.
    ///
    /// Absent input yields `None`: the caller decides which defaults apply,
    /// since messages and conversations use different ones.
    #[must_use]
    pub fn decode(s: Option<&str>) -> Option<Self> {
        s.map(Self::parse)
    }

    /// Adds a flag.
    pub fn insert(&mut self, flag: Flag) {
        if !self.flags.contains(&flag) {
            self.flags.push(flag);
        }
    }

    /// Removes a flag.
    pub fn remove(&mut self, flag: Flag) {
        self.flags.retain(|f| *f != flag);
    }

    /// Returns true if the flag is present.
    #[must_use]
    pub fn contains(&self, flag: Flag) -> bool {
        self.flags.contains(&flag)
    }

    /// Returns true unless the unread flag is present.
    #[must_use]
    pub fn is_read(&self) -> bool {
        !self.contains(Flag::Unread)
    }

    /// Returns true if the item has attachments.
    #[must_use]
    pub fn has_attachment(&self) -> bool {
        self.contains(Flag::Attachment)
    }

    /// Returns true if the item is flagged.
    #[must_use]
    pub fn is_flagged(&self) -> bool {
        self.contains(Flag::Flagged)
    }

    /// Returns true if the item is urgent.
    #[must_use]
    pub fn is_urgent(&self) -> bool {
        self.contains(Flag::Urgent)
    }

    /// Returns true if the item is marked as deleted.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.contains(Flag::Deleted)
    }

    /// Returns true if the item is a draft.
    #[must_use]
    pub fn is_draft(&self) -> bool {
        self.contains(Flag::Draft)
    }

    /// Returns true if the item has been forwarded.
    #[must_use]
    pub fn is_forwarded(&self) -> bool {
        self.contains(Flag::Forwarded)
    }

    /// Returns true if the item was sent by the mailbox owner.
    #[must_use]
    pub fn is_sent_by_me(&self) -> bool {
        self.contains(Flag::SentByMe)
    }

    /// Returns true if the item carries a calendar invite.
    #[must_use]
    pub fn is_invite(&self) -> bool {
        self.contains(Flag::Invite)
    }

    /// Returns true if the item has been replied to.
    #[must_use]
    pub fn is_replied(&self) -> bool {
        self.contains(Flag::Replied)
    }

    /// Returns true if a read-receipt notification was already sent.
    #[must_use]
    pub fn is_notification_sent(&self) -> bool {
        self.contains(Flag::NotificationSent)
    }

    /// Returns an iterator over the flags.
    pub fn iter(&self) -> impl Iterator<Item = &Flag> {
        self.flags.iter()
    }

    /// Returns the number of flags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    /// Returns true if there are no flags.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

impl fmt::Display for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for flag in &self.flags {
            write!(f, "{flag}")?;
        }
        Ok(())
    }
}

impl FromStr for Flags {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl IntoIterator for Flags {
    type Item = Flag;
    type IntoIter = std::vec::IntoIter<Flag>;

    fn into_iter(self) -> Self::IntoIter {
        self.flags.into_iter()
    }
}
