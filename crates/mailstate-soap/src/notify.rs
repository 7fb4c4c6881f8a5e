//! Server-pushed change notifications.
//!
//! Each notification carries a monotonically increasing `seq` and three
//! optional change sets: `created`, `modified` and `deleted`. The server does
//! not retransmit missed notifications; a `seq` of 1 marks a fresh session.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Result;
use crate::types::{SoapConversation, SoapFolder, SoapMessage};

/// A single notification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SoapNotify {
    /// Sequence number.
    pub seq: u64,
    /// Newly created items.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<SoapCreated>,
    /// Items whose attributes changed (partial objects).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<SoapModified>,
    /// Ids of deleted items of any kind.
    #[serde(default, deserialize_with = "deleted_ids", skip_serializing_if = "Vec::is_empty")]
    pub deleted: Vec<String>,
}

impl SoapNotify {
    /// Returns true if the notification carries no changes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.created.as_ref().is_none_or(SoapCreated::is_empty)
            && self.modified.as_ref().is_none_or(SoapModified::is_empty)
            && self.deleted.is_empty()
    }
}

/// Created items.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SoapCreated {
    /// Conversations.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub c: Vec<SoapConversation>,
    /// Messages.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub m: Vec<SoapMessage>,
    /// Folders.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub folder: Vec<SoapFolder>,
}

impl SoapCreated {
    /// Returns true if nothing was created.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.c.is_empty() && self.m.is_empty() && self.folder.is_empty()
    }
}

/// Modified items.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SoapModified {
    /// Conversations.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub c: Vec<SoapConversation>,
    /// Messages.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub m: Vec<SoapMessage>,
    /// Folders.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub folder: Vec<SoapFolder>,
}

impl SoapModified {
    /// Returns true if nothing was modified.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.c.is_empty() && self.m.is_empty() && self.folder.is_empty()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DeletedIds {
    List(Vec<String>),
    Joined(String),
    Object { id: String },
}

/// Accepts `"1,2"`, `["1","2"]` or `{"id":"1,2"}`.
fn deleted_ids<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let split = |s: &str| -> Vec<String> {
        s.split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(String::from)
            .collect()
    };
    Ok(match Option::<DeletedIds>::deserialize(deserializer)? {
        Some(DeletedIds::List(ids)) => ids,
        Some(DeletedIds::Joined(s) | DeletedIds::Object { id: s }) => split(&s),
        None => Vec::new(),
    })
}

/// Parses a JSON array of notifications.
///
/// # Errors
///
/// Returns an error if the input is not a JSON array of notifications.
pub fn parse_batch(json: &str) -> Result<Vec<SoapNotify>> {
    Ok(serde_json::from_str(json)?)
}
