//! Wire-format mail items: conversations, messages, parts and folders.
//!
//! Field names mirror the server's short JSON keys. Everything except `id` is
//! optional and unknown keys are ignored, so partial objects from `modified`
//! notifications decode with the same types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::lenient::option_number;
use super::participant::SoapParticipant;

/// Wire conversation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SoapConversation {
    /// Conversation id.
    pub id: String,
    /// Date of the most recent message (ms since epoch).
    #[serde(default, deserialize_with = "option_number", skip_serializing_if = "Option::is_none")]
    pub d: Option<i64>,
    /// Participants.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub e: Option<Vec<SoapParticipant>>,
    /// Packed flag string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub f: Option<String>,
    /// Fragment (body preview).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fr: Option<String>,
    /// Embedded message stubs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub m: Option<Vec<SoapConvMessage>>,
    /// Message count.
    #[serde(default, deserialize_with = "option_number", skip_serializing_if = "Option::is_none")]
    pub n: Option<u32>,
    /// Subject.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub su: Option<String>,
    /// Comma-separated tag ids.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t: Option<String>,
    /// Comma-separated tag names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tn: Option<String>,
    /// Unread message count.
    #[serde(default, deserialize_with = "option_number", skip_serializing_if = "Option::is_none")]
    pub u: Option<u32>,
}

/// Message stub embedded in a conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoapConvMessage {
    /// Message id.
    pub id: String,
    /// Folder id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub l: Option<String>,
    /// Date (ms since epoch).
    #[serde(default, deserialize_with = "option_number", skip_serializing_if = "Option::is_none")]
    pub d: Option<i64>,
    /// Packed flag string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub f: Option<String>,
}

/// Wire message (complete or incomplete).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SoapMessage {
    /// Message id.
    pub id: String,
    /// Conversation id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cid: Option<String>,
    /// Date (ms since epoch).
    #[serde(default, deserialize_with = "option_number", skip_serializing_if = "Option::is_none")]
    pub d: Option<i64>,
    /// Participants.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub e: Option<Vec<SoapParticipant>>,
    /// Packed flag string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub f: Option<String>,
    /// Fragment (body preview).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fr: Option<String>,
    /// Folder id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub l: Option<String>,
    /// MIME part tree.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mp: Option<Vec<SoapMessagePart>>,
    /// Size in bytes.
    #[serde(default, deserialize_with = "option_number", skip_serializing_if = "Option::is_none")]
    pub s: Option<u64>,
    /// Subject.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub su: Option<String>,
    /// Comma-separated tag ids.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t: Option<String>,
    /// Comma-separated tag names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tn: Option<String>,
    /// Calendar invite payload, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inv: Option<Value>,
    /// Share notification payload, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shr: Option<Value>,
    /// Scheduled send time (ms since epoch).
    #[serde(
        rename = "autoSendTime",
        default,
        deserialize_with = "option_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub auto_send_time: Option<i64>,
}

/// Wire MIME part.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoapMessagePart {
    /// Part path (e.g. `"1"`, `"2.1"`).
    #[serde(default)]
    pub part: String,
    /// Content type.
    #[serde(default)]
    pub ct: String,
    /// Size in bytes.
    #[serde(default, deserialize_with = "option_number", skip_serializing_if = "Option::is_none")]
    pub s: Option<u64>,
    /// Content disposition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cd: Option<String>,
    /// Content id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ci: Option<String>,
    /// Inline content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Attachment filename.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Whether this part is the message body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<bool>,
    /// Child parts of a multipart container.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mp: Option<Vec<SoapMessagePart>>,
}

/// Wire folder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SoapFolder {
    /// Folder id.
    pub id: String,
    /// Folder name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Parent folder id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub l: Option<String>,
    /// Absolute folder path.
    #[serde(rename = "absFolderPath", default, skip_serializing_if = "Option::is_none")]
    pub abs_folder_path: Option<String>,
    /// Unread count.
    #[serde(default, deserialize_with = "option_number", skip_serializing_if = "Option::is_none")]
    pub u: Option<u32>,
    /// Item count.
    #[serde(default, deserialize_with = "option_number", skip_serializing_if = "Option::is_none")]
    pub n: Option<u32>,
    /// Size in bytes.
    #[serde(default, deserialize_with = "option_number", skip_serializing_if = "Option::is_none")]
    pub s: Option<u64>,
    /// Default item view (`message`, `conversation`, `contact`...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
    /// Color index.
    #[serde(default, deserialize_with = "option_number", skip_serializing_if = "Option::is_none")]
    pub color: Option<u8>,
    /// Custom RGB color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rgb: Option<String>,
    /// Subfolders, when the folder is part of a tree response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<Vec<SoapFolder>>,
}

impl SoapFolder {
    /// Flattens a folder tree into a depth-first list, parents before children.
    #[must_use]
    pub fn flatten(&self) -> Vec<&Self> {
        let mut out = vec![self];
        for child in self.folder.iter().flatten() {
            out.extend(child.flatten());
        }
        out
    }
}

/// Wire search response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SoapSearchResponse {
    /// Matching conversations.
    #[serde(default)]
    pub c: Vec<SoapConversation>,
    /// Matching (or expanded) messages.
    #[serde(default)]
    pub m: Vec<SoapMessage>,
    /// Whether more results are available.
    #[serde(default)]
    pub more: bool,
    /// Offset of this page.
    #[serde(default)]
    pub offset: u32,
    /// Sort order used by the server.
    #[serde(rename = "sortBy", default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn conversation_with_string_dates() {
        let c: SoapConversation = serde_json::from_str(
            r#"{"id":"123","m":[{"id":"987","l":"folder2","d":"555"}],"e":[],
                "su":"Subj","fr":"frag","f":"u","n":1,"u":1,"d":123}"#,
        )
        .unwrap();
        assert_eq!(c.d, Some(123));
        assert_eq!(c.n, Some(1));
        let stubs = c.m.unwrap();
        assert_eq!(stubs[0].d, Some(555));
        assert_eq!(stubs[0].l.as_deref(), Some("folder2"));
    }

    #[test]
    fn partial_message_decodes() {
        let m: SoapMessage = serde_json::from_str(r#"{"id":"987","l":"3"}"#).unwrap();
        assert_eq!(m.id, "987");
        assert_eq!(m.l.as_deref(), Some("3"));
        assert!(m.f.is_none());
        assert!(m.mp.is_none());
    }

    #[test]
    fn message_auto_send_time() {
        let m: SoapMessage =
            serde_json::from_str(r#"{"id":"1","autoSendTime":1700000000000}"#).unwrap();
        assert_eq!(m.auto_send_time, Some(1_700_000_000_000));
    }

    #[test]
    fn nested_parts() {
        let m: SoapMessage = serde_json::from_str(
            r#"{"id":"1","mp":[{"part":"TEXT","ct":"multipart/mixed","mp":[
                {"part":"1","ct":"text/plain","body":true,"content":"hi"},
                {"part":"2","ct":"application/pdf","cd":"attachment","filename":"a.pdf","s":"10"}]}]}"#,
        )
        .unwrap();
        let root = &m.mp.unwrap()[0];
        let children = root.mp.as_ref().unwrap();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].body, Some(true));
        assert_eq!(children[1].s, Some(10));
    }

    #[test]
    fn folder_flatten_is_depth_first() {
        let f: SoapFolder = serde_json::from_str(
            r#"{"id":"1","folder":[{"id":"2","folder":[{"id":"5"}]},{"id":"3"}]}"#,
        )
        .unwrap();
        let ids: Vec<_> = f.flatten().iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, ["1", "2", "5", "3"]);
    }
}
