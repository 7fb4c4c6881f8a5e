//! Searches slice: results of the last search.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, warn};

use super::{ConversationIndex, Fault, Lifecycle, SearchPage, SliceStatus};
use crate::model::{Conversation, ConversationPatch, FolderId, IncompleteMessage, MessagePatch};

/// Argument of a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchArg {
    /// Query string.
    pub query: String,
    /// Page offset.
    pub offset: u32,
    /// Sort order.
    pub sort_by: Option<String>,
    /// Folder restriction.
    pub folder: Option<FolderId>,
}

/// Search results. Conversations here follow the same merge rules as the
/// conversation list through [`ConversationIndex`].
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchesSlice {
    /// Matching conversations.
    pub conversations: ConversationIndex,
    /// Matching messages.
    pub messages: BTreeMap<String, IncompleteMessage>,
    /// Whether more results exist.
    pub more: bool,
    /// Offset of the last page.
    pub offset: u32,
    /// Query of the current search.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    /// Sort order of the current search.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    /// Folder restriction of the current search.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<FolderId>,
    /// Search status.
    pub status: SliceStatus,
    /// Fault of the last failed search.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fault: Option<Fault>,
}

impl SearchesSlice {
    /// Reduces a search. A page at offset 0 replaces the results, later
    /// pages are appended.
    pub fn search(&mut self, event: Lifecycle<SearchArg, SearchPage>) {
        match event {
            Lifecycle::Pending { arg, .. } => {
                if arg.offset == 0 {
                    self.query = Some(arg.query);
                    self.sort_by = arg.sort_by;
                    self.parent = arg.folder;
                }
                self.status = SliceStatus::Pending;
                self.fault = None;
            }
            Lifecycle::Fulfilled { arg, payload, .. } => {
                debug!(
                    query = %arg.query,
                    offset = arg.offset,
                    conversations = payload.conversations.len(),
                    messages = payload.messages.len(),
                    "search fulfilled"
                );
                if arg.offset == 0 {
                    self.conversations.replace_all(payload.conversations);
                    self.messages.clear();
                } else {
                    self.conversations.extend(payload.conversations);
                }
                self.messages
                    .extend(payload.messages.into_iter().map(|m| (m.id.clone(), m)));
                self.more = payload.more;
                self.offset = arg.offset;
                self.status = SliceStatus::for_page(payload.more);
            }
            Lifecycle::Rejected { arg, fault, .. } => {
                warn!(query = %arg.query, code = %fault.code, "search rejected");
                self.status = SliceStatus::Failed;
                self.fault = Some(fault);
            }
        }
    }

    /// Adds created conversations when the search is restricted to their
    /// folder. Unrestricted queries cannot be evaluated locally.
    pub fn handle_created_conversations(&mut self, conversations: &[Conversation]) {
        let Some(folder) = self.parent.as_deref() else {
            return;
        };
        for conversation in conversations.iter().filter(|c| c.parent() == Some(folder)) {
            self.conversations.upsert(conversation.clone());
        }
    }

    /// Merges modified conversations that are held here.
    pub fn handle_modified_conversations(&mut self, patches: &[ConversationPatch]) {
        for patch in patches {
            self.conversations.merge_patch(patch);
        }
    }

    /// Folds created messages into their conversations.
    pub fn handle_created_messages(&mut self, messages: &[IncompleteMessage]) {
        self.conversations.add_messages(messages);
    }

    /// Merges modified messages and propagates moves to conversation stubs.
    pub fn handle_modified_messages(&mut self, patches: &[MessagePatch]) {
        for patch in patches {
            if let Some(message) = self.messages.get_mut(&patch.id) {
                message.apply(patch);
            }
        }
        self.conversations.update_message_parents(patches);
    }

    /// Removes deleted conversations, messages and stubs.
    pub fn handle_deleted(&mut self, ids: &[String]) {
        self.conversations.remove(ids);
        self.conversations.remove_messages(ids);
        for id in ids {
            self.messages.remove(id);
        }
    }
}
