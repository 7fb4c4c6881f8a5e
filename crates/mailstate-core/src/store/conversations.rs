//! Conversations slice: the conversation list of the current folder.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, warn};

use super::{ConversationIndex, Fault, ItemActionArg, Lifecycle, SearchPage, SliceStatus, Snapshots};
use crate::Result;
use crate::model::{
    ConvMessage, Conversation, ConversationPatch, FolderId, IncompleteMessage, MessagePatch,
};

/// Argument of a folder listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConversationsArg {
    /// Folder to list.
    pub folder: FolderId,
    /// Page offset.
    pub offset: u32,
}

/// Conversations of the folder being viewed.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationsSlice {
    /// Folder being listed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_folder: Option<FolderId>,
    /// Conversations.
    pub conversations: ConversationIndex,
    /// Message fetch status per expanded conversation.
    pub expanded_status: BTreeMap<String, SliceStatus>,
    /// Listing or action status.
    pub status: SliceStatus,
    /// Fault of the last failed request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fault: Option<Fault>,
    #[serde(skip)]
    snapshots: Snapshots<ConversationIndex>,
}

impl ConversationsSlice {
    /// Reduces a folder listing. The first page replaces the list, later
    /// pages extend it.
    pub fn fetch_conversations(&mut self, event: Lifecycle<FetchConversationsArg, SearchPage>) {
        match event {
            Lifecycle::Pending { arg, .. } => {
                if arg.offset == 0 {
                    self.current_folder = Some(arg.folder);
                }
                self.status = SliceStatus::Pending;
                self.fault = None;
            }
            Lifecycle::Fulfilled { arg, payload, .. } => {
                debug!(
                    folder = %arg.folder,
                    count = payload.conversations.len(),
                    more = payload.more,
                    "conversations fetched"
                );
                if arg.offset == 0 {
                    self.conversations.replace_all(payload.conversations);
                } else {
                    self.conversations.extend(payload.conversations);
                }
                self.status = SliceStatus::for_page(payload.more);
            }
            Lifecycle::Rejected { arg, fault, .. } => {
                warn!(folder = %arg.folder, code = %fault.code, "conversation fetch rejected");
                self.status = SliceStatus::Failed;
                self.fault = Some(fault);
            }
        }
    }

    /// Reduces the expansion of a conversation into its messages. The fetched
    /// messages become the conversation's stubs, in server order.
    pub fn fetch_conversation_messages(
        &mut self,
        event: Lifecycle<String, Vec<IncompleteMessage>>,
    ) {
        match event {
            Lifecycle::Pending { arg, .. } => {
                self.expanded_status.insert(arg, SliceStatus::Pending);
                self.fault = None;
            }
            Lifecycle::Fulfilled { arg, payload, .. } => {
                let stubs = payload
                    .iter()
                    .map(|m| ConvMessage::new(m.id.clone(), m.parent.clone(), m.date))
                    .collect();
                let patch = ConversationPatch {
                    messages: Some(stubs),
                    ..ConversationPatch::new(arg.clone())
                };
                self.conversations.merge_patch(&patch);
                self.expanded_status.insert(arg, SliceStatus::Complete);
            }
            Lifecycle::Rejected { arg, fault, .. } => {
                warn!(id = %arg, code = %fault.code, "conversation expansion rejected");
                self.expanded_status.insert(arg, SliceStatus::Failed);
                self.fault = Some(fault);
            }
        }
    }

    /// Reduces a bulk conversation action, applied optimistically at the
    /// pending stage. Conversations moved out of the current folder leave
    /// the list.
    ///
    /// # Errors
    ///
    /// Returns an error if a rejection arrives for a request whose pending
    /// stage was never seen.
    pub fn conv_action(&mut self, event: Lifecycle<ItemActionArg, ()>) -> Result<()> {
        match event {
            Lifecycle::Pending { request_id, arg } => {
                self.snapshots.capture(&request_id, &self.conversations);
                self.fault = None;
                self.conversations.apply_op(&arg.ids, &arg.op);
                let leaves_folder = arg.op.destination().is_some_and(|to| {
                    self.current_folder.as_deref().is_some_and(|current| current != to)
                });
                if leaves_folder {
                    self.conversations.remove(&arg.ids);
                }
                self.status = SliceStatus::Updating;
            }
            Lifecycle::Fulfilled { request_id, .. } => {
                if !self.snapshots.release(&request_id) {
                    warn!(%request_id, "conversation action fulfilled without pending stage");
                }
                self.status = SliceStatus::Idle;
            }
            Lifecycle::Rejected {
                request_id, fault, ..
            } => {
                warn!(%request_id, code = %fault.code, "conversation action rejected");
                self.status = SliceStatus::Failed;
                self.fault = Some(fault);
                self.conversations = self.snapshots.restore(&request_id)?;
            }
        }
        Ok(())
    }

    /// Adds created conversations that belong to the current folder (all of
    /// them when no folder is being listed).
    pub fn handle_created_conversations(&mut self, conversations: &[Conversation]) {
        for conversation in conversations {
            let belongs = self
                .current_folder
                .as_deref()
                .is_none_or(|folder| conversation.parent() == Some(folder));
            if belongs {
                debug!(id = %conversation.id, "conversation created");
                self.conversations.upsert(conversation.clone());
            }
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
        let added = self.conversations.add_messages(messages);
        debug!(added, "message stubs folded into conversations");
    }

    /// Propagates message moves to every conversation's stubs.
    pub fn handle_modified_messages(&mut self, patches: &[MessagePatch]) {
        let moved = self.conversations.update_message_parents(patches);
        if moved > 0 {
            debug!(moved, "message stubs moved");
        }
    }

    /// Removes deleted conversations and message stubs.
    pub fn handle_deleted(&mut self, ids: &[String]) {
        self.conversations.remove(ids);
        self.conversations.remove_messages(ids);
        for id in ids {
            self.expanded_status.remove(id);
        }
    }
}
