//! Messages slice: the flat message map.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, warn};

use super::{Fault, ItemActionArg, ItemOp, Lifecycle, SliceStatus, Snapshots};
use crate::Result;
use crate::model::{IncompleteMessage, MessagePatch};

/// Messages keyed by id.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagesSlice {
    /// Messages by id.
    pub messages: BTreeMap<String, IncompleteMessage>,
    /// Status of the last bulk action.
    pub status: SliceStatus,
    /// Fetch status per message id.
    pub search_status: BTreeMap<String, SliceStatus>,
    /// Fault of the last failed request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fault: Option<Fault>,
    #[serde(skip)]
    snapshots: Snapshots<BTreeMap<String, IncompleteMessage>>,
}

impl MessagesSlice {
    /// Returns a message.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&IncompleteMessage> {
        self.messages.get(id)
    }

    /// Number of messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns true if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Stores messages from a listing. A complete message is never replaced
    /// by an incomplete copy of itself.
    pub fn upsert_many(&mut self, messages: impl IntoIterator<Item = IncompleteMessage>) {
        for message in messages {
            self.keep_complete_insert(message);
        }
    }

    /// Inserts a message unless that would drop a complete copy already held.
    /// Returns false if the message was ignored.
    fn keep_complete_insert(&mut self, message: IncompleteMessage) -> bool {
        let downgrade = self
            .messages
            .get(&message.id)
            .is_some_and(|existing| existing.is_complete && !message.is_complete);
        if !downgrade {
            self.messages.insert(message.id.clone(), message);
        }
        !downgrade
    }

    /// Reduces a full message fetch.
    pub fn get_message(&mut self, event: Lifecycle<String, IncompleteMessage>) {
        match event {
            Lifecycle::Pending { arg, .. } => {
                self.search_status.insert(arg, SliceStatus::Pending);
                self.fault = None;
            }
            Lifecycle::Fulfilled { arg, payload, .. } => {
                self.search_status.insert(arg, SliceStatus::Complete);
                self.messages.insert(payload.id.clone(), payload);
            }
            Lifecycle::Rejected { arg, fault, .. } => {
                warn!(id = %arg, code = %fault.code, "message fetch rejected");
                self.search_status.insert(arg, SliceStatus::Failed);
                self.fault = Some(fault);
            }
        }
    }

    /// Reduces a bulk message action, applied optimistically at the pending
    /// stage.
    ///
    /// # Errors
    ///
    /// Returns an error if a rejection arrives for a request whose pending
    /// stage was never seen.
    pub fn msg_action(&mut self, event: Lifecycle<ItemActionArg, ()>) -> Result<()> {
        match event {
            Lifecycle::Pending { request_id, arg } => {
                self.snapshots.capture(&request_id, &self.messages);
                self.fault = None;
                self.apply_op(&arg);
                self.status = SliceStatus::Updating;
            }
            Lifecycle::Fulfilled { request_id, .. } => {
                if !self.snapshots.release(&request_id) {
                    warn!(%request_id, "message action fulfilled without pending stage");
                }
                self.status = SliceStatus::Idle;
            }
            Lifecycle::Rejected {
                request_id, fault, ..
            } => {
                warn!(%request_id, code = %fault.code, "message action rejected");
                self.status = SliceStatus::Failed;
                self.fault = Some(fault);
                self.messages = self.snapshots.restore(&request_id)?;
            }
        }
        Ok(())
    }

    fn apply_op(&mut self, arg: &ItemActionArg) {
        for id in &arg.ids {
            if matches!(arg.op, ItemOp::Delete) {
                self.messages.remove(id);
                continue;
            }
            let Some(message) = self.messages.get_mut(id) else {
                continue;
            };
            match &arg.op {
                ItemOp::Read => message.flags.read = true,
                ItemOp::Unread => message.flags.read = false,
                ItemOp::Flag => message.flags.flagged = true,
                ItemOp::Unflag => message.flags.flagged = false,
                ItemOp::Move { .. } | ItemOp::Trash => {
                    message.parent = arg.op.destination().map(String::from);
                }
                ItemOp::Tag { id } => {
                    if !message.tags.contains(id) {
                        message.tags.push(id.clone());
                    }
                }
                ItemOp::Untag { id } => message.tags.retain(|t| t != id),
                ItemOp::Delete => {}
            }
        }
    }

    /// Inserts messages from a `created` notification.
    pub fn handle_created(&mut self, messages: Vec<IncompleteMessage>) {
        for message in messages {
            let id = message.id.clone();
            if self.keep_complete_insert(message) {
                debug!(%id, "message created");
            } else {
                debug!(%id, "created message already held complete");
            }
        }
    }

    /// Merges patches from a `modified` notification. Unknown ids are ignored.
    pub fn handle_modified(&mut self, patches: &[MessagePatch]) {
        for patch in patches {
            if let Some(message) = self.messages.get_mut(&patch.id) {
                message.apply(patch);
            }
        }
    }

    /// Removes deleted ids.
    pub fn handle_deleted(&mut self, ids: &[String]) {
        for id in ids {
            if self.messages.remove(id).is_some() {
                self.search_status.remove(id);
                debug!(%id, "message deleted");
            }
        }
    }
}
