//! In-memory store slices.
//!
//! Four independently mutable slices hold overlapping entities: folders,
//! the conversation list of the current folder, the flat message map and the
//! search results. Each slice is a plain struct whose methods are the
//! reducers: synchronous functions of `(state, event)`. Server round trips
//! happen elsewhere; slices only see their lifecycle events.
//!
//! Conversations live in both the conversations and the searches slice. Both
//! hold a [`ConversationIndex`], so the merge rules are written once.

mod conversations;
mod folders;
mod index;
mod messages;
mod searches;

use std::collections::HashMap;

use mailstate_soap::SoapSearchResponse;
use serde::Serialize;

use crate::config::SyncConfig;
use crate::model::{Conversation, FolderId, IncompleteMessage, TagDirectory};
use crate::normalize::{ConversationSource, normalize_conversation, normalize_mail_message};
use crate::{Error, Result};

pub use conversations::{ConversationsSlice, FetchConversationsArg};
pub use folders::{CreateFolderArg, FolderActionArg, FolderOp, FoldersSlice};
pub use index::ConversationIndex;
pub use messages::MessagesSlice;
pub use searches::{SearchArg, SearchesSlice};

/// Identifier of an async request, shared by its lifecycle events.
pub type RequestId = String;

/// Id of the trash folder.
pub const TRASH_FOLDER_ID: &str = "3";

/// Server fault attached to a rejected request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fault {
    /// Fault code (e.g. `mail.NO_SUCH_FOLDER`).
    pub code: String,
    /// Human-readable reason.
    pub reason: String,
}

impl Fault {
    /// Creates a fault.
    #[must_use]
    pub fn new(code: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            reason: reason.into(),
        }
    }
}

/// Lifecycle event of an async server operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Lifecycle<A, P> {
    /// The request was sent.
    Pending {
        /// Request id.
        request_id: RequestId,
        /// Request argument.
        arg: A,
    },
    /// The server answered.
    Fulfilled {
        /// Request id.
        request_id: RequestId,
        /// Request argument.
        arg: A,
        /// Response payload.
        payload: P,
    },
    /// The request failed.
    Rejected {
        /// Request id.
        request_id: RequestId,
        /// Request argument.
        arg: A,
        /// Server fault.
        fault: Fault,
    },
}

impl<A, P> Lifecycle<A, P> {
    /// Returns the request id.
    #[must_use]
    pub fn request_id(&self) -> &str {
        match self {
            Self::Pending { request_id, .. }
            | Self::Fulfilled { request_id, .. }
            | Self::Rejected { request_id, .. } => request_id,
        }
    }

    /// Returns the request argument.
    #[must_use]
    pub const fn arg(&self) -> &A {
        match self {
            Self::Pending { arg, .. } | Self::Fulfilled { arg, .. } | Self::Rejected { arg, .. } => {
                arg
            }
        }
    }
}

/// Status of a slice or of one of its requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SliceStatus {
    /// Nothing in flight.
    #[default]
    Idle,
    /// A fetch is in flight.
    Pending,
    /// A creation is in flight.
    Adding,
    /// An update is in flight.
    Updating,
    /// A listing was fully loaded.
    Complete,
    /// A listing was loaded and more pages exist.
    HasMore,
    /// The last request failed.
    Failed,
}

impl SliceStatus {
    /// Listing status for a page.
    #[must_use]
    pub const fn for_page(more: bool) -> Self {
        if more { Self::HasMore } else { Self::Complete }
    }
}

/// State captured at the pending stage of optimistic requests, keyed by
/// request id.
#[derive(Debug, Clone)]
pub struct Snapshots<T> {
    inner: HashMap<RequestId, T>,
}

impl<T> Default for Snapshots<T> {
    fn default() -> Self {
        Self {
            inner: HashMap::new(),
        }
    }
}

impl<T: Clone> Snapshots<T> {
    /// Records the state before an optimistic update.
    pub fn capture(&mut self, request_id: &str, state: &T) {
        self.inner.insert(request_id.to_string(), state.clone());
    }

    /// Drops the snapshot of a fulfilled request. Returns false if none was
    /// recorded.
    pub fn release(&mut self, request_id: &str) -> bool {
        self.inner.remove(request_id).is_some()
    }

    /// Takes the snapshot of a rejected request for rollback.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownRequest`] if the pending stage was never seen.
    pub fn restore(&mut self, request_id: &str) -> Result<T> {
        self.inner
            .remove(request_id)
            .ok_or_else(|| Error::UnknownRequest(request_id.to_string()))
    }

    /// Number of requests in flight.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns true if no request is in flight.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// A page of normalized search results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchPage {
    /// Conversations.
    pub conversations: Vec<Conversation>,
    /// Messages.
    pub messages: Vec<IncompleteMessage>,
    /// Whether more results exist.
    pub more: bool,
    /// Offset of this page.
    pub offset: u32,
}

impl SearchPage {
    /// Normalizes a wire search response.
    ///
    /// Conversations take their stubs from the embedded list, falling back to
    /// the messages of the same response.
    ///
    /// # Errors
    ///
    /// Returns an error if a participant has an unknown role.
    pub fn from_response(
        response: &SoapSearchResponse,
        tags: &TagDirectory,
        config: &SyncConfig,
    ) -> Result<Self> {
        let conversations = response
            .c
            .iter()
            .map(|c| normalize_conversation(ConversationSource::with_messages(c, &response.m), tags))
            .collect::<Result<_>>()?;
        let messages = response
            .m
            .iter()
            .map(|m| normalize_mail_message(m, false, tags, config))
            .collect::<Result<_>>()?;
        Ok(Self {
            conversations,
            messages,
            more: response.more,
            offset: response.offset,
        })
    }
}

/// Bulk item operation on conversations or messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOp {
    /// Mark read.
    Read,
    /// Mark unread.
    Unread,
    /// Set the flag.
    Flag,
    /// Clear the flag.
    Unflag,
    /// Move to a folder.
    Move {
        /// Destination folder.
        to: FolderId,
    },
    /// Move to the trash folder.
    Trash,
    /// Delete permanently.
    Delete,
    /// Add a tag.
    Tag {
        /// Tag id.
        id: String,
    },
    /// Remove a tag.
    Untag {
        /// Tag id.
        id: String,
    },
}

impl ItemOp {
    /// Destination folder of a move, if this op moves items.
    #[must_use]
    pub fn destination(&self) -> Option<&str> {
        match self {
            Self::Move { to } => Some(to),
            Self::Trash => Some(TRASH_FOLDER_ID),
            _ => None,
        }
    }
}

/// Argument of a bulk item action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemActionArg {
    /// Target ids.
    pub ids: Vec<String>,
    /// Operation.
    pub op: ItemOp,
}

/// All slices together, with views that join them.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MailStore {
    /// Folder tree.
    pub folders: FoldersSlice,
    /// Conversation list of the current folder.
    pub conversations: ConversationsSlice,
    /// Flat message map.
    pub messages: MessagesSlice,
    /// Search results.
    pub searches: SearchesSlice,
}

impl MailStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new(config: &SyncConfig) -> Self {
        Self {
            folders: FoldersSlice::new(&config.folder_root_id),
            ..Self::default()
        }
    }

    /// Looks up a conversation in the conversation list, then in the search
    /// results.
    #[must_use]
    pub fn conversation(&self, id: &str) -> Option<&Conversation> {
        self.conversations
            .conversations
            .get(id)
            .or_else(|| self.searches.conversations.get(id))
    }

    /// Joins a conversation's stubs against the message map, in stub order.
    /// Stubs without a loaded message are skipped.
    #[must_use]
    pub fn conversation_messages(&self, conversation_id: &str) -> Vec<&IncompleteMessage> {
        self.conversation(conversation_id)
            .map(|conversation| {
                conversation
                    .messages()
                    .iter()
                    .filter_map(|stub| self.messages.get(&stub.id))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Conversations whose folder is `folder_id`, newest first.
    #[must_use]
    pub fn folder_conversations(&self, folder_id: &str) -> Vec<&Conversation> {
        let mut out: Vec<_> = self
            .conversations
            .conversations
            .iter()
            .filter(|c| c.parent() == Some(folder_id))
            .collect();
        out.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.cmp(&b.id)));
        out
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{ConvMessage, ConversationPatch, MessagePatch};

    mod snapshot_tests {
        use super::*;

        #[test]
        fn restore_returns_captured_state() {
            let mut snapshots = Snapshots::default();
            snapshots.capture("r1", &vec![1, 2]);
            assert_eq!(snapshots.len(), 1);
            assert_eq!(snapshots.restore("r1").unwrap(), vec![1, 2]);
            assert!(snapshots.is_empty());
        }

        #[test]
        fn restore_unknown_request_fails() {
            let mut snapshots: Snapshots<u8> = Snapshots::default();
            assert!(matches!(
                snapshots.restore("nope"),
                Err(Error::UnknownRequest(id)) if id == "nope"
            ));
            assert!(!snapshots.release("nope"));
        }
    }

    mod lifecycle_tests {
        use super::*;

        #[test]
        fn accessors() {
            let event: Lifecycle<u8, ()> = Lifecycle::Rejected {
                request_id: "r".into(),
                arg: 7,
                fault: Fault::new("service.FAILURE", "boom"),
            };
            assert_eq!(event.request_id(), "r");
            assert_eq!(*event.arg(), 7);
        }

        #[test]
        fn op_destination() {
            assert_eq!(ItemOp::Trash.destination(), Some(TRASH_FOLDER_ID));
            assert_eq!(ItemOp::Move { to: "9".into() }.destination(), Some("9"));
            assert_eq!(ItemOp::Read.destination(), None);
        }
    }

    mod view_tests {
        use super::*;

        fn conversation(id: &str, folder: &str, date: i64, stubs: &[&str]) -> Conversation {
            Conversation::from_patch(ConversationPatch {
                date: Some(date),
                messages: Some(
                    stubs
                        .iter()
                        .map(|m| ConvMessage::new(*m, Some(folder.into()), None))
                        .collect(),
                ),
                ..ConversationPatch::new(id)
            })
        }

        #[test]
        fn joins_stubs_against_message_map() {
            let mut store = MailStore::new(&SyncConfig::default());
            store
                .conversations
                .conversations
                .upsert(conversation("c1", "2", 1, &["m1", "m2", "m3"]));
            store.messages.handle_created(vec![
                IncompleteMessage::from_patch(MessagePatch::new("m3")),
                IncompleteMessage::from_patch(MessagePatch::new("m1")),
            ]);

            let ids: Vec<_> = store
                .conversation_messages("c1")
                .iter()
                .map(|m| m.id.as_str())
                .collect();
            assert_eq!(ids, ["m1", "m3"]);
            assert!(store.conversation_messages("missing").is_empty());
        }

        #[test]
        fn falls_back_to_search_results() {
            let mut store = MailStore::default();
            store
                .searches
                .conversations
                .upsert(conversation("c9", "5", 1, &["m1"]));
            assert!(store.conversation("c9").is_some());
        }

        #[test]
        fn folder_view_is_newest_first() {
            let mut store = MailStore::default();
            let index = &mut store.conversations.conversations;
            index.upsert(conversation("a", "2", 10, &["1"]));
            index.upsert(conversation("b", "2", 30, &["2"]));
            index.upsert(conversation("c", "5", 20, &["3"]));

            let ids: Vec<_> = store
                .folder_conversations("2")
                .iter()
                .map(|c| c.id.as_str())
                .collect();
            assert_eq!(ids, ["b", "a"]);
        }
    }
}
