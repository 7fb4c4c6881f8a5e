//! Notification sync.
//!
//! The server pushes sequence-numbered notifications carrying `created`,
//! `modified` and `deleted` change sets. [`SyncDispatcher`] orders them,
//! drops stale ones, normalizes their payloads and feeds every slice of a
//! [`MailStore`] in a fixed order.
//!
//! Delivery is not guaranteed: a missed sequence number is only detected, not
//! repaired. The report tells the caller when a full refetch is due.

use std::collections::BTreeMap;

use mailstate_soap::SoapNotify;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::Result;
use crate::config::SyncConfig;
use crate::model::{
    Conversation, ConversationPatch, Folder, FolderId, FolderPatch, IncompleteMessage,
    MessagePatch, TagDirectory,
};
use crate::normalize::{
    ConversationSource, FolderLookup, normalize_conversation, normalize_conversation_patch,
    normalize_folder, normalize_folder_patch, normalize_mail_message, normalize_message_patch,
};
use crate::store::MailStore;

/// Sequence number that marks a fresh server session.
pub const SESSION_START_SEQ: u64 = 1;

/// Outcome of processing a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    /// Sequence numbers applied, in order.
    pub applied: Vec<u64>,
    /// Sequence numbers skipped as stale.
    pub skipped: Vec<u64>,
    /// A sequence gap was seen; local state may be missing changes.
    pub resync_required: bool,
}

/// Applies notification batches to a store, tracking the last applied
/// sequence number.
#[derive(Debug, Clone, Default)]
pub struct SyncDispatcher {
    last_seq: Option<u64>,
    config: SyncConfig,
}

/// A notification with every payload normalized, ready to apply.
#[derive(Debug, Default)]
struct Changes {
    created_folders: Vec<Folder>,
    modified_folders: Vec<FolderPatch>,
    created_conversations: Vec<Conversation>,
    created_messages: Vec<IncompleteMessage>,
    modified_conversations: Vec<ConversationPatch>,
    modified_messages: Vec<MessagePatch>,
    deleted: Vec<String>,
}

/// Folders already held, plus the ones created earlier in the same
/// notification.
struct ChainedFolders<'a> {
    created: &'a BTreeMap<FolderId, Folder>,
    held: &'a BTreeMap<FolderId, Folder>,
}

impl FolderLookup for ChainedFolders<'_> {
    fn folder(&self, id: &str) -> Option<&Folder> {
        self.created.get(id).or_else(|| self.held.get(id))
    }
}

impl SyncDispatcher {
    /// Creates a dispatcher that has not applied anything yet.
    #[must_use]
    pub const fn new(config: SyncConfig) -> Self {
        Self {
            last_seq: None,
            config,
        }
    }

    /// Last applied sequence number.
    #[must_use]
    pub const fn last_seq(&self) -> Option<u64> {
        self.last_seq
    }

    /// Settings in use.
    #[must_use]
    pub const fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Forgets the last applied sequence number, e.g. after a full refetch.
    pub fn reset(&mut self) {
        self.last_seq = None;
    }

    /// Applies a batch of notifications.
    ///
    /// Notifications are applied in `seq` order. One whose `seq` is not above
    /// the last applied one is skipped, except `seq == 1`, which always
    /// applies and restarts the sequence. A jump of more than one is a gap:
    /// it is logged, flagged in the report when `resync_on_gap` is set, and
    /// the notification is still applied.
    ///
    /// Each notification is fully normalized before the store is touched.
    ///
    /// # Errors
    ///
    /// Returns an error if a payload fails normalization. Notifications
    /// before it stay applied; it and the rest of the batch are not.
    pub fn process(
        &mut self,
        store: &mut MailStore,
        mut batch: Vec<SoapNotify>,
        tags: &TagDirectory,
    ) -> Result<SyncReport> {
        batch.sort_by_key(|n| n.seq);
        let mut report = SyncReport::default();

        for notify in &batch {
            let seq = notify.seq;
            if seq == SESSION_START_SEQ {
                if self.last_seq.is_some() {
                    info!(last = ?self.last_seq, "session restarted, sequence reset");
                }
            } else if let Some(last) = self.last_seq {
                if seq <= last {
                    warn!(seq, last, "skipping stale notification");
                    report.skipped.push(seq);
                    continue;
                }
                if seq > last + 1 {
                    warn!(seq, last, missed = seq - last - 1, "notification sequence gap");
                    report.resync_required |= self.config.resync_on_gap;
                }
            }

            let changes = self.normalize(notify, store, tags).inspect_err(|e| {
                error!(seq, error = %e, "notification failed normalization");
            })?;
            Self::apply(store, changes);
            self.last_seq = Some(seq);
            report.applied.push(seq);
        }

        info!(
            applied = report.applied.len(),
            skipped = report.skipped.len(),
            resync_required = report.resync_required,
            "notification batch processed"
        );
        Ok(report)
    }

    fn normalize(
        &self,
        notify: &SoapNotify,
        store: &MailStore,
        tags: &TagDirectory,
    ) -> Result<Changes> {
        let mut changes = Changes {
            deleted: notify.deleted.clone(),
            ..Changes::default()
        };

        if let Some(created) = &notify.created {
            let root_id = store.folders.root_id();
            let mut known = BTreeMap::new();
            for f in created.folder.iter().flat_map(|f| f.flatten()) {
                let lookup = ChainedFolders {
                    created: &known,
                    held: &store.folders.folders,
                };
                let folder = normalize_folder(f, &lookup, root_id);
                known.insert(folder.id.clone(), folder);
            }
            changes.created_folders = known.into_values().collect();

            changes.created_conversations = created
                .c
                .iter()
                .map(|c| normalize_conversation(ConversationSource::with_messages(c, &created.m), tags))
                .collect::<Result<_>>()?;
            changes.created_messages = created
                .m
                .iter()
                .map(|m| normalize_mail_message(m, false, tags, &self.config))
                .collect::<Result<_>>()?;
        }

        if let Some(modified) = &notify.modified {
            changes.modified_folders = modified.folder.iter().map(normalize_folder_patch).collect();
            changes.modified_conversations = modified
                .c
                .iter()
                .map(|c| normalize_conversation_patch(ConversationSource::new(c), tags))
                .collect::<Result<_>>()?;
            changes.modified_messages = modified
                .m
                .iter()
                .map(|m| normalize_message_patch(m, tags, &self.config))
                .collect::<Result<_>>()?;
        }

        Ok(changes)
    }

    fn apply(store: &mut MailStore, changes: Changes) {
        debug!(
            folders = changes.created_folders.len() + changes.modified_folders.len(),
            created_conversations = changes.created_conversations.len(),
            created_messages = changes.created_messages.len(),
            modified_conversations = changes.modified_conversations.len(),
            modified_messages = changes.modified_messages.len(),
            deleted = changes.deleted.len(),
            "applying notification"
        );

        store.folders.handle_created(changes.created_folders);
        store.folders.handle_modified(&changes.modified_folders);

        store
            .conversations
            .handle_created_conversations(&changes.created_conversations);
        store
            .searches
            .handle_created_conversations(&changes.created_conversations);

        store.conversations.handle_created_messages(&changes.created_messages);
        store.searches.handle_created_messages(&changes.created_messages);
        store.messages.handle_created(changes.created_messages);

        store
            .conversations
            .handle_modified_conversations(&changes.modified_conversations);
        store
            .searches
            .handle_modified_conversations(&changes.modified_conversations);

        store.messages.handle_modified(&changes.modified_messages);
        store.conversations.handle_modified_messages(&changes.modified_messages);
        store.searches.handle_modified_messages(&changes.modified_messages);

        if !changes.deleted.is_empty() {
            store.folders.handle_deleted(&changes.deleted);
            store.conversations.handle_deleted(&changes.deleted);
            store.messages.handle_deleted(&changes.deleted);
            store.searches.handle_deleted(&changes.deleted);
        }
    }
}
