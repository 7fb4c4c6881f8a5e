//! Conversation map shared by the conversations and searches slices.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use super::ItemOp;
use crate::model::{ConvMessage, Conversation, ConversationPatch, IncompleteMessage, MessagePatch};

/// Conversations keyed by id, with the merge rules that keep their embedded
/// message stubs consistent with the flat message map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ConversationIndex {
    map: BTreeMap<String, Conversation>,
}

impl ConversationIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a conversation.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Conversation> {
        self.map.get(id)
    }

    /// Returns true if the conversation is present.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.map.contains_key(id)
    }

    /// Number of conversations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns true if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterates in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Conversation> {
        self.map.values()
    }

    /// Inserts or replaces a conversation.
    pub fn upsert(&mut self, conversation: Conversation) {
        self.map.insert(conversation.id.clone(), conversation);
    }

    /// Merges a patch into an existing conversation. Returns false if the
    /// conversation is not held here.
    pub fn merge_patch(&mut self, patch: &ConversationPatch) -> bool {
        match self.map.get_mut(&patch.id) {
            Some(conversation) => {
                conversation.apply(patch);
                true
            }
            None => false,
        }
    }

    /// Replaces the whole content.
    pub fn replace_all(&mut self, conversations: impl IntoIterator<Item = Conversation>) {
        self.map.clear();
        self.extend(conversations);
    }

    /// Inserts or replaces several conversations.
    pub fn extend(&mut self, conversations: impl IntoIterator<Item = Conversation>) {
        for conversation in conversations {
            self.upsert(conversation);
        }
    }

    /// Folds newly created messages into the conversations they belong to.
    ///
    /// A message is only folded into a conversation already held here, and
    /// only if no stub with its id exists. Its stub is prepended (newest first)
    /// and its fragment becomes the conversation's fragment. Returns the
    /// number of stubs added.
    pub fn add_messages(&mut self, messages: &[IncompleteMessage]) -> usize {
        let mut added = 0;
        for message in messages {
            let Some(conversation) = message
                .conversation
                .as_deref()
                .and_then(|cid| self.map.get_mut(cid))
            else {
                continue;
            };
            if conversation.contains_message(&message.id) {
                continue;
            }
            let stub = ConvMessage::new(message.id.clone(), message.parent.clone(), message.date);
            conversation.update_messages(|stubs| stubs.insert(0, stub));
            if let Some(fragment) = &message.fragment {
                conversation.fragment = Some(fragment.clone());
            }
            added += 1;
        }
        added
    }

    /// Rewrites the folder of every stub matching a patch that carries one,
    /// across all conversations. Returns the number of stubs changed.
    pub fn update_message_parents(&mut self, patches: &[MessagePatch]) -> usize {
        let moves: BTreeMap<&str, &str> = patches
            .iter()
            .filter_map(|p| p.parent.as_deref().map(|parent| (p.id.as_str(), parent)))
            .collect();
        if moves.is_empty() {
            return 0;
        }

        let mut changed = 0;
        for conversation in self.map.values_mut() {
            if !conversation.messages().iter().any(|m| moves.contains_key(m.id.as_str())) {
                continue;
            }
            conversation.update_messages(|stubs| {
                for stub in stubs.iter_mut() {
                    if let Some(parent) = moves.get(stub.id.as_str()) {
                        stub.parent = Some((*parent).to_string());
                        changed += 1;
                    }
                }
            });
        }
        changed
    }

    /// Removes message stubs from every conversation. Returns the number of
    /// stubs removed.
    pub fn remove_messages(&mut self, ids: &[String]) -> usize {
        let ids: HashSet<&str> = ids.iter().map(String::as_str).collect();
        let mut removed = 0;
        for conversation in self.map.values_mut() {
            if !conversation.messages().iter().any(|m| ids.contains(m.id.as_str())) {
                continue;
            }
            removed += conversation.update_messages(|stubs| {
                let before = stubs.len();
                stubs.retain(|m| !ids.contains(m.id.as_str()));
                before - stubs.len()
            });
        }
        removed
    }

    /// Removes conversations by id. Returns the number removed.
    pub fn remove(&mut self, ids: &[String]) -> usize {
        ids.iter().filter(|id| self.map.remove(id.as_str()).is_some()).count()
    }

    /// Keeps only the conversations matching a predicate.
    pub fn retain(&mut self, mut keep: impl FnMut(&Conversation) -> bool) {
        self.map.retain(|_, c| keep(c));
    }

    /// Applies a bulk item operation to the listed conversations.
    pub fn apply_op(&mut self, ids: &[String], op: &ItemOp) {
        if matches!(op, ItemOp::Delete) {
            self.remove(ids);
            return;
        }
        for id in ids {
            let Some(conversation) = self.map.get_mut(id) else {
                continue;
            };
            match op {
                ItemOp::Read => {
                    conversation.read = true;
                    conversation.unread_msg_count = 0;
                }
                ItemOp::Unread => conversation.read = false,
                ItemOp::Flag => conversation.flagged = true,
                ItemOp::Unflag => conversation.flagged = false,
                ItemOp::Move { .. } | ItemOp::Trash => {
                    let to = op.destination().map(String::from);
                    conversation.update_messages(|stubs| {
                        for stub in stubs.iter_mut() {
                            stub.parent.clone_from(&to);
                        }
                    });
                }
                ItemOp::Tag { id } => {
                    if !conversation.tags.contains(id) {
                        conversation.tags.push(id.clone());
                    }
                }
                ItemOp::Untag { id } => conversation.tags.retain(|t| t != id),
                ItemOp::Delete => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conversation(id: &str, stubs: &[(&str, &str)]) -> Conversation {
        Conversation::from_patch(ConversationPatch {
            messages: Some(
                stubs
                    .iter()
                    .map(|(m, f)| ConvMessage::new(*m, Some((*f).into()), None))
                    .collect(),
            ),
            ..ConversationPatch::new(id)
        })
    }

    fn message(id: &str, cid: &str, folder: &str, fragment: &str) -> IncompleteMessage {
        IncompleteMessage::from_patch(MessagePatch {
            conversation: Some(cid.into()),
            fragment: Some(fragment.into()),
            ..MessagePatch::new(id).with_parent(folder)
        })
    }

    fn stub_ids(index: &ConversationIndex, id: &str) -> Vec<String> {
        index
            .get(id)
            .map(|c| c.messages().iter().map(|m| m.id.clone()).collect())
            .unwrap_or_default()
    }

    fn index() -> ConversationIndex {
        let mut index = ConversationIndex::new();
        index.upsert(conversation("123", &[("987", "folder2"), ("986", "folder2")]));
        index.upsert(conversation("456", &[("111", "folder5")]));
        index
    }

    #[test]
    fn created_message_is_prepended_once() {
        let mut index = index();
        let new = message("988", "123", "folder7", "latest");
        assert_eq!(index.add_messages(&[new.clone()]), 1);
        assert_eq!(index.add_messages(&[new]), 0);

        assert_eq!(stub_ids(&index, "123"), ["988", "987", "986"]);
        let conv = index.get("123").cloned().unwrap_or_else(|| Conversation::new("x"));
        assert_eq!(conv.fragment.as_deref(), Some("latest"));
        assert_eq!(conv.parent(), Some("folder7"));
    }

    #[test]
    fn created_message_for_unknown_conversation_is_ignored() {
        let mut index = index();
        assert_eq!(index.add_messages(&[message("1", "999", "2", "x")]), 0);
        assert!(!index.contains("999"));
    }

    #[test]
    fn parent_update_touches_only_matching_stubs() {
        let mut index = index();
        let before_other = index.get("456").cloned();
        let changed =
            index.update_message_parents(&[MessagePatch::new("987").with_parent("folder3")]);
        assert_eq!(changed, 1);

        let conv = index.get("123").cloned().unwrap_or_else(|| Conversation::new("x"));
        assert_eq!(conv.messages()[0].parent.as_deref(), Some("folder3"));
        assert_eq!(conv.messages()[1].parent.as_deref(), Some("folder2"));
        assert_eq!(conv.parent(), Some("folder3"));
        assert_eq!(index.get("456").cloned(), before_other);
    }

    #[test]
    fn patches_without_parent_change_nothing() {
        let mut index = index();
        assert_eq!(index.update_message_parents(&[MessagePatch::new("987")]), 0);
    }

    #[test]
    fn removed_messages_leave_every_conversation() {
        let mut index = index();
        index.upsert(conversation("789", &[("987", "folder9")]));
        assert_eq!(index.remove_messages(&["987".to_string()]), 2);
        assert_eq!(stub_ids(&index, "123"), ["986"]);
        assert!(stub_ids(&index, "789").is_empty());
        assert_eq!(index.get("789").and_then(Conversation::parent), None);
    }

    #[test]
    fn remove_and_replace() {
        let mut index = index();
        assert_eq!(index.remove(&["123".to_string(), "nope".to_string()]), 1);
        assert_eq!(index.len(), 1);
        index.replace_all(vec![conversation("1", &[])]);
        assert!(index.contains("1"));
        assert!(!index.contains("456"));
    }

    #[test]
    fn bulk_ops() {
        let mut index = index();
        let ids = vec!["123".to_string()];
        index.apply_op(&ids, &ItemOp::Unread);
        index.apply_op(&ids, &ItemOp::Tag { id: "64".into() });
        index.apply_op(&ids, &ItemOp::Tag { id: "64".into() });
        index.apply_op(&ids, &ItemOp::Trash);

        let conv = index.get("123").cloned().unwrap_or_else(|| Conversation::new("x"));
        assert!(!conv.read);
        assert_eq!(conv.tags, ["64"]);
        assert_eq!(conv.parent(), Some("3"));

        index.apply_op(&ids, &ItemOp::Delete);
        assert!(!index.contains("123"));
    }
}
