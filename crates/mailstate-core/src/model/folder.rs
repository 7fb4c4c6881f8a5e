//! Folder model.

use serde::{Deserialize, Serialize};

use super::FolderId;

/// A mailbox folder.
///
/// `synced` is false while the folder is a local placeholder awaiting server
/// confirmation (optimistic creation).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    /// Folder id.
    pub id: FolderId,
    /// Display name.
    pub name: String,
    /// Absolute path, `/`-separated.
    pub path: String,
    /// Parent folder id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<FolderId>,
    /// Top-level ancestor directly under the mailbox root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abs_parent: Option<FolderId>,
    /// Unread item count.
    pub unread_count: u32,
    /// Item count.
    pub items_count: u32,
    /// Size in bytes.
    pub size: u64,
    /// Default view.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
    /// Color index.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<u8>,
    /// Whether server-confirmed state has replaced the local placeholder.
    pub synced: bool,
}

impl Folder {
    /// Creates an unsynced placeholder under `parent`.
    #[must_use]
    pub fn placeholder(
        id: impl Into<FolderId>,
        name: impl Into<String>,
        parent: &Self,
        root_id: &str,
    ) -> Self {
        let name = name.into();
        Self {
            id: id.into(),
            path: join_path(&parent.path, &name),
            name,
            parent: Some(parent.id.clone()),
            abs_parent: Some(parent.child_abs_parent(root_id)),
            synced: false,
            ..Self::default()
        }
    }

    /// Returns the `abs_parent` a direct child of this folder gets.
    ///
    /// Children of the root and of top-level folders hang under this folder;
    /// deeper children inherit its top-level ancestor.
    #[must_use]
    pub fn child_abs_parent(&self, root_id: &str) -> FolderId {
        if self.id == root_id || self.parent.as_deref() == Some(root_id) {
            return self.id.clone();
        }
        self.abs_parent.clone().unwrap_or_else(|| self.id.clone())
    }

    /// Merges the present fields of a patch.
    pub fn apply(&mut self, patch: &FolderPatch) {
        if let Some(name) = &patch.name {
            self.name.clone_from(name);
        }
        if let Some(path) = &patch.path {
            self.path.clone_from(path);
        }
        if let Some(parent) = &patch.parent {
            self.parent = Some(parent.clone());
        }
        if let Some(u) = patch.unread_count {
            self.unread_count = u;
        }
        if let Some(n) = patch.items_count {
            self.items_count = n;
        }
        if let Some(s) = patch.size {
            self.size = s;
        }
        if let Some(view) = &patch.view {
            self.view = Some(view.clone());
        }
        if let Some(color) = patch.color {
            self.color = Some(color);
        }
    }
}

/// Joins a parent path and a child name.
#[must_use]
pub fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() || parent == "/" {
        format!("/{name}")
    } else {
        format!("{}/{name}", parent.trim_end_matches('/'))
    }
}

/// Partial folder from a `modified` notification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderPatch {
    /// Folder id.
    pub id: FolderId,
    /// Name.
    pub name: Option<String>,
    /// Absolute path.
    pub path: Option<String>,
    /// Parent folder.
    pub parent: Option<FolderId>,
    /// Unread count.
    pub unread_count: Option<u32>,
    /// Item count.
    pub items_count: Option<u32>,
    /// Size.
    pub size: Option<u64>,
    /// View.
    pub view: Option<String>,
    /// Color.
    pub color: Option<u8>,
}
