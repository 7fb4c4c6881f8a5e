//! Folders slice.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, warn};

use super::{Fault, Lifecycle, SliceStatus, Snapshots};
use crate::Result;
use crate::model::{Folder, FolderId, FolderPatch, join_path};

const DEFAULT_ROOT_ID: &str = "1";

/// Argument of a folder creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateFolderArg {
    /// Parent folder.
    pub parent: FolderId,
    /// Name of the new folder.
    pub name: String,
    /// Color index.
    pub color: Option<u8>,
}

/// Folder operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FolderOp {
    /// Move under another folder. Children keep their own fields.
    Move {
        /// New parent.
        to: FolderId,
    },
    /// Delete the folder.
    Delete,
    /// Remove the folder's content and subfolders.
    Empty,
    /// Rename.
    Rename {
        /// New name.
        name: String,
    },
    /// Mark everything read.
    MarkRead,
    /// Change the color.
    Color {
        /// Color index.
        color: u8,
    },
}

/// Argument of a folder action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderActionArg {
    /// Target folder.
    pub id: FolderId,
    /// Operation.
    pub op: FolderOp,
}

/// Folder map with creation and action lifecycles.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FoldersSlice {
    /// Folders by id.
    pub folders: BTreeMap<FolderId, Folder>,
    /// Status of the last creation or action.
    pub status: SliceStatus,
    /// Fault of the last failed request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fault: Option<Fault>,
    #[serde(skip)]
    root_id: FolderId,
    #[serde(skip)]
    snapshots: Snapshots<BTreeMap<FolderId, Folder>>,
}

impl Default for FoldersSlice {
    fn default() -> Self {
        Self::new(DEFAULT_ROOT_ID)
    }
}

impl FoldersSlice {
    /// Creates an empty slice for a mailbox rooted at `root_id`.
    #[must_use]
    pub fn new(root_id: &str) -> Self {
        Self {
            folders: BTreeMap::new(),
            status: SliceStatus::Idle,
            fault: None,
            root_id: root_id.to_string(),
            snapshots: Snapshots::default(),
        }
    }

    /// Returns the mailbox root id.
    #[must_use]
    pub fn root_id(&self) -> &str {
        &self.root_id
    }

    /// Returns a folder.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Folder> {
        self.folders.get(id)
    }

    /// Replaces every folder, e.g. after loading the folder tree.
    pub fn load(&mut self, folders: impl IntoIterator<Item = Folder>) {
        self.folders = folders.into_iter().map(|f| (f.id.clone(), f)).collect();
    }

    /// Direct children of a folder, by name.
    #[must_use]
    pub fn children(&self, id: &str) -> Vec<&Folder> {
        let mut out: Vec<_> = self
            .folders
            .values()
            .filter(|f| f.parent.as_deref() == Some(id))
            .collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        out
    }

    /// Folders whose parent is not held here (normally just the root).
    #[must_use]
    pub fn tree_roots(&self) -> Vec<&Folder> {
        self.folders
            .values()
            .filter(|f| f.parent.as_deref().is_none_or(|p| !self.folders.contains_key(p)))
            .collect()
    }

    /// Inserts folders from a `created` notification.
    pub fn handle_created(&mut self, folders: Vec<Folder>) {
        for folder in folders {
            debug!(id = %folder.id, path = %folder.path, "folder created");
            self.folders.insert(folder.id.clone(), folder);
        }
    }

    /// Merges patches from a `modified` notification. Unknown ids are ignored.
    ///
    /// A new parent re-derives `abs_parent`, and `path` too unless the server
    /// sent one. A rename without a path rewrites the last path segment.
    pub fn handle_modified(&mut self, patches: &[FolderPatch]) {
        for patch in patches {
            let placement = patch.parent.as_deref().map(|to| self.placement(to));
            let Some(folder) = self.folders.get_mut(&patch.id) else {
                debug!(id = %patch.id, "modified folder not held");
                continue;
            };
            folder.apply(patch);
            if let Some((base, abs_parent)) = placement {
                folder.abs_parent = Some(abs_parent);
                if patch.path.is_none() {
                    folder.path = join_path(&base, &folder.name);
                }
                debug!(id = %folder.id, path = %folder.path, "folder moved");
            } else if patch.name.is_some() && patch.path.is_none() {
                folder.path = join_path(parent_path(&folder.path), &folder.name);
            }
        }
    }

    /// Path and `abs_parent` a folder gets when placed under `parent`.
    fn placement(&self, parent: &str) -> (String, FolderId) {
        self.folders.get(parent).map_or_else(
            || (String::new(), parent.to_string()),
            |p| (p.path.clone(), p.child_abs_parent(&self.root_id)),
        )
    }

    /// Removes folders from a `deleted` notification. Ids that are not
    /// folders are ignored.
    pub fn handle_deleted(&mut self, ids: &[String]) {
        for id in ids {
            if self.folders.remove(id).is_some() {
                debug!(%id, "folder deleted");
            }
        }
    }

    /// Reduces a folder creation.
    ///
    /// Pending inserts an unsynced placeholder keyed by the request id.
    /// Fulfilled swaps it for the server folder. Rejected rolls back.
    ///
    /// # Errors
    ///
    /// Returns an error if a rejection arrives for a request whose pending
    /// stage was never seen.
    pub fn create_folder(&mut self, event: Lifecycle<CreateFolderArg, Folder>) -> Result<()> {
        match event {
            Lifecycle::Pending { request_id, arg } => {
                self.snapshots.capture(&request_id, &self.folders);
                self.fault = None;
                let parent = self.folders.get(&arg.parent).cloned().unwrap_or_else(|| Folder {
                    id: arg.parent.clone(),
                    ..Folder::default()
                });
                let mut placeholder =
                    Folder::placeholder(request_id.clone(), arg.name, &parent, &self.root_id);
                placeholder.color = arg.color;
                self.folders.insert(request_id, placeholder);
                self.status = SliceStatus::Adding;
            }
            Lifecycle::Fulfilled {
                request_id,
                payload,
                ..
            } => {
                if !self.snapshots.release(&request_id) {
                    warn!(%request_id, "folder creation fulfilled without pending stage");
                }
                self.folders.remove(&request_id);
                let mut folder = payload;
                folder.synced = true;
                self.folders.insert(folder.id.clone(), folder);
                self.status = SliceStatus::Idle;
            }
            Lifecycle::Rejected {
                request_id, fault, ..
            } => {
                warn!(%request_id, code = %fault.code, "folder creation rejected");
                self.status = SliceStatus::Failed;
                self.fault = Some(fault);
                self.folders.remove(&request_id);
                self.folders = self.snapshots.restore(&request_id)?;
            }
        }
        Ok(())
    }

    /// Reduces a folder action, applied optimistically at the pending stage.
    ///
    /// # Errors
    ///
    /// Returns an error if a rejection arrives for a request whose pending
    /// stage was never seen.
    pub fn folder_action(&mut self, event: Lifecycle<FolderActionArg, ()>) -> Result<()> {
        match event {
            Lifecycle::Pending { request_id, arg } => {
                self.snapshots.capture(&request_id, &self.folders);
                self.fault = None;
                self.apply_op(&arg);
                self.status = SliceStatus::Updating;
            }
            Lifecycle::Fulfilled { request_id, .. } => {
                if !self.snapshots.release(&request_id) {
                    warn!(%request_id, "folder action fulfilled without pending stage");
                }
                self.status = SliceStatus::Idle;
            }
            Lifecycle::Rejected {
                request_id, fault, ..
            } => {
                warn!(%request_id, code = %fault.code, "folder action rejected");
                self.status = SliceStatus::Failed;
                self.fault = Some(fault);
                self.folders = self.snapshots.restore(&request_id)?;
            }
        }
        Ok(())
    }

    fn apply_op(&mut self, arg: &FolderActionArg) {
        let id = arg.id.as_str();
        match &arg.op {
            FolderOp::Delete => {
                self.folders.remove(id);
            }
            FolderOp::Empty => {
                self.folders
                    .retain(|_, f| f.abs_parent.as_deref() != Some(id) || f.id == id);
                if let Some(folder) = self.folders.get_mut(id) {
                    folder.unread_count = 0;
                    folder.items_count = 0;
                    folder.size = 0;
                }
            }
            FolderOp::Move { to } => {
                let (base, abs_parent) = self.placement(to);
                if let Some(folder) = self.folders.get_mut(id) {
                    folder.parent = Some(to.clone());
                    folder.path = join_path(&base, &folder.name);
                    folder.abs_parent = Some(abs_parent);
                }
            }
            FolderOp::Rename { name } => {
                if let Some(folder) = self.folders.get_mut(id) {
                    folder.path = join_path(parent_path(&folder.path), name);
                    folder.name.clone_from(name);
                }
            }
            FolderOp::MarkRead => {
                if let Some(folder) = self.folders.get_mut(id) {
                    folder.unread_count = 0;
                }
            }
            FolderOp::Color { color } => {
                if let Some(folder) = self.folders.get_mut(id) {
                    folder.color = Some(*color);
                }
            }
        }
    }
}

fn parent_path(path: &str) -> &str {
    path.rsplit_once('/').map_or("", |(head, _)| head)
}
