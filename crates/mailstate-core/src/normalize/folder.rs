//! Folder normalization.

use std::collections::BTreeMap;

use mailstate_soap::SoapFolder;

use crate::model::{Folder, FolderId, FolderPatch, join_path};

/// Read access to already-known folders, used to derive paths and ancestors.
pub trait FolderLookup {
    /// Returns the folder with this id.
    fn folder(&self, id: &str) -> Option<&Folder>;
}

impl FolderLookup for BTreeMap<FolderId, Folder> {
    fn folder(&self, id: &str) -> Option<&Folder> {
        self.get(id)
    }
}

/// Normalizes a wire folder.
///
/// `path` comes from `absFolderPath` or is joined from the parent's path.
/// `abs_parent` is the top-level ancestor directly under `root_id`; for a
/// top-level folder it is `root_id` itself, and the root has none.
#[must_use]
pub fn normalize_folder(f: &SoapFolder, folders: &impl FolderLookup, root_id: &str) -> Folder {
    let name = f.name.clone().unwrap_or_default();
    let parent = f.l.as_deref().and_then(|id| folders.folder(id));

    let path = f.abs_folder_path.clone().unwrap_or_else(|| {
        if f.id == root_id {
            "/".to_string()
        } else {
            join_path(parent.map_or("", |p| p.path.as_str()), &name)
        }
    });

    let abs_parent = match f.l.as_deref() {
        _ if f.id == root_id => None,
        None => Some(root_id.to_string()),
        Some(l) if l == root_id => Some(root_id.to_string()),
        Some(l) => Some(parent.map_or_else(|| l.to_string(), |p| p.child_abs_parent(root_id))),
    };

    Folder {
        id: f.id.clone(),
        name,
        path,
        parent: f.l.clone(),
        abs_parent,
        unread_count: f.u.unwrap_or(0),
        items_count: f.n.unwrap_or(0),
        size: f.s.unwrap_or(0),
        view: f.view.clone(),
        color: f.color,
        synced: true,
    }
}

/// Normalizes a wire folder tree, parents before children.
#[must_use]
pub fn normalize_folder_tree(root: &SoapFolder, root_id: &str) -> Vec<Folder> {
    let mut known: BTreeMap<FolderId, Folder> = BTreeMap::new();
    let mut out = Vec::new();
    for f in root.flatten() {
        let folder = normalize_folder(f, &known, root_id);
        known.insert(folder.id.clone(), folder.clone());
        out.push(folder);
    }
    out
}

/// Normalizes a partial wire folder from a `modified` notification.
#[must_use]
pub fn normalize_folder_patch(f: &SoapFolder) -> FolderPatch {
    FolderPatch {
        id: f.id.clone(),
        name: f.name.clone(),
        path: f.abs_folder_path.clone(),
        parent: f.l.clone(),
        unread_count: f.u,
        items_count: f.n,
        size: f.s,
        view: f.view.clone(),
        color: f.color,
    }
}
