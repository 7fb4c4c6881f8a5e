//! Tag id resolution.

use crate::model::TagDirectory;

/// Prefix for tag names the local directory cannot resolve.
pub const UNRESOLVED_TAG_PREFIX: &str = "nil:";

/// Resolves the tag ids of an item.
///
/// A non-empty id list `t` wins and is split on commas, dropping empty
/// segments. Otherwise each comma-separated name in `tn` maps to its id in the
/// directory, or to `nil:<name>` when the directory does not know it, so the
/// output has one entry per name segment.
#[must_use]
pub fn resolve_tag_ids(t: Option<&str>, tn: Option<&str>, directory: &TagDirectory) -> Vec<String> {
    match (t.filter(|t| !t.is_empty()), tn.filter(|tn| !tn.is_empty())) {
        (Some(ids), _) => ids
            .split(',')
            .filter(|id| !id.is_empty())
            .map(String::from)
            .collect(),
        (None, Some(names)) => names
            .split(',')
            .map(|name| {
                directory.id_for_name(name).map_or_else(
                    || format!("{UNRESOLVED_TAG_PREFIX}{name}"),
                    String::from,
                )
            })
            .collect(),
        (None, None) => Vec::new(),
    }
}

/// Like [`resolve_tag_ids`], but `None` when the payload carries neither field.
#[must_use]
pub fn resolve_tag_patch(
    t: Option<&str>,
    tn: Option<&str>,
    directory: &TagDirectory,
) -> Option<Vec<String>> {
    if t.is_none() && tn.is_none() {
        return None;
    }
    Some(resolve_tag_ids(t, tn, directory))
}
