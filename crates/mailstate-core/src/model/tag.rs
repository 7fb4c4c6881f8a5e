//! Tags and the tag directory.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A user tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Tag id.
    pub id: String,
    /// Tag name.
    pub name: String,
    /// Color index.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<u8>,
}

/// Read-only lookup of tags by id and name.
///
/// Owned by the caller and passed into normalization explicitly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Tag>", into = "Vec<Tag>")]
pub struct TagDirectory {
    tags: Vec<Tag>,
    by_name: HashMap<String, usize>,
}

impl TagDirectory {
    /// Builds a directory from a tag list. Later duplicates of a name win.
    #[must_use]
    pub fn new(tags: Vec<Tag>) -> Self {
        let by_name = tags
            .iter()
            .enumerate()
            .map(|(i, tag)| (tag.name.clone(), i))
            .collect();
        Self { tags, by_name }
    }

    /// Resolves a tag name to its id.
    #[must_use]
    pub fn id_for_name(&self, name: &str) -> Option<&str> {
        self.by_name
            .get(name)
            .map(|&i| self.tags[i].id.as_str())
    }

    /// Looks up a tag by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Tag> {
        self.tags.iter().find(|tag| tag.id == id)
    }

    /// Number of tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Returns true if the directory is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Iterates over the tags in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Tag> {
        self.tags.iter()
    }
}

impl From<Vec<Tag>> for TagDirectory {
    fn from(tags: Vec<Tag>) -> Self {
        Self::new(tags)
    }
}

impl From<TagDirectory> for Vec<Tag> {
    fn from(directory: TagDirectory) -> Self {
        directory.tags
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn lookups() {
        let dir: TagDirectory =
            serde_json::from_str(r#"[{"id":"64","name":"work","color":3},{"id":"65","name":"home"}]"#)
                .unwrap();
        assert_eq!(dir.len(), 2);
        assert_eq!(dir.id_for_name("home"), Some("65"));
        assert_eq!(dir.id_for_name("missing"), None);
        assert_eq!(dir.get("64").unwrap().color, Some(3));
    }
}
