//! Typed MIME part tree.
//!
//! A part is either a leaf carrying (optional) content or a multipart
//! container with children. Containers are never attachments and never carry
//! content, which the type makes impossible to get wrong.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::content_type::ContentType;

/// Content disposition of a leaf part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Disposition {
    /// Displayed within the body.
    Inline,
    /// Offered as a separate download.
    Attachment,
}

impl Disposition {
    /// Parses a wire disposition. Unknown values are treated as absent.
    #[must_use]
    pub fn parse(s: Option<&str>) -> Option<Self> {
        match s.map(str::trim) {
            Some(d) if d.eq_ignore_ascii_case("inline") => Some(Self::Inline),
            Some(d) if d.eq_ignore_ascii_case("attachment") => Some(Self::Attachment),
            _ => None,
        }
    }

    /// Returns the wire form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inline => "inline",
            Self::Attachment => "attachment",
        }
    }
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Leaf part payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct LeafPart {
    /// Attachment filename.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub filename: Option<String>,
    /// Inline content, when the server included it.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub content: Option<String>,
    /// Content id (`cid:` reference target).
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub ci: Option<String>,
    /// Content disposition.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub disposition: Option<Disposition>,
    /// Whether the server marked this part as the message body.
    #[cfg_attr(feature = "serde", serde(default))]
    pub is_body: bool,
}

impl LeafPart {
    /// Returns the content id without surrounding angle brackets.
    #[must_use]
    pub fn content_id(&self) -> Option<&str> {
        self.ci
            .as_deref()
            .map(|ci| ci.trim().trim_start_matches('<').trim_end_matches('>'))
            .filter(|ci| !ci.is_empty())
    }
}

/// Node kind of a part.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "camelCase"))]
pub enum PartNode {
    /// A part with content.
    Leaf(LeafPart),
    /// A multipart container.
    Container {
        /// Child parts.
        children: Vec<MailMessagePart>,
    },
}

/// A node of a message's MIME tree.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct MailMessagePart {
    /// Part path (e.g. `"2.1"`).
    pub name: String,
    /// Raw content type.
    pub content_type: String,
    /// Size in bytes.
    pub size: u64,
    /// Leaf or container.
    pub node: PartNode,
}

impl MailMessagePart {
    /// Creates a leaf part.
    #[must_use]
    pub fn leaf(name: impl Into<String>, content_type: impl Into<String>, leaf: LeafPart) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            size: 0,
            node: PartNode::Leaf(leaf),
        }
    }

    /// Creates a container part.
    #[must_use]
    pub fn container(
        name: impl Into<String>,
        content_type: impl Into<String>,
        children: Vec<Self>,
    ) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            size: 0,
            node: PartNode::Container { children },
        }
    }

    /// Sets the size.
    #[must_use]
    pub const fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    /// Returns the parsed content type.
    #[must_use]
    pub fn mime(&self) -> ContentType {
        ContentType::parse_lenient(&self.content_type)
    }

    /// Returns the leaf payload, if this is a leaf.
    #[must_use]
    pub const fn as_leaf(&self) -> Option<&LeafPart> {
        match &self.node {
            PartNode::Leaf(leaf) => Some(leaf),
            PartNode::Container { .. } => None,
        }
    }

    /// Returns the children of a container (empty for leaves).
    #[must_use]
    pub fn children(&self) -> &[Self] {
        match &self.node {
            PartNode::Leaf(_) => &[],
            PartNode::Container { children } => children,
        }
    }

    /// Returns true if this part is a multipart container.
    #[must_use]
    pub const fn is_container(&self) -> bool {
        matches!(self.node, PartNode::Container { .. })
    }

    /// Returns every node of the subtree, depth-first, parents first.
    #[must_use]
    pub fn walk(&self) -> Vec<&Self> {
        let mut out = vec![self];
        for child in self.children() {
            out.extend(child.walk());
        }
        out
    }

    /// Returns every leaf of the subtree, depth-first.
    #[must_use]
    pub fn leaves(&self) -> Vec<&Self> {
        self.walk().into_iter().filter(|p| !p.is_container()).collect()
    }
}
