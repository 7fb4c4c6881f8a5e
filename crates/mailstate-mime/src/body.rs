//! Body composition from a part tree.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::part::{Disposition, MailMessagePart, PartNode};

/// Default base URL for part downloads.
pub const DEFAULT_DOWNLOAD_URL_BASE: &str = "/service/home/~/";

/// Composed message body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct MessageBody {
    /// Content type of the first textual body part.
    pub content_type: String,
    /// Concatenated content.
    pub content: String,
}

/// Builds the download URL of a message part.
#[must_use]
pub fn part_download_url(base: &str, message_id: &str, part: &str) -> String {
    format!("{base}?auth=co&id={message_id}&part={part}")
}

#[derive(Default)]
struct Accumulator {
    content_type: Option<String>,
    content: String,
    injected_images: bool,
}

/// Concatenates the body content of a part tree.
///
/// Every leaf marked as body contributes its content, depth-first. Top-level
/// inline parts without a content id (images pasted by clients that do not
/// reference them from HTML) are rendered as `<img>` tags pointing at the part
/// download URL.
#[must_use]
pub fn generate_body(parts: &[MailMessagePart], message_id: &str, base: &str) -> MessageBody {
    let mut acc = Accumulator::default();
    for part in parts {
        walk(part, message_id, base, &mut acc);
    }

    let content_type = acc.content_type.unwrap_or_else(|| {
        if acc.injected_images {
            "text/html".to_string()
        } else {
            "text/plain".to_string()
        }
    });

    MessageBody {
        content_type,
        content: acc.content,
    }
}

fn walk(part: &MailMessagePart, message_id: &str, base: &str, acc: &mut Accumulator) {
    let leaf = match &part.node {
        PartNode::Container { children } => {
            for child in children {
                walk(child, message_id, base, acc);
            }
            return;
        }
        PartNode::Leaf(leaf) => leaf,
    };

    let mime = part.mime();
    let standalone_inline = leaf.disposition == Some(Disposition::Inline)
        && leaf.content_id().is_none()
        && !mime.is_plain_text()
        && !part.name.contains('.');

    if standalone_inline && !leaf.is_body {
        let url = part_download_url(base, message_id, &part.name);
        acc.content.push_str(&format!("<img src=\"{url}\">"));
        acc.injected_images = true;
    } else if leaf.is_body {
        if acc.content_type.is_none() && mime.is_text() {
            acc.content_type = Some(mime.essence());
        }
        if let Some(content) = &leaf.content {
            acc.content.push_str(content);
        }
    }
}
