//! Attachment extraction from a part tree.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::content_type::ContentType;
use crate::part::{Disposition, LeafPart, MailMessagePart, PartNode};

/// Content id the server assigns to the synthesized text body.
const TEXT_BODY_CID: &str = "text-body";

/// An attachment descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Attachment {
    /// Part path, used to download the attachment.
    pub name: String,
    /// Content type.
    pub content_type: String,
    /// Size in bytes.
    pub size: u64,
    /// Filename, possibly synthesized.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub filename: Option<String>,
    /// Content id, for inline parts referenced from HTML.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub ci: Option<String>,
    /// Resolved disposition.
    pub disposition: Disposition,
}

/// Flattens a part tree into its attachments.
///
/// Containers are walked but never listed. Body text, alternative body
/// representations, Apple resource forks, digests, bare calendar parts and
/// PKCS7 signatures are excluded.
#[must_use]
pub fn get_attachments_from_parts(parts: &[MailMessagePart]) -> Vec<Attachment> {
    let mut out = Vec::new();
    for part in parts {
        collect(part, None, &mut out);
    }
    out
}

fn collect(part: &MailMessagePart, parent: Option<&ContentType>, out: &mut Vec<Attachment>) {
    let mime = part.mime();
    match &part.node {
        PartNode::Container { children } => {
            for child in children {
                collect(child, Some(&mime), out);
            }
        }
        PartNode::Leaf(leaf) => {
            if let Some(attachment) = classify(part, leaf, &mime, parent) {
                out.push(attachment);
            }
        }
    }
}

fn is_excluded_type(mime: &ContentType) -> bool {
    mime.is_pkcs7_signature()
        || mime.is("multipart", "appledouble")
        || mime.is("application", "applefile")
        || mime.is("multipart", "digest")
}

fn is_body_content(leaf: &LeafPart, mime: &ContentType, parent: Option<&ContentType>) -> bool {
    if !mime.is_body_text() {
        return false;
    }
    let explicit_attachment = leaf.disposition == Some(Disposition::Attachment);
    leaf.is_body
        || (leaf.content.is_some() && !explicit_attachment)
        || (parent.is_some_and(|p| p.is("multipart", "alternative")) && !explicit_attachment)
}

fn classify(
    part: &MailMessagePart,
    leaf: &LeafPart,
    mime: &ContentType,
    parent: Option<&ContentType>,
) -> Option<Attachment> {
    if is_excluded_type(mime) || is_body_content(leaf, mime, parent) {
        return None;
    }
    if leaf.content_id() == Some(TEXT_BODY_CID) {
        return None;
    }
    if mime.is_calendar() && leaf.filename.is_none() {
        return None;
    }

    let in_related = parent.is_some_and(|p| p.is("multipart", "related"));
    let disposition = match (leaf.disposition, leaf.content_id()) {
        (Some(Disposition::Inline), Some(_)) => Disposition::Inline,
        (Some(Disposition::Attachment), Some(_)) if in_related => Disposition::Inline,
        _ => Disposition::Attachment,
    };

    let filename = leaf.filename.clone().or_else(|| {
        if mime.is_message_rfc822() {
            Some(format!("unknown-{}.eml", part.name))
        } else if mime.is_html() {
            Some(format!("unknown-{}.html", part.name))
        } else {
            None
        }
    });

    Some(Attachment {
        name: part.name.clone(),
        content_type: mime.essence(),
        size: part.size,
        filename,
        ci: leaf.ci.clone(),
        disposition,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn leaf(name: &str, ct: &str, leaf: LeafPart) -> MailMessagePart {
        MailMessagePart::leaf(name, ct, leaf)
    }

    fn file(name: &str) -> LeafPart {
        LeafPart {
            filename: Some(name.into()),
            disposition: Some(Disposition::Attachment),
            ..LeafPart::default()
        }
    }

    fn names(attachments: &[Attachment]) -> Vec<&str> {
        attachments.iter().map(|a| a.name.as_str()).collect()
    }

    #[test]
    fn plain_attachment_is_listed() {
        let parts = vec![MailMessagePart::container(
            "TEXT",
            "multipart/mixed",
            vec![
                leaf(
                    "1",
                    "text/plain",
                    LeafPart {
                        is_body: true,
                        content: Some("hello".into()),
                        ..LeafPart::default()
                    },
                ),
                leaf("2", "application/pdf", file("report.pdf")).with_size(2048),
            ],
        )];
        let attachments = get_attachments_from_parts(&parts);
        assert_eq!(names(&attachments), ["2"]);
        assert_eq!(attachments[0].filename.as_deref(), Some("report.pdf"));
        assert_eq!(attachments[0].size, 2048);
        assert_eq!(attachments[0].disposition, Disposition::Attachment);
    }

    #[test]
    fn containers_are_never_attachments() {
        let parts = vec![MailMessagePart::container(
            "TEXT",
            "multipart/mixed",
            vec![MailMessagePart::container("1", "multipart/alternative", vec![])],
        )];
        assert!(get_attachments_from_parts(&parts).is_empty());
    }

    #[test]
    fn alternative_text_is_not_attachment() {
        let parts = vec![MailMessagePart::container(
            "TEXT",
            "multipart/alternative",
            vec![
                leaf("1", "text/plain", LeafPart::default()),
                leaf(
                    "2",
                    "text/html",
                    LeafPart {
                        is_body: true,
                        ..LeafPart::default()
                    },
                ),
            ],
        )];
        assert!(get_attachments_from_parts(&parts).is_empty());
    }

    #[test]
    fn apple_and_digest_parts_are_excluded() {
        let parts = vec![MailMessagePart::container(
            "TEXT",
            "multipart/mixed",
            vec![
                MailMessagePart::container(
                    "2",
                    "multipart/appledouble",
                    vec![
                        leaf("2.1", "application/applefile", file("._doc")),
                        leaf("2.2", "application/msword", file("doc.doc")),
                    ],
                ),
                leaf("3", "multipart/digest", LeafPart::default()),
            ],
        )];
        assert_eq!(names(&get_attachments_from_parts(&parts)), ["2.2"]);
    }

    #[test]
    fn text_body_cid_is_excluded() {
        let parts = vec![leaf(
            "2",
            "image/png",
            LeafPart {
                ci: Some("<text-body>".into()),
                disposition: Some(Disposition::Inline),
                ..LeafPart::default()
            },
        )];
        assert!(get_attachments_from_parts(&parts).is_empty());
    }

    #[test]
    fn calendar_without_filename_is_excluded() {
        let parts = vec![
            leaf("2", "text/calendar", LeafPart::default()),
            leaf("3", "text/calendar", file("invite.ics")),
        ];
        assert_eq!(names(&get_attachments_from_parts(&parts)), ["3"]);
    }

    #[test]
    fn inline_with_cid_stays_inline() {
        let parts = vec![leaf(
            "2",
            "image/png",
            LeafPart {
                ci: Some("<img1>".into()),
                disposition: Some(Disposition::Inline),
                ..LeafPart::default()
            },
        )];
        let attachments = get_attachments_from_parts(&parts);
        assert_eq!(attachments[0].disposition, Disposition::Inline);
    }

    #[test]
    fn related_attachment_with_cid_becomes_inline() {
        let parts = vec![MailMessagePart::container(
            "TEXT",
            "multipart/related",
            vec![leaf(
                "2",
                "image/png",
                LeafPart {
                    ci: Some("<img1>".into()),
                    ..file("logo.png")
                },
            )],
        )];
        let attachments = get_attachments_from_parts(&parts);
        assert_eq!(attachments[0].disposition, Disposition::Inline);
    }

    #[test]
    fn mixed_attachment_with_cid_stays_attachment() {
        let parts = vec![MailMessagePart::container(
            "TEXT",
            "multipart/mixed",
            vec![leaf(
                "2",
                "image/png",
                LeafPart {
                    ci: Some("<img1>".into()),
                    ..file("logo.png")
                },
            )],
        )];
        let attachments = get_attachments_from_parts(&parts);
        assert_eq!(attachments[0].disposition, Disposition::Attachment);
    }

    #[test]
    fn inline_without_cid_defaults_to_attachment() {
        let parts = vec![leaf(
            "2",
            "image/jpeg",
            LeafPart {
                disposition: Some(Disposition::Inline),
                ..LeafPart::default()
            },
        )];
        let attachments = get_attachments_from_parts(&parts);
        assert_eq!(attachments[0].disposition, Disposition::Attachment);
    }

    #[test]
    fn unnamed_message_and_html_get_placeholder_names() {
        let parts = vec![
            leaf("2", "message/rfc822", LeafPart::default()),
            leaf(
                "3",
                "text/html",
                LeafPart {
                    disposition: Some(Disposition::Attachment),
                    ..LeafPart::default()
                },
            ),
        ];
        let attachments = get_attachments_from_parts(&parts);
        assert_eq!(attachments[0].filename.as_deref(), Some("unknown-2.eml"));
        assert_eq!(attachments[1].filename.as_deref(), Some("unknown-3.html"));
    }

    #[test]
    fn pkcs7_signature_is_excluded() {
        let parts = vec![MailMessagePart::container(
            "TEXT",
            "multipart/signed",
            vec![
                leaf("1", "text/plain", LeafPart::default()),
                leaf("2", "application/pkcs7-signature", file("smime.p7s")),
            ],
        )];
        let attachments = get_attachments_from_parts(&parts);
        assert!(attachments.iter().all(|a| a.name != "2"));
    }

    fn arb_leaf() -> impl Strategy<Value = MailMessagePart> {
        let cts = prop::sample::select(vec![
            "text/plain",
            "text/html",
            "image/png",
            "application/pdf",
            "application/pkcs7-signature",
            "application/x-pkcs7-signature",
            "message/rfc822",
            "text/calendar",
        ]);
        (
            cts,
            prop::option::of("[a-z]{1,6}"),
            prop::option::of("[a-z]{1,6}"),
            prop::option::of(prop::sample::select(vec![
                Disposition::Inline,
                Disposition::Attachment,
            ])),
            any::<bool>(),
        )
            .prop_map(|(ct, filename, ci, disposition, is_body)| {
                MailMessagePart::leaf(
                    "1",
                    ct,
                    LeafPart {
                        filename,
                        content: None,
                        ci,
                        disposition,
                        is_body,
                    },
                )
            })
    }

    fn arb_tree() -> impl Strategy<Value = MailMessagePart> {
        arb_leaf().prop_recursive(3, 24, 4, |inner| {
            (
                prop::sample::select(vec![
                    "multipart/mixed",
                    "multipart/related",
                    "multipart/alternative",
                    "multipart/signed",
                ]),
                prop::collection::vec(inner, 0..4),
            )
                .prop_map(|(ct, children)| MailMessagePart::container("1", ct, children))
        })
    }

    proptest! {
        #[test]
        fn never_returns_pkcs7_signatures(tree in arb_tree()) {
            let attachments = get_attachments_from_parts(std::slice::from_ref(&tree));
            for attachment in attachments {
                prop_assert!(!attachment.content_type.contains("pkcs7-signature"));
            }
        }
    }
}
