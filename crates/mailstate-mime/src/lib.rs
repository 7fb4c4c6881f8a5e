//! # mailstate-mime
//!
//! Typed MIME part trees for messages decoded from the mail server.
//!
//! ## Features
//!
//! - **Part tree**: [`MailMessagePart`] is either a leaf with content or a
//!   multipart container, so containers can never be mistaken for attachments
//! - **Content types**: parsing and classification of MIME content types
//! - **Attachments**: flattening a tree into attachment descriptors with
//!   disposition inference
//! - **Body composition**: concatenating body parts and injecting inline images
//!
//! ## Quick Start
//!
//! ```ignore
//! use mailstate_mime::{LeafPart, MailMessagePart, generate_body, get_attachments_from_parts};
//!
//! let parts = vec![MailMessagePart::leaf(
//!     "1",
//!     "text/plain",
//!     LeafPart { content: Some("Hello".into()), is_body: true, ..LeafPart::default() },
//! )];
//!
//! let body = generate_body(&parts, "42", mailstate_mime::DEFAULT_DOWNLOAD_URL_BASE);
//! assert_eq!(body.content, "Hello");
//! assert!(get_attachments_from_parts(&parts).is_empty());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod attachments;
mod body;
mod content_type;
mod error;
mod part;

pub use attachments::{Attachment, get_attachments_from_parts};
pub use body::{DEFAULT_DOWNLOAD_URL_BASE, MessageBody, generate_body, part_download_url};
pub use content_type::ContentType;
pub use error::{Error, Result};
pub use part::{Disposition, LeafPart, MailMessagePart, PartNode};
