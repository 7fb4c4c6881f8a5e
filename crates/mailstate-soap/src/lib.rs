//! # mailstate-soap
//!
//! Wire-format types for a SOAP-based mail server's JSON API.
//!
//! ## Features
//!
//! - **Item types**: conversations, messages, MIME parts, participants and
//!   folders, decoded leniently (absent fields stay absent, numbers may arrive
//!   as strings)
//! - **Flag decoding**: the packed flag string (`"ua!"`) as a typed [`Flags`] set
//! - **Notifications**: sequence-numbered `created`/`modified`/`deleted`
//!   change sets pushed by the server
//!
//! ## Quick Start
//!
//! ```ignore
//! use mailstate_soap::{Flags, notify};
//!
//! let flags = Flags::parse("u f");
//! assert!(!flags.is_read());
//!
//! let batch = notify::parse_batch(r#"[{"seq":2,"deleted":"987"}]"#)?;
//! assert_eq!(batch[0].deleted, ["987"]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod error;
pub mod notify;
pub mod types;

pub use error::{Error, Result};
pub use notify::{SoapCreated, SoapModified, SoapNotify, parse_batch};
pub use types::{
    Flag, Flags, ParticipantRole, SoapConvMessage, SoapConversation, SoapFolder, SoapMessage,
    SoapMessagePart, SoapParticipant, SoapSearchResponse,
};
