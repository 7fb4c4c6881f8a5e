//! # mailstate-core
//!
//! Client-side state for a SOAP mail server.
//!
//! This crate provides:
//! - Normalized entities (conversations, messages, folders, participants, tags)
//! - Normalizers from wire objects to entities
//! - Store slices with their reducers (folders, conversations, messages, searches)
//! - The notification sync dispatcher

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod config;
mod error;
pub mod model;
pub mod normalize;
pub mod store;
pub mod sync;

pub use config::SyncConfig;
pub use error::{Error, Result};
pub use model::{
    ConvMessage, Conversation, ConversationPatch, Folder, FolderPatch, IncompleteMessage,
    MailMessage, MessageFlags, MessagePatch, Participant, Tag, TagDirectory,
};
pub use normalize::{
    ConversationSource, normalize_conversation, normalize_mail_message, normalize_participants,
};
pub use store::{Lifecycle, MailStore, SearchPage, SliceStatus};
pub use sync::{SyncDispatcher, SyncReport};
