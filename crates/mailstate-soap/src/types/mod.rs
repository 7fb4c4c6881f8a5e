//! Wire-format types.
//!
//! These types mirror the JSON objects exchanged with the mail server's SOAP
//! API. They carry no client-side semantics beyond decoding.

mod flags;
mod item;
mod lenient;
mod participant;

pub use flags::{Flag, Flags};
pub use item::{
    SoapConvMessage, SoapConversation, SoapFolder, SoapMessage, SoapMessagePart,
    SoapSearchResponse,
};
pub use lenient::option_number;
pub use participant::{ParticipantRole, SoapParticipant};
