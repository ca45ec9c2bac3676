//! Named binary message channels.
//!
//! This is the carrier the dispatch layer sits on. It moves opaque byte
//! messages between a sender and whatever handler is bound to a channel name,
//! and routes exactly one reply back:
//! - [`BinaryMessenger`] is the contract any carrier implements
//! - [`BinaryReply`] is the one-shot reply handle a handler receives
//! - [`LocalMessenger`] is an in-process loopback carrier

pub mod error;
pub mod local;
pub mod messenger;
pub mod name;

pub use error::{ChannelError, Result};
pub use local::LocalMessenger;
pub use messenger::{BinaryMessenger, BinaryReply, MessageHandler, ReplyCallback};
pub use name::{channel_name, DEFAULT_NAMESPACE};
