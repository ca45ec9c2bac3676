//! Request/reply dispatch over named binary channels.
//!
//! A call carries its arguments as one encoded list and gets back one
//! encoded envelope: `[result]` on success or `[code, message, details]` on
//! failure. Handler failures of every kind, including undecodable arguments,
//! travel back as error envelopes; nothing is raised across the channel.
//!
//! - [`Dispatcher`] binds sync and async handlers to channels
//! - [`Caller`] issues typed calls and checks envelopes before casting

pub mod args;
pub mod caller;
pub mod config;
pub mod dispatcher;
pub mod envelope;
pub mod error;

pub use args::FromArgs;
pub use caller::Caller;
pub use config::DispatchConfig;
pub use dispatcher::{Completion, Dispatcher, SharedCompletion};
pub use envelope::{Envelope, ErrorEnvelope, DECODE_ERROR_CODE, ENCODE_ERROR_CODE};
pub use error::{CallError, HandlerError, Result};
