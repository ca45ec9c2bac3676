use std::sync::Arc;

use bytes::Bytes;
use tracing::debug;

/// Continuation invoked once with the reply bytes, or `None` when nothing
/// answered.
pub type ReplyCallback = Box<dyn FnOnce(Option<Bytes>) + Send>;

/// Receiver bound to a channel. Gets the message body and a one-shot reply
/// handle.
pub type MessageHandler = Arc<dyn Fn(Bytes, BinaryReply) + Send + Sync>;

/// A named-channel message carrier.
///
/// Implementations deliver each `send` to the handler bound to the name and
/// route exactly one reply back to the sender's callback.
pub trait BinaryMessenger: Send + Sync {
    /// Send `message` on `channel`. `callback` runs once with the reply.
    fn send(&self, channel: &str, message: Bytes, callback: ReplyCallback);

    /// Bind a handler to `channel`, or unbind it with `None`.
    fn set_handler(&self, channel: &str, handler: Option<MessageHandler>);
}

/// One-shot reply handle passed to a [`MessageHandler`].
///
/// Sending consumes the handle, so a reply can go out at most once.
pub struct BinaryReply {
    channel: String,
    callback: Option<ReplyCallback>,
}

impl BinaryReply {
    pub fn new(channel: impl Into<String>, callback: ReplyCallback) -> Self {
        Self {
            channel: channel.into(),
            callback: Some(callback),
        }
    }

    /// The channel this reply answers.
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Deliver the reply.
    pub fn send(mut self, reply: Option<Bytes>) {
        if let Some(callback) = self.callback.take() {
            debug!(
                channel = %self.channel,
                len = reply.as_ref().map_or(0, Bytes::len),
                "reply sent"
            );
            callback(reply);
        }
    }
}

impl Drop for BinaryReply {
    fn drop(&mut self) {
        if self.callback.is_some() {
            debug!(channel = %self.channel, "reply handle dropped without a reply");
        }
    }
}

impl std::fmt::Debug for BinaryReply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BinaryReply")
            .field("channel", &self.channel)
            .field("pending", &self.callback.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn reply_delivers_once() {
        let (tx, rx) = mpsc::channel();
        let reply = BinaryReply::new("c", Box::new(move |bytes| tx.send(bytes).unwrap()));
        assert_eq!(reply.channel(), "c");
        reply.send(Some(Bytes::from_static(b"ok")));
        assert_eq!(rx.recv().unwrap(), Some(Bytes::from_static(b"ok")));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn dropped_reply_never_calls_back() {
        let (tx, rx) = mpsc::channel::<Option<Bytes>>();
        let reply = BinaryReply::new("c", Box::new(move |bytes| tx.send(bytes).unwrap()));
        drop(reply);
        assert!(rx.recv().is_err());
    }
}
