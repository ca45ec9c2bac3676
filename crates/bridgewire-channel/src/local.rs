use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use bytes::Bytes;
use tracing::debug;

use crate::messenger::{BinaryMessenger, BinaryReply, MessageHandler, ReplyCallback};

/// In-process loopback messenger.
///
/// Handlers run on the sending thread. The handler table lock is released
/// before the handler is invoked, so handlers may send or rebind freely.
#[derive(Default)]
pub struct LocalMessenger {
    handlers: RwLock<HashMap<String, MessageHandler>>,
}

impl LocalMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if a handler is bound to `channel`.
    pub fn is_bound(&self, channel: &str) -> bool {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(channel)
    }

    /// Names of all bound channels, sorted.
    pub fn channels(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }
}

impl BinaryMessenger for LocalMessenger {
    fn send(&self, channel: &str, message: Bytes, callback: ReplyCallback) {
        let handler = self
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(channel)
            .cloned();

        match handler {
            Some(handler) => {
                debug!(channel, len = message.len(), "delivering message");
                handler(message, BinaryReply::new(channel, callback));
            }
            None => {
                debug!(channel, "no handler bound, replying empty");
                callback(None);
            }
        }
    }

    fn set_handler(&self, channel: &str, handler: Option<MessageHandler>) {
        let mut handlers = self.handlers.write().unwrap_or_else(PoisonError::into_inner);
        match handler {
            Some(handler) => {
                debug!(channel, "handler bound");
                handlers.insert(channel.to_string(), handler);
            }
            None => {
                debug!(channel, "handler unbound");
                handlers.remove(channel);
            }
        }
    }
}

impl std::fmt::Debug for LocalMessenger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalMessenger")
            .field("channels", &self.channels())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{mpsc, Arc};

    fn echo() -> MessageHandler {
        Arc::new(|message: Bytes, reply: BinaryReply| reply.send(Some(message)))
    }

    fn send_and_wait(
        messenger: &LocalMessenger,
        channel: &str,
        body: &'static [u8],
    ) -> Option<Bytes> {
        let (tx, rx) = mpsc::channel();
        messenger.send(
            channel,
            Bytes::from_static(body),
            Box::new(move |reply| tx.send(reply).unwrap()),
        );
        rx.recv().unwrap()
    }

    #[test]
    fn unbound_channel_replies_empty() {
        let messenger = LocalMessenger::new();
        assert_eq!(send_and_wait(&messenger, "nowhere", b"x"), None);
    }

    #[test]
    fn bound_channel_reaches_handler() {
        let messenger = LocalMessenger::new();
        messenger.set_handler("echo", Some(echo()));
        assert!(messenger.is_bound("echo"));
        assert_eq!(
            send_and_wait(&messenger, "echo", b"ping"),
            Some(Bytes::from_static(b"ping"))
        );
    }

    #[test]
    fn unbind_returns_to_empty_replies() {
        let messenger = LocalMessenger::new();
        messenger.set_handler("echo", Some(echo()));
        messenger.set_handler("echo", None);
        assert!(!messenger.is_bound("echo"));
        assert_eq!(send_and_wait(&messenger, "echo", b"ping"), None);
    }

    #[test]
    fn rebinding_replaces_handler() {
        let messenger = LocalMessenger::new();
        messenger.set_handler("c", Some(echo()));
        messenger.set_handler(
            "c",
            Some(Arc::new(|_: Bytes, reply: BinaryReply| {
                reply.send(Some(Bytes::from_static(b"second")))
            })),
        );
        assert_eq!(
            send_and_wait(&messenger, "c", b"first"),
            Some(Bytes::from_static(b"second"))
        );
        assert_eq!(messenger.channels(), vec!["c".to_string()]);
    }

    #[test]
    fn handler_may_rebind_while_running() {
        let messenger = Arc::new(LocalMessenger::new());
        let inner = Arc::clone(&messenger);
        messenger.set_handler(
            "once",
            Some(Arc::new(move |message: Bytes, reply: BinaryReply| {
                inner.set_handler("once", None);
                reply.send(Some(message));
            })),
        );
        assert!(send_and_wait(&messenger, "once", b"a").is_some());
        assert_eq!(send_and_wait(&messenger, "once", b"b"), None);
    }
}
