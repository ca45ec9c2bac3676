//! Handler side of the request/reply protocol.
//!
//! ```text
//! message ─▶ decode ─▶ FromArgs ─▶ handler ─▶ envelope ─▶ encode ─▶ reply
//!              │           │          │
//!              └───────────┴──────────┴──▶ error envelope
//! ```

use std::marker::PhantomData;
use std::sync::{Arc, Mutex, PoisonError};

use bridgewire_channel::{BinaryMessenger, BinaryReply, MessageHandler};
use bridgewire_codec::{DecodeError, Value, ValueCodec};
use bytes::Bytes;
use tracing::{debug, warn};

use crate::args::FromArgs;
use crate::envelope::{Envelope, ErrorEnvelope, DECODE_ERROR_CODE, ENCODE_ERROR_CODE};
use crate::error::HandlerError;

/// Binds typed handlers to channels on a messenger.
#[derive(Clone)]
pub struct Dispatcher {
    messenger: Arc<dyn BinaryMessenger>,
    codec: Arc<dyn ValueCodec>,
}

impl Dispatcher {
    pub fn new(messenger: Arc<dyn BinaryMessenger>, codec: Arc<dyn ValueCodec>) -> Self {
        Self { messenger, codec }
    }

    /// Bind a handler that produces its result before returning.
    pub fn register_sync<A, R, F>(&self, channel: &str, handler: F)
    where
        A: FromArgs,
        R: Into<Value>,
        F: Fn(A) -> Result<R, HandlerError> + Send + Sync + 'static,
    {
        let codec = Arc::clone(&self.codec);
        let bound: MessageHandler = Arc::new(move |message: Bytes, reply: BinaryReply| {
            let envelope = match decode_args::<A>(codec.as_ref(), reply.channel(), message) {
                Ok(args) => match handler(args) {
                    Ok(result) => Envelope::Success(result.into()),
                    Err(err) => Envelope::Error(err.into_envelope()),
                },
                Err(envelope) => envelope,
            };
            send_envelope(codec.as_ref(), reply, envelope);
        });
        self.messenger.set_handler(channel, Some(bound));
    }

    /// Bind a handler that replies later through a [`Completion`].
    ///
    /// An `Err` returned from the handler itself is sent as an error envelope
    /// unless the completion has already replied.
    pub fn register_async<A, R, F>(&self, channel: &str, handler: F)
    where
        A: FromArgs,
        R: Into<Value>,
        F: Fn(A, Completion<R>) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        let codec = Arc::clone(&self.codec);
        let bound: MessageHandler = Arc::new(move |message: Bytes, reply: BinaryReply| {
            let args = match decode_args::<A>(codec.as_ref(), reply.channel(), message) {
                Ok(args) => args,
                Err(envelope) => return send_envelope(codec.as_ref(), reply, envelope),
            };
            let slot = ReplySlot::new(Arc::clone(&codec), reply);
            let completion = Completion::new(slot.clone());
            if let Err(err) = handler(args, completion) {
                if !slot.send(Envelope::Error(err.into_envelope())) {
                    warn!(
                        channel = %slot.channel,
                        "handler returned an error after replying; error dropped"
                    );
                }
            }
        });
        self.messenger.set_handler(channel, Some(bound));
    }

    /// Remove whatever handler is bound to `channel`.
    pub fn unregister(&self, channel: &str) {
        self.messenger.set_handler(channel, None);
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher").finish_non_exhaustive()
    }
}

fn decode_args<A: FromArgs>(
    codec: &dyn ValueCodec,
    channel: &str,
    message: Bytes,
) -> Result<A, Envelope> {
    codec
        .decode_message(message)
        .and_then(A::from_args)
        .map_err(|err| decode_failure(channel, &err))
}

fn decode_failure(channel: &str, err: &DecodeError) -> Envelope {
    warn!(channel, error = %err, "failed to decode request");
    Envelope::Error(ErrorEnvelope::new(DECODE_ERROR_CODE, err.to_string()))
}

/// Encode and send an envelope; an unencodable result becomes an
/// `encode-error` envelope.
fn send_envelope(codec: &dyn ValueCodec, reply: BinaryReply, envelope: Envelope) {
    let encoded = codec.encode_message(&envelope.into_value()).or_else(|err| {
        warn!(channel = reply.channel(), error = %err, "failed to encode reply");
        let fallback = Envelope::Error(ErrorEnvelope::new(ENCODE_ERROR_CODE, err.to_string()));
        codec.encode_message(&fallback.into_value())
    });
    match encoded {
        Ok(bytes) => reply.send(Some(bytes)),
        Err(err) => {
            warn!(channel = reply.channel(), error = %err, "failed to encode error reply");
            reply.send(None);
        }
    }
}

/// The reply handle of one in-flight async request, shared between the
/// dispatcher and the handler's completion.
#[derive(Clone)]
struct ReplySlot {
    channel: Arc<str>,
    codec: Arc<dyn ValueCodec>,
    reply: Arc<Mutex<Option<BinaryReply>>>,
}

impl ReplySlot {
    fn new(codec: Arc<dyn ValueCodec>, reply: BinaryReply) -> Self {
        Self {
            channel: Arc::from(reply.channel()),
            codec,
            reply: Arc::new(Mutex::new(Some(reply))),
        }
    }

    /// Send `envelope` if nothing has been sent yet. Returns false otherwise.
    fn send(&self, envelope: Envelope) -> bool {
        let taken = self
            .reply
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match taken {
            Some(reply) => {
                send_envelope(self.codec.as_ref(), reply, envelope);
                true
            }
            None => false,
        }
    }
}

fn result_envelope<R: Into<Value>>(result: Result<R, HandlerError>) -> Envelope {
    match result {
        Ok(value) => Envelope::Success(value.into()),
        Err(err) => Envelope::Error(err.into_envelope()),
    }
}

/// Single-use reply token handed to an async handler.
///
/// Every method consumes the token, so a handler holding a `Completion`
/// can reply at most once. Dropping it without replying leaves the caller
/// waiting.
pub struct Completion<R> {
    slot: ReplySlot,
    _result: PhantomData<fn(R)>,
}

impl<R: Into<Value>> Completion<R> {
    fn new(slot: ReplySlot) -> Self {
        Self {
            slot,
            _result: PhantomData,
        }
    }

    /// Channel the pending request arrived on.
    pub fn channel(&self) -> &str {
        &self.slot.channel
    }

    pub fn complete(self, result: Result<R, HandlerError>) {
        if !self.slot.send(result_envelope(result)) {
            debug!(channel = %self.slot.channel, "completion after reply ignored");
        }
    }

    pub fn success(self, value: R) {
        self.complete(Ok(value));
    }

    pub fn error(self, err: impl Into<HandlerError>) {
        self.complete(Err(err.into()));
    }

    /// Convert into a cloneable handle for callback-style code that cannot
    /// move a single token to the place that finishes the work.
    pub fn into_shared(self) -> SharedCompletion<R> {
        SharedCompletion {
            slot: self.slot,
            _result: PhantomData,
        }
    }
}

impl<R> std::fmt::Debug for Completion<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Completion")
            .field("channel", &self.slot.channel)
            .finish()
    }
}

/// Cloneable completion. Only the first `complete` among all clones sends a
/// reply.
pub struct SharedCompletion<R> {
    slot: ReplySlot,
    _result: PhantomData<fn(R)>,
}

impl<R> Clone for SharedCompletion<R> {
    fn clone(&self) -> Self {
        Self {
            slot: self.slot.clone(),
            _result: PhantomData,
        }
    }
}

impl<R: Into<Value>> SharedCompletion<R> {
    /// Reply with `result`. Returns false, sending nothing, if any clone
    /// already replied.
    pub fn complete(&self, result: Result<R, HandlerError>) -> bool {
        let sent = self.slot.send(result_envelope(result));
        if !sent {
            warn!(channel = %self.slot.channel, "duplicate completion ignored");
        }
        sent
    }

    pub fn success(&self, value: R) -> bool {
        self.complete(Ok(value))
    }

    pub fn error(&self, err: impl Into<HandlerError>) -> bool {
        self.complete(Err(err.into()))
    }

    /// True once any clone (or the dispatcher) has replied.
    pub fn is_completed(&self) -> bool {
        self.slot
            .reply
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridgewire_channel::LocalMessenger;
    use bridgewire_codec::StandardCodec;
    use std::sync::mpsc;

    fn setup() -> (Dispatcher, Arc<LocalMessenger>, Arc<dyn ValueCodec>) {
        let messenger = Arc::new(LocalMessenger::new());
        let codec: Arc<dyn ValueCodec> = Arc::new(StandardCodec::new());
        let dispatcher = Dispatcher::new(messenger.clone(), Arc::clone(&codec));
        (dispatcher, messenger, codec)
    }

    /// Send raw `args` and collect every reply delivered.
    fn roundtrip(
        messenger: &LocalMessenger,
        codec: &dyn ValueCodec,
        channel: &str,
        args: Value,
    ) -> mpsc::Receiver<Option<Value>> {
        let (tx, rx) = mpsc::channel();
        let decoder = Arc::new(StandardCodec::new());
        messenger.send(
            channel,
            codec.encode_message(&args).unwrap(),
            Box::new(move |reply: Option<Bytes>| {
                let value = reply.map(|bytes| decoder.decode_message(bytes).unwrap());
                tx.send(value).unwrap();
            }),
        );
        rx
    }

    #[test]
    fn sync_success_envelope() {
        let (dispatcher, messenger, codec) = setup();
        dispatcher.register_sync("echo", |(s,): (String,)| Ok(s));
        let args = Value::List(vec![Value::from("hi")]);
        let rx = roundtrip(&messenger, codec.as_ref(), "echo", args);
        assert_eq!(
            rx.recv().unwrap(),
            Some(Value::List(vec![Value::from("hi")]))
        );
    }

    #[test]
    fn unit_result_replies_null() {
        let (dispatcher, messenger, codec) = setup();
        dispatcher.register_sync("noop", |(): ()| Ok(()));
        let rx = roundtrip(&messenger, codec.as_ref(), "noop", Value::Null);
        assert_eq!(rx.recv().unwrap(), Some(Value::List(vec![Value::Null])));
    }

    #[test]
    fn bad_arguments_reply_decode_error() {
        let (dispatcher, messenger, codec) = setup();
        dispatcher.register_sync("int", |(n,): (i64,)| Ok(n));
        let rx = roundtrip(
            &messenger,
            codec.as_ref(),
            "int",
            Value::List(vec![Value::from("nope")]),
        );
        let reply = rx.recv().unwrap().unwrap();
        let Envelope::Error(err) = Envelope::from_value(reply).unwrap() else {
            panic!("expected error envelope");
        };
        assert_eq!(err.code, DECODE_ERROR_CODE);
        assert!(err.message.contains("argument 0"), "{}", err.message);
    }

    #[test]
    fn unencodable_result_replies_encode_error() {
        let (dispatcher, messenger, codec) = setup();
        dispatcher.register_sync("rec", |(): ()| {
            Ok(Value::Record(bridgewire_codec::RecordValue::new("Unknown", vec![])))
        });
        let rx = roundtrip(&messenger, codec.as_ref(), "rec", Value::Null);
        let reply = rx.recv().unwrap().unwrap();
        let Envelope::Error(err) = Envelope::from_value(reply).unwrap() else {
            panic!("expected error envelope");
        };
        assert_eq!(err.code, ENCODE_ERROR_CODE);
    }

    #[test]
    fn async_completion_from_another_thread() {
        let (dispatcher, messenger, codec) = setup();
        dispatcher.register_async("later", |(n,): (i64,), done: Completion<i64>| {
            std::thread::spawn(move || done.success(n * 2));
            Ok(())
        });
        let rx = roundtrip(&messenger, codec.as_ref(), "later", Value::List(vec![Value::Int(21)]));
        assert_eq!(
            rx.recv().unwrap(),
            Some(Value::List(vec![Value::Int(42)]))
        );
    }

    #[test]
    fn async_handler_error_replies_once() {
        let (dispatcher, messenger, codec) = setup();
        dispatcher.register_async("fail", |(): (), done: Completion<()>| {
            drop(done);
            Err(HandlerError::new("Nope", "refused"))
        });
        let rx = roundtrip(&messenger, codec.as_ref(), "fail", Value::Null);
        let reply = rx.recv().unwrap().unwrap();
        assert_eq!(
            Envelope::from_value(reply).unwrap(),
            Envelope::Error(ErrorEnvelope::new("Nope", "refused"))
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn handler_error_after_completion_is_dropped() {
        let (dispatcher, messenger, codec) = setup();
        dispatcher.register_async("both", |(): (), done: Completion<String>| {
            done.success("first".to_string());
            Err(HandlerError::new("Late", "ignored"))
        });
        let rx = roundtrip(&messenger, codec.as_ref(), "both", Value::Null);
        assert_eq!(
            rx.recv().unwrap(),
            Some(Value::List(vec![Value::from("first")]))
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn shared_completion_replies_exactly_once() {
        let (dispatcher, messenger, codec) = setup();
        let (flags_tx, flags_rx) = mpsc::channel();
        dispatcher.register_async("twice", move |(): (), done: Completion<i64>| {
            let shared = done.into_shared();
            let again = shared.clone();
            flags_tx.send(shared.success(1)).unwrap();
            flags_tx.send(again.success(2)).unwrap();
            flags_tx.send(again.is_completed()).unwrap();
            Ok(())
        });
        let rx = roundtrip(&messenger, codec.as_ref(), "twice", Value::Null);
        assert_eq!(rx.recv().unwrap(), Some(Value::List(vec![Value::Int(1)])));
        assert!(rx.try_recv().is_err());
        let flags: Vec<bool> = flags_rx.try_iter().collect();
        assert_eq!(flags, vec![true, false, true]);
    }

    #[test]
    fn unregister_returns_channel_to_unbound() {
        let (dispatcher, messenger, codec) = setup();
        dispatcher.register_sync("gone", |(): ()| Ok(()));
        dispatcher.unregister("gone");
        let rx = roundtrip(&messenger, codec.as_ref(), "gone", Value::Null);
        assert_eq!(rx.recv().unwrap(), None);
    }
}
