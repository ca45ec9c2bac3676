use std::sync::Arc;

use bridgewire_channel::BinaryMessenger;
use bridgewire_codec::{FromValue, Value, ValueCodec};
use bytes::Bytes;
use tracing::debug;

use crate::envelope::Envelope;
use crate::error::{CallError, Result};

/// Issues typed calls to handlers bound on the other side of a messenger.
#[derive(Clone)]
pub struct Caller {
    messenger: Arc<dyn BinaryMessenger>,
    codec: Arc<dyn ValueCodec>,
}

impl Caller {
    pub fn new(messenger: Arc<dyn BinaryMessenger>, codec: Arc<dyn ValueCodec>) -> Self {
        Self { messenger, codec }
    }

    /// Call the handler on `channel` and hand the decoded result to
    /// `on_result`.
    ///
    /// The request body is the argument list, or null when `args` is empty.
    /// `on_result` runs exactly once, on whatever thread the reply arrives.
    pub fn call<R, F>(&self, channel: &str, args: Vec<Value>, on_result: F)
    where
        R: FromValue,
        F: FnOnce(Result<R>) + Send + 'static,
    {
        let payload = if args.is_empty() {
            Value::Null
        } else {
            Value::List(args)
        };
        let message = match self.codec.encode_message(&payload) {
            Ok(message) => message,
            Err(err) => return on_result(Err(err.into())),
        };

        debug!(channel, len = message.len(), "sending call");
        let codec = Arc::clone(&self.codec);
        let name = channel.to_string();
        self.messenger.send(
            channel,
            message,
            Box::new(move |reply| on_result(decode_reply(codec.as_ref(), &name, reply))),
        );
    }

    /// Awaitable form of [`Caller::call`].
    #[cfg(feature = "async")]
    pub async fn call_async<R>(&self, channel: &str, args: Vec<Value>) -> Result<R>
    where
        R: FromValue + Send + 'static,
    {
        let (tx, rx) = tokio::sync::oneshot::channel();
        self.call(channel, args, move |result| {
            // The receiver may have been dropped by a cancelled caller.
            let _ = tx.send(result);
        });
        rx.await.map_err(|_| CallError::Abandoned)?
    }
}

impl std::fmt::Debug for Caller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Caller").finish_non_exhaustive()
    }
}

/// Check the reply's envelope shape, then cast the result.
fn decode_reply<R: FromValue>(
    codec: &dyn ValueCodec,
    channel: &str,
    reply: Option<Bytes>,
) -> Result<R> {
    let bytes = reply.ok_or_else(|| CallError::ChannelUnavailable(channel.to_string()))?;
    match Envelope::from_value(codec.decode_message(bytes)?)? {
        Envelope::Success(result) => Ok(R::from_value(result)?),
        Envelope::Error(err) => {
            debug!(channel, code = %err.code, "remote returned error");
            Err(CallError::Remote(err))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::{Completion, Dispatcher};
    use crate::envelope::ErrorEnvelope;
    use crate::error::HandlerError;
    use bridgewire_channel::LocalMessenger;
    use bridgewire_codec::{DecodeError, StandardCodec};
    use std::sync::mpsc;

    fn pair() -> (Dispatcher, Caller) {
        let messenger: Arc<dyn BinaryMessenger> = Arc::new(LocalMessenger::new());
        let codec: Arc<dyn ValueCodec> = Arc::new(StandardCodec::new());
        (
            Dispatcher::new(Arc::clone(&messenger), Arc::clone(&codec)),
            Caller::new(messenger, codec),
        )
    }

    fn call_blocking<R: FromValue + Send + 'static>(
        caller: &Caller,
        channel: &str,
        args: Vec<Value>,
    ) -> Result<R> {
        let (tx, rx) = mpsc::channel();
        caller.call(channel, args, move |result| tx.send(result).unwrap());
        rx.recv().unwrap()
    }

    #[test]
    fn typed_success() {
        let (dispatcher, caller) = pair();
        dispatcher.register_sync("add", |(a, b): (i64, i64)| Ok(a + b));
        let sum: i64 = call_blocking(&caller, "add", vec![Value::Int(2), Value::Int(3)]).unwrap();
        assert_eq!(sum, 5);
    }

    #[test]
    fn zero_args_send_null() {
        let (dispatcher, caller) = pair();
        dispatcher.register_sync("noop", |(): ()| Ok(()));
        call_blocking::<()>(&caller, "noop", vec![]).unwrap();
    }

    #[test]
    fn nullable_result() {
        let (dispatcher, caller) = pair();
        dispatcher.register_sync("maybe", |(v,): (Option<String>,)| Ok(v));
        let none: Option<String> = call_blocking(&caller, "maybe", vec![Value::Null]).unwrap();
        assert_eq!(none, None);
    }

    #[test]
    fn remote_error_is_not_cast_as_result() {
        let (dispatcher, caller) = pair();
        dispatcher.register_sync("fail", |(): ()| -> std::result::Result<String, HandlerError> {
            Err(HandlerError::new("Bad", "no").with_details("why"))
        });
        let err = call_blocking::<String>(&caller, "fail", vec![]).unwrap_err();
        let envelope = match err {
            CallError::Remote(envelope) => envelope,
            other => panic!("expected remote error, got {other:?}"),
        };
        assert_eq!(envelope, ErrorEnvelope::new("Bad", "no").with_details("why"));
    }

    #[test]
    fn unbound_channel_is_unavailable() {
        let (_, caller) = pair();
        let err = call_blocking::<()>(&caller, "missing", vec![]).unwrap_err();
        assert!(matches!(err, CallError::ChannelUnavailable(ref name) if name == "missing"));
    }

    #[test]
    fn wrong_result_type_is_decode_error() {
        let (dispatcher, caller) = pair();
        dispatcher.register_sync("str", |(): ()| Ok("text".to_string()));
        let err = call_blocking::<i64>(&caller, "str", vec![]).unwrap_err();
        assert!(matches!(
            err,
            CallError::Decode(DecodeError::TypeMismatch { expected: "int", .. })
        ));
    }

    #[test]
    fn async_handler_reply_reaches_caller() {
        let (dispatcher, caller) = pair();
        dispatcher.register_async("slow", |(s,): (String,), done: Completion<String>| {
            std::thread::spawn(move || done.success(s.to_uppercase()));
            Ok(())
        });
        let out: String = call_blocking(&caller, "slow", vec![Value::from("abc")]).unwrap();
        assert_eq!(out, "ABC");
    }
}
