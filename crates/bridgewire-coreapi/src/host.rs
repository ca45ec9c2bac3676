//! Host-side API surfaces and their channel bindings.

use std::sync::Arc;

use bridgewire_channel::ChannelError;
use bridgewire_codec::Value;
use bridgewire_dispatch::{Completion, DispatchConfig, Dispatcher, HandlerError};
use bytes::Bytes;
use tracing::debug;

use crate::types::{AllNullableTypes, AllNullableTypesWrapper, AllTypes};

pub const HOST_INTEGRATION_CORE_API: &str = "HostIntegrationCoreApi";
pub const HOST_TRIVIAL_API: &str = "HostTrivialApi";

/// Method names bound by [`setup_host_integration_core_api`], in binding order.
pub const HOST_INTEGRATION_CORE_API_METHODS: &[&str] = &[
    "noop",
    "echoAllTypes",
    "echoAllNullableTypes",
    "throwError",
    "echoInt",
    "echoDouble",
    "echoBool",
    "echoString",
    "echoUint8List",
    "echoObject",
    "extractNestedNullableString",
    "createNestedNullableString",
    "sendMultipleNullableTypes",
    "echoNullableInt",
    "echoNullableDouble",
    "echoNullableBool",
    "echoNullableString",
    "echoNullableUint8List",
    "echoNullableObject",
    "noopAsync",
    "echoAsyncString",
    "callFlutterNoop",
    "callFlutterEchoString",
];

/// The API every host implementation exposes for integration testing.
pub trait HostIntegrationCoreApi: Send + Sync {
    /// Takes nothing, returns nothing.
    fn noop(&self) -> Result<(), HandlerError>;
    fn echo_all_types(&self, everything: AllTypes) -> Result<AllTypes, HandlerError>;
    fn echo_all_nullable_types(
        &self,
        everything: Option<AllNullableTypes>,
    ) -> Result<Option<AllNullableTypes>, HandlerError>;
    /// Always fails, to exercise error envelopes.
    fn throw_error(&self) -> Result<(), HandlerError>;
    fn echo_int(&self, an_int: i64) -> Result<i64, HandlerError>;
    fn echo_double(&self, a_double: f64) -> Result<f64, HandlerError>;
    fn echo_bool(&self, a_bool: bool) -> Result<bool, HandlerError>;
    fn echo_string(&self, a_string: String) -> Result<String, HandlerError>;
    fn echo_uint8_list(&self, a_uint8_list: Bytes) -> Result<Bytes, HandlerError>;
    fn echo_object(&self, an_object: Value) -> Result<Value, HandlerError>;
    /// Reads the string nested inside the wrapper.
    fn extract_nested_nullable_string(
        &self,
        wrapper: AllNullableTypesWrapper,
    ) -> Result<Option<String>, HandlerError>;
    /// Builds a wrapper around a record holding `nullable_string`.
    fn create_nested_nullable_string(
        &self,
        nullable_string: Option<String>,
    ) -> Result<AllNullableTypesWrapper, HandlerError>;
    fn send_multiple_nullable_types(
        &self,
        a_nullable_bool: Option<bool>,
        a_nullable_int: Option<i64>,
        a_nullable_string: Option<String>,
    ) -> Result<AllNullableTypes, HandlerError>;
    fn echo_nullable_int(&self, a_nullable_int: Option<i64>) -> Result<Option<i64>, HandlerError>;
    fn echo_nullable_double(
        &self,
        a_nullable_double: Option<f64>,
    ) -> Result<Option<f64>, HandlerError>;
    fn echo_nullable_bool(&self, a_nullable_bool: Option<bool>)
        -> Result<Option<bool>, HandlerError>;
    fn echo_nullable_string(
        &self,
        a_nullable_string: Option<String>,
    ) -> Result<Option<String>, HandlerError>;
    fn echo_nullable_uint8_list(
        &self,
        a_nullable_uint8_list: Option<Bytes>,
    ) -> Result<Option<Bytes>, HandlerError>;
    fn echo_nullable_object(
        &self,
        a_nullable_object: Option<Value>,
    ) -> Result<Option<Value>, HandlerError>;

    fn noop_async(&self, done: Completion<()>) -> Result<(), HandlerError>;
    fn echo_async_string(
        &self,
        a_string: String,
        done: Completion<String>,
    ) -> Result<(), HandlerError>;
    /// Calls `noop` on the other side, replying once it answers.
    fn call_flutter_noop(&self, done: Completion<()>) -> Result<(), HandlerError>;
    /// Calls `echoString` on the other side and replies with its answer.
    fn call_flutter_echo_string(
        &self,
        a_string: String,
        done: Completion<String>,
    ) -> Result<(), HandlerError>;
}

/// A trivial API with a single method.
pub trait HostTrivialApi: Send + Sync {
    fn noop(&self) -> Result<(), HandlerError>;
}

/// Bind every [`HostIntegrationCoreApi`] channel to `api`, or unbind them all
/// when `api` is `None`.
pub fn setup_host_integration_core_api(
    dispatcher: &Dispatcher,
    config: &DispatchConfig,
    api: Option<Arc<dyn HostIntegrationCoreApi>>,
) -> Result<(), ChannelError> {
    let channel = |method: &str| config.channel(HOST_INTEGRATION_CORE_API, method);

    let Some(api) = api else {
        for &method in HOST_INTEGRATION_CORE_API_METHODS {
            dispatcher.unregister(&channel(method)?);
        }
        debug!(api = HOST_INTEGRATION_CORE_API, "unbound");
        return Ok(());
    };

    let a = Arc::clone(&api);
    dispatcher.register_sync(&channel("noop")?, move |(): ()| a.noop());
    let a = Arc::clone(&api);
    dispatcher.register_sync(&channel("echoAllTypes")?, move |(everything,): (AllTypes,)| {
        a.echo_all_types(everything)
    });
    let a = Arc::clone(&api);
    dispatcher.register_sync(
        &channel("echoAllNullableTypes")?,
        move |(everything,): (Option<AllNullableTypes>,)| a.echo_all_nullable_types(everything),
    );
    let a = Arc::clone(&api);
    dispatcher.register_sync(&channel("throwError")?, move |(): ()| a.throw_error());
    let a = Arc::clone(&api);
    dispatcher.register_sync(&channel("echoInt")?, move |(n,): (i64,)| a.echo_int(n));
    let a = Arc::clone(&api);
    dispatcher.register_sync(&channel("echoDouble")?, move |(d,): (f64,)| a.echo_double(d));
    let a = Arc::clone(&api);
    dispatcher.register_sync(&channel("echoBool")?, move |(b,): (bool,)| a.echo_bool(b));
    let a = Arc::clone(&api);
    dispatcher.register_sync(&channel("echoString")?, move |(s,): (String,)| a.echo_string(s));
    let a = Arc::clone(&api);
    dispatcher.register_sync(&channel("echoUint8List")?, move |(b,): (Bytes,)| {
        a.echo_uint8_list(b)
    });
    let a = Arc::clone(&api);
    dispatcher.register_sync(&channel("echoObject")?, move |(o,): (Value,)| a.echo_object(o));
    let a = Arc::clone(&api);
    dispatcher.register_sync(
        &channel("extractNestedNullableString")?,
        move |(wrapper,): (AllNullableTypesWrapper,)| a.extract_nested_nullable_string(wrapper),
    );
    let a = Arc::clone(&api);
    dispatcher.register_sync(
        &channel("createNestedNullableString")?,
        move |(s,): (Option<String>,)| a.create_nested_nullable_string(s),
    );
    let a = Arc::clone(&api);
    dispatcher.register_sync(
        &channel("sendMultipleNullableTypes")?,
        move |(b, n, s): (Option<bool>, Option<i64>, Option<String>)| {
            a.send_multiple_nullable_types(b, n, s)
        },
    );
    let a = Arc::clone(&api);
    dispatcher.register_sync(&channel("echoNullableInt")?, move |(n,): (Option<i64>,)| {
        a.echo_nullable_int(n)
    });
    let a = Arc::clone(&api);
    dispatcher.register_sync(&channel("echoNullableDouble")?, move |(d,): (Option<f64>,)| {
        a.echo_nullable_double(d)
    });
    let a = Arc::clone(&api);
    dispatcher.register_sync(&channel("echoNullableBool")?, move |(b,): (Option<bool>,)| {
        a.echo_nullable_bool(b)
    });
    let a = Arc::clone(&api);
    dispatcher.register_sync(
        &channel("echoNullableString")?,
        move |(s,): (Option<String>,)| a.echo_nullable_string(s),
    );
    let a = Arc::clone(&api);
    dispatcher.register_sync(
        &channel("echoNullableUint8List")?,
        move |(b,): (Option<Bytes>,)| a.echo_nullable_uint8_list(b),
    );
    let a = Arc::clone(&api);
    dispatcher.register_sync(
        &channel("echoNullableObject")?,
        move |(o,): (Option<Value>,)| a.echo_nullable_object(o),
    );

    let a = Arc::clone(&api);
    dispatcher.register_async(&channel("noopAsync")?, move |(): (), done| a.noop_async(done));
    let a = Arc::clone(&api);
    dispatcher.register_async(&channel("echoAsyncString")?, move |(s,): (String,), done| {
        a.echo_async_string(s, done)
    });
    let a = Arc::clone(&api);
    dispatcher.register_async(&channel("callFlutterNoop")?, move |(): (), done| {
        a.call_flutter_noop(done)
    });
    dispatcher.register_async(
        &channel("callFlutterEchoString")?,
        move |(s,): (String,), done| api.call_flutter_echo_string(s, done),
    );

    debug!(
        api = HOST_INTEGRATION_CORE_API,
        methods = HOST_INTEGRATION_CORE_API_METHODS.len(),
        "bound"
    );
    Ok(())
}

/// Bind or unbind [`HostTrivialApi`].
pub fn setup_host_trivial_api(
    dispatcher: &Dispatcher,
    config: &DispatchConfig,
    api: Option<Arc<dyn HostTrivialApi>>,
) -> Result<(), ChannelError> {
    let channel = config.channel(HOST_TRIVIAL_API, "noop")?;
    match api {
        Some(api) => dispatcher.register_sync(&channel, move |(): ()| api.noop()),
        None => dispatcher.unregister(&channel),
    }
    Ok(())
}
