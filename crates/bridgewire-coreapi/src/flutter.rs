//! The API exposed by the other runtime, and a typed client for calling it.

use std::sync::Arc;

use bridgewire_channel::ChannelError;
use bridgewire_codec::{FromValue, Value};
use bridgewire_dispatch::{CallError, Caller, DispatchConfig, Dispatcher, HandlerError};
use bytes::Bytes;

use crate::types::{AllNullableTypes, AllTypes};

pub const FLUTTER_INTEGRATION_CORE_API: &str = "FlutterIntegrationCoreApi";

/// Echo surface implemented on the far side of the channel.
pub trait FlutterIntegrationCoreApi: Send + Sync {
    fn noop(&self) -> Result<(), HandlerError>;
    fn echo_all_types(&self, everything: AllTypes) -> Result<AllTypes, HandlerError>;
    fn echo_all_nullable_types(
        &self,
        everything: AllNullableTypes,
    ) -> Result<AllNullableTypes, HandlerError>;
    fn send_multiple_nullable_types(
        &self,
        a_nullable_bool: Option<bool>,
        a_nullable_int: Option<i64>,
        a_nullable_string: Option<String>,
    ) -> Result<AllNullableTypes, HandlerError>;
    fn echo_bool(&self, a_bool: bool) -> Result<bool, HandlerError>;
    fn echo_int(&self, an_int: i64) -> Result<i64, HandlerError>;
    fn echo_double(&self, a_double: f64) -> Result<f64, HandlerError>;
    fn echo_string(&self, a_string: String) -> Result<String, HandlerError>;
    fn echo_uint8_list(&self, a_list: Bytes) -> Result<Bytes, HandlerError>;
    fn echo_list(&self, a_list: Vec<Value>) -> Result<Vec<Value>, HandlerError>;
    fn echo_map(&self, a_map: Vec<(Value, Value)>) -> Result<Vec<(Value, Value)>, HandlerError>;
    fn echo_nullable_bool(&self, a_bool: Option<bool>) -> Result<Option<bool>, HandlerError>;
    fn echo_nullable_int(&self, an_int: Option<i64>) -> Result<Option<i64>, HandlerError>;
    fn echo_nullable_double(&self, a_double: Option<f64>) -> Result<Option<f64>, HandlerError>;
    fn echo_nullable_string(&self, a_string: Option<String>)
        -> Result<Option<String>, HandlerError>;
    fn echo_nullable_uint8_list(&self, a_list: Option<Bytes>)
        -> Result<Option<Bytes>, HandlerError>;
    fn echo_nullable_list(
        &self,
        a_list: Option<Vec<Value>>,
    ) -> Result<Option<Vec<Value>>, HandlerError>;
    fn echo_nullable_map(
        &self,
        a_map: Option<Vec<(Value, Value)>>,
    ) -> Result<Option<Vec<(Value, Value)>>, HandlerError>;
}

/// Bind or unbind every [`FlutterIntegrationCoreApi`] channel.
pub fn setup_flutter_integration_core_api(
    dispatcher: &Dispatcher,
    config: &DispatchConfig,
    api: Option<Arc<dyn FlutterIntegrationCoreApi>>,
) -> Result<(), ChannelError> {
    let channel = |method: &str| config.channel(FLUTTER_INTEGRATION_CORE_API, method);

    let Some(api) = api else {
        for &method in FLUTTER_INTEGRATION_CORE_API_METHODS {
            dispatcher.unregister(&channel(method)?);
        }
        return Ok(());
    };

    let a = Arc::clone(&api);
    dispatcher.register_sync(&channel("noop")?, move |(): ()| a.noop());
    let a = Arc::clone(&api);
    dispatcher.register_sync(&channel("echoAllTypes")?, move |(e,): (AllTypes,)| {
        a.echo_all_types(e)
    });
    let a = Arc::clone(&api);
    dispatcher.register_sync(
        &channel("echoAllNullableTypes")?,
        move |(e,): (AllNullableTypes,)| a.echo_all_nullable_types(e),
    );
    let a = Arc::clone(&api);
    dispatcher.register_sync(
        &channel("sendMultipleNullableTypes")?,
        move |(b, n, s): (Option<bool>, Option<i64>, Option<String>)| {
            a.send_multiple_nullable_types(b, n, s)
        },
    );
    let a = Arc::clone(&api);
    dispatcher.register_sync(&channel("echoBool")?, move |(v,): (bool,)| a.echo_bool(v));
    let a = Arc::clone(&api);
    dispatcher.register_sync(&channel("echoInt")?, move |(v,): (i64,)| a.echo_int(v));
    let a = Arc::clone(&api);
    dispatcher.register_sync(&channel("echoDouble")?, move |(v,): (f64,)| a.echo_double(v));
    let a = Arc::clone(&api);
    dispatcher.register_sync(&channel("echoString")?, move |(v,): (String,)| a.echo_string(v));
    let a = Arc::clone(&api);
    dispatcher.register_sync(&channel("echoUint8List")?, move |(v,): (Bytes,)| {
        a.echo_uint8_list(v)
    });
    let a = Arc::clone(&api);
    dispatcher.register_sync(&channel("echoList")?, move |(v,): (Vec<Value>,)| a.echo_list(v));
    let a = Arc::clone(&api);
    dispatcher.register_sync(&channel("echoMap")?, move |(v,): (Vec<(Value, Value)>,)| {
        a.echo_map(v)
    });
    let a = Arc::clone(&api);
    dispatcher.register_sync(&channel("echoNullableBool")?, move |(v,): (Option<bool>,)| {
        a.echo_nullable_bool(v)
    });
    let a = Arc::clone(&api);
    dispatcher.register_sync(&channel("echoNullableInt")?, move |(v,): (Option<i64>,)| {
        a.echo_nullable_int(v)
    });
    let a = Arc::clone(&api);
    dispatcher.register_sync(&channel("echoNullableDouble")?, move |(v,): (Option<f64>,)| {
        a.echo_nullable_double(v)
    });
    let a = Arc::clone(&api);
    dispatcher.register_sync(
        &channel("echoNullableString")?,
        move |(v,): (Option<String>,)| a.echo_nullable_string(v),
    );
    let a = Arc::clone(&api);
    dispatcher.register_sync(
        &channel("echoNullableUint8List")?,
        move |(v,): (Option<Bytes>,)| a.echo_nullable_uint8_list(v),
    );
    let a = Arc::clone(&api);
    dispatcher.register_sync(
        &channel("echoNullableList")?,
        move |(v,): (Option<Vec<Value>>,)| a.echo_nullable_list(v),
    );
    dispatcher.register_sync(
        &channel("echoNullableMap")?,
        move |(v,): (Option<Vec<(Value, Value)>>,)| api.echo_nullable_map(v),
    );
    Ok(())
}

/// Method names of [`FlutterIntegrationCoreApi`], in binding order.
pub const FLUTTER_INTEGRATION_CORE_API_METHODS: &[&str] = &[
    "noop",
    "echoAllTypes",
    "echoAllNullableTypes",
    "sendMultipleNullableTypes",
    "echoBool",
    "echoInt",
    "echoDouble",
    "echoString",
    "echoUint8List",
    "echoList",
    "echoMap",
    "echoNullableBool",
    "echoNullableInt",
    "echoNullableDouble",
    "echoNullableString",
    "echoNullableUint8List",
    "echoNullableList",
    "echoNullableMap",
];

/// Typed caller for [`FlutterIntegrationCoreApi`].
///
/// Every method sends immediately and hands the outcome to `on_result`
/// exactly once, on whatever thread the reply arrives.
#[derive(Debug, Clone)]
pub struct CoreApiClient {
    caller: Caller,
    prefix: String,
}

impl CoreApiClient {
    pub fn new(caller: Caller, config: &DispatchConfig) -> Result<Self, ChannelError> {
        // Method names are fixed, so validating one channel validates all.
        config.channel(FLUTTER_INTEGRATION_CORE_API, "noop")?;
        let prefix = format!("{}.{}", config.namespace, FLUTTER_INTEGRATION_CORE_API);
        Ok(Self { caller, prefix })
    }

    /// Fully-qualified channel for `method`.
    pub fn channel(&self, method: &str) -> String {
        format!("{}.{}", self.prefix, method)
    }

    fn invoke<R, F>(&self, method: &str, args: Vec<Value>, on_result: F)
    where
        R: FromValue,
        F: FnOnce(Result<R, CallError>) + Send + 'static,
    {
        self.caller.call(&self.channel(method), args, on_result);
    }

    pub fn noop(&self, on_result: impl FnOnce(Result<(), CallError>) + Send + 'static) {
        self.invoke("noop", vec![], on_result);
    }

    pub fn echo_all_types(
        &self,
        everything: AllTypes,
        on_result: impl FnOnce(Result<AllTypes, CallError>) + Send + 'static,
    ) {
        self.invoke("echoAllTypes", vec![everything.into()], on_result);
    }

    pub fn echo_all_nullable_types(
        &self,
        everything: AllNullableTypes,
        on_result: impl FnOnce(Result<AllNullableTypes, CallError>) + Send + 'static,
    ) {
        self.invoke("echoAllNullableTypes", vec![everything.into()], on_result);
    }

    pub fn send_multiple_nullable_types(
        &self,
        a_nullable_bool: Option<bool>,
        a_nullable_int: Option<i64>,
        a_nullable_string: Option<String>,
        on_result: impl FnOnce(Result<AllNullableTypes, CallError>) + Send + 'static,
    ) {
        let args = vec![
            Value::from(a_nullable_bool),
            Value::from(a_nullable_int),
            Value::from(a_nullable_string),
        ];
        self.invoke("sendMultipleNullableTypes", args, on_result);
    }

    pub fn echo_bool(
        &self,
        a_bool: bool,
        on_result: impl FnOnce(Result<bool, CallError>) + Send + 'static,
    ) {
        self.invoke("echoBool", vec![a_bool.into()], on_result);
    }

    pub fn echo_int(
        &self,
        an_int: i64,
        on_result: impl FnOnce(Result<i64, CallError>) + Send + 'static,
    ) {
        self.invoke("echoInt", vec![an_int.into()], on_result);
    }

    pub fn echo_double(
        &self,
        a_double: f64,
        on_result: impl FnOnce(Result<f64, CallError>) + Send + 'static,
    ) {
        self.invoke("echoDouble", vec![a_double.into()], on_result);
    }

    pub fn echo_string(
        &self,
        a_string: impl Into<String>,
        on_result: impl FnOnce(Result<String, CallError>) + Send + 'static,
    ) {
        self.invoke("echoString", vec![Value::String(a_string.into())], on_result);
    }

    pub fn echo_uint8_list(
        &self,
        a_list: Bytes,
        on_result: impl FnOnce(Result<Bytes, CallError>) + Send + 'static,
    ) {
        self.invoke("echoUint8List", vec![a_list.into()], on_result);
    }

    pub fn echo_list(
        &self,
        a_list: Vec<Value>,
        on_result: impl FnOnce(Result<Vec<Value>, CallError>) + Send + 'static,
    ) {
        self.invoke("echoList", vec![a_list.into()], on_result);
    }

    pub fn echo_map(
        &self,
        a_map: Vec<(Value, Value)>,
        on_result: impl FnOnce(Result<Vec<(Value, Value)>, CallError>) + Send + 'static,
    ) {
        self.invoke("echoMap", vec![a_map.into()], on_result);
    }

    pub fn echo_nullable_bool(
        &self,
        a_bool: Option<bool>,
        on_result: impl FnOnce(Result<Option<bool>, CallError>) + Send + 'static,
    ) {
        self.invoke("echoNullableBool", vec![a_bool.into()], on_result);
    }

    pub fn echo_nullable_int(
        &self,
        an_int: Option<i64>,
        on_result: impl FnOnce(Result<Option<i64>, CallError>) + Send + 'static,
    ) {
        self.invoke("echoNullableInt", vec![an_int.into()], on_result);
    }

    pub fn echo_nullable_double(
        &self,
        a_double: Option<f64>,
        on_result: impl FnOnce(Result<Option<f64>, CallError>) + Send + 'static,
    ) {
        self.invoke("echoNullableDouble", vec![a_double.into()], on_result);
    }

    pub fn echo_nullable_string(
        &self,
        a_string: Option<String>,
        on_result: impl FnOnce(Result<Option<String>, CallError>) + Send + 'static,
    ) {
        self.invoke("echoNullableString", vec![a_string.into()], on_result);
    }

    pub fn echo_nullable_uint8_list(
        &self,
        a_list: Option<Bytes>,
        on_result: impl FnOnce(Result<Option<Bytes>, CallError>) + Send + 'static,
    ) {
        self.invoke("echoNullableUint8List", vec![a_list.into()], on_result);
    }

    pub fn echo_nullable_list(
        &self,
        a_list: Option<Vec<Value>>,
        on_result: impl FnOnce(Result<Option<Vec<Value>>, CallError>) + Send + 'static,
    ) {
        self.invoke("echoNullableList", vec![a_list.into()], on_result);
    }

    pub fn echo_nullable_map(
        &self,
        a_map: Option<Vec<(Value, Value)>>,
        on_result: impl FnOnce(Result<Option<Vec<(Value, Value)>>, CallError>) + Send + 'static,
    ) {
        self.invoke("echoNullableMap", vec![a_map.into()], on_result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridgewire_channel::LocalMessenger;
    use bridgewire_codec::{StandardCodec, ValueCodec};

    #[test]
    fn client_channels_use_namespace() {
        let messenger = Arc::new(LocalMessenger::new());
        let codec: Arc<dyn ValueCodec> = Arc::new(StandardCodec::new());
        let caller = Caller::new(messenger, codec);
        let config = DispatchConfig::with_namespace("dev.flutter.pigeon");
        let client = CoreApiClient::new(caller, &config).unwrap();
        assert_eq!(
            client.channel("echoString"),
            "dev.flutter.pigeon.FlutterIntegrationCoreApi.echoString"
        );
    }

    #[test]
    fn client_rejects_bad_namespace() {
        let messenger = Arc::new(LocalMessenger::new());
        let codec: Arc<dyn ValueCodec> = Arc::new(StandardCodec::new());
        let caller = Caller::new(messenger, codec);
        let config = DispatchConfig::with_namespace("");
        assert!(CoreApiClient::new(caller, &config).is_err());
    }
}
