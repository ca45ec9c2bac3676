use std::sync::{mpsc, Arc};

use bridgewire_channel::{BinaryMessenger, LocalMessenger};
use bridgewire_codec::{CodecConfig, FromValue, Value, ValueCodec};
use bridgewire_coreapi::{
    core_api_codec, setup_flutter_integration_core_api, setup_host_integration_core_api,
    setup_host_trivial_api, AllNullableTypes, AllNullableTypesWrapper, AllTypes, AnEnum,
    CoreApiClient, EchoApi, HOST_INTEGRATION_CORE_API_METHODS,
};
use bridgewire_dispatch::{CallError, Caller, DispatchConfig, Dispatcher};
use bytes::Bytes;

struct Bridge {
    messenger: Arc<LocalMessenger>,
    dispatcher: Dispatcher,
    caller: Caller,
    config: DispatchConfig,
}

/// Both runtimes on one loopback messenger: the host echo API, which
/// forwards `callFlutter*` through a client, and the other side's echo API.
fn bridge() -> Bridge {
    let messenger = Arc::new(LocalMessenger::new());
    let codec: Arc<dyn ValueCodec> = Arc::new(core_api_codec(CodecConfig::default()).unwrap());
    let dispatcher = Dispatcher::new(messenger.clone(), Arc::clone(&codec));
    let caller = Caller::new(messenger.clone(), codec);
    let config = DispatchConfig::default();

    let client = CoreApiClient::new(caller.clone(), &config).unwrap();
    setup_host_integration_core_api(
        &dispatcher,
        &config,
        Some(Arc::new(EchoApi::with_flutter_api(client))),
    )
    .unwrap();
    setup_flutter_integration_core_api(&dispatcher, &config, Some(Arc::new(EchoApi::new())))
        .unwrap();

    Bridge {
        messenger,
        dispatcher,
        caller,
        config,
    }
}

impl Bridge {
    fn host<R: FromValue + Send + 'static>(
        &self,
        method: &str,
        args: Vec<Value>,
    ) -> Result<R, CallError> {
        let channel = self
            .config
            .channel("HostIntegrationCoreApi", method)
            .unwrap();
        let (tx, rx) = mpsc::channel();
        self.caller
            .call(&channel, args, move |result| tx.send(result).unwrap());
        rx.recv().unwrap()
    }
}

fn everything() -> AllTypes {
    AllTypes {
        a_bool: false,
        an_int: 1 << 40,
        a_double: -1.5,
        a_string: "all types".to_string(),
        a_byte_array: Bytes::from_static(b"\x00\xff"),
        a4_byte_array: vec![i32::MIN, 0, i32::MAX],
        a8_byte_array: vec![3],
        a_float_array: vec![f64::MAX],
        a_list: vec![Value::Bool(true), Value::Null, Value::from("s")],
        a_map: vec![(Value::Int(1), Value::from("one"))],
        an_enum: AnEnum::Two,
    }
}

#[test]
fn every_host_method_is_bound() {
    let b = bridge();
    for &method in HOST_INTEGRATION_CORE_API_METHODS {
        let channel = b.config.channel("HostIntegrationCoreApi", method).unwrap();
        assert!(b.messenger.is_bound(&channel), "{channel} not bound");
    }
}

#[test]
fn echo_scalars() {
    let b = bridge();
    assert_eq!(b.host::<i64>("echoInt", vec![Value::Int(-42)]).unwrap(), -42);
    assert_eq!(b.host::<f64>("echoDouble", vec![Value::Float(0.1)]).unwrap(), 0.1);
    assert!(b.host::<bool>("echoBool", vec![Value::Bool(true)]).unwrap());
    assert_eq!(
        b.host::<String>("echoString", vec![Value::from("héllo")]).unwrap(),
        "héllo"
    );
    assert_eq!(
        b.host::<Bytes>("echoUint8List", vec![Value::from(vec![1u8, 2, 3])])
            .unwrap(),
        Bytes::from_static(&[1, 2, 3])
    );
    b.host::<()>("noop", vec![]).unwrap();
}

#[test]
fn small_int_widens_on_echo() {
    let b = bridge();
    // Values that fit 32 bits travel as int32 and come back as the same int.
    assert_eq!(b.host::<i64>("echoInt", vec![Value::from(7)]).unwrap(), 7);
    assert_eq!(
        b.host::<i64>("echoInt", vec![Value::Int(i64::MAX)]).unwrap(),
        i64::MAX
    );
}

#[test]
fn echo_object_preserves_structure() {
    let b = bridge();
    let object = Value::Map(vec![(
        Value::from("nested"),
        Value::List(vec![Value::Int32Array(vec![1, 2]), Value::Float(2.0)]),
    )]);
    assert_eq!(
        b.host::<Value>("echoObject", vec![object.clone()]).unwrap(),
        object
    );
}

#[test]
fn echo_all_types_roundtrip() {
    let b = bridge();
    let echoed: AllTypes = b.host("echoAllTypes", vec![everything().into()]).unwrap();
    assert_eq!(echoed, everything());
}

#[test]
fn echo_all_nullable_types_with_null() {
    let b = bridge();
    let echoed: Option<AllNullableTypes> =
        b.host("echoAllNullableTypes", vec![Value::Null]).unwrap();
    assert_eq!(echoed, None);

    let some = AllNullableTypes {
        a_nullable_enum: Some(AnEnum::Three),
        nullable_nested_list: Some(vec![Value::List(vec![Value::Bool(false)])]),
        ..Default::default()
    };
    let echoed: Option<AllNullableTypes> = b
        .host("echoAllNullableTypes", vec![some.clone().into()])
        .unwrap();
    assert_eq!(echoed, Some(some));
}

#[test]
fn nullable_echoes_pass_null_through() {
    let b = bridge();
    for method in [
        "echoNullableInt",
        "echoNullableDouble",
        "echoNullableBool",
        "echoNullableString",
        "echoNullableUint8List",
        "echoNullableObject",
    ] {
        let echoed: Option<Value> = b.host(method, vec![Value::Null]).unwrap();
        assert_eq!(echoed, None, "{method}");
    }
}

#[test]
fn nested_nullable_string() {
    let b = bridge();
    let wrapper: AllNullableTypesWrapper = b
        .host("createNestedNullableString", vec![Value::from("deep")])
        .unwrap();
    assert_eq!(wrapper.values.a_nullable_string.as_deref(), Some("deep"));

    let extracted: Option<String> = b
        .host("extractNestedNullableString", vec![wrapper.into()])
        .unwrap();
    assert_eq!(extracted.as_deref(), Some("deep"));
}

#[test]
fn send_multiple_nullable_types() {
    let b = bridge();
    let built: AllNullableTypes = b
        .host(
            "sendMultipleNullableTypes",
            vec![Value::Bool(true), Value::Null, Value::from("x")],
        )
        .unwrap();
    assert_eq!(built.a_nullable_bool, Some(true));
    assert_eq!(built.a_nullable_int, None);
    assert_eq!(built.a_nullable_string.as_deref(), Some("x"));
}

#[test]
fn throw_error_replies_error_envelope() {
    let b = bridge();
    match b.host::<()>("throwError", vec![]) {
        Err(CallError::Remote(envelope)) => {
            assert_eq!(envelope.code, "IntentionalError");
            assert_eq!(envelope.message, "An error");
            assert!(envelope.details.unwrap().starts_with("Cause: null"));
        }
        other => panic!("expected remote error, got {other:?}"),
    }
}

#[test]
fn async_methods_reply() {
    let b = bridge();
    b.host::<()>("noopAsync", vec![]).unwrap();
    assert_eq!(
        b.host::<String>("echoAsyncString", vec![Value::from("later")])
            .unwrap(),
        "later"
    );
}

#[test]
fn call_flutter_roundtrip() {
    let b = bridge();
    b.host::<()>("callFlutterNoop", vec![]).unwrap();
    assert_eq!(
        b.host::<String>("callFlutterEchoString", vec![Value::from("relay")])
            .unwrap(),
        "relay"
    );
}

#[test]
fn call_flutter_without_other_side_relays_channel_error() {
    let b = bridge();
    setup_flutter_integration_core_api(&b.dispatcher, &b.config, None).unwrap();
    match b.host::<String>("callFlutterEchoString", vec![Value::from("x")]) {
        Err(CallError::Remote(envelope)) => assert_eq!(envelope.code, "CallError"),
        other => panic!("expected remote error, got {other:?}"),
    }
}

#[test]
fn call_flutter_without_client_fails() {
    let messenger = Arc::new(LocalMessenger::new());
    let codec: Arc<dyn ValueCodec> = Arc::new(core_api_codec(CodecConfig::default()).unwrap());
    let dispatcher = Dispatcher::new(messenger.clone(), Arc::clone(&codec));
    let caller = Caller::new(messenger, codec);
    let config = DispatchConfig::default();
    setup_host_integration_core_api(&dispatcher, &config, Some(Arc::new(EchoApi::new()))).unwrap();

    let (tx, rx) = mpsc::channel();
    caller.call(
        &config
            .channel("HostIntegrationCoreApi", "callFlutterNoop")
            .unwrap(),
        vec![],
        move |result: Result<(), CallError>| tx.send(result).unwrap(),
    );
    match rx.recv().unwrap() {
        Err(CallError::Remote(envelope)) => assert_eq!(envelope.code, "no-flutter-api"),
        other => panic!("expected remote error, got {other:?}"),
    }
}

#[test]
fn client_calls_other_side_directly() {
    let b = bridge();
    let client = CoreApiClient::new(b.caller.clone(), &b.config).unwrap();
    let (tx, rx) = mpsc::channel();
    client.echo_map(
        vec![(Value::from("k"), Value::Int(9))],
        move |result| tx.send(result).unwrap(),
    );
    assert_eq!(
        rx.recv().unwrap().unwrap(),
        vec![(Value::from("k"), Value::Int(9))]
    );

    let (tx, rx) = mpsc::channel();
    client.echo_nullable_list(None, move |result| tx.send(result).unwrap());
    assert_eq!(rx.recv().unwrap().unwrap(), None);
}

#[test]
fn unbinding_leaves_channels_unavailable() {
    let b = bridge();
    setup_host_integration_core_api(&b.dispatcher, &b.config, None).unwrap();
    assert!(matches!(
        b.host::<()>("noop", vec![]),
        Err(CallError::ChannelUnavailable(_))
    ));
}

#[test]
fn trivial_api_binds_and_unbinds() {
    let b = bridge();
    let channel = b.config.channel("HostTrivialApi", "noop").unwrap();
    setup_host_trivial_api(&b.dispatcher, &b.config, Some(Arc::new(EchoApi::new()))).unwrap();
    assert!(b.messenger.is_bound(&channel));
    setup_host_trivial_api(&b.dispatcher, &b.config, None).unwrap();
    assert!(!b.messenger.is_bound(&channel));
}

#[test]
fn unknown_record_tag_in_request_is_decode_error() {
    let b = bridge();
    let channel = b.config.channel("HostIntegrationCoreApi", "echoObject").unwrap();
    let (tx, rx) = mpsc::channel();
    // list of one holding custom tag 140, which nothing declared
    b.messenger.send(
        &channel,
        Bytes::from_static(&[12, 1, 140]),
        Box::new(move |reply: Option<Bytes>| tx.send(reply).unwrap()),
    );
    let codec = core_api_codec(CodecConfig::default()).unwrap();
    let reply = codec.decode_message(rx.recv().unwrap().unwrap()).unwrap();
    let items = reply.as_list().unwrap();
    assert_eq!(items.len(), 3);
    assert_eq!(items[0], Value::from("decode-error"));
}
