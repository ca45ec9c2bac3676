use std::sync::{mpsc, Arc, Mutex, PoisonError};
use std::time::Duration;

use bridgewire_channel::{BinaryMessenger, ChannelError, LocalMessenger};
use bridgewire_codec::{FromValue, Value, ValueCodec};
use bridgewire_coreapi::{
    core_api_codec, setup_flutter_integration_core_api, setup_host_integration_core_api,
    AllNullableTypesWrapper, AllTypes, AnEnum, CoreApiClient, EchoApi, HOST_INTEGRATION_CORE_API,
};
use bridgewire_dispatch::{
    CallError, Caller, Completion, DispatchConfig, Dispatcher, Envelope, DECODE_ERROR_CODE,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::{debug, info};

use crate::cmd::SelftestArgs;
use crate::exit::{registry_error, CliError, CliResult, CHECK_FAILED, SUCCESS, USAGE};
use crate::output::{print_json, OutputFormat};

const REPLY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
enum CheckStatus {
    Pass,
    Fail,
}

#[derive(Debug, Serialize)]
struct CheckResult {
    name: &'static str,
    status: CheckStatus,
    detail: String,
}

#[derive(Debug, Serialize)]
struct SelftestOutput {
    namespace: String,
    checks: Vec<CheckResult>,
    overall: &'static str,
}

/// Both runtimes on one loopback messenger.
struct Loopback {
    messenger: Arc<LocalMessenger>,
    codec: Arc<dyn ValueCodec>,
    dispatcher: Dispatcher,
    caller: Caller,
    config: DispatchConfig,
}

type CheckFn = fn(&Loopback) -> Result<String, String>;

const CHECKS: &[(&str, CheckFn)] = &[
    ("noop_null_envelope", check_noop),
    ("echo_string", check_echo_string),
    ("nullable_echo_of_null", check_nullable_null),
    ("error_envelope", check_error_envelope),
    ("all_types_roundtrip", check_all_types),
    ("nested_record", check_nested_record),
    ("async_completion", check_async),
    ("out_of_order_completion", check_out_of_order),
    ("call_other_side", check_call_other_side),
    ("malformed_request", check_malformed_request),
    ("unbound_channel", check_unbound_channel),
];

pub fn run(args: SelftestArgs, format: OutputFormat) -> CliResult<i32> {
    let loopback = Loopback::new(args.namespace)?;

    let checks: Vec<CheckResult> = CHECKS
        .iter()
        .map(|&(name, check)| {
            let (status, detail) = match check(&loopback) {
                Ok(detail) => (CheckStatus::Pass, detail),
                Err(detail) => (CheckStatus::Fail, detail),
            };
            debug!(check = name, ?status, "selftest check finished");
            CheckResult {
                name,
                status,
                detail,
            }
        })
        .collect();

    let has_fail = checks.iter().any(|c| c.status == CheckStatus::Fail);
    let output = SelftestOutput {
        namespace: loopback.config.namespace.clone(),
        checks,
        overall: if has_fail { "fail" } else { "pass" },
    };
    info!(overall = output.overall, "selftest complete");
    print_selftest(&output, format);

    Ok(if has_fail { CHECK_FAILED } else { SUCCESS })
}

impl Loopback {
    fn new(namespace: String) -> CliResult<Self> {
        let messenger = Arc::new(LocalMessenger::new());
        let codec: Arc<dyn ValueCodec> = Arc::new(
            core_api_codec(Default::default())
                .map_err(|err| registry_error("codec setup failed", err))?,
        );
        let dispatcher = Dispatcher::new(messenger.clone(), Arc::clone(&codec));
        let caller = Caller::new(messenger.clone(), Arc::clone(&codec));
        let config = DispatchConfig::with_namespace(namespace);

        let bind_failed =
            |err: ChannelError| CliError::new(USAGE, format!("invalid namespace: {err}"));
        let client = CoreApiClient::new(caller.clone(), &config).map_err(bind_failed)?;
        setup_host_integration_core_api(
            &dispatcher,
            &config,
            Some(Arc::new(EchoApi::with_flutter_api(client))),
        )
        .map_err(bind_failed)?;
        setup_flutter_integration_core_api(&dispatcher, &config, Some(Arc::new(EchoApi::new())))
            .map_err(bind_failed)?;

        Ok(Self {
            messenger,
            codec,
            dispatcher,
            caller,
            config,
        })
    }

    fn host_channel(&self, method: &str) -> Result<String, String> {
        self.config
            .channel(HOST_INTEGRATION_CORE_API, method)
            .map_err(|err| err.to_string())
    }

    fn call<R: FromValue + Send + 'static>(
        &self,
        channel: &str,
        args: Vec<Value>,
    ) -> Result<Result<R, CallError>, String> {
        let (tx, rx) = mpsc::channel();
        self.caller.call(channel, args, move |result| {
            let _ = tx.send(result);
        });
        rx.recv_timeout(REPLY_TIMEOUT)
            .map_err(|_| format!("no reply on {channel}"))
    }

    fn call_host<R: FromValue + Send + 'static>(
        &self,
        method: &str,
        args: Vec<Value>,
    ) -> Result<R, String> {
        self.call(&self.host_channel(method)?, args)?
            .map_err(|err| format!("{method} failed: {err}"))
    }

    /// Send raw bytes and decode whatever comes back.
    fn raw(&self, channel: &str, message: Bytes) -> Result<Option<Value>, String> {
        let (tx, rx) = mpsc::channel();
        self.messenger.send(
            channel,
            message,
            Box::new(move |reply| {
                let _ = tx.send(reply);
            }),
        );
        let reply = rx
            .recv_timeout(REPLY_TIMEOUT)
            .map_err(|_| format!("no reply on {channel}"))?;
        reply
            .map(|bytes| self.codec.decode_message(bytes))
            .transpose()
            .map_err(|err| format!("reply did not decode: {err}"))
    }
}

fn expect_eq<T: PartialEq + std::fmt::Debug>(got: T, want: T) -> Result<String, String> {
    if got == want {
        Ok(format!("{got:?}"))
    } else {
        Err(format!("expected {want:?}, got {got:?}"))
    }
}

fn check_noop(lb: &Loopback) -> Result<String, String> {
    let message = lb
        .codec
        .encode_message(&Value::Null)
        .map_err(|err| err.to_string())?;
    let reply = lb.raw(&lb.host_channel("noop")?, message)?;
    expect_eq(reply, Some(Value::List(vec![Value::Null])))
}

fn check_echo_string(lb: &Loopback) -> Result<String, String> {
    let echoed: String = lb.call_host("echoString", vec![Value::from("hello")])?;
    expect_eq(echoed.as_str(), "hello")
}

fn check_nullable_null(lb: &Loopback) -> Result<String, String> {
    let echoed: Option<i64> = lb.call_host("echoNullableInt", vec![Value::Null])?;
    expect_eq(echoed, None)
}

fn check_error_envelope(lb: &Loopback) -> Result<String, String> {
    match lb.call::<()>(&lb.host_channel("throwError")?, vec![])? {
        Err(CallError::Remote(envelope)) => {
            expect_eq(envelope.code.as_str(), "IntentionalError")?;
            expect_eq(envelope.message.as_str(), "An error")
        }
        other => Err(format!("expected error envelope, got {other:?}")),
    }
}

fn check_all_types(lb: &Loopback) -> Result<String, String> {
    let everything = AllTypes {
        a_bool: true,
        an_int: -1,
        a_double: 0.25,
        a_string: "s".to_string(),
        a_byte_array: Bytes::from_static(&[7]),
        a4_byte_array: vec![1],
        a8_byte_array: vec![2],
        a_float_array: vec![3.0],
        a_list: vec![Value::Null],
        a_map: vec![(Value::from("k"), Value::Int(1))],
        an_enum: AnEnum::Two,
    };
    let echoed: AllTypes = lb.call_host("echoAllTypes", vec![everything.clone().into()])?;
    expect_eq(echoed, everything).map(|_| "AllTypes echoed intact".to_string())
}

fn check_nested_record(lb: &Loopback) -> Result<String, String> {
    let wrapper: AllNullableTypesWrapper =
        lb.call_host("createNestedNullableString", vec![Value::from("nested")])?;
    let extracted: Option<String> =
        lb.call_host("extractNestedNullableString", vec![wrapper.into()])?;
    expect_eq(extracted.as_deref(), Some("nested"))
}

fn check_async(lb: &Loopback) -> Result<String, String> {
    lb.call_host::<()>("noopAsync", vec![])?;
    let echoed: String = lb.call_host("echoAsyncString", vec![Value::from("later")])?;
    expect_eq(echoed.as_str(), "later")
}

/// Two pending calls on two channels, completed in reverse order.
fn check_out_of_order(lb: &Loopback) -> Result<String, String> {
    let parked: Arc<Mutex<Vec<Completion<String>>>> = Arc::default();
    let channels = [lb.host_channel("selftestFirst")?, lb.host_channel("selftestSecond")?];
    for channel in &channels {
        let parked = Arc::clone(&parked);
        lb.dispatcher
            .register_async(channel, move |(): (), done: Completion<String>| {
                parked
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(done);
                Ok(())
            });
    }

    let (tx, rx) = mpsc::channel();
    for channel in &channels {
        let tx = tx.clone();
        lb.caller
            .call(channel, vec![], move |result: Result<String, CallError>| {
                let _ = tx.send(result);
            });
    }

    let mut pending = std::mem::take(&mut *parked.lock().unwrap_or_else(PoisonError::into_inner));
    for channel in &channels {
        lb.dispatcher.unregister(channel);
    }
    if pending.len() != 2 {
        return Err(format!("expected 2 pending calls, found {}", pending.len()));
    }
    while let Some(done) = pending.pop() {
        let reply = done.channel().to_string();
        done.success(reply);
    }

    let mut replies = Vec::new();
    for _ in 0..2 {
        let result = rx
            .recv_timeout(REPLY_TIMEOUT)
            .map_err(|_| "pending call never replied".to_string())?;
        replies.push(result.map_err(|err| err.to_string())?);
    }
    expect_eq(replies, vec![channels[1].clone(), channels[0].clone()])
        .map(|_| "both calls replied in completion order".to_string())
}

fn check_call_other_side(lb: &Loopback) -> Result<String, String> {
    lb.call_host::<()>("callFlutterNoop", vec![])?;
    let echoed: String = lb.call_host("callFlutterEchoString", vec![Value::from("relay")])?;
    expect_eq(echoed.as_str(), "relay")
}

fn check_malformed_request(lb: &Loopback) -> Result<String, String> {
    // tag 5 is reserved and never written
    let reply = lb.raw(&lb.host_channel("echoInt")?, Bytes::from_static(&[5, 0]))?;
    let reply = reply.ok_or_else(|| "empty reply".to_string())?;
    match Envelope::from_value(reply) {
        Ok(Envelope::Error(envelope)) => expect_eq(envelope.code.as_str(), DECODE_ERROR_CODE),
        other => Err(format!("expected decode-error envelope, got {other:?}")),
    }
}

fn check_unbound_channel(lb: &Loopback) -> Result<String, String> {
    match lb.call::<()>(&lb.host_channel("notBound")?, vec![])? {
        Err(CallError::ChannelUnavailable(channel)) => Ok(format!("{channel} unavailable")),
        other => Err(format!("expected channel unavailable, got {other:?}")),
    }
}

fn print_selftest(output: &SelftestOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(output),
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("bridgewire selftest ({})\n", output.namespace);
            for c in &output.checks {
                println!("  [{:>4}] {:<24} {}", status_text(c.status), c.name, c.detail);
            }
            if output.overall == "pass" {
                println!("\n  Result: all checks passed");
            } else {
                println!("\n  Result: one or more checks failed");
            }
        }
    }
}

fn status_text(status: CheckStatus) -> &'static str {
    match status {
        CheckStatus::Pass => "PASS",
        CheckStatus::Fail => "FAIL",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_check_passes_on_loopback() {
        let loopback = Loopback::new("dev.bridgewire".to_string()).unwrap();
        for (name, check) in CHECKS {
            assert!(check(&loopback).is_ok(), "{name}: {:?}", check(&loopback));
        }
    }

    #[test]
    fn bad_namespace_is_usage_error() {
        let err = Loopback::new("bad..ns".to_string()).err().unwrap();
        assert_eq!(err.code, USAGE);
    }

    #[test]
    fn output_has_overall_status() {
        let output = SelftestOutput {
            namespace: "x".to_string(),
            checks: vec![CheckResult {
                name: "x",
                status: CheckStatus::Pass,
                detail: "ok".to_string(),
            }],
            overall: "pass",
        };
        let json = serde_json::to_string(&output).unwrap();
        assert!(json.contains("\"overall\":\"pass\""));
        assert!(json.contains("\"status\":\"pass\""));
    }
}
