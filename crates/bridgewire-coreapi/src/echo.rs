//! Reference implementation that answers every core API call by echoing.

use bridgewire_codec::Value;
use bridgewire_dispatch::{Completion, HandlerError};
use bytes::Bytes;

use crate::flutter::{CoreApiClient, FlutterIntegrationCoreApi};
use crate::host::{HostIntegrationCoreApi, HostTrivialApi};
use crate::types::{AllNullableTypes, AllNullableTypesWrapper, AllTypes};

/// Error raised on purpose by `throwError`.
#[derive(Debug, thiserror::Error)]
#[error("An error")]
pub struct IntentionalError;

/// Echoes every argument back. `callFlutter*` methods forward to the
/// configured client.
#[derive(Debug, Clone, Default)]
pub struct EchoApi {
    flutter: Option<CoreApiClient>,
}

impl EchoApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_flutter_api(flutter: CoreApiClient) -> Self {
        Self {
            flutter: Some(flutter),
        }
    }

    fn flutter(&self) -> Result<&CoreApiClient, HandlerError> {
        self.flutter.as_ref().ok_or_else(|| {
            HandlerError::new("no-flutter-api", "no client configured for the other side")
        })
    }
}

impl HostIntegrationCoreApi for EchoApi {
    fn noop(&self) -> Result<(), HandlerError> {
        Ok(())
    }

    fn echo_all_types(&self, everything: AllTypes) -> Result<AllTypes, HandlerError> {
        Ok(everything)
    }

    fn echo_all_nullable_types(
        &self,
        everything: Option<AllNullableTypes>,
    ) -> Result<Option<AllNullableTypes>, HandlerError> {
        Ok(everything)
    }

    fn throw_error(&self) -> Result<(), HandlerError> {
        Err(IntentionalError.into())
    }

    fn echo_int(&self, an_int: i64) -> Result<i64, HandlerError> {
        Ok(an_int)
    }

    fn echo_double(&self, a_double: f64) -> Result<f64, HandlerError> {
        Ok(a_double)
    }

    fn echo_bool(&self, a_bool: bool) -> Result<bool, HandlerError> {
        Ok(a_bool)
    }

    fn echo_string(&self, a_string: String) -> Result<String, HandlerError> {
        Ok(a_string)
    }

    fn echo_uint8_list(&self, a_uint8_list: Bytes) -> Result<Bytes, HandlerError> {
        Ok(a_uint8_list)
    }

    fn echo_object(&self, an_object: Value) -> Result<Value, HandlerError> {
        Ok(an_object)
    }

    fn extract_nested_nullable_string(
        &self,
        wrapper: AllNullableTypesWrapper,
    ) -> Result<Option<String>, HandlerError> {
        Ok(wrapper.values.a_nullable_string)
    }

    fn create_nested_nullable_string(
        &self,
        nullable_string: Option<String>,
    ) -> Result<AllNullableTypesWrapper, HandlerError> {
        Ok(AllNullableTypesWrapper {
            values: AllNullableTypes {
                a_nullable_string: nullable_string,
                ..Default::default()
            },
        })
    }

    fn send_multiple_nullable_types(
        &self,
        a_nullable_bool: Option<bool>,
        a_nullable_int: Option<i64>,
        a_nullable_string: Option<String>,
    ) -> Result<AllNullableTypes, HandlerError> {
        Ok(AllNullableTypes {
            a_nullable_bool,
            a_nullable_int,
            a_nullable_string,
            ..Default::default()
        })
    }

    fn echo_nullable_int(&self, a_nullable_int: Option<i64>) -> Result<Option<i64>, HandlerError> {
        Ok(a_nullable_int)
    }

    fn echo_nullable_double(
        &self,
        a_nullable_double: Option<f64>,
    ) -> Result<Option<f64>, HandlerError> {
        Ok(a_nullable_double)
    }

    fn echo_nullable_bool(
        &self,
        a_nullable_bool: Option<bool>,
    ) -> Result<Option<bool>, HandlerError> {
        Ok(a_nullable_bool)
    }

    fn echo_nullable_string(
        &self,
        a_nullable_string: Option<String>,
    ) -> Result<Option<String>, HandlerError> {
        Ok(a_nullable_string)
    }

    fn echo_nullable_uint8_list(
        &self,
        a_nullable_uint8_list: Option<Bytes>,
    ) -> Result<Option<Bytes>, HandlerError> {
        Ok(a_nullable_uint8_list)
    }

    fn echo_nullable_object(
        &self,
        a_nullable_object: Option<Value>,
    ) -> Result<Option<Value>, HandlerError> {
        Ok(a_nullable_object)
    }

    fn noop_async(&self, done: Completion<()>) -> Result<(), HandlerError> {
        done.success(());
        Ok(())
    }

    fn echo_async_string(
        &self,
        a_string: String,
        done: Completion<String>,
    ) -> Result<(), HandlerError> {
        done.success(a_string);
        Ok(())
    }

    fn call_flutter_noop(&self, done: Completion<()>) -> Result<(), HandlerError> {
        self.flutter()?
            .noop(move |result| done.complete(result.map_err(HandlerError::relay)));
        Ok(())
    }

    fn call_flutter_echo_string(
        &self,
        a_string: String,
        done: Completion<String>,
    ) -> Result<(), HandlerError> {
        self.flutter()?.echo_string(a_string, move |result| {
            done.complete(result.map_err(HandlerError::relay))
        });
        Ok(())
    }
}

impl HostTrivialApi for EchoApi {
    fn noop(&self) -> Result<(), HandlerError> {
        Ok(())
    }
}

impl FlutterIntegrationCoreApi for EchoApi {
    fn noop(&self) -> Result<(), HandlerError> {
        Ok(())
    }

    fn echo_all_types(&self, everything: AllTypes) -> Result<AllTypes, HandlerError> {
        Ok(everything)
    }

    fn echo_all_nullable_types(
        &self,
        everything: AllNullableTypes,
    ) -> Result<AllNullableTypes, HandlerError> {
        Ok(everything)
    }

    fn send_multiple_nullable_types(
        &self,
        a_nullable_bool: Option<bool>,
        a_nullable_int: Option<i64>,
        a_nullable_string: Option<String>,
    ) -> Result<AllNullableTypes, HandlerError> {
        HostIntegrationCoreApi::send_multiple_nullable_types(
            self,
            a_nullable_bool,
            a_nullable_int,
            a_nullable_string,
        )
    }

    fn echo_bool(&self, a_bool: bool) -> Result<bool, HandlerError> {
        Ok(a_bool)
    }

    fn echo_int(&self, an_int: i64) -> Result<i64, HandlerError> {
        Ok(an_int)
    }

    fn echo_double(&self, a_double: f64) -> Result<f64, HandlerError> {
        Ok(a_double)
    }

    fn echo_string(&self, a_string: String) -> Result<String, HandlerError> {
        Ok(a_string)
    }

    fn echo_uint8_list(&self, a_list: Bytes) -> Result<Bytes, HandlerError> {
        Ok(a_list)
    }

    fn echo_list(&self, a_list: Vec<Value>) -> Result<Vec<Value>, HandlerError> {
        Ok(a_list)
    }

    fn echo_map(&self, a_map: Vec<(Value, Value)>) -> Result<Vec<(Value, Value)>, HandlerError> {
        Ok(a_map)
    }

    fn echo_nullable_bool(&self, a_bool: Option<bool>) -> Result<Option<bool>, HandlerError> {
        Ok(a_bool)
    }

    fn echo_nullable_int(&self, an_int: Option<i64>) -> Result<Option<i64>, HandlerError> {
        Ok(an_int)
    }

    fn echo_nullable_double(&self, a_double: Option<f64>) -> Result<Option<f64>, HandlerError> {
        Ok(a_double)
    }

    fn echo_nullable_string(
        &self,
        a_string: Option<String>,
    ) -> Result<Option<String>, HandlerError> {
        Ok(a_string)
    }

    fn echo_nullable_uint8_list(
        &self,
        a_list: Option<Bytes>,
    ) -> Result<Option<Bytes>, HandlerError> {
        Ok(a_list)
    }

    fn echo_nullable_list(
        &self,
        a_list: Option<Vec<Value>>,
    ) -> Result<Option<Vec<Value>>, HandlerError> {
        Ok(a_list)
    }

    fn echo_nullable_map(
        &self,
        a_map: Option<Vec<(Value, Value)>>,
    ) -> Result<Option<Vec<(Value, Value)>>, HandlerError> {
        Ok(a_map)
    }
}
