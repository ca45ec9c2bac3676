//! Reference API surface for bridgewire.
//!
//! Exercises every value kind the codec carries: the record types, the host
//! APIs with their channel bindings, the API exposed by the other runtime
//! along with a typed client for it, and an echoing implementation used
//! by integration tests and the CLI self-test.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use bridgewire_channel::LocalMessenger;
//! use bridgewire_codec::CodecConfig;
//! use bridgewire_coreapi::{core_api_codec, setup_host_integration_core_api, EchoApi};
//! use bridgewire_dispatch::{DispatchConfig, Dispatcher};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let messenger = Arc::new(LocalMessenger::new());
//! let codec = Arc::new(core_api_codec(CodecConfig::default())?);
//! let dispatcher = Dispatcher::new(messenger, codec);
//! setup_host_integration_core_api(
//!     &dispatcher,
//!     &DispatchConfig::default(),
//!     Some(Arc::new(EchoApi::new())),
//! )?;
//! # Ok(())
//! # }
//! ```

pub mod echo;
pub mod flutter;
pub mod host;
pub mod types;

pub use echo::{EchoApi, IntentionalError};
pub use flutter::{
    setup_flutter_integration_core_api, CoreApiClient, FlutterIntegrationCoreApi,
    FLUTTER_INTEGRATION_CORE_API, FLUTTER_INTEGRATION_CORE_API_METHODS,
};
pub use host::{
    setup_host_integration_core_api, setup_host_trivial_api, HostIntegrationCoreApi,
    HostTrivialApi, HOST_INTEGRATION_CORE_API, HOST_INTEGRATION_CORE_API_METHODS,
    HOST_TRIVIAL_API,
};
pub use types::{core_api_codec, AllNullableTypes, AllNullableTypesWrapper, AllTypes, AnEnum};
