//! Tagged binary value codec and request/reply dispatch over named channels.
//!
//! Two runtimes exchange self-describing binary messages on string-named
//! channels. Each message is one encoded value; replies are wrapped in a
//! success or error envelope.
//!
//! # Crate Structure
//!
//! - [`codec`]: value model, base and extended codecs, record marshalling
//! - [`channel`]: messenger contract, channel naming, in-process loopback
//! - [`dispatch`]: envelopes, handler registration, typed callers
//! - [`coreapi`]: reference API surface (behind `coreapi` feature)

/// Re-export codec types.
pub mod codec {
    pub use bridgewire_codec::*;
}

/// Re-export channel types.
pub mod channel {
    pub use bridgewire_channel::*;
}

/// Re-export dispatch types.
pub mod dispatch {
    pub use bridgewire_dispatch::*;
}

/// Re-export the reference API (requires `coreapi` feature).
#[cfg(feature = "coreapi")]
pub mod coreapi {
    pub use bridgewire_coreapi::*;
}
