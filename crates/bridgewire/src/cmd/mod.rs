use clap::{Args, Subcommand};
use std::path::PathBuf;

use bridgewire_channel::DEFAULT_NAMESPACE;
use bridgewire_codec::{CodecConfig, DEFAULT_MAX_DEPTH, DEFAULT_MAX_MESSAGE_SIZE};

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod decode;
pub mod encode;
pub mod selftest;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Encode a JSON document as a wire message and print it as hex.
    Encode(EncodeArgs),
    /// Decode a wire message and print the value.
    Decode(DecodeArgs),
    /// Bind the reference API on a loopback messenger and exercise it.
    Selftest(SelftestArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Encode(args) => encode::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::Selftest(args) => selftest::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// Codec limits shared by every command that touches the wire.
#[derive(Args, Debug, Clone, Copy)]
pub struct LimitArgs {
    /// Largest message accepted or produced, in bytes.
    #[arg(long, default_value_t = DEFAULT_MAX_MESSAGE_SIZE, env = "BRIDGEWIRE_MAX_MESSAGE_SIZE")]
    pub max_message_size: usize,
    /// Deepest container nesting accepted or produced.
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,
}

impl LimitArgs {
    pub fn codec_config(self) -> CodecConfig {
        CodecConfig {
            max_message_size: self.max_message_size,
            max_depth: self.max_depth,
        }
    }
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// JSON document to encode.
    #[arg(long, conflicts_with = "file")]
    pub json: Option<String>,
    /// Read the JSON document from a file.
    #[arg(long, conflicts_with = "json")]
    pub file: Option<PathBuf>,
    #[command(flatten)]
    pub limits: LimitArgs,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Hex-encoded message.
    #[arg(conflicts_with = "file")]
    pub hex: Option<String>,
    /// Read the raw message bytes from a file.
    #[arg(long)]
    pub file: Option<PathBuf>,
    /// Also accept the reference API record tags (128 and up).
    #[arg(long)]
    pub core_api: bool,
    #[command(flatten)]
    pub limits: LimitArgs,
}

#[derive(Args, Debug)]
pub struct SelftestArgs {
    /// Channel namespace to bind the reference API under.
    #[arg(long, default_value = DEFAULT_NAMESPACE)]
    pub namespace: String,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
