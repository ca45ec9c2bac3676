use std::fs;

use bridgewire_codec::{StandardCodec, ValueCodec};
use bridgewire_coreapi::core_api_codec;
use bytes::Bytes;
use tracing::debug;

use crate::cmd::DecodeArgs;
use crate::exit::{decode_error, io_error, registry_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_value, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let message = resolve_message(&args)?;
    let size = message.len();
    let config = args.limits.codec_config();

    let codec: Box<dyn ValueCodec> = if args.core_api {
        Box::new(core_api_codec(config).map_err(|err| registry_error("codec setup failed", err))?)
    } else {
        Box::new(StandardCodec::with_config(config))
    };
    let value = codec
        .decode_message(message)
        .map_err(|err| decode_error("decode failed", err))?;
    debug!(kind = value.kind_name(), len = size, "decoded");

    print_value(&value, size, format);
    Ok(SUCCESS)
}

fn resolve_message(args: &DecodeArgs) -> CliResult<Bytes> {
    if let Some(text) = &args.hex {
        let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        return hex::decode(compact)
            .map(Bytes::from)
            .map_err(|err| CliError::new(USAGE, format!("message is not valid hex: {err}")));
    }
    if let Some(path) = &args.file {
        return fs::read(path)
            .map(Bytes::from)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err));
    }
    Err(CliError::new(USAGE, "a hex message or --file is required"))
}
