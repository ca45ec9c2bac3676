use std::fs;

use bridgewire_codec::{StandardCodec, ValueCodec};
use serde::Serialize;
use tracing::debug;

use crate::cmd::EncodeArgs;
use crate::exit::{encode_error, io_error, CliError, CliResult, SUCCESS, USAGE};
use crate::json;
use crate::output::{print_json, OutputFormat};

#[derive(Serialize)]
struct EncodeOutput {
    size: usize,
    hex: String,
}

pub fn run(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    let document = resolve_document(&args)?;
    let parsed: serde_json::Value = serde_json::from_str(&document)
        .map_err(|err| CliError::new(USAGE, format!("input is not valid JSON: {err}")))?;
    let value = json::to_value(&parsed)?;

    let codec = StandardCodec::with_config(args.limits.codec_config());
    let message = codec
        .encode_message(&value)
        .map_err(|err| encode_error("encode failed", err))?;
    debug!(kind = value.kind_name(), len = message.len(), "encoded");

    let hex = hex::encode(&message);
    match format {
        OutputFormat::Json => print_json(&EncodeOutput {
            size: message.len(),
            hex,
        }),
        OutputFormat::Table | OutputFormat::Pretty => println!("{hex}"),
    }
    Ok(SUCCESS)
}

fn resolve_document(args: &EncodeArgs) -> CliResult<String> {
    if let Some(json) = &args.json {
        return Ok(json.clone());
    }
    if let Some(path) = &args.file {
        return fs::read_to_string(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err));
    }
    Err(CliError::new(USAGE, "one of --json or --file is required"))
}
