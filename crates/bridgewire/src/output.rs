use std::io::IsTerminal;

use bridgewire_codec::Value;
use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

use crate::json;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct DecodedOutput<'a> {
    size: usize,
    kind: &'a str,
    value: serde_json::Value,
}

/// Print a decoded message. `size` is the encoded length in bytes.
pub fn print_value(value: &Value, size: usize, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = DecodedOutput {
                size,
                kind: value.kind_name(),
                value: json::from_value(value),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["INDEX", "KIND", "VALUE"]);
            match value {
                Value::List(items) => {
                    for (index, item) in items.iter().enumerate() {
                        table.add_row(row(&index.to_string(), item));
                    }
                }
                Value::Record(record) => {
                    for (index, field) in record.fields.iter().enumerate() {
                        table.add_row(row(&format!("{}.{index}", record.name), field));
                    }
                }
                other => {
                    table.add_row(row("-", other));
                }
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "kind={} size={} value={}",
                value.kind_name(),
                size,
                json::from_value(value)
            );
        }
    }
}

fn row(index: &str, value: &Value) -> Vec<String> {
    vec![
        index.to_string(),
        value.kind_name().to_string(),
        json::from_value(value).to_string(),
    ]
}

/// Print any serializable report.
pub fn print_json<T: Serialize>(report: &T) {
    println!(
        "{}",
        serde_json::to_string(report).unwrap_or_else(|_| "{}".to_string())
    );
}
