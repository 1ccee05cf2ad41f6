use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use ctlstream_command::DispatcherConfig;
use ctlstream_frame::Opcode;
use serde::Serialize;

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
struct OpcodeOutput {
    name: &'static str,
    code: u8,
    reply: &'static str,
    injects: Option<String>,
}

#[derive(Serialize)]
struct OpcodeTableOutput {
    schema_id: &'static str,
    header: String,
    abort_byte: u8,
    opcodes: Vec<OpcodeOutput>,
}

pub fn print_opcodes(format: OutputFormat) {
    let config = DispatcherConfig::default();
    let opcodes: Vec<OpcodeOutput> = Opcode::KNOWN
        .into_iter()
        .map(|op| OpcodeOutput {
            name: op.name(),
            code: op.as_byte(),
            reply: reply_summary(op),
            injects: match op {
                Opcode::Reset => Some(escape(&config.reset_text)),
                Opcode::RunMain => Some(escape(&config.run_text)),
                _ => None,
            },
        })
        .collect();

    match format {
        OutputFormat::Json => {
            let out = OpcodeTableOutput {
                schema_id: "https://schemas.3leaps.dev/ctlstream/cli/v1/opcodes.schema.json",
                header: hex(&ctlstream_frame::MAGIC_HEADER),
                abort_byte: ctlstream_frame::ABORT_BYTE,
                opcodes,
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
                .set_header(vec!["OPCODE", "CODE", "REPLY", "INJECTS"]);
            for op in &opcodes {
                table.add_row(vec![
                    op.name.to_string(),
                    format!("0x{:02X}", op.code),
                    op.reply.to_string(),
                    op.injects.clone().unwrap_or_default(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for op in &opcodes {
                println!(
                    "{:<12} 0x{:02X}  {}{}",
                    op.name,
                    op.code,
                    op.reply,
                    op.injects
                        .as_deref()
                        .map(|text| format!(" (injects {text})"))
                        .unwrap_or_default()
                );
            }
        }
    }
}

pub fn print_raw(data: &[u8]) -> std::io::Result<()> {
    let mut out = std::io::stdout();
    out.write_all(data)?;
    out.flush()
}

pub fn hex(data: &[u8]) -> String {
    data.iter()
        .map(|byte| format!("{byte:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn reply_summary(op: Opcode) -> &'static str {
    match op {
        Opcode::Version => "firmware version",
        Opcode::Platform => "platform name",
        Opcode::Board => "board name",
        Opcode::SerialNumber => "hardware id, or nothing",
        Opcode::Alias => "device alias",
        Opcode::IsExecuting => "T or F",
        Opcode::Reset | Opcode::RunMain => "OK",
        Opcode::Abort => "FAIL, or halt",
        Opcode::Unknown(_) => "nothing",
    }
}

fn escape(data: &[u8]) -> String {
    data.escape_ascii().to_string()
}
