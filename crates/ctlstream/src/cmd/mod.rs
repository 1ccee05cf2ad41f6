use clap::{Args, Subcommand, ValueEnum};
use std::path::PathBuf;

use ctlstream_command::AbortPolicy;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod encode;
pub mod opcodes;
pub mod run;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scan stdin, answer control commands, and pass data through to stdout.
    Run(RunArgs),
    /// Write wire-exact control commands to stdout.
    Encode(EncodeArgs),
    /// List the opcode table.
    Opcodes(OpcodesArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Run(args) => run::run(args),
        Command::Encode(args) => encode::run(args),
        Command::Opcodes(args) => opcodes::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum AbortPolicyArg {
    /// Reply FAIL and keep scanning.
    Report,
    /// Stop the stream like the raw abort byte.
    Halt,
}

impl From<AbortPolicyArg> for AbortPolicy {
    fn from(arg: AbortPolicyArg) -> Self {
        match arg {
            AbortPolicyArg::Report => AbortPolicy::Report,
            AbortPolicyArg::Halt => AbortPolicy::Halt,
        }
    }
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Poll stdin with a zero timeout instead of blocking on each byte.
    #[arg(long)]
    pub poll: bool,
    /// Sleep between empty polls (e.g. 10ms, 1s).
    #[arg(long, default_value = "10ms")]
    pub poll_interval: String,
    /// How the abort opcode is handled.
    #[arg(long, value_enum, default_value = "report")]
    pub abort_policy: AbortPolicyArg,
    /// Device identity JSON file.
    #[arg(long, value_name = "FILE", env = "CTLSTREAM_IDENTITY")]
    pub identity: Option<PathBuf>,
    /// Report the host machine id as the serial number when none is configured.
    #[arg(long)]
    pub serial_detect: bool,
    /// Report the device as executing a program.
    #[arg(long)]
    pub executing: bool,
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Opcodes to encode, by name (version, reset, ...) or byte value (0x01, 7).
    #[arg(required = true)]
    pub opcodes: Vec<String>,
    /// Plain data written before the commands.
    #[arg(long)]
    pub data: Option<String>,
    /// Print space-separated hex instead of raw bytes.
    #[arg(long)]
    pub hex: bool,
}

#[derive(Args, Debug, Default)]
pub struct OpcodesArgs {}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
