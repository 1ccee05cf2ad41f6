use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use ctlstream_command::{DeviceIdentity, Dispatcher, DispatcherConfig};
use ctlstream_frame::{CommandHandler, FrameScanner, OutputUnit};
use ctlstream_source::{ByteSource, ReadByte};

use crate::cmd::RunArgs;
use crate::exit::{
    command_error, frame_error, io_error, CliError, CliResult, ABORTED, SUCCESS, USAGE,
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct RunStats {
    data: u64,
    commands: u64,
}

pub fn run(args: RunArgs) -> CliResult<i32> {
    let identity = load_identity(&args)?;
    let config = DispatcherConfig {
        abort_policy: args.abort_policy.into(),
        ..DispatcherConfig::default()
    };

    let mut dispatcher = Dispatcher::with_config(identity, config, std::io::stdout());
    dispatcher.set_executing(args.executing);
    tracing::debug!(
        alias = %dispatcher.identity().alias,
        serial = dispatcher.identity().serial.is_some(),
        abort_policy = ?dispatcher.config().abort_policy,
        executing = dispatcher.is_executing(),
        "dispatcher ready"
    );
    let mut scanner = FrameScanner::new(dispatcher);

    if args.poll {
        let interval = parse_duration(&args.poll_interval)?;
        run_polling(&mut scanner, interval)
    } else {
        let mut source = ByteSource::blocking(std::io::stdin().lock());
        let running = AtomicBool::new(true);
        pump(&mut scanner, &mut source, &mut std::io::stdout(), &running, None)
    }
}

#[cfg(unix)]
fn run_polling<H: CommandHandler>(
    scanner: &mut FrameScanner<H>,
    interval: Duration,
) -> CliResult<i32> {
    let running = std::sync::Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut source = ByteSource::polling(std::io::stdin());
    pump(
        scanner,
        &mut source,
        &mut std::io::stdout(),
        &running,
        Some(interval),
    )
}

#[cfg(not(unix))]
fn run_polling<H: CommandHandler>(
    _scanner: &mut FrameScanner<H>,
    _interval: Duration,
) -> CliResult<i32> {
    Err(CliError::new(
        USAGE,
        "--poll is only supported on unix platforms",
    ))
}

/// Drive the scanner until the source closes, an abort arrives, or `running` drops.
///
/// `idle` is the sleep after an empty poll; `None` treats exhaustion as end of input.
/// Without `idle` the next pull may block, so every data byte is flushed as it is written.
fn pump<H: CommandHandler, R: ReadByte, W: Write>(
    scanner: &mut FrameScanner<H>,
    source: &mut ByteSource<R>,
    out: &mut W,
    running: &AtomicBool,
    idle: Option<Duration>,
) -> CliResult<i32> {
    let mut stats = RunStats::default();

    while running.load(Ordering::SeqCst) {
        let unit = scanner
            .next_unit(source)
            .map_err(|err| frame_error("scan failed", err))?;

        match unit {
            OutputUnit::Data(byte) => {
                out.write_all(&[byte])
                    .map_err(|err| io_error("write failed", err))?;
                if idle.is_none() {
                    flush(out)?;
                }
                stats.data += 1;
            }
            OutputUnit::CommandHandled(opcode) => {
                tracing::info!(%opcode, code = opcode.as_byte(), "handled control command");
                stats.commands += 1;
            }
            OutputUnit::Abort => {
                flush(out)?;
                tracing::info!(
                    data = stats.data,
                    commands = stats.commands,
                    "stream aborted"
                );
                return Ok(ABORTED);
            }
            OutputUnit::SourceExhausted => {
                flush(out)?;
                match idle {
                    Some(interval) if !source.is_closed() => std::thread::sleep(interval),
                    _ => break,
                }
            }
        }
    }

    flush(out)?;
    tracing::info!(
        data = stats.data,
        commands = stats.commands,
        "stream finished"
    );
    Ok(SUCCESS)
}

fn flush(out: &mut impl Write) -> CliResult<()> {
    out.flush().map_err(|err| io_error("flush failed", err))
}

fn load_identity(args: &RunArgs) -> CliResult<DeviceIdentity> {
    let identity = match &args.identity {
        Some(path) => DeviceIdentity::from_file(path)
            .map_err(|err| command_error("identity load failed", err))?,
        None => DeviceIdentity::default(),
    };

    if args.serial_detect {
        Ok(identity.with_detected_serial())
    } else {
        Ok(identity)
    }
}

#[cfg(unix)]
fn install_ctrlc_handler(running: std::sync::Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| {
        CliError::new(
            crate::exit::INTERNAL,
            format!("signal handler setup failed: {err}"),
        )
    })
}

fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "ms")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        _ => Ok(Duration::from_secs(value)),
    }
}
