use bytes::BytesMut;
use ctlstream_frame::{encode_command, Opcode, ABORT_BYTE, COMMAND_SIZE};

use crate::cmd::EncodeArgs;
use crate::exit::{io_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{hex, print_raw};

pub fn run(args: EncodeArgs) -> CliResult<i32> {
    let opcodes = args
        .opcodes
        .iter()
        .map(|token| parse_opcode(token))
        .collect::<CliResult<Vec<_>>>()?;

    let data = args.data.as_deref().unwrap_or_default().as_bytes();
    let mut wire = BytesMut::with_capacity(data.len() + opcodes.len() * COMMAND_SIZE);
    wire.extend_from_slice(data);
    for opcode in opcodes {
        if !opcode.is_known() {
            tracing::warn!(%opcode, "encoding opcode outside the known table");
        }
        encode_command(opcode, &mut wire);
    }

    tracing::debug!(size = wire.len(), "encoded control commands");

    if args.hex {
        println!("{}", hex(&wire));
    } else {
        print_raw(&wire).map_err(|err| io_error("write failed", err))?;
    }

    Ok(SUCCESS)
}

fn parse_opcode(token: &str) -> CliResult<Opcode> {
    if let Some(opcode) = Opcode::from_name(token) {
        return Ok(opcode);
    }

    let token = token.trim();
    let byte = match token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
    {
        Some(digits) => u8::from_str_radix(digits, 16),
        None => token.parse::<u8>(),
    }
    .map_err(|_| CliError::new(USAGE, format!("unknown opcode: {token}")))?;

    if byte == ABORT_BYTE {
        return Err(CliError::new(
            USAGE,
            format!("0x{ABORT_BYTE:02X} is the abort byte and cannot be sent as an opcode"),
        ));
    }

    Ok(Opcode::from_byte(byte))
}
