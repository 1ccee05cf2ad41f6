use bytes::{BufMut, Bytes, BytesMut};

use crate::opcode::Opcode;

/// Magic header length in bytes.
pub const HEADER_LEN: usize = 8;

/// Magic header that precedes every control command.
///
/// Host tooling matches these bytes exactly; changing them breaks wire compatibility.
pub const MAGIC_HEADER: [u8; HEADER_LEN] = [0xF4, 0xF5, 0xF4, 0xF5, 0xF4, 0xF5, 0x00, 0x00];

/// Raw abort byte (ASCII ETX, Ctrl+C). Recognized at every scanner state.
pub const ABORT_BYTE: u8 = 0x03;

/// Total wire size of one command: header + opcode.
pub const COMMAND_SIZE: usize = HEADER_LEN + 1;

/// Encode a control command into the wire format.
///
/// Wire format:
/// ```text
/// ┌──────────────────────────────────────┬──────────┐
/// │ Magic header (8B)                    │ Opcode   │
/// │ F4 F5 F4 F5 F4 F5 00 00              │ (1B)     │
/// └──────────────────────────────────────┴──────────┘
/// ```
pub fn encode_command(opcode: Opcode, dst: &mut BytesMut) {
    dst.reserve(COMMAND_SIZE);
    dst.put_slice(&MAGIC_HEADER);
    dst.put_u8(opcode.as_byte());
}

/// Encode a single control command into a fresh buffer.
pub fn command_bytes(opcode: Opcode) -> Bytes {
    let mut buf = BytesMut::with_capacity(COMMAND_SIZE);
    encode_command(opcode, &mut buf);
    buf.freeze()
}
