//! Control command opcodes.
//!
//! Opcode byte values are a wire contract with host tooling and must never be renumbered.
//! `0x03` is not an opcode: it is the abort byte and is recognized before any opcode.

/// Report the firmware version.
pub const VERSION: u8 = 0x01;

/// Report the platform name.
pub const PLATFORM: u8 = 0x02;

/// Report the board name.
pub const BOARD: u8 = 0x04;

/// Report the hardware serial number, when the device has one.
pub const SERIAL_NUMBER: u8 = 0x05;

/// Report the device alias.
pub const ALIAS: u8 = 0x06;

/// Report whether a program is executing.
pub const IS_EXECUTING: u8 = 0x07;

/// Acknowledge and inject a reset command.
pub const RESET: u8 = 0x08;

/// Command-level abort.
pub const ABORT: u8 = 0x09;

/// Acknowledge and inject a run-main command.
pub const RUN_MAIN: u8 = 0x0A;

/// A one-byte control command identifier, sent right after a confirmed header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    Version,
    Platform,
    Board,
    SerialNumber,
    Alias,
    IsExecuting,
    Reset,
    Abort,
    RunMain,
    /// Any byte outside the known table.
    Unknown(u8),
}

impl Opcode {
    /// Every known opcode, in wire-value order.
    pub const KNOWN: [Opcode; 9] = [
        Opcode::Version,
        Opcode::Platform,
        Opcode::Board,
        Opcode::SerialNumber,
        Opcode::Alias,
        Opcode::IsExecuting,
        Opcode::Reset,
        Opcode::Abort,
        Opcode::RunMain,
    ];

    /// Decode an opcode byte. Never fails; unrecognized bytes become [`Opcode::Unknown`].
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            VERSION => Opcode::Version,
            PLATFORM => Opcode::Platform,
            BOARD => Opcode::Board,
            SERIAL_NUMBER => Opcode::SerialNumber,
            ALIAS => Opcode::Alias,
            IS_EXECUTING => Opcode::IsExecuting,
            RESET => Opcode::Reset,
            ABORT => Opcode::Abort,
            RUN_MAIN => Opcode::RunMain,
            other => Opcode::Unknown(other),
        }
    }

    /// The wire byte for this opcode.
    pub fn as_byte(self) -> u8 {
        match self {
            Opcode::Version => VERSION,
            Opcode::Platform => PLATFORM,
            Opcode::Board => BOARD,
            Opcode::SerialNumber => SERIAL_NUMBER,
            Opcode::Alias => ALIAS,
            Opcode::IsExecuting => IS_EXECUTING,
            Opcode::Reset => RESET,
            Opcode::Abort => ABORT,
            Opcode::RunMain => RUN_MAIN,
            Opcode::Unknown(byte) => byte,
        }
    }

    /// Human-readable name, as accepted by [`Opcode::from_name`].
    pub fn name(self) -> &'static str {
        match self {
            Opcode::Version => "version",
            Opcode::Platform => "platform",
            Opcode::Board => "board",
            Opcode::SerialNumber => "serial",
            Opcode::Alias => "alias",
            Opcode::IsExecuting => "is-executing",
            Opcode::Reset => "reset",
            Opcode::Abort => "abort",
            Opcode::RunMain => "run-main",
            Opcode::Unknown(_) => "unknown",
        }
    }

    /// Parse a known opcode from its name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::KNOWN
            .into_iter()
            .find(|op| op.name().eq_ignore_ascii_case(name))
    }

    /// Returns true if this opcode is in the known table.
    pub fn is_known(self) -> bool {
        !matches!(self, Opcode::Unknown(_))
    }
}

impl From<u8> for Opcode {
    fn from(byte: u8) -> Self {
        Opcode::from_byte(byte)
    }
}

impl From<Opcode> for u8 {
    fn from(opcode: Opcode) -> Self {
        opcode.as_byte()
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Opcode::Unknown(byte) => write!(f, "unknown(0x{byte:02X})"),
            known => f.write_str(known.name()),
        }
    }
}
