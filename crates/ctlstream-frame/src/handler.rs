use bytes::Bytes;

use crate::opcode::Opcode;

/// What the scanner should do after a command handler returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// The command ran; nothing else to do.
    Handled,
    /// Feed these bytes back through the scanner ahead of the source.
    Inject(Bytes),
    /// Stop the stream as if the raw abort byte had arrived.
    Halt,
}

/// Executes control commands on behalf of a [`FrameScanner`](crate::FrameScanner).
///
/// Handlers run synchronously, write their complete reply before returning, and must
/// accept every opcode, including [`Opcode::Unknown`].
pub trait CommandHandler {
    /// Run the command identified by `opcode`.
    fn handle(&mut self, opcode: Opcode) -> std::io::Result<Dispatch>;
}

impl<T: CommandHandler + ?Sized> CommandHandler for &mut T {
    fn handle(&mut self, opcode: Opcode) -> std::io::Result<Dispatch> {
        (**self).handle(opcode)
    }
}

impl<T: CommandHandler + ?Sized> CommandHandler for Box<T> {
    fn handle(&mut self, opcode: Opcode) -> std::io::Result<Dispatch> {
        (**self).handle(opcode)
    }
}
