use types::Error;

use super::{FileOps, Io};

/// Descriptor 0: completed lines from the process's terminal.
pub struct TerminalInput;

impl FileOps for TerminalInput {
    fn name(&self) -> &'static str {
        "stdin"
    }

    fn read(&self, io: &mut Io<'_>, buf: &mut [u8]) -> Result<usize, Error> {
        if buf.is_empty() {
            return Ok(0);
        }
        if !io.terminal.line.is_complete() {
            return Err(Error::WouldBlock);
        }
        Ok(io.terminal.line.take(buf))
    }

    fn write(&self, _io: &mut Io<'_>, _buf: &[u8]) -> Result<usize, Error> {
        Err(Error::Unsupported)
    }

    fn close(&self, _io: &mut Io<'_>) -> Result<(), Error> {
        Err(Error::InvalidDescriptor)
    }
}

/// Descriptor 1: text out to the process's terminal.
pub struct TerminalOutput;

impl FileOps for TerminalOutput {
    fn name(&self) -> &'static str {
        "stdout"
    }

    fn read(&self, _io: &mut Io<'_>, _buf: &mut [u8]) -> Result<usize, Error> {
        Err(Error::Unsupported)
    }

    fn write(&self, io: &mut Io<'_>, buf: &[u8]) -> Result<usize, Error> {
        io.console.write(io.terminal_id, io.window, buf);
        Ok(buf.len())
    }

    fn close(&self, _io: &mut Io<'_>) -> Result<(), Error> {
        Err(Error::InvalidDescriptor)
    }
}
