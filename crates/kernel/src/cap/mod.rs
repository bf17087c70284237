//! Per-kind operation tables bound into file descriptors.
//!
//! A descriptor stores a `&'static dyn FileOps` chosen once at open time;
//! every later read, write and close dispatches through it without looking at
//! the file kind again.

mod file;
mod rtc;
mod terminal;

pub use file::{DirectoryOps, RegularFileOps};
pub use rtc::RtcOps;
pub use terminal::{TerminalInput, TerminalOutput};

use rofs::{FileSystem, FileType};
use types::{Error, TerminalId};

use crate::mmu::DisplayWindow;
use crate::task::PeriodicTimer;
use crate::terminal::{Console, TerminalSlot};

/// State an operation may touch, borrowed from the kernel for one call.
pub struct Io<'a> {
    pub fs: &'a dyn FileSystem,
    pub console: &'a mut dyn Console,
    pub terminal_id: TerminalId,
    pub terminal: &'a mut TerminalSlot,
    /// Where the text-buffer page points while the caller runs.
    pub window: DisplayWindow,
    /// The calling process's logical clock.
    pub timer: &'a mut Option<PeriodicTimer>,
    /// The descriptor's backing id.
    pub backing: &'a mut u32,
    /// The descriptor's position before this call.
    pub cursor: u32,
}

pub trait FileOps: Sync {
    fn name(&self) -> &'static str;

    fn open(&self, _io: &mut Io<'_>) -> Result<(), Error> {
        Ok(())
    }

    fn read(&self, io: &mut Io<'_>, buf: &mut [u8]) -> Result<usize, Error>;

    fn write(&self, io: &mut Io<'_>, buf: &[u8]) -> Result<usize, Error>;

    fn close(&self, _io: &mut Io<'_>) -> Result<(), Error> {
        Ok(())
    }
}

/// Bound into unused descriptors.
pub struct NullOps;

impl FileOps for NullOps {
    fn name(&self) -> &'static str {
        "null"
    }

    fn open(&self, _io: &mut Io<'_>) -> Result<(), Error> {
        Err(Error::InvalidDescriptor)
    }

    fn read(&self, _io: &mut Io<'_>, _buf: &mut [u8]) -> Result<usize, Error> {
        Err(Error::InvalidDescriptor)
    }

    fn write(&self, _io: &mut Io<'_>, _buf: &[u8]) -> Result<usize, Error> {
        Err(Error::InvalidDescriptor)
    }

    fn close(&self, _io: &mut Io<'_>) -> Result<(), Error> {
        Err(Error::InvalidDescriptor)
    }
}

pub static NULL: NullOps = NullOps;
pub static STDIN: TerminalInput = TerminalInput;
pub static STDOUT: TerminalOutput = TerminalOutput;
pub static REGULAR: RegularFileOps = RegularFileOps;
pub static DIRECTORY: DirectoryOps = DirectoryOps;
pub static RTC: RtcOps = RtcOps;

/// Table for a directory entry's kind.
pub fn for_kind(kind: FileType) -> &'static dyn FileOps {
    match kind {
        FileType::Rtc => &RTC,
        FileType::Directory => &DIRECTORY,
        FileType::Regular => &REGULAR,
    }
}
