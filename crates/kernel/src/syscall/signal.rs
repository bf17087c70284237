use log::debug;
use rofs::FileSystem;
use types::Error;

use crate::hw::Hardware;
use crate::kernel::Kernel;
use crate::terminal::Console;

// Signals are not delivered; both calls exist so the numbers are reserved.
impl<H: Hardware, F: FileSystem, C: Console> Kernel<H, F, C> {
    pub fn set_handler(&mut self, signum: u32, handler: u32) -> Result<(), Error> {
        debug!("set_handler: signal {} -> {:#010x} refused", signum, handler);
        Err(Error::Unsupported)
    }

    pub fn sigreturn(&mut self) -> Result<(), Error> {
        Err(Error::Unsupported)
    }
}
