use rofs::FileSystem;
use types::{Error, in_user_region};

use crate::hw::Hardware;
use crate::kernel::Kernel;
use crate::terminal::Console;

impl<H: Hardware, F: FileSystem, C: Console> Kernel<H, F, C> {
    /// Copies the argument tail, NUL-terminated, to `dest` in user memory.
    ///
    /// With no arguments only `dest[0]` is written (as NUL) before failing.
    /// A buffer too short for the terminator is left untouched.
    pub fn getargs(&mut self, dest: u32, len: u32) -> Result<(), Error> {
        let slot = self.current_slot()?;
        if len == 0 || !in_user_region(dest, len) {
            return Err(Error::InvalidArgument);
        }

        let args = self.procs.get(slot).args;
        if args.is_empty() {
            self.spaces.copy_to_user(&mut self.hw, dest, &[0])?;
            return Err(Error::InvalidArgument);
        }
        let bytes = args.as_bytes();
        if bytes.len() + 1 > len as usize {
            return Err(Error::InvalidArgument);
        }
        self.spaces.copy_to_user(&mut self.hw, dest, bytes)?;
        self.spaces
            .copy_to_user(&mut self.hw, dest + bytes.len() as u32, &[0])
    }
}
