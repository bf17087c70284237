use log::debug;
use rofs::FileSystem;
use types::{Error, VIDMAP_VA, in_user_region};

use crate::hw::Hardware;
use crate::kernel::Kernel;
use crate::terminal::Console;

impl<H: Hardware, F: FileSystem, C: Console> Kernel<H, F, C> {
    /// Exposes the caller's terminal text at `VIDMAP_VA` and stores that
    /// address at `out`.
    ///
    /// The page follows the terminal: it shows the screen while the terminal
    /// is in front and its off-screen copy otherwise.
    pub fn vidmap(&mut self, out: u32) -> Result<u32, Error> {
        let slot = self.current_slot()?;
        if !in_user_region(out, 4) {
            return Err(Error::InvalidArgument);
        }

        let window = self.window_for(self.procs.get(slot).terminal);
        self.procs.get_mut(slot).video_mapped = true;
        self.spaces.set_window(window);
        self.spaces.set_vidmap(true);
        self.spaces.flush(&mut self.hw);
        debug!("vidmap: {} -> {:?}", slot, window);

        self.spaces
            .copy_to_user(&mut self.hw, out, &VIDMAP_VA.to_le_bytes())?;
        Ok(VIDMAP_VA)
    }
}
