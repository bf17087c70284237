// Address-space layout
// --------------------
// There is one page directory. Every process sees the same kernel half and
// the same user virtual layout; what differs is the physical frame behind
// the single user directory entry, which is rebound on every switch.
//
//   PDE 0      page table "low": identity 4 KiB pages (kernel only, page 0
//              absent), except the text-buffer page, which points at either
//              the visible buffer or the running terminal's off-screen copy,
//              and an alias page that always reaches the visible buffer.
//   PDE 1      kernel image, 4 MiB, supervisor.
//   PDE 2..8   identity window over the user frames, 4 MiB, supervisor.
//   PDE 32     user region, 4 MiB, user: frame of the bound process slot.
//   PDE 33     page table "vidmap": page 0 is the user alias of the text
//              buffer, present only while the running process asked for it.
//
// Writing the directory base register reloads all of it, so every change is
// made in place first and then published with a single `flush`.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::cmp;

use log::debug;
use types::mmu::{self, LARGE_PAGE_SIZE, PAGE_SIZE, directory_index, table_index};
use types::{
    Entry, Error, PagePerms, PageTable, ProcessSlot, TableLookup, TerminalId, USER_BASE,
    VIDMAP_VA, in_user_region,
};

use crate::config::Config;
use crate::hw::Hardware;

/// Virtual page the kernel uses to reach the physical visible buffer while the
/// text-buffer page itself may be pointing somewhere else.
pub const VIDEO_ALIAS_VA: u32 = 0x000b_c000;

const USER_PDE: usize = directory_index(USER_BASE);
const VIDMAP_PDE: usize = directory_index(VIDMAP_VA);

/// Where the text-buffer page currently points.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisplayWindow {
    /// Straight to the buffer on screen.
    Visible,
    /// To a terminal's off-screen copy.
    Backing(TerminalId),
}

impl DisplayWindow {
    pub const fn frame(self) -> u32 {
        match self {
            DisplayWindow::Visible => Config::VIDEO_PHYS,
            DisplayWindow::Backing(t) => Config::backing_frame(t),
        }
    }
}

pub struct AddressSpaces {
    directory: Box<PageTable>,
    low: Box<PageTable>,
    vidmap: Box<PageTable>,
    directory_frame: u32,
    low_frame: u32,
    vidmap_frame: u32,
    bound: Option<ProcessSlot>,
    window: DisplayWindow,
    vidmap_present: bool,
}

impl AddressSpaces {
    /// Builds the shared kernel layout with no user region bound.
    pub fn new<H: Hardware>(hw: &mut H) -> Self {
        let mut directory = Box::new(PageTable::new());
        let mut low = Box::new(PageTable::new());
        let vidmap = Box::new(PageTable::new());

        let directory_frame = hw.table_frame(&*directory);
        let low_frame = hw.table_frame(&*low);
        let vidmap_frame = hw.table_frame(&*vidmap);

        let kernel = PagePerms::kernel_rw();
        for page in 1..mmu::ENTRY_COUNT {
            low.set(page, Entry::small((page * PAGE_SIZE) as u32, kernel));
        }
        low.set(table_index(VIDEO_ALIAS_VA), Entry::small(Config::VIDEO_PHYS, kernel));

        directory.set(0, Entry::small(low_frame, kernel));
        directory.set(
            directory_index(Config::KERNEL_PHYS_BASE),
            Entry::large(Config::KERNEL_PHYS_BASE, kernel),
        );
        let mut frame = Config::USER_PHYS_BASE;
        while frame < Config::identity_limit() {
            directory.set(directory_index(frame), Entry::large(frame, kernel));
            frame += LARGE_PAGE_SIZE as u32;
        }
        directory.set(VIDMAP_PDE, Entry::small(vidmap_frame, PagePerms::user_rw()));

        let mut spaces = Self {
            directory,
            low,
            vidmap,
            directory_frame,
            low_frame,
            vidmap_frame,
            bound: None,
            window: DisplayWindow::Visible,
            vidmap_present: false,
        };
        spaces.set_window(DisplayWindow::Visible);
        spaces
    }

    pub fn directory_frame(&self) -> u32 {
        self.directory_frame
    }

    /// Process whose frame backs the user region, if any.
    pub fn bound(&self) -> Option<ProcessSlot> {
        self.bound
    }

    pub fn window(&self) -> DisplayWindow {
        self.window
    }

    pub fn vidmap_present(&self) -> bool {
        self.vidmap_present
    }

    pub fn user_entry(&self) -> Entry {
        self.directory.get(USER_PDE)
    }

    /// Points the user region at `slot`'s frame. Takes effect at the next flush.
    pub fn bind(&mut self, slot: ProcessSlot) {
        self.directory.set(
            USER_PDE,
            Entry::large(Config::user_frame(slot), PagePerms::user_rw()),
        );
        self.bound = Some(slot);
    }

    pub fn unbind(&mut self) {
        self.directory.clear(USER_PDE);
        self.bound = None;
    }

    /// Binds `slot` and publishes the change in one step.
    pub fn activate<H: Hardware>(&mut self, hw: &mut H, slot: ProcessSlot) {
        self.bind(slot);
        self.flush(hw);
    }

    pub fn flush<H: Hardware>(&self, hw: &mut H) {
        hw.load_page_directory(self.directory_frame);
    }

    /// Retargets the kernel text-buffer page and the user alias page together.
    pub fn set_window(&mut self, window: DisplayWindow) {
        let frame = window.frame();
        self.low
            .set(table_index(Config::VIDEO_PHYS), Entry::small(frame, PagePerms::kernel_rw()));
        if self.vidmap_present {
            self.vidmap
                .set(table_index(VIDMAP_VA), Entry::small(frame, PagePerms::user_rw()));
        }
        if self.window != window {
            debug!("display window: {:?} -> {:?}", self.window, window);
        }
        self.window = window;
    }

    pub fn set_vidmap(&mut self, present: bool) {
        self.vidmap_present = present;
        if present {
            let frame = self.window.frame();
            self.vidmap
                .set(table_index(VIDMAP_VA), Entry::small(frame, PagePerms::user_rw()));
        } else {
            self.vidmap.clear(table_index(VIDMAP_VA));
        }
    }

    /// Resolves `va` the way the MMU would right now. `user` demands the
    /// user bit at every level.
    pub fn translate(&self, va: u32, user: bool) -> Option<u32> {
        mmu::translate(&self.directory, self, va, user)
    }

    /// Copies `data` into the bound user region.
    pub fn copy_to_user<H: Hardware>(&self, hw: &mut H, va: u32, data: &[u8]) -> Result<(), Error> {
        if !in_user_region(va, data.len() as u32) {
            return Err(Error::InvalidArgument);
        }
        let mut done = 0usize;
        while done < data.len() {
            let at = va + done as u32;
            let phys = self.translate(at, true).ok_or(Error::InvalidArgument)?;
            let n = cmp::min(data.len() - done, PAGE_SIZE - (at as usize & (PAGE_SIZE - 1)));
            hw.write_phys(phys, &data[done..done + n]);
            done += n;
        }
        Ok(())
    }

    /// Copies from the bound user region into `buf`.
    pub fn copy_from_user<H: Hardware>(&self, hw: &H, va: u32, buf: &mut [u8]) -> Result<(), Error> {
        if !in_user_region(va, buf.len() as u32) {
            return Err(Error::InvalidArgument);
        }
        let mut done = 0usize;
        while done < buf.len() {
            let at = va + done as u32;
            let phys = self.translate(at, true).ok_or(Error::InvalidArgument)?;
            let n = cmp::min(buf.len() - done, PAGE_SIZE - (at as usize & (PAGE_SIZE - 1)));
            hw.read_phys(phys, &mut buf[done..done + n]);
            done += n;
        }
        Ok(())
    }

    /// Reads a NUL-terminated string of at most `max` bytes. The terminator
    /// is not included; hitting `max` or the end of the region truncates.
    pub fn read_user_str<H: Hardware>(&self, hw: &H, va: u32, max: usize) -> Result<Vec<u8>, Error> {
        if !in_user_region(va, 1) {
            return Err(Error::InvalidArgument);
        }
        let mut out = Vec::new();
        let mut at = va;
        while out.len() < max && in_user_region(at, 1) {
            let mut chunk = [0u8; 64];
            let room = cmp::min(
                (max - out.len()) as u32,
                PAGE_SIZE as u32 - (at & (PAGE_SIZE as u32 - 1)),
            );
            let n = cmp::min(room as usize, chunk.len());
            let phys = self.translate(at, true).ok_or(Error::InvalidArgument)?;
            hw.read_phys(phys, &mut chunk[..n]);
            if let Some(end) = chunk[..n].iter().position(|&b| b == 0) {
                out.extend_from_slice(&chunk[..end]);
                return Ok(out);
            }
            out.extend_from_slice(&chunk[..n]);
            at += n as u32;
        }
        Ok(out)
    }
}

impl TableLookup for AddressSpaces {
    fn table(&self, frame: u32) -> Option<&PageTable> {
        if frame == self.low_frame {
            Some(&self.low)
        } else if frame == self.vidmap_frame {
            Some(&self.vidmap)
        } else {
            None
        }
    }
}
