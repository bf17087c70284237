use log::debug;
use rofs::FileSystem;
use types::{Error, Fd, NAME_LEN};

use crate::cap::{self, FileOps, Io};
use crate::hw::Hardware;
use crate::kernel::Kernel;
use crate::task::{FileDescriptor, Pcb};
use crate::terminal::Console;

impl<H: Hardware, F: FileSystem, C: Console> Kernel<H, F, C> {
    /// Binds the lowest free descriptor (2 and up) to the named file.
    pub fn open(&mut self, name: &[u8]) -> Result<Fd, Error> {
        let slot = self.current_slot()?;
        let name = match name.iter().position(|&b| b == 0) {
            Some(end) => &name[..end],
            None => name,
        };
        if name.is_empty() || name.len() > NAME_LEN {
            return Err(Error::NoSuchFile);
        }
        let dentry = self.fs.lookup(name).ok_or(Error::NoSuchFile)?;
        let window = self.spaces.window();

        let Kernel {
            procs,
            terminals,
            fs,
            console,
            ..
        } = self;
        let pcb = procs.get_mut(slot);
        let fd = pcb.free_descriptor().ok_or(Error::TooManyOpenFiles)?;
        let ops = cap::for_kind(dentry.kind);
        let mut backing = dentry.inode;
        let terminal_id = pcb.terminal;

        let mut io = Io {
            fs: &*fs,
            console: &mut *console,
            terminal_id,
            terminal: terminals.get_mut(terminal_id),
            window,
            timer: &mut pcb.timer,
            backing: &mut backing,
            cursor: 0,
        };
        ops.open(&mut io)?;

        pcb.files[fd.index()] = FileDescriptor::bound(ops, backing);
        debug!("open: {} fd={} kind={}", slot, fd.as_raw(), ops.name());
        Ok(fd)
    }

    /// Reads through the descriptor's capability and advances its cursor.
    pub fn read(&mut self, fd: i32, buf: &mut [u8]) -> Result<usize, Error> {
        let fd = Fd::from_raw(fd).ok_or(Error::InvalidDescriptor)?;
        let n = self.with_descriptor(fd, |ops, io| ops.read(io, buf))?;
        let slot = self.current_slot()?;
        let desc = &mut self.procs.get_mut(slot).files[fd.index()];
        desc.cursor = desc.cursor.saturating_add(n as u32);
        Ok(n)
    }

    pub fn write(&mut self, fd: i32, buf: &[u8]) -> Result<usize, Error> {
        let fd = Fd::from_raw(fd).ok_or(Error::InvalidDescriptor)?;
        self.with_descriptor(fd, |ops, io| ops.write(io, buf))
    }

    /// Releases a descriptor. The terminal descriptors cannot be closed.
    pub fn close(&mut self, fd: i32) -> Result<(), Error> {
        let fd = Fd::from_raw(fd).ok_or(Error::InvalidDescriptor)?;
        if fd.is_terminal() {
            return Err(Error::InvalidDescriptor);
        }
        let result = self.with_descriptor(fd, |ops, io| ops.close(io));
        let slot = self.current_slot()?;
        let desc = &mut self.procs.get_mut(slot).files[fd.index()];
        if desc.in_use {
            *desc = FileDescriptor::free();
            debug!("close: {} fd={}", slot, fd.as_raw());
        }
        result
    }

    /// Runs `op` against an open descriptor of the current process.
    fn with_descriptor<R>(
        &mut self,
        fd: Fd,
        op: impl FnOnce(&'static dyn FileOps, &mut Io<'_>) -> Result<R, Error>,
    ) -> Result<R, Error> {
        let slot = self.current_slot()?;
        let window = self.spaces.window();
        let Kernel {
            procs,
            terminals,
            fs,
            console,
            ..
        } = self;
        let pcb = procs.get_mut(slot);
        let terminal_id = pcb.terminal;
        let Pcb { files, timer, .. } = pcb;
        let desc = &mut files[fd.index()];
        if !desc.in_use {
            return Err(Error::InvalidDescriptor);
        }

        let ops = desc.ops;
        let mut io = Io {
            fs: &*fs,
            console: &mut *console,
            terminal_id,
            terminal: terminals.get_mut(terminal_id),
            window,
            timer,
            backing: &mut desc.backing,
            cursor: desc.cursor,
        };
        op(ops, &mut io)
    }
}
