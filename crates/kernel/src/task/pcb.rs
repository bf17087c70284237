use core::fmt;

use types::{ARGS_LEN, Error, Fd, MAX_FILES, ProcessSlot, TerminalId};

use crate::cap::{self, FileOps};
use crate::config::Config;
use crate::task::ResumeToken;

/// One open-file slot.
#[derive(Clone, Copy)]
pub struct FileDescriptor {
    pub ops: &'static dyn FileOps,
    /// Inode for files, next entry index for directories, unused otherwise.
    pub backing: u32,
    pub cursor: u32,
    pub in_use: bool,
}

impl FileDescriptor {
    pub fn free() -> Self {
        Self {
            ops: &cap::NULL,
            backing: 0,
            cursor: 0,
            in_use: false,
        }
    }

    pub fn bound(ops: &'static dyn FileOps, backing: u32) -> Self {
        Self {
            ops,
            backing,
            cursor: 0,
            in_use: true,
        }
    }
}

impl fmt::Debug for FileDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileDescriptor")
            .field("ops", &self.ops.name())
            .field("backing", &self.backing)
            .field("cursor", &self.cursor)
            .field("in_use", &self.in_use)
            .finish()
    }
}

/// Per-process view of the real-time clock.
///
/// The device interrupts at a fixed base rate; each process counts down its
/// own number of base ticks per logical period.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PeriodicTimer {
    pub armed: bool,
    pub ticks_remaining: u32,
    pub ticks_per_period: u32,
}

impl PeriodicTimer {
    pub fn at_hz(hz: u32) -> Result<Self, Error> {
        let mut timer = Self {
            armed: false,
            ticks_remaining: 0,
            ticks_per_period: 0,
        };
        timer.set_rate(hz)?;
        Ok(timer)
    }

    /// Accepts powers of two between the minimum and the base rate.
    pub fn set_rate(&mut self, hz: u32) -> Result<(), Error> {
        if !hz.is_power_of_two() || !(Config::RTC_MIN_HZ..=Config::RTC_BASE_HZ).contains(&hz) {
            return Err(Error::InvalidArgument);
        }
        self.ticks_per_period = Config::RTC_BASE_HZ / hz;
        self.armed = false;
        Ok(())
    }

    /// One base-rate interrupt.
    pub fn tick(&mut self) {
        if self.armed && self.ticks_remaining > 0 {
            self.ticks_remaining -= 1;
        }
    }

    /// Arms the countdown on first call; reports whether a full period has
    /// elapsed since then, disarming if so.
    pub fn poll(&mut self) -> bool {
        if !self.armed {
            self.armed = true;
            self.ticks_remaining = self.ticks_per_period;
            return false;
        }
        if self.ticks_remaining == 0 {
            self.armed = false;
            return true;
        }
        false
    }
}

/// NUL-terminated argument tail handed to getargs.
#[derive(Clone, Copy)]
pub struct Args {
    bytes: [u8; ARGS_LEN],
    len: usize,
}

impl Args {
    pub const fn empty() -> Self {
        Self {
            bytes: [0; ARGS_LEN],
            len: 0,
        }
    }

    pub fn new(args: &[u8]) -> Result<Self, Error> {
        if args.len() >= ARGS_LEN {
            return Err(Error::InvalidArgument);
        }
        let mut out = Self::empty();
        out.bytes[..args.len()].copy_from_slice(args);
        out.len = args.len();
        Ok(out)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl fmt::Debug for Args {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Args({:?})", core::str::from_utf8(self.as_bytes()).unwrap_or("<binary>"))
    }
}

/// Process control block.
#[derive(Debug)]
pub struct Pcb {
    pub slot: ProcessSlot,
    pub live: bool,
    /// `None` marks a root shell.
    pub parent: Option<ProcessSlot>,
    pub terminal: TerminalId,
    pub files: [FileDescriptor; MAX_FILES],
    pub resume: Option<ResumeToken>,
    pub kernel_stack_top: u32,
    pub video_mapped: bool,
    pub timer: Option<PeriodicTimer>,
    pub pending_forced_halt: bool,
    pub args: Args,
}

impl Pcb {
    pub fn vacant(slot: ProcessSlot) -> Self {
        Self {
            slot,
            live: false,
            parent: None,
            terminal: TerminalId::new(0),
            files: [FileDescriptor::free(); MAX_FILES],
            resume: None,
            kernel_stack_top: Config::kernel_stack_top(slot),
            video_mapped: false,
            timer: None,
            pending_forced_halt: false,
            args: Args::empty(),
        }
    }

    /// Fresh state for a process about to enter its image at `entry`.
    pub(crate) fn start(
        &mut self,
        parent: Option<ProcessSlot>,
        terminal: TerminalId,
        args: Args,
        entry: u32,
    ) {
        *self = Self::vacant(self.slot);
        self.live = true;
        self.parent = parent;
        self.terminal = terminal;
        self.args = args;
        self.files[Fd::STDIN.index()] = FileDescriptor::bound(&cap::STDIN, 0);
        self.files[Fd::STDOUT.index()] = FileDescriptor::bound(&cap::STDOUT, 0);
        self.resume = Some(ResumeToken::UserEntry {
            entry,
            user_stack: types::USER_STACK_TOP,
        });
    }

    /// Releases everything the process held. The slot becomes allocatable.
    pub(crate) fn retire(&mut self) {
        *self = Self::vacant(self.slot);
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Lowest descriptor number available to open.
    pub fn free_descriptor(&self) -> Option<Fd> {
        (2..MAX_FILES)
            .find(|&i| !self.files[i].in_use)
            .and_then(|i| Fd::from_raw(i as i32))
    }

    pub fn open_count(&self) -> usize {
        self.files.iter().filter(|d| d.in_use).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timer_counts_base_ticks() {
        let mut t = PeriodicTimer::at_hz(256).unwrap();
        assert_eq!(t.ticks_per_period, 4);
        assert!(!t.poll());
        for _ in 0..3 {
            t.tick();
            assert!(!t.poll());
        }
        t.tick();
        assert!(t.poll());
        assert!(!t.armed);
    }

    #[test]
    fn timer_rejects_bad_rates() {
        assert_eq!(PeriodicTimer::at_hz(3), Err(Error::InvalidArgument));
        assert_eq!(PeriodicTimer::at_hz(1), Err(Error::InvalidArgument));
        assert_eq!(PeriodicTimer::at_hz(2048), Err(Error::InvalidArgument));
        assert!(PeriodicTimer::at_hz(1024).is_ok());
    }

    #[test]
    fn start_binds_terminal_descriptors() {
        let mut pcb = Pcb::vacant(ProcessSlot::new(3));
        pcb.start(Some(ProcessSlot::new(0)), TerminalId::new(1), Args::empty(), 0x0804_8100);

        assert!(pcb.live);
        assert_eq!(pcb.open_count(), 2);
        assert_eq!(pcb.free_descriptor(), Fd::from_raw(2));
        assert_eq!(pcb.kernel_stack_top, 0x007f_9ffc);

        pcb.retire();
        assert!(!pcb.live);
        assert_eq!(pcb.open_count(), 0);
    }
}
