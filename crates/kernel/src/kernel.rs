use log::info;
use rofs::FileSystem;
use types::{Error, ProcessSlot, TerminalId};

use crate::config::{ConfigError, KernelConfig};
use crate::hw::Hardware;
use crate::mmu::{AddressSpaces, DisplayWindow};
use crate::sched::Scheduler;
use crate::task::{Pcb, ProcessTable};
use crate::terminal::{Console, Terminals};

/// The whole mutable state of the process core.
///
/// There is exactly one of these per machine. Entry points take `&mut self`
/// and run with interrupts masked, which is what serializes them.
pub struct Kernel<H, F, C> {
    pub(crate) hw: H,
    pub(crate) fs: F,
    pub(crate) console: C,
    pub(crate) config: KernelConfig,
    pub(crate) spaces: AddressSpaces,
    pub(crate) procs: ProcessTable,
    pub(crate) terminals: Terminals,
    pub(crate) sched: Scheduler,
    /// Process the CPU is executing on behalf of.
    pub(crate) current: Option<ProcessSlot>,
}

impl<H: Hardware, F: FileSystem, C: Console> Kernel<H, F, C> {
    /// Installs the shared page directory. No process exists until the first
    /// timer tick creates the shell on terminal 0.
    pub fn new(mut hw: H, fs: F, console: C, config: KernelConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let spaces = AddressSpaces::new(&mut hw);
        spaces.flush(&mut hw);
        info!(
            "kernel: {} terminals, {} process slots, shell {:?}, tick {} Hz",
            config.terminal_count, config.process_capacity, config.shell, config.timer_hz
        );

        Ok(Self {
            hw,
            fs,
            console,
            procs: ProcessTable::new(config.process_capacity),
            terminals: Terminals::new(config.terminal_count),
            sched: Scheduler::new(config.terminal_count),
            config,
            spaces,
            current: None,
        })
    }

    pub fn hw(&self) -> &H {
        &self.hw
    }

    pub fn hw_mut(&mut self) -> &mut H {
        &mut self.hw
    }

    pub fn console(&self) -> &C {
        &self.console
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    pub fn spaces(&self) -> &AddressSpaces {
        &self.spaces
    }

    pub fn terminals(&self) -> &Terminals {
        &self.terminals
    }

    pub fn current(&self) -> Option<ProcessSlot> {
        self.current
    }

    pub fn current_terminal(&self) -> TerminalId {
        self.sched.current()
    }

    pub fn foreground_terminal(&self) -> TerminalId {
        self.terminals.foreground()
    }

    /// Live PCB at `slot`.
    pub fn process(&self, slot: ProcessSlot) -> Option<&Pcb> {
        self.procs.live(slot)
    }

    pub fn live_count(&self) -> usize {
        self.procs.live_count()
    }

    pub fn ticks(&self) -> u64 {
        self.sched.ticks()
    }

    /// Copies into the user region of whichever process is bound.
    pub fn copy_to_user(&mut self, va: u32, data: &[u8]) -> Result<(), Error> {
        self.spaces.copy_to_user(&mut self.hw, va, data)
    }

    pub fn copy_from_user(&self, va: u32, buf: &mut [u8]) -> Result<(), Error> {
        self.spaces.copy_from_user(&self.hw, va, buf)
    }

    pub(crate) fn current_slot(&self) -> Result<ProcessSlot, Error> {
        self.current.ok_or(Error::NoProcess)
    }

    /// Terminal whose text the running process draws. With no process on
    /// the CPU it is the terminal the scheduler last selected.
    pub(crate) fn display_terminal(&self) -> TerminalId {
        match self.current {
            Some(slot) => self.procs.get(slot).terminal,
            None => self.sched.current(),
        }
    }

    /// What the text-buffer page must show while `terminal` runs.
    pub(crate) fn window_for(&self, terminal: TerminalId) -> DisplayWindow {
        if terminal == self.terminals.foreground() {
            DisplayWindow::Visible
        } else {
            DisplayWindow::Backing(terminal)
        }
    }
}
