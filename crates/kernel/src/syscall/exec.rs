use log::{debug, info, warn};
use rofs::FileSystem;
use types::{Error, ProcessSlot, TerminalId};

use crate::hw::{self, Hardware};
use crate::kernel::Kernel;
use crate::task::prep::{self, Executable};
use crate::task::{Args, Switch, context};
use crate::terminal::Console;

impl<H: Hardware, F: FileSystem, C: Console> Kernel<H, F, C> {
    /// Starts `command` as a child of the calling process, on the caller's
    /// terminal. The caller is suspended; it resumes when the child halts,
    /// with the child's status as this call's return value.
    ///
    /// On success interrupts are left masked for the transfer to re-enable.
    pub fn execute(&mut self, command: &[u8]) -> Result<Switch, Error> {
        let was = hw::mask(&mut self.hw);
        let result = self.execute_masked(command);
        match &result {
            Ok(switch) => info!("execute: {} started as {}", show(command), switch.slot),
            Err(err) => {
                warn!("execute: {}: {}", show(command), err);
                hw::unmask(&mut self.hw, was);
            }
        }
        result
    }

    fn execute_masked(&mut self, command: &[u8]) -> Result<Switch, Error> {
        let caller = self.current;
        let terminal = match caller {
            Some(slot) => self.procs.get(slot).terminal,
            None => self.sched.current(),
        };

        let cmd = prep::parse_command(command)?;
        let exe = prep::inspect(&self.fs, cmd.program)?;
        let args = Args::new(cmd.args)?;
        let slot = self.procs.free_slot().ok_or(Error::TooManyProcesses)?;
        self.spawn(slot, &exe, args, caller, terminal)
    }

    /// Creates the root shell for `terminal`. Used lazily by the scheduler.
    pub(crate) fn spawn_shell(&mut self, terminal: TerminalId) -> Result<Switch, Error> {
        let exe = prep::inspect(&self.fs, self.config.shell.as_bytes())?;
        let slot = self.procs.free_slot().ok_or(Error::TooManyProcesses)?;
        let switch = self.spawn(slot, &exe, Args::empty(), None, terminal)?;
        info!("spawn_shell: {} on {}", slot, terminal);
        Ok(switch)
    }

    /// Loads `exe` into `slot` and makes it the terminal's foreground job.
    /// Nothing about the caller changes unless the image loaded.
    pub(crate) fn spawn(
        &mut self,
        slot: ProcessSlot,
        exe: &Executable,
        args: Args,
        parent: Option<ProcessSlot>,
        terminal: TerminalId,
    ) -> Result<Switch, Error> {
        self.spaces.activate(&mut self.hw, slot);
        if let Err(err) = prep::load_image(&mut self.hw, &self.spaces, &self.fs, exe) {
            self.rebind_current();
            return Err(err);
        }

        if let Some(parent) = parent {
            context::suspend(&self.hw, self.procs.get_mut(parent));
        }
        self.procs.get_mut(slot).start(parent, terminal, args, exe.entry);
        self.terminals.get_mut(terminal).owning_process = Some(slot);
        self.current = Some(slot);
        debug!(
            "spawn: {} parent={:?} terminal={} entry={:#010x}",
            slot, parent, terminal, exe.entry
        );

        context::resume(&mut self.hw, &mut self.spaces, self.procs.get_mut(slot), None)
            .ok_or(Error::NoProcess)
    }

    /// Puts the running process's frame back after a failed load.
    pub(crate) fn rebind_current(&mut self) {
        match self.current {
            Some(slot) => self.spaces.activate(&mut self.hw, slot),
            None => {
                self.spaces.unbind();
                self.spaces.flush(&mut self.hw);
            }
        }
    }
}

fn show(command: &[u8]) -> &str {
    let end = command.iter().position(|&b| b == 0).unwrap_or(command.len());
    core::str::from_utf8(&command[..end]).unwrap_or("<binary>")
}
