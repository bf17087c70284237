use log::{error, info, warn};
use rofs::FileSystem;
use types::{ProcessSlot, TerminalId};

use crate::hw::{self, Hardware};
use crate::kernel::Kernel;
use crate::task::prep;
use crate::task::{Args, ExitStatus, Resume, context};
use crate::terminal::Console;

impl<H: Hardware, F: FileSystem, C: Console> Kernel<H, F, C> {
    /// Ends the calling process. Never returns to it.
    pub fn halt(&mut self, status: u8) -> Resume {
        self.terminate(ExitStatus::Code(status))
    }

    /// Retires the current process and hands the CPU to its parent, or to a
    /// fresh shell when a root shell exits.
    pub(crate) fn terminate(&mut self, status: ExitStatus) -> Resume {
        hw::mask(&mut self.hw);
        let Some(slot) = self.current else {
            error!("halt: no process on the cpu");
            return Resume::Idle;
        };

        let pcb = self.procs.get_mut(slot);
        let parent = pcb.parent;
        let terminal = pcb.terminal;
        pcb.retire();
        info!("halt: {} on {} exited with {:?}", slot, terminal, status);

        let Some(parent) = parent else {
            return self.respawn_root(slot, terminal);
        };

        self.terminals.get_mut(terminal).owning_process = Some(parent);
        self.current = Some(parent);
        let pcb = self.procs.get_mut(parent);
        match context::resume(&mut self.hw, &mut self.spaces, pcb, Some(status.value())) {
            Some(switch) => Resume::Switch(switch),
            None => Resume::Idle,
        }
    }

    /// A terminal is never left without a shell: reload one in the slot the
    /// old root shell had.
    fn respawn_root(&mut self, slot: ProcessSlot, terminal: TerminalId) -> Resume {
        let spawned = prep::inspect(&self.fs, self.config.shell.as_bytes())
            .and_then(|exe| self.spawn(slot, &exe, Args::empty(), None, terminal));
        match spawned {
            Ok(switch) => {
                info!("halt: restarted shell on {}", terminal);
                Resume::Switch(switch)
            }
            Err(err) => {
                warn!("halt: cannot restart shell on {}: {}", terminal, err);
                self.terminals.get_mut(terminal).owning_process = None;
                self.current = None;
                self.spaces.unbind();
                self.spaces.flush(&mut self.hw);
                Resume::Idle
            }
        }
    }
}
