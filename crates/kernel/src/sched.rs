// Round-robin over terminals
// --------------------------
// Each timer tick moves the CPU to the next terminal's foreground job:
// 1) Capture the continuation of whatever process holds the CPU.
// 2) Point the text-buffer page at the screen if the next terminal is in
//    front, or at its off-screen copy if not. This happens before the
//    address-space flush in step 3/5 so both land together.
// 3) A terminal with no process yet gets a root shell.
// 4) A process with a pending terminate request is halted instead of resumed.
// 5) Otherwise its address space and kernel stack are rebound and its
//    continuation resumed.
//
// The scheduler starts on the last terminal so that the very first tick
// lands on terminal 0, and three ticks bring up a shell on each terminal.

use log::{debug, warn};
use rofs::FileSystem;
use types::TerminalId;

use crate::hw::{self, Hardware};
use crate::kernel::Kernel;
use crate::task::{ExitStatus, Resume, context};
use crate::terminal::Console;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Scheduler {
    current: TerminalId,
    terminal_count: usize,
    ticks: u64,
}

impl Scheduler {
    pub fn new(terminal_count: usize) -> Self {
        let terminal_count = terminal_count.max(1);
        Self {
            current: TerminalId::new(terminal_count - 1),
            terminal_count,
            ticks: 0,
        }
    }

    /// Terminal whose job holds the CPU.
    pub fn current(&self) -> TerminalId {
        self.current
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn next(&self) -> TerminalId {
        TerminalId::new((self.current.index() + 1) % self.terminal_count)
    }
}

impl<H: Hardware, F: FileSystem, C: Console> Kernel<H, F, C> {
    /// Timer interrupt.
    pub fn timer_tick(&mut self) -> Resume {
        hw::mask(&mut self.hw);
        self.sched.ticks += 1;

        if let Some(outgoing) = self.current {
            context::suspend(&self.hw, self.procs.get_mut(outgoing));
        }

        let next = self.sched.next();
        let window = self.window_for(next);
        self.spaces.set_window(window);
        self.sched.current = next;

        let Some(incoming) = self.terminals.get(next).owning_process else {
            return match self.spawn_shell(next) {
                Ok(switch) => Resume::Switch(switch),
                Err(err) => {
                    warn!("tick: no shell on {}: {}", next, err);
                    self.resume_current()
                }
            };
        };

        self.current = Some(incoming);
        if self.procs.get(incoming).pending_forced_halt {
            debug!("tick: terminating {} on {}", incoming, next);
            self.spaces.activate(&mut self.hw, incoming);
            return self.terminate(ExitStatus::Killed);
        }

        match context::resume(&mut self.hw, &mut self.spaces, self.procs.get_mut(incoming), None) {
            Some(switch) => Resume::Switch(switch),
            None => Resume::Idle,
        }
    }

    /// Gives the CPU back to the process the tick interrupted, with the
    /// display window of its own terminal.
    fn resume_current(&mut self) -> Resume {
        let Some(slot) = self.current else {
            return Resume::Idle;
        };
        let window = self.window_for(self.procs.get(slot).terminal);
        self.spaces.set_window(window);
        match context::resume(&mut self.hw, &mut self.spaces, self.procs.get_mut(slot), None) {
            Some(switch) => Resume::Switch(switch),
            None => Resume::Idle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_tick_lands_on_terminal_zero() {
        let sched = Scheduler::new(3);
        assert_eq!(sched.current(), TerminalId::new(2));
        assert_eq!(sched.next(), TerminalId::new(0));
        assert_eq!(Scheduler::new(1).next(), TerminalId::new(0));
    }
}
