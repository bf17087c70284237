//! Interrupt and exception entry points other than the timer and syscalls.

use log::{debug, error, info, warn};
use rofs::FileSystem;
use types::mmu::PAGE_SIZE;
use types::{Error, Fault, TerminalId};

use crate::config::Config;
use crate::hw::{self, Hardware};
use crate::kernel::Kernel;
use crate::mmu::DisplayWindow;
use crate::task::{ExitStatus, Resume};
use crate::terminal::Console;

const BACKSPACE: u8 = 0x08;

impl<H: Hardware, F: FileSystem, C: Console> Kernel<H, F, C> {
    /// A processor exception. The faulting process is halted as if it had
    /// called halt, except that its parent sees the exception status.
    pub fn exception(&mut self, fault: Fault) -> Resume {
        let err = Error::HardwareException(fault);
        match self.current {
            Some(slot) => {
                warn!("exception: {} killed: {}", slot, err);
                self.terminate(ExitStatus::Exception)
            }
            None => {
                error!("exception: {} with no process on the cpu", err);
                hw::mask(&mut self.hw);
                Resume::Idle
            }
        }
    }

    /// Marks `terminal`'s foreground job for termination. The scheduler
    /// carries it out the next time it selects that terminal.
    pub fn request_terminate(&mut self, terminal: TerminalId) -> bool {
        if !self.terminals.contains(terminal) {
            return false;
        }
        let Some(slot) = self.terminals.get(terminal).owning_process else {
            return false;
        };
        info!("terminate requested for {} on {}", slot, terminal);
        self.procs.get_mut(slot).pending_forced_halt = true;
        true
    }

    /// Base-rate clock interrupt: advances every process's logical timer.
    pub fn rtc_tick(&mut self) {
        for pcb in self.procs.iter_live_mut() {
            if let Some(timer) = pcb.timer.as_mut() {
                timer.tick();
            }
        }
    }

    /// A decoded keystroke for the terminal in front. The echo is written
    /// through the visible buffer, mapped in for the duration when a
    /// background terminal's process holds the CPU.
    pub fn keyboard_input(&mut self, byte: u8) {
        let terminal = self.terminals.foreground();
        let line = &mut self.terminals.get_mut(terminal).line;
        let accepted = if byte == BACKSPACE {
            line.erase()
        } else {
            line.push(byte)
        };
        if !accepted {
            return;
        }

        let was = hw::mask(&mut self.hw);
        let shown = self.spaces.window();
        if shown != DisplayWindow::Visible {
            self.spaces.set_window(DisplayWindow::Visible);
            self.spaces.flush(&mut self.hw);
        }
        self.console.write(terminal, DisplayWindow::Visible, &[byte]);
        if shown != DisplayWindow::Visible {
            self.spaces.set_window(shown);
            self.spaces.flush(&mut self.hw);
        }
        hw::unmask(&mut self.hw, was);
    }

    /// Brings `target` to the front: the screen's contents go to the old
    /// foreground terminal's off-screen copy and `target`'s copy goes on
    /// screen.
    pub fn switch_foreground(&mut self, target: TerminalId) -> Result<(), Error> {
        if !self.terminals.contains(target) {
            return Err(Error::InvalidArgument);
        }
        let old = self.terminals.foreground();
        if old == target {
            return Ok(());
        }

        let was = hw::mask(&mut self.hw);
        let mut page = [0u8; PAGE_SIZE];
        self.hw.read_phys(Config::VIDEO_PHYS, &mut page);
        self.hw.write_phys(Config::backing_frame(old), &page);
        self.hw.read_phys(Config::backing_frame(target), &mut page);
        self.hw.write_phys(Config::VIDEO_PHYS, &page);

        self.terminals.set_foreground(target);
        let window = self.window_for(self.display_terminal());
        self.spaces.set_window(window);
        self.spaces.flush(&mut self.hw);
        hw::unmask(&mut self.hw, was);

        debug!("foreground: {} -> {}", old, target);
        Ok(())
    }
}
