use alloc::string::String;

use thiserror::Error;
use types::mmu::{LARGE_PAGE_SIZE, PAGE_SIZE};
use types::{PROGRAM_LOAD_VA, ProcessSlot, TerminalId, USER_END};

/// Fixed physical layout and device constants.
pub struct Config;

impl Config {
    /// Process table size; bounded by the user frames below the identity window limit.
    pub const MAX_PROCESSES: usize = 6;
    /// Terminals the text buffer pages can back.
    pub const MAX_TERMINALS: usize = 3;

    /// The kernel's own 4 MiB page.
    pub const KERNEL_PHYS_BASE: u32 = 0x0040_0000;
    /// Process `n`'s user region lives at `USER_PHYS_BASE + n * 4 MiB`.
    pub const USER_PHYS_BASE: u32 = 0x0080_0000;
    /// Kernel stacks grow down from here, one per process slot.
    pub const KERNEL_STACK_BASE: u32 = 0x0080_0000;
    pub const KERNEL_STACK_SIZE: u32 = 0x2000;

    /// Physical text buffer the display controller scans.
    pub const VIDEO_PHYS: u32 = 0x000b_8000;

    /// Bytes available for an image between the load address and the top of the user region.
    pub const PROGRAM_IMAGE_LIMIT: usize = (USER_END - PROGRAM_LOAD_VA) as usize;

    pub const RTC_BASE_HZ: u32 = 1024;
    pub const RTC_MIN_HZ: u32 = 2;
    /// Logical rate a freshly opened clock ticks at.
    pub const RTC_DEFAULT_HZ: u32 = 2;

    /// Input clock of the programmable interval timer.
    pub const PIT_INPUT_HZ: u32 = 1_193_182;

    pub const fn user_frame(slot: ProcessSlot) -> u32 {
        Self::USER_PHYS_BASE + (slot.index() * LARGE_PAGE_SIZE) as u32
    }

    pub const fn kernel_stack_top(slot: ProcessSlot) -> u32 {
        Self::KERNEL_STACK_BASE - Self::KERNEL_STACK_SIZE * slot.index() as u32 - 4
    }

    /// Off-screen copy of a terminal's text while it is not on screen.
    pub const fn backing_frame(terminal: TerminalId) -> u32 {
        Self::VIDEO_PHYS + ((terminal.index() + 1) * PAGE_SIZE) as u32
    }

    /// End of the physical range the kernel keeps identity mapped.
    pub const fn identity_limit() -> u32 {
        Self::USER_PHYS_BASE + (Self::MAX_PROCESSES * LARGE_PAGE_SIZE) as u32
    }
}

/// Runtime knobs chosen at boot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KernelConfig {
    pub terminal_count: usize,
    pub process_capacity: usize,
    /// Scheduler tick rate.
    pub timer_hz: u32,
    /// Program every terminal runs at its root.
    pub shell: String,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            terminal_count: Config::MAX_TERMINALS,
            process_capacity: Config::MAX_PROCESSES,
            timer_hz: 100,
            shell: String::from("shell"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("terminal count {0} outside 1..={max}", max = Config::MAX_TERMINALS)]
    TerminalCount(usize),
    #[error("process capacity {capacity} outside {min}..={max}", max = Config::MAX_PROCESSES)]
    ProcessCapacity { capacity: usize, min: usize },
    #[error("timer rate {0} Hz cannot be programmed")]
    TimerRate(u32),
    #[error("shell name is empty or longer than a file name")]
    ShellName,
}

impl KernelConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.terminal_count == 0 || self.terminal_count > Config::MAX_TERMINALS {
            return Err(ConfigError::TerminalCount(self.terminal_count));
        }
        // Enough slots for one shell per terminal. Slots are not reserved:
        // children can still take them before a terminal's first visit.
        if self.process_capacity < self.terminal_count
            || self.process_capacity > Config::MAX_PROCESSES
        {
            return Err(ConfigError::ProcessCapacity {
                capacity: self.process_capacity,
                min: self.terminal_count,
            });
        }
        if self.timer_hz == 0 || self.pit_divisor() > u16::MAX as u32 + 1 {
            return Err(ConfigError::TimerRate(self.timer_hz));
        }
        if self.shell.is_empty() || self.shell.len() > types::NAME_LEN {
            return Err(ConfigError::ShellName);
        }
        Ok(())
    }

    /// Reload value for PIT channel 0. A divisor of 65536 is written as 0.
    pub fn pit_divisor(&self) -> u32 {
        Config::PIT_INPUT_HZ / self.timer_hz.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert_eq!(KernelConfig::default().validate(), Ok(()));
        assert_eq!(KernelConfig::default().pit_divisor(), 11_931);
    }

    #[test]
    fn rejects_out_of_range() {
        let mut cfg = KernelConfig {
            terminal_count: 4,
            ..KernelConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::TerminalCount(4)));

        cfg.terminal_count = 3;
        cfg.process_capacity = 2;
        assert!(matches!(cfg.validate(), Err(ConfigError::ProcessCapacity { .. })));

        cfg.process_capacity = 6;
        cfg.timer_hz = 10;
        assert_eq!(cfg.validate(), Err(ConfigError::TimerRate(10)));
    }

    #[test]
    fn layout() {
        assert_eq!(Config::user_frame(ProcessSlot::new(2)), 0x0100_0000);
        assert_eq!(Config::kernel_stack_top(ProcessSlot::new(0)), 0x007f_fffc);
        assert_eq!(Config::kernel_stack_top(ProcessSlot::new(1)), 0x007f_dffc);
        assert_eq!(Config::backing_frame(TerminalId::new(0)), 0x000b_9000);
        assert_eq!(Config::identity_limit(), 0x0200_0000);
    }
}
