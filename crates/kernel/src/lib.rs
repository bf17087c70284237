#![cfg_attr(not(test), no_std)]

// Process and scheduling core of a single-CPU protected-mode kernel.
//
// Every entry point (syscall, timer tick, exception, keyboard) runs with
// interrupts masked for as long as it rewires process state, and reports how
// the CPU should continue as a `Resume` value. The architecture glue in
// `arch` turns that value into the actual register and stack transfer; the
// host tests drive the same entry points against a recording machine.

extern crate alloc;

pub mod arch;
pub mod cap;
pub mod config;
pub mod hw;
pub mod kernel;
pub mod mmu;
pub mod sched;
pub mod syscall;
pub mod task;
pub mod terminal;
pub mod trap;

pub use config::{Config, ConfigError, KernelConfig};
pub use hw::Hardware;
pub use kernel::Kernel;
pub use mmu::{AddressSpaces, DisplayWindow};
pub use task::{ExitStatus, Pcb, Resume, ResumeToken, Switch};
pub use terminal::Console;
pub use types::{Error, Fault, Fd, ProcessSlot, TerminalId};
