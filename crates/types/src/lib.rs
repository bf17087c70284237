#![cfg_attr(not(test), no_std)]

// Shared vocabulary between the kernel, its filesystem image, and anything
// that has to agree with user programs on the syscall ABI.

pub mod abi;
pub use abi::*;

pub mod error;
pub use error::{Error, Fault};

pub mod ids;
pub use ids::{Fd, ProcessSlot, TerminalId};

pub mod mmu;
pub use mmu::{Entry, PagePerms, PageTable, TableLookup};
