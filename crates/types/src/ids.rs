use core::fmt;

use crate::abi::MAX_FILES;

/// Index of a process control block. The same index selects the process's
/// physical user frame and its kernel stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProcessSlot(u8);

impl ProcessSlot {
    pub const fn new(index: usize) -> Self {
        Self(index as u8)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ProcessSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pid{}", self.0)
    }
}

/// One of the virtual terminals multiplexed onto the screen and keyboard.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TerminalId(u8);

impl TerminalId {
    pub const fn new(index: usize) -> Self {
        Self(index as u8)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TerminalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tty{}", self.0)
    }
}

/// A validated file descriptor number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fd(u8);

impl Fd {
    pub const STDIN: Fd = Fd(0);
    pub const STDOUT: Fd = Fd(1);

    /// Accepts only numbers that index the descriptor table.
    pub const fn from_raw(raw: i32) -> Option<Self> {
        if raw >= 0 && (raw as usize) < MAX_FILES {
            Some(Self(raw as u8))
        } else {
            None
        }
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub const fn as_raw(self) -> i32 {
        self.0 as i32
    }

    /// Descriptors 0 and 1 are bound at process creation and never closed.
    pub const fn is_terminal(self) -> bool {
        self.0 < 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fd_range() {
        assert_eq!(Fd::from_raw(0), Some(Fd::STDIN));
        assert_eq!(Fd::from_raw(7).map(Fd::index), Some(7));
        assert_eq!(Fd::from_raw(8), None);
        assert_eq!(Fd::from_raw(-1), None);
        assert!(Fd::STDOUT.is_terminal());
        assert!(!Fd::from_raw(2).is_some_and(Fd::is_terminal));
    }
}
