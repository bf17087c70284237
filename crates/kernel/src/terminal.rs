use types::{ProcessSlot, TerminalId};

use crate::config::Config;
use crate::mmu::DisplayWindow;

/// Text output for one terminal. Implementations write at that terminal's
/// cursor into whatever the text-buffer page currently maps; `window` is
/// where that page points for the duration of the call.
pub trait Console {
    fn write(&mut self, terminal: TerminalId, window: DisplayWindow, bytes: &[u8]);
}

/// Bytes a line can hold, newline included.
pub const LINE_LEN: usize = 128;

/// Keyboard input for one terminal, handed out a line at a time.
#[derive(Clone, Debug)]
pub struct LineBuffer {
    buf: [u8; LINE_LEN],
    len: usize,
    complete: bool,
}

impl LineBuffer {
    pub const fn new() -> Self {
        Self {
            buf: [0; LINE_LEN],
            len: 0,
            complete: false,
        }
    }

    /// Appends a typed byte. Returns whether it was accepted, which is also
    /// whether it should be echoed.
    pub fn push(&mut self, byte: u8) -> bool {
        if self.complete {
            return false;
        }
        if byte == b'\n' {
            self.buf[self.len] = b'\n';
            self.len += 1;
            self.complete = true;
            return true;
        }
        // Leave room for the newline.
        if self.len + 1 >= LINE_LEN {
            return false;
        }
        self.buf[self.len] = byte;
        self.len += 1;
        true
    }

    /// Drops the last typed byte of an unfinished line.
    pub fn erase(&mut self) -> bool {
        if self.complete || self.len == 0 {
            return false;
        }
        self.len -= 1;
        true
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Moves the completed line into `out`. A line longer than `out` is cut
    /// and still ends in a newline. Returns the byte count.
    pub fn take(&mut self, out: &mut [u8]) -> usize {
        let n = self.len.min(out.len());
        out[..n].copy_from_slice(&self.buf[..n]);
        if n > 0 {
            out[n - 1] = b'\n';
        }
        self.clear();
        n
    }

    pub fn clear(&mut self) {
        self.len = 0;
        self.complete = false;
    }
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Debug, Default)]
pub struct TerminalSlot {
    /// Process currently in front on this terminal.
    pub owning_process: Option<ProcessSlot>,
    pub is_foreground: bool,
    pub line: LineBuffer,
}

/// All terminals; exactly one is in the foreground.
pub struct Terminals {
    slots: [TerminalSlot; Config::MAX_TERMINALS],
    count: usize,
    foreground: TerminalId,
}

impl Terminals {
    pub fn new(count: usize) -> Self {
        let mut slots: [TerminalSlot; Config::MAX_TERMINALS] = Default::default();
        slots[0].is_foreground = true;
        Self {
            slots,
            count: count.clamp(1, Config::MAX_TERMINALS),
            foreground: TerminalId::new(0),
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn ids(&self) -> impl Iterator<Item = TerminalId> {
        (0..self.count).map(TerminalId::new)
    }

    pub fn contains(&self, terminal: TerminalId) -> bool {
        terminal.index() < self.count
    }

    pub fn get(&self, terminal: TerminalId) -> &TerminalSlot {
        &self.slots[terminal.index()]
    }

    pub fn get_mut(&mut self, terminal: TerminalId) -> &mut TerminalSlot {
        &mut self.slots[terminal.index()]
    }

    pub fn foreground(&self) -> TerminalId {
        self.foreground
    }

    pub fn set_foreground(&mut self, terminal: TerminalId) {
        for slot in &mut self.slots {
            slot.is_foreground = false;
        }
        self.slots[terminal.index()].is_foreground = true;
        self.foreground = terminal;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_completes_on_newline() {
        let mut line = LineBuffer::new();
        for &b in b"lx" {
            assert!(line.push(b));
        }
        assert!(line.erase());
        assert!(line.push(b's'));
        assert!(!line.is_complete());
        assert!(line.push(b'\n'));
        assert!(!line.push(b'z'));

        let mut out = [0u8; 16];
        assert_eq!(line.take(&mut out), 3);
        assert_eq!(&out[..3], b"ls\n");
        assert!(!line.is_complete());
    }

    #[test]
    fn short_reads_keep_newline() {
        let mut line = LineBuffer::new();
        for &b in b"hello\n" {
            line.push(b);
        }
        let mut out = [0u8; 3];
        assert_eq!(line.take(&mut out), 3);
        assert_eq!(&out, b"he\n");
    }

    #[test]
    fn full_line_still_takes_newline() {
        let mut line = LineBuffer::new();
        for _ in 0..LINE_LEN + 10 {
            line.push(b'a');
        }
        assert!(line.push(b'\n'));
        let mut out = [0u8; LINE_LEN];
        assert_eq!(line.take(&mut out), LINE_LEN);
        assert_eq!(out[LINE_LEN - 1], b'\n');
    }

    #[test]
    fn single_foreground() {
        let mut terms = Terminals::new(3);
        terms.set_foreground(TerminalId::new(2));
        let fg: Vec<_> = terms.ids().filter(|&t| terms.get(t).is_foreground).collect();
        assert_eq!(fg, vec![TerminalId::new(2)]);
    }
}
