//! Numbers and addresses a user program is compiled against.

/// Syscall numbers, passed in the first argument register.
pub const SYS_HALT: u32 = 1;
pub const SYS_EXECUTE: u32 = 2;
pub const SYS_READ: u32 = 3;
pub const SYS_WRITE: u32 = 4;
pub const SYS_OPEN: u32 = 5;
pub const SYS_CLOSE: u32 = 6;
pub const SYS_GETARGS: u32 = 7;
pub const SYS_VIDMAP: u32 = 8;
pub const SYS_SET_HANDLER: u32 = 9;
pub const SYS_SIGRETURN: u32 = 10;

/// Value every failing syscall hands back.
pub const SYSCALL_FAILURE: i32 = -1;

/// Reported to the parent when its child died on a CPU exception.
pub const EXCEPTION_STATUS: i32 = 256;
/// Reported to the parent when its child was terminated from the keyboard.
pub const KILLED_STATUS: u8 = 128;

/// Descriptor table size per process; 0 and 1 are the terminal.
pub const MAX_FILES: usize = 8;
/// Longest program or file name, not counting any terminator.
pub const NAME_LEN: usize = 32;
/// Argument blob capacity including its NUL terminator.
pub const ARGS_LEN: usize = 128;

/// First four bytes of every executable image.
pub const EXEC_MAGIC: [u8; 4] = [0x7f, b'E', b'L', b'F'];
/// Byte offset of the little-endian entry address inside an image.
pub const ENTRY_OFFSET: usize = 24;

/// The one 4 MiB user region every process sees at the same address.
pub const USER_BASE: u32 = 0x0800_0000;
pub const USER_END: u32 = 0x0840_0000;
/// Where the image's bytes are copied.
pub const PROGRAM_LOAD_VA: u32 = 0x0804_8000;
/// Initial user stack pointer.
pub const USER_STACK_TOP: u32 = USER_END - 4;
/// User address of the text buffer page handed out by `vidmap`.
pub const VIDMAP_VA: u32 = USER_END;

/// True when `[va, va + len)` sits inside the user region.
pub const fn in_user_region(va: u32, len: u32) -> bool {
    match va.checked_add(len) {
        Some(end) => va >= USER_BASE && end <= USER_END,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_region_bounds() {
        assert!(in_user_region(USER_BASE, 0));
        assert!(in_user_region(USER_STACK_TOP, 4));
        assert!(!in_user_region(USER_STACK_TOP, 5));
        assert!(!in_user_region(USER_BASE - 1, 1));
        assert!(!in_user_region(u32::MAX, 2));
    }
}
