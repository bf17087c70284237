//! 32-bit protected mode.
//!
//! The trap stubs (installed with the descriptor tables, outside this crate)
//! save the general registers, store their frame pointer in `ENTRY_FRAME`,
//! and call into the kernel. What happens next is decided by the returned
//! `Resume`: `Return` and `Restart` unwind through the stub, `Switch` goes
//! through `enter`, `Idle` through `idle`.

use core::arch::asm;
use core::ptr;
use core::sync::atomic::{AtomicU32, Ordering};

use types::PageTable;
use types::mmu::PAGE_SIZE;

use crate::config::{Config, KernelConfig};
use crate::hw::Hardware;
use crate::mmu::VIDEO_ALIAS_VA;
use crate::task::{ResumeToken, Switch};

pub const KERNEL_DS: u32 = 0x18;
pub const USER_CS: u32 = 0x23;
pub const USER_DS: u32 = 0x2b;

const EFLAGS_IF: u32 = 1 << 9;
const PIT_CHANNEL0: u16 = 0x40;
const PIT_COMMAND: u16 = 0x43;
/// Channel 0, low/high byte, rate generator.
const PIT_MODE_RATE: u8 = 0x36;

/// Frame pointer of the most recent trap stub.
pub static ENTRY_FRAME: AtomicU32 = AtomicU32::new(0);

/// The part of the task-state segment the kernel writes.
#[repr(C)]
pub struct TaskStateHead {
    pub link: u32,
    pub esp0: u32,
    pub ss0: u32,
}

pub struct X86 {
    tss: *mut TaskStateHead,
}

impl X86 {
    /// # Safety
    /// `tss` must be the task-state segment the loaded task register selects,
    /// and physical memory below `Config::identity_limit()` must be identity
    /// mapped for the kernel, which `AddressSpaces::new` arranges.
    pub unsafe fn new(tss: *mut TaskStateHead) -> Self {
        Self { tss }
    }
}

/// Kernel virtual address of a physical byte. The text-buffer page is
/// remapped per terminal, so the screen itself is reached through its alias.
fn virt(addr: u32) -> *mut u8 {
    let page = addr & !(PAGE_SIZE as u32 - 1);
    let addr = if page == Config::VIDEO_PHYS {
        VIDEO_ALIAS_VA | (addr & (PAGE_SIZE as u32 - 1))
    } else {
        addr
    };
    addr as usize as *mut u8
}

impl Hardware for X86 {
    fn table_frame(&mut self, table: *const PageTable) -> u32 {
        table as usize as u32
    }

    fn load_page_directory(&mut self, frame: u32) {
        unsafe { asm!("mov cr3, {}", in(reg) frame, options(nostack, preserves_flags)) }
    }

    fn set_kernel_stack(&mut self, top: u32) {
        unsafe {
            ptr::addr_of_mut!((*self.tss).esp0).write_volatile(top);
            ptr::addr_of_mut!((*self.tss).ss0).write_volatile(KERNEL_DS);
        }
    }

    fn kernel_stack(&self) -> u32 {
        unsafe { ptr::addr_of!((*self.tss).esp0).read_volatile() }
    }

    fn frame_pointer(&self) -> u32 {
        ENTRY_FRAME.load(Ordering::Relaxed)
    }

    fn interrupts_enabled(&self) -> bool {
        let flags: u32;
        unsafe { asm!("pushfd", "pop {}", out(reg) flags, options(preserves_flags)) }
        flags & EFLAGS_IF != 0
    }

    fn disable_interrupts(&mut self) {
        unsafe { asm!("cli", options(nomem, nostack)) }
    }

    fn enable_interrupts(&mut self) {
        unsafe { asm!("sti", options(nomem, nostack)) }
    }

    fn read_phys(&self, addr: u32, buf: &mut [u8]) {
        unsafe { ptr::copy_nonoverlapping(virt(addr), buf.as_mut_ptr(), buf.len()) }
    }

    fn write_phys(&mut self, addr: u32, data: &[u8]) {
        unsafe { ptr::copy_nonoverlapping(data.as_ptr(), virt(addr), data.len()) }
    }
}

/// Performs the transfer `switch` describes.
///
/// # Safety
/// Interrupts must be masked and `switch` must be the value just returned
/// by a kernel entry point, so its address space and kernel stack are the
/// ones installed.
pub unsafe fn enter(switch: &Switch) -> ! {
    match switch.token {
        // Fabricated interrupt-return frame: ss, esp, eflags (IF set), cs, eip.
        ResumeToken::UserEntry { entry, user_stack } => unsafe {
            asm!(
                "mov ds, {ds:x}",
                "mov es, {ds:x}",
                "mov fs, {ds:x}",
                "mov gs, {ds:x}",
                "push {ds}",
                "push {stack}",
                "pushfd",
                "or dword ptr [esp], {if_flag}",
                "push {cs}",
                "push {entry}",
                "iretd",
                ds = in(reg) USER_DS,
                stack = in(reg) user_stack,
                entry = in(reg) entry,
                cs = const USER_CS,
                if_flag = const EFLAGS_IF,
                options(noreturn),
            )
        },
        // Unwind into the trap stub that captured this frame.
        ResumeToken::Frame { frame_pointer } => unsafe {
            asm!(
                "mov ebp, {fp}",
                "sti",
                "leave",
                "ret",
                fp = in(reg) frame_pointer,
                in("eax") switch.value.unwrap_or(0),
                options(noreturn),
            )
        },
    }
}

/// Waits for the next interrupt with nothing scheduled.
pub fn idle() -> ! {
    loop {
        unsafe { asm!("sti", "hlt", options(nomem, nostack)) }
    }
}

/// Starts the scheduler tick at the configured rate.
pub fn program_timer(config: &KernelConfig) {
    // A divisor of 65536 is programmed as 0.
    let divisor = config.pit_divisor() as u16;
    unsafe {
        outb(PIT_COMMAND, PIT_MODE_RATE);
        outb(PIT_CHANNEL0, divisor as u8);
        outb(PIT_CHANNEL0, (divisor >> 8) as u8);
    }
}

unsafe fn outb(port: u16, value: u8) {
    unsafe { asm!("out dx, al", in("dx") port, in("al") value, options(nomem, nostack, preserves_flags)) }
}
