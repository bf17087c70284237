use types::PageTable;

/// Everything the process core needs from the processor.
///
/// The real implementation lives in `arch::x86`; tests substitute a machine
/// that records each call and simulates physical memory.
pub trait Hardware {
    /// Physical frame holding a page table the kernel allocated.
    fn table_frame(&mut self, table: *const PageTable) -> u32;

    /// Loads the page-directory base register. This flushes every cached
    /// translation, so it doubles as the TLB flush.
    fn load_page_directory(&mut self, frame: u32);

    /// Stack the CPU switches to on the next user-to-kernel transition.
    fn set_kernel_stack(&mut self, top: u32);
    fn kernel_stack(&self) -> u32;

    /// Frame pointer of the kernel path that entered through the current
    /// trap. Resuming it returns from that trap.
    fn frame_pointer(&self) -> u32;

    fn interrupts_enabled(&self) -> bool;
    fn disable_interrupts(&mut self);
    fn enable_interrupts(&mut self);

    /// Physical memory access through the kernel's identity window.
    fn read_phys(&self, addr: u32, buf: &mut [u8]);
    fn write_phys(&mut self, addr: u32, data: &[u8]);
}

/// Masks interrupts, returning whether they were on.
pub(crate) fn mask<H: Hardware>(hw: &mut H) -> bool {
    let was = hw.interrupts_enabled();
    hw.disable_interrupts();
    was
}

pub(crate) fn unmask<H: Hardware>(hw: &mut H, was: bool) {
    if was {
        hw.enable_interrupts();
    }
}
