//! Kernel heap. The page tables and every other boxed kernel object come
//! from a fixed arena inside the kernel's own 4 MiB page, which the
//! directory maps from the first flush onward.

use core::ptr;

use linked_list_allocator::LockedHeap;
use log::info;

pub const HEAP_SIZE: usize = 256 * 1024;

#[repr(C, align(4096))]
struct Arena([u8; HEAP_SIZE]);

static mut ARENA: Arena = Arena([0; HEAP_SIZE]);

#[global_allocator]
static HEAP: LockedHeap = LockedHeap::empty();

/// Hands the arena to the allocator.
///
/// # Safety
/// Must run exactly once, before the first allocation (so before
/// `Kernel::new`), with interrupts masked.
pub unsafe fn init() {
    let bottom = ptr::addr_of_mut!(ARENA).cast::<u8>();
    unsafe { HEAP.lock().init(bottom, HEAP_SIZE) };
    info!("heap: {} KiB at {:#010x}", HEAP_SIZE / 1024, bottom as usize);
}
