//! Processor-specific glue. Only built for the target it drives.

#[cfg(target_arch = "x86")]
pub mod x86;

#[cfg(all(target_arch = "x86", target_os = "none"))]
pub mod heap;
