use log::error;

use crate::hw::Hardware;
use crate::mmu::AddressSpaces;
use crate::task::Pcb;
use types::ProcessSlot;

/// Everything needed to give a process the CPU again.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResumeToken {
    /// Built by execute: an interrupt-return frame that drops to user mode at
    /// `entry` with `user_stack`, interrupts enabled.
    UserEntry { entry: u32, user_stack: u32 },
    /// A kernel path suspended inside a trap. Resuming restores this frame
    /// pointer and returns from that trap.
    Frame { frame_pointer: u32 },
}

/// A fully prepared transfer to another context.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Switch {
    pub slot: ProcessSlot,
    pub token: ResumeToken,
    pub kernel_stack_top: u32,
    /// Value for the return register. `None` resumes a path that restores
    /// its own registers on the way out, so the register is passed as 0.
    pub value: Option<i32>,
}

/// How the CPU continues after a kernel entry point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resume {
    /// Back to the trapping context with a syscall result.
    Return(i32),
    /// Re-issue the same syscall once interrupts are enabled again.
    Restart,
    /// Somewhere else entirely.
    Switch(Switch),
    /// Nothing to run; wait for the next interrupt.
    Idle,
}

impl Resume {
    pub fn switch(self) -> Option<Switch> {
        match self {
            Resume::Switch(switch) => Some(switch),
            _ => None,
        }
    }
}

/// Records where `pcb`'s kernel path can be picked up again.
pub fn suspend<H: Hardware>(hw: &H, pcb: &mut Pcb) {
    debug_assert!(!hw.interrupts_enabled());
    pcb.resume = Some(ResumeToken::Frame {
        frame_pointer: hw.frame_pointer(),
    });
    pcb.kernel_stack_top = hw.kernel_stack();
}

/// Rebinds `pcb`'s address space and kernel stack and consumes its token.
///
/// Interrupts stay masked; the transfer itself re-enables them.
pub fn resume<H: Hardware>(
    hw: &mut H,
    spaces: &mut AddressSpaces,
    pcb: &mut Pcb,
    value: Option<i32>,
) -> Option<Switch> {
    debug_assert!(!hw.interrupts_enabled());
    let Some(token) = pcb.resume.take() else {
        error!("resume: {} has no saved context", pcb.slot);
        return None;
    };
    spaces.set_vidmap(pcb.video_mapped);
    spaces.activate(hw, pcb.slot);
    hw.set_kernel_stack(pcb.kernel_stack_top);
    Some(Switch {
        slot: pcb.slot,
        token,
        kernel_stack_top: pcb.kernel_stack_top,
        value,
    })
}
