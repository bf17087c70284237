// Process lifecycle
// -----------------
// execute(command):
// 1) Parse "<program> <args>", look the program up, check the magic and
//    read the entry address. Nothing is allocated until all of that passed.
// 2) Take the lowest free slot, bind its user frame, copy the image to the
//    load address.
// 3) Capture the caller's continuation (frame pointer + kernel stack top)
//    in the caller's PCB.
// 4) Initialize the child PCB: parent link, terminal descriptors 0 and 1,
//    argument blob, and a synthetic user-entry resume token.
// 5) Hand the terminal to the child and resume it.
//
// halt(status):
// 1) Retire the PCB: slot free, descriptors closed, timer and video alias gone.
// 2) Root shell: load a fresh shell into the same slot.
// 3) Otherwise rebind the parent's frame and kernel stack and resume the
//    continuation captured in step 3 above, delivering the status as the
//    return value of the parent's execute.
//
// The scheduler reuses the same resume path, just without a return value.

pub mod context;
pub mod pcb;
pub mod prep;
pub mod table;

pub use context::{Resume, ResumeToken, Switch};
pub use pcb::{Args, FileDescriptor, Pcb, PeriodicTimer};
pub use table::ProcessTable;

/// Why a process stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExitStatus {
    /// The program called halt.
    Code(u8),
    /// A CPU exception was raised while it ran.
    Exception,
    /// A terminate request was consumed by the scheduler.
    Killed,
}

impl ExitStatus {
    /// The value the parent's execute returns.
    pub const fn value(self) -> i32 {
        match self {
            ExitStatus::Code(code) => code as i32,
            ExitStatus::Exception => types::EXCEPTION_STATUS,
            ExitStatus::Killed => types::KILLED_STATUS as i32,
        }
    }
}
