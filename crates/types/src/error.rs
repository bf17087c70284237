use core::fmt;

use thiserror::Error;

use crate::abi::SYSCALL_FAILURE;

/// Everything a kernel operation can refuse with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum Error {
    #[error("no such program")]
    NotFound,
    #[error("not an executable image")]
    NotExecutable,
    #[error("process table is full")]
    TooManyProcesses,
    #[error("descriptor table is full")]
    TooManyOpenFiles,
    #[error("no such file")]
    NoSuchFile,
    #[error("descriptor is out of range or not open")]
    InvalidDescriptor,
    #[error("malformed argument")]
    InvalidArgument,
    #[error("operation not supported by this file")]
    Unsupported,
    #[error("filesystem image read failed")]
    Io,
    #[error("no process holds the cpu")]
    NoProcess,
    #[error("nothing ready yet")]
    WouldBlock,
    #[error("cpu exception: {0}")]
    HardwareException(Fault),
}

impl Error {
    /// The value user mode sees. Every failure collapses to the same sentinel.
    pub const fn code(self) -> i32 {
        SYSCALL_FAILURE
    }
}

/// Processor exceptions the kernel turns into a forced halt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fault {
    DivideError,
    InvalidOpcode,
    GeneralProtection { code: u32 },
    PageFault { addr: u32, code: u32 },
    Other { vector: u8 },
}

impl Fault {
    /// Maps an IDT vector number below 32 to a fault kind.
    pub const fn from_vector(vector: u8, code: u32, cr2: u32) -> Self {
        match vector {
            0 => Fault::DivideError,
            6 => Fault::InvalidOpcode,
            13 => Fault::GeneralProtection { code },
            14 => Fault::PageFault { addr: cr2, code },
            _ => Fault::Other { vector },
        }
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fault::DivideError => f.write_str("divide error"),
            Fault::InvalidOpcode => f.write_str("invalid opcode"),
            Fault::GeneralProtection { code } => write!(f, "general protection (code {code:#x})"),
            Fault::PageFault { addr, code } => write!(f, "page fault at {addr:#010x} (code {code:#x})"),
            Fault::Other { vector } => write!(f, "exception vector {vector}"),
        }
    }
}
