#![cfg_attr(not(test), no_std)]

//! The read-only filesystem image the boot loader hands the kernel.
//!
//! Layout, in 4 KiB blocks:
//!
//! ```text
//! block 0                 boot block: counts, then up to 63 directory entries
//! block 1 ..= N           one index node per block (N = inode_count)
//! block N+1 ..            data blocks, numbered from 0
//! ```
//!
//! The image is flat: a single directory holds every name, including the
//! directory itself (".") and the real-time clock device ("rtc").

extern crate alloc;

mod builder;
mod image;

pub use builder::ImageBuilder;
pub use image::Image;

use thiserror::Error;

/// Block size used for every region of the image.
pub const BLOCK_SIZE: usize = 4096;
/// Bytes of a name field. Names that fill it carry no terminator.
pub const NAME_LEN: usize = 32;
/// Directory entries that fit in the boot block after its 64-byte header.
pub const MAX_DENTRIES: usize = 63;
/// Data block references an index node can hold.
pub const MAX_DATA_BLOCKS: usize = BLOCK_SIZE / 4 - 1;

pub(crate) const DENTRY_SIZE: usize = 64;
pub(crate) const HEADER_SIZE: usize = 64;

/// What a directory entry names.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileType {
    Rtc = 0,
    Directory = 1,
    Regular = 2,
}

impl FileType {
    pub const fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(FileType::Rtc),
            1 => Some(FileType::Directory),
            2 => Some(FileType::Regular),
            _ => None,
        }
    }
}

/// One directory entry, copied out of the boot block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dentry {
    name: [u8; NAME_LEN],
    pub kind: FileType,
    pub inode: u32,
}

impl Dentry {
    pub fn new(name: &[u8], kind: FileType, inode: u32) -> Self {
        let mut raw = [0u8; NAME_LEN];
        let len = name.len().min(NAME_LEN);
        raw[..len].copy_from_slice(&name[..len]);
        Self { name: raw, kind, inode }
    }

    /// The name without trailing NUL padding.
    pub fn name(&self) -> &[u8] {
        let len = self.name.iter().position(|&b| b == 0).unwrap_or(NAME_LEN);
        &self.name[..len]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum FsError {
    #[error("image is {0} bytes, too short for its header counts")]
    Truncated(usize),
    #[error("image declares {0} directory entries, more than the boot block holds")]
    TooManyEntries(u32),
    #[error("inode {0} is out of range")]
    BadInode(u32),
    #[error("data block {0} is out of range")]
    BadBlock(u32),
    #[error("inode {inode} claims {len} bytes, more than its block list covers")]
    BadLength { inode: u32, len: u32 },
    #[error("file of {0} bytes does not fit in one index node")]
    FileTooLarge(usize),
}

/// Read access to a filesystem image, as the kernel consumes it.
pub trait FileSystem {
    /// Finds the entry whose name equals `name` exactly (at most 32 bytes).
    fn lookup(&self, name: &[u8]) -> Option<Dentry>;

    /// The `index`-th directory entry, for directory listings.
    fn entry(&self, index: u32) -> Option<Dentry>;

    /// Length in bytes of the file behind `inode`. A length the index node
    /// cannot address is an error, never a short file.
    fn file_len(&self, inode: u32) -> Result<u32, FsError>;

    /// Copies up to `buf.len()` bytes starting at `offset`. Returns how many
    /// bytes were copied, 0 once `offset` reaches the end of the file.
    fn read(&self, inode: u32, offset: u32, buf: &mut [u8]) -> Result<usize, FsError>;
}
