use log::debug;

use crate::{
    BLOCK_SIZE, DENTRY_SIZE, Dentry, FileSystem, FileType, FsError, HEADER_SIZE,
    MAX_DATA_BLOCKS, MAX_DENTRIES, NAME_LEN,
};

/// A parsed view over image bytes. Nothing is copied; every read goes back to
/// the underlying slice.
#[derive(Clone, Copy, Debug)]
pub struct Image<'a> {
    bytes: &'a [u8],
    dir_count: u32,
    inode_count: u32,
    data_block_count: u32,
}

fn le_u32(bytes: &[u8], at: usize) -> u32 {
    let mut word = [0u8; 4];
    word.copy_from_slice(&bytes[at..at + 4]);
    u32::from_le_bytes(word)
}

impl<'a> Image<'a> {
    /// Validates the boot block counts against the slice length.
    pub fn new(bytes: &'a [u8]) -> Result<Self, FsError> {
        if bytes.len() < BLOCK_SIZE {
            return Err(FsError::Truncated(bytes.len()));
        }
        let dir_count = le_u32(bytes, 0);
        let inode_count = le_u32(bytes, 4);
        let data_block_count = le_u32(bytes, 8);

        if dir_count as usize > MAX_DENTRIES {
            return Err(FsError::TooManyEntries(dir_count));
        }
        let blocks = 1 + inode_count as usize + data_block_count as usize;
        if bytes.len() < blocks * BLOCK_SIZE {
            return Err(FsError::Truncated(bytes.len()));
        }

        debug!(
            "fs image: {} entries, {} inodes, {} data blocks",
            dir_count, inode_count, data_block_count
        );
        Ok(Self {
            bytes,
            dir_count,
            inode_count,
            data_block_count,
        })
    }

    pub fn dir_count(&self) -> u32 {
        self.dir_count
    }

    pub fn inode_count(&self) -> u32 {
        self.inode_count
    }

    fn dentry_raw(&self, index: u32) -> Option<Dentry> {
        if index >= self.dir_count {
            return None;
        }
        let at = HEADER_SIZE + index as usize * DENTRY_SIZE;
        let raw = &self.bytes[at..at + DENTRY_SIZE];
        // Entries with an unknown type are skipped rather than trusted.
        let kind = FileType::from_raw(le_u32(raw, NAME_LEN))?;
        Some(Dentry::new(&raw[..NAME_LEN], kind, le_u32(raw, NAME_LEN + 4)))
    }

    fn inode_block(&self, inode: u32) -> Result<&'a [u8], FsError> {
        if inode >= self.inode_count {
            return Err(FsError::BadInode(inode));
        }
        let at = (1 + inode as usize) * BLOCK_SIZE;
        Ok(&self.bytes[at..at + BLOCK_SIZE])
    }

    /// The index node and its length, once the length is known to stay
    /// within the node's block list.
    fn checked_node(&self, inode: u32) -> Result<(&'a [u8], usize), FsError> {
        let node = self.inode_block(inode)?;
        let len = le_u32(node, 0);
        if len as usize > MAX_DATA_BLOCKS * BLOCK_SIZE {
            return Err(FsError::BadLength { inode, len });
        }
        Ok((node, len as usize))
    }

    fn data_block(&self, block: u32) -> Result<&'a [u8], FsError> {
        if block >= self.data_block_count {
            return Err(FsError::BadBlock(block));
        }
        let at = (1 + self.inode_count as usize + block as usize) * BLOCK_SIZE;
        Ok(&self.bytes[at..at + BLOCK_SIZE])
    }
}

impl FileSystem for Image<'_> {
    fn lookup(&self, name: &[u8]) -> Option<Dentry> {
        if name.is_empty() || name.len() > NAME_LEN {
            return None;
        }
        (0..self.dir_count)
            .filter_map(|i| self.dentry_raw(i))
            .find(|d| d.name() == name)
    }

    fn entry(&self, index: u32) -> Option<Dentry> {
        self.dentry_raw(index)
    }

    fn file_len(&self, inode: u32) -> Result<u32, FsError> {
        self.checked_node(inode).map(|(_, len)| len as u32)
    }

    fn read(&self, inode: u32, offset: u32, buf: &mut [u8]) -> Result<usize, FsError> {
        let (node, len) = self.checked_node(inode)?;
        let mut pos = offset as usize;
        if pos >= len {
            return Ok(0);
        }

        let want = buf.len().min(len - pos);
        let mut done = 0;
        while done < want {
            let slot = pos / BLOCK_SIZE;
            let within = pos % BLOCK_SIZE;
            let block = self.data_block(le_u32(node, 4 + slot * 4))?;
            let n = (BLOCK_SIZE - within).min(want - done);
            buf[done..done + n].copy_from_slice(&block[within..within + n]);
            done += n;
            pos += n;
        }
        Ok(done)
    }
}
