use alloc::vec;
use alloc::vec::Vec;

use crate::{
    BLOCK_SIZE, DENTRY_SIZE, FileType, FsError, HEADER_SIZE, MAX_DATA_BLOCKS, MAX_DENTRIES,
    NAME_LEN,
};

struct Pending {
    name: Vec<u8>,
    kind: FileType,
    data: Vec<u8>,
}

/// Assembles an image in memory. Regular files get consecutive index nodes
/// in insertion order; directory and device entries reference inode 0 and
/// own no data.
#[derive(Default)]
pub struct ImageBuilder {
    entries: Vec<Pending>,
}

impl ImageBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn directory(self, name: &str) -> Self {
        self.push(name, FileType::Directory, Vec::new())
    }

    pub fn rtc(self, name: &str) -> Self {
        self.push(name, FileType::Rtc, Vec::new())
    }

    pub fn file(self, name: &str, data: &[u8]) -> Self {
        self.push(name, FileType::Regular, data.to_vec())
    }

    fn push(mut self, name: &str, kind: FileType, data: Vec<u8>) -> Self {
        let name = name.as_bytes();
        let name = name[..name.len().min(NAME_LEN)].to_vec();
        self.entries.push(Pending { name, kind, data });
        self
    }

    pub fn build(self) -> Result<Vec<u8>, FsError> {
        if self.entries.len() > MAX_DENTRIES {
            return Err(FsError::TooManyEntries(self.entries.len() as u32));
        }

        let files: Vec<&Pending> = self
            .entries
            .iter()
            .filter(|e| e.kind == FileType::Regular)
            .collect();
        let mut blocks_per_file = Vec::with_capacity(files.len());
        for file in &files {
            let blocks = file.data.len().div_ceil(BLOCK_SIZE);
            if blocks > MAX_DATA_BLOCKS {
                return Err(FsError::FileTooLarge(file.data.len()));
            }
            blocks_per_file.push(blocks);
        }

        let inode_count = files.len();
        let data_count: usize = blocks_per_file.iter().sum();
        let mut out = vec![0u8; (1 + inode_count + data_count) * BLOCK_SIZE];

        put_u32(&mut out, 0, self.entries.len() as u32);
        put_u32(&mut out, 4, inode_count as u32);
        put_u32(&mut out, 8, data_count as u32);

        let mut next_inode = 0u32;
        for (i, entry) in self.entries.iter().enumerate() {
            let at = HEADER_SIZE + i * DENTRY_SIZE;
            out[at..at + entry.name.len()].copy_from_slice(&entry.name);
            put_u32(&mut out, at + NAME_LEN, entry.kind as u32);
            let inode = if entry.kind == FileType::Regular {
                next_inode += 1;
                next_inode - 1
            } else {
                0
            };
            put_u32(&mut out, at + NAME_LEN + 4, inode);
        }

        let data_base = (1 + inode_count) * BLOCK_SIZE;
        let mut next_block = 0usize;
        for (inode, file) in files.iter().enumerate() {
            let node = (1 + inode) * BLOCK_SIZE;
            put_u32(&mut out, node, file.data.len() as u32);
            for (k, chunk) in file.data.chunks(BLOCK_SIZE).enumerate() {
                put_u32(&mut out, node + 4 + k * 4, next_block as u32);
                let at = data_base + next_block * BLOCK_SIZE;
                out[at..at + chunk.len()].copy_from_slice(chunk);
                next_block += 1;
            }
        }

        Ok(out)
    }
}

fn put_u32(buf: &mut [u8], at: usize, value: u32) {
    buf[at..at + 4].copy_from_slice(&value.to_le_bytes());
}
