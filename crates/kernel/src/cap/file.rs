use log::warn;
use types::Error;

use super::{FileOps, Io};

/// Read-only access to a regular file. `backing` is the inode.
pub struct RegularFileOps;

impl FileOps for RegularFileOps {
    fn name(&self) -> &'static str {
        "file"
    }

    fn read(&self, io: &mut Io<'_>, buf: &mut [u8]) -> Result<usize, Error> {
        io.fs.read(*io.backing, io.cursor, buf).map_err(|err| {
            warn!("file read: inode {}: {}", io.backing, err);
            Error::Io
        })
    }

    fn write(&self, _io: &mut Io<'_>, _buf: &[u8]) -> Result<usize, Error> {
        Err(Error::Unsupported)
    }
}

/// Directory listing, one name per read. `backing` is the next entry index.
pub struct DirectoryOps;

impl FileOps for DirectoryOps {
    fn name(&self) -> &'static str {
        "directory"
    }

    fn open(&self, io: &mut Io<'_>) -> Result<(), Error> {
        *io.backing = 0;
        Ok(())
    }

    fn read(&self, io: &mut Io<'_>, buf: &mut [u8]) -> Result<usize, Error> {
        let Some(entry) = io.fs.entry(*io.backing) else {
            return Ok(0);
        };
        let name = entry.name();
        let n = name.len().min(buf.len());
        buf[..n].copy_from_slice(&name[..n]);
        *io.backing += 1;
        Ok(n)
    }

    fn write(&self, _io: &mut Io<'_>, _buf: &[u8]) -> Result<usize, Error> {
        Err(Error::Unsupported)
    }
}
