use log::{debug, warn};
use rofs::{FileSystem, FileType};
use types::mmu::PAGE_SIZE;
use types::{ENTRY_OFFSET, EXEC_MAGIC, Error, NAME_LEN, PROGRAM_LOAD_VA, in_user_region};

use crate::config::Config;
use crate::hw::Hardware;
use crate::mmu::AddressSpaces;

/// A command line split into program name and argument tail.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Command<'a> {
    pub program: &'a [u8],
    pub args: &'a [u8],
}

/// Splits `"  prog   some args  "` into `prog` and `some args`. Stops at the
/// first NUL.
pub fn parse_command(raw: &[u8]) -> Result<Command<'_>, Error> {
    let raw = match raw.iter().position(|&b| b == 0) {
        Some(end) => &raw[..end],
        None => raw,
    };
    let raw = raw.trim_ascii();
    if raw.is_empty() {
        return Err(Error::NotFound);
    }

    let split = raw.iter().position(|&b| b == b' ').unwrap_or(raw.len());
    let program = &raw[..split];
    if program.len() > NAME_LEN {
        return Err(Error::NotFound);
    }
    Ok(Command {
        program,
        args: raw[split..].trim_ascii_start(),
    })
}

/// A program that passed validation and can be copied in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Executable {
    pub inode: u32,
    pub entry: u32,
    pub len: usize,
}

/// Looks `program` up and checks it is a loadable image.
pub fn inspect<F: FileSystem + ?Sized>(fs: &F, program: &[u8]) -> Result<Executable, Error> {
    let dentry = fs.lookup(program).ok_or(Error::NotFound)?;
    if dentry.kind != FileType::Regular {
        return Err(Error::NotExecutable);
    }

    let len = fs.file_len(dentry.inode).map_err(|_| Error::Io)? as usize;
    if len > Config::PROGRAM_IMAGE_LIMIT {
        warn!("inspect: image of {} bytes does not fit", len);
        return Err(Error::NotExecutable);
    }

    let mut header = [0u8; ENTRY_OFFSET + 4];
    let n = fs.read(dentry.inode, 0, &mut header).map_err(|_| Error::Io)?;
    if n < header.len() || header[..EXEC_MAGIC.len()] != EXEC_MAGIC {
        return Err(Error::NotExecutable);
    }

    let mut word = [0u8; 4];
    word.copy_from_slice(&header[ENTRY_OFFSET..]);
    let entry = u32::from_le_bytes(word);
    if !in_user_region(entry, 1) {
        warn!("inspect: entry {:#010x} outside the user region", entry);
        return Err(Error::NotExecutable);
    }

    Ok(Executable {
        inode: dentry.inode,
        entry,
        len,
    })
}

/// Copies the whole image to the load address of the currently bound region.
pub fn load_image<H: Hardware, F: FileSystem + ?Sized>(
    hw: &mut H,
    spaces: &AddressSpaces,
    fs: &F,
    exe: &Executable,
) -> Result<(), Error> {
    let mut chunk = [0u8; PAGE_SIZE];
    let mut offset = 0usize;
    while offset < exe.len {
        let n = fs
            .read(exe.inode, offset as u32, &mut chunk)
            .map_err(|_| Error::Io)?;
        if n == 0 {
            break;
        }
        spaces.copy_to_user(hw, PROGRAM_LOAD_VA + offset as u32, &chunk[..n])?;
        offset += n;
    }
    debug!(
        "load_image: inode={} bytes={} entry={:#010x}",
        exe.inode, offset, exe.entry
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_program_and_args() {
        let cmd = parse_command(b"  cat   frame0.txt  ").unwrap();
        assert_eq!(cmd.program, b"cat");
        assert_eq!(cmd.args, b"frame0.txt");

        let cmd = parse_command(b"grep a b\0garbage").unwrap();
        assert_eq!(cmd.program, b"grep");
        assert_eq!(cmd.args, b"a b");

        assert_eq!(parse_command(b"ls").unwrap().args, b"");
    }

    #[test]
    fn rejects_empty_and_long_names() {
        assert_eq!(parse_command(b"   "), Err(Error::NotFound));
        assert_eq!(parse_command(b""), Err(Error::NotFound));
        let long = [b'x'; NAME_LEN + 1];
        assert_eq!(parse_command(&long), Err(Error::NotFound));
        assert!(parse_command(&long[..NAME_LEN]).is_ok());
    }
}
