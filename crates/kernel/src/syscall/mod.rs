//! Syscall entry. Arguments arrive in three registers; pointer arguments are
//! user virtual addresses and are copied through the bound address space.

mod args;
mod exec;
mod file;
mod halt;
mod signal;
mod vidmap;

use core::cmp;

use log::{debug, warn};
use rofs::FileSystem;
use types::{
    ARGS_LEN, Error, NAME_LEN, SYS_CLOSE, SYS_EXECUTE, SYS_GETARGS, SYS_HALT, SYS_OPEN,
    SYS_READ, SYS_SET_HANDLER, SYS_SIGRETURN, SYS_VIDMAP, SYS_WRITE, SYSCALL_FAILURE,
    in_user_region,
};

use crate::hw::Hardware;
use crate::kernel::Kernel;
use crate::task::Resume;
use crate::terminal::Console;

/// Longest command line execute will read from user memory.
const COMMAND_LEN: usize = NAME_LEN + 1 + ARGS_LEN;
/// Bounce buffer for read and write; larger transfers go in several rounds.
const CHUNK_LEN: usize = 1024;

impl<H: Hardware, F: FileSystem, C: Console> Kernel<H, F, C> {
    pub fn syscall(&mut self, number: u32, args: [u32; 3]) -> Resume {
        let [a, b, c] = args;
        match number {
            SYS_HALT => self.halt(a as u8),
            SYS_EXECUTE => self.sys_execute(a),
            SYS_READ => finish(self.sys_read(a as i32, b, c as i32)),
            SYS_WRITE => finish(self.sys_write(a as i32, b, c as i32)),
            SYS_OPEN => finish(self.sys_open(a)),
            SYS_CLOSE => finish(self.close(a as i32).map(|()| 0)),
            SYS_GETARGS => finish(self.getargs(a, b).map(|()| 0)),
            SYS_VIDMAP => finish(self.vidmap(a).map(|_| 0)),
            SYS_SET_HANDLER => finish(self.set_handler(a, b).map(|()| 0)),
            SYS_SIGRETURN => finish(self.sigreturn().map(|()| 0)),
            _ => {
                warn!("syscall: unknown number {}", number);
                Resume::Return(SYSCALL_FAILURE)
            }
        }
    }

    fn sys_execute(&mut self, command: u32) -> Resume {
        let command = match self.spaces.read_user_str(&self.hw, command, COMMAND_LEN) {
            Ok(command) => command,
            Err(err) => return finish(Err(err)),
        };
        match self.execute(&command) {
            Ok(switch) => Resume::Switch(switch),
            Err(err) => finish(Err(err)),
        }
    }

    fn sys_open(&mut self, name: u32) -> Result<i32, Error> {
        let name = self.spaces.read_user_str(&self.hw, name, NAME_LEN + 1)?;
        self.open(&name).map(|fd| fd.as_raw())
    }

    /// Reads in rounds until the capability comes up short. A failure after
    /// the first round ends the call with what was already delivered.
    fn sys_read(&mut self, fd: i32, buf: u32, len: i32) -> Result<i32, Error> {
        let len = user_len(buf, len)?;
        let mut chunk = [0u8; CHUNK_LEN];
        let mut done = 0usize;
        loop {
            let want = cmp::min(CHUNK_LEN, len - done);
            let n = match self.read(fd, &mut chunk[..want]) {
                Ok(n) => n,
                Err(err) if done == 0 => return Err(err),
                Err(_) => break,
            };
            self.spaces
                .copy_to_user(&mut self.hw, buf + done as u32, &chunk[..n])?;
            done += n;
            if n < want || done == len {
                break;
            }
        }
        Ok(done as i32)
    }

    fn sys_write(&mut self, fd: i32, buf: u32, len: i32) -> Result<i32, Error> {
        let len = user_len(buf, len)?;
        let mut chunk = [0u8; CHUNK_LEN];
        let mut done = 0usize;
        loop {
            let want = cmp::min(CHUNK_LEN, len - done);
            self.spaces
                .copy_from_user(&self.hw, buf + done as u32, &mut chunk[..want])?;
            let n = match self.write(fd, &chunk[..want]) {
                Ok(n) => n,
                Err(err) if done == 0 => return Err(err),
                Err(_) => break,
            };
            done += n;
            if n < want || done == len {
                break;
            }
        }
        Ok(done as i32)
    }
}

fn user_len(buf: u32, len: i32) -> Result<usize, Error> {
    if len < 0 || !in_user_region(buf, len as u32) {
        return Err(Error::InvalidArgument);
    }
    Ok(len as usize)
}

/// Maps a typed result onto what the trapping context sees.
fn finish(result: Result<i32, Error>) -> Resume {
    match result {
        Ok(value) => Resume::Return(value),
        Err(Error::WouldBlock) => Resume::Restart,
        Err(err) => {
            debug!("syscall failed: {}", err);
            Resume::Return(err.code())
        }
    }
}
