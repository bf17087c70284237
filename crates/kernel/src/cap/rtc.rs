use types::Error;

use super::{FileOps, Io};
use crate::config::Config;
use crate::task::PeriodicTimer;

/// The real-time clock, virtualized per process.
pub struct RtcOps;

impl FileOps for RtcOps {
    fn name(&self) -> &'static str {
        "rtc"
    }

    fn open(&self, io: &mut Io<'_>) -> Result<(), Error> {
        *io.timer = Some(PeriodicTimer::at_hz(Config::RTC_DEFAULT_HZ)?);
        Ok(())
    }

    /// Blocks until one logical period has passed.
    fn read(&self, io: &mut Io<'_>, _buf: &mut [u8]) -> Result<usize, Error> {
        let timer = io.timer.as_mut().ok_or(Error::InvalidDescriptor)?;
        if timer.poll() { Ok(0) } else { Err(Error::WouldBlock) }
    }

    /// Takes exactly one little-endian `u32` frequency.
    fn write(&self, io: &mut Io<'_>, buf: &[u8]) -> Result<usize, Error> {
        let bytes: [u8; 4] = buf.try_into().map_err(|_| Error::InvalidArgument)?;
        let timer = io.timer.as_mut().ok_or(Error::InvalidDescriptor)?;
        timer.set_rate(u32::from_le_bytes(bytes))?;
        Ok(0)
    }

    fn close(&self, io: &mut Io<'_>) -> Result<(), Error> {
        *io.timer = None;
        Ok(())
    }
}
