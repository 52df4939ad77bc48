//! Raw keyboard input for interactive images.
//!
//! `RawTerminal::enable` switches stdin to unbuffered, no-echo, no-signal mode and returns a
//! guard that puts the original mode back when dropped, however the run ends.

#[cfg(unix)]
mod platform {
  use std::io;
  use std::mem::MaybeUninit;
  use std::os::unix::io::RawFd;

  use tracing::{debug, warn};

  pub struct RawTerminal {
    fd       : RawFd,
    original : libc::termios
  }

  impl RawTerminal {
    /// Returns `None` when stdin is not a terminal, in which case nothing is changed.
    pub fn enable() -> Option<RawTerminal> {
      let fd = libc::STDIN_FILENO;

      let mut original = MaybeUninit::<libc::termios>::uninit();
      // Fails with ENOTTY when stdin is a pipe or a file.
      if unsafe { libc::tcgetattr(fd, original.as_mut_ptr()) } != 0 {
        debug!("stdin is not a terminal; leaving its mode alone");
        return None;
      }
      let original = unsafe { original.assume_init() };

      let mut raw = original;
      raw.c_lflag &= !(libc::ICANON | libc::ECHO | libc::ISIG);
      raw.c_iflag  = 0;
      if unsafe { libc::tcsetattr(fd, libc::TCSANOW, &raw) } != 0 {
        warn!("cannot switch stdin to raw mode: {}", io::Error::last_os_error());
        return None;
      }

      debug!("stdin switched to raw mode");
      Some(RawTerminal { fd, original })
    }
  }

  impl Drop for RawTerminal {
    fn drop(&mut self) {
      if unsafe { libc::tcsetattr(self.fd, libc::TCSANOW, &self.original) } != 0 {
        warn!("cannot restore terminal mode: {}", io::Error::last_os_error());
      } else {
        debug!("terminal mode restored");
      }
    }
  }
}

#[cfg(not(unix))]
mod platform {
  pub struct RawTerminal;

  impl RawTerminal {
    pub fn enable() -> Option<RawTerminal> {
      None
    }
  }
}

pub use self::platform::RawTerminal;
