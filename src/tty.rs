/*
    nascom2: a NASCOM-2 microcomputer emulator for the terminal.

    For the full copyright notice, see the lib.rs file.
*/
//! Raw terminal input.
//!
//! The monitor polls the keyboard between instructions, so stdin must
//! deliver single keystrokes without echo and without blocking the
//! emulation when nothing is typed. [RawTty] switches the terminal into
//! that mode and restores the saved attributes from every exit path: on
//! drop, on panic unwind, and from a SIGINT/SIGTERM handler (the process
//! otherwise dies with the terminal stuck in raw mode).
use std::io;
use std::mem::MaybeUninit;
use std::sync::OnceLock;

use log::debug;

static SAVED_TERMIOS: OnceLock<libc::termios> = OnceLock::new();

extern "C" fn restore_and_exit(signum: libc::c_int) {
    if let Some(saved) = SAVED_TERMIOS.get() {
        unsafe {
            libc::tcsetattr(libc::STDIN_FILENO, libc::TCSANOW, saved);
        }
    }
    unsafe { libc::_exit(128 + signum) }
}

/// Guard over the terminal's line discipline.
pub struct RawTty {
    saved: libc::termios,
}

impl RawTty {
    /// Disables canonical mode and echo on stdin. Reads return as soon as
    /// one byte is available.
    pub fn new() -> io::Result<Self> {
        let mut attrs = unsafe {
            let mut attrs = MaybeUninit::<libc::termios>::uninit();
            if libc::tcgetattr(libc::STDIN_FILENO, attrs.as_mut_ptr()) != 0 {
                return Err(io::Error::last_os_error());
            }
            attrs.assume_init()
        };
        let saved = attrs;

        attrs.c_lflag &= !(libc::ICANON | libc::ECHO);
        attrs.c_cc[libc::VTIME] = 0;
        attrs.c_cc[libc::VMIN] = 1;
        if unsafe { libc::tcsetattr(libc::STDIN_FILENO, libc::TCSANOW, &attrs) } != 0 {
            return Err(io::Error::last_os_error());
        }

        let _ = SAVED_TERMIOS.set(saved);
        unsafe {
            libc::signal(libc::SIGINT, restore_and_exit as libc::sighandler_t);
            libc::signal(libc::SIGTERM, restore_and_exit as libc::sighandler_t);
        }
        debug!("terminal switched to raw mode");
        Ok(RawTty { saved })
    }

    /// How many bytes are waiting on stdin right now.
    pub fn available(&self) -> usize {
        let mut count: libc::c_int = 0;
        let res = unsafe { libc::ioctl(libc::STDIN_FILENO, libc::FIONREAD as _, &mut count) };
        if res != 0 {
            return 0;
        }
        count.max(0) as usize
    }

    /// Reads a single byte. Only call when [RawTty::available] says one is
    /// there; an empty stdin would block until the next keystroke.
    pub fn read_byte(&mut self) -> Option<u8> {
        let mut byte = 0u8;
        let res = unsafe {
            libc::read(
                libc::STDIN_FILENO,
                &mut byte as *mut u8 as *mut libc::c_void,
                1,
            )
        };
        if res == 1 {
            Some(byte)
        } else {
            None
        }
    }
}

impl Drop for RawTty {
    fn drop(&mut self) {
        unsafe {
            libc::tcsetattr(libc::STDIN_FILENO, libc::TCSANOW, &self.saved);
        }
        debug!("terminal attributes restored");
    }
}
