//! Fault and interrupt supervision for console mode
//!
//! Two very different paths live here:
//!
//! - SIGINT is cooperative. It is delivered through the glib main loop and
//!   becomes [`SessionEvent::Interrupt`], so teardown runs on the reactor
//!   thread like every other trigger.
//! - SIGSEGV and SIGQUIT are faults. The handler restores the default
//!   dispositions, prints a diagnostic and a stack trace, then parks the
//!   process forever so a debugger can be attached. It never returns and
//!   never touches the session.

use gstplay_core::{EventSink, SessionEvent};
use gstreamer::glib;
use std::cell::Cell;
use std::io::{Cursor, Write};
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

/// Program name handed to the stack trace helper
const PROGRAM: &[u8] = b"gstplay\0";

/// Set once at install time; read from the fault handler
static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Registered SIGINT watch
pub struct InterruptWatch {
    source: Option<glib::SourceId>,
    fired: Rc<Cell<bool>>,
}

impl InterruptWatch {
    /// Deliver SIGINT to `events` as [`SessionEvent::Interrupt`]. The watch
    /// deregisters itself after the first delivery.
    pub fn install(events: EventSink) -> Self {
        let fired = Rc::new(Cell::new(false));
        let flag = Rc::clone(&fired);
        let source = glib::unix_signal_add_local(libc::SIGINT, move || {
            flag.set(true);
            events(SessionEvent::Interrupt);
            glib::ControlFlow::Break
        });
        debug!("Interrupt watch installed");

        Self {
            source: Some(source),
            fired,
        }
    }

    /// Whether SIGINT has been delivered
    pub fn fired(&self) -> bool {
        self.fired.get()
    }

    /// Deregister the watch. Call after the main loop has returned.
    pub fn remove(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(source) = self.source.take() {
            // A fired watch has already been removed by glib
            if !self.fired.get() {
                source.remove();
                debug!("Interrupt watch removed");
            }
        }
    }
}

impl Drop for InterruptWatch {
    fn drop(&mut self) {
        self.release();
    }
}

/// Install the SIGSEGV and SIGQUIT handlers
pub fn install_fault_handlers(verbose: bool) {
    VERBOSE.store(verbose, Ordering::Relaxed);
    for signum in [libc::SIGSEGV, libc::SIGQUIT] {
        if let Err(e) = set_disposition(signum, fault_handler as libc::sighandler_t) {
            warn!(signum, error = %e, "Failed to install fault handler");
        }
    }
    debug!("Fault handlers installed");
}

fn set_disposition(signum: libc::c_int, handler: libc::sighandler_t) -> std::io::Result<()> {
    // SAFETY: the action is fully initialized and the handler is either a
    // libc constant or an `extern "C" fn(c_int)`.
    unsafe {
        let mut action: libc::sigaction = std::mem::zeroed();
        action.sa_sigaction = handler;
        libc::sigemptyset(&mut action.sa_mask);
        if libc::sigaction(signum, &action, std::ptr::null_mut()) != 0 {
            return Err(std::io::Error::last_os_error());
        }
    }
    Ok(())
}

/// Put both signals back to their default disposition so a second fault
/// terminates the process
fn restore_defaults() {
    for signum in [libc::SIGSEGV, libc::SIGQUIT] {
        let _ = set_disposition(signum, libc::SIG_DFL);
    }
}

/// Write straight to a descriptor; no allocation, no locks
fn raw_write(fd: libc::c_int, bytes: &[u8]) {
    // SAFETY: `bytes` is a valid buffer for its whole length.
    unsafe {
        libc::write(fd, bytes.as_ptr().cast(), bytes.len());
    }
}

/// Format into a stack buffer and write it out
fn raw_print(fd: libc::c_int, args: std::fmt::Arguments<'_>) {
    let mut buf = [0u8; 256];
    let mut cursor = Cursor::new(&mut buf[..]);
    let _ = cursor.write_fmt(args);
    let len = cursor.position() as usize;
    raw_write(fd, &buf[..len]);
}

extern "C" fn fault_handler(signum: libc::c_int) {
    restore_defaults();

    match signum {
        libc::SIGSEGV => raw_print(libc::STDERR_FILENO, format_args!("Caught SIGSEGV\n")),
        libc::SIGQUIT => {
            if VERBOSE.load(Ordering::Relaxed) {
                raw_print(libc::STDOUT_FILENO, format_args!("Caught SIGQUIT\n"));
            }
        }
        other => raw_print(libc::STDERR_FILENO, format_args!("signo:  {other}\n")),
    }

    spin()
}

/// Dump a stack trace and park the process for a debugger
fn spin() -> ! {
    // SAFETY: PROGRAM is NUL-terminated; wait() accepts a null status.
    unsafe {
        glib::ffi::g_on_error_stack_trace(PROGRAM.as_ptr().cast());
        libc::wait(std::ptr::null_mut());
    }

    // SAFETY: getpid has no preconditions.
    let pid = unsafe { libc::getpid() };
    raw_print(
        libc::STDERR_FILENO,
        format_args!(
            "Spinning.  Please run 'gdb gstplay {pid}' to continue debugging, \
             Ctrl-C to quit, or Ctrl-\\ to dump core.\n"
        ),
    );

    loop {
        std::thread::sleep(Duration::from_secs(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_print_truncates_to_buffer() {
        // Writing to an invalid descriptor must not panic
        raw_print(-1, format_args!("{}", "x".repeat(1024)));
    }

    #[test]
    fn test_program_name_is_nul_terminated() {
        assert_eq!(PROGRAM.last(), Some(&0));
        assert_eq!(&PROGRAM[..PROGRAM.len() - 1], b"gstplay");
    }

    /// Read whatever `fd` holds until `needle` shows up or `timeout` passes
    fn read_until(fd: libc::c_int, needle: &str, timeout: Duration) -> String {
        let deadline = std::time::Instant::now() + timeout;
        let mut seen = Vec::new();
        let mut buf = [0u8; 512];
        while std::time::Instant::now() < deadline {
            let n = unsafe { libc::read(fd, buf.as_mut_ptr().cast(), buf.len()) };
            if n > 0 {
                seen.extend_from_slice(&buf[..n as usize]);
                if String::from_utf8_lossy(&seen).contains(needle) {
                    break;
                }
            } else {
                std::thread::sleep(Duration::from_millis(20));
            }
        }
        String::from_utf8_lossy(&seen).into_owned()
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_segfault_reports_and_parks_process() {
        let mut fds = [0; 2];
        assert_eq!(unsafe { libc::pipe(fds.as_mut_ptr()) }, 0);
        let [read_end, write_end] = fds;

        let pid = unsafe { libc::fork() };
        assert!(pid >= 0);
        if pid == 0 {
            unsafe {
                libc::dup2(write_end, libc::STDERR_FILENO);
                libc::close(read_end);
            }
            install_fault_handlers(false);
            unsafe {
                libc::raise(libc::SIGSEGV);
                libc::_exit(3);
            }
        }

        unsafe {
            libc::close(write_end);
            libc::fcntl(read_end, libc::F_SETFL, libc::O_NONBLOCK);
        }
        let stderr = read_until(read_end, "Caught SIGSEGV", Duration::from_secs(5));

        std::thread::sleep(Duration::from_millis(500));
        let mut status = 0;
        let waited = unsafe { libc::waitpid(pid, &mut status, libc::WNOHANG) };

        unsafe {
            libc::kill(pid, libc::SIGKILL);
            libc::waitpid(pid, &mut status, 0);
            libc::close(read_end);
        }

        assert!(stderr.contains("Caught SIGSEGV"), "stderr was {stderr:?}");
        assert_eq!(waited, 0, "faulted process exited instead of parking");
    }
}
