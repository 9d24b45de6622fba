//! Operator interrupt (Ctrl+C) turned into a flag the scan coordinator polls.
//!
//! Only the coordinator's wait observes the flag. Probes already running are left
//! alone; each one is bounded by its own connect timeout.

use std::{
    io,
    sync::atomic::{AtomicBool, Ordering},
};

use crate::error::ScanError;

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

extern "C" fn on_sigint(_: libc::c_int) {
    INTERRUPTED.store(true, Ordering::SeqCst);
}

/// Installs the SIGINT handler that raises [`flag`].
///
/// The handler is one-shot: a second Ctrl+C kills the process as usual.
pub fn install() -> Result<(), ScanError> {
    let handler = on_sigint as extern "C" fn(libc::c_int) as libc::sighandler_t;

    let rc = unsafe {
        let mut action: libc::sigaction = std::mem::zeroed();
        action.sa_sigaction = handler;
        action.sa_flags = libc::SA_RESETHAND | libc::SA_RESTART;
        libc::sigemptyset(&mut action.sa_mask);
        libc::sigaction(libc::SIGINT, &action, std::ptr::null_mut())
    };
    if rc != 0 {
        return Err(ScanError::SignalHandlerFailed(io::Error::last_os_error()));
    }

    Ok(())
}

#[inline]
pub fn flag() -> &'static AtomicBool {
    &INTERRUPTED
}
