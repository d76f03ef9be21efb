//! Cooperative cancellation.
//!
//! The first interrupt sets the flag, and the resolver stops before its next
//! step. A request that is already on the wire cannot be interrupted, so an
//! interrupt arriving while one is in flight exits the process with status
//! 130 instead. So does a second interrupt. Nothing has been written at that
//! point, since output only happens after every secret resolved.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::debug;

/// Exit status for a process stopped by SIGINT.
pub const INTERRUPTED_EXIT: i32 = 130;

/// Shared cancellation flag.
///
/// Clones observe the same flag. Long-running work polls
/// [`is_cancelled`](Self::is_cancelled) between steps and wraps blocking
/// calls in [`busy`](Self::busy).
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
    busy: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Whether a blocking call is running under [`busy`](Self::busy).
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Run `f`, marking the token busy for its duration.
    pub fn busy<T>(&self, f: impl FnOnce() -> T) -> T {
        let _guard = BusyGuard::enter(&self.busy);
        f()
    }

    /// React to SIGINT (exit status 130) and SIGTERM (143).
    ///
    /// An interrupt sets the flag. It terminates the process instead when
    /// the token is busy or was already cancelled.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the signal handlers cannot be registered.
    #[cfg(unix)]
    pub fn cancel_on_interrupt(&self) -> std::io::Result<()> {
        use signal_hook::consts::{SIGINT, SIGTERM};
        use signal_hook::flag;

        for (signal, status) in [(SIGINT, INTERRUPTED_EXIT), (SIGTERM, 128 + SIGTERM)] {
            // shutdown checks run before the flag is set below
            flag::register_conditional_shutdown(signal, status, Arc::clone(&self.busy))?;
            flag::register_conditional_shutdown(signal, status, Arc::clone(&self.cancelled))?;
            flag::register(signal, Arc::clone(&self.cancelled))?;
        }
        debug!("interrupt handler installed");
        Ok(())
    }

    #[cfg(not(unix))]
    pub fn cancel_on_interrupt(&self) -> std::io::Result<()> {
        debug!("interrupt handling unavailable on this platform");
        Ok(())
    }
}

struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn enter(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
