//! Interrupt scopes: handler replacement around a shared stop flag.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, warn};

use crate::iter::StopIter;
use crate::signal::{self, SavedDisposition, SignalError};

/// A reusable interrupt scope.
///
/// While entered, Ctrl-C no longer aborts the process: it sets this scope's
/// flag, which consumers poll at their own safe checkpoints. Clones share the
/// flag, so a closure handed to [`decorate`](Self::decorate) can poll the
/// same scope its decorator enters.
///
/// The scope is inactive until [`enter`](Self::enter) (or
/// [`try_enter`](Self::try_enter)) installs the handler; the returned
/// [`ScopeGuard`] restores the previous disposition when dropped, after which
/// the scope can be entered again.
#[derive(Clone, Debug, Default)]
pub struct InterruptScope {
    interrupted: Arc<AtomicBool>,
}

impl InterruptScope {
    /// Create an inactive scope with the flag cleared.
    pub fn new() -> Self {
        Self::default()
    }

    /// True once SIGINT has been delivered inside the current activation.
    ///
    /// The flag stays set until the activation exits; entry and exit both
    /// clear it.
    pub fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }

    /// Enter the scope: capture the current SIGINT disposition and install
    /// the flag-setting handler in its place.
    ///
    /// Entering repeatedly nests; each entry captures whatever was installed
    /// at that moment, including the handler of an enclosing scope.
    pub fn try_enter(&self) -> Result<ScopeGuard, SignalError> {
        self.interrupted.store(false, Ordering::SeqCst);
        let saved = signal::install(&self.interrupted)?;
        debug!("interrupt scope entered; SIGINT now sets the stop flag");
        Ok(ScopeGuard {
            interrupted: Arc::clone(&self.interrupted),
            saved: Some(saved),
        })
    }

    /// Like [`try_enter`](Self::try_enter), but treats a failed installation
    /// as fatal.
    ///
    /// # Panics
    ///
    /// Panics if the SIGINT handler cannot be installed. That only happens
    /// in environments where signal registration is unavailable, which
    /// callers are expected to avoid.
    pub fn enter(&self) -> ScopeGuard {
        match self.try_enter() {
            Ok(guard) => guard,
            Err(err) => panic!("{err}"),
        }
    }

    /// Wrap an iterator so it stops yielding once this scope observes an
    /// interrupt.
    ///
    /// The scope is entered immediately and exited when the returned adapter
    /// stops or is dropped. See [`StopIter`] for the stopping rules.
    ///
    /// # Panics
    ///
    /// Panics under the same conditions as [`enter`](Self::enter).
    pub fn wrap<I>(&self, iter: I) -> StopIter<I::IntoIter>
    where
        I: IntoIterator,
    {
        StopIter::with_guard(iter.into_iter(), self.enter())
    }

    /// Decorate a callable so its whole body runs inside this scope.
    ///
    /// The returned closure enters the scope, invokes `f` with its argument
    /// forwarded unchanged, and exits the scope on the way out, including
    /// when `f` panics (the panic continues after the handler is restored).
    /// Return values are forwarded untouched; `f` is expected to poll a
    /// clone of this scope itself. Pass multiple arguments as a tuple.
    ///
    /// # Panics
    ///
    /// Each invocation panics under the same conditions as
    /// [`enter`](Self::enter).
    pub fn decorate<A, R, F>(&self, mut f: F) -> impl FnMut(A) -> R
    where
        F: FnMut(A) -> R,
    {
        let scope = self.clone();
        move |args| {
            let _guard = scope.enter();
            f(args)
        }
    }
}

/// An active handler registration.
///
/// Holds the disposition displaced on entry and reinstates it on drop, on
/// every exit path including panic unwind. Dropping the guard also clears the
/// scope's flag, leaving the [`InterruptScope`] ready for reuse.
pub struct ScopeGuard {
    interrupted: Arc<AtomicBool>,
    saved: Option<SavedDisposition>,
}

impl ScopeGuard {
    /// True once SIGINT has been delivered inside this activation.
    pub fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        if let Some(saved) = self.saved.take() {
            // Cannot propagate from drop; the error is logged instead.
            match signal::restore(saved) {
                Ok(()) => debug!("interrupt scope exited; previous SIGINT disposition restored"),
                Err(err) => warn!("leaving interrupt scope: {err}"),
            }
            self.interrupted.store(false, Ordering::SeqCst);
        }
    }
}
