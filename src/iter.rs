//! Iterator adapter that stops yielding once an interrupt is observed.

use crate::scope::{InterruptScope, ScopeGuard};

/// Wrap an iterator in a fresh interrupt scope.
///
/// Ctrl-C stops the iteration after the element currently in flight instead
/// of aborting the process; the previous SIGINT disposition comes back as
/// soon as the iteration stops, drains, or is dropped. Each call is a fresh
/// scope activation; the adapter is not restartable.
///
/// ```no_run
/// use stop_iter::stop_iter;
///
/// for n in stop_iter(1u64..) {
///     println!("{n}");
///     std::thread::sleep(std::time::Duration::from_secs(1));
/// }
/// // Ctrl-C landed: loop exited cleanly, handler restored.
/// ```
///
/// # Panics
///
/// Panics under the same conditions as [`InterruptScope::enter`].
pub fn stop_iter<I>(iter: I) -> StopIter<I::IntoIter>
where
    I: IntoIterator,
{
    InterruptScope::new().wrap(iter)
}

/// Lazy adapter produced by [`stop_iter`] and [`InterruptScope::wrap`].
///
/// The flag is checked twice per element: before pulling the next one (so no
/// further upstream work starts after an interrupt) and after the pull (so an
/// element produced while the signal landed is dropped rather than handed
/// out). Once it yields `None` the adapter is fused and the scope has already
/// been exited; dropping a partially-consumed adapter exits the scope too.
pub struct StopIter<I> {
    inner: I,
    guard: Option<ScopeGuard>,
}

impl<I> StopIter<I> {
    pub(crate) fn with_guard(inner: I, guard: ScopeGuard) -> Self {
        Self {
            inner,
            guard: Some(guard),
        }
    }

    fn interrupted(&self) -> bool {
        self.guard.as_ref().map_or(false, ScopeGuard::is_interrupted)
    }

    /// Exit the scope now instead of waiting for drop.
    fn release(&mut self) {
        self.guard = None;
    }
}

impl<I: Iterator> Iterator for StopIter<I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<I::Item> {
        self.guard.as_ref()?;
        if self.interrupted() {
            self.release();
            return None;
        }
        match self.inner.next() {
            // The signal landed while this element was being produced.
            Some(_) if self.interrupted() => {
                self.release();
                None
            }
            Some(item) => Some(item),
            None => {
                self.release();
                None
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.guard {
            // May stop at any element, so no lower bound survives.
            Some(_) => (0, self.inner.size_hint().1),
            None => (0, Some(0)),
        }
    }
}

/// Adapter-style entry point for iterator chains.
pub trait StopIterExt: Iterator + Sized {
    /// Equivalent to [`stop_iter`].
    fn stop_on_interrupt(self) -> StopIter<Self>;
}

impl<I: Iterator> StopIterExt for I {
    fn stop_on_interrupt(self) -> StopIter<Self> {
        stop_iter(self)
    }
}
