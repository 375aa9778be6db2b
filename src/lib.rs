//! Stop long-running iterations gracefully on Ctrl-C.
//!
//! Wrapping an iterator with [`stop_iter`] installs a SIGINT handler that
//! records the interrupt instead of aborting the process; the iteration
//! stops after the element in flight and the previous handler comes back.
//! [`InterruptScope`] exposes the same mechanism for manual polling inside a
//! custom loop and for decorating callables that poll the scope themselves.

pub mod iter;
pub mod scope;
mod signal;

pub use iter::{stop_iter, StopIter, StopIterExt};
pub use scope::{InterruptScope, ScopeGuard};
pub use signal::SignalError;

#[cfg(test)]
pub mod test_utils;
