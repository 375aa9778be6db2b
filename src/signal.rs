//! Process-wide SIGINT slot with save/restore of the previous disposition.
//!
//! The OS holds exactly one SIGINT disposition at a time. Scopes replace it
//! for their lifetime and hand back whatever they displaced, so nested scopes
//! unwind in reverse order without an explicit stack: each activation only
//! remembers its immediate predecessor.

use std::ptr;
use std::sync::atomic::{AtomicBool, AtomicPtr, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use nix::libc::c_int;
use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, Signal};

/// Errors from replacing or restoring the SIGINT disposition.
#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    #[error("failed to install the SIGINT handler: {0}")]
    Install(#[source] nix::errno::Errno),
    #[error("failed to restore the previous SIGINT handler: {0}")]
    Restore(#[source] nix::errno::Errno),
}

// Which scope's flag cell the handler sets. The mutex owns the cell and is
// never taken from the handler; CURRENT_CELL mirrors the cell's address so
// the handler gets by on two atomic operations.
static CELL_OWNER: Mutex<Option<Arc<AtomicBool>>> = Mutex::new(None);
static CURRENT_CELL: AtomicPtr<AtomicBool> = AtomicPtr::new(ptr::null_mut());

extern "C" fn flag_interrupt(_signum: c_int) {
    // Runs at an arbitrary instruction boundary: atomic load, atomic store,
    // nothing else. No allocation, no locking, no I/O, never unwinds.
    let cell = CURRENT_CELL.load(Ordering::SeqCst);
    if !cell.is_null() {
        // The guard that published this pointer owns an `Arc` on the cell,
        // and every later guard owns its predecessor's, so the pointer stays
        // valid while the handler is installed.
        unsafe { (*cell).store(true, Ordering::SeqCst) };
    }
}

/// The disposition in effect before a scope entered, returned by [`install`]
/// and consumed by [`restore`].
pub(crate) struct SavedDisposition {
    action: SigAction,
    /// Owning handle on the predecessor's flag cell, keeping it alive for
    /// the handler until this save is restored.
    cell: Option<Arc<AtomicBool>>,
}

fn lock_owner() -> MutexGuard<'static, Option<Arc<AtomicBool>>> {
    CELL_OWNER.lock().unwrap_or_else(PoisonError::into_inner)
}

fn cell_ptr(cell: Option<&Arc<AtomicBool>>) -> *mut AtomicBool {
    cell.map_or(ptr::null_mut(), |c| Arc::as_ptr(c) as *mut AtomicBool)
}

/// Point the handler at `cell` and install it for SIGINT, returning the
/// disposition it displaced.
///
/// `SA_RESTART` lets blocking calls in the wrapped body run their current
/// step to completion; the interrupt is honored at the next checkpoint, not
/// mid-operation.
pub(crate) fn install(cell: &Arc<AtomicBool>) -> Result<SavedDisposition, SignalError> {
    let mut owner = lock_owner();
    let previous_cell = owner.replace(Arc::clone(cell));
    // Publish the cell before the handler can run against it.
    CURRENT_CELL.store(cell_ptr(Some(cell)), Ordering::SeqCst);

    let action = SigAction::new(
        SigHandler::Handler(flag_interrupt),
        SaFlags::SA_RESTART,
        SigSet::empty(),
    );
    match unsafe { signal::sigaction(Signal::SIGINT, &action) } {
        Ok(previous_action) => Ok(SavedDisposition {
            action: previous_action,
            cell: previous_cell,
        }),
        Err(errno) => {
            CURRENT_CELL.store(cell_ptr(previous_cell.as_ref()), Ordering::SeqCst);
            *owner = previous_cell;
            Err(SignalError::Install(errno))
        }
    }
}

/// Reinstate a saved disposition, handing the slot back to the enclosing
/// scope (or to whatever was installed before the outermost one).
pub(crate) fn restore(saved: SavedDisposition) -> Result<(), SignalError> {
    let mut owner = lock_owner();
    unsafe { signal::sigaction(Signal::SIGINT, &saved.action) }.map_err(SignalError::Restore)?;
    CURRENT_CELL.store(cell_ptr(saved.cell.as_ref()), Ordering::SeqCst);
    *owner = saved.cell;
    Ok(())
}
