//! Fail-fast allocation primitives shared by the emulator subsystems.
//!
//! Every allocation either returns a usable, zero-initialized buffer or the
//! process terminates. Callers treat allocation as total: there is no error
//! to check at the call site, which removes null/`None` bookkeeping from the
//! rest of the system. In exchange, resource exhaustion (and the zero-size
//! requests that always indicate a caller bug) become an immediate abort.
//!
//! Before aborting, the failure reason is recorded in a process-wide crash
//! context slot and mirrored to stderr, so a post-mortem inspection of the
//! terminated process can recover the cause without a live debugger.

use std::alloc::{alloc_zeroed, Layout};
use std::sync::Mutex;

static CRASH_CONTEXT: Mutex<Option<String>> = Mutex::new(None);

/// Records `reason` in the process-wide crash context slot.
///
/// Sibling subsystems that share the fail-fast policy call this immediately
/// before their own abort paths; the most recent reason wins.
pub fn set_crash_context(reason: impl Into<String>) {
    // A poisoned slot means another thread died mid-record; the abort that
    // follows makes the lost update moot.
    if let Ok(mut slot) = CRASH_CONTEXT.lock() {
        *slot = Some(reason.into());
    }
}

/// Returns the most recently recorded crash context, if any.
pub fn crash_context() -> Option<String> {
    CRASH_CONTEXT.lock().ok().and_then(|slot| slot.clone())
}

fn die(reason: &str) -> ! {
    set_crash_context(reason);
    eprintln!("fatal: {reason}");
    std::process::abort()
}

/// Validates an allocation request of `count` elements of `size` bytes each.
///
/// Returns the byte layout for the request, or the diagnostic string for the
/// abort path. Zero `count` or `size` is rejected exactly like a size that
/// overflows the address space.
fn checked_layout(count: usize, size: usize) -> Result<Layout, &'static str> {
    if count == 0 || size == 0 {
        return Err("zero size allocation requested");
    }
    let total = count
        .checked_mul(size)
        .ok_or("allocation size overflows usize")?;
    Layout::array::<u8>(total).map_err(|_| "allocation size exceeds isize::MAX")
}

fn alloc_or_die(layout: Layout) -> Box<[u8]> {
    // SAFETY: `checked_layout` guarantees a non-zero-sized layout, and the
    // buffer is zero-initialized before ownership is handed to the Box.
    unsafe {
        let ptr = alloc_zeroed(layout);
        if ptr.is_null() {
            die("allocation failure");
        }
        Box::from_raw(std::slice::from_raw_parts_mut(ptr, layout.size()))
    }
}

/// Allocates `size` bytes, or aborts the process.
///
/// The returned buffer is zero-initialized. `size == 0` is a caller bug and
/// aborts just like real exhaustion would.
pub fn alloc_bytes(size: usize) -> Box<[u8]> {
    match checked_layout(1, size) {
        Ok(layout) => alloc_or_die(layout),
        Err(reason) => die(reason),
    }
}

/// Allocates `count` elements of `size` bytes each, zero-filled, or aborts
/// the process. `count == 0` and `size == 0` are both fatal.
pub fn alloc_zeroed_bytes(count: usize, size: usize) -> Box<[u8]> {
    match checked_layout(count, size) {
        Ok(layout) => alloc_or_die(layout),
        Err(reason) => die(reason),
    }
}
